//! Fault-injecting `Collection` decorator for exercising retry paths.
//!
//! Each call fails with `ApiError::Injected` with probability `likelihood`
//! before reaching the wrapped collection. Seeded, so a test run is
//! reproducible.

use std::cell::RefCell;

use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::warn;
use uuid::Uuid;

use crate::collection::Collection;
use crate::error::ApiError;
use crate::types::{Todo, TodoPayload};

pub const DEFAULT_FAULT_LIKELIHOOD: f64 = 0.2;

#[derive(Debug)]
pub struct FaultyCollection<C> {
    inner: C,
    likelihood: f64,
    rng: RefCell<StdRng>,
}

impl<C: Collection> FaultyCollection<C> {
    /// `likelihood` is clamped to `[0, 1]`; NaN counts as zero.
    pub fn new(inner: C, likelihood: f64, seed: u64) -> Self {
        let likelihood = if likelihood.is_nan() { 0.0 } else { likelihood.clamp(0.0, 1.0) };
        Self {
            inner,
            likelihood,
            rng: RefCell::new(StdRng::seed_from_u64(seed)),
        }
    }

    pub fn inner(&self) -> &C {
        &self.inner
    }

    fn roll(&self, call: &'static str) -> Result<(), ApiError> {
        if self.rng.borrow_mut().gen_bool(self.likelihood) {
            warn!(call, "injecting fault");
            return Err(ApiError::Injected);
        }
        Ok(())
    }
}

#[async_trait(?Send)]
impl<C: Collection> Collection for FaultyCollection<C> {
    async fn list(&self) -> Result<Vec<Todo>, ApiError> {
        self.roll("list")?;
        self.inner.list().await
    }

    async fn create(&self, payload: &TodoPayload) -> Result<Todo, ApiError> {
        self.roll("create")?;
        self.inner.create(payload).await
    }

    async fn update(&self, id: Uuid, payload: &TodoPayload) -> Result<Todo, ApiError> {
        self.roll("update")?;
        self.inner.update(id, payload).await
    }

    async fn delete(&self, id: Uuid) -> Result<(), ApiError> {
        self.roll("delete")?;
        self.inner.delete(id).await
    }
}
