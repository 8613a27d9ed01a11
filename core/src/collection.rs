//! The remote collection capability and its HTTP adapter.
//!
//! # Design
//! `TodoStore` depends only on `Collection`, injected at construction. Each
//! call is independently asynchronous and independently fallible. Futures
//! are not required to be `Send`: everything runs on one local event loop.
//!
//! `HttpCollection` keeps the host-does-IO split: `TodoClient` builds and
//! parses plain-data requests, and a host-supplied `Transport` performs the
//! round-trip.

use std::rc::Rc;

use async_trait::async_trait;
use uuid::Uuid;

use crate::client::TodoClient;
use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse};
use crate::types::{Todo, TodoPayload};

#[async_trait(?Send)]
pub trait Collection {
    async fn list(&self) -> Result<Vec<Todo>, ApiError>;

    async fn create(&self, payload: &TodoPayload) -> Result<Todo, ApiError>;

    async fn update(&self, id: Uuid, payload: &TodoPayload) -> Result<Todo, ApiError>;

    async fn delete(&self, id: Uuid) -> Result<(), ApiError>;
}

#[async_trait(?Send)]
impl<C: Collection + ?Sized> Collection for Rc<C> {
    async fn list(&self) -> Result<Vec<Todo>, ApiError> {
        (**self).list().await
    }

    async fn create(&self, payload: &TodoPayload) -> Result<Todo, ApiError> {
        (**self).create(payload).await
    }

    async fn update(&self, id: Uuid, payload: &TodoPayload) -> Result<Todo, ApiError> {
        (**self).update(id, payload).await
    }

    async fn delete(&self, id: Uuid) -> Result<(), ApiError> {
        (**self).delete(id).await
    }
}

/// Executes one HTTP round-trip on behalf of the core.
///
/// Non-2xx statuses must be returned as `Ok` responses; only failures to
/// complete the exchange map to `Err` (usually `ApiError::Transport`).
#[async_trait(?Send)]
pub trait Transport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError>;
}

/// `Collection` backed by a REST service reached through `T`.
#[derive(Debug, Clone)]
pub struct HttpCollection<T> {
    client: TodoClient,
    transport: T,
}

impl<T: Transport> HttpCollection<T> {
    pub fn new(base_url: &str, transport: T) -> Self {
        Self {
            client: TodoClient::new(base_url),
            transport,
        }
    }
}

#[async_trait(?Send)]
impl<T: Transport> Collection for HttpCollection<T> {
    async fn list(&self) -> Result<Vec<Todo>, ApiError> {
        let response = self.transport.execute(self.client.build_list()).await?;
        self.client.parse_list(response)
    }

    async fn create(&self, payload: &TodoPayload) -> Result<Todo, ApiError> {
        let request = self.client.build_create(payload)?;
        let response = self.transport.execute(request).await?;
        self.client.parse_create(response)
    }

    async fn update(&self, id: Uuid, payload: &TodoPayload) -> Result<Todo, ApiError> {
        let request = self.client.build_update(id, payload)?;
        let response = self.transport.execute(request).await?;
        self.client.parse_update(response)
    }

    async fn delete(&self, id: Uuid) -> Result<(), ApiError> {
        let response = self.transport.execute(self.client.build_delete(id)).await?;
        self.client.parse_delete(response)
    }
}
