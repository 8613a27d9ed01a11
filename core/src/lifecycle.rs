//! Request lifecycle tracking for the four collection operations.
//!
//! # Design
//! A lifecycle is the externally visible state of one logical operation:
//! whether a call is in flight, the last settled result, and what failed.
//! Each invocation is a transient cycle on the same lifecycle value.
//!
//! - `pending` is an in-flight counter, so overlapping invocations keep the
//!   operation pending until the last one settles.
//! - A failure remembers the input that produced it; retry re-issues exactly
//!   the failed input(s), never inputs that already succeeded.
//! - `begin` hands out a `Ticket` ordering invocations. A failure stays
//!   visible, retry in flight or not, until an attempt with the same or a
//!   later ticket settles. An older call settling late never clears it.
//!   Single-call and batch lifecycles follow this rule alike; batches apply
//!   it per item.
//! - Batches fan out one call per item and settle only once every member has
//!   settled (`run_batch`). Partial failure is an ordinary outcome.

use std::future::Future;

use futures::future::join_all;

use crate::error::ApiError;
use crate::types::Todo;

/// The four operations the store tracks, in error-priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Fetch,
    Create,
    Update,
    Remove,
}

impl Operation {
    pub fn name(self) -> &'static str {
        match self {
            Operation::Fetch => "fetch",
            Operation::Create => "create",
            Operation::Update => "update",
            Operation::Remove => "remove",
        }
    }

    /// Human-readable label surfaced to consumers when this operation fails.
    pub fn failure_label(self) -> &'static str {
        match self {
            Operation::Fetch => "fetch failed",
            Operation::Create => "create failed",
            Operation::Update => "update failed",
            Operation::Remove => "remove failed",
        }
    }
}

/// Point-in-time summary of a lifecycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Status {
    pub pending: bool,
    pub failed: bool,
}

/// A failed call together with the input that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure<I> {
    pub input: I,
    pub error: ApiError,
}

/// One member of a batch that did not succeed.
pub type ItemFailure = Failure<Todo>;

/// Orders invocations of one lifecycle; later invocations compare greater.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Ticket(u64);

/// Lifecycle of a single-call operation (fetch, create).
#[derive(Debug, Clone)]
pub struct Lifecycle<I, T> {
    in_flight: usize,
    issued: u64,
    result: Option<(Ticket, T)>,
    failure: Option<(Ticket, Failure<I>)>,
}

impl<I, T> Default for Lifecycle<I, T> {
    fn default() -> Self {
        Self {
            in_flight: 0,
            issued: 0,
            result: None,
            failure: None,
        }
    }
}

impl<I: Clone, T> Lifecycle<I, T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&mut self) -> Ticket {
        self.in_flight += 1;
        self.issued += 1;
        Ticket(self.issued)
    }

    /// Record the outcome of the invocation `ticket`. A success clears a
    /// failure from the same or an earlier invocation; a failure replaces
    /// one from the same or an earlier invocation.
    pub fn settle(&mut self, ticket: Ticket, input: I, outcome: Result<T, ApiError>) {
        self.in_flight = self.in_flight.saturating_sub(1);
        match outcome {
            Ok(value) => {
                if self.result.as_ref().map_or(true, |(seen, _)| *seen <= ticket) {
                    self.result = Some((ticket, value));
                }
                if self.failure.as_ref().is_some_and(|(seen, _)| *seen <= ticket) {
                    self.failure = None;
                }
            }
            Err(error) => {
                if self.result.as_ref().is_some_and(|(seen, _)| *seen <= ticket) {
                    self.result = None;
                }
                if self.failure.as_ref().map_or(true, |(seen, _)| *seen <= ticket) {
                    self.failure = Some((ticket, Failure { input, error }));
                }
            }
        }
    }

    pub fn is_pending(&self) -> bool {
        self.in_flight > 0
    }

    pub fn result(&self) -> Option<&T> {
        self.result.as_ref().map(|(_, value)| value)
    }

    pub fn error(&self) -> Option<&ApiError> {
        self.failure.as_ref().map(|(_, f)| &f.error)
    }

    /// Input to re-issue, or `None` when nothing failed or a call is still in
    /// flight.
    pub fn retry_input(&self) -> Option<I> {
        if self.is_pending() {
            return None;
        }
        self.failure.as_ref().map(|(_, f)| f.input.clone())
    }

    pub fn status(&self) -> Status {
        Status {
            pending: self.is_pending(),
            failed: self.failure.is_some(),
        }
    }
}

/// Settled outcome of a batch, in submission order within each half.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchOutcome {
    pub succeeded: Vec<Todo>,
    pub failed: Vec<ItemFailure>,
}

/// Lifecycle of a fan-out operation (update, remove).
///
/// Failures are tracked per item. The latest attempt for an item decides
/// whether it is still failed, regardless of which batch carried it.
#[derive(Debug, Clone, Default)]
pub struct BatchLifecycle {
    in_flight: usize,
    issued: u64,
    results: Vec<Todo>,
    errors: Vec<(Ticket, ItemFailure)>,
}

impl BatchLifecycle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&mut self) -> Ticket {
        self.in_flight += 1;
        self.issued += 1;
        Ticket(self.issued)
    }

    pub fn settle(&mut self, ticket: Ticket, outcome: BatchOutcome) {
        self.in_flight = self.in_flight.saturating_sub(1);
        self.errors.retain(|(seen, failure)| {
            *seen > ticket || !outcome.succeeded.iter().any(|item| same_item(item, &failure.input))
        });
        for failure in outcome.failed {
            match self
                .errors
                .iter_mut()
                .find(|(_, existing)| same_item(&existing.input, &failure.input))
            {
                Some(entry) if entry.0 <= ticket => *entry = (ticket, failure),
                Some(_) => {}
                None => self.errors.push((ticket, failure)),
            }
        }
        self.results = outcome.succeeded;
    }

    /// Drop failures for items that no longer exist remotely, whatever
    /// removed them.
    pub fn forget(&mut self, gone: &[Todo]) {
        self.errors
            .retain(|(_, failure)| !gone.iter().any(|item| same_item(item, &failure.input)));
    }

    pub fn is_pending(&self) -> bool {
        self.in_flight > 0
    }

    /// Items that succeeded in the most recently settled batch.
    pub fn results(&self) -> &[Todo] {
        &self.results
    }

    pub fn errors(&self) -> impl Iterator<Item = &ItemFailure> {
        self.errors.iter().map(|(_, failure)| failure)
    }

    /// Failed items to re-issue, or `None` when nothing failed or a batch is
    /// still in flight.
    pub fn retry_input(&self) -> Option<Vec<Todo>> {
        if self.is_pending() || self.errors.is_empty() {
            return None;
        }
        Some(self.errors().map(|f| f.input.clone()).collect())
    }

    pub fn status(&self) -> Status {
        Status {
            pending: self.is_pending(),
            failed: !self.errors.is_empty(),
        }
    }
}

/// Items are the same when their ids match; id-less drafts compare by value.
fn same_item(a: &Todo, b: &Todo) -> bool {
    match (a.id, b.id) {
        (Some(x), Some(y)) => x == y,
        (None, None) => a == b,
        _ => false,
    }
}

/// Issue `call` for every item concurrently and wait for all of them.
///
/// On success the value returned by `call` is recorded (the service's copy
/// for updates, the submitted item for deletes); on failure the submitted
/// item is recorded with its error.
pub async fn run_batch<F, Fut>(items: Vec<Todo>, call: F) -> BatchOutcome
where
    F: Fn(Todo) -> Fut,
    Fut: Future<Output = Result<Todo, ApiError>>,
{
    let calls = items.into_iter().map(|item| {
        let pending = call(item.clone());
        async move { (item, pending.await) }
    });

    let mut outcome = BatchOutcome {
        succeeded: Vec::new(),
        failed: Vec::new(),
    };
    for (item, result) in join_all(calls).await {
        match result {
            Ok(value) => outcome.succeeded.push(value),
            Err(error) => outcome.failed.push(Failure { input: item, error }),
        }
    }
    outcome
}
