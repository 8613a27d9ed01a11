//! Client-side synchronization core for a remote todo collection.
//!
//! # Overview
//! Keeps an in-memory canonical list of todos in step with a remote CRUD
//! collection reached over an unreliable network. Consumers issue commands
//! on a `TodoStore` and read back the list, an aggregate loading flag, and a
//! single consolidated error with its retry action.
//!
//! # Design
//! - `Collection` is the injected remote capability. `HttpCollection` adapts
//!   it onto plain-data HTTP (`TodoClient` builds and parses; the host's
//!   `Transport` does the I/O). `MemoryCollection` is an in-process stand-in.
//! - `lifecycle` tracks each operation's pending/result/failure state and
//!   fans batches out concurrently behind a join barrier.
//! - `reconcile` merges settled results into the canonical list by id,
//!   installing a fresh versioned list on every change.
//! - `consolidate` picks the one error to surface: fetch, create, update,
//!   remove, in that order.
//! - Everything runs on one thread inside a tokio `LocalSet`.

pub mod client;
pub mod codec;
pub mod collection;
pub mod consolidate;
pub mod error;
#[cfg(any(test, feature = "fault-injection"))]
pub mod fault;
pub mod http;
pub mod lifecycle;
pub mod memory;
pub mod reconcile;
pub mod store;
pub mod types;

pub use client::TodoClient;
pub use codec::{encode, Mutation};
pub use collection::{Collection, HttpCollection, Transport};
pub use consolidate::Statuses;
pub use error::ApiError;
#[cfg(any(test, feature = "fault-injection"))]
pub use fault::{FaultyCollection, DEFAULT_FAULT_LIKELIHOOD};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use lifecycle::{BatchOutcome, ItemFailure, Operation, Status, Ticket};
pub use memory::MemoryCollection;
pub use reconcile::CanonicalList;
pub use store::{ErrorReport, Retry, TodoStore, TodoView};
pub use types::{Todo, TodoPayload};
