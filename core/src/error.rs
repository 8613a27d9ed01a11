//! Errors produced by a single call against the todo collection.
//!
//! # Design
//! `NotFound` gets a dedicated variant because callers frequently distinguish
//! "the resource does not exist" from "the server returned an unexpected
//! status." All other non-2xx responses land in `HttpError` with the raw
//! status code and body for debugging.
//!
//! Errors are stored on lifecycles and handed to consumers as data, so the
//! type is `Clone` and carries owned strings only.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// The server returned 404; the requested todo does not exist.
    #[error("resource not found")]
    NotFound,

    /// The server returned a non-2xx status other than 404.
    #[error("HTTP {status}: {body}")]
    HttpError { status: u16, body: String },

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    DeserializationError(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    SerializationError(String),

    /// The host transport could not complete the round-trip.
    #[error("transport failed: {0}")]
    Transport(String),

    /// Update or delete was requested for a todo the service never assigned an id.
    #[error("todo has not been created yet")]
    Unsaved,

    /// Failure produced by a fault-injecting collection.
    #[error("injected fault")]
    Injected,
}
