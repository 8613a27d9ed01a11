//! Domain types for the todo collection.
//!
//! # Design
//! A `Todo` without an `id` is a draft that the remote service has not yet
//! persisted. Identifiers are assigned by the service only, so the id is
//! omitted from the JSON when absent rather than sent as `null`.
//!
//! `TodoPayload` is the wire body for create and update; it never carries the
//! id, which travels in the request path instead.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single todo item, persisted or not.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Todo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    pub title: String,
    #[serde(default)]
    pub completed: bool,
}

impl Todo {
    /// A not-yet-created item. The service assigns the id on create.
    pub fn draft(title: impl Into<String>) -> Self {
        Self {
            id: None,
            title: title.into(),
            completed: false,
        }
    }

    /// A copy of `self` with `completed` replaced.
    pub fn with_completed(&self, completed: bool) -> Self {
        Self {
            completed,
            ..self.clone()
        }
    }

    /// A copy of `self` with `title` replaced.
    pub fn with_title(&self, title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..self.clone()
        }
    }

    /// A copy of `self` with the id stripped.
    pub fn without_id(&self) -> Self {
        Self {
            id: None,
            ..self.clone()
        }
    }
}

/// Request body for creating or updating a todo.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TodoPayload {
    pub title: String,
    pub completed: bool,
}

impl From<&Todo> for TodoPayload {
    fn from(todo: &Todo) -> Self {
        Self {
            title: todo.title.clone(),
            completed: todo.completed,
        }
    }
}
