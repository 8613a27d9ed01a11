//! Mapping from a todo to the request that persists it.
//!
//! Pure and total: every `Todo` maps to a path and a body. A todo without an
//! id addresses the collection itself, which is the creation endpoint.

use uuid::Uuid;

use crate::types::{Todo, TodoPayload};

/// Path of the collection resource, relative to the service base URL.
pub const COLLECTION_PATH: &str = "/todos";

/// Where a mutation is sent and what it carries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mutation {
    pub path: String,
    pub body: TodoPayload,
}

/// Collection path, suffixed with `/{id}` when an id is given.
pub fn resource_path(id: Option<Uuid>) -> String {
    match id {
        Some(id) => format!("{COLLECTION_PATH}/{id}"),
        None => COLLECTION_PATH.to_string(),
    }
}

pub fn encode(todo: &Todo) -> Mutation {
    Mutation {
        path: resource_path(todo.id),
        body: TodoPayload::from(todo),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn draft_maps_to_collection_path() {
        let mutation = encode(&Todo::draft("Buy milk"));
        assert_eq!(mutation.path, "/todos");
        assert_eq!(
            mutation.body,
            TodoPayload {
                title: "Buy milk".to_string(),
                completed: false,
            }
        );
    }

    #[test]
    fn persisted_todo_maps_to_item_path() {
        let todo = Todo {
            id: Some(Uuid::nil()),
            title: "Walk".to_string(),
            completed: true,
        };
        let mutation = encode(&todo);
        assert_eq!(mutation.path, "/todos/00000000-0000-0000-0000-000000000000");
        assert!(mutation.body.completed);
    }

    #[test]
    fn encode_is_deterministic() {
        let todo = Todo {
            id: Some(Uuid::from_u128(3)),
            title: "Same".to_string(),
            completed: false,
        };
        assert_eq!(encode(&todo), encode(&todo));
    }
}
