//! In-process `Collection` with the same semantics as the mock server.
//!
//! Ids are assigned on create; the list is returned in creation order.

use std::cell::RefCell;

use async_trait::async_trait;
use uuid::Uuid;

use crate::collection::Collection;
use crate::error::ApiError;
use crate::types::{Todo, TodoPayload};

#[derive(Debug, Default)]
pub struct MemoryCollection {
    todos: RefCell<Vec<Todo>>,
}

impl MemoryCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the collection. Drafts are assigned fresh ids.
    pub fn with_todos(todos: impl IntoIterator<Item = Todo>) -> Self {
        let todos = todos
            .into_iter()
            .map(|todo| Todo {
                id: Some(todo.id.unwrap_or_else(Uuid::new_v4)),
                ..todo
            })
            .collect();
        Self {
            todos: RefCell::new(todos),
        }
    }

    /// Current contents, as the service would list them.
    pub fn todos(&self) -> Vec<Todo> {
        self.todos.borrow().clone()
    }
}

#[async_trait(?Send)]
impl Collection for MemoryCollection {
    async fn list(&self) -> Result<Vec<Todo>, ApiError> {
        Ok(self.todos())
    }

    async fn create(&self, payload: &TodoPayload) -> Result<Todo, ApiError> {
        let todo = Todo {
            id: Some(Uuid::new_v4()),
            title: payload.title.clone(),
            completed: payload.completed,
        };
        self.todos.borrow_mut().push(todo.clone());
        Ok(todo)
    }

    async fn update(&self, id: Uuid, payload: &TodoPayload) -> Result<Todo, ApiError> {
        let mut todos = self.todos.borrow_mut();
        let todo = todos
            .iter_mut()
            .find(|t| t.id == Some(id))
            .ok_or(ApiError::NotFound)?;
        todo.title = payload.title.clone();
        todo.completed = payload.completed;
        Ok(todo.clone())
    }

    async fn delete(&self, id: Uuid) -> Result<(), ApiError> {
        let mut todos = self.todos.borrow_mut();
        let at = todos
            .iter()
            .position(|t| t.id == Some(id))
            .ok_or(ApiError::NotFound)?;
        todos.remove(at);
        Ok(())
    }
}
