//! The canonical todo list and the rules for merging settled results into it.
//!
//! # Invariants
//! - No two entries share a defined id.
//! - Entries are never mutated in place. Every change installs a fresh list
//!   and bumps `version`, so readers detect change with `Rc::ptr_eq` or by
//!   comparing versions.
//! - Each merge reads the list as it is at settlement time and only touches
//!   the ids present in the settled result. Out-of-order settlement therefore
//!   cannot clobber unrelated entries.

use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use tracing::{debug, warn};
use uuid::Uuid;

use crate::types::Todo;

#[derive(Debug, Clone, Default)]
pub struct CanonicalList {
    todos: Rc<Vec<Todo>>,
    version: u64,
}

impl CanonicalList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shared handle to the current list.
    pub fn snapshot(&self) -> Rc<Vec<Todo>> {
        Rc::clone(&self.todos)
    }

    pub fn todos(&self) -> &[Todo] {
        &self.todos
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn active_count(&self) -> usize {
        self.todos.iter().filter(|t| !t.completed).count()
    }

    pub fn completed_count(&self) -> usize {
        self.todos.len() - self.active_count()
    }

    /// Adopt a freshly fetched list in the order the service returned it.
    ///
    /// A repeated id keeps the position of its first occurrence and the value
    /// of its last.
    pub fn replace_all(&mut self, fetched: Vec<Todo>) {
        let mut next: Vec<Todo> = Vec::with_capacity(fetched.len());
        let mut positions: HashMap<Uuid, usize> = HashMap::new();
        for todo in fetched {
            let Some(id) = todo.id else {
                next.push(todo);
                continue;
            };
            match positions.get(&id) {
                Some(&at) => {
                    warn!(%id, "fetched list repeats an id; keeping the last value");
                    next[at] = todo;
                }
                None => {
                    positions.insert(id, next.len());
                    next.push(todo);
                }
            }
        }
        self.install(next, "fetch");
    }

    /// Append a created todo. Applying the same result again does not
    /// duplicate it: an entry with the same id is replaced instead.
    pub fn append_created(&mut self, created: Todo) -> bool {
        let existing = created
            .id
            .and_then(|id| self.todos.iter().position(|t| t.id == Some(id)));
        let next = match existing {
            Some(at) if self.todos[at] == created => return false,
            Some(at) => {
                let mut next = self.todos.as_ref().clone();
                next[at] = created;
                next
            }
            None => {
                let mut next = self.todos.as_ref().clone();
                next.push(created);
                next
            }
        };
        self.install(next, "create")
    }

    /// Replace every entry whose id appears in `updated`. When `updated`
    /// repeats an id, its last occurrence wins.
    pub fn apply_updates(&mut self, updated: &[Todo]) -> bool {
        let by_id: HashMap<Uuid, &Todo> = updated
            .iter()
            .filter_map(|todo| todo.id.map(|id| (id, todo)))
            .collect();
        if by_id.is_empty() {
            return false;
        }
        let next: Vec<Todo> = self
            .todos
            .iter()
            .map(|todo| {
                todo.id
                    .and_then(|id| by_id.get(&id))
                    .map_or_else(|| todo.clone(), |&fresh| fresh.clone())
            })
            .collect();
        self.install(next, "update")
    }

    /// Drop every entry whose id is among the successfully removed items.
    pub fn apply_removals(&mut self, removed: &[Todo]) -> bool {
        let ids: HashSet<Uuid> = removed.iter().filter_map(|todo| todo.id).collect();
        if ids.is_empty() {
            return false;
        }
        let next: Vec<Todo> = self
            .todos
            .iter()
            .filter(|todo| !todo.id.is_some_and(|id| ids.contains(&id)))
            .cloned()
            .collect();
        self.install(next, "remove")
    }

    fn install(&mut self, next: Vec<Todo>, cause: &'static str) -> bool {
        if next == *self.todos {
            return false;
        }
        self.todos = Rc::new(next);
        self.version += 1;
        debug!(cause, version = self.version, len = self.todos.len(), "canonical list replaced");
        true
    }
}
