//! The command surface consumers drive: commands in, list and status out.
//!
//! # Design
//! `TodoStore` is a cheap `Clone` handle over state shared on one thread.
//! Every command marks its lifecycle pending before it returns and runs the
//! remote work with `tokio::task::spawn_local`, so commands must be issued
//! from inside a `LocalSet`. The returned `JoinHandle` resolves once the
//! operation has settled and been reconciled; dropping it does not cancel
//! the work.
//!
//! Settlement reads the canonical list as it is at that moment, never a copy
//! taken at invocation. No `RefCell` borrow is held across an `.await`.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use tokio::task::{spawn_local, JoinHandle};
use tracing::{debug, warn};

use crate::codec;
use crate::collection::Collection;
use crate::consolidate::Statuses;
use crate::error::ApiError;
use crate::lifecycle::{run_batch, BatchLifecycle, BatchOutcome, Lifecycle, Operation};
use crate::reconcile::CanonicalList;
use crate::types::Todo;

#[derive(Clone)]
pub struct TodoStore {
    inner: Rc<Inner>,
}

struct Inner {
    collection: Rc<dyn Collection>,
    state: RefCell<State>,
}

#[derive(Default)]
struct State {
    list: CanonicalList,
    fetch: Lifecycle<(), ()>,
    create: Lifecycle<Todo, Todo>,
    update: BatchLifecycle,
    remove: BatchLifecycle,
}

/// Everything a presentation layer renders from.
#[derive(Debug, Clone)]
pub struct TodoView {
    pub todos: Rc<Vec<Todo>>,
    pub version: u64,
    pub loading: bool,
    pub error: Option<ErrorReport>,
}

/// The single failure currently surfaced, with the action that retries it.
#[derive(Debug, Clone)]
pub struct ErrorReport {
    pub operation: Operation,
    pub message: &'static str,
    pub cause: ApiError,
    pub retry: Retry,
}

/// Re-issues the failed request(s) of one operation.
#[derive(Clone)]
pub struct Retry {
    store: TodoStore,
    operation: Operation,
}

impl Retry {
    pub fn operation(&self) -> Operation {
        self.operation
    }

    /// `None` when the operation is still pending or nothing is failed.
    pub fn run(&self) -> Option<JoinHandle<()>> {
        self.store.retry(self.operation)
    }
}

impl fmt::Debug for Retry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Retry").field("operation", &self.operation).finish()
    }
}

impl fmt::Debug for TodoStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.inner.state.borrow();
        f.debug_struct("TodoStore")
            .field("todos", &state.list.todos().len())
            .field("version", &state.list.version())
            .finish()
    }
}

impl TodoStore {
    pub fn new<C: Collection + 'static>(collection: C) -> Self {
        Self {
            inner: Rc::new(Inner {
                collection: Rc::new(collection),
                state: RefCell::new(State::default()),
            }),
        }
    }

    /// Fetch the whole collection and adopt it as the canonical list.
    pub fn load(&self) -> JoinHandle<()> {
        let ticket = self.inner.state.borrow_mut().fetch.begin();
        debug!(operation = "fetch", "operation invoked");
        let this = self.clone();
        spawn_local(async move {
            let fetched = this.inner.collection.list().await;
            let mut state = this.inner.state.borrow_mut();
            let outcome = match fetched {
                Ok(todos) => {
                    state.list.replace_all(todos);
                    Ok(())
                }
                Err(error) => {
                    warn!(operation = "fetch", %error, "remote call failed");
                    Err(error)
                }
            };
            state.fetch.settle(ticket, (), outcome);
            debug!(operation = "fetch", "operation settled");
        })
    }

    /// Persist a new todo. Any id on `todo` is ignored; the service assigns
    /// one, and the list only grows once the service confirms.
    pub fn create(&self, todo: Todo) -> JoinHandle<()> {
        self.spawn_create(todo.without_id())
    }

    pub fn update(&self, todo: Todo) -> JoinHandle<()> {
        self.spawn_update(vec![todo])
    }

    pub fn remove(&self, todo: Todo) -> JoinHandle<()> {
        self.spawn_remove(vec![todo])
    }

    /// Complete everything if anything is active, otherwise reopen everything.
    /// Only todos whose state actually changes are sent.
    pub fn toggle_all(&self) -> JoinHandle<()> {
        let batch: Vec<Todo> = {
            let state = self.inner.state.borrow();
            let todos = state.list.todos();
            let target = todos.iter().any(|todo| !todo.completed);
            todos
                .iter()
                .filter(|todo| todo.completed != target)
                .map(|todo| todo.with_completed(target))
                .collect()
        };
        self.spawn_update(batch)
    }

    /// Delete every completed todo.
    pub fn clear_completed(&self) -> JoinHandle<()> {
        let batch: Vec<Todo> = self
            .inner
            .state
            .borrow()
            .list
            .todos()
            .iter()
            .filter(|todo| todo.completed)
            .cloned()
            .collect();
        self.spawn_remove(batch)
    }

    /// Re-issue what failed for `operation`. Suppressed (returns `None`)
    /// while that operation is pending or when nothing failed.
    pub fn retry(&self, operation: Operation) -> Option<JoinHandle<()>> {
        let handle = match operation {
            Operation::Fetch => {
                let input = self.inner.state.borrow().fetch.retry_input();
                input.map(|()| self.load())
            }
            Operation::Create => {
                let input = self.inner.state.borrow().create.retry_input();
                input.map(|draft| self.spawn_create(draft))
            }
            Operation::Update => {
                let input = self.inner.state.borrow().update.retry_input();
                input.map(|batch| self.spawn_update(batch))
            }
            Operation::Remove => {
                let input = self.inner.state.borrow().remove.retry_input();
                input.map(|batch| self.spawn_remove(batch))
            }
        };
        if handle.is_none() {
            debug!(operation = operation.name(), "retry suppressed");
        }
        handle
    }

    pub fn todos(&self) -> Rc<Vec<Todo>> {
        self.inner.state.borrow().list.snapshot()
    }

    /// Bumped every time a new canonical list is installed.
    pub fn version(&self) -> u64 {
        self.inner.state.borrow().list.version()
    }

    pub fn active_count(&self) -> usize {
        self.inner.state.borrow().list.active_count()
    }

    pub fn completed_count(&self) -> usize {
        self.inner.state.borrow().list.completed_count()
    }

    pub fn statuses(&self) -> Statuses {
        let state = self.inner.state.borrow();
        Statuses {
            fetch: state.fetch.status(),
            create: state.create.status(),
            update: state.update.status(),
            remove: state.remove.status(),
        }
    }

    pub fn loading(&self) -> bool {
        self.statuses().loading()
    }

    pub fn error(&self) -> Option<ErrorReport> {
        let operation = self.statuses().consolidate()?;
        let cause = {
            let state = self.inner.state.borrow();
            let cause = match operation {
                Operation::Fetch => state.fetch.error().cloned(),
                Operation::Create => state.create.error().cloned(),
                Operation::Update => state.update.errors().next().map(|f| f.error.clone()),
                Operation::Remove => state.remove.errors().next().map(|f| f.error.clone()),
            };
            cause
        }?;
        Some(ErrorReport {
            operation,
            message: operation.failure_label(),
            cause,
            retry: Retry {
                store: self.clone(),
                operation,
            },
        })
    }

    /// Todos whose latest update or delete attempt failed.
    pub fn failed_items(&self) -> Vec<Todo> {
        let state = self.inner.state.borrow();
        let items = state
            .update
            .errors()
            .chain(state.remove.errors())
            .map(|failure| failure.input.clone())
            .collect();
        items
    }

    pub fn view(&self) -> TodoView {
        TodoView {
            todos: self.todos(),
            version: self.version(),
            loading: self.loading(),
            error: self.error(),
        }
    }

    fn spawn_create(&self, draft: Todo) -> JoinHandle<()> {
        let ticket = self.inner.state.borrow_mut().create.begin();
        debug!(operation = "create", "operation invoked");
        let this = self.clone();
        spawn_local(async move {
            let payload = codec::encode(&draft).body;
            let outcome = this.inner.collection.create(&payload).await;
            let mut state = this.inner.state.borrow_mut();
            match &outcome {
                Ok(created) => {
                    state.list.append_created(created.clone());
                }
                Err(error) => warn!(operation = "create", %error, "remote call failed"),
            }
            state.create.settle(ticket, draft, outcome);
            debug!(operation = "create", "operation settled");
        })
    }

    fn spawn_update(&self, batch: Vec<Todo>) -> JoinHandle<()> {
        let ticket = self.inner.state.borrow_mut().update.begin();
        debug!(operation = "update", batch = batch.len(), "operation invoked");
        let this = self.clone();
        spawn_local(async move {
            let collection = Rc::clone(&this.inner.collection);
            let outcome = run_batch(batch, |todo| {
                let collection = Rc::clone(&collection);
                async move {
                    match todo.id {
                        Some(id) => collection.update(id, &codec::encode(&todo).body).await,
                        None => Err(ApiError::Unsaved),
                    }
                }
            })
            .await;
            log_failures(Operation::Update, &outcome);
            let mut state = this.inner.state.borrow_mut();
            state.list.apply_updates(&outcome.succeeded);
            state.update.settle(ticket, outcome);
        })
    }

    fn spawn_remove(&self, batch: Vec<Todo>) -> JoinHandle<()> {
        let ticket = self.inner.state.borrow_mut().remove.begin();
        debug!(operation = "remove", batch = batch.len(), "operation invoked");
        let this = self.clone();
        spawn_local(async move {
            let collection = Rc::clone(&this.inner.collection);
            let outcome = run_batch(batch, |todo| {
                let collection = Rc::clone(&collection);
                async move {
                    match todo.id {
                        Some(id) => collection.delete(id).await.map(|()| todo),
                        None => Err(ApiError::Unsaved),
                    }
                }
            })
            .await;
            log_failures(Operation::Remove, &outcome);
            let mut state = this.inner.state.borrow_mut();
            state.list.apply_removals(&outcome.succeeded);
            state.update.forget(&outcome.succeeded);
            state.remove.settle(ticket, outcome);
        })
    }
}

fn log_failures(operation: Operation, outcome: &BatchOutcome) {
    for failure in &outcome.failed {
        warn!(
            operation = operation.name(),
            id = ?failure.input.id,
            error = %failure.error,
            "remote call failed"
        );
    }
    debug!(
        operation = operation.name(),
        succeeded = outcome.succeeded.len(),
        failed = outcome.failed.len(),
        "operation settled"
    );
}
