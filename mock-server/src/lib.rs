//! In-memory stand-in for the remote todo collection.
//!
//! Serves `GET/POST /todos` and `PUT/PATCH/DELETE /todos/{id}`. Todos are
//! listed in creation order. With a non-zero `fault_rate`, each request
//! fails with 503 at that probability before reaching a handler, which is
//! how client retry paths get exercised by hand.

use std::sync::Arc;

use axum::{
    extract::{Path, Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::{debug, warn};
use uuid::Uuid;

pub const DEFAULT_PORT: u16 = 3000;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Todo {
    pub id: Uuid,
    pub title: String,
    pub completed: bool,
}

#[derive(Deserialize)]
pub struct CreateTodo {
    pub title: String,
    #[serde(default)]
    pub completed: bool,
}

/// Only the fields present in the JSON are applied.
#[derive(Deserialize)]
pub struct UpdateTodo {
    pub title: Option<String>,
    pub completed: Option<bool>,
}

/// Runtime settings, read from the environment by the binary.
#[derive(Clone, Debug, PartialEq)]
pub struct ServerConfig {
    pub port: u16,
    /// Probability in `[0, 1]` that a request is answered with 503.
    pub fault_rate: f64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            fault_rate: 0.0,
        }
    }
}

impl ServerConfig {
    /// Reads `PORT` and `FAULT_RATE`. Missing or unparsable values fall back
    /// to the defaults.
    pub fn from_env() -> Self {
        Self::from_vars(
            std::env::var("PORT").ok().as_deref(),
            std::env::var("FAULT_RATE").ok().as_deref(),
        )
    }

    pub fn from_vars(port: Option<&str>, fault_rate: Option<&str>) -> Self {
        let defaults = Self::default();
        let port = port
            .and_then(|raw| raw.trim().parse().ok())
            .unwrap_or(defaults.port);
        let fault_rate = fault_rate
            .and_then(|raw| raw.trim().parse::<f64>().ok())
            .filter(|rate| !rate.is_nan())
            .map_or(defaults.fault_rate, |rate| rate.clamp(0.0, 1.0));
        Self { port, fault_rate }
    }
}

pub type Db = Arc<RwLock<Vec<Todo>>>;

#[derive(Clone)]
struct AppState {
    db: Db,
    fault_rate: f64,
}

pub fn app() -> Router {
    app_with(&ServerConfig::default())
}

pub fn app_with(config: &ServerConfig) -> Router {
    let state = AppState {
        db: Arc::new(RwLock::new(Vec::new())),
        fault_rate: config.fault_rate,
    };
    Router::new()
        .route("/todos", get(list_todos).post(create_todo))
        .route("/todos/{id}", put(update_todo).patch(update_todo).delete(delete_todo))
        .layer(middleware::from_fn_with_state(state.clone(), inject_faults))
        .with_state(state)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    run_with(listener, ServerConfig::default()).await
}

pub async fn run_with(listener: TcpListener, config: ServerConfig) -> Result<(), std::io::Error> {
    axum::serve(listener, app_with(&config)).await
}

async fn inject_faults(State(state): State<AppState>, request: Request, next: Next) -> Response {
    if state.fault_rate > 0.0 && rand::random::<f64>() < state.fault_rate {
        warn!(method = %request.method(), uri = %request.uri(), "injecting fault");
        return (StatusCode::SERVICE_UNAVAILABLE, "injected fault").into_response();
    }
    next.run(request).await
}

async fn list_todos(State(state): State<AppState>) -> Json<Vec<Todo>> {
    Json(state.db.read().await.clone())
}

async fn create_todo(
    State(state): State<AppState>,
    Json(input): Json<CreateTodo>,
) -> (StatusCode, Json<Todo>) {
    let todo = Todo {
        id: Uuid::new_v4(),
        title: input.title,
        completed: input.completed,
    };
    state.db.write().await.push(todo.clone());
    debug!(id = %todo.id, "created");
    (StatusCode::CREATED, Json(todo))
}

async fn update_todo(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateTodo>,
) -> Result<Json<Todo>, StatusCode> {
    let mut todos = state.db.write().await;
    let todo = todos
        .iter_mut()
        .find(|todo| todo.id == id)
        .ok_or(StatusCode::NOT_FOUND)?;
    if let Some(title) = input.title {
        todo.title = title;
    }
    if let Some(completed) = input.completed {
        todo.completed = completed;
    }
    debug!(%id, "updated");
    Ok(Json(todo.clone()))
}

async fn delete_todo(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, StatusCode> {
    let mut todos = state.db.write().await;
    let at = todos
        .iter()
        .position(|todo| todo.id == id)
        .ok_or(StatusCode::NOT_FOUND)?;
    todos.remove(at);
    debug!(%id, "deleted");
    Ok(StatusCode::NO_CONTENT)
}
