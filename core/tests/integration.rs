//! End-to-end synchronization against the live mock server.
//!
//! # Design
//! Starts the mock server on a random port in its own thread, then drives a
//! `TodoStore` over real HTTP. The transport runs ureq on tokio's blocking
//! pool so the store's event loop stays single-threaded.

use async_trait::async_trait;
use mock_server::ServerConfig;
use tokio::task::LocalSet;
use todo_sync::{
    ApiError, Collection, HttpCollection, HttpMethod, HttpRequest, HttpResponse, Todo, TodoStore,
    Transport,
};

/// Execute an `HttpRequest` using ureq and return an `HttpResponse`.
///
/// Disables ureq's automatic status-code-as-error behavior so 4xx/5xx
/// responses are returned as data rather than `Err`, letting the core
/// client handle status interpretation.
fn execute(agent: &ureq::Agent, req: HttpRequest) -> Result<HttpResponse, ApiError> {
    let sent = match (req.method, req.body) {
        (HttpMethod::Get, _) => agent.get(&req.path).call(),
        (HttpMethod::Delete, _) => agent.delete(&req.path).call(),
        (HttpMethod::Post, Some(body)) => {
            agent.post(&req.path).content_type("application/json").send(body.as_bytes())
        }
        (HttpMethod::Post, None) => agent.post(&req.path).send_empty(),
        (HttpMethod::Patch, Some(body)) => {
            agent.patch(&req.path).content_type("application/json").send(body.as_bytes())
        }
        (HttpMethod::Patch, None) => agent.patch(&req.path).send_empty(),
    };
    let mut response = sent.map_err(|e| ApiError::Transport(e.to_string()))?;

    let status = response.status().as_u16();
    let body = response.body_mut().read_to_string().unwrap_or_default();

    Ok(HttpResponse {
        status,
        headers: Vec::new(),
        body,
    })
}

struct Ureq {
    agent: ureq::Agent,
}

impl Ureq {
    fn new() -> Self {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .build()
            .new_agent();
        Self { agent }
    }
}

#[async_trait(?Send)]
impl Transport for Ureq {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        let agent = self.agent.clone();
        tokio::task::spawn_blocking(move || execute(&agent, request))
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?
    }
}

/// Start a mock server on a random port and return its base URL.
fn start_server(config: ServerConfig) -> String {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_server::run_with(listener, config).await
        })
        .unwrap();
    });

    format!("http://{addr}")
}

#[tokio::test]
async fn store_stays_in_step_with_server() {
    let base_url = start_server(ServerConfig::default());

    LocalSet::new()
        .run_until(async {
            let store = TodoStore::new(HttpCollection::new(&base_url, Ureq::new()));
            let remote = HttpCollection::new(&base_url, Ureq::new());

            // Step 1: initial load of an empty collection.
            store.load().await.unwrap();
            assert!(store.todos().is_empty());
            assert!(store.error().is_none());

            // Step 2: create three todos concurrently.
            let handles: Vec<_> = ["milk", "bread", "eggs"]
                .into_iter()
                .map(|title| store.create(Todo::draft(title)))
                .collect();
            assert!(store.loading());
            for handle in handles {
                handle.await.unwrap();
            }
            assert_eq!(store.todos().len(), 3);
            assert!(store.todos().iter().all(|t| t.id.is_some()));

            // Step 3: rename and complete one.
            let milk = store.todos().iter().find(|t| t.title == "milk").cloned().unwrap();
            store
                .update(milk.with_title("oat milk").with_completed(true))
                .await
                .unwrap();
            assert_eq!(store.completed_count(), 1);

            // Step 4: toggle all completes the remaining two.
            store.toggle_all().await.unwrap();
            assert_eq!(store.completed_count(), 3);

            // Step 5: the server agrees, up to ordering.
            let mut ours = store.todos().to_vec();
            let mut theirs = remote.list().await.unwrap();
            ours.sort_by_key(|t| t.id);
            theirs.sort_by_key(|t| t.id);
            assert_eq!(ours, theirs);

            // Step 6: clear completed empties both sides.
            store.clear_completed().await.unwrap();
            assert!(store.todos().is_empty());
            assert!(remote.list().await.unwrap().is_empty());
            assert!(store.error().is_none());
            assert!(!store.loading());
        })
        .await;
}

#[tokio::test]
async fn server_faults_surface_as_retryable_errors() {
    let base_url = start_server(ServerConfig {
        fault_rate: 1.0,
        ..ServerConfig::default()
    });

    LocalSet::new()
        .run_until(async {
            let store = TodoStore::new(HttpCollection::new(&base_url, Ureq::new()));

            store.load().await.unwrap();

            let report = store.error().unwrap();
            assert_eq!(report.message, "fetch failed");
            assert!(matches!(report.cause, ApiError::HttpError { status: 503, .. }));
            assert!(report.retry.run().is_some());
        })
        .await;
}
