#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use chrono::Utc;
use crewboard_api::config::{LogFormat, ServerConfig, SimulationConfig};
use crewboard_api::engine::{ExecutionSupervisor, MarkdownReport, ReportGenerator};
use crewboard_api::router::build_app_router;
use crewboard_api::state::AppState;
use crewboard_core::types::Timestamp;
use crewboard_db::models::agent::Agent;
use crewboard_db::models::crew::Crew;
use crewboard_db::models::execution::{Execution, ExecutionFilter};
use crewboard_db::models::task::Task;
use crewboard_db::{DbPool, ExecutionCounts, ExecutionStore, SqlExecutionStore, StoreError};
use crewboard_events::{BroadcastRouter, ConnectionRegistry, ExecutionEvent, Outbound, OutboundReceiver};
use http_body_util::BodyExt;
use tower::ServiceExt;

// ---------------------------------------------------------------------------
// HTTP app
// ---------------------------------------------------------------------------

/// Build a test `ServerConfig` with safe defaults and millisecond pacing.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        database_url: "sqlite::memory:".to_string(),
        cors_origins: vec!["http://localhost:3000".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 5,
        heartbeat_interval_secs: 30,
        log_format: LogFormat::Pretty,
        environment: "test".to_string(),
        simulation: SimulationConfig::fixed(5),
    }
}

pub async fn test_pool() -> DbPool {
    let pool = crewboard_db::create_pool("sqlite::memory:")
        .await
        .expect("in-memory pool");
    crewboard_db::run_migrations(&pool)
        .await
        .expect("migrations apply");
    pool
}

/// Application state backed by `pool`, wired the same way as `main.rs`.
pub fn build_test_state(pool: DbPool) -> AppState {
    build_test_state_with(pool, test_config().simulation)
}

/// Like [`build_test_state`] with explicit step pacing.
pub fn build_test_state_with(pool: DbPool, simulation: SimulationConfig) -> AppState {
    let config = ServerConfig {
        simulation,
        ..test_config()
    };
    let registry = Arc::new(ConnectionRegistry::new());
    let router = Arc::new(BroadcastRouter::new(Arc::clone(&registry)));
    let supervisor = Arc::new(ExecutionSupervisor::new(
        Arc::new(SqlExecutionStore::new(pool.clone())),
        Arc::clone(&router),
        Arc::new(MarkdownReport),
        config.simulation,
    ));

    AppState {
        pool,
        config: Arc::new(config),
        registry,
        router,
        supervisor,
        started_at: Utc::now(),
    }
}

/// Build the full application router with all middleware layers.
pub fn build_test_app(state: AppState) -> Router {
    let config = test_config();
    build_app_router(state, &config)
}

pub async fn send(app: Router, method: Method, uri: &str, body: Option<serde_json::Value>) -> Response {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response {
    send(app, Method::GET, uri, None).await
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response {
    send(app, Method::POST, uri, Some(body)).await
}

pub async fn post(app: Router, uri: &str) -> Response {
    send(app, Method::POST, uri, None).await
}

pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Create a crew with the given agents and tasks through the API and return
/// its id.
pub async fn create_crew(app: Router, name: &str, agents: &[&str], tasks: &[&str]) -> String {
    let agents: Vec<_> = agents
        .iter()
        .map(|a| serde_json::json!({"name": a, "role": "Researcher", "goal": "Find sources"}))
        .collect();
    let tasks: Vec<_> = tasks
        .iter()
        .map(|t| {
            serde_json::json!({
                "name": t,
                "description": "Summarize findings",
                "expected_output": "A report",
            })
        })
        .collect();
    let response = post_json(
        app,
        "/api/v1/crews",
        serde_json::json!({"name": name, "agents": agents, "tasks": tasks}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["data"]["id"]
        .as_str()
        .unwrap()
        .to_string()
}

// ---------------------------------------------------------------------------
// In-memory record store
// ---------------------------------------------------------------------------

#[derive(Default)]
struct Records {
    crews: HashMap<String, Crew>,
    agents: HashMap<String, Vec<Agent>>,
    tasks: HashMap<String, Vec<Task>>,
    executions: HashMap<String, Execution>,
    /// Every successful save, in order.
    history: Vec<Execution>,
}

/// [`ExecutionStore`] held in memory. None of its methods yield, which keeps
/// scheduling on a current-thread runtime predictable.
#[derive(Clone, Default)]
pub struct MemoryStore {
    records: Arc<Mutex<Records>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a crew with `agents` and `tasks` (by name) and return it.
    pub fn seed_crew(&self, name: &str, agents: &[&str], tasks: &[&str]) -> Crew {
        let now = Utc::now();
        let crew = Crew {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.to_string(),
            description: Some("Seeded crew".to_string()),
            status: "active".to_string(),
            category: None,
            rating: 0,
            featured: false,
            executions: 0,
            last_executed: None,
            created_at: now,
            updated_at: now,
        };
        let agents = agents
            .iter()
            .map(|n| Agent {
                id: uuid::Uuid::new_v4().to_string(),
                crew_id: crew.id.clone(),
                name: n.to_string(),
                role: "Researcher".to_string(),
                goal: "Find sources".to_string(),
                backstory: None,
                tools: vec![],
                max_iterations: 5,
                temperature: 0.7,
                model: "test-model".to_string(),
                status: "active".to_string(),
                created_at: now,
                updated_at: now,
            })
            .collect();
        let tasks = tasks
            .iter()
            .map(|n| Task {
                id: uuid::Uuid::new_v4().to_string(),
                crew_id: crew.id.clone(),
                name: n.to_string(),
                description: "Summarize findings".to_string(),
                expected_output: "A report".to_string(),
                assigned_agent: None,
                priority: "medium".to_string(),
                context: None,
                output_format: "text".to_string(),
                status: "pending".to_string(),
                created_at: now,
                updated_at: now,
            })
            .collect();

        let mut records = self.records.lock().unwrap();
        records.crews.insert(crew.id.clone(), crew.clone());
        records.agents.insert(crew.id.clone(), agents);
        records.tasks.insert(crew.id.clone(), tasks);
        crew
    }

    /// Drop an execution record, as if deleted behind the engine's back.
    pub fn remove_execution(&self, id: &str) {
        self.records.lock().unwrap().executions.remove(id);
    }

    /// Snapshot of every saved version of one execution, oldest first.
    pub fn history_of(&self, id: &str) -> Vec<Execution> {
        self.records
            .lock()
            .unwrap()
            .history
            .iter()
            .filter(|e| e.id == id)
            .cloned()
            .collect()
    }

    pub fn stored(&self, id: &str) -> Option<Execution> {
        self.records.lock().unwrap().executions.get(id).cloned()
    }
}

#[async_trait]
impl ExecutionStore for MemoryStore {
    async fn get_crew(&self, id: &str) -> Result<Crew, StoreError> {
        self.records
            .lock()
            .unwrap()
            .crews
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::not_found("Crew", id))
    }

    async fn get_agents(&self, crew_id: &str) -> Result<Vec<Agent>, StoreError> {
        Ok(self.records.lock().unwrap().agents.get(crew_id).cloned().unwrap_or_default())
    }

    async fn get_tasks(&self, crew_id: &str) -> Result<Vec<Task>, StoreError> {
        Ok(self.records.lock().unwrap().tasks.get(crew_id).cloned().unwrap_or_default())
    }

    async fn get_execution(&self, id: &str) -> Result<Execution, StoreError> {
        self.stored(id).ok_or_else(|| StoreError::not_found("Execution", id))
    }

    async fn list_executions(&self, filter: &ExecutionFilter) -> Result<Vec<Execution>, StoreError> {
        let records = self.records.lock().unwrap();
        let mut list: Vec<_> = records
            .executions
            .values()
            .filter(|e| filter.status.map_or(true, |s| e.status == s))
            .cloned()
            .collect();
        list.sort_by(|a, b| b.started_at.cmp(&a.started_at));
        Ok(list)
    }

    async fn create_execution(&self, execution: &Execution) -> Result<(), StoreError> {
        let mut records = self.records.lock().unwrap();
        records.executions.insert(execution.id.clone(), execution.clone());
        records.history.push(execution.clone());
        Ok(())
    }

    async fn save(&self, execution: &Execution) -> Result<(), StoreError> {
        let mut records = self.records.lock().unwrap();
        match records.executions.get_mut(&execution.id) {
            Some(slot) => {
                *slot = execution.clone();
                records.history.push(execution.clone());
                Ok(())
            }
            None => Err(StoreError::not_found("Execution", execution.id.as_str())),
        }
    }

    async fn record_crew_run(&self, crew_id: &str, at: Timestamp) -> Result<(), StoreError> {
        let mut records = self.records.lock().unwrap();
        let crew = records
            .crews
            .get_mut(crew_id)
            .ok_or_else(|| StoreError::not_found("Crew", crew_id))?;
        crew.executions += 1;
        crew.last_executed = Some(at);
        Ok(())
    }

    async fn execution_counts(&self) -> Result<ExecutionCounts, StoreError> {
        let mut counts = ExecutionCounts::default();
        for execution in self.records.lock().unwrap().executions.values() {
            *counts.by_status.entry(execution.status).or_insert(0) += 1;
        }
        Ok(counts)
    }
}

// ---------------------------------------------------------------------------
// Engine harness
// ---------------------------------------------------------------------------

/// A supervisor over a [`MemoryStore`] plus the fan-out it publishes to.
pub struct Engine {
    pub store: MemoryStore,
    pub registry: Arc<ConnectionRegistry>,
    pub router: Arc<BroadcastRouter>,
    pub supervisor: ExecutionSupervisor,
}

pub fn engine(step_ms: u64) -> Engine {
    engine_with_reports(step_ms, Arc::new(MarkdownReport))
}

pub fn engine_with_reports(step_ms: u64, reports: Arc<dyn ReportGenerator>) -> Engine {
    let store = MemoryStore::new();
    let registry = Arc::new(ConnectionRegistry::new());
    let router = Arc::new(BroadcastRouter::new(Arc::clone(&registry)));
    let supervisor = ExecutionSupervisor::new(
        Arc::new(store.clone()),
        Arc::clone(&router),
        reports,
        SimulationConfig::fixed(step_ms),
    );
    Engine {
        store,
        registry,
        router,
        supervisor,
    }
}

/// Decode everything currently queued for a connection.
pub fn drain_events(rx: &mut OutboundReceiver) -> Vec<ExecutionEvent> {
    let mut events = Vec::new();
    while let Ok(outbound) = rx.try_recv() {
        if let Outbound::Text(text) = outbound {
            events.push(serde_json::from_str(&text).unwrap());
        }
    }
    events
}

/// Wait for the next event on a connection, failing the test after a second.
pub async fn next_event(rx: &mut OutboundReceiver) -> ExecutionEvent {
    loop {
        let outbound = tokio::time::timeout(Duration::from_secs(1), rx.recv())
            .await
            .expect("event within 1s")
            .expect("channel open");
        if let Outbound::Text(text) = outbound {
            return serde_json::from_str(&text).unwrap();
        }
    }
}
