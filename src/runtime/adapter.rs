//! Event loop wiring hosting-runtime events to the worker.
//!
//! Lifecycle events are handled inline, so the dispatching side's future
//! does not resolve until the work is done (the wait-until contract).
//! Fetch events run as independent spawned tasks with no inter-request
//! ordering guarantee.

use std::sync::{Arc, Mutex};

use anyhow::Result;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};

use crate::http::{Request, Response};
use crate::net::FetchError;
use crate::worker::Worker;

use super::{ClientRegistry, FetchEvent, WorkerEvent, WorkerPhase};

/// Buffer size for the runtime event channel.
const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Receives hosting-runtime events and drives the worker.
pub struct EventLoop {
    worker: Worker,
    events: mpsc::Receiver<WorkerEvent>,
    clients: Arc<Mutex<ClientRegistry>>,
    phase: Arc<Mutex<WorkerPhase>>,
}

/// Cloneable dispatch side of the runtime: sends events and exposes the
/// client registry and worker phase.
#[derive(Clone)]
pub struct RuntimeHandle {
    events: mpsc::Sender<WorkerEvent>,
    clients: Arc<Mutex<ClientRegistry>>,
    phase: Arc<Mutex<WorkerPhase>>,
}

impl EventLoop {
    pub fn new(worker: Worker) -> (Self, RuntimeHandle) {
        let (tx, rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
        let clients = Arc::new(Mutex::new(ClientRegistry::new()));
        let phase = Arc::new(Mutex::new(WorkerPhase::Idle));

        let handle = RuntimeHandle {
            events: tx,
            clients: Arc::clone(&clients),
            phase: Arc::clone(&phase),
        };
        let event_loop = Self {
            worker,
            events: rx,
            clients,
            phase,
        };
        (event_loop, handle)
    }

    fn set_phase(&self, phase: WorkerPhase) {
        if let Ok(mut current) = self.phase.lock() {
            *current = phase;
        }
    }

    /// Process events until every handle is dropped.
    pub async fn run(mut self) {
        info!("Worker runtime started");

        while let Some(event) = self.events.recv().await {
            match event {
                WorkerEvent::Install(done) => {
                    self.set_phase(WorkerPhase::Installing);
                    let result = self.worker.on_install().await;
                    // Promotion is immediate: a successful install skips
                    // any waiting on existing pages.
                    match &result {
                        Ok(()) => self.set_phase(WorkerPhase::Installed),
                        Err(_) => self.set_phase(WorkerPhase::Idle),
                    }
                    if done.send(result).is_err() {
                        warn!("Install completion dropped before acknowledgement");
                    }
                }
                WorkerEvent::Activate(done) => {
                    self.set_phase(WorkerPhase::Activating);
                    let result = self.worker.on_activate().await;
                    match &result {
                        Ok(()) => {
                            self.set_phase(WorkerPhase::Active);
                            if let Ok(mut clients) = self.clients.lock() {
                                let claimed =
                                    clients.claim(&self.worker.config().cache_name);
                                info!(claimed, "Claimed open clients");
                            }
                        }
                        Err(_) => self.set_phase(WorkerPhase::Installed),
                    }
                    if done.send(result).is_err() {
                        warn!("Activate completion dropped before acknowledgement");
                    }
                }
                WorkerEvent::Fetch(FetchEvent { request, responder }) => {
                    // Each interception is an independent task; nothing
                    // orders one request relative to another.
                    let worker = self.worker.clone();
                    tokio::spawn(async move {
                        let result = worker.on_request(request).await;
                        if responder.send(result).is_err() {
                            debug!("Fetch responder dropped before completion");
                        }
                    });
                }
            }
        }

        info!("Worker runtime stopped");
    }
}

impl RuntimeHandle {
    /// Dispatch an install event and wait until population has finished.
    pub async fn install(&self) -> Result<()> {
        let (done, ack) = oneshot::channel();
        self.events
            .send(WorkerEvent::Install(done))
            .await
            .map_err(|_| anyhow::anyhow!("Worker runtime is not running"))?;
        ack.await
            .map_err(|_| anyhow::anyhow!("Worker runtime shut down during install"))?
    }

    /// Dispatch an activate event and wait until cleanup and claim finish.
    pub async fn activate(&self) -> Result<()> {
        let (done, ack) = oneshot::channel();
        self.events
            .send(WorkerEvent::Activate(done))
            .await
            .map_err(|_| anyhow::anyhow!("Worker runtime is not running"))?;
        ack.await
            .map_err(|_| anyhow::anyhow!("Worker runtime shut down during activate"))?
    }

    /// Dispatch an intercepted request and wait for its response.
    pub async fn fetch(&self, request: Request) -> Result<Response, FetchError> {
        let (responder, response) = oneshot::channel();
        self.events
            .send(WorkerEvent::Fetch(FetchEvent { request, responder }))
            .await
            .map_err(|_| {
                FetchError::WorkerUnavailable("worker runtime is not running".to_string())
            })?;
        response.await.map_err(|_| {
            FetchError::WorkerUnavailable("worker runtime dropped the request".to_string())
        })?
    }

    /// Register an open page with the runtime.
    pub fn register_client(&self, id: impl Into<String>) {
        if let Ok(mut clients) = self.clients.lock() {
            clients.register(id);
        }
    }

    /// Version token controlling the given client, if any.
    pub fn controller(&self, id: &str) -> Option<String> {
        self.clients
            .lock()
            .ok()
            .and_then(|clients| clients.controller(id).map(String::from))
    }

    pub fn phase(&self) -> WorkerPhase {
        self.phase.lock().map(|phase| *phase).unwrap_or(WorkerPhase::Idle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::CacheStorage;
    use crate::config::WorkerConfig;
    use crate::http::{Destination, Url};
    use crate::net::fetcher::testing::MockFetcher;
    use tempfile::TempDir;

    const CACHE_NAME: &str = "planning-cache-v1";

    fn test_runtime(
        precache: Vec<&str>,
    ) -> (EventLoop, RuntimeHandle, Arc<MockFetcher>, TempDir) {
        let dir = TempDir::new().unwrap();
        let config = WorkerConfig {
            cache_name: CACHE_NAME.to_string(),
            origin: "http://planning.test/".to_string(),
            precache: precache.into_iter().map(String::from).collect(),
        };
        let storage = CacheStorage::open_at(dir.path()).unwrap();
        let fetcher = Arc::new(MockFetcher::new());
        let worker = Worker::new(config, storage, fetcher.clone());
        let (event_loop, handle) = EventLoop::new(worker);
        (event_loop, handle, fetcher, dir)
    }

    #[tokio::test]
    async fn test_lifecycle_advances_phases_and_claims_clients() {
        let (event_loop, handle, fetcher, _dir) = test_runtime(vec!["./index.html"]);
        fetcher.insert_ok("http://planning.test/index.html", "text/html", "<html>");
        let runner = tokio::spawn(event_loop.run());

        handle.register_client("tab-1");
        handle.register_client("tab-2");
        assert_eq!(handle.phase(), WorkerPhase::Idle);
        assert_eq!(handle.controller("tab-1"), None);

        handle.install().await.unwrap();
        assert_eq!(handle.phase(), WorkerPhase::Installed);

        handle.activate().await.unwrap();
        assert_eq!(handle.phase(), WorkerPhase::Active);
        assert_eq!(handle.controller("tab-1"), Some(CACHE_NAME.to_string()));
        assert_eq!(handle.controller("tab-2"), Some(CACHE_NAME.to_string()));

        drop(handle);
        runner.await.unwrap();
    }

    #[tokio::test]
    async fn test_install_completion_waits_for_population() {
        let (event_loop, handle, fetcher, dir) = test_runtime(vec!["./index.html"]);
        fetcher.insert_ok("http://planning.test/index.html", "text/html", "<html>");
        let runner = tokio::spawn(event_loop.run());

        handle.install().await.unwrap();

        // The dispatch future resolved, so the entry must already be there.
        let storage = CacheStorage::open_at(dir.path()).unwrap();
        let cache = storage.open(CACHE_NAME).unwrap();
        let request = Request::get(
            Url::parse("http://planning.test/index.html").unwrap(),
            Destination::Other,
        );
        assert!(cache.contains(&request));

        drop(handle);
        runner.await.unwrap();
    }

    #[tokio::test]
    async fn test_fetch_resolves_through_the_runtime() {
        let (event_loop, handle, fetcher, _dir) = test_runtime(vec![]);
        fetcher.insert_ok("http://planning.test/app.js", "text/javascript", "let x;");
        let runner = tokio::spawn(event_loop.run());

        let request = Request::get(
            Url::parse("http://planning.test/app.js").unwrap(),
            Destination::Script,
        );
        let response = handle.fetch(request).await.unwrap();
        assert_eq!(response.status, 200);
        assert_eq!(response.text(), "let x;");

        drop(handle);
        runner.await.unwrap();
    }

    #[tokio::test]
    async fn test_stopped_runtime_reports_worker_unavailable() {
        let (event_loop, handle, _fetcher, _dir) = test_runtime(vec![]);
        drop(event_loop);

        let request = Request::navigate(Url::parse("http://planning.test/").unwrap());
        let result = handle.fetch(request).await;
        assert!(matches!(result, Err(FetchError::WorkerUnavailable(_))));
    }
}
