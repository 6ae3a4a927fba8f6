//! The worker service object.
//!
//! Owns the current cache generation, the network fetcher, and the
//! interception policy. All state is passed in explicitly through
//! [`WorkerConfig`]; there is no global version token.

use std::sync::{Arc, Mutex};

use anyhow::Result;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::cache::{Cache, CacheStorage};
use crate::config::WorkerConfig;
use crate::http::{Destination, Request, Response, Url};
use crate::net::{FetchError, Fetcher};

use super::Strategy;

/// The offline caching worker.
///
/// Clone is cheap - the fetcher and the background task tracker are shared
/// behind `Arc`, and cache storage is just a path.
#[derive(Clone)]
pub struct Worker {
    config: WorkerConfig,
    storage: CacheStorage,
    fetcher: Arc<dyn Fetcher>,
    background: Arc<Mutex<Vec<JoinHandle<()>>>>,
}

impl Worker {
    pub fn new(config: WorkerConfig, storage: CacheStorage, fetcher: Arc<dyn Fetcher>) -> Self {
        Self {
            config,
            storage,
            fetcher,
            background: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn config(&self) -> &WorkerConfig {
        &self.config
    }

    fn current_cache(&self) -> Result<Cache> {
        self.storage.open(&self.config.cache_name)
    }

    /// Resolve the precache manifest into concrete GET requests. Invalid
    /// locators are logged and skipped.
    fn precache_requests(&self) -> Vec<Request> {
        let base = match Url::parse(&self.config.origin) {
            Ok(base) => base,
            Err(e) => {
                warn!(origin = %self.config.origin, error = %e, "Invalid app origin, nothing to precache");
                return Vec::new();
            }
        };

        self.config
            .precache
            .iter()
            .filter_map(|locator| match base.join(locator) {
                Ok(url) => Some(Request::get(url, Destination::Other)),
                Err(e) => {
                    warn!(locator = %locator, error = %e, "Invalid precache locator, skipping");
                    None
                }
            })
            .collect()
    }

    /// Install: open the cache named by the current version token and
    /// populate it from the precache manifest. Individual fetch failures
    /// never abort installation.
    pub async fn on_install(&self) -> Result<()> {
        info!(cache = %self.config.cache_name, "Installing");

        let cache = self.current_cache()?;
        let requests = self.precache_requests();
        let stored = cache.add_all(self.fetcher.as_ref(), &requests).await;

        info!(stored, total = requests.len(), "Initial cache population finished");
        Ok(())
    }

    /// Activate: delete every cache generation whose name is not the
    /// current version token. A failed deletion is logged and skipped.
    pub async fn on_activate(&self) -> Result<()> {
        info!(cache = %self.config.cache_name, "Activating");

        for name in self.storage.names()? {
            if name != self.config.cache_name {
                info!(cache = %name, "Deleting stale cache");
                if let Err(e) = self.storage.delete(&name) {
                    warn!(cache = %name, error = %e, "Failed to delete stale cache");
                }
            }
        }
        Ok(())
    }

    /// Serve one intercepted request through the strategy selected for it.
    ///
    /// The network-first path always produces a response; only the
    /// cache-first path can surface a network failure to the page.
    pub async fn on_request(&self, request: Request) -> Result<Response, FetchError> {
        match Strategy::for_request(&request) {
            Strategy::NetworkFirst => Ok(self.network_first(request).await),
            Strategy::CacheFirst => self.cache_first(request).await,
        }
    }

    /// Navigation path: live network wins; the cache, then the offline
    /// placeholder, back it up.
    async fn network_first(&self, request: Request) -> Response {
        match self.fetcher.fetch(&request).await {
            Ok(response) => {
                let copy = response.duplicate();
                self.spawn_cache_put(request, copy);
                response
            }
            Err(e) => {
                warn!(url = %request.url(), error = %e, "Navigation fetch failed, falling back to cache");
                match self.lookup(&request) {
                    Some(cached) => cached,
                    None => Response::offline_placeholder(),
                }
            }
        }
    }

    /// Subresource path: cache hit wins outright; a miss goes to the
    /// network once, and a failure there propagates - masking it could
    /// corrupt the page's state.
    async fn cache_first(&self, request: Request) -> Result<Response, FetchError> {
        if let Some(cached) = self.lookup(&request) {
            debug!(url = %request.url(), "Cache hit");
            return Ok(cached);
        }

        debug!(url = %request.url(), "Cache miss, fetching");
        match self.fetcher.fetch(&request).await {
            Ok(response) => Ok(response),
            Err(e) => {
                warn!(url = %request.url(), error = %e, "Subresource fetch failed");
                Err(e)
            }
        }
    }

    fn lookup(&self, request: &Request) -> Option<Response> {
        match self.current_cache() {
            Ok(cache) => cache.match_request(request),
            Err(e) => {
                warn!(error = %e, "Cache unavailable");
                None
            }
        }
    }

    /// Best-effort background write of a navigation response; no ordering
    /// guarantee relative to the response already returned to the page.
    fn spawn_cache_put(&self, request: Request, response: Response) {
        let storage = self.storage.clone();
        let cache_name = self.config.cache_name.clone();

        let handle = tokio::spawn(async move {
            match storage.open(&cache_name) {
                Ok(cache) => {
                    if let Err(e) = cache.put(&request, &response) {
                        warn!(url = %request.url(), error = %e, "Background cache update failed");
                    }
                }
                Err(e) => warn!(error = %e, "Background cache update could not open cache"),
            }
        });

        if let Ok(mut tasks) = self.background.lock() {
            tasks.retain(|task| !task.is_finished());
            tasks.push(handle);
        }
    }

    /// Await all pending background cache writes. Callers that need the
    /// cache observably updated (tests, shutdown) use this; request
    /// handling never does.
    pub async fn flush_background(&self) {
        let tasks: Vec<JoinHandle<()>> = match self.background.lock() {
            Ok(mut tasks) => tasks.drain(..).collect(),
            Err(_) => return,
        };
        for task in tasks {
            let _ = task.await;
        }
    }
}
