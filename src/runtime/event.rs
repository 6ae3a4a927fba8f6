use tokio::sync::oneshot;

use crate::http::{Request, Response};
use crate::net::FetchError;

/// Lifecycle phase of the worker as tracked by the runtime.
///
/// There is no waiting phase: a successfully installed worker is promoted
/// immediately rather than waiting for existing pages to close.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerPhase {
    Idle,
    Installing,
    Installed,
    Activating,
    Active,
}

/// A fetch interception event. `responder` is the completion token the
/// runtime holds open until a response (or failure) has been supplied.
#[derive(Debug)]
pub struct FetchEvent {
    pub request: Request,
    pub responder: oneshot::Sender<Result<Response, FetchError>>,
}

/// Events delivered by the hosting runtime.
#[derive(Debug)]
pub enum WorkerEvent {
    /// Install the new worker version; acknowledged once cache population
    /// has finished.
    Install(oneshot::Sender<anyhow::Result<()>>),
    /// Activate the worker; acknowledged once stale caches are gone and
    /// open clients are claimed.
    Activate(oneshot::Sender<anyhow::Result<()>>),
    /// An intercepted request awaiting a response.
    Fetch(FetchEvent),
}
