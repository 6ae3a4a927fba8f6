use thiserror::Error;

/// Failure to obtain a response from the network.
///
/// Any HTTP response, whatever its status, counts as a successful fetch;
/// these variants only cover exchanges that produced no response at all.
#[derive(Error, Debug)]
pub enum FetchError {
    /// Transport failure after a connection existed: TLS, protocol, or a
    /// broken body stream.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The connection could not be established at all.
    #[error("Connection failed: {0}")]
    Connection(String),

    /// The worker runtime shut down before the request resolved.
    #[error("Worker unavailable: {0}")]
    WorkerUnavailable(String),
}
