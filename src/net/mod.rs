//! Network fetch layer.
//!
//! [`Fetcher`] is the seam between the worker and the live network; the
//! reqwest-backed [`HttpFetcher`] is the production implementation. Every
//! fetch is a single attempt: no retries, no implemented timeout.

pub mod error;
pub mod fetcher;

pub use error::FetchError;
pub use fetcher::{Fetcher, HttpFetcher};
