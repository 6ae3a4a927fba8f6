//! plancache - offline cache worker for the planning web app.
//!
//! Intercepts the app's resource requests and serves them through a local
//! disk cache so the planning page keeps working without connectivity.
//! Subresources are served cache-first; top-level navigations go
//! network-first with a cache fallback and a synthesized offline
//! placeholder as the last resort.
//!
//! The crate is organized around a single long-lived [`worker::Worker`]
//! service object. The [`runtime`] module adapts hosting-runtime events
//! (install, activate, fetch) onto it, holding each event's completion
//! open until the corresponding work resolves.

pub mod cache;
pub mod config;
pub mod http;
pub mod net;
pub mod runtime;
pub mod worker;

pub use config::WorkerConfig;
pub use http::{Request, Response};
pub use worker::Worker;
