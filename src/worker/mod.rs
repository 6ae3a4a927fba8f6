//! The caching worker: cache lifecycle and request interception.
//!
//! `Worker` is the long-lived service object. The hosting runtime calls
//! `on_install` once per new version, `on_activate` when that version takes
//! over, and `on_request` for every intercepted fetch; `Strategy` is the
//! per-request policy choice between the two interception paths.

pub mod service;
pub mod strategy;

pub use service::Worker;
pub use strategy::Strategy;
