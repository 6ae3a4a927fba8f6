//! Hosting-runtime adapter.
//!
//! Wires install/activate/fetch events onto the worker service object.
//! Each event carries a completion that stays open until the corresponding
//! work resolves, mirroring the platform's wait-until contract. A client
//! registry models the already-open pages and the claim that re-points
//! them at a newly activated worker without a reload.

pub mod adapter;
pub mod clients;
pub mod event;

pub use adapter::{EventLoop, RuntimeHandle};
pub use clients::ClientRegistry;
pub use event::{FetchEvent, WorkerEvent, WorkerPhase};
