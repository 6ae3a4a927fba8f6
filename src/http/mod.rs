//! HTTP request/response model for intercepted traffic.
//!
//! These types are deliberately small: an immutable request description
//! carrying the classification the interception strategies branch on, and
//! a response whose body is fully buffered so the single-consumption
//! network stream can be duplicated before it is both cached and returned
//! to the page.

pub mod request;
pub mod response;

pub use request::{Destination, Method, Request, RequestMode, Url};
pub use response::Response;
