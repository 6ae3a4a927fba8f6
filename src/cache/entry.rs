use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::http::Response;

/// Serialized metadata for one cached response.
///
/// The body lives in a sibling blob file; `body_len` is recorded so a
/// truncated blob can be detected and treated as a miss. `cached_at` is
/// informational only - entries never expire, whole generations are
/// deleted instead.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CachedEntry {
    pub key: String,
    pub url: String,
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body_len: u64,
    pub cached_at: DateTime<Utc>,
}

impl CachedEntry {
    pub fn from_response(key: &str, response: &Response) -> Self {
        Self {
            key: key.to_string(),
            url: response.url.clone(),
            status: response.status,
            headers: response.headers.clone(),
            body_len: response.body.len() as u64,
            cached_at: Utc::now(),
        }
    }

    /// Reassemble the captured response around its body blob.
    pub fn into_response(self, body: Vec<u8>) -> Response {
        Response::new(self.status, self.headers, body, self.url)
    }
}
