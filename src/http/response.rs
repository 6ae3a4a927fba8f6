use std::borrow::Cow;

/// Body of the synthesized placeholder returned when a navigation misses
/// both the network and the cache.
const OFFLINE_BODY: &str =
    "Service unavailable: the planning app is offline and this page is not cached.";

/// A captured HTTP response: status, headers, and a fully buffered body.
///
/// The network hands back a single-consumption stream; buffering it here is
/// what makes [`duplicate`] possible, so one copy can go to the cache while
/// the original goes back to the page.
///
/// [`duplicate`]: Response::duplicate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
    /// Final URL after any redirects; informational only.
    pub url: String,
}

impl Response {
    pub fn new(
        status: u16,
        headers: Vec<(String, String)>,
        body: Vec<u8>,
        url: impl Into<String>,
    ) -> Self {
        Self {
            status,
            headers,
            body,
            url: url.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Case-insensitive header lookup; returns the first match.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn content_type(&self) -> Option<&str> {
        self.header("content-type")
    }

    /// The explicit copy taken before a response is both cached and
    /// returned to the page.
    pub fn duplicate(&self) -> Response {
        self.clone()
    }

    /// Body decoded as UTF-8, lossily.
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }

    /// Synthesized 503 for a navigation that missed both the network and
    /// the cache. Plain text, so the browser renders it rather than
    /// leaving the request unresolved.
    pub fn offline_placeholder() -> Response {
        Response {
            status: 503,
            headers: vec![("content-type".to_string(), "text/plain".to_string())],
            body: OFFLINE_BODY.as_bytes().to_vec(),
            url: String::new(),
        }
    }
}
