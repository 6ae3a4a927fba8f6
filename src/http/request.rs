use std::fmt;

use serde::{Deserialize, Serialize};

pub use reqwest::Url;

/// HTTP method of an intercepted request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Method {
    Get,
    Head,
    Post,
    Put,
    Delete,
    Options,
    Patch,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Head => "HEAD",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
            Method::Options => "OPTIONS",
            Method::Patch => "PATCH",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How the request was initiated; `Navigate` marks top-level page loads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RequestMode {
    Navigate,
    SameOrigin,
    NoCors,
    Cors,
}

/// What kind of resource the request is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Destination {
    Document,
    Script,
    Style,
    Image,
    Font,
    Manifest,
    Other,
}

/// An immutable description of one resource fetch.
///
/// The URL is normalized at construction; a request's [`cache_key`] is the
/// exact identity a cached entry is stored under and matched against.
///
/// [`cache_key`]: Request::cache_key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    method: Method,
    url: Url,
    mode: RequestMode,
    destination: Destination,
}

impl Request {
    pub fn new(method: Method, mut url: Url, mode: RequestMode, destination: Destination) -> Self {
        // Fragments never reach the server and are not part of cache identity.
        url.set_fragment(None);
        Self {
            method,
            url,
            mode,
            destination,
        }
    }

    /// A top-level document load.
    pub fn navigate(url: Url) -> Self {
        Self::new(Method::Get, url, RequestMode::Navigate, Destination::Document)
    }

    /// A subresource GET (script, style, image, ...).
    pub fn get(url: Url, destination: Destination) -> Self {
        Self::new(Method::Get, url, RequestMode::NoCors, destination)
    }

    pub fn method(&self) -> Method {
        self.method
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn mode(&self) -> RequestMode {
        self.mode
    }

    pub fn destination(&self) -> Destination {
        self.destination
    }

    /// Whether this request loads a top-level document, which selects the
    /// network-first interception path.
    pub fn is_navigation(&self) -> bool {
        self.mode == RequestMode::Navigate || self.destination == Destination::Document
    }

    /// Exact-match identity a cached entry is stored under.
    pub fn cache_key(&self) -> String {
        format!("{} {}", self.method, self.url)
    }
}
