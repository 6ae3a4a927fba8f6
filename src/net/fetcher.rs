use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use crate::http::{Method, Request, Response};

use super::FetchError;

/// Issues a request against the live network.
///
/// One attempt per call. No timeout is configured; a hung fetch is bounded
/// only by the operating system's own socket limits.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, request: &Request) -> Result<Response, FetchError>;
}

/// Production fetcher over reqwest.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new() -> Result<Self, FetchError> {
        let client = Client::builder().build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, request: &Request) -> Result<Response, FetchError> {
        debug!(method = %request.method(), url = %request.url(), "Fetching");

        let response = self
            .client
            .request(to_reqwest(request.method()), request.url().clone())
            .send()
            .await
            .map_err(classify)?;

        let status = response.status().as_u16();
        let url = response.url().to_string();
        let headers = response
            .headers()
            .iter()
            .map(|(name, value)| {
                (
                    name.to_string(),
                    String::from_utf8_lossy(value.as_bytes()).into_owned(),
                )
            })
            .collect();
        let body = response.bytes().await.map_err(classify)?.to_vec();

        Ok(Response::new(status, headers, body, url))
    }
}

fn to_reqwest(method: Method) -> reqwest::Method {
    match method {
        Method::Get => reqwest::Method::GET,
        Method::Head => reqwest::Method::HEAD,
        Method::Post => reqwest::Method::POST,
        Method::Put => reqwest::Method::PUT,
        Method::Delete => reqwest::Method::DELETE,
        Method::Options => reqwest::Method::OPTIONS,
        Method::Patch => reqwest::Method::PATCH,
    }
}

/// Connection-level failures get their own variant so callers can tell an
/// unreachable network from a broken exchange.
fn classify(error: reqwest::Error) -> FetchError {
    if error.is_connect() {
        FetchError::Connection(error.to_string())
    } else {
        FetchError::Network(error)
    }
}
