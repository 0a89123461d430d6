//! HTTP transport behind the remote fetchers.
//!
//! All remote modules call through the [`HttpFetch`] trait so unit tests can
//! inject canned responses. Non-2xx statuses are returned as data in
//! [`HttpResponse`]; only transport-level failures (DNS, TLS, timeout) map to
//! an error.

use std::collections::HashMap;
use std::sync::OnceLock;
use std::time::Duration;

use crate::error::{Result, SkilletError};

/// Bounded per-request timeout applied by the shared agent.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

const USER_AGENT: &str = concat!("skillet/", env!("CARGO_PKG_VERSION"));

/// A fetched HTTP response. Header names are lower-cased.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
    headers: HashMap<String, String>,
}

impl HttpResponse {
    pub fn new(status: u16, body: Vec<u8>) -> Self {
        Self {
            status,
            body,
            headers: HashMap::new(),
        }
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers
            .insert(name.to_ascii_lowercase(), value.to_string());
        self
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).to_string()
    }
}

/// Blocking HTTPS GET with an optional bearer token.
pub trait HttpFetch {
    fn get(&self, url: &str, token: Option<&str>) -> Result<HttpResponse>;
}

/// [`HttpFetch`] backed by a shared `ureq` agent.
#[derive(Debug, Default, Clone, Copy)]
pub struct UreqFetcher;

impl HttpFetch for UreqFetcher {
    fn get(&self, url: &str, token: Option<&str>) -> Result<HttpResponse> {
        let mut request = http_agent()
            .get(url)
            .header("User-Agent", USER_AGENT)
            .header("Accept", "application/vnd.github+json");
        if let Some(token) = token {
            request = request.header("Authorization", format!("Bearer {token}"));
        }

        let mut response = request.call().map_err(|err| SkilletError::TransportFailed {
            reason: err.to_string(),
        })?;

        let status = response.status().as_u16();
        let mut headers = HashMap::new();
        for (name, value) in response.headers() {
            if let Ok(value) = value.to_str() {
                headers.insert(name.as_str().to_ascii_lowercase(), value.to_string());
            }
        }

        let mut body = Vec::new();
        std::io::copy(&mut response.body_mut().as_reader(), &mut body).map_err(|err| {
            SkilletError::TransportFailed {
                reason: err.to_string(),
            }
        })?;

        Ok(HttpResponse {
            status,
            body,
            headers,
        })
    }
}

/// Shared `ureq` agent with request timeout configuration. Statuses are
/// never turned into transport errors; callers classify them.
fn http_agent() -> &'static ureq::Agent {
    static AGENT: OnceLock<ureq::Agent> = OnceLock::new();
    AGENT.get_or_init(|| {
        let config = ureq::Agent::config_builder()
            .timeout_global(Some(REQUEST_TIMEOUT))
            .http_status_as_error(false)
            .build();
        ureq::Agent::new_with_config(config)
    })
}

/// Canned-response [`HttpFetch`] for unit tests. Unregistered URLs return
/// 404; every request is recorded.
#[cfg(test)]
pub struct FakeHttp {
    responses: std::cell::RefCell<HashMap<String, HttpResponse>>,
    calls: std::cell::RefCell<Vec<String>>,
}

#[cfg(test)]
impl FakeHttp {
    pub fn new() -> Self {
        Self {
            responses: std::cell::RefCell::new(HashMap::new()),
            calls: std::cell::RefCell::new(Vec::new()),
        }
    }

    pub fn on(&self, url: &str, status: u16, body: impl Into<Vec<u8>>) {
        self.responses
            .borrow_mut()
            .insert(url.to_string(), HttpResponse::new(status, body.into()));
    }

    pub fn on_response(&self, url: &str, response: HttpResponse) {
        self.responses
            .borrow_mut()
            .insert(url.to_string(), response);
    }

    pub fn call_count(&self) -> usize {
        self.calls.borrow().len()
    }

    pub fn requested(&self, url: &str) -> bool {
        self.calls.borrow().iter().any(|u| u == url)
    }
}

#[cfg(test)]
impl HttpFetch for FakeHttp {
    fn get(&self, url: &str, _token: Option<&str>) -> Result<HttpResponse> {
        self.calls.borrow_mut().push(url.to_string());
        Ok(self
            .responses
            .borrow()
            .get(url)
            .cloned()
            .unwrap_or_else(|| HttpResponse::new(404, Vec::new())))
    }
}
