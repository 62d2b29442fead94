//! Route parsing and upstream forwarding for the /api/mail surface
//!
//! The relay adds nothing of its own: it checks for a bearer header where
//! one is required, forwards the request to the provider, and hands the
//! provider's status back unchanged with a generic error body.

use anyhow::{Context, Result};
use tiny_http::Method;

/// Path prefix all relayed routes live under
pub const ROUTE_PREFIX: &str = "/api/mail";

/// A relayed operation, parsed from method + URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Domains,
    CreateAccount,
    ObtainToken,
    ListMessages { page: u32 },
    GetMessage { id: String },
    MarkMessage { id: String },
    /// CORS preflight for any relayed path
    Preflight,
}

impl Route {
    /// Parse a request line into a route; None means 404
    pub fn parse(method: &Method, url: &str) -> Option<Route> {
        let (path, query) = match url.split_once('?') {
            Some((path, query)) => (path, Some(query)),
            None => (url, None),
        };

        let rest = path.strip_prefix(ROUTE_PREFIX)?;

        if *method == Method::Options {
            return Some(Route::Preflight);
        }

        match (method, rest) {
            (Method::Get, "/domains") => Some(Route::Domains),
            (Method::Post, "/accounts") => Some(Route::CreateAccount),
            (Method::Post, "/token") => Some(Route::ObtainToken),
            (Method::Get, "/messages") => {
                let page = query
                    .and_then(|q| query_param(q, "page"))
                    .and_then(|p| p.parse().ok())
                    .unwrap_or(1);
                Some(Route::ListMessages { page })
            }
            (method, rest) => {
                let id = rest.strip_prefix("/messages/").filter(|id| !id.is_empty())?;
                match method {
                    Method::Get => Some(Route::GetMessage { id: id.to_string() }),
                    Method::Patch => Some(Route::MarkMessage { id: id.to_string() }),
                    _ => None,
                }
            }
        }
    }

    /// Whether the route needs an Authorization header before forwarding
    pub fn requires_auth(&self) -> bool {
        matches!(
            self,
            Route::ListMessages { .. } | Route::GetMessage { .. } | Route::MarkMessage { .. }
        )
    }

    /// Generic error message used when the provider rejects this route
    fn failure_message(&self) -> &'static str {
        match self {
            Route::Domains => "Failed to fetch domains",
            Route::CreateAccount => "Failed to create account",
            Route::ObtainToken => "Failed to obtain token",
            Route::ListMessages { .. } => "Failed to fetch messages",
            Route::GetMessage { .. } => "Failed to fetch message",
            Route::MarkMessage { .. } => "Failed to update message",
            Route::Preflight => "Not found",
        }
    }
}

/// Extract a query-string parameter value
fn query_param(query: &str, name: &str) -> Option<String> {
    query.split('&').find_map(|param| {
        let mut parts = param.split('=');
        if parts.next() == Some(name) {
            parts.next().map(|s| s.to_string())
        } else {
            None
        }
    })
}

/// Status and JSON body headed back to the caller
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub status: u16,
    pub body: String,
}

impl Reply {
    /// Successful passthrough of an upstream JSON body
    pub fn ok(status: u16, body: String) -> Reply {
        Reply { status, body }
    }

    /// `{"error": ...}` body with the given status
    pub fn error(status: u16, message: &str) -> Reply {
        Reply {
            status,
            body: serde_json::json!({ "error": message }).to_string(),
        }
    }

    /// Empty 204 (preflight)
    pub fn no_content() -> Reply {
        Reply {
            status: 204,
            body: String::new(),
        }
    }
}

/// The 401 sent when a protected route arrives without a bearer header
pub fn missing_auth() -> Reply {
    Reply::error(401, "Authorization header required")
}

/// CORS headers attached to every reply
pub fn cors_headers() -> [(&'static str, &'static str); 3] {
    [
        ("Access-Control-Allow-Origin", "*"),
        ("Access-Control-Allow-Methods", "GET, POST, PATCH, OPTIONS"),
        ("Access-Control-Allow-Headers", "Authorization, Content-Type"),
    ]
}

/// Connection to the provider API
pub struct Upstream {
    agent: ureq::Agent,
    base_url: String,
}

impl Upstream {
    /// Create an upstream against the given provider base URL
    pub fn new(base_url: impl Into<String>) -> Self {
        // Provider 4xx/5xx must pass through as replies, not surface as
        // transport errors
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .build()
            .new_agent();

        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self { agent, base_url }
    }

    /// Forward a parsed route to the provider and shape the reply.
    ///
    /// `auth` must be present for routes where
    /// [`Route::requires_auth`] is true; the caller checks that first.
    pub fn forward(&self, route: &Route, auth: Option<&str>, body: Option<&str>) -> Result<Reply> {
        let result = match route {
            Route::Domains => self.get("/domains", auth),
            Route::CreateAccount => self.post_json("/accounts", body),
            Route::ObtainToken => self.post_json("/token", body),
            Route::ListMessages { page } => self.get(&format!("/messages?page={}", page), auth),
            Route::GetMessage { id } => self.get(&format!("/messages/{}", id), auth),
            Route::MarkMessage { id } => self.merge_patch(&format!("/messages/{}", id), auth, body),
            Route::Preflight => return Ok(Reply::no_content()),
        };

        let mut response = result.context("Upstream request failed")?;
        let status = response.status().as_u16();

        if status == 401 {
            return Ok(Reply::error(401, "Unauthorized"));
        }
        if !(200..300).contains(&status) {
            return Ok(Reply::error(status, route.failure_message()));
        }

        let body = response
            .body_mut()
            .read_to_string()
            .context("Failed to read upstream response")?;
        Ok(Reply::ok(status, body))
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn get(
        &self,
        path: &str,
        auth: Option<&str>,
    ) -> Result<ureq::http::Response<ureq::Body>, ureq::Error> {
        let mut request = self.agent.get(&self.url(path));
        if let Some(auth) = auth {
            request = request.header("Authorization", auth);
        }
        request.call()
    }

    fn post_json(
        &self,
        path: &str,
        body: Option<&str>,
    ) -> Result<ureq::http::Response<ureq::Body>, ureq::Error> {
        self.agent
            .post(&self.url(path))
            .header("Content-Type", "application/json")
            .send(body.unwrap_or("{}"))
    }

    fn merge_patch(
        &self,
        path: &str,
        auth: Option<&str>,
        body: Option<&str>,
    ) -> Result<ureq::http::Response<ureq::Body>, ureq::Error> {
        let mut request = self
            .agent
            .patch(&self.url(path))
            .header("Content-Type", "application/merge-patch+json");
        if let Some(auth) = auth {
            request = request.header("Authorization", auth);
        }
        request.send(body.unwrap_or("{}"))
    }
}
