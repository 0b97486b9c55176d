// Scoring platform access over HTTP.
//
// `ScoreSource` is the seam every consumer talks to: one fetch per endpoint,
// answering either the JSON data or a `FetchError`. `HttpSource` is the live
// implementation. It reaches the platform either directly or through a
// same-origin proxy that takes the upstream path as an `endpoint` query
// parameter. There is no retry: one attempt per call.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, COOKIE};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use crate::endpoint::Endpoint;
use crate::error::FetchError;

/// Keyword upstream uses in messages for forbidden resources.
const PERMISSION_KEYWORD: &str = "permission";

// ---------------------------------------------------------------------------
// ScoreSource
// ---------------------------------------------------------------------------

#[async_trait]
pub trait ScoreSource: Send + Sync {
    /// Fetch one endpoint and return its data payload.
    async fn fetch(&self, endpoint: Endpoint) -> Result<Value, FetchError>;
}

#[async_trait]
impl<S: ScoreSource + ?Sized> ScoreSource for Arc<S> {
    async fn fetch(&self, endpoint: Endpoint) -> Result<Value, FetchError> {
        (**self).fetch(endpoint).await
    }
}

/// Deserialize a fetched payload into a typed record.
pub fn decode<T: DeserializeOwned>(endpoint: Endpoint, value: Value) -> Result<T, FetchError> {
    serde_json::from_value(value).map_err(|e| FetchError::Payload {
        endpoint: endpoint.path(),
        message: e.to_string(),
    })
}

// ---------------------------------------------------------------------------
// Route and credentials
// ---------------------------------------------------------------------------

/// Where requests are sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// `{base_url}{path}`, e.g. `https://ctf.example.org/api/v1/users`.
    Direct { base_url: String },
    /// `{url}?endpoint={path}`.
    Proxy { url: String },
}

/// How requests authenticate. Which one a deployment needs is configuration.
#[derive(Clone, PartialEq, Eq, Default)]
pub enum Auth {
    #[default]
    None,
    /// API access token, sent as `Authorization: Token <token>`.
    Token(String),
    /// Browser session id, sent as `Cookie: session=<id>`.
    Cookie(String),
}

impl std::fmt::Debug for Auth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Auth::None => f.write_str("None"),
            Auth::Token(_) => f.write_str("Token(***)"),
            Auth::Cookie(_) => f.write_str("Cookie(***)"),
        }
    }
}

// ---------------------------------------------------------------------------
// Raw upstream answer
// ---------------------------------------------------------------------------

/// Status and (if it parsed) JSON body of one upstream response.
#[derive(Debug, Clone, PartialEq)]
pub struct Upstream {
    pub status: u16,
    pub body: Option<Value>,
}

impl Upstream {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// The body's top-level `message` string, if any.
    pub fn message(&self) -> Option<&str> {
        self.body.as_ref()?.get("message")?.as_str()
    }

    /// Message to show for a non-success status.
    pub fn status_message(&self) -> String {
        self.message()
            .map(str::to_string)
            .unwrap_or_else(|| format!("HTTP error! status: {}", self.status))
    }
}

/// Turn a raw upstream answer into the data payload or a classified error.
///
/// CTFd wraps payloads as `{"success": true, "data": ...}`; the envelope is
/// removed. Bodies without one are returned as-is.
pub fn interpret(endpoint: Endpoint, upstream: Upstream) -> Result<Value, FetchError> {
    if !upstream.is_success() {
        return Err(FetchError::Status {
            endpoint: endpoint.path(),
            status: upstream.status,
            message: upstream.status_message(),
        });
    }

    if let Some(message) = upstream.message() {
        if message.to_lowercase().contains(PERMISSION_KEYWORD) {
            return Err(FetchError::Permission {
                endpoint: endpoint.path(),
                message: message.to_string(),
            });
        }
    }

    let Some(body) = upstream.body else {
        return Err(FetchError::Payload {
            endpoint: endpoint.path(),
            message: "response body is not JSON".to_string(),
        });
    };

    match body {
        Value::Object(mut map) => {
            if map.get("success") == Some(&Value::Bool(false)) {
                return Err(FetchError::Payload {
                    endpoint: endpoint.path(),
                    message: "upstream reported success: false".to_string(),
                });
            }
            match map.remove("data") {
                Some(data) => Ok(data),
                None => Ok(Value::Object(map)),
            }
        }
        other => Ok(other),
    }
}

// ---------------------------------------------------------------------------
// HttpSource
// ---------------------------------------------------------------------------

/// Live `ScoreSource` backed by reqwest.
pub struct HttpSource {
    http: reqwest::Client,
    route: Route,
    auth: Auth,
}

impl HttpSource {
    /// Client with no request timeout.
    pub fn new(route: Route, auth: Auth) -> Self {
        Self {
            http: reqwest::Client::new(),
            route,
            auth,
        }
    }

    /// Client whose requests give up after `timeout`.
    pub fn with_timeout(
        route: Route,
        auth: Auth,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { http, route, auth })
    }

    pub fn route(&self) -> &Route {
        &self.route
    }

    fn request(&self, endpoint: Endpoint) -> reqwest::RequestBuilder {
        let builder = match &self.route {
            Route::Direct { base_url } => {
                let url = format!("{}{}", base_url.trim_end_matches('/'), endpoint.path());
                self.http.get(url)
            }
            Route::Proxy { url } => self
                .http
                .get(url.as_str())
                .query(&[("endpoint", endpoint.path())]),
        };

        let builder = builder
            .header(ACCEPT, "application/json")
            .header(CONTENT_TYPE, "application/json");

        match &self.auth {
            Auth::None => builder,
            Auth::Token(token) => builder.header(AUTHORIZATION, format!("Token {token}")),
            Auth::Cookie(session) => builder.header(COOKIE, format!("session={session}")),
        }
    }

    /// Issue the request and return the raw status and body without
    /// classifying it. The local proxy relays this verbatim.
    pub async fn relay(&self, endpoint: Endpoint) -> Result<Upstream, FetchError> {
        debug!(%endpoint, "requesting upstream");
        let transport = |e: reqwest::Error| FetchError::Transport {
            endpoint: endpoint.path(),
            message: e.to_string(),
        };

        let response = self.request(endpoint).send().await.map_err(transport)?;
        let status = response.status().as_u16();
        let bytes = response.bytes().await.map_err(transport)?;
        let body = serde_json::from_slice(&bytes).ok();
        debug!(%endpoint, status, bytes = bytes.len(), "upstream responded");

        Ok(Upstream { status, body })
    }
}

#[async_trait]
impl ScoreSource for HttpSource {
    async fn fetch(&self, endpoint: Endpoint) -> Result<Value, FetchError> {
        let result = match self.relay(endpoint).await {
            Ok(upstream) => interpret(endpoint, upstream),
            Err(e) => Err(e),
        };
        if let Err(ref e) = result {
            warn!(%endpoint, error = %e, "fetch failed");
        }
        result
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
