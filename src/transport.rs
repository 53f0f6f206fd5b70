//! The boundary between the dispatcher and the network.
//!
//! A [`Transport`] performs the HTTP exchange and the initial JSON decoding.
//! It reports non-success statuses as [`TransportError::Status`] and never
//! interprets them; that is the classifier's job.

use std::fmt;
use std::future::Future;

use serde_json::Value;

/// Boxed error for failures below the HTTP layer.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// HTTP method of a logical request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
}

impl Method {
    /// Upper-case method name, as sent on the wire.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A logical API request, relative to the configured endpoint.
#[derive(Clone, Debug, PartialEq)]
pub struct Request {
    pub method: Method,
    /// Path below the endpoint, e.g. `address/1Boat.../transactions`.
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
}

impl Request {
    /// A request with no query parameters and no body.
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
        }
    }

    /// A `GET` request for `path`.
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::Get, path)
    }

    /// A `POST` request for `path`.
    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::Post, path)
    }

    /// Append query parameters, keeping their order.
    pub fn with_query<K, V>(mut self, pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.query
            .extend(pairs.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Attach a JSON body.
    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }
}

/// A response with a non-success status.
#[derive(Clone, Debug, PartialEq)]
pub struct StatusFailure {
    pub status: u16,
    /// Decoded JSON body, the raw text as a JSON string when it was not JSON,
    /// or `None` when the body was empty.
    pub body: Option<Value>,
}

/// Transport-level failure.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("HTTP status {}", .0.status)]
    Status(StatusFailure),
    #[error("The HTTP Response was empty.")]
    EmptyResponse,
    #[error("invalid response body: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("invalid request URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },
    #[error("connection error: {0}")]
    Connection(#[source] BoxError),
}

/// Performs requests against the API.
///
/// Implementations own authentication, TLS, pooling and timeouts.
pub trait Transport {
    /// Send a request. Success yields the decoded body.
    fn send(&self, request: Request) -> impl Future<Output = Result<Value, TransportError>> + Send;
}

#[cfg(feature = "client")]
pub use http::HttpTransport;

#[cfg(feature = "client")]
mod http {
    use super::*;
    use reqwest::{Client, Url};
    use reqwest::header::USER_AGENT;

    /// `User-Agent` sent with every request.
    pub const AGENT: &str = concat!("blocktrail-rust/", env!("CARGO_PKG_VERSION"));

    /// [`Transport`] built on `reqwest`. Authenticates with the `api_key`
    /// query parameter.
    #[derive(Clone, Debug)]
    pub struct HttpTransport {
        client: Client,
        base_url: String,
        api_key: String,
    }

    impl HttpTransport {
        /// Transport with a default `reqwest` client.
        pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
            Self::with_client(Client::new(), base_url, api_key)
        }

        /// Use a preconfigured `reqwest` client (timeouts, proxies, ...).
        pub fn with_client(
            client: Client,
            base_url: impl Into<String>,
            api_key: impl Into<String>,
        ) -> Self {
            Self {
                client,
                base_url: base_url.into(),
                api_key: api_key.into(),
            }
        }

        /// Endpoint every request path is joined to.
        pub fn base_url(&self) -> &str {
            &self.base_url
        }

        fn url(&self, path: &str) -> String {
            format!(
                "{}/{}",
                self.base_url.trim_end_matches('/'),
                path.trim_start_matches('/')
            )
        }
    }

    impl Transport for HttpTransport {
        async fn send(&self, request: Request) -> Result<Value, TransportError> {
            let params = std::iter::once(("api_key", self.api_key.as_str())).chain(
                request
                    .query
                    .iter()
                    .map(|(k, v)| (k.as_str(), v.as_str())),
            );
            let raw = self.url(&request.path);
            let url = Url::parse_with_params(&raw, params).map_err(|e| {
                TransportError::InvalidUrl {
                    url: raw.clone(),
                    reason: e.to_string(),
                }
            })?;
            let mut builder = match request.method {
                Method::Get => self.client.get(url),
                Method::Post => self.client.post(url),
            };
            builder = builder.header(USER_AGENT, AGENT);
            if let Some(body) = &request.body {
                builder = builder.json(body);
            }

            let response = builder
                .send()
                .await
                .map_err(|e| TransportError::Connection(Box::new(e)))?;
            let status = response.status();
            let text = response
                .text()
                .await
                .map_err(|e| TransportError::Connection(Box::new(e)))?;

            if status.is_success() {
                if text.trim().is_empty() {
                    return Err(TransportError::EmptyResponse);
                }
                return Ok(serde_json::from_str(&text)?);
            }

            Err(TransportError::Status(StatusFailure {
                status: status.as_u16(),
                body: decode_failure_body(&text),
            }))
        }
    }

    fn decode_failure_body(text: &str) -> Option<Value> {
        if text.trim().is_empty() {
            return None;
        }
        Some(serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_owned())))
    }

}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn request_builders() {
        let request = Request::post("address/unspent-outputs")
            .with_query([("page", "2")])
            .with_body(json!({"addresses": []}));
        assert_eq!(request.method, Method::Post);
        assert_eq!(request.query, vec![("page".to_owned(), "2".to_owned())]);
        assert_eq!(request.body, Some(json!({"addresses": []})));

        let request = Request::get("block/latest");
        assert_eq!(request.method.to_string(), "GET");
        assert!(request.query.is_empty());
        assert!(request.body.is_none());
    }

    #[test]
    fn status_failure_display() {
        let error = TransportError::Status(StatusFailure {
            status: 503,
            body: None,
        });
        assert_eq!(error.to_string(), "HTTP status 503");
        assert_eq!(
            TransportError::EmptyResponse.to_string(),
            "The HTTP Response was empty."
        );
        let error = TransportError::InvalidUrl {
            url: "not a url/block".to_owned(),
            reason: "relative URL without a base".to_owned(),
        };
        assert_eq!(
            error.to_string(),
            "invalid request URL not a url/block: relative URL without a base"
        );
    }
}
