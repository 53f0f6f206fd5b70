//! Client configuration and API endpoint resolution.

use std::fmt;
use std::str::FromStr;

/// Base URL used when neither an explicit endpoint nor the environment
/// override is set.
pub const DEFAULT_API_ENDPOINT: &str = "https://api.blocktrail.com";

/// Environment variable overriding [`DEFAULT_API_ENDPOINT`].
pub const API_ENDPOINT_ENV: &str = "BLOCKTRAIL_SDK_API_ENDPOINT";

pub const DEFAULT_API_VERSION: &str = "v1";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("network unsupported: {0}")]
    UnsupportedNetwork(String),
    #[error("API endpoint must be an http(s) URL, got {0:?}")]
    InvalidEndpoint(String),
}

/// Networks served by the API.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Network {
    #[default]
    Bitcoin,
}

impl Network {
    /// Ticker used in API paths.
    pub const fn code(self) -> &'static str {
        match self {
            Self::Bitcoin => "BTC",
        }
    }

    /// Path segment for this network; testnet is prefixed with `t`.
    pub fn path_segment(self, testnet: bool) -> String {
        if testnet {
            format!("t{}", self.code())
        } else {
            self.code().to_owned()
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Network {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "BTC" => Ok(Self::Bitcoin),
            other => Err(ConfigError::UnsupportedNetwork(other.to_owned())),
        }
    }
}

/// Settings for a [`BlocktrailClient`](crate::BlocktrailClient).
///
/// Fixed once a client is built from it.
///
/// ```
/// use blocktrail_client::ClientConfig;
///
/// let config = ClientConfig::new("MY_APIKEY")
///     .testnet(true)
///     .api_endpoint("http://localhost:8080/v1/tBTC");
/// assert_eq!(config.endpoint().unwrap(), "http://localhost:8080/v1/tBTC");
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClientConfig {
    pub api_key: String,
    pub network: Network,
    pub testnet: bool,
    pub api_version: String,
    /// Full endpoint URL, used verbatim when set.
    pub api_endpoint: Option<String>,
}

impl ClientConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            network: Network::default(),
            testnet: false,
            api_version: DEFAULT_API_VERSION.to_owned(),
            api_endpoint: None,
        }
    }

    /// Set the chain. Only Bitcoin is supported.
    pub fn network(mut self, network: Network) -> Self {
        self.network = network;
        self
    }

    /// Use the testnet variant of the chain.
    pub fn testnet(mut self, testnet: bool) -> Self {
        self.testnet = testnet;
        self
    }

    /// Override the API version path segment (`v1`).
    pub fn api_version(mut self, api_version: impl Into<String>) -> Self {
        self.api_version = api_version.into();
        self
    }

    /// Use this full endpoint instead of deriving one.
    pub fn api_endpoint(mut self, api_endpoint: impl Into<String>) -> Self {
        self.api_endpoint = Some(api_endpoint.into());
        self
    }

    /// Resolve the endpoint all request paths are relative to.
    ///
    /// Reads [`API_ENDPOINT_ENV`] when no explicit endpoint is set.
    pub fn endpoint(&self) -> Result<String, ConfigError> {
        self.resolve_endpoint(std::env::var(API_ENDPOINT_ENV).ok())
    }

    fn resolve_endpoint(&self, env_base: Option<String>) -> Result<String, ConfigError> {
        if let Some(endpoint) = &self.api_endpoint {
            return validate_endpoint(endpoint.clone());
        }

        // An empty override counts as unset.
        let base = env_base
            .filter(|base| !base.is_empty())
            .unwrap_or_else(|| DEFAULT_API_ENDPOINT.to_owned());
        let base = validate_endpoint(base)?;

        Ok(format!(
            "{}/{}/{}",
            base.trim_end_matches('/'),
            self.api_version,
            self.network.path_segment(self.testnet)
        ))
    }
}

fn validate_endpoint(endpoint: String) -> Result<String, ConfigError> {
    if endpoint.starts_with("https://") || endpoint.starts_with("http://") {
        Ok(endpoint)
    } else {
        Err(ConfigError::InvalidEndpoint(endpoint))
    }
}
