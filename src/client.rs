//! Async client for the Blocktrail data API.

use serde_json::{Value, json};

use crate::amount::{AmountError, Satoshi};
use crate::classify::{ApiError, classify_failure};
use crate::config::ConfigError;
use crate::query_helpers::{BlockReference, Pagination};
use crate::transport::{BoxError, Method, Request, Transport, TransportError};
use crate::types::{Address, ParseError, TxHash};

#[cfg(feature = "client")]
use crate::config::ClientConfig;
#[cfg(feature = "client")]
use crate::transport::HttpTransport;

/// Amount the testnet faucet sends when none is given.
pub const DEFAULT_FAUCET_AMOUNT: Satoshi = Satoshi::new(10_000);

/// Client error type.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The API answered with a non-success status.
    #[error("API error: {0}")]
    Api(#[from] ApiError),
    #[error("The HTTP Response was empty.")]
    EmptyResponse,
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    /// The endpoint and path did not form a valid URL.
    #[error("invalid request URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },
    #[error("connection error: {0}")]
    Connection(#[source] BoxError),
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("amount error: {0}")]
    Amount(#[from] AmountError),
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),
}

impl From<TransportError> for Error {
    fn from(error: TransportError) -> Self {
        match error {
            TransportError::Status(failure) => {
                Self::Api(classify_failure(failure.status, failure.body.as_ref()))
            }
            TransportError::EmptyResponse => Self::EmptyResponse,
            TransportError::Decode(e) => Self::Json(e),
            TransportError::InvalidUrl { url, reason } => Self::InvalidUrl { url, reason },
            TransportError::Connection(e) => Self::Connection(e),
        }
    }
}

impl Error {
    /// The classified API error, if this is one.
    pub fn api_error(&self) -> Option<&ApiError> {
        match self {
            Self::Api(error) => Some(error),
            _ => None,
        }
    }
}

/// Result type alias for client operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Async client for the Blocktrail data API.
///
/// Generic over its [`Transport`]; [`BlocktrailClient::new`] and friends build
/// one over [`HttpTransport`].
///
/// # Example
///
/// ```no_run
/// use blocktrail_client::BlocktrailClient;
///
/// #[tokio::main]
/// async fn main() -> blocktrail_client::client::Result<()> {
///     let client = BlocktrailClient::testnet("MY_APIKEY")?;
///     let block = client.block_latest().await?;
///     println!("Latest block: {}", block["hash"]);
///     Ok(())
/// }
/// ```
#[derive(Clone, Debug)]
pub struct BlocktrailClient<T> {
    transport: T,
}

#[cfg(feature = "client")]
impl BlocktrailClient<HttpTransport> {
    /// Create a client for Bitcoin mainnet.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::from_config(&ClientConfig::new(api_key))
    }

    /// Create a client for Bitcoin testnet.
    pub fn testnet(api_key: impl Into<String>) -> Result<Self> {
        Self::from_config(&ClientConfig::new(api_key).testnet(true))
    }

    /// Create a client from a full configuration.
    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        let endpoint = config.endpoint()?;
        tracing::debug!(%endpoint, "configured blocktrail client");
        Ok(Self::with_transport(HttpTransport::new(
            endpoint,
            config.api_key.clone(),
        )))
    }
}

impl<T: Transport> BlocktrailClient<T> {
    /// Create a client over any [`Transport`].
    pub fn with_transport(transport: T) -> Self {
        Self { transport }
    }

    /// The underlying transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Issue a request and return the decoded body unchanged.
    ///
    /// Non-success statuses come back as [`Error::Api`], classified.
    pub async fn dispatch(
        &self,
        method: Method,
        path: impl Into<String>,
        query: Vec<(String, String)>,
        body: Option<Value>,
    ) -> Result<Value> {
        let request = Request {
            method,
            path: path.into(),
            query,
            body,
        };
        tracing::debug!(method = %request.method, path = %request.path, "dispatching request");

        match self.transport.send(request).await {
            Ok(body) => Ok(body),
            Err(error) => {
                let error = Error::from(error);
                if let Error::Api(api) = &error {
                    tracing::warn!(
                        kind = %api.kind,
                        status = api.http_status,
                        detail = %api.message,
                        "request failed"
                    );
                }
                Err(error)
            }
        }
    }

    async fn get(&self, path: String, query: Vec<(String, String)>) -> Result<Value> {
        self.dispatch(Method::Get, path, query, None).await
    }

    async fn post(
        &self,
        path: impl Into<String>,
        query: Vec<(String, String)>,
        body: Value,
    ) -> Result<Value> {
        self.dispatch(Method::Post, path, query, Some(body)).await
    }

    // ── Address ──────────────────────────────────────────────────

    /// Returns summary information for an address.
    pub async fn address(&self, address: &Address) -> Result<Value> {
        self.get(format!("address/{address}"), Vec::new()).await
    }

    /// Returns the confirmed transactions of an address.
    pub async fn address_transactions(
        &self,
        address: &Address,
        pagination: Pagination,
    ) -> Result<Value> {
        self.get(
            format!("address/{address}/transactions"),
            pagination.to_query(),
        )
        .await
    }

    /// Returns the unconfirmed transactions of an address.
    pub async fn address_unconfirmed_transactions(
        &self,
        address: &Address,
        pagination: Pagination,
    ) -> Result<Value> {
        self.get(
            format!("address/{address}/unconfirmed-transactions"),
            pagination.to_query(),
        )
        .await
    }

    /// Returns the unspent outputs of an address.
    pub async fn address_unspent_outputs(
        &self,
        address: &Address,
        pagination: Pagination,
    ) -> Result<Value> {
        self.get(
            format!("address/{address}/unspent-outputs"),
            pagination.to_query(),
        )
        .await
    }

    /// Returns the unspent outputs of several addresses in one call.
    pub async fn batch_address_unspent_outputs(
        &self,
        addresses: &[Address],
        pagination: Pagination,
    ) -> Result<Value> {
        self.post(
            "address/unspent-outputs",
            pagination.to_query(),
            json!({ "addresses": addresses }),
        )
        .await
    }

    /// Verifies ownership of an address with a signed message.
    pub async fn verify_address(&self, address: &Address, signature: &str) -> Result<Value> {
        self.post(
            format!("address/{address}/verify"),
            Vec::new(),
            json!({ "signature": signature }),
        )
        .await
    }

    // ── Blocks ───────────────────────────────────────────────────

    /// Lists all blocks.
    ///
    /// Sent as `GET`; older SDKs sent this listing as a body-less `POST`.
    pub async fn all_blocks(&self, pagination: Pagination) -> Result<Value> {
        self.get("all-blocks".to_owned(), pagination.to_query())
            .await
    }

    /// Returns the most recent block.
    pub async fn block_latest(&self) -> Result<Value> {
        self.block(BlockReference::Latest).await
    }

    /// Returns a block by height or hash.
    pub async fn block(&self, block: impl Into<BlockReference>) -> Result<Value> {
        let block = block.into();
        self.get(format!("block/{}", block.path_segment()), Vec::new())
            .await
    }

    /// Lists the transactions in a block.
    ///
    /// Sent as `GET`; older SDKs sent this listing as a body-less `POST`.
    pub async fn block_transactions(
        &self,
        block: impl Into<BlockReference>,
        pagination: Pagination,
    ) -> Result<Value> {
        let block = block.into();
        self.get(
            format!("block/{}/transactions", block.path_segment()),
            pagination.to_query(),
        )
        .await
    }

    // ── Transactions ─────────────────────────────────────────────

    /// Returns a transaction by hash.
    pub async fn transaction(&self, tx_hash: &TxHash) -> Result<Value> {
        self.get(format!("transaction/{tx_hash}"), Vec::new()).await
    }

    // ── Faucet ───────────────────────────────────────────────────

    /// Requests testnet coins; see [`DEFAULT_FAUCET_AMOUNT`].
    pub async fn faucet_withdrawal(&self, address: &Address, amount: Satoshi) -> Result<Value> {
        // The path spelling is the API's.
        self.post(
            "faucet/withdrawl",
            Vec::new(),
            json!({ "address": address, "amount": amount }),
        )
        .await
    }
}
