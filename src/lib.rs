//! Async client for the Blocktrail Bitcoin data API.
//!
//! Address, block and transaction lookups are thin wrappers over a single
//! dispatcher. Two pieces carry the actual semantics:
//!
//! - [`classify`] maps a failed response (status code plus an untrusted JSON
//!   body) onto one of seven [`ErrorKind`]s, so callers can tell a missing
//!   object from bad credentials.
//! - [`amount`] converts between satoshi and 8-decimal BTC amounts exactly,
//!   using [`rust_decimal`] instead of floating point.
//!
//! # Features
//!
//! - **`client`** (enabled by default): [`HttpTransport`], a `reqwest`-based
//!   [`Transport`], and the matching [`BlocktrailClient`] constructors. Without
//!   it the crate still provides the converter, the classifier and a client
//!   over any custom transport.
//!
//! # Quick start
//!
//! ```no_run
//! use blocktrail_client::{BlocktrailClient, ErrorKind, amount};
//!
//! #[tokio::main]
//! async fn main() -> blocktrail_client::client::Result<()> {
//!     let client = BlocktrailClient::new("MY_APIKEY")?;
//!     let address = "1BoatSLRHtKNngkdXEeobR76b53LETtpyT".parse()?;
//!     match client.address(&address).await {
//!         Ok(info) => {
//!             let balance = info["balance"].as_i64().unwrap_or_default();
//!             println!("balance: {} BTC", amount::to_btc_string(balance)?);
//!         }
//!         Err(e) if e.api_error().is_some_and(|e| e.kind == ErrorKind::ObjectNotFound) => {
//!             println!("unknown address");
//!         }
//!         Err(e) => return Err(e),
//!     }
//!     Ok(())
//! }
//! ```

pub mod amount;
pub mod classify;
pub mod client;
pub mod config;
mod query_helpers;
pub mod transport;
pub mod types;

pub use amount::{AmountError, IntoAmount, Satoshi};
pub use classify::{ApiError, ErrorKind, ResponseOutcome, classify, classify_failure};
pub use client::BlocktrailClient;
pub use config::{ClientConfig, ConfigError, Network};
pub use query_helpers::{BlockReference, Pagination, SortDirection};
pub use transport::{Method, Request, StatusFailure, Transport, TransportError};
pub use types::{Address, BlockHash, ParseError, TxHash};

#[cfg(feature = "client")]
pub use transport::HttpTransport;
