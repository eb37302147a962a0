//! HTTP gateway client library for the Oracle Forge API.
//!
//! This crate is the single typed layer between front-end code and the Oracle
//! Forge backend. Every call returns an [`Envelope`]: backend application
//! failures arrive as data (`success == false`), while transport failures,
//! rate limiting and cancellation surface as [`Error`].
//!
//! # Example
//!
//! ```no_run
//! use oracle_forge_client::{GatewayClient, YesNoRequest};
//! use serde_json::Value;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), oracle_forge_client::Error> {
//!     let client = GatewayClient::from_env()?;
//!
//!     let answer = client
//!         .yes_no::<Value>(&YesNoRequest::new("Is the innkeeper lying?"))
//!         .await?;
//!     match answer.into_result() {
//!         Ok(data) => println!("{data}"),
//!         Err(err) => eprintln!("{err}"),
//!     }
//!
//!     Ok(())
//! }
//! ```

mod client;
mod envelope;
mod error;
mod resources;
mod types;

pub use client::{BASE_URL_ENV, ClientConfig, DEFAULT_BASE_URL, GatewayClient, encode_segment};
pub use envelope::{Envelope, MALFORMED_JSON, UNEXPECTED_PAYLOAD};
pub use error::Error;
pub use tokio_util::sync::CancellationToken;
pub use types::*;
