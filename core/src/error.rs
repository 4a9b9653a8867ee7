//! Error types for the item store client.
//!
//! # Design
//! `NotFound` gets a dedicated variant because a stale id is the most common
//! store failure. `Rejected` covers responses whose envelope reports
//! `success: false`, even with a 2xx status. `Transport` covers requests that
//! never produced a response at all.

use thiserror::Error;

/// Errors returned by `ItemClient` parse methods and `ItemStore` calls.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// The server returned 404, the requested item does not exist.
    #[error("item not found")]
    NotFound,

    /// The envelope reported `success: false`.
    #[error("store rejected the request: {0}")]
    Rejected(String),

    /// The server returned a non-2xx status other than 404.
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    Deserialization(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// The request could not be delivered (connection refused, DNS, ...).
    #[error("transport failed: {0}")]
    Transport(String),
}

/// Errors raised while reading client configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value:?}")]
    InvalidValue { key: &'static str, value: String },
}
