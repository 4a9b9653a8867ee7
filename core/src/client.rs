//! Stateless HTTP request builder and response parser for the item store.
//!
//! # Design
//! `ItemClient` holds only a `base_url` and carries no mutable state between
//! calls. Each store operation is split into a `build_*` method that produces
//! an `HttpRequest` and a `parse_*` method that consumes an `HttpResponse`.
//! The transport executes the actual HTTP round-trip, keeping this layer
//! deterministic and free of I/O.
//!
//! A response only counts as a success when the status is 2xx *and* the
//! envelope reports `success: true`.

use serde::de::DeserializeOwned;

use crate::error::StoreError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::{Item, ItemId, NewItem, StoreResponse};

/// Synchronous, stateless codec for the item store API.
#[derive(Debug, Clone)]
pub struct ItemClient {
    base_url: String,
}

impl ItemClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn build_list_items(&self) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            url: format!("{}/items", self.base_url),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn build_create_item(&self, input: &NewItem) -> Result<HttpRequest, StoreError> {
        Ok(HttpRequest {
            method: HttpMethod::Post,
            url: format!("{}/items", self.base_url),
            headers: json_headers(),
            body: Some(to_json(input)?),
        })
    }

    /// The full item is sent as the update payload; the store ignores `_id`
    /// in the body and uses the path id.
    pub fn build_update_item(&self, id: ItemId, fields: &Item) -> Result<HttpRequest, StoreError> {
        Ok(HttpRequest {
            method: HttpMethod::Put,
            url: format!("{}/items/{id}", self.base_url),
            headers: json_headers(),
            body: Some(to_json(fields)?),
        })
    }

    pub fn build_delete_item(&self, id: ItemId) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Delete,
            url: format!("{}/items/{id}", self.base_url),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn parse_list_items(&self, response: HttpResponse) -> Result<Vec<Item>, StoreError> {
        decode_data(response)
    }

    pub fn parse_create_item(&self, response: HttpResponse) -> Result<Item, StoreError> {
        decode_data(response)
    }

    pub fn parse_update_item(&self, response: HttpResponse) -> Result<Item, StoreError> {
        decode_data(response)
    }

    pub fn parse_delete_item(&self, response: HttpResponse) -> Result<(), StoreError> {
        decode_envelope::<serde_json::Value>(response).map(|_| ())
    }
}

fn json_headers() -> Vec<(String, String)> {
    vec![("content-type".to_string(), "application/json".to_string())]
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String, StoreError> {
    serde_json::to_string(value).map_err(|e| StoreError::Serialization(e.to_string()))
}

/// Map the status line and envelope flag to a `StoreError`, or return the
/// decoded envelope.
fn decode_envelope<T: DeserializeOwned>(
    response: HttpResponse,
) -> Result<StoreResponse<T>, StoreError> {
    if response.status == 404 {
        return Err(StoreError::NotFound);
    }
    if !response.is_success() {
        return Err(StoreError::Http {
            status: response.status,
            body: response.body,
        });
    }
    let envelope: StoreResponse<T> = serde_json::from_str(&response.body)
        .map_err(|e| StoreError::Deserialization(e.to_string()))?;
    if !envelope.success {
        let reason = envelope
            .error
            .unwrap_or_else(|| "no reason given".to_string());
        return Err(StoreError::Rejected(reason));
    }
    Ok(envelope)
}

fn decode_data<T: DeserializeOwned>(response: HttpResponse) -> Result<T, StoreError> {
    decode_envelope(response)?
        .data
        .ok_or_else(|| StoreError::Deserialization("envelope has no data".to_string()))
}
