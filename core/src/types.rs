//! Domain DTOs for the item store.
//!
//! # Design
//! These types mirror the store-server's schema but are defined independently.
//! Field names follow the store's wire format (`_id`, `userId`) through serde
//! renames so the Rust side can use descriptive names. Integration tests catch
//! any schema drift between the two crates.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Server-assigned identifier of an item. Never generated by the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(pub Uuid);

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for ItemId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(ItemId)
    }
}

/// Opaque owner identifier attached to every created item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OwnerTag(pub u64);

impl Default for OwnerTag {
    fn default() -> Self {
        OwnerTag(1)
    }
}

impl fmt::Display for OwnerTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A single todo item as stored by the item store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Item {
    #[serde(rename = "_id")]
    pub id: ItemId,
    pub title: String,
    pub completed: bool,
    #[serde(rename = "userId", default)]
    pub owner_tag: OwnerTag,
}

/// Request payload for creating a new item.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewItem {
    pub title: String,
    #[serde(default)]
    pub completed: bool,
    #[serde(rename = "userId", default)]
    pub owner_tag: OwnerTag,
}

/// Response envelope used by every store endpoint.
///
/// `data` is absent on delete and on failures; `error` is only present when
/// `success` is false.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
