//! The item store seam consumed by the synchronization component.
//!
//! # Design
//! A store call either yields its payload or a `StoreError`. Both ways a
//! remote store can fail (the request errors out, or the envelope reports
//! `success: false`) collapse into `Err`, so callers handle one failure path.
//!
//! Two implementations live here: `HttpItemStore` talks to a remote store via
//! `ItemClient` and a pluggable `Transport`, and `MemoryItemStore` keeps items
//! in process with failure injection for tests and offline runs.

mod http;
mod memory;

use async_trait::async_trait;

use crate::error::StoreError;
use crate::types::{Item, ItemId, NewItem};

pub use http::{HttpItemStore, Transport, UreqTransport};
pub use memory::MemoryItemStore;

/// CRUD access to the remote item collection.
#[async_trait]
pub trait ItemStore: Send + Sync {
    /// All items in store order.
    async fn list(&self) -> Result<Vec<Item>, StoreError>;

    /// Create an item; the returned item carries the server-assigned id.
    async fn create(&self, fields: &NewItem) -> Result<Item, StoreError>;

    /// Replace the mutable fields of `id` with those in `fields`.
    async fn update(&self, id: ItemId, fields: &Item) -> Result<Item, StoreError>;

    async fn delete(&self, id: ItemId) -> Result<(), StoreError>;
}

/// Identifies one of the four store operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOp {
    List,
    Create,
    Update,
    Delete,
}
