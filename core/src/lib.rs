//! Client core for the todo application.
//!
//! # Overview
//! `TodoSync` keeps a local, ordered collection of items consistent with a
//! remote item store and exposes the intents a presentation layer drives
//! (refresh, add, toggle, delete, submit). Every store failure is recovered
//! at that boundary and reported through an injected `Notifier`.
//!
//! # Design
//! - `ItemClient` is stateless: it builds `HttpRequest` values and parses
//!   `HttpResponse` values (host-does-IO), so the wire codec is testable
//!   without a network.
//! - `ItemStore` is the seam the component depends on. `HttpItemStore`
//!   pairs the codec with a `Transport`; `MemoryItemStore` keeps everything
//!   in process.
//! - DTOs are defined independently from the store-server crate;
//!   integration tests catch schema drift.

pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod notify;
pub mod store;
pub mod sync;
pub mod types;

pub use client::ItemClient;
pub use config::ClientConfig;
pub use error::{ConfigError, StoreError};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use notify::{Notification, NotificationLevel, NotificationLog, Notifier, TracingNotifier};
pub use store::{HttpItemStore, ItemStore, MemoryItemStore, StoreOp, Transport, UreqTransport};
pub use sync::{TodoSync, TodoView};
pub use types::{Item, ItemId, NewItem, OwnerTag, StoreResponse};
