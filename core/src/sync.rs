//! Keeps a local, ordered mirror of the item store and mediates every
//! mutation through it.
//!
//! # Design
//! - Creation is pessimistic: an item only enters the local collection once
//!   the store has returned it with its id.
//! - Toggle and delete patch the local collection from the pre-call local
//!   copy after the store confirms. The item echoed back by `update` is not
//!   merged.
//! - No operation returns an error. Each outcome produces at most one
//!   notification and the component stays usable afterwards.
//! - State sits behind a plain mutex that is never held across an await, so
//!   independent intents (two toggles, a toggle and a delete) can be in
//!   flight at once without blocking each other.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::{debug, warn};

use crate::notify::Notifier;
use crate::store::ItemStore;
use crate::types::{Item, ItemId, NewItem, OwnerTag};

/// User-facing notification texts.
pub mod messages {
    pub const LOAD_FAILED: &str = "Failed to load todos";
    pub const EMPTY_TITLE: &str = "Please enter a todo item";
    pub const ADDED: &str = "Todo added successfully";
    pub const ADD_FAILED: &str = "Failed to add todo";
    pub const UPDATE_FAILED: &str = "Failed to update todo";
    pub const DELETED: &str = "Todo deleted successfully";
    pub const DELETE_FAILED: &str = "Failed to delete todo";
}

#[derive(Debug, Default)]
struct SyncState {
    items: Vec<Item>,
    pending_title: String,
    loads_in_flight: usize,
}

/// Clears the loading flag on every exit path of `refresh`.
struct LoadingGuard<'a> {
    state: &'a Mutex<SyncState>,
}

impl<'a> LoadingGuard<'a> {
    fn start(state: &'a Mutex<SyncState>) -> Self {
        lock(state).loads_in_flight += 1;
        Self { state }
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        let mut state = lock(self.state);
        state.loads_in_flight = state.loads_in_flight.saturating_sub(1);
    }
}

fn lock(state: &Mutex<SyncState>) -> MutexGuard<'_, SyncState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// `round(100 * completed / total)`, or `None` for an empty collection.
///
/// Halves round up.
pub fn progress_percent(completed: usize, total: usize) -> Option<u8> {
    if total == 0 {
        return None;
    }
    let completed = completed.min(total) as u64;
    let total = total as u64;
    let percent = (200 * completed + total) / (2 * total);
    Some(percent as u8)
}

/// Everything the presentation layer renders, captured at one instant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TodoView {
    pub items: Vec<Item>,
    pub pending_title: String,
    pub is_loading: bool,
    pub completed_count: usize,
    pub total_count: usize,
    pub progress_percent: Option<u8>,
}

impl TodoView {
    fn from_items(items: Vec<Item>, pending_title: String, is_loading: bool) -> Self {
        let completed_count = items.iter().filter(|item| item.completed).count();
        let total_count = items.len();
        Self {
            progress_percent: progress_percent(completed_count, total_count),
            items,
            pending_title,
            is_loading,
            completed_count,
            total_count,
        }
    }

    /// Header line: "No todos yet" or "{completed} of {total} completed".
    pub fn summary(&self) -> String {
        if self.total_count == 0 {
            "No todos yet".to_string()
        } else {
            format!("{} of {} completed", self.completed_count, self.total_count)
        }
    }
}

/// The todo synchronization component.
pub struct TodoSync<S, N> {
    store: S,
    notifier: N,
    owner_tag: OwnerTag,
    state: Mutex<SyncState>,
    initialized: AtomicBool,
}

impl<S: ItemStore, N: Notifier> TodoSync<S, N> {
    pub fn new(store: S, notifier: N) -> Self {
        Self {
            store,
            notifier,
            owner_tag: OwnerTag::default(),
            state: Mutex::new(SyncState::default()),
            initialized: AtomicBool::new(false),
        }
    }

    /// Tag attached to every item this component creates.
    pub fn with_owner_tag(mut self, owner_tag: OwnerTag) -> Self {
        self.owner_tag = owner_tag;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    /// Startup hook. Loads the collection the first time it is called and
    /// does nothing afterwards.
    pub async fn initialize(&self) {
        if self.initialized.swap(true, Ordering::SeqCst) {
            debug!("already initialized");
            return;
        }
        self.refresh().await;
    }

    /// Replace the local collection with the store's list.
    pub async fn refresh(&self) {
        let _loading = LoadingGuard::start(&self.state);
        match self.store.list().await {
            Ok(items) => {
                debug!(count = items.len(), "loaded items");
                self.lock().items = items;
            }
            Err(e) => {
                warn!(error = %e, "failed to load items");
                self.notifier.error(messages::LOAD_FAILED);
            }
        }
    }

    /// Create an item from `raw_title` and append the stored copy.
    ///
    /// Blank titles are rejected before any store call. On failure the
    /// pending buffer is kept so the typed text is not lost.
    pub async fn add_item(&self, raw_title: &str) {
        let title = raw_title.trim();
        if title.is_empty() {
            self.notifier.warn(messages::EMPTY_TITLE);
            return;
        }

        let fields = NewItem {
            title: title.to_string(),
            completed: false,
            owner_tag: self.owner_tag,
        };
        match self.store.create(&fields).await {
            Ok(item) => {
                debug!(id = %item.id, "created item");
                {
                    let mut state = self.lock();
                    state.items.push(item);
                    state.pending_title.clear();
                }
                self.notifier.success(messages::ADDED);
            }
            Err(e) => {
                warn!(error = %e, "failed to create item");
                self.notifier.error(messages::ADD_FAILED);
            }
        }
    }

    /// Submit the pending buffer, as pressing Enter in the input does.
    pub async fn submit(&self) {
        let title = self.pending_title();
        self.add_item(&title).await;
    }

    pub fn set_pending_title(&self, text: impl Into<String>) {
        self.lock().pending_title = text.into();
    }

    /// Flip `item.completed` in the store, then patch the local copy.
    ///
    /// Only the `completed` flag of the matching local item changes; the
    /// item returned by the store is discarded.
    pub async fn toggle_item(&self, item: &Item) {
        let fields = Item {
            completed: !item.completed,
            ..item.clone()
        };
        match self.store.update(item.id, &fields).await {
            Ok(_) => {
                debug!(id = %item.id, completed = fields.completed, "toggled item");
                let mut state = self.lock();
                if let Some(local) = state.items.iter_mut().find(|local| local.id == item.id) {
                    local.completed = fields.completed;
                }
            }
            Err(e) => {
                warn!(id = %item.id, error = %e, "failed to update item");
                self.notifier.error(messages::UPDATE_FAILED);
            }
        }
    }

    /// Delete `id` in the store, then drop it locally. Ids that are not held
    /// locally are ignored once the store confirms.
    pub async fn delete_item(&self, id: ItemId) {
        match self.store.delete(id).await {
            Ok(()) => {
                debug!(%id, "deleted item");
                self.lock().items.retain(|item| item.id != id);
                self.notifier.success(messages::DELETED);
            }
            Err(e) => {
                warn!(%id, error = %e, "failed to delete item");
                self.notifier.error(messages::DELETE_FAILED);
            }
        }
    }

    pub fn items(&self) -> Vec<Item> {
        self.lock().items.clone()
    }

    pub fn pending_title(&self) -> String {
        self.lock().pending_title.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.lock().loads_in_flight > 0
    }

    pub fn completed_count(&self) -> usize {
        self.lock().items.iter().filter(|item| item.completed).count()
    }

    pub fn total_count(&self) -> usize {
        self.lock().items.len()
    }

    pub fn progress_percent(&self) -> Option<u8> {
        let state = self.lock();
        let completed = state.items.iter().filter(|item| item.completed).count();
        progress_percent(completed, state.items.len())
    }

    pub fn view(&self) -> TodoView {
        let state = self.lock();
        TodoView::from_items(
            state.items.clone(),
            state.pending_title.clone(),
            state.loads_in_flight > 0,
        )
    }

    fn lock(&self) -> MutexGuard<'_, SyncState> {
        lock(&self.state)
    }
}
