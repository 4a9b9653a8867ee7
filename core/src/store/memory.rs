use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use uuid::Uuid;

use super::{ItemStore, StoreOp};
use crate::error::StoreError;
use crate::types::{Item, ItemId, NewItem};

#[derive(Debug, Default)]
struct MemoryState {
    items: Vec<Item>,
    queued_failures: HashMap<StoreOp, VecDeque<StoreError>>,
    sticky_failures: HashMap<StoreOp, StoreError>,
    calls: HashMap<StoreOp, usize>,
}

/// In-process item store with the same semantics as the store-server.
///
/// Items keep insertion order. Failures can be injected per operation,
/// either once (`fail_next`) or until cleared (`fail_all`). Every call is
/// counted, including the ones that fail.
#[derive(Debug, Default)]
pub struct MemoryItemStore {
    state: Mutex<MemoryState>,
}

impl MemoryItemStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-populated with `items`, as if they had been created earlier.
    pub fn with_items(items: Vec<Item>) -> Self {
        let store = Self::new();
        store.lock().items = items;
        store
    }

    /// Make the next call to `op` fail with `error`.
    pub fn fail_next(&self, op: StoreOp, error: StoreError) {
        self.lock()
            .queued_failures
            .entry(op)
            .or_default()
            .push_back(error);
    }

    /// Make every call to `op` fail with `error` until `clear_failures`.
    pub fn fail_all(&self, op: StoreOp, error: StoreError) {
        self.lock().sticky_failures.insert(op, error);
    }

    pub fn clear_failures(&self) {
        let mut state = self.lock();
        state.queued_failures.clear();
        state.sticky_failures.clear();
    }

    /// How many times `op` has been invoked.
    pub fn calls(&self, op: StoreOp) -> usize {
        self.lock().calls.get(&op).copied().unwrap_or(0)
    }

    pub fn total_calls(&self) -> usize {
        self.lock().calls.values().sum()
    }

    /// Current server-side contents, bypassing call counting.
    pub fn snapshot(&self) -> Vec<Item> {
        self.lock().items.clone()
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Count the call and return the injected failure for it, if any.
    fn begin(&self, op: StoreOp) -> Result<MutexGuard<'_, MemoryState>, StoreError> {
        let mut state = self.lock();
        *state.calls.entry(op).or_insert(0) += 1;
        if let Some(error) = state
            .queued_failures
            .get_mut(&op)
            .and_then(VecDeque::pop_front)
        {
            return Err(error);
        }
        if let Some(error) = state.sticky_failures.get(&op) {
            return Err(error.clone());
        }
        Ok(state)
    }
}

#[async_trait]
impl ItemStore for MemoryItemStore {
    async fn list(&self) -> Result<Vec<Item>, StoreError> {
        let state = self.begin(StoreOp::List)?;
        Ok(state.items.clone())
    }

    async fn create(&self, fields: &NewItem) -> Result<Item, StoreError> {
        let mut state = self.begin(StoreOp::Create)?;
        if fields.title.trim().is_empty() {
            return Err(StoreError::Rejected("title must not be empty".to_string()));
        }
        let item = Item {
            id: ItemId(Uuid::new_v4()),
            title: fields.title.clone(),
            completed: fields.completed,
            owner_tag: fields.owner_tag,
        };
        state.items.push(item.clone());
        Ok(item)
    }

    async fn update(&self, id: ItemId, fields: &Item) -> Result<Item, StoreError> {
        let mut state = self.begin(StoreOp::Update)?;
        let item = state
            .items
            .iter_mut()
            .find(|item| item.id == id)
            .ok_or(StoreError::NotFound)?;
        item.title = fields.title.clone();
        item.completed = fields.completed;
        item.owner_tag = fields.owner_tag;
        Ok(item.clone())
    }

    async fn delete(&self, id: ItemId) -> Result<(), StoreError> {
        let mut state = self.begin(StoreOp::Delete)?;
        let position = state
            .items
            .iter()
            .position(|item| item.id == id)
            .ok_or(StoreError::NotFound)?;
        state.items.remove(position);
        Ok(())
    }
}
