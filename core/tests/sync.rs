//! Behavior of `TodoSync` against in-process stores.
//!
//! `MemoryItemStore` covers the ordinary paths and failure injection; the
//! small wrapper stores below script the cases it cannot express (a store
//! that confirms deletes of unknown ids, one that rewrites items on update,
//! ones that hold `list` or a single `update` open).

use std::future::Future;

use async_trait::async_trait;
use proptest::prelude::*;
use todo_core::sync::messages;
use todo_core::{
    Item, ItemId, ItemStore, MemoryItemStore, NewItem, Notification, NotificationLevel,
    NotificationLog, OwnerTag, StoreError, StoreOp, TodoSync,
};
use tokio::sync::Notify;
use uuid::Uuid;

type MemorySync = TodoSync<MemoryItemStore, NotificationLog>;

fn item(title: &str, completed: bool) -> Item {
    Item {
        id: ItemId(Uuid::new_v4()),
        title: title.to_string(),
        completed,
        owner_tag: OwnerTag(1),
    }
}

fn sync_with(items: Vec<Item>) -> MemorySync {
    TodoSync::new(MemoryItemStore::with_items(items), NotificationLog::new())
}

fn block_on<F: Future>(future: F) -> F::Output {
    tokio::runtime::Builder::new_current_thread()
        .build()
        .unwrap()
        .block_on(future)
}

fn single(notes: Vec<Notification>) -> Notification {
    assert_eq!(notes.len(), 1, "expected exactly one notification: {notes:?}");
    notes.into_iter().next().unwrap()
}

// ---------------------------------------------------------------------------
// refresh / initialize
// ---------------------------------------------------------------------------

#[tokio::test]
async fn empty_store_refresh_shows_no_progress() {
    let sync = sync_with(Vec::new());
    sync.refresh().await;

    assert!(sync.items().is_empty());
    assert_eq!(sync.total_count(), 0);
    assert_eq!(sync.progress_percent(), None);
    let view = sync.view();
    assert_eq!(view.progress_percent, None);
    assert_eq!(view.summary(), "No todos yet");
    assert!(sync.notifier().is_empty());
}

#[tokio::test]
async fn refresh_replaces_collection_in_store_order() {
    let seeded = vec![item("a", false), item("b", true), item("c", false)];
    let sync = sync_with(seeded.clone());
    sync.refresh().await;
    assert_eq!(sync.items(), seeded);
}

#[tokio::test]
async fn failed_refresh_keeps_collection_and_clears_loading() {
    let sync = sync_with(vec![item("a", false)]);
    sync.refresh().await;

    sync.store()
        .fail_next(StoreOp::List, StoreError::Transport("connection refused".to_string()));
    sync.refresh().await;

    assert_eq!(sync.total_count(), 1);
    assert!(!sync.is_loading());
    let note = single(sync.notifier().drain());
    assert_eq!(note.level, NotificationLevel::Error);
    assert_eq!(note.message, messages::LOAD_FAILED);
}

#[tokio::test]
async fn rejected_list_counts_as_failure() {
    let sync = sync_with(vec![item("a", false)]);
    sync.store()
        .fail_next(StoreOp::List, StoreError::Rejected("maintenance".to_string()));
    sync.refresh().await;

    assert!(sync.items().is_empty());
    assert_eq!(single(sync.notifier().drain()).message, messages::LOAD_FAILED);
}

#[tokio::test]
async fn initialize_loads_only_once() {
    let sync = sync_with(vec![item("a", false)]);
    sync.initialize().await;
    sync.initialize().await;
    assert_eq!(sync.store().calls(StoreOp::List), 1);
    assert_eq!(sync.total_count(), 1);
}

/// Holds every `list` call open until released.
struct GatedStore {
    inner: MemoryItemStore,
    gate: Notify,
}

#[async_trait]
impl ItemStore for GatedStore {
    async fn list(&self) -> Result<Vec<Item>, StoreError> {
        self.gate.notified().await;
        self.inner.list().await
    }

    async fn create(&self, fields: &NewItem) -> Result<Item, StoreError> {
        self.inner.create(fields).await
    }

    async fn update(&self, id: ItemId, fields: &Item) -> Result<Item, StoreError> {
        self.inner.update(id, fields).await
    }

    async fn delete(&self, id: ItemId) -> Result<(), StoreError> {
        self.inner.delete(id).await
    }
}

#[tokio::test]
async fn loading_flag_covers_the_list_call() {
    let store = GatedStore {
        inner: MemoryItemStore::with_items(vec![item("a", false)]),
        gate: Notify::new(),
    };
    let sync = TodoSync::new(store, NotificationLog::new());
    assert!(!sync.is_loading());

    let observe = async {
        let seen = sync.is_loading();
        sync.store().gate.notify_one();
        seen
    };
    let ((), seen_loading) = tokio::join!(sync.refresh(), observe);

    assert!(seen_loading);
    assert!(!sync.is_loading());
    assert_eq!(sync.total_count(), 1);
}

// ---------------------------------------------------------------------------
// add
// ---------------------------------------------------------------------------

#[tokio::test]
async fn add_trims_title_and_appends_stored_item() {
    let sync = sync_with(Vec::new());
    sync.set_pending_title("  Buy milk  ");
    sync.submit().await;

    let items = sync.items();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].title, "Buy milk");
    assert!(!items[0].completed);
    assert_eq!(items[0].owner_tag, OwnerTag(1));
    assert_eq!(items, sync.store().snapshot());
    assert_eq!(sync.pending_title(), "");

    let note = single(sync.notifier().drain());
    assert_eq!(note.level, NotificationLevel::Success);
    assert_eq!(note.message, messages::ADDED);
}

#[tokio::test]
async fn add_appends_after_loaded_items() {
    let sync = sync_with(vec![item("first", false)]);
    sync.initialize().await;
    sync.add_item("second").await;
    let titles: Vec<_> = sync.items().into_iter().map(|i| i.title).collect();
    assert_eq!(titles, ["first", "second"]);
}

#[tokio::test]
async fn failed_add_keeps_buffer_and_collection() {
    let sync = sync_with(Vec::new());
    sync.store()
        .fail_next(StoreOp::Create, StoreError::Http { status: 500, body: String::new() });
    sync.set_pending_title("Walk dog");
    sync.submit().await;

    assert!(sync.items().is_empty());
    assert_eq!(sync.pending_title(), "Walk dog");
    let note = single(sync.notifier().drain());
    assert_eq!(note.level, NotificationLevel::Error);
    assert_eq!(note.message, messages::ADD_FAILED);

    // the next attempt is unaffected by the previous failure
    sync.submit().await;
    assert_eq!(sync.total_count(), 1);
    assert_eq!(sync.pending_title(), "");
}

#[tokio::test]
async fn owner_tag_is_attached_on_create() {
    let sync = sync_with(Vec::new()).with_owner_tag(OwnerTag(9));
    sync.add_item("tagged").await;
    assert_eq!(sync.items()[0].owner_tag, OwnerTag(9));
}

// ---------------------------------------------------------------------------
// toggle
// ---------------------------------------------------------------------------

#[tokio::test]
async fn two_items_one_completed_is_fifty_percent() {
    let sync = sync_with(vec![item("a", true), item("b", false)]);
    sync.refresh().await;
    assert_eq!(sync.completed_count(), 1);
    assert_eq!(sync.total_count(), 2);
    assert_eq!(sync.progress_percent(), Some(50));
    assert_eq!(sync.view().summary(), "1 of 2 completed");
}

#[tokio::test]
async fn toggle_failure_leaves_collection_unchanged() {
    let sync = sync_with(vec![item("a", false), item("b", true)]);
    sync.refresh().await;
    let before = sync.items();

    sync.store()
        .fail_next(StoreOp::Update, StoreError::Transport("timeout".to_string()));
    sync.toggle_item(&before[0]).await;

    assert_eq!(sync.items(), before);
    let note = single(sync.notifier().drain());
    assert_eq!(note.level, NotificationLevel::Error);
    assert_eq!(note.message, messages::UPDATE_FAILED);
}

#[tokio::test]
async fn toggle_sends_full_item_with_flipped_flag() {
    let sync = sync_with(vec![item("a", false)]);
    sync.refresh().await;
    let target = sync.items()[0].clone();

    sync.toggle_item(&target).await;

    let remote = sync.store().snapshot();
    assert!(remote[0].completed);
    assert_eq!(remote[0].title, "a");
    assert!(sync.items()[0].completed);
    assert!(sync.notifier().is_empty());
}

/// Upper-cases titles on update, as a normalizing server might.
struct NormalizingStore(MemoryItemStore);

#[async_trait]
impl ItemStore for NormalizingStore {
    async fn list(&self) -> Result<Vec<Item>, StoreError> {
        self.0.list().await
    }

    async fn create(&self, fields: &NewItem) -> Result<Item, StoreError> {
        self.0.create(fields).await
    }

    async fn update(&self, id: ItemId, fields: &Item) -> Result<Item, StoreError> {
        let normalized = Item {
            title: fields.title.to_uppercase(),
            ..fields.clone()
        };
        self.0.update(id, &normalized).await
    }

    async fn delete(&self, id: ItemId) -> Result<(), StoreError> {
        self.0.delete(id).await
    }
}

#[tokio::test]
async fn toggle_patches_only_the_flag_from_local_state() {
    let store = NormalizingStore(MemoryItemStore::with_items(vec![item("quiet", false)]));
    let sync = TodoSync::new(store, NotificationLog::new());
    sync.refresh().await;
    let target = sync.items()[0].clone();

    sync.toggle_item(&target).await;

    let local = &sync.items()[0];
    assert!(local.completed);
    assert_eq!(local.title, "quiet");
    assert_eq!(sync.store().0.snapshot()[0].title, "QUIET");
}

#[tokio::test]
async fn one_rejected_toggle_leaves_the_other_applied() {
    let sync = sync_with(vec![item("a", false), item("b", false), item("c", false)]);
    sync.refresh().await;
    let items = sync.items();

    sync.store()
        .fail_next(StoreOp::Update, StoreError::Rejected("conflict".to_string()));
    tokio::join!(sync.toggle_item(&items[0]), sync.toggle_item(&items[2]));

    let after = sync.items();
    assert!(!after[0].completed);
    assert!(!after[1].completed);
    assert!(after[2].completed);
    assert_eq!(single(sync.notifier().drain()).level, NotificationLevel::Error);
}

/// Holds `update` of one chosen item open until released; every other call
/// goes straight through.
struct HeldUpdateStore {
    inner: MemoryItemStore,
    held: ItemId,
    gate: Notify,
}

#[async_trait]
impl ItemStore for HeldUpdateStore {
    async fn list(&self) -> Result<Vec<Item>, StoreError> {
        self.inner.list().await
    }

    async fn create(&self, fields: &NewItem) -> Result<Item, StoreError> {
        self.inner.create(fields).await
    }

    async fn update(&self, id: ItemId, fields: &Item) -> Result<Item, StoreError> {
        if id == self.held {
            self.gate.notified().await;
        }
        self.inner.update(id, fields).await
    }

    async fn delete(&self, id: ItemId) -> Result<(), StoreError> {
        self.inner.delete(id).await
    }
}

#[tokio::test]
async fn pending_toggle_does_not_block_other_intents() {
    let seeded = vec![item("a", false), item("b", false), item("c", false)];
    let store = HeldUpdateStore {
        inner: MemoryItemStore::with_items(seeded.clone()),
        held: seeded[0].id,
        gate: Notify::new(),
    };
    let sync = TodoSync::new(store, NotificationLog::new());
    sync.refresh().await;

    let held = async {
        sync.toggle_item(&seeded[0]).await;
        sync.items()
    };
    let others = async {
        tokio::join!(sync.toggle_item(&seeded[1]), sync.delete_item(seeded[2].id));
        let during = (sync.items(), sync.store().inner.calls(StoreOp::Update));
        sync.store().gate.notify_one();
        during
    };
    let (after, (during, updates_during)) = tokio::join!(held, others);

    // toggle of "a" has not reached the store yet
    assert_eq!(updates_during, 1);
    assert_eq!(during.len(), 2);
    assert!(!during[0].completed);
    assert!(during[1].completed);

    assert_eq!(after.len(), 2);
    assert_eq!(after[0], Item { completed: true, ..during[0].clone() });
    assert_eq!(after[1], during[1]);

    let levels: Vec<_> = sync.notifier().drain().into_iter().map(|n| n.level).collect();
    assert_eq!(levels, [NotificationLevel::Success]);
}

// ---------------------------------------------------------------------------
// delete
// ---------------------------------------------------------------------------

#[tokio::test]
async fn delete_removes_matching_item() {
    let sync = sync_with(vec![item("a", false), item("b", false)]);
    sync.refresh().await;
    let doomed = sync.items()[0].id;

    sync.delete_item(doomed).await;

    let titles: Vec<_> = sync.items().into_iter().map(|i| i.title).collect();
    assert_eq!(titles, ["b"]);
    let note = single(sync.notifier().drain());
    assert_eq!(note.level, NotificationLevel::Success);
    assert_eq!(note.message, messages::DELETED);
}

#[tokio::test]
async fn delete_failure_leaves_collection_unchanged() {
    let sync = sync_with(vec![item("a", false)]);
    sync.refresh().await;
    let id = sync.items()[0].id;

    sync.store()
        .fail_next(StoreOp::Delete, StoreError::Transport("reset".to_string()));
    sync.delete_item(id).await;

    assert_eq!(sync.total_count(), 1);
    assert_eq!(single(sync.notifier().drain()).message, messages::DELETE_FAILED);
}

/// Confirms every delete, whether or not the id exists.
struct ForgivingStore(MemoryItemStore);

#[async_trait]
impl ItemStore for ForgivingStore {
    async fn list(&self) -> Result<Vec<Item>, StoreError> {
        self.0.list().await
    }

    async fn create(&self, fields: &NewItem) -> Result<Item, StoreError> {
        self.0.create(fields).await
    }

    async fn update(&self, id: ItemId, fields: &Item) -> Result<Item, StoreError> {
        self.0.update(id, fields).await
    }

    async fn delete(&self, id: ItemId) -> Result<(), StoreError> {
        let _ = self.0.delete(id).await;
        Ok(())
    }
}

#[tokio::test]
async fn delete_of_id_missing_remotely_still_removes_locally() {
    let local_only = item("stale", false);
    let store = ForgivingStore(MemoryItemStore::with_items(vec![local_only.clone()]));
    let sync = TodoSync::new(store, NotificationLog::new());
    sync.refresh().await;

    // someone else removed it from the store in the meantime
    sync.store().0.delete(local_only.id).await.unwrap();
    sync.delete_item(local_only.id).await;

    assert!(sync.items().is_empty());
    assert_eq!(single(sync.notifier().drain()).level, NotificationLevel::Success);
}

// ---------------------------------------------------------------------------
// properties
// ---------------------------------------------------------------------------

fn title_strategy() -> impl Strategy<Value = String> {
    ("[ \t]{0,3}", "[a-zA-Z0-9][a-zA-Z0-9 .,!?]{0,30}", "[ \t]{0,3}")
        .prop_map(|(lead, body, trail)| format!("{lead}{body}{trail}"))
}

fn collection_strategy() -> impl Strategy<Value = Vec<Item>> {
    prop::collection::vec(("[a-z]{1,8}", any::<bool>()), 1..8).prop_map(|specs| {
        specs
            .into_iter()
            .map(|(title, completed)| item(&title, completed))
            .collect()
    })
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 64,
        ..ProptestConfig::default()
    })]

    #[test]
    fn add_appends_exactly_one_trimmed_item(
        existing in collection_strategy(),
        raw in title_strategy(),
    ) {
        let sync = sync_with(existing.clone());
        block_on(async {
            sync.refresh().await;
            sync.set_pending_title(raw.clone());
            sync.submit().await;
        });

        let items = sync.items();
        prop_assert_eq!(items.len(), existing.len() + 1);
        prop_assert_eq!(&items[..existing.len()], &existing[..]);
        let added = items.last().unwrap();
        prop_assert_eq!(added.title.as_str(), raw.trim());
        prop_assert!(!added.completed);
        prop_assert!(existing.iter().all(|i| i.id != added.id));
        prop_assert_eq!(sync.pending_title(), "");
    }

    #[test]
    fn blank_titles_never_reach_the_store(raw in "[ \t\r\n]{0,12}") {
        let sync = sync_with(vec![item("a", false)]);
        block_on(sync.add_item(&raw));

        prop_assert_eq!(sync.store().total_calls(), 0);
        prop_assert!(sync.items().is_empty());
        let note = single(sync.notifier().drain());
        prop_assert_eq!(note.level, NotificationLevel::Warning);
        prop_assert_eq!(note.message.as_str(), messages::EMPTY_TITLE);
    }

    #[test]
    fn toggle_flips_exactly_one_item(
        existing in collection_strategy(),
        pick in any::<prop::sample::Index>(),
    ) {
        let sync = sync_with(existing.clone());
        let target = existing[pick.index(existing.len())].clone();
        block_on(async {
            sync.refresh().await;
            sync.toggle_item(&target).await;
        });

        let after = sync.items();
        prop_assert_eq!(after.len(), existing.len());
        for (before, now) in existing.iter().zip(&after) {
            if before.id == target.id {
                prop_assert_eq!(now.completed, !before.completed);
                prop_assert_eq!(&now.title, &before.title);
            } else {
                prop_assert_eq!(now, before);
            }
        }
    }

    #[test]
    fn delete_removes_exactly_one_item(
        existing in collection_strategy(),
        pick in any::<prop::sample::Index>(),
    ) {
        let sync = sync_with(existing.clone());
        let doomed = existing[pick.index(existing.len())].id;
        block_on(async {
            sync.refresh().await;
            sync.delete_item(doomed).await;
        });

        let after = sync.items();
        prop_assert_eq!(after.len(), existing.len() - 1);
        prop_assert!(after.iter().all(|i| i.id != doomed));
        let expected: Vec<_> = existing.into_iter().filter(|i| i.id != doomed).collect();
        prop_assert_eq!(after, expected);
    }

    #[test]
    fn progress_matches_rounded_ratio(existing in collection_strategy()) {
        let sync = sync_with(existing.clone());
        block_on(sync.refresh());

        let completed = existing.iter().filter(|i| i.completed).count();
        let expected = (100.0 * completed as f64 / existing.len() as f64).round() as u8;
        prop_assert_eq!(sync.progress_percent(), Some(expected));
        prop_assert_eq!(sync.view().completed_count, completed);
    }
}
