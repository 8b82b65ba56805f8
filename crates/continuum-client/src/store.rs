//! The entity store: the single source of truth for every collection.
//!
//! Each collection is replaced wholesale when it is refreshed; nothing is ever
//! patched locally. A failed refresh keeps the previous snapshot and returns
//! the error to the caller. Refreshes of different kinds may run concurrently;
//! for the same kind the last response to resolve wins.
//!
//! Payloads become typed records at this boundary. Per-record invariants and
//! duplicate ids fail the refresh; cross-collection references are checked
//! by [`Snapshot::integrity_report`] once every kind has been loaded.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use continuum_common::error::{LootError, LootResult};
use continuum_common::models::{Entity, Item, LootHistoryRow, Player, Raid, RaidDay, Viewer};
use continuum_common::validation::{self, Collections, DanglingReference};
use futures_util::future::join_all;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::endpoints;
use crate::error::{ClientError, Result};
use crate::rest::Backend;

/// A collection the store can refresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EntityKind {
    Players,
    Items,
    LootHistory,
    Raids,
    RaidDays,
    CurrentViewer,
}

impl EntityKind {
    pub const ALL: [EntityKind; 6] = [
        Self::Players,
        Self::Items,
        Self::LootHistory,
        Self::Raids,
        Self::RaidDays,
        Self::CurrentViewer,
    ];

    pub fn path(self) -> &'static str {
        match self {
            Self::Players => endpoints::GET_PLAYERS,
            Self::Items => endpoints::GET_ITEMS,
            Self::LootHistory => endpoints::GET_LOOT_HISTORY,
            Self::Raids => endpoints::GET_RAIDS,
            Self::RaidDays => endpoints::GET_RAID_DAYS,
            Self::CurrentViewer => endpoints::GET_CURRENT_USER,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Players => "players",
            Self::Items => "items",
            Self::LootHistory => "loot history",
            Self::Raids => "raids",
            Self::RaidDays => "raid days",
            Self::CurrentViewer => "current viewer",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Read-only copy of every collection. Cloning is cheap.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    pub players: Arc<Vec<Player>>,
    pub items: Arc<Vec<Item>>,
    pub loot_history: Arc<Vec<LootHistoryRow>>,
    pub raids: Arc<Vec<Raid>>,
    pub raid_days: Arc<Vec<RaidDay>>,
    pub viewer: Option<Viewer>,
}

impl Snapshot {
    pub fn collections(&self) -> Collections<'_> {
        Collections {
            players: &self.players,
            items: &self.items,
            loot_history: &self.loot_history,
            raids: &self.raids,
            raid_days: &self.raid_days,
        }
    }

    pub fn integrity_report(&self) -> Vec<DanglingReference> {
        validation::integrity_report(&self.collections())
    }

    pub fn check_integrity(&self) -> LootResult<()> {
        validation::check_integrity(&self.collections())
    }
}

#[derive(Deserialize)]
struct CurrentUserResponse {
    player: Option<Viewer>,
}

/// Shared, injectable store. Hand it around as `Arc<EntityStore>`.
pub struct EntityStore {
    backend: Arc<dyn Backend>,
    snapshot: RwLock<Snapshot>,
    disposed: AtomicBool,
}

impl EntityStore {
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self {
            backend,
            snapshot: RwLock::new(Snapshot::default()),
            disposed: AtomicBool::new(false),
        }
    }

    /// Refresh every kind, then check cross-collection references.
    ///
    /// All kinds are attempted even if one fails; the first failure is
    /// returned. Dangling references are returned as
    /// [`LootError::Integrity`] after the data has been stored, so a caller
    /// may still render with the (tolerant) lookups.
    pub async fn init(&self) -> Result<()> {
        let failures = self.refresh_many(&EntityKind::ALL).await;
        if let Some((_, err)) = failures.into_iter().next() {
            return Err(err);
        }

        let report = self.snapshot().await.integrity_report();
        if !report.is_empty() {
            for problem in &report {
                warn!(%problem, "dangling reference");
            }
            return Err(LootError::Integrity(report).into());
        }
        info!("entity store initialised");
        Ok(())
    }

    /// Fetch one kind and replace its snapshot.
    pub async fn refresh(&self, kind: EntityKind) -> Result<()> {
        if self.is_disposed() {
            return Err(ClientError::Disposed);
        }

        let result = self.fetch_and_replace(kind).await;
        match &result {
            Ok(()) => debug!(%kind, "refreshed"),
            Err(e) => warn!(%kind, error = %e, "refresh failed; keeping previous snapshot"),
        }
        result
    }

    /// Refresh several kinds concurrently, returning the ones that failed.
    pub async fn refresh_many(&self, kinds: &[EntityKind]) -> Vec<(EntityKind, ClientError)> {
        let results = join_all(kinds.iter().map(|&kind| async move {
            (kind, self.refresh(kind).await)
        }))
        .await;

        results
            .into_iter()
            .filter_map(|(kind, res)| res.err().map(|e| (kind, e)))
            .collect()
    }

    async fn fetch_and_replace(&self, kind: EntityKind) -> Result<()> {
        let payload = self.backend.get(kind.path()).await?;

        // Decode outside the lock; only the swap happens under it.
        match kind {
            EntityKind::Players => {
                let players = Arc::new(decode_collection::<Player>(payload)?);
                self.snapshot.write().await.players = players;
            }
            EntityKind::Items => {
                let items = Arc::new(decode_collection::<Item>(payload)?);
                self.snapshot.write().await.items = items;
            }
            EntityKind::LootHistory => {
                let rows = Arc::new(decode_collection::<LootHistoryRow>(payload)?);
                self.snapshot.write().await.loot_history = rows;
            }
            EntityKind::Raids => {
                let raids = Arc::new(decode_collection::<Raid>(payload)?);
                self.snapshot.write().await.raids = raids;
            }
            EntityKind::RaidDays => {
                let days = Arc::new(decode_collection::<RaidDay>(payload)?);
                self.snapshot.write().await.raid_days = days;
            }
            EntityKind::CurrentViewer => {
                let resp: CurrentUserResponse = serde_json::from_value(payload)?;
                self.snapshot.write().await.viewer = resp.player;
            }
        }
        Ok(())
    }

    /// Replace the current viewer without a fetch (login/logout responses).
    pub async fn set_viewer(&self, viewer: Option<Viewer>) {
        self.snapshot.write().await.viewer = viewer;
    }

    /// Stop accepting refreshes. Snapshots already handed out stay valid.
    pub fn dispose(&self) {
        if !self.disposed.swap(true, Ordering::SeqCst) {
            info!("entity store disposed");
        }
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::SeqCst)
    }

    // ── Snapshot getters ─────────────────────────────────────────────────────

    pub async fn snapshot(&self) -> Snapshot {
        self.snapshot.read().await.clone()
    }

    pub async fn players(&self) -> Arc<Vec<Player>> {
        self.snapshot.read().await.players.clone()
    }

    pub async fn items(&self) -> Arc<Vec<Item>> {
        self.snapshot.read().await.items.clone()
    }

    pub async fn loot_history(&self) -> Arc<Vec<LootHistoryRow>> {
        self.snapshot.read().await.loot_history.clone()
    }

    pub async fn raids(&self) -> Arc<Vec<Raid>> {
        self.snapshot.read().await.raids.clone()
    }

    pub async fn raid_days(&self) -> Arc<Vec<RaidDay>> {
        self.snapshot.read().await.raid_days.clone()
    }

    pub async fn viewer(&self) -> Option<Viewer> {
        self.snapshot.read().await.viewer.clone()
    }
}

/// Parse a collection payload and check per-record invariants.
fn decode_collection<T: Entity + DeserializeOwned>(payload: Value) -> Result<Vec<T>> {
    let records: Vec<T> = serde_json::from_value(payload)?;
    validation::ensure_unique_ids(&records)?;
    for record in &records {
        record.validate()?;
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{MemoryBackend, Reply};
    use serde_json::json;

    fn seeded() -> Arc<MemoryBackend> {
        let backend = MemoryBackend::new();
        backend.set_get(
            endpoints::GET_PLAYERS,
            json!([
                {"id": 1, "name": "Tharlen", "class": "MG", "rank": 50, "role": "D", "attendance": [10]},
                {"id": 2, "name": "Grum", "class": "WR", "rank": 70, "role": "T"},
            ]),
        );
        backend.set_get(
            endpoints::GET_ITEMS,
            json!([{"id": 100, "name": "Staff", "tier": 1, "raid": 7, "bosses": ["Nefarian"]}]),
        );
        backend.set_get(
            endpoints::GET_LOOT_HISTORY,
            json!([{"id": 1, "item_id": 100, "player_id": 1, "raid_day_id": 10}]),
        );
        backend.set_get(
            endpoints::GET_RAIDS,
            json!([{"id": 7, "name": "Blackwing Lair", "short_name": "BWL", "bosses": ["Nefarian"]}]),
        );
        backend.set_get(
            endpoints::GET_RAID_DAYS,
            json!([{"id": 10, "name": "BWL 1", "date": "2020-11-18", "raid_id": 7}]),
        );
        backend.set_get(
            endpoints::GET_CURRENT_USER,
            json!({"player": {"id": 2, "name": "Grum", "permission_level": 2}}),
        );
        Arc::new(backend)
    }

    #[tokio::test]
    async fn init_loads_every_collection() {
        let store = EntityStore::new(seeded());
        store.init().await.unwrap();
        let snap = store.snapshot().await;
        assert_eq!(snap.players.len(), 2);
        assert_eq!(snap.items.len(), 1);
        assert_eq!(snap.loot_history.len(), 1);
        assert_eq!(snap.raid_days.len(), 1);
        assert_eq!(snap.viewer.as_ref().map(|v| v.id), Some(2));
    }

    #[tokio::test]
    async fn failed_refresh_keeps_previous_snapshot() {
        let backend = seeded();
        let store = EntityStore::new(backend.clone());
        store.init().await.unwrap();

        backend.set_reply(endpoints::GET_PLAYERS, Reply::Status(502));
        let err = store.refresh(EntityKind::Players).await.unwrap_err();
        assert_eq!(err.to_string(), "502: Bad Gateway");
        assert_eq!(store.players().await.len(), 2);
    }

    #[tokio::test]
    async fn invalid_payload_is_rejected_at_the_boundary() {
        let backend = seeded();
        let store = EntityStore::new(backend.clone());
        store.init().await.unwrap();

        backend.set_get(
            endpoints::GET_PLAYERS,
            json!([
                {"id": 1, "name": "Tharlen", "class": "MG", "rank": 50, "role": "D",
                 "wishlist": [{"prio": 11, "item_id": 100}]},
            ]),
        );
        let err = store.refresh(EntityKind::Players).await.unwrap_err();
        assert!(matches!(err, ClientError::Loot(LootError::InvalidPriority { .. })));

        backend.set_get(
            endpoints::GET_RAIDS,
            json!([
                {"id": 7, "name": "Blackwing Lair", "short_name": "BWL"},
                {"id": 7, "name": "Molten Core", "short_name": "MC"},
            ]),
        );
        let err = store.refresh(EntityKind::Raids).await.unwrap_err();
        assert!(matches!(err, ClientError::Loot(LootError::DuplicateId { kind: "raid", id: 7 })));
        assert_eq!(store.players().await.len(), 2);
        assert_eq!(store.raids().await.len(), 1);
    }

    #[tokio::test]
    async fn refresh_twice_yields_same_snapshot() {
        let store = EntityStore::new(seeded());
        store.refresh(EntityKind::Players).await.unwrap();
        let first = store.players().await;
        store.refresh(EntityKind::Players).await.unwrap();
        let second = store.players().await;
        assert_eq!(*first, *second);
    }

    #[tokio::test]
    async fn init_reports_dangling_references_after_loading() {
        let backend = seeded();
        backend.set_get(
            endpoints::GET_LOOT_HISTORY,
            json!([{"id": 1, "item_id": 999, "player_id": 1, "raid_day_id": 10}]),
        );
        let store = EntityStore::new(backend);
        let err = store.init().await.unwrap_err();
        assert!(matches!(err, ClientError::Loot(LootError::Integrity(ref r)) if r.len() == 1));
        assert_eq!(store.loot_history().await.len(), 1);
    }

    #[tokio::test]
    async fn guest_viewer_is_none() {
        let backend = seeded();
        backend.set_get(endpoints::GET_CURRENT_USER, json!({"player": null}));
        let store = EntityStore::new(backend);
        store.refresh(EntityKind::CurrentViewer).await.unwrap();
        assert!(store.viewer().await.is_none());
    }

    #[tokio::test]
    async fn disposed_store_rejects_refresh() {
        let store = EntityStore::new(seeded());
        store.dispose();
        assert!(matches!(
            store.refresh(EntityKind::Items).await,
            Err(ClientError::Disposed)
        ));
    }
}
