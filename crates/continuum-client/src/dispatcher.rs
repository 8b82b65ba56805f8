//! Mutation dispatch: POST a change, then re-fetch what it touched.
//!
//! The store is never patched locally. A failed POST leaves every snapshot
//! untouched and returns the error. A successful POST whose follow-up refresh
//! fails is still a success; the stale kinds are reported in
//! [`DispatchOutcome::stale`].

use std::sync::Arc;

use chrono::NaiveDate;
use continuum_common::error::LootError;
use continuum_common::models::{Item, LootHistoryRow, NewLootHistoryRow, Player};
use continuum_common::permissions::PermissionPolicy;
use continuum_common::validation::{self, is_comma_separated_list, is_json_structure};
use serde_json::{Value, json};
use tracing::{info, warn};

use crate::endpoints;
use crate::error::Result;
use crate::rest::Backend;
use crate::store::{EntityKind, EntityStore};

/// What a successful mutation refreshed.
#[derive(Debug, Default)]
pub struct DispatchOutcome {
    pub refreshed: Vec<EntityKind>,
    /// Kinds whose follow-up refresh failed, with the error text.
    pub stale: Vec<(EntityKind, String)>,
}

impl DispatchOutcome {
    pub fn is_fresh(&self) -> bool {
        self.stale.is_empty()
    }
}

/// The raid day an upload is attached to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadTarget {
    Existing(i64),
    /// Create the raid day as part of the upload.
    New {
        raid_id: i64,
        name: String,
        date: NaiveDate,
    },
}

/// An attendance or loot-history export pasted by an officer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RaidUpload {
    pub data: String,
    pub target: UploadTarget,
}

impl RaidUpload {
    fn body(&self) -> Value {
        match &self.target {
            UploadTarget::Existing(id) => json!({ "data": self.data, "raid_day_id": id }),
            UploadTarget::New { raid_id, name, date } => json!({
                "data": self.data,
                "raid_day_id": "New",
                "raid_id": raid_id,
                "raid_day_name": name,
                "date": date.format("%Y-%m-%d").to_string(),
            }),
        }
    }

    fn validate_new_day(&self) -> Result<()> {
        if let UploadTarget::New { name, .. } = &self.target {
            validation::validate_not_blank("Raid day name", name)?;
        }
        Ok(())
    }
}

pub struct MutationDispatcher {
    backend: Arc<dyn Backend>,
    store: Arc<EntityStore>,
    policy: PermissionPolicy,
}

impl MutationDispatcher {
    /// `policy` gates uploads; pass the same policy the tables use.
    pub fn new(
        backend: Arc<dyn Backend>,
        store: Arc<EntityStore>,
        policy: PermissionPolicy,
    ) -> Self {
        Self {
            backend,
            store,
            policy,
        }
    }

    pub fn policy(&self) -> &PermissionPolicy {
        &self.policy
    }

    pub fn store(&self) -> &Arc<EntityStore> {
        &self.store
    }

    // ── Entity updates ───────────────────────────────────────────────────────

    pub async fn update_player(&self, player: &Player) -> Result<DispatchOutcome> {
        validation::validate_not_blank("Name", &player.name)?;
        self.post(endpoints::UPDATE_PLAYER, json!({ "player": player })).await?;

        let mut kinds = vec![EntityKind::Players];
        if self.store.viewer().await.is_some_and(|v| v.id == player.id) {
            kinds.push(EntityKind::CurrentViewer);
        }
        Ok(self.refresh(&kinds).await)
    }

    pub async fn update_item(&self, item: &Item) -> Result<DispatchOutcome> {
        self.post(endpoints::UPDATE_ITEM, json!({ "item": item })).await?;
        Ok(self.refresh(&[EntityKind::Items]).await)
    }

    // ── Loot history ─────────────────────────────────────────────────────────

    /// Add a row. Every foreign key must resolve against the current snapshot.
    pub async fn add_loot_history(&self, row: &NewLootHistoryRow) -> Result<DispatchOutcome> {
        let snapshot = self.store.snapshot().await;
        validation::check_loot_references(
            &snapshot.collections(),
            row.item_id,
            row.player_id,
            row.raid_day_id,
        )?;

        self.post(endpoints::ADD_LOOT_HISTORY, json!({ "row": row })).await?;
        Ok(self.refresh(&[EntityKind::LootHistory]).await)
    }

    pub async fn update_loot_history(&self, row: &LootHistoryRow) -> Result<DispatchOutcome> {
        self.post(endpoints::UPDATE_LOOT_HISTORY, json!({ "row": row })).await?;
        Ok(self.refresh(&[EntityKind::LootHistory]).await)
    }

    pub async fn delete_loot_history(&self, id: i64) -> Result<DispatchOutcome> {
        self.post(endpoints::DELETE_LOOT_HISTORY, json!({ "id": id })).await?;
        Ok(self.refresh(&[EntityKind::LootHistory]).await)
    }

    // ── Uploads ──────────────────────────────────────────────────────────────

    /// Upload attendance as a comma-separated list of character names.
    pub async fn upload_attendance(&self, upload: &RaidUpload) -> Result<DispatchOutcome> {
        if !is_comma_separated_list(&upload.data) {
            return Err(LootError::validation("Input must be comma-separated list").into());
        }
        self.upload(endpoints::UPLOAD_ATTENDANCE, upload).await
    }

    /// Upload a loot-history export (a JSON document).
    pub async fn upload_loot_history(&self, upload: &RaidUpload) -> Result<DispatchOutcome> {
        if !is_json_structure(&upload.data) {
            return Err(LootError::validation("Input must be valid JSON").into());
        }
        self.upload(endpoints::UPLOAD_LOOT_HISTORY, upload).await
    }

    async fn upload(&self, path: &str, upload: &RaidUpload) -> Result<DispatchOutcome> {
        let viewer = self.store.viewer().await;
        PermissionPolicy::require(self.policy.can_upload(viewer.as_ref()), "upload raid data")?;
        upload.validate_new_day()?;

        self.post(path, upload.body()).await?;
        Ok(self
            .refresh(&[
                EntityKind::Players,
                EntityKind::LootHistory,
                EntityKind::Raids,
                EntityKind::RaidDays,
            ])
            .await)
    }

    // ── Internal ─────────────────────────────────────────────────────────────

    async fn post(&self, path: &str, body: Value) -> Result<()> {
        self.backend.post(path, &body).await?;
        info!(path, "mutation accepted");
        Ok(())
    }

    async fn refresh(&self, kinds: &[EntityKind]) -> DispatchOutcome {
        let failed = self.store.refresh_many(kinds).await;
        let stale: Vec<(EntityKind, String)> = failed
            .into_iter()
            .map(|(kind, err)| {
                warn!(%kind, error = %err, "refresh after mutation failed");
                (kind, err.to_string())
            })
            .collect();
        let refreshed = kinds
            .iter()
            .copied()
            .filter(|k| !stale.iter().any(|(s, _)| s == k))
            .collect();
        DispatchOutcome { refreshed, stale }
    }
}
