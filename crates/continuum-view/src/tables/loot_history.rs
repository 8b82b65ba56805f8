//! Loot history table.
//!
//! Every column but Raid and Item resolves through the player. Sorting by
//! Raid orders by the raid day's date, newest first by default; filtering by
//! Raid selects raid short names.

use std::cmp::Ordering;
use std::collections::BTreeSet;

use async_trait::async_trait;
use continuum_client::{DispatchOutcome, MutationDispatcher, Snapshot};
use continuum_common::catalog::{ITEM_TIERS, PlayerClass, Role};
use continuum_common::models::{LootHistoryRow, NewLootHistoryRow, Viewer};
use continuum_common::permissions::{Access, Editability, PermissionPolicy};
use tracing::info;

use super::TableEntity;
use crate::column::{CellValue, ColumnDef, FilterRule};
use crate::error::{ViewError, ViewResult};
use crate::lookup::LookupContext;
use crate::sort::SortState;
use crate::table::TableEngine;

fn raid_day_order(a: &LootHistoryRow, b: &LootHistoryRow, ctx: &LookupContext) -> Ordering {
    let date = |row: &LootHistoryRow| ctx.raid_day(row.raid_day_id).map(|d| d.date);
    // Missing raid days sort as oldest.
    date(a).cmp(&date(b))
}

fn raid_short_names(ctx: &LookupContext) -> Vec<String> {
    ctx.snapshot().raids.iter().map(|r| r.short_name.clone()).collect()
}

fn in_selected_raid(row: &LootHistoryRow, ctx: &LookupContext, selected: &BTreeSet<String>) -> bool {
    ctx.raid_of_day(row.raid_day_id)
        .is_some_and(|raid| selected.contains(&raid.short_name))
}

fn player_choices(ctx: &LookupContext) -> Vec<String> {
    sorted_names(ctx.snapshot().players.iter().map(|p| p.name.clone()))
}

fn item_choices(ctx: &LookupContext) -> Vec<String> {
    sorted_names(ctx.snapshot().items.iter().map(|i| i.name.clone()))
}

fn sorted_names(names: impl Iterator<Item = String>) -> Vec<String> {
    names.collect::<BTreeSet<_>>().into_iter().collect()
}

fn class_choices(_: &LookupContext) -> Vec<String> {
    PlayerClass::ALL.iter().map(|c| c.display_name().to_owned()).collect()
}

fn role_choices(_: &LookupContext) -> Vec<String> {
    Role::ALL.iter().map(|r| r.display_name().to_owned()).collect()
}

fn tier_choices(_: &LookupContext) -> Vec<String> {
    ITEM_TIERS.iter().map(ToString::to_string).collect()
}

#[async_trait]
impl TableEntity for LootHistoryRow {
    const TITLE: &'static str = "Loot History";

    fn collection(snapshot: &Snapshot) -> &[Self] {
        &snapshot.loot_history
    }

    fn columns() -> Vec<ColumnDef<Self>> {
        type Row = LootHistoryRow;
        vec![
            ColumnDef::<Row>::new("raid", "Raid", |r, ctx| {
                CellValue::from_option(ctx.raid_day(r.raid_day_id).map(|d| d.name.as_str()))
            })
            .sort_with(raid_day_order)
            .filter(FilterRule::Custom(in_selected_raid))
            .choices(raid_short_names)
            .edits("raid_day_id", Editability::Row),
            ColumnDef::<Row>::new("name", "Name", |r, ctx| {
                CellValue::from_option(ctx.player(r.player_id).map(|p| p.name.as_str()))
            })
            .filter(FilterRule::MultiSelect)
            .choices(player_choices)
            .edits("player_id", Editability::Row),
            ColumnDef::<Row>::new("class", "Class", |r, ctx| {
                CellValue::from_option(ctx.player(r.player_id).map(|p| p.class.display_name()))
            })
            .filter(FilterRule::MultiSelect)
            .choices(class_choices),
            ColumnDef::<Row>::new("role", "Role", |r, ctx| {
                CellValue::from_option(ctx.player(r.player_id).map(|p| p.role.display_name()))
            })
            .filter(FilterRule::MultiSelect)
            .choices(role_choices),
            ColumnDef::<Row>::new("item", "Item", |r, ctx| {
                CellValue::from_option(ctx.item(r.item_id).map(|i| i.name.as_str()))
            })
            .filter(FilterRule::MultiSelect)
            .choices(item_choices)
            .edits("item_id", Editability::Row),
            ColumnDef::<Row>::new("item_tier", "Item Tier", |r, ctx| {
                CellValue::from_option(ctx.item(r.item_id).map(|i| i.tier))
            })
            .filter(FilterRule::MultiSelect)
            .choices(tier_choices),
        ]
    }

    fn default_sort() -> Option<SortState> {
        Some(SortState::desc("raid"))
    }

    fn access(policy: &PermissionPolicy, viewer: Option<&Viewer>, _row: &Self) -> Access {
        policy.loot_access(viewer)
    }

    fn can_edit_column(
        policy: &PermissionPolicy,
        viewer: Option<&Viewer>,
        _row: &Self,
        column: &ColumnDef<Self>,
    ) -> bool {
        column.editability != Editability::Never && policy.can_manage_loot(viewer)
    }

    async fn dispatch_update(
        dispatcher: &MutationDispatcher,
        row: &Self,
    ) -> continuum_client::Result<DispatchOutcome> {
        dispatcher.update_loot_history(row).await
    }
}

/// Adding and deleting rows; only the loot table supports these.
impl TableEngine<LootHistoryRow> {
    pub fn can_add(&self, ctx: &LookupContext) -> bool {
        self.policy().can_manage_loot(ctx.viewer())
    }

    /// A starting point for a new row: the newest raid day and the first
    /// player and item by name. `None` until all three collections have data.
    pub fn draft(&self, ctx: &LookupContext) -> Option<NewLootHistoryRow> {
        let snapshot = ctx.snapshot();
        let raid_day = ctx.raid_days_newest_first().first()?.id;
        let player = snapshot.players.iter().min_by(|a, b| a.name.cmp(&b.name))?.id;
        let item = snapshot.items.iter().min_by(|a, b| a.name.cmp(&b.name))?.id;
        Some(NewLootHistoryRow {
            item_id: item,
            player_id: player,
            raid_day_id: raid_day,
        })
    }

    pub async fn add_row(
        &self,
        ctx: &LookupContext,
        dispatcher: &MutationDispatcher,
        row: &NewLootHistoryRow,
    ) -> ViewResult<DispatchOutcome> {
        if !self.can_add(ctx) {
            return Err(ViewError::forbidden("add loot history"));
        }
        let outcome = dispatcher.add_loot_history(row).await?;
        info!(item_id = row.item_id, player_id = row.player_id, "loot history row added");
        Ok(outcome)
    }

    /// Delete a row that is not being edited.
    pub async fn delete_row(
        &mut self,
        ctx: &LookupContext,
        dispatcher: &MutationDispatcher,
        id: i64,
    ) -> ViewResult<DispatchOutcome> {
        let row = self.find_row(ctx, id)?;
        if !self.policy().loot_access(ctx.viewer()).deletable {
            return Err(ViewError::forbidden("delete loot history"));
        }
        self.ensure_viewing(row.id, "delete")?;

        let outcome = dispatcher.delete_loot_history(id).await?;
        self.forget(id);
        info!(id, "loot history row deleted");
        Ok(outcome)
    }
}
