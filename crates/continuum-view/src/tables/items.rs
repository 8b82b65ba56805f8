//! Item table.
//!
//! The Bosses filter offers one "All <raid>" choice per raid followed by every
//! boss of every raid. A row passes if any selected choice names its raid or
//! one of its bosses. The first choice is selected by default so the table
//! opens on a single raid.

use std::collections::BTreeSet;

use async_trait::async_trait;
use continuum_client::{DispatchOutcome, MutationDispatcher, Snapshot};
use continuum_common::catalog::{ITEM_TIERS, ItemCategory};
use continuum_common::models::{Item, Viewer};
use continuum_common::permissions::{Access, Editability, PermissionPolicy};

use super::TableEntity;
use crate::column::{CellValue, ColumnDef, FilterRule};
use crate::detail::DetailKind;
use crate::filter::{ColumnFilter, FilterState};
use crate::lookup::LookupContext;
use crate::sort::SortState;

pub const BOSSES: &str = "bosses";

/// "All <short name>" for every raid, then every boss.
pub fn boss_choices(ctx: &LookupContext) -> Vec<String> {
    let raids = &ctx.snapshot().raids;
    raids
        .iter()
        .map(|r| r.filter_label())
        .chain(raids.iter().flat_map(|r| r.bosses.iter().cloned()))
        .collect()
}

fn matches_raid_or_boss(item: &Item, ctx: &LookupContext, selected: &BTreeSet<String>) -> bool {
    selected.iter().any(|choice| {
        let whole_raid = ctx
            .snapshot()
            .raids
            .iter()
            .any(|r| r.id == item.raid && r.filter_label() == *choice);
        whole_raid || item.bosses.contains(choice)
    })
}

fn tier_choices(_: &LookupContext) -> Vec<String> {
    ITEM_TIERS.iter().map(ToString::to_string).collect()
}

fn category_choices(_: &LookupContext) -> Vec<String> {
    ItemCategory::ALL.iter().map(|c| c.display_name().to_owned()).collect()
}

fn individual_prio(item: &Item, ctx: &LookupContext, prio: u8) -> CellValue {
    let name = item
        .individual_at(prio)
        .and_then(|p| ctx.player(p.player_id))
        .map(|p| p.name.as_str());
    CellValue::from_option(name)
}

#[async_trait]
impl TableEntity for Item {
    const TITLE: &'static str = "Items";

    fn collection(snapshot: &Snapshot) -> &[Self] {
        &snapshot.items
    }

    fn columns() -> Vec<ColumnDef<Self>> {
        vec![
            ColumnDef::<Item>::new("name", "Name", |i, _| CellValue::link(&i.name, &i.link)),
            ColumnDef::<Item>::new(BOSSES, "Bosses", |i, _| CellValue::List(i.bosses.clone()))
                .filter(FilterRule::Custom(matches_raid_or_boss))
                .choices(boss_choices),
            ColumnDef::<Item>::new("tier", "Tier", |i, _| CellValue::from(i.tier))
                .filter(FilterRule::MultiSelect)
                .choices(tier_choices)
                .edits("tier", Editability::Row),
            ColumnDef::<Item>::new("category", "Category", |i, _| {
                CellValue::from_option(i.category.map(ItemCategory::display_name))
            })
            .filter(FilterRule::MultiSelect)
            .choices(category_choices)
            .edits("category", Editability::Row),
            ColumnDef::<Item>::new("prio_1", "Prio 1", |i, ctx| individual_prio(i, ctx, 1)),
            ColumnDef::<Item>::new("prio_2", "Prio 2", |i, ctx| individual_prio(i, ctx, 2)),
            ColumnDef::<Item>::new("class_prio_1", "Class Prio 1", |i, _| {
                CellValue::from_option(i.class_at(1).map(|p| p.class.clone()))
            }),
            ColumnDef::<Item>::new("notes", "Notes", |i, _| CellValue::text(&i.notes))
                .edits("notes", Editability::Row),
        ]
    }

    fn details() -> &'static [DetailKind] {
        &[DetailKind::Priority, DetailKind::LootHistory]
    }

    fn default_sort() -> Option<SortState> {
        Some(SortState::asc("name"))
    }

    fn default_filters(ctx: &LookupContext) -> FilterState {
        let mut filters = FilterState::default();
        if let Some(first) = boss_choices(ctx).into_iter().next() {
            filters.set(BOSSES, ColumnFilter::values([first]));
        }
        filters
    }

    fn access(policy: &PermissionPolicy, viewer: Option<&Viewer>, _row: &Self) -> Access {
        policy.item_access(viewer)
    }

    fn can_edit_column(
        policy: &PermissionPolicy,
        viewer: Option<&Viewer>,
        _row: &Self,
        column: &ColumnDef<Self>,
    ) -> bool {
        policy.can_edit_item_field(viewer, column.editability)
    }

    async fn dispatch_update(
        dispatcher: &MutationDispatcher,
        row: &Self,
    ) -> continuum_client::Result<DispatchOutcome> {
        dispatcher.update_item(row).await
    }
}
