//! Roster table.

use async_trait::async_trait;
use continuum_client::{DispatchOutcome, MutationDispatcher, Snapshot};
use continuum_common::catalog::{self, PlayerClass, Role};
use continuum_common::models::{Player, Viewer};
use continuum_common::permissions::{Access, Editability, PermissionPolicy};

use super::TableEntity;
use crate::column::{CellValue, ColumnDef, FilterRule};
use crate::detail::DetailKind;
use crate::sort::SortState;

fn class_choices(_: &crate::LookupContext) -> Vec<String> {
    PlayerClass::ALL.iter().map(|c| c.display_name().to_owned()).collect()
}

fn rank_choices(_: &crate::LookupContext) -> Vec<String> {
    catalog::RANKS.iter().map(|(_, title)| (*title).to_owned()).collect()
}

fn role_choices(_: &crate::LookupContext) -> Vec<String> {
    Role::ALL.iter().map(|r| r.display_name().to_owned()).collect()
}

#[async_trait]
impl TableEntity for Player {
    const TITLE: &'static str = "Players";

    fn collection(snapshot: &Snapshot) -> &[Self] {
        &snapshot.players
    }

    fn columns() -> Vec<ColumnDef<Self>> {
        vec![
            ColumnDef::<Player>::new("name", "Name", |p, _| CellValue::text(&p.name))
                .edits("name", Editability::Officer),
            ColumnDef::<Player>::new("class", "Class", |p, _| {
                CellValue::text(p.class.display_name())
            })
            .filter(FilterRule::MultiSelect)
            .choices(class_choices)
            .edits("class", Editability::Officer),
            // Sorted by rank number so seniority order survives.
            ColumnDef::<Player>::new("rank", "Rank", |p, _| {
                CellValue::from_option(catalog::rank_title(p.rank))
            })
            .sort_with(|a, b, _| a.rank.cmp(&b.rank))
            .filter(FilterRule::MultiSelect)
            .choices(rank_choices)
            .edits("rank", Editability::Officer),
            ColumnDef::<Player>::new("role", "Role", |p, _| CellValue::text(p.role.display_name()))
                .filter(FilterRule::MultiSelect)
                .choices(role_choices)
                .edits("role", Editability::Row),
            ColumnDef::<Player>::new("notes", "Notes", |p, _| CellValue::text(&p.notes))
                .edits("notes", Editability::Row),
        ]
    }

    fn details() -> &'static [DetailKind] {
        &[DetailKind::Wishlist, DetailKind::Attendance, DetailKind::LootHistory]
    }

    fn default_sort() -> Option<SortState> {
        Some(SortState::asc("name"))
    }

    fn access(policy: &PermissionPolicy, viewer: Option<&Viewer>, row: &Self) -> Access {
        policy.player_access(viewer, row)
    }

    fn can_edit_column(
        policy: &PermissionPolicy,
        viewer: Option<&Viewer>,
        row: &Self,
        column: &ColumnDef<Self>,
    ) -> bool {
        policy.can_edit_player_field(viewer, row, column.editability)
    }

    async fn dispatch_update(
        dispatcher: &MutationDispatcher,
        row: &Self,
    ) -> continuum_client::Result<DispatchOutcome> {
        dispatcher.update_player(row).await
    }
}
