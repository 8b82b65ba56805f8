//! Per-entity table definitions.

pub mod items;
pub mod loot_history;
pub mod players;

use async_trait::async_trait;
use continuum_client::{DispatchOutcome, MutationDispatcher, Snapshot};
use continuum_common::models::{Entity, Viewer};
use continuum_common::permissions::{Access, PermissionPolicy};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::column::ColumnDef;
use crate::detail::DetailKind;
use crate::filter::FilterState;
use crate::lookup::LookupContext;
use crate::sort::SortState;

/// A record kind that can be shown in a [`crate::TableEngine`].
#[async_trait]
pub trait TableEntity:
    Entity + Clone + Serialize + DeserializeOwned + Send + Sync + 'static
{
    const TITLE: &'static str;

    fn collection(snapshot: &Snapshot) -> &[Self];

    fn columns() -> Vec<ColumnDef<Self>>;

    /// Detail sub-views a row can expand into.
    fn details() -> &'static [DetailKind] {
        &[]
    }

    fn default_sort() -> Option<SortState>;

    fn default_filters(_ctx: &LookupContext) -> FilterState {
        FilterState::default()
    }

    fn access(policy: &PermissionPolicy, viewer: Option<&Viewer>, row: &Self) -> Access;

    fn can_edit_column(
        policy: &PermissionPolicy,
        viewer: Option<&Viewer>,
        row: &Self,
        column: &ColumnDef<Self>,
    ) -> bool;

    /// Send an edited record to the backend.
    async fn dispatch_update(
        dispatcher: &MutationDispatcher,
        row: &Self,
    ) -> continuum_client::Result<DispatchOutcome>;
}
