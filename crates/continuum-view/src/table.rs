//! The table engine: filter, sort, decorate, expand.
//!
//! [`TableEngine::rows`] is a pure function of the snapshot and the engine's
//! filter, sort, edit and expansion state. Row visibility comes first (hidden
//! rows never reach a filter), then the conjunction of active column filters,
//! then a stable sort on the single active column. Decoration adds the zebra
//! stripe by final position, the permitted actions and, for rows in edit, the
//! buffered values in place of the stored ones.

use std::borrow::Cow;
use std::collections::BTreeMap;

use continuum_client::{ClientError, DispatchOutcome, MutationDispatcher};
use continuum_common::permissions::{PermissionPolicy, RowActions};
use serde_json::Value;
use tracing::{debug, warn};

use crate::column::{CellValue, ColumnDef};
use crate::detail::DetailKind;
use crate::edit::{EditBuffer, RowEdit, RowState};
use crate::error::{ViewError, ViewResult};
use crate::filter::{ColumnFilter, FilterState};
use crate::lookup::LookupContext;
use crate::sort::{SortDirection, SortState};
use crate::tables::TableEntity;

/// One row ready to draw.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderRow {
    pub id: i64,
    /// Position after filtering and sorting.
    pub position: usize,
    /// Alternate-row shading.
    pub striped: bool,
    /// One cell per column, in column order.
    pub cells: Vec<CellValue>,
    pub state: RowState,
    pub buffer: Option<EditBuffer>,
    pub actions: RowActions,
    pub expanded: Option<DetailKind>,
    /// Message of the last failed save.
    pub error: Option<String>,
    /// Columns the viewer may change while the row is in edit.
    pub editable_columns: Vec<&'static str>,
}

pub struct TableEngine<T: TableEntity> {
    columns: Vec<ColumnDef<T>>,
    policy: PermissionPolicy,
    filters: FilterState,
    sort: Option<SortState>,
    edits: BTreeMap<i64, RowEdit<T>>,
    expanded: BTreeMap<i64, DetailKind>,
}

impl<T: TableEntity> TableEngine<T> {
    /// An engine with the table's default sort and no filters.
    pub fn new(policy: PermissionPolicy) -> Self {
        Self {
            columns: T::columns(),
            policy,
            filters: FilterState::default(),
            sort: T::default_sort(),
            edits: BTreeMap::new(),
            expanded: BTreeMap::new(),
        }
    }

    /// An engine with the table's default sort and default filters.
    pub fn with_defaults(policy: PermissionPolicy, ctx: &LookupContext) -> Self {
        let mut engine = Self::new(policy);
        engine.apply_default_filters(ctx);
        engine
    }

    /// Replace the filter state with the table's defaults for `ctx`.
    pub fn apply_default_filters(&mut self, ctx: &LookupContext) {
        self.filters = T::default_filters(ctx);
    }

    pub fn policy(&self) -> &PermissionPolicy {
        &self.policy
    }

    pub fn columns(&self) -> &[ColumnDef<T>] {
        &self.columns
    }

    pub fn filters(&self) -> &FilterState {
        &self.filters
    }

    pub fn sort_state(&self) -> Option<SortState> {
        self.sort
    }

    pub fn column(&self, key: &str) -> ViewResult<&ColumnDef<T>> {
        self.columns
            .iter()
            .find(|c| c.key == key)
            .ok_or_else(|| ViewError::UnknownColumn { key: key.to_owned() })
    }

    // ── Filtering and sorting ────────────────────────────────────────────────

    fn filterable(&self, key: &str) -> ViewResult<&'static str> {
        let col = self.column(key)?;
        if !col.is_filterable() {
            return Err(ViewError::NotFilterable { key: key.to_owned() });
        }
        Ok(col.key)
    }

    pub fn set_filter_values<I, S>(&mut self, key: &str, values: I) -> ViewResult<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let key = self.filterable(key)?;
        self.filters.set(key, ColumnFilter::values(values));
        Ok(())
    }

    pub fn set_filter_text(&mut self, key: &str, text: impl Into<String>) -> ViewResult<()> {
        let key = self.filterable(key)?;
        self.filters.set(key, ColumnFilter::Text(text.into()));
        Ok(())
    }

    pub fn clear_filter(&mut self, key: &str) {
        self.filters.clear(key);
    }

    /// Choices offered by a column's filter.
    pub fn filter_choices(&self, key: &str, ctx: &LookupContext) -> ViewResult<Vec<String>> {
        Ok(self.column(key)?.choice_list(ctx))
    }

    pub fn sort_by(&mut self, key: &str, direction: SortDirection) -> ViewResult<()> {
        let col = self.column(key)?;
        if !col.is_sortable() {
            return Err(ViewError::NotSortable { key: key.to_owned() });
        }
        self.sort = Some(SortState {
            key: col.key,
            direction,
        });
        Ok(())
    }

    /// Sort ascending by `key`, or flip the direction if already sorted by it.
    pub fn toggle_sort(&mut self, key: &str) -> ViewResult<()> {
        let direction = match self.sort {
            Some(s) if s.key == key => s.direction.reversed(),
            _ => SortDirection::Asc,
        };
        self.sort_by(key, direction)
    }

    // ── Rendering ────────────────────────────────────────────────────────────

    pub fn rows(&self, ctx: &LookupContext) -> Vec<RenderRow> {
        let viewer = ctx.viewer();
        let visible = T::collection(ctx.snapshot())
            .iter()
            .filter(|row| T::access(&self.policy, viewer, row).visible);

        let mut rows = self.filters.apply(visible, &self.columns, ctx);
        if let Some(sort) = &self.sort {
            sort.apply(&mut rows, &self.columns, ctx);
        }

        rows.into_iter()
            .enumerate()
            .map(|(position, row)| self.decorate(ctx, position, row))
            .collect()
    }

    fn decorate(&self, ctx: &LookupContext, position: usize, row: &T) -> RenderRow {
        let id = row.id();
        let viewer = ctx.viewer();
        let access = T::access(&self.policy, viewer, row);
        let edit = self.edits.get(&id);
        let state = edit.map_or(RowState::Viewing, |e| e.state);

        let shown: Cow<'_, T> = match edit.and_then(|e| e.pending().ok()) {
            Some(pending) => Cow::Owned(pending),
            None => Cow::Borrowed(row),
        };
        let cells = self.columns.iter().map(|c| c.cell(&shown, ctx)).collect();

        let mut actions = match state {
            RowState::Viewing => {
                let mut a = RowActions::empty();
                a.set(RowActions::EDIT, access.editable);
                a.set(RowActions::DELETE, access.deletable);
                a
            }
            RowState::Editing => RowActions::SAVE | RowActions::CANCEL,
            RowState::Saving => RowActions::empty(),
        };
        actions.set(RowActions::EXPAND, !T::details().is_empty());

        let editable_columns = if state == RowState::Editing {
            self.editable_columns(ctx, row)
        } else {
            Vec::new()
        };

        RenderRow {
            id,
            position,
            striped: position % 2 == 1,
            cells,
            state,
            buffer: edit.map(|e| e.buffer.clone()),
            actions,
            expanded: self.expanded.get(&id).copied(),
            error: edit.and_then(|e| e.error.clone()),
            editable_columns,
        }
    }

    fn editable_columns(&self, ctx: &LookupContext, row: &T) -> Vec<&'static str> {
        self.columns
            .iter()
            .filter(|c| c.field.is_some() && T::can_edit_column(&self.policy, ctx.viewer(), row, c))
            .map(|c| c.key)
            .collect()
    }

    // ── Edit state machine ───────────────────────────────────────────────────

    pub fn row_state(&self, id: i64) -> RowState {
        self.edits.get(&id).map_or(RowState::Viewing, |e| e.state)
    }

    pub(crate) fn find_row<'c>(&self, ctx: &'c LookupContext, id: i64) -> ViewResult<&'c T> {
        T::collection(ctx.snapshot())
            .iter()
            .find(|r| r.id() == id)
            .ok_or(ViewError::UnknownRow { id })
    }

    pub(crate) fn ensure_viewing(&self, id: i64, action: &'static str) -> ViewResult<()> {
        match self.edits.get(&id) {
            Some(edit) => Err(ViewError::InvalidTransition {
                id,
                state: edit.state,
                action,
            }),
            None => Ok(()),
        }
    }

    /// Drop all per-row state for a row that no longer exists.
    pub(crate) fn forget(&mut self, id: i64) {
        self.edits.remove(&id);
        self.expanded.remove(&id);
    }

    /// `Viewing → Editing`. The buffer starts with the current value of every
    /// column the viewer may edit.
    pub fn begin_edit(&mut self, ctx: &LookupContext, id: i64) -> ViewResult<()> {
        let row = self.find_row(ctx, id)?;
        self.ensure_viewing(id, "edit")?;
        if !T::access(&self.policy, ctx.viewer(), row).editable {
            return Err(ViewError::forbidden(format!("edit {}", row.describe())));
        }

        let current = serde_json::to_value(row)?;
        let mut buffer = EditBuffer::default();
        let editable = self
            .columns
            .iter()
            .filter(|c| T::can_edit_column(&self.policy, ctx.viewer(), row, c));
        for field in editable.filter_map(|c| c.field) {
            if let Some(value) = current.get(field) {
                buffer.set(field, value.clone());
            }
        }

        self.edits.insert(id, RowEdit::new(row.clone(), buffer));
        debug!(table = T::TITLE, id, "editing");
        Ok(())
    }

    /// Buffer a new value for the field behind column `key`.
    pub fn set_field(
        &mut self,
        ctx: &LookupContext,
        id: i64,
        key: &str,
        value: Value,
    ) -> ViewResult<()> {
        let row = self.find_row(ctx, id)?;
        let state = self.row_state(id);
        if state != RowState::Editing {
            return Err(ViewError::InvalidTransition {
                id,
                state,
                action: "change",
            });
        }

        let col = self.column(key)?;
        let field = match col.field {
            Some(field) if T::can_edit_column(&self.policy, ctx.viewer(), row, col) => field,
            _ => return Err(ViewError::forbidden(format!("edit column '{key}'"))),
        };

        let Some(edit) = self.edits.get_mut(&id) else {
            return Err(ViewError::UnknownRow { id });
        };
        let mut trial = edit.buffer.clone();
        trial.set(field, value);
        trial
            .apply(&edit.base)
            .map_err(|e| ViewError::InvalidValue {
                field: field.to_owned(),
                message: e.to_string(),
            })?;
        edit.buffer = trial;
        Ok(())
    }

    /// `Editing → Viewing`, discarding the buffer.
    pub fn cancel_edit(&mut self, id: i64) -> ViewResult<()> {
        let state = self.row_state(id);
        if state != RowState::Editing {
            return Err(ViewError::InvalidTransition {
                id,
                state,
                action: "cancel",
            });
        }
        self.edits.remove(&id);
        Ok(())
    }

    /// `Editing → Saving`. Returns the record to send.
    pub fn begin_save(&mut self, id: i64) -> ViewResult<T> {
        let state = self.row_state(id);
        let edit = match self.edits.get_mut(&id) {
            Some(edit) if state == RowState::Editing => edit,
            _ => {
                return Err(ViewError::InvalidTransition {
                    id,
                    state,
                    action: "save",
                });
            }
        };
        let pending = edit.pending()?;
        edit.state = RowState::Saving;
        edit.error = None;
        Ok(pending)
    }

    /// `Saving → Viewing` on success; `Saving → Editing` with the buffer kept
    /// and the error recorded on failure.
    pub fn finish_save(
        &mut self,
        id: i64,
        result: Result<DispatchOutcome, ClientError>,
    ) -> ViewResult<DispatchOutcome> {
        match result {
            Ok(outcome) => {
                self.edits.remove(&id);
                debug!(table = T::TITLE, id, "saved");
                Ok(outcome)
            }
            Err(err) => {
                warn!(table = T::TITLE, id, error = %err, "save failed");
                if let Some(edit) = self.edits.get_mut(&id) {
                    edit.state = RowState::Editing;
                    edit.error = Some(err.to_string());
                }
                Err(err.into())
            }
        }
    }

    /// Flush the row's buffer through the dispatcher.
    pub async fn save(
        &mut self,
        dispatcher: &MutationDispatcher,
        id: i64,
    ) -> ViewResult<DispatchOutcome> {
        let pending = self.begin_save(id)?;
        let result = T::dispatch_update(dispatcher, &pending).await;
        self.finish_save(id, result)
    }

    // ── Detail sub-views ─────────────────────────────────────────────────────

    /// Open `kind` under the row, closing whatever was open there. Toggling
    /// the open kind closes it. Returns what is open afterwards.
    pub fn toggle_detail(
        &mut self,
        ctx: &LookupContext,
        id: i64,
        kind: DetailKind,
    ) -> ViewResult<Option<DetailKind>> {
        self.find_row(ctx, id)?;
        if !T::details().contains(&kind) {
            return Err(ViewError::UnsupportedDetail(kind));
        }
        if self.expanded.get(&id) == Some(&kind) {
            self.expanded.remove(&id);
            Ok(None)
        } else {
            self.expanded.insert(id, kind);
            Ok(Some(kind))
        }
    }

    pub fn expanded(&self, id: i64) -> Option<DetailKind> {
        self.expanded.get(&id).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use continuum_client::memory::Reply;
    use continuum_client::{EntityStore, MemoryBackend, endpoints};
    use continuum_common::models::{Item, LootHistoryRow, Player, Viewer};
    use serde_json::json;
    use std::sync::Arc;

    fn fixture(level: Option<u8>) -> Value {
        let viewer = level.map(|l| json!({"id": 2, "name": "Grum", "permission_level": l}));
        json!({
            "players": [
                {"id": 1, "name": "Tharlen", "class": "MG", "rank": 50, "role": "D"},
                {"id": 2, "name": "Grum", "class": "WR", "rank": 70, "role": "T"},
                {"id": 3, "name": "Aeris", "class": "PR", "rank": 47, "role": "H", "is_active": false},
                {"id": 5, "name": "Bram", "class": "MG", "rank": 30, "role": "D"},
            ],
            "items": [
                {"id": 100, "name": "Staff of the Shadow Flame", "tier": 1, "raid": 7, "bosses": ["Nefarian"]},
                {"id": 101, "name": "Onyxia Tooth Pendant", "tier": 2, "raid": 7, "bosses": ["Onyxia"]},
                {"id": 102, "name": "Bindings of Transcendence", "tier": 1, "raid": 8, "bosses": ["Garr"]},
            ],
            "loot_history": [
                {"id": 1, "item_id": 100, "player_id": 1, "raid_day_id": 10},
                {"id": 2, "item_id": 101, "player_id": 2, "raid_day_id": 11},
                {"id": 3, "item_id": 102, "player_id": 5, "raid_day_id": 10},
            ],
            "raids": [
                {"id": 7, "name": "Blackwing Lair", "short_name": "BWL", "bosses": ["Nefarian"]},
                {"id": 8, "name": "Molten Core", "short_name": "MC", "bosses": ["Garr"]},
            ],
            "raid_days": [
                {"id": 10, "name": "BWL 1", "date": "2020-11-18", "raid_id": 7},
                {"id": 11, "name": "BWL 2", "date": "2020-11-25", "raid_id": 7},
            ],
            "current_user": viewer,
        })
    }

    async fn setup(level: Option<u8>) -> (Arc<MemoryBackend>, Arc<EntityStore>, MutationDispatcher) {
        let backend = Arc::new(MemoryBackend::from_fixture(fixture(level)));
        let store = Arc::new(EntityStore::new(backend.clone()));
        store.init().await.unwrap();
        let dispatcher =
            MutationDispatcher::new(backend.clone(), store.clone(), PermissionPolicy::default());
        (backend, store, dispatcher)
    }

    async fn ctx(store: &EntityStore) -> LookupContext {
        LookupContext::new(store.snapshot().await)
    }

    fn names(rows: &[RenderRow]) -> Vec<String> {
        rows.iter().map(|r| r.cells[0].to_string()).collect()
    }

    #[tokio::test]
    async fn guest_sees_no_edit_affordance() {
        let (_, store, _) = setup(None).await;
        let ctx = ctx(&store).await;
        let mut engine = TableEngine::<Player>::new(PermissionPolicy::default());

        let rows = engine.rows(&ctx);
        assert!(rows.iter().all(|r| !r.actions.contains(RowActions::EDIT)));
        assert!(rows.iter().all(|r| r.actions.contains(RowActions::EXPAND)));
        assert!(matches!(
            engine.begin_edit(&ctx, 5),
            Err(ViewError::Forbidden { .. })
        ));
    }

    #[tokio::test]
    async fn players_sorted_by_name_with_zebra_stripes_and_inactive_hidden() {
        let (_, store, _) = setup(Some(1)).await;
        let ctx = ctx(&store).await;
        let engine = TableEngine::<Player>::new(PermissionPolicy::default());

        let rows = engine.rows(&ctx);
        assert_eq!(names(&rows), ["Bram", "Grum", "Tharlen"]);
        let stripes: Vec<bool> = rows.iter().map(|r| r.striped).collect();
        assert_eq!(stripes, [false, true, false]);
        assert_eq!(
            rows.iter().map(|r| r.position).collect::<Vec<_>>(),
            [0, 1, 2]
        );
    }

    #[tokio::test]
    async fn officers_see_inactive_players() {
        let (_, store, _) = setup(Some(2)).await;
        let ctx = ctx(&store).await;
        let engine = TableEngine::<Player>::new(PermissionPolicy::default());
        assert_eq!(engine.rows(&ctx).len(), 4);
    }

    #[tokio::test]
    async fn loot_class_filter_keeps_only_mages_newest_first() {
        let (_, store, _) = setup(Some(2)).await;
        let ctx = ctx(&store).await;
        let mut engine = TableEngine::<LootHistoryRow>::new(PermissionPolicy::default());
        engine.set_filter_values("class", ["Mage"]).unwrap();

        let rows = engine.rows(&ctx);
        let ids: Vec<i64> = rows.iter().map(|r| r.id).collect();
        assert_eq!(ids, [1, 3]);
        assert!(rows.iter().all(|r| r.cells[2] == CellValue::text("Mage")));

        engine.clear_filter("class");
        let ids: Vec<i64> = engine.rows(&ctx).iter().map(|r| r.id).collect();
        assert_eq!(ids, [2, 1, 3]);
    }

    #[tokio::test]
    async fn item_table_opens_on_first_raid() {
        let (_, store, _) = setup(Some(1)).await;
        let ctx = ctx(&store).await;
        let mut engine = TableEngine::<Item>::with_defaults(PermissionPolicy::default(), &ctx);

        // "All BWL" keeps the Onyxia item because it drops in raid 7.
        assert_eq!(names(&engine.rows(&ctx)), [
            "Onyxia Tooth Pendant",
            "Staff of the Shadow Flame"
        ]);

        engine.set_filter_values("bosses", ["Garr"]).unwrap();
        assert_eq!(names(&engine.rows(&ctx)), ["Bindings of Transcendence"]);
        assert!(matches!(
            engine.set_filter_text("prio_1", "Grum"),
            Err(ViewError::NotFilterable { .. })
        ));
    }

    #[tokio::test]
    async fn failed_save_keeps_buffer_and_records_error() {
        let (backend, store, dispatcher) = setup(Some(2)).await;
        backend.set_post_reply(endpoints::UPDATE_LOOT_HISTORY, Reply::Status(500));
        let ctx = ctx(&store).await;
        let mut engine = TableEngine::<LootHistoryRow>::new(PermissionPolicy::default());

        engine.begin_edit(&ctx, 1).unwrap();
        engine.set_field(&ctx, 1, "name", json!(2)).unwrap();
        let fetches = backend.get_count(endpoints::GET_LOOT_HISTORY);

        let err = engine.save(&dispatcher, 1).await.unwrap_err();
        assert_eq!(err.to_string(), "500: Internal Server Error");
        assert_eq!(backend.get_count(endpoints::GET_LOOT_HISTORY), fetches);

        let row = engine.rows(&ctx).into_iter().find(|r| r.id == 1).unwrap();
        assert_eq!(row.state, RowState::Editing);
        assert_eq!(row.buffer.unwrap().get("player_id"), Some(&json!(2)));
        assert_eq!(row.error.as_deref(), Some("500: Internal Server Error"));
        assert_eq!(row.actions, RowActions::SAVE | RowActions::CANCEL);
        // The buffered player shows in place of the stored one.
        assert_eq!(row.cells[1], CellValue::text("Grum"));
        assert_eq!(store.loot_history().await[0].player_id, 1);
    }

    #[tokio::test]
    async fn successful_save_returns_to_viewing_and_refreshes() {
        let (backend, store, dispatcher) = setup(Some(2)).await;
        let ctx = ctx(&store).await;
        let mut engine = TableEngine::<LootHistoryRow>::new(PermissionPolicy::default());

        engine.begin_edit(&ctx, 1).unwrap();
        engine.set_field(&ctx, 1, "item", json!(101)).unwrap();
        let fetches = backend.get_count(endpoints::GET_LOOT_HISTORY);
        let outcome = engine.save(&dispatcher, 1).await.unwrap();

        assert!(outcome.is_fresh());
        assert_eq!(engine.row_state(1), RowState::Viewing);
        assert_eq!(backend.get_count(endpoints::GET_LOOT_HISTORY), fetches + 1);
        assert_eq!(backend.posts()[0].1["row"]["item_id"], 101);
    }

    #[tokio::test]
    async fn saving_row_offers_no_actions_until_finished() {
        let (_, store, _) = setup(Some(2)).await;
        let ctx = ctx(&store).await;
        let mut engine = TableEngine::<LootHistoryRow>::new(PermissionPolicy::default());

        engine.begin_edit(&ctx, 2).unwrap();
        let pending = engine.begin_save(2).unwrap();
        assert_eq!(pending.id, 2);
        let row = engine.rows(&ctx).into_iter().find(|r| r.id == 2).unwrap();
        assert_eq!(row.state, RowState::Saving);
        assert!(row.actions.is_empty());
        assert!(matches!(
            engine.cancel_edit(2),
            Err(ViewError::InvalidTransition { state: RowState::Saving, .. })
        ));

        engine.finish_save(2, Ok(DispatchOutcome::default())).unwrap();
        assert_eq!(engine.row_state(2), RowState::Viewing);
    }

    #[tokio::test]
    async fn member_cannot_touch_officer_columns_on_own_row() {
        let (_, store, _) = setup(Some(1)).await;
        let ctx = ctx(&store).await;
        let mut engine = TableEngine::<Player>::new(PermissionPolicy::default());

        engine.begin_edit(&ctx, 2).unwrap();
        let row = engine.rows(&ctx).into_iter().find(|r| r.id == 2).unwrap();
        assert_eq!(row.editable_columns, ["role", "notes"]);
        assert!(matches!(
            engine.set_field(&ctx, 2, "rank", json!(80)),
            Err(ViewError::Forbidden { .. })
        ));
        assert!(matches!(
            engine.set_field(&ctx, 2, "role", json!("Healer")),
            Err(ViewError::InvalidValue { .. })
        ));
        engine.set_field(&ctx, 2, "role", json!("H")).unwrap();
        engine.cancel_edit(2).unwrap();
        assert!(engine.rows(&ctx).iter().all(|r| r.buffer.is_none()));
    }

    #[tokio::test]
    async fn one_detail_per_row() {
        let (_, store, _) = setup(Some(1)).await;
        let ctx = ctx(&store).await;
        let mut engine = TableEngine::<Player>::new(PermissionPolicy::default());

        assert_eq!(
            engine.toggle_detail(&ctx, 1, DetailKind::Wishlist).unwrap(),
            Some(DetailKind::Wishlist)
        );
        assert_eq!(
            engine.toggle_detail(&ctx, 1, DetailKind::Attendance).unwrap(),
            Some(DetailKind::Attendance)
        );
        engine.toggle_detail(&ctx, 2, DetailKind::Wishlist).unwrap();
        assert_eq!(engine.expanded(1), Some(DetailKind::Attendance));
        assert_eq!(engine.toggle_detail(&ctx, 1, DetailKind::Attendance).unwrap(), None);
        assert!(matches!(
            engine.toggle_detail(&ctx, 1, DetailKind::Priority),
            Err(ViewError::UnsupportedDetail(DetailKind::Priority))
        ));
    }

    #[tokio::test]
    async fn refresh_preserves_rendering() {
        let (_, store, _) = setup(Some(2)).await;
        let engine = TableEngine::<LootHistoryRow>::new(PermissionPolicy::default());
        let before = engine.rows(&ctx(&store).await);
        store.refresh(continuum_client::EntityKind::LootHistory).await.unwrap();
        assert_eq!(engine.rows(&ctx(&store).await), before);
    }

    #[tokio::test]
    async fn loot_rows_delete_only_for_officers() {
        let (backend, store, dispatcher) = setup(Some(2)).await;
        let ctx = ctx(&store).await;
        let mut engine = TableEngine::<LootHistoryRow>::new(PermissionPolicy::default());
        engine.delete_row(&ctx, &dispatcher, 3).await.unwrap();
        assert_eq!(backend.posts()[0].1, json!({"id": 3}));

        store.set_viewer(Some(Viewer::new(2, "Grum", 1))).await;
        let ctx = LookupContext::new(store.snapshot().await);
        assert!(engine.rows(&ctx).iter().all(|r| r.actions == RowActions::empty()));
        assert!(matches!(
            engine.delete_row(&ctx, &dispatcher, 1).await,
            Err(ViewError::Forbidden { .. })
        ));
        let draft = engine.draft(&ctx).unwrap();
        assert!(matches!(
            engine.add_row(&ctx, &dispatcher, &draft).await,
            Err(ViewError::Forbidden { .. })
        ));
    }
}
