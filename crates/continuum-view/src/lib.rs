//! Continuum view model.
//!
//! Turns a store [`Snapshot`](continuum_client::Snapshot) into rendered rows:
//! derived columns, filtering, stable sorting, zebra striping, permission
//! affordances, per-row edit buffers and detail sub-views. Nothing here
//! renders; a front end draws [`RenderRow`]s however it likes.

pub mod column;
pub mod detail;
pub mod edit;
pub mod error;
pub mod filter;
pub mod lookup;
pub mod sort;
pub mod table;
pub mod tables;

pub use column::{CellValue, ColumnDef, FilterRule, SortRule};
pub use detail::{
    AttendanceCell, AttendanceMark, DetailKind, PriorityEditor, RecentAward, WishlistEditor,
};
pub use edit::{EditBuffer, RowEdit, RowState};
pub use error::{ViewError, ViewResult};
pub use filter::{ColumnFilter, FilterState};
pub use lookup::LookupContext;
pub use sort::{SortDirection, SortState};
pub use table::{RenderRow, TableEngine};
pub use tables::TableEntity;
