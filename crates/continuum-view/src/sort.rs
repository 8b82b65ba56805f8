//! Single-column stable sorting.

use std::fmt;

use crate::column::ColumnDef;
use crate::lookup::LookupContext;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn reversed(self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortState {
    pub key: &'static str,
    pub direction: SortDirection,
}

impl SortState {
    pub fn asc(key: &'static str) -> Self {
        Self {
            key,
            direction: SortDirection::Asc,
        }
    }

    pub fn desc(key: &'static str) -> Self {
        Self {
            key,
            direction: SortDirection::Desc,
        }
    }

    /// Sort `rows` in place. Rows that compare equal keep their relative
    /// order in both directions.
    pub fn apply<T>(&self, rows: &mut [&T], columns: &[ColumnDef<T>], ctx: &LookupContext) {
        let Some(column) = columns.iter().find(|c| c.key == self.key) else {
            return;
        };
        match self.direction {
            SortDirection::Asc => rows.sort_by(|a, b| column.compare(a, b, ctx)),
            SortDirection::Desc => rows.sort_by(|a, b| column.compare(b, a, ctx)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column::CellValue;
    use continuum_client::Snapshot;

    type Row = (i64, char);

    fn columns() -> Vec<ColumnDef<Row>> {
        vec![ColumnDef::<Row>::new("n", "N", |r, _| CellValue::Number(r.0))]
    }

    #[test]
    fn ties_keep_collection_order_in_both_directions() {
        let ctx = LookupContext::new(Snapshot::default());
        let rows = [(2, 'a'), (1, 'b'), (2, 'c'), (1, 'd'), (3, 'e')];
        let cols = columns();

        let mut asc: Vec<&Row> = rows.iter().collect();
        SortState::asc("n").apply(&mut asc, &cols, &ctx);
        let tags: String = asc.iter().map(|r| r.1).collect();
        assert_eq!(tags, "bdace");

        let mut desc: Vec<&Row> = rows.iter().collect();
        SortState::desc("n").apply(&mut desc, &cols, &ctx);
        let tags: String = desc.iter().map(|r| r.1).collect();
        assert_eq!(tags, "eacbd");
    }

    #[test]
    fn unknown_key_leaves_order_alone() {
        let ctx = LookupContext::new(Snapshot::default());
        let rows = [(2, 'a'), (1, 'b')];
        let mut view: Vec<&Row> = rows.iter().collect();
        SortState::asc("missing").apply(&mut view, &columns(), &ctx);
        assert_eq!(view, vec![&(2, 'a'), &(1, 'b')]);
    }
}
