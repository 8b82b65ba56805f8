//! Filter state: one optional filter per column, combined by conjunction.

use std::borrow::Cow;
use std::collections::{BTreeMap, BTreeSet};

use crate::column::ColumnDef;
use crate::lookup::LookupContext;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnFilter {
    /// Multi-select choices. An empty set filters nothing.
    Values(BTreeSet<String>),
    /// Free text. Blank text filters nothing.
    Text(String),
}

impl ColumnFilter {
    pub fn values<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Values(values.into_iter().map(Into::into).collect())
    }

    /// The selection to match against, or `None` when the filter is inactive.
    pub fn selection(&self) -> Option<Cow<'_, BTreeSet<String>>> {
        match self {
            Self::Values(v) if v.is_empty() => None,
            Self::Values(v) => Some(Cow::Borrowed(v)),
            Self::Text(t) if t.trim().is_empty() => None,
            Self::Text(t) => Some(Cow::Owned(BTreeSet::from([t.clone()]))),
        }
    }

    pub fn is_active(&self) -> bool {
        self.selection().is_some()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterState {
    filters: BTreeMap<&'static str, ColumnFilter>,
}

impl FilterState {
    pub fn set(&mut self, key: &'static str, filter: ColumnFilter) {
        self.filters.insert(key, filter);
    }

    pub fn clear(&mut self, key: &str) {
        self.filters.remove(key);
    }

    pub fn get(&self, key: &str) -> Option<&ColumnFilter> {
        self.filters.get(key)
    }

    /// Active filters only.
    pub fn active(&self) -> impl Iterator<Item = (&'static str, &ColumnFilter)> {
        self.filters
            .iter()
            .filter(|(_, f)| f.is_active())
            .map(|(k, f)| (*k, f))
    }

    /// Rows passing every active filter, in input order.
    pub fn apply<'a, T>(
        &self,
        rows: impl IntoIterator<Item = &'a T>,
        columns: &[ColumnDef<T>],
        ctx: &LookupContext,
    ) -> Vec<&'a T>
    where
        T: 'a,
    {
        let active: Vec<(&ColumnDef<T>, &ColumnFilter)> = self
            .active()
            .filter_map(|(key, f)| columns.iter().find(|c| c.key == key).map(|c| (c, f)))
            .collect();

        rows.into_iter()
            .filter(|row| active.iter().all(|(col, f)| col.passes(row, ctx, f)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column::{CellValue, FilterRule};
    use continuum_client::Snapshot;

    type Row = (i64, &'static str);

    fn columns() -> Vec<ColumnDef<Row>> {
        vec![
            ColumnDef::<Row>::new("n", "N", |r, _| CellValue::Number(r.0))
                .filter(FilterRule::MultiSelect),
            ColumnDef::<Row>::new("s", "S", |r, _| CellValue::text(r.1))
                .filter(FilterRule::Text { case_sensitive: false }),
        ]
    }

    #[test]
    fn empty_selection_and_blank_text_are_inactive() {
        assert!(!ColumnFilter::Values(BTreeSet::new()).is_active());
        assert!(!ColumnFilter::Text("  ".into()).is_active());
        assert!(ColumnFilter::values(["x"]).is_active());
    }

    #[test]
    fn result_is_the_intersection_of_single_filters() {
        let ctx = LookupContext::new(Snapshot::default());
        let rows = vec![(1, "alpha"), (2, "beta"), (1, "gamma"), (3, "alphabet")];
        let cols = columns();

        let mut by_n = FilterState::default();
        by_n.set("n", ColumnFilter::values(["1", "3"]));
        let mut by_s = FilterState::default();
        by_s.set("s", ColumnFilter::Text("ALPHA".into()));
        let mut both = by_n.clone();
        both.set("s", ColumnFilter::Text("ALPHA".into()));

        let n = by_n.apply(&rows, &cols, &ctx);
        let s = by_s.apply(&rows, &cols, &ctx);
        let combined = both.apply(&rows, &cols, &ctx);

        let expected: Vec<_> = n.iter().filter(|r| s.contains(r)).copied().collect();
        assert_eq!(combined, expected);
        assert_eq!(combined, vec![&(1, "alpha"), &(3, "alphabet")]);
        for r in &combined {
            assert!(rows.contains(r));
        }
    }

    #[test]
    fn no_filters_keeps_everything_in_order() {
        let ctx = LookupContext::new(Snapshot::default());
        let rows = vec![(2, "b"), (1, "a")];
        let all = FilterState::default().apply(&rows, &columns(), &ctx);
        assert_eq!(all, vec![&(2, "b"), &(1, "a")]);
    }
}
