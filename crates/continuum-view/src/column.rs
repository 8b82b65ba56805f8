//! Derived columns.
//!
//! A column is pure data: how to project a cell from a record, how to compare
//! two records, how a filter selection is matched and which entity field an
//! edit writes. Projections that go through a lookup yield
//! [`CellValue::Empty`] when the referenced id is missing.

use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fmt;

use chrono::NaiveDate;
use continuum_common::permissions::Editability;

use crate::filter::ColumnFilter;
use crate::lookup::LookupContext;

/// A resolved cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CellValue {
    Empty,
    Text(String),
    Number(i64),
    List(Vec<String>),
    Date(NaiveDate),
    /// Text rendered as a link to `href`. Sorts, filters and prints as its text.
    Link { text: String, href: String },
}

impl CellValue {
    pub fn text(s: impl Into<String>) -> Self {
        Self::Text(s.into())
    }

    /// A link, or plain text when `href` is blank.
    pub fn link(text: impl Into<String>, href: &str) -> Self {
        let href = href.trim();
        if href.is_empty() {
            return Self::text(text);
        }
        Self::Link {
            text: text.into(),
            href: href.to_owned(),
        }
    }

    pub fn href(&self) -> Option<&str> {
        match self {
            Self::Link { href, .. } => Some(href),
            _ => None,
        }
    }

    pub fn from_option<T: Into<CellValue>>(value: Option<T>) -> Self {
        value.map_or(Self::Empty, Into::into)
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    /// Natural ordering. Empty cells sort first; mixed kinds compare by text.
    pub fn compare(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Empty, Self::Empty) => Ordering::Equal,
            (Self::Empty, _) => Ordering::Less,
            (_, Self::Empty) => Ordering::Greater,
            (Self::Number(a), Self::Number(b)) => a.cmp(b),
            (Self::Date(a), Self::Date(b)) => a.cmp(b),
            (Self::Text(a), Self::Text(b)) => a.cmp(b),
            (Self::List(a), Self::List(b)) => a.cmp(b),
            (Self::Link { text: a, .. }, Self::Link { text: b, .. }) => a.cmp(b),
            (a, b) => a.to_string().cmp(&b.to_string()),
        }
    }

    /// Whether the cell equals a multi-select choice. Lists match if any
    /// element does.
    pub fn matches_choice(&self, choice: &str) -> bool {
        match self {
            Self::Empty => false,
            Self::List(values) => values.iter().any(|v| v == choice),
            other => other.to_string() == choice,
        }
    }

    /// Substring match for free-text filters.
    pub fn contains_text(&self, needle: &str, case_sensitive: bool) -> bool {
        let haystack = self.to_string();
        if case_sensitive {
            haystack.contains(needle)
        } else {
            haystack.to_lowercase().contains(&needle.to_lowercase())
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => Ok(()),
            Self::Text(s) | Self::Link { text: s, .. } => f.write_str(s),
            Self::Number(n) => write!(f, "{n}"),
            Self::List(values) => f.write_str(&values.join(", ")),
            Self::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_owned())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<i64> for CellValue {
    fn from(n: i64) -> Self {
        Self::Number(n)
    }
}

impl From<i32> for CellValue {
    fn from(n: i32) -> Self {
        Self::Number(i64::from(n))
    }
}

impl From<NaiveDate> for CellValue {
    fn from(d: NaiveDate) -> Self {
        Self::Date(d)
    }
}

pub type Projection<T> = fn(&T, &LookupContext) -> CellValue;
pub type Comparator<T> = fn(&T, &T, &LookupContext) -> Ordering;
/// Custom filter predicate over a non-empty selection.
pub type Predicate<T> = fn(&T, &LookupContext, &BTreeSet<String>) -> bool;
pub type Choices = fn(&LookupContext) -> Vec<String>;

pub enum SortRule<T> {
    Disabled,
    /// Compare projected cells.
    ByValue,
    Custom(Comparator<T>),
}

pub enum FilterRule<T> {
    Disabled,
    /// The cell's text equals the filter text.
    Exact,
    /// The cell matches any selected choice.
    MultiSelect,
    /// The cell contains the filter text.
    Text { case_sensitive: bool },
    Custom(Predicate<T>),
}

pub struct ColumnDef<T> {
    pub key: &'static str,
    pub title: &'static str,
    pub project: Projection<T>,
    pub sort: SortRule<T>,
    pub filter: FilterRule<T>,
    pub choices: Option<Choices>,
    pub editability: Editability,
    /// Entity field written when the column is edited.
    pub field: Option<&'static str>,
}

impl<T> ColumnDef<T> {
    /// A sortable, unfiltered, read-only column.
    pub fn new(key: &'static str, title: &'static str, project: Projection<T>) -> Self {
        Self {
            key,
            title,
            project,
            sort: SortRule::ByValue,
            filter: FilterRule::Disabled,
            choices: None,
            editability: Editability::Never,
            field: None,
        }
    }

    pub fn sort_with(mut self, comparator: Comparator<T>) -> Self {
        self.sort = SortRule::Custom(comparator);
        self
    }

    pub fn unsortable(mut self) -> Self {
        self.sort = SortRule::Disabled;
        self
    }

    pub fn filter(mut self, rule: FilterRule<T>) -> Self {
        self.filter = rule;
        self
    }

    pub fn choices(mut self, choices: Choices) -> Self {
        self.choices = Some(choices);
        self
    }

    pub fn edits(mut self, field: &'static str, editability: Editability) -> Self {
        self.field = Some(field);
        self.editability = editability;
        self
    }

    pub fn is_sortable(&self) -> bool {
        !matches!(self.sort, SortRule::Disabled)
    }

    pub fn is_filterable(&self) -> bool {
        !matches!(self.filter, FilterRule::Disabled)
    }

    pub fn cell(&self, row: &T, ctx: &LookupContext) -> CellValue {
        (self.project)(row, ctx)
    }

    pub fn choice_list(&self, ctx: &LookupContext) -> Vec<String> {
        self.choices.map(|f| f(ctx)).unwrap_or_default()
    }

    /// Ascending comparison under this column's rule.
    pub fn compare(&self, a: &T, b: &T, ctx: &LookupContext) -> Ordering {
        match self.sort {
            SortRule::Disabled => Ordering::Equal,
            SortRule::ByValue => self.cell(a, ctx).compare(&self.cell(b, ctx)),
            SortRule::Custom(cmp) => cmp(a, b, ctx),
        }
    }

    /// Whether `row` passes `filter`. An inactive filter passes everything.
    pub fn passes(&self, row: &T, ctx: &LookupContext, filter: &ColumnFilter) -> bool {
        let Some(selection) = filter.selection() else {
            return true;
        };
        match &self.filter {
            FilterRule::Disabled => true,
            FilterRule::Exact => {
                let text = self.cell(row, ctx).to_string();
                selection.iter().any(|s| *s == text)
            }
            FilterRule::MultiSelect => {
                let cell = self.cell(row, ctx);
                selection.iter().any(|s| cell.matches_choice(s))
            }
            FilterRule::Text { case_sensitive } => {
                let cell = self.cell(row, ctx);
                selection
                    .iter()
                    .any(|s| cell.contains_text(s, *case_sensitive))
            }
            FilterRule::Custom(predicate) => predicate(row, ctx, &selection),
        }
    }
}
