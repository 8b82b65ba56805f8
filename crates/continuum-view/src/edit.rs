//! Row edit state: `Viewing → Editing → Saving → Viewing`.
//!
//! A failed save drops back to `Editing` with the buffer untouched and the
//! error recorded on the row. Cancel discards the buffer.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowState {
    Viewing,
    Editing,
    Saving,
}

impl fmt::Display for RowState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Viewing => "viewing",
            Self::Editing => "editing",
            Self::Saving => "saving",
        })
    }
}

/// Pending field values, keyed by entity field name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EditBuffer {
    fields: BTreeMap<String, Value>,
}

impl EditBuffer {
    pub fn set(&mut self, field: impl Into<String>, value: Value) {
        self.fields.insert(field.into(), value);
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// `base` with every buffered field written over it.
    pub fn apply<T: Serialize + DeserializeOwned>(&self, base: &T) -> serde_json::Result<T> {
        let mut value = serde_json::to_value(base)?;
        if let Value::Object(map) = &mut value {
            for (field, v) in &self.fields {
                map.insert(field.clone(), v.clone());
            }
        }
        serde_json::from_value(value)
    }
}

/// Edit state of one row. Rows without one are `Viewing`.
#[derive(Debug, Clone, PartialEq)]
pub struct RowEdit<T> {
    pub state: RowState,
    /// The record as it was when editing began.
    pub base: T,
    pub buffer: EditBuffer,
    pub error: Option<String>,
}

impl<T: Serialize + DeserializeOwned> RowEdit<T> {
    pub fn new(base: T, buffer: EditBuffer) -> Self {
        Self {
            state: RowState::Editing,
            base,
            buffer,
            error: None,
        }
    }

    /// The record that a save would send.
    pub fn pending(&self) -> serde_json::Result<T> {
        self.buffer.apply(&self.base)
    }
}
