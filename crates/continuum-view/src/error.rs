//! Error types for the view model.

use continuum_client::ClientError;
use continuum_common::error::LootError;
use thiserror::Error;

use crate::detail::DetailKind;
use crate::edit::RowState;

#[derive(Debug, Error)]
pub enum ViewError {
    #[error("No row with id {id}")]
    UnknownRow { id: i64 },

    #[error("No column '{key}'")]
    UnknownColumn { key: String },

    #[error("Column '{key}' cannot be filtered")]
    NotFilterable { key: String },

    #[error("Column '{key}' cannot be sorted")]
    NotSortable { key: String },

    #[error("Forbidden: {action}")]
    Forbidden { action: String },

    /// The row is not in a state that allows the action.
    #[error("Cannot {action} row {id} while {state}")]
    InvalidTransition {
        id: i64,
        state: RowState,
        action: &'static str,
    },

    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },

    #[error("Slot {slot} is outside 1..={max}")]
    SlotOutOfRange { slot: usize, max: usize },

    #[error("This table has no {0} detail view")]
    UnsupportedDetail(DetailKind),

    #[error(transparent)]
    Client(#[from] ClientError),

    #[error(transparent)]
    Loot(#[from] LootError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ViewError {
    pub fn forbidden(action: impl Into<String>) -> Self {
        Self::Forbidden {
            action: action.into(),
        }
    }
}

pub type ViewResult<T> = std::result::Result<T, ViewError>;
