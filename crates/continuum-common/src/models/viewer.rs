//! The logged-in player driving permission checks.

use serde::{Deserialize, Serialize};

use super::null_as_default;

/// Permission levels: 0 guest, 1 member, 2 officer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewer {
    /// Player id of the logged-in character.
    pub id: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default)]
    pub permission_level: u8,
}

impl Viewer {
    pub fn new(id: i64, name: impl Into<String>, permission_level: u8) -> Self {
        Self {
            id,
            name: name.into(),
            permission_level,
        }
    }
}
