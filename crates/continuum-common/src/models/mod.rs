//! Typed records for every collection the backend serves.
//!
//! Records deserialize straight from the backend JSON. Per-record invariants
//! (priority lists) are checked by [`Entity::validate`]; cross-collection
//! references are checked by [`crate::validation::integrity_report`].

pub mod item;
pub mod loot_history;
pub mod player;
pub mod raid;
pub mod viewer;

pub use item::{ClassPrio, Item, IndividualPrio};
pub use loot_history::{LootHistoryRow, NewLootHistoryRow};
pub use player::{Player, WishlistEntry};
pub use raid::{Raid, RaidDay};
pub use viewer::Viewer;

use serde::{Deserialize, Deserializer};

use crate::error::LootResult;

/// A record identified by an integer id unique within its collection.
pub trait Entity {
    /// Singular, human-readable kind used in error messages.
    const KIND_NAME: &'static str;

    fn id(&self) -> i64;

    /// Check per-record invariants.
    fn validate(&self) -> LootResult<()> {
        Ok(())
    }

    /// Short description used when reporting a problem with this record.
    fn describe(&self) -> String {
        format!("{} {}", Self::KIND_NAME, self.id())
    }
}

/// A priority slot: wishlist entries, class and individual item priorities.
pub trait Prioritized {
    fn prio(&self) -> u8;
}

/// Treat an explicit JSON `null` the same as a missing field.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
