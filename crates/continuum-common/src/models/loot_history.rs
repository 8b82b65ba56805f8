//! Loot history: who received which item on which raid day.

use serde::{Deserialize, Serialize};

use super::Entity;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LootHistoryRow {
    pub id: i64,
    pub item_id: i64,
    pub player_id: i64,
    pub raid_day_id: i64,
}

impl Entity for LootHistoryRow {
    const KIND_NAME: &'static str = "loot history row";

    fn id(&self) -> i64 {
        self.id
    }
}

/// A loot history row that has not been stored yet; the backend assigns the id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewLootHistoryRow {
    pub item_id: i64,
    pub player_id: i64,
    pub raid_day_id: i64,
}
