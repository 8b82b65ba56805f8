//! Player model: a raider on the roster, with attendance and a wishlist.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::{Entity, Prioritized, null_as_default};
use crate::catalog::{PlayerClass, Role};
use crate::error::LootResult;
use crate::validation::validate_prio_list;

/// Wishlist length.
pub const WISHLIST_SLOTS: u8 = 10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id: i64,

    pub name: String,

    pub class: PlayerClass,

    /// Guild rank (higher = more senior); see [`crate::catalog::RANKS`].
    pub rank: i32,

    pub role: Role,

    #[serde(default, deserialize_with = "null_as_default")]
    pub notes: String,

    /// Raid-day ids this character attended.
    #[serde(default, deserialize_with = "null_as_default")]
    pub attendance: BTreeSet<i64>,

    /// Other characters of the same person.
    #[serde(default, deserialize_with = "null_as_default")]
    pub alts: BTreeSet<i64>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub wishlist: Vec<WishlistEntry>,

    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

impl Player {
    /// Whether `player_id` is this character or one of its alts.
    pub fn is_same_person(&self, player_id: i64) -> bool {
        self.id == player_id || self.alts.contains(&player_id)
    }

    /// Item wished for at `prio`, if any.
    pub fn wish_at(&self, prio: u8) -> Option<i64> {
        self.wishlist
            .iter()
            .find(|w| w.prio == prio)
            .map(|w| w.item_id)
    }
}

impl Entity for Player {
    const KIND_NAME: &'static str = "player";

    fn id(&self) -> i64 {
        self.id
    }

    fn validate(&self) -> LootResult<()> {
        validate_prio_list(&self.describe(), &self.wishlist, WISHLIST_SLOTS)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WishlistEntry {
    /// 1-based position in the wishlist.
    pub prio: u8,
    pub item_id: i64,
}

impl Prioritized for WishlistEntry {
    fn prio(&self) -> u8 {
        self.prio
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload() -> serde_json::Value {
        json!({
            "id": 5,
            "name": "Tharlen",
            "class": "MG",
            "rank": 50,
            "role": "D",
            "notes": null,
            "attendance": [3, 1, 3],
            "alts": [9],
            "wishlist": [{"prio": 1, "item_id": 40}, {"prio": 3, "item_id": 41}],
        })
    }

    #[test]
    fn deserializes_backend_payload() {
        let player: Player = serde_json::from_value(payload()).unwrap();
        assert_eq!(player.class, PlayerClass::Mage);
        assert_eq!(player.notes, "");
        assert_eq!(player.attendance.len(), 2);
        assert!(player.is_active);
        assert_eq!(player.wish_at(3), Some(41));
        assert_eq!(player.wish_at(2), None);
    }

    #[test]
    fn alts_count_as_same_person() {
        let player: Player = serde_json::from_value(payload()).unwrap();
        assert!(player.is_same_person(5));
        assert!(player.is_same_person(9));
        assert!(!player.is_same_person(6));
    }

    #[test]
    fn duplicate_wishlist_prio_fails_validation() {
        let mut player: Player = serde_json::from_value(payload()).unwrap();
        player.wishlist.push(WishlistEntry { prio: 1, item_id: 42 });
        assert!(player.validate().is_err());
    }
}
