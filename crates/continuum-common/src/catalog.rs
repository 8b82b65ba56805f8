//! Static lookup catalogs: class, role and item-category codes, guild ranks
//! and item tiers.
//!
//! The backend stores short codes (`"MG"`, `"H"`, `"CS"`); every table shows
//! the display name. Codes are parsed into enums at the payload boundary so an
//! unknown code fails the refresh instead of rendering as a blank cell.

use serde::{Deserialize, Serialize};

/// Character class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PlayerClass {
    #[serde(rename = "DR")]
    Druid,
    #[serde(rename = "HN")]
    Hunter,
    #[serde(rename = "MG")]
    Mage,
    #[serde(rename = "PL")]
    Paladin,
    #[serde(rename = "PR")]
    Priest,
    #[serde(rename = "RG")]
    Rogue,
    #[serde(rename = "SH")]
    Shaman,
    #[serde(rename = "WL")]
    Warlock,
    #[serde(rename = "WR")]
    Warrior,
}

impl PlayerClass {
    pub const ALL: [PlayerClass; 9] = [
        Self::Druid,
        Self::Hunter,
        Self::Mage,
        Self::Paladin,
        Self::Priest,
        Self::Rogue,
        Self::Shaman,
        Self::Warlock,
        Self::Warrior,
    ];

    pub fn code(self) -> &'static str {
        match self {
            Self::Druid => "DR",
            Self::Hunter => "HN",
            Self::Mage => "MG",
            Self::Paladin => "PL",
            Self::Priest => "PR",
            Self::Rogue => "RG",
            Self::Shaman => "SH",
            Self::Warlock => "WL",
            Self::Warrior => "WR",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Self::Druid => "Druid",
            Self::Hunter => "Hunter",
            Self::Mage => "Mage",
            Self::Paladin => "Paladin",
            Self::Priest => "Priest",
            Self::Rogue => "Rogue",
            Self::Shaman => "Shaman",
            Self::Warlock => "Warlock",
            Self::Warrior => "Warrior",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.code() == code)
    }
}

/// Raid role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Role {
    #[serde(rename = "D")]
    Dps,
    #[serde(rename = "T")]
    Tank,
    #[serde(rename = "H")]
    Healer,
}

impl Role {
    pub const ALL: [Role; 3] = [Self::Dps, Self::Tank, Self::Healer];

    pub fn code(self) -> &'static str {
        match self {
            Self::Dps => "D",
            Self::Tank => "T",
            Self::Healer => "H",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Self::Dps => "DPS",
            Self::Tank => "Tank",
            Self::Healer => "Healer",
        }
    }
}

/// Loot category an item is aimed at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ItemCategory {
    #[serde(rename = "CS")]
    Caster,
    #[serde(rename = "HL")]
    Healer,
    #[serde(rename = "PH")]
    Physical,
    #[serde(rename = "TN")]
    Tank,
}

impl ItemCategory {
    pub const ALL: [ItemCategory; 4] = [Self::Caster, Self::Healer, Self::Physical, Self::Tank];

    pub fn code(self) -> &'static str {
        match self {
            Self::Caster => "CS",
            Self::Healer => "HL",
            Self::Physical => "PH",
            Self::Tank => "TN",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Self::Caster => "Caster",
            Self::Healer => "Healer",
            Self::Physical => "Physical",
            Self::Tank => "Tank",
        }
    }
}

/// Guild ranks shown in the roster, most senior first.
///
/// Rank 0 ("Inactive") exists on the backend but is never displayed.
pub const RANKS: [(i32, &str); 9] = [
    (80, "GM"),
    (70, "Officer"),
    (60, "Class Lead"),
    (50, "Core Raider"),
    (47, "Raider"),
    (40, "Veteran"),
    (30, "Member"),
    (20, "Trial"),
    (10, "Pug"),
];

/// Item tiers offered by the tier filter.
pub const ITEM_TIERS: [i32; 5] = [1, 2, 3, 4, 5];

pub fn rank_title(rank: i32) -> Option<&'static str> {
    RANKS.iter().find(|(r, _)| *r == rank).map(|(_, title)| *title)
}
