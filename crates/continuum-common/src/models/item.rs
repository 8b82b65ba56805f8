//! Item model: a piece of loot with its drop source and loot priorities.

use serde::{Deserialize, Deserializer, Serialize};

use super::{Entity, Prioritized, null_as_default};
use crate::catalog::ItemCategory;
use crate::error::LootResult;
use crate::validation::validate_prio_list;

/// Length of both the class and the individual priority lists.
pub const PRIORITY_SLOTS: u8 = 3;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: i64,

    pub name: String,

    /// External database link.
    #[serde(default, deserialize_with = "null_as_default")]
    pub link: String,

    /// Some backend versions send the tier as a string.
    #[serde(deserialize_with = "tier_from_number_or_string")]
    pub tier: i32,

    #[serde(default)]
    pub category: Option<ItemCategory>,

    /// Id of the raid the item drops in.
    pub raid: i64,

    #[serde(default, deserialize_with = "null_as_default")]
    pub bosses: Vec<String>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub class_prio: Vec<ClassPrio>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub individual_prio: Vec<IndividualPrio>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub notes: String,
}

impl Item {
    pub fn individual_at(&self, prio: u8) -> Option<&IndividualPrio> {
        self.individual_prio.iter().find(|p| p.prio == prio)
    }

    pub fn class_at(&self, prio: u8) -> Option<&ClassPrio> {
        self.class_prio.iter().find(|p| p.prio == prio)
    }
}

impl Entity for Item {
    const KIND_NAME: &'static str = "item";

    fn id(&self) -> i64 {
        self.id
    }

    fn validate(&self) -> LootResult<()> {
        let owner = self.describe();
        validate_prio_list(&format!("{owner} class prio"), &self.class_prio, PRIORITY_SLOTS)?;
        validate_prio_list(
            &format!("{owner} individual prio"),
            &self.individual_prio,
            PRIORITY_SLOTS,
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassPrio {
    /// Free text; officers write things like "Warrior (tank)".
    pub class: String,
    pub prio: u8,
    /// Player who set this slot.
    pub set_by: i64,
}

impl Prioritized for ClassPrio {
    fn prio(&self) -> u8 {
        self.prio
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndividualPrio {
    pub player_id: i64,
    pub prio: u8,
    /// Player who set this slot.
    pub set_by: i64,
}

impl Prioritized for IndividualPrio {
    fn prio(&self) -> u8 {
        self.prio
    }
}

fn tier_from_number_or_string<'de, D>(deserializer: D) -> Result<i32, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Tier {
        Number(i32),
        Text(String),
    }

    match Tier::deserialize(deserializer)? {
        Tier::Number(n) => Ok(n),
        Tier::Text(s) => s
            .trim()
            .parse()
            .map_err(|_| serde::de::Error::custom(format!("invalid item tier '{s}'"))),
    }
}
