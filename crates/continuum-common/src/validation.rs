//! Input validation utilities.
//!
//! Form validation used before anything is sent to the backend, priority-list
//! invariants, and the cross-collection integrity report.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::{LootError, LootResult};
use crate::models::{Entity, Item, LootHistoryRow, Player, Prioritized, Raid, RaidDay};

/// Validate a form, returning a LootError::Validation on failure.
pub fn validate_request<T: Validate>(body: &T) -> LootResult<()> {
    body.validate()
        .map_err(|e| LootError::validation(format_validation_errors(e)))
}

/// Format validation errors into a human-readable string, ordered by field.
fn format_validation_errors(errors: validator::ValidationErrors) -> String {
    let mut messages = errors
        .field_errors()
        .iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| {
                let msg = e
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("Invalid value for '{field}'"));
                (field.to_string(), msg)
            })
        })
        .collect::<Vec<_>>();
    messages.sort();
    messages
        .into_iter()
        .map(|(_, msg)| msg)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Reject empty or whitespace-only required text.
pub fn validate_not_blank(field: &str, value: &str) -> LootResult<()> {
    if value.trim().is_empty() {
        return Err(LootError::validation(format!("{field} is required")));
    }
    Ok(())
}

/// Check that a priority list has at most `max` entries with unique prios in `1..=max`.
pub fn validate_prio_list<T: Prioritized>(owner: &str, entries: &[T], max: u8) -> LootResult<()> {
    let invalid = |message: String| LootError::InvalidPriority {
        owner: owner.to_owned(),
        message,
    };

    if entries.len() > usize::from(max) {
        return Err(invalid(format!(
            "{} entries, at most {max} allowed",
            entries.len()
        )));
    }

    let mut seen = HashSet::new();
    for entry in entries {
        let prio = entry.prio();
        if !(1..=max).contains(&prio) {
            return Err(invalid(format!("prio {prio} is outside 1..={max}")));
        }
        if !seen.insert(prio) {
            return Err(invalid(format!("prio {prio} is used twice")));
        }
    }
    Ok(())
}

/// Check that every record in a freshly fetched collection has a unique id.
pub fn ensure_unique_ids<T: Entity>(records: &[T]) -> LootResult<()> {
    let mut seen = HashSet::with_capacity(records.len());
    for record in records {
        if !seen.insert(record.id()) {
            return Err(LootError::DuplicateId {
                kind: T::KIND_NAME,
                id: record.id(),
            });
        }
    }
    Ok(())
}

/// Attendance uploads are a comma-separated list of character names.
pub fn is_comma_separated_list(input: &str) -> bool {
    !input.trim().is_empty() && input.split(',').all(|name| !name.trim().is_empty())
}

/// Loot history uploads are a JSON export (object or array).
pub fn is_json_structure(input: &str) -> bool {
    matches!(
        serde_json::from_str::<serde_json::Value>(input),
        Ok(serde_json::Value::Array(_) | serde_json::Value::Object(_))
    )
}

// ============================================================
// Integrity report
// ============================================================

/// A foreign key that does not resolve within its referenced collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DanglingReference {
    /// The record holding the reference, e.g. "loot history row 12".
    pub owner: String,
    /// Kind of the missing record, e.g. "player".
    pub target: String,
    pub id: i64,
}

impl DanglingReference {
    pub fn new(owner: impl Into<String>, target: impl Into<String>, id: i64) -> Self {
        Self {
            owner: owner.into(),
            target: target.into(),
            id,
        }
    }
}

impl fmt::Display for DanglingReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} references missing {} {}", self.owner, self.target, self.id)
    }
}

/// Borrowed view over every collection, used for reference checks.
#[derive(Debug, Clone, Copy)]
pub struct Collections<'a> {
    pub players: &'a [Player],
    pub items: &'a [Item],
    pub loot_history: &'a [LootHistoryRow],
    pub raids: &'a [Raid],
    pub raid_days: &'a [RaidDay],
}

struct Ids {
    players: HashSet<i64>,
    items: HashSet<i64>,
    raids: HashSet<i64>,
    raid_days: HashSet<i64>,
}

impl Ids {
    fn of(c: &Collections<'_>) -> Self {
        Self {
            players: c.players.iter().map(|p| p.id).collect(),
            items: c.items.iter().map(|i| i.id).collect(),
            raids: c.raids.iter().map(|r| r.id).collect(),
            raid_days: c.raid_days.iter().map(|d| d.id).collect(),
        }
    }
}

/// List every foreign key in `c` that does not resolve.
pub fn integrity_report(c: &Collections<'_>) -> Vec<DanglingReference> {
    let ids = Ids::of(c);
    let mut out = Vec::new();
    let mut check = |owner: &dyn Fn() -> String, set: &HashSet<i64>, target: &str, id: i64| {
        if !set.contains(&id) {
            out.push(DanglingReference::new(owner(), target, id));
        }
    };

    for player in c.players {
        let owner = || player.describe();
        for alt in &player.alts {
            check(&owner, &ids.players, Player::KIND_NAME, *alt);
        }
        for day in &player.attendance {
            check(&owner, &ids.raid_days, RaidDay::KIND_NAME, *day);
        }
        for wish in &player.wishlist {
            check(&owner, &ids.items, Item::KIND_NAME, wish.item_id);
        }
    }

    for item in c.items {
        let owner = || item.describe();
        check(&owner, &ids.raids, Raid::KIND_NAME, item.raid);
        for prio in &item.individual_prio {
            check(&owner, &ids.players, Player::KIND_NAME, prio.player_id);
            check(&owner, &ids.players, Player::KIND_NAME, prio.set_by);
        }
        for prio in &item.class_prio {
            check(&owner, &ids.players, Player::KIND_NAME, prio.set_by);
        }
    }

    for row in c.loot_history {
        let owner = || row.describe();
        check(&owner, &ids.items, Item::KIND_NAME, row.item_id);
        check(&owner, &ids.players, Player::KIND_NAME, row.player_id);
        check(&owner, &ids.raid_days, RaidDay::KIND_NAME, row.raid_day_id);
    }

    for day in c.raid_days {
        let owner = || day.describe();
        check(&owner, &ids.raids, Raid::KIND_NAME, day.raid_id);
    }

    out
}

/// Fail with [`LootError::Integrity`] if any reference in `c` dangles.
pub fn check_integrity(c: &Collections<'_>) -> LootResult<()> {
    let report = integrity_report(c);
    if report.is_empty() {
        Ok(())
    } else {
        Err(LootError::Integrity(report))
    }
}

/// Check a loot row about to be sent against the current collections.
pub fn check_loot_references(
    c: &Collections<'_>,
    item_id: i64,
    player_id: i64,
    raid_day_id: i64,
) -> LootResult<()> {
    let resolved = [
        (Item::KIND_NAME, item_id, c.items.iter().any(|i| i.id == item_id)),
        (Player::KIND_NAME, player_id, c.players.iter().any(|p| p.id == player_id)),
        (RaidDay::KIND_NAME, raid_day_id, c.raid_days.iter().any(|d| d.id == raid_day_id)),
    ];
    for (target, id, found) in resolved {
        if !found {
            return Err(LootError::DanglingReference(DanglingReference::new(
                "new loot history row",
                target,
                id,
            )));
        }
    }
    Ok(())
}
