//! Detail sub-views shown under an expanded row.
//!
//! Read-only views (attendance, recent loot) are plain functions of the
//! lookup context. The wishlist and priority editors hold their own slot
//! state and save the whole list through the dispatcher.

use std::fmt;

use chrono::NaiveDate;
use continuum_client::{DispatchOutcome, MutationDispatcher};
use continuum_common::models::item::PRIORITY_SLOTS;
use continuum_common::models::player::WISHLIST_SLOTS;
use continuum_common::models::{
    ClassPrio, IndividualPrio, Item, LootHistoryRow, Player, WishlistEntry,
};
use continuum_common::permissions::PermissionPolicy;

use crate::column::CellValue;
use crate::error::{ViewError, ViewResult};
use crate::lookup::LookupContext;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DetailKind {
    Wishlist,
    Attendance,
    LootHistory,
    Priority,
}

impl fmt::Display for DetailKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Wishlist => "wishlist",
            Self::Attendance => "attendance",
            Self::LootHistory => "loot history",
            Self::Priority => "priority",
        })
    }
}

// ============================================================
// Attendance
// ============================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttendanceMark {
    Yes,
    /// Not this character, but one of its alts.
    Alt,
    No,
}

impl fmt::Display for AttendanceMark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Yes => "Yes",
            Self::Alt => "Alt",
            Self::No => "No",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttendanceCell {
    pub raid_day_id: i64,
    pub raid_day: String,
    pub mark: AttendanceMark,
}

/// The player's attendance over the newest `days` raid days, newest first.
pub fn attendance(ctx: &LookupContext, player: &Player, days: usize) -> Vec<AttendanceCell> {
    ctx.raid_days_newest_first()
        .into_iter()
        .take(days)
        .map(|day| {
            let alt_attended = player
                .alts
                .iter()
                .filter_map(|&alt| ctx.player(alt))
                .any(|alt| alt.attendance.contains(&day.id));
            let mark = if player.attendance.contains(&day.id) {
                AttendanceMark::Yes
            } else if alt_attended {
                AttendanceMark::Alt
            } else {
                AttendanceMark::No
            };
            AttendanceCell {
                raid_day_id: day.id,
                raid_day: day.name.clone(),
                mark,
            }
        })
        .collect()
}

// ============================================================
// Recent loot
// ============================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecentAward {
    pub raid_day: CellValue,
    pub date: Option<NaiveDate>,
    /// Item name for a player's awards, player name for an item's recipients.
    pub label: CellValue,
}

fn recent_awards<'a>(
    ctx: &'a LookupContext,
    keep: impl Fn(&&'a LootHistoryRow) -> bool,
    label: impl Fn(&LootHistoryRow) -> CellValue,
    limit: usize,
) -> Vec<RecentAward> {
    let mut rows: Vec<_> = ctx.snapshot().loot_history.iter().filter(keep).collect();
    let date = |day: i64| ctx.raid_day(day).map(|d| d.date);
    rows.sort_by(|a, b| date(b.raid_day_id).cmp(&date(a.raid_day_id)));
    rows.into_iter()
        .take(limit)
        .map(|row| {
            let day = ctx.raid_day(row.raid_day_id);
            RecentAward {
                raid_day: CellValue::from_option(day.map(|d| d.name.as_str())),
                date: day.map(|d| d.date),
                label: label(row),
            }
        })
        .collect()
}

/// The newest `limit` items awarded to a player.
pub fn recent_loot_for_player(ctx: &LookupContext, player_id: i64, limit: usize) -> Vec<RecentAward> {
    recent_awards(
        ctx,
        |row| row.player_id == player_id,
        |row| CellValue::from_option(ctx.item(row.item_id).map(|i| i.name.as_str())),
        limit,
    )
}

/// The newest `limit` recipients of an item.
pub fn recent_recipients_for_item(ctx: &LookupContext, item_id: i64, limit: usize) -> Vec<RecentAward> {
    recent_awards(
        ctx,
        |row| row.item_id == item_id,
        |row| CellValue::from_option(ctx.player(row.player_id).map(|p| p.name.as_str())),
        limit,
    )
}

fn check_slot(slot: usize, max: u8) -> ViewResult<usize> {
    if slot == 0 || slot > usize::from(max) {
        return Err(ViewError::SlotOutOfRange {
            slot,
            max: usize::from(max),
        });
    }
    Ok(slot - 1)
}

// ============================================================
// Wishlist editor
// ============================================================

/// Ten wishlist slots. Slot `n` is priority `n`; empty slots are skipped on
/// save, so gaps are allowed.
#[derive(Debug, Clone, PartialEq)]
pub struct WishlistEditor {
    player: Player,
    slots: Vec<Option<i64>>,
}

impl WishlistEditor {
    pub fn new(player: &Player) -> Self {
        let slots = (1..=WISHLIST_SLOTS).map(|prio| player.wish_at(prio)).collect();
        Self {
            player: player.clone(),
            slots,
        }
    }

    pub fn slots(&self) -> &[Option<i64>] {
        &self.slots
    }

    /// Put `item_id` in 1-based `slot`, or clear it with `None`.
    pub fn set(&mut self, slot: usize, item_id: Option<i64>) -> ViewResult<()> {
        let index = check_slot(slot, WISHLIST_SLOTS)?;
        self.slots[index] = item_id;
        Ok(())
    }

    /// Item names per slot; unknown or empty slots are empty cells.
    pub fn cells(&self, ctx: &LookupContext) -> Vec<CellValue> {
        self.slots
            .iter()
            .map(|slot| {
                CellValue::from_option(slot.and_then(|id| ctx.item(id)).map(|i| i.name.as_str()))
            })
            .collect()
    }

    pub fn entries(&self) -> Vec<WishlistEntry> {
        self.slots
            .iter()
            .zip(1..=WISHLIST_SLOTS)
            .filter_map(|(slot, prio)| slot.map(|item_id| WishlistEntry { prio, item_id }))
            .collect()
    }

    /// The player with the edited wishlist.
    pub fn updated(&self) -> Player {
        Player {
            wishlist: self.entries(),
            ..self.player.clone()
        }
    }

    pub async fn save(
        &self,
        policy: &PermissionPolicy,
        ctx: &LookupContext,
        dispatcher: &MutationDispatcher,
    ) -> ViewResult<DispatchOutcome> {
        if !policy.can_edit_player(ctx.viewer(), &self.player) {
            return Err(ViewError::forbidden(format!("edit wishlist of {}", self.player.name)));
        }
        Ok(dispatcher.update_player(&self.updated()).await?)
    }
}

// ============================================================
// Priority editor
// ============================================================

/// Individual and class priority slots for one item.
///
/// A slot keeps its original `set_by` while its value is unchanged; any slot
/// whose value changed is attributed to the viewer who saves.
#[derive(Debug, Clone, PartialEq)]
pub struct PriorityEditor {
    item: Item,
    individual: Vec<Option<i64>>,
    class: Vec<Option<String>>,
}

impl PriorityEditor {
    pub fn new(item: &Item) -> Self {
        let individual = (1..=PRIORITY_SLOTS)
            .map(|prio| item.individual_at(prio).map(|p| p.player_id))
            .collect();
        let class = (1..=PRIORITY_SLOTS)
            .map(|prio| item.class_at(prio).map(|p| p.class.clone()))
            .collect();
        Self {
            item: item.clone(),
            individual,
            class,
        }
    }

    pub fn set_individual(&mut self, slot: usize, player_id: Option<i64>) -> ViewResult<()> {
        let index = check_slot(slot, PRIORITY_SLOTS)?;
        self.individual[index] = player_id;
        Ok(())
    }

    /// Blank text clears the slot.
    pub fn set_class(&mut self, slot: usize, class: Option<&str>) -> ViewResult<()> {
        let index = check_slot(slot, PRIORITY_SLOTS)?;
        self.class[index] = class
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(str::to_owned);
        Ok(())
    }

    /// Player names per individual slot.
    pub fn individual_cells(&self, ctx: &LookupContext) -> Vec<CellValue> {
        self.individual
            .iter()
            .map(|slot| {
                CellValue::from_option(slot.and_then(|id| ctx.player(id)).map(|p| p.name.as_str()))
            })
            .collect()
    }

    pub fn class_cells(&self) -> Vec<CellValue> {
        self.class
            .iter()
            .map(|slot| CellValue::from_option(slot.clone()))
            .collect()
    }

    pub fn individual_entries(&self, viewer_id: i64) -> Vec<IndividualPrio> {
        self.individual
            .iter()
            .zip(1..=PRIORITY_SLOTS)
            .filter_map(|(slot, prio)| {
                let player_id = (*slot)?;
                let set_by = match self.item.individual_at(prio) {
                    Some(old) if old.player_id == player_id => old.set_by,
                    _ => viewer_id,
                };
                Some(IndividualPrio {
                    player_id,
                    prio,
                    set_by,
                })
            })
            .collect()
    }

    pub fn class_entries(&self, viewer_id: i64) -> Vec<ClassPrio> {
        self.class
            .iter()
            .zip(1..=PRIORITY_SLOTS)
            .filter_map(|(slot, prio)| {
                let class = slot.clone()?;
                let set_by = match self.item.class_at(prio) {
                    Some(old) if old.class == class => old.set_by,
                    _ => viewer_id,
                };
                Some(ClassPrio { class, prio, set_by })
            })
            .collect()
    }

    /// The item with both edited lists, attributed to `viewer_id`.
    pub fn updated(&self, viewer_id: i64) -> Item {
        Item {
            individual_prio: self.individual_entries(viewer_id),
            class_prio: self.class_entries(viewer_id),
            ..self.item.clone()
        }
    }

    pub async fn save(
        &self,
        policy: &PermissionPolicy,
        ctx: &LookupContext,
        dispatcher: &MutationDispatcher,
    ) -> ViewResult<DispatchOutcome> {
        let viewer = match ctx.viewer() {
            Some(v) if policy.can_edit_item(Some(v)) => v,
            _ => return Err(ViewError::forbidden(format!("set priorities on {}", self.item.name))),
        };
        Ok(dispatcher.update_item(&self.updated(viewer.id)).await?)
    }
}
