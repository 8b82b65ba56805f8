//! Permission rules: who may see, edit and delete which rows and columns.
//!
//! Every check is a pure, total function of the policy, the (optional) viewer
//! and the record. An absent viewer is treated exactly like permission level
//! 0 and is never allowed to edit anything. The level thresholds come from
//! [`PermissionPolicy`] so deployments can tighten them without code changes.

use bitflags::bitflags;
use serde::Deserialize;

use crate::error::{LootError, LootResult};
use crate::models::{Player, Viewer};

bitflags! {
    /// Actions currently offered on a rendered row.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct RowActions: u8 {
        /// Enter edit mode
        const EDIT   = 1 << 0;
        /// Flush the edit buffer
        const SAVE   = 1 << 1;
        /// Discard the edit buffer
        const CANCEL = 1 << 2;
        /// Delete the row
        const DELETE = 1 << 3;
        /// Open a detail sub-view
        const EXPAND = 1 << 4;
    }
}

/// Which rule governs editing of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Editability {
    /// Derived or system-maintained; read-only for everyone.
    Never,
    /// Editable whenever the row is editable.
    Row,
    /// Editable only by officers, even on rows the viewer may otherwise edit.
    Officer,
}

/// Per-row permission summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Access {
    pub visible: bool,
    pub editable: bool,
    pub deletable: bool,
}

/// Level thresholds for every permission rule.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PermissionPolicy {
    /// Level at which any player row may be edited.
    pub row_edit_level: u8,
    /// Level for officer-only columns (name, class, rank).
    pub officer_level: u8,
    /// Level at which item rows may be edited.
    pub item_edit_level: u8,
    /// Level at which loot history may be added, edited and deleted.
    pub loot_edit_level: u8,
    /// Level at which inactive players appear in lists.
    pub show_inactive_level: u8,
}

impl Default for PermissionPolicy {
    fn default() -> Self {
        Self {
            row_edit_level: 1,
            officer_level: 2,
            item_edit_level: 1,
            loot_edit_level: 2,
            show_inactive_level: 2,
        }
    }
}

impl PermissionPolicy {
    /// Reject thresholds that would let a level-0 viewer edit.
    pub fn validate(&self) -> LootResult<()> {
        let thresholds = [
            ("row_edit_level", self.row_edit_level),
            ("officer_level", self.officer_level),
            ("item_edit_level", self.item_edit_level),
            ("loot_edit_level", self.loot_edit_level),
        ];
        for (name, level) in thresholds {
            if level == 0 {
                return Err(LootError::validation(format!(
                    "policy.{name} must be at least 1"
                )));
            }
        }
        Ok(())
    }

    /// Effective level of a possibly absent viewer.
    pub fn level(viewer: Option<&Viewer>) -> u8 {
        viewer.map_or(0, |v| v.permission_level)
    }

    fn at_least(viewer: Option<&Viewer>, threshold: u8) -> bool {
        // Level 0 never edits, whatever the configured threshold.
        viewer.is_some_and(|v| v.permission_level > 0 && v.permission_level >= threshold)
    }

    pub fn is_officer(&self, viewer: Option<&Viewer>) -> bool {
        Self::at_least(viewer, self.officer_level)
    }

    // ── Players ──────────────────────────────────────────────────────────────

    /// A player row is editable by members, by the player, and by the player's alts.
    pub fn can_edit_player(&self, viewer: Option<&Viewer>, player: &Player) -> bool {
        match viewer {
            None => false,
            Some(v) => Self::at_least(viewer, self.row_edit_level) || player.is_same_person(v.id),
        }
    }

    pub fn can_edit_player_field(
        &self,
        viewer: Option<&Viewer>,
        player: &Player,
        editability: Editability,
    ) -> bool {
        match editability {
            Editability::Never => false,
            Editability::Row => self.can_edit_player(viewer, player),
            Editability::Officer => self.is_officer(viewer),
        }
    }

    pub fn can_view_player(&self, viewer: Option<&Viewer>, player: &Player) -> bool {
        player.is_active
            || Self::level(viewer) >= self.show_inactive_level
            || viewer.is_some_and(|v| player.is_same_person(v.id))
    }

    pub fn player_access(&self, viewer: Option<&Viewer>, player: &Player) -> Access {
        Access {
            visible: self.can_view_player(viewer, player),
            editable: self.can_edit_player(viewer, player),
            deletable: false,
        }
    }

    // ── Items ────────────────────────────────────────────────────────────────

    pub fn can_edit_item(&self, viewer: Option<&Viewer>) -> bool {
        Self::at_least(viewer, self.item_edit_level)
    }

    pub fn can_edit_item_field(&self, viewer: Option<&Viewer>, editability: Editability) -> bool {
        match editability {
            Editability::Never => false,
            Editability::Row => self.can_edit_item(viewer),
            Editability::Officer => self.can_edit_item(viewer) && self.is_officer(viewer),
        }
    }

    pub fn item_access(&self, viewer: Option<&Viewer>) -> Access {
        Access {
            visible: true,
            editable: self.can_edit_item(viewer),
            deletable: false,
        }
    }

    // ── Loot history ─────────────────────────────────────────────────────────

    /// Add, edit and delete all share one threshold.
    pub fn can_manage_loot(&self, viewer: Option<&Viewer>) -> bool {
        Self::at_least(viewer, self.loot_edit_level)
    }

    pub fn loot_access(&self, viewer: Option<&Viewer>) -> Access {
        let manage = self.can_manage_loot(viewer);
        Access {
            visible: true,
            editable: manage,
            deletable: manage,
        }
    }

    /// Attendance and loot-history uploads.
    pub fn can_upload(&self, viewer: Option<&Viewer>) -> bool {
        self.is_officer(viewer)
    }

    /// Return `Forbidden` unless `allowed`.
    pub fn require(allowed: bool, action: &str) -> LootResult<()> {
        if allowed {
            Ok(())
        } else {
            Err(LootError::forbidden(action))
        }
    }
}
