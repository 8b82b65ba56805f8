//! Id → record maps over a snapshot, built once per render.

use std::collections::HashMap;

use continuum_client::Snapshot;
use continuum_common::models::{Entity, Item, Player, Raid, RaidDay, Viewer};

pub struct LookupContext {
    snapshot: Snapshot,
    players: HashMap<i64, usize>,
    items: HashMap<i64, usize>,
    raids: HashMap<i64, usize>,
    raid_days: HashMap<i64, usize>,
}

fn index<T: Entity>(records: &[T]) -> HashMap<i64, usize> {
    records.iter().enumerate().map(|(i, r)| (r.id(), i)).collect()
}

impl LookupContext {
    pub fn new(snapshot: Snapshot) -> Self {
        Self {
            players: index(&snapshot.players),
            items: index(&snapshot.items),
            raids: index(&snapshot.raids),
            raid_days: index(&snapshot.raid_days),
            snapshot,
        }
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    pub fn viewer(&self) -> Option<&Viewer> {
        self.snapshot.viewer.as_ref()
    }

    pub fn player(&self, id: i64) -> Option<&Player> {
        self.players.get(&id).map(|&i| &self.snapshot.players[i])
    }

    pub fn item(&self, id: i64) -> Option<&Item> {
        self.items.get(&id).map(|&i| &self.snapshot.items[i])
    }

    pub fn raid(&self, id: i64) -> Option<&Raid> {
        self.raids.get(&id).map(|&i| &self.snapshot.raids[i])
    }

    pub fn raid_day(&self, id: i64) -> Option<&RaidDay> {
        self.raid_days.get(&id).map(|&i| &self.snapshot.raid_days[i])
    }

    /// The raid a raid day belongs to.
    pub fn raid_of_day(&self, raid_day_id: i64) -> Option<&Raid> {
        self.raid_day(raid_day_id).and_then(|d| self.raid(d.raid_id))
    }

    /// Raid days, newest first. Days on the same date keep collection order.
    pub fn raid_days_newest_first(&self) -> Vec<&RaidDay> {
        let mut days: Vec<&RaidDay> = self.snapshot.raid_days.iter().collect();
        days.sort_by(|a, b| b.date.cmp(&a.date));
        days
    }
}
