//! Raid definitions and their dated occurrences.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{Entity, null_as_default};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Raid {
    pub id: i64,
    pub name: String,
    /// Abbreviation used in filters, e.g. "BWL".
    pub short_name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub bosses: Vec<String>,
}

impl Raid {
    /// Label of the "whole raid" choice in the item bosses filter.
    pub fn filter_label(&self) -> String {
        format!("All {}", self.short_name)
    }
}

impl Entity for Raid {
    const KIND_NAME: &'static str = "raid";

    fn id(&self) -> i64 {
        self.id
    }
}

/// One concrete occurrence of a raid. Attendance and loot are keyed to these.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RaidDay {
    pub id: i64,
    pub name: String,
    /// ISO `YYYY-MM-DD` on the wire.
    pub date: NaiveDate,
    pub raid_id: i64,
}

impl Entity for RaidDay {
    const KIND_NAME: &'static str = "raid day";

    fn id(&self) -> i64 {
        self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raid_day_date_parses_iso() {
        let day: RaidDay = serde_json::from_str(
            r#"{"id": 7, "name": "BWL 1", "date": "2020-11-18", "raid_id": 1}"#,
        )
        .unwrap();
        assert_eq!(day.date, NaiveDate::from_ymd_opt(2020, 11, 18).unwrap());
    }

    #[test]
    fn malformed_date_is_rejected() {
        let res = serde_json::from_str::<RaidDay>(
            r#"{"id": 7, "name": "BWL 1", "date": "18/11/2020", "raid_id": 1}"#,
        );
        assert!(res.is_err());
    }
}
