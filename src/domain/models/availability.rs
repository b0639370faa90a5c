use serde::{Deserialize, Serialize};
use chrono::Weekday;
use sqlx::FromRow;
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Serialize, Deserialize, sqlx::Type, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[sqlx(type_name = "TEXT", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum DayOfWeek {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl From<Weekday> for DayOfWeek {
    fn from(day: Weekday) -> Self {
        match day {
            Weekday::Mon => DayOfWeek::Monday,
            Weekday::Tue => DayOfWeek::Tuesday,
            Weekday::Wed => DayOfWeek::Wednesday,
            Weekday::Thu => DayOfWeek::Thursday,
            Weekday::Fri => DayOfWeek::Friday,
            Weekday::Sat => DayOfWeek::Saturday,
            Weekday::Sun => DayOfWeek::Sunday,
        }
    }
}

/// Weekly schedule of a tutor: weekday -> set of `HH:MM` UTC start times.
///
/// Sets keep the times unique and iterate in ascending order, which is the
/// canonical display order.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
#[serde(transparent)]
pub struct Availability(pub BTreeMap<DayOfWeek, BTreeSet<String>>);

impl Availability {
    pub fn times_on(&self, day: DayOfWeek) -> Option<&BTreeSet<String>> {
        self.0.get(&day)
    }

    pub fn is_empty(&self) -> bool {
        self.0.values().all(|times| times.is_empty())
    }

    pub fn slot_count(&self) -> usize {
        self.0.values().map(BTreeSet::len).sum()
    }

    pub fn from_slots(slots: Vec<AvailabilitySlot>) -> Self {
        let mut map: BTreeMap<DayOfWeek, BTreeSet<String>> = BTreeMap::new();
        for slot in slots {
            map.entry(slot.weekday).or_default().insert(slot.time);
        }
        Self(map)
    }

    pub fn to_slots(&self, tutor_id: &str) -> Vec<AvailabilitySlot> {
        self.0
            .iter()
            .flat_map(|(day, times)| {
                times.iter().map(move |time| AvailabilitySlot {
                    tutor_id: tutor_id.to_string(),
                    weekday: *day,
                    time: time.clone(),
                })
            })
            .collect()
    }
}

#[derive(Debug, FromRow, Clone)]
pub struct AvailabilitySlot {
    pub tutor_id: String,
    pub weekday: DayOfWeek,
    pub time: String,
}
