use std::collections::BTreeMap;

use tracing::debug;

use crate::models::{ScheduleEntry, Subject};
use crate::store::{Persistence, keys};

pub const DAYS: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];
pub const FIRST_HOUR: u8 = 8;
pub const LAST_HOUR: u8 = 22;

/// Day index for a name such as `"wed"` or `"Wednesday"`, or a digit `0`-`6`
pub fn day_index(name: &str) -> Option<u8> {
    let name = name.trim();
    if let Ok(index) = name.parse::<u8>() {
        return (usize::from(index) < DAYS.len()).then_some(index);
    }
    let lower = name.to_lowercase();
    if lower.len() < 3 {
        return None;
    }
    DAYS.iter()
        .position(|day| lower.starts_with(&day.to_lowercase()))
        .and_then(|index| u8::try_from(index).ok())
}

/// One addressable cell of the weekly grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Slot {
    day: u8,
    hour: u8,
}

impl Slot {
    /// Parse a day index (0 = Mon) and an hour label such as `"14:00"`, `"8:00"`
    /// or `"08"`. Returns `None` for addresses outside the grid.
    pub fn new(day: u8, hour_label: &str) -> Option<Self> {
        let label = hour_label.trim();
        let hour_part = match label.split_once(':') {
            Some((hour, "00")) => hour,
            Some(_) => return None,
            None => label,
        };
        let hour: u8 = hour_part.parse().ok()?;

        let in_grid = usize::from(day) < DAYS.len() && (FIRST_HOUR..=LAST_HOUR).contains(&hour);
        in_grid.then_some(Self { day, hour })
    }

    pub fn day(self) -> u8 {
        self.day
    }

    pub fn hour(self) -> u8 {
        self.hour
    }

    pub fn hour_label(self) -> String {
        format!("{}:00", self.hour)
    }

    /// Storage key, e.g. `"2-14:00"`
    pub fn key(self) -> String {
        format!("{}-{}:00", self.day, self.hour)
    }
}

/// One row of the rendered grid: an hour label and the title in each day column
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleRow {
    pub hour: String,
    pub cells: Vec<Option<String>>,
}

/// Sparse weekly planner, at most one entry per slot
pub struct ScheduleGrid {
    slots: BTreeMap<String, ScheduleEntry>,
    persistence: Persistence,
}

impl ScheduleGrid {
    pub fn load(persistence: Persistence) -> Self {
        let slots = persistence.load(keys::SCHEDULE).unwrap_or_default();
        Self { slots, persistence }
    }

    /// Set or clear a slot. A blank title clears it.
    /// Returns `false` for addresses outside the grid.
    pub fn set_slot(&mut self, day: u8, hour_label: &str, title: &str) -> bool {
        let Some(slot) = Slot::new(day, hour_label) else {
            debug!(day, hour_label, "ignoring schedule edit outside the grid");
            return false;
        };

        let title = title.trim();
        if title.is_empty() {
            self.slots.remove(&slot.key());
        } else {
            self.slots.insert(
                slot.key(),
                ScheduleEntry {
                    title: title.to_string(),
                    subject: Subject::Other,
                },
            );
        }
        self.persistence.save(keys::SCHEDULE, &self.slots);
        true
    }

    pub fn get_slot(&self, day: u8, hour_label: &str) -> Option<&ScheduleEntry> {
        let slot = Slot::new(day, hour_label)?;
        self.slots.get(&slot.key())
    }

    pub fn clear_all(&mut self) {
        self.slots.clear();
        self.persistence.save(keys::SCHEDULE, &self.slots);
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Every hour of the grid from first to last, with one cell per day
    pub fn rows(&self) -> Vec<ScheduleRow> {
        (FIRST_HOUR..=LAST_HOUR)
            .map(|hour| {
                let label = format!("{hour}:00");
                let cells = (0..DAYS.len())
                    .map(|day| {
                        self.slots
                            .get(&format!("{day}-{label}"))
                            .map(|entry| entry.title.clone())
                    })
                    .collect();
                ScheduleRow { hour: label, cells }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Persistence;
    use crate::test_utils::memory_persistence;
    use serde_json::json;

    #[test]
    fn test_day_names() {
        assert_eq!(day_index("Mon"), Some(0));
        assert_eq!(day_index("wednesday"), Some(2));
        assert_eq!(day_index("6"), Some(6));
        assert_eq!(day_index("7"), None);
        assert_eq!(day_index("mo"), None);
        assert_eq!(day_index("someday"), None);
    }

    #[test]
    fn test_slot_parsing() {
        assert_eq!(Slot::new(2, "14:00").map(Slot::key), Some("2-14:00".to_string()));
        assert_eq!(Slot::new(0, "08:00").map(Slot::key), Some("0-8:00".to_string()));
        assert_eq!(Slot::new(6, "22").map(Slot::hour), Some(22));
        assert_eq!(Slot::new(7, "14:00"), None);
        assert_eq!(Slot::new(0, "7:00"), None);
        assert_eq!(Slot::new(0, "23:00"), None);
        assert_eq!(Slot::new(0, "14:30"), None);
        assert_eq!(Slot::new(0, "noon"), None);
    }

    #[test]
    fn test_blank_title_clears_slot() {
        let (_store, persistence) = memory_persistence("schedule");
        let mut grid = ScheduleGrid::load(persistence);

        assert!(grid.set_slot(2, "14:00", "Study Chem"));
        assert_eq!(grid.get_slot(2, "14:00").map(|e| e.title.as_str()), Some("Study Chem"));

        assert!(grid.set_slot(2, "14:00", ""));
        assert_eq!(grid.get_slot(2, "14:00"), None);

        grid.set_slot(2, "14:00", "Review");
        grid.set_slot(2, "14:00", "   ");
        assert!(grid.is_empty());
    }

    #[test]
    fn test_upsert_overwrites_and_persists() {
        let (store, persistence) = memory_persistence("schedule");
        let mut grid = ScheduleGrid::load(persistence);

        grid.set_slot(0, "9:00", " Calculus ");
        grid.set_slot(0, "9:00", "Physics");

        assert_eq!(
            store.get(keys::SCHEDULE).unwrap(),
            Some(json!({"0-9:00": {"title": "Physics", "subject": "Other"}}))
        );
        let reloaded = ScheduleGrid::load(Persistence::new(store, "schedule"));
        assert_eq!(reloaded.len(), 1);
    }

    #[test]
    fn test_out_of_grid_edit_is_ignored() {
        let (_store, persistence) = memory_persistence("schedule");
        let mut grid = ScheduleGrid::load(persistence);
        assert!(!grid.set_slot(9, "14:00", "nope"));
        assert!(grid.is_empty());
    }

    #[test]
    fn test_clear_all_and_rows() {
        let (_store, persistence) = memory_persistence("schedule");
        let mut grid = ScheduleGrid::load(persistence);
        grid.set_slot(4, "10:00", "Essay");

        let rows = grid.rows();
        assert_eq!(rows.len(), 15);
        assert_eq!(rows[0].hour, "8:00");
        assert_eq!(rows[2].cells[4].as_deref(), Some("Essay"));
        assert_eq!(rows.iter().map(|r| r.cells.len()).sum::<usize>(), 105);

        grid.clear_all();
        assert!(grid.is_empty());
        assert!(grid.rows().iter().all(|r| r.cells.iter().all(Option::is_none)));
    }
}
