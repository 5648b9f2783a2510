//! Weekday-keyed "best time" presets.
//!
//! Each weekday maps to an ordered list of slots. A slot is either a named
//! time of day or empty; empty slots keep their position so the UI can lay
//! the buttons out in a stable grid. Slots are expected in ascending time
//! order, since selection picks the first one after "now".
//!
//! # CSV format
//! ```text
//! weekday,label,time
//! Monday,Lesson 1,08:45
//! Monday,,
//! ```
//! A row with neither label nor time is an empty slot.

use crate::{TimeOfDay, TimeOfDayError};
use chrono::Weekday;
use log::{debug, error, warn};
use serde::Deserialize;
use std::collections::HashMap;
use std::fmt;

const BUILTIN_PRESETS: &str = include_str!("presets.csv");

#[derive(Debug)]
pub enum PresetError {
    Csv(csv::Error),
    EmptyLabel,
    UnknownWeekday { line: u64, name: String },
    InvalidTime { line: u64, source: TimeOfDayError },
    IncompleteSlot { line: u64 },
}

impl fmt::Display for PresetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PresetError::Csv(e) => write!(f, "Failed to read presets: {}", e),
            PresetError::EmptyLabel => write!(f, "Preset label cannot be empty"),
            PresetError::UnknownWeekday { line, name } => {
                write!(f, "Line {}: unknown weekday '{}'", line, name)
            }
            PresetError::InvalidTime { line, source } => write!(f, "Line {}: {}", line, source),
            PresetError::IncompleteSlot { line } => write!(
                f,
                "Line {}: a preset needs both a label and a time (leave both empty for a gap)",
                line
            ),
        }
    }
}

impl std::error::Error for PresetError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PresetError::Csv(e) => Some(e),
            PresetError::InvalidTime { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<csv::Error> for PresetError {
    fn from(e: csv::Error) -> Self {
        PresetError::Csv(e)
    }
}

/// A named time of day offered as a quick-select shortcut.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preset {
    label: String,
    time: TimeOfDay,
}

impl Preset {
    pub fn new(label: impl Into<String>, time: TimeOfDay) -> Result<Self, PresetError> {
        let label = label.into();
        if label.trim().is_empty() {
            return Err(PresetError::EmptyLabel);
        }
        Ok(Preset { label, time })
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn time(&self) -> TimeOfDay {
        self.time
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.label, self.time)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PresetTable {
    days: HashMap<Weekday, Vec<Option<Preset>>>,
}

#[derive(Debug, Deserialize)]
struct PresetRow {
    weekday: String,
    label: Option<String>,
    time: Option<String>,
}

impl PresetTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the slots configured for `weekday`.
    pub fn with_day(mut self, weekday: Weekday, slots: Vec<Option<Preset>>) -> Self {
        self.days.insert(weekday, slots);
        self
    }

    /// All slots for `weekday`, empty ones included. Unconfigured days
    /// yield an empty slice.
    pub fn slots(&self, weekday: Weekday) -> &[Option<Preset>] {
        self.days.get(&weekday).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Populated slots for `weekday`, in table order.
    pub fn presets(&self, weekday: Weekday) -> impl Iterator<Item = &Preset> {
        self.slots(weekday).iter().flatten()
    }

    pub fn is_empty(&self) -> bool {
        self.days.values().all(|slots| slots.iter().all(Option::is_none))
    }

    /// Parse a table from CSV with a `weekday,label,time` header.
    pub fn from_csv_str(content: &str) -> Result<Self, PresetError> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(content.as_bytes());

        let mut days: HashMap<Weekday, Vec<Option<Preset>>> = HashMap::new();
        let headers = reader.headers()?.clone();
        for record in reader.records() {
            let record = record?;
            let line = record.position().map(|p| p.line()).unwrap_or_default();
            let row: PresetRow = record.deserialize(Some(&headers))?;

            let weekday: Weekday =
                row.weekday
                    .parse()
                    .map_err(|_| PresetError::UnknownWeekday {
                        line,
                        name: row.weekday.clone(),
                    })?;

            let slot = match (row.label, row.time) {
                (None, None) => None,
                (Some(label), Some(time)) => {
                    let time = time
                        .parse::<TimeOfDay>()
                        .map_err(|source| PresetError::InvalidTime { line, source })?;
                    Some(Preset::new(label, time)?)
                }
                _ => return Err(PresetError::IncompleteSlot { line }),
            };
            days.entry(weekday).or_default().push(slot);
        }

        for (weekday, slots) in &days {
            let times: Vec<TimeOfDay> = slots.iter().flatten().map(Preset::time).collect();
            if times.windows(2).any(|w| w[0] >= w[1]) {
                warn!(
                    "Presets for {} are not in ascending order; selection uses table order",
                    weekday
                );
            }
        }

        debug!("Loaded presets for {} weekday(s)", days.len());
        Ok(PresetTable { days })
    }

    /// The table compiled into the binary.
    pub fn builtin() -> Self {
        match Self::from_csv_str(BUILTIN_PRESETS) {
            Ok(table) => table,
            Err(e) => {
                error!("Built-in presets are invalid: {}", e);
                PresetTable::new()
            }
        }
    }
}
