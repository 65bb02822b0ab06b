//! Weekly offers document and its editor
//!
//! The offers file is a JSON object keyed by day index ("0" for Sunday
//! through "6" for Saturday). Each entry holds a title and an ordered list of
//! lines. Fields this tool does not know about are kept as they were loaded.

use crate::loader::LoadError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Day names indexed by day key
pub const DAY_NAMES: [&str; 7] = [
    "Sunday",
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
];

/// Errors raised by offers edits
#[derive(Error, Debug)]
pub enum OffersError {
    #[error("'{0}' is not a day index (expected 0-6)")]
    InvalidDay(String),

    #[error("Day {0} has no offers entry")]
    UnknownDay(String),

    #[error("Day {day} has no line {line}")]
    UnknownLine { day: String, line: usize },

    #[error("Failed to serialize offers: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// One day's offer
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DayOffer {
    #[serde(default)]
    pub title: String,

    #[serde(default)]
    pub lines: Vec<String>,

    /// Unknown fields, preserved verbatim
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// The whole offers document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OffersDocument {
    pub days: BTreeMap<String, DayOffer>,
}

impl OffersDocument {
    /// Parse offers JSON
    ///
    /// # Parameters
    /// * `file` - Name of the document, used in the error
    /// * `text` - JSON text
    pub fn parse(file: &str, text: &str) -> Result<Self, LoadError> {
        serde_json::from_str(text).map_err(|source| LoadError::InvalidOffers {
            file: file.to_string(),
            source,
        })
    }

    /// Pretty-printed JSON with two-space indentation
    pub fn to_json(&self) -> Result<String, OffersError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Entries in numeric day order
    pub fn ordered(&self) -> Vec<(&str, &DayOffer)> {
        let mut days: Vec<(&str, &DayOffer)> =
            self.days.iter().map(|(k, v)| (k.as_str(), v)).collect();
        days.sort_by_key(|(key, _)| key.parse::<u32>().unwrap_or(u32::MAX));
        days
    }
}

/// Display name of a day key, if it is 0-6
pub fn day_name(key: &str) -> Option<&'static str> {
    key.trim()
        .parse::<usize>()
        .ok()
        .and_then(|idx| DAY_NAMES.get(idx).copied())
}

/// Offers document plus dirty tracking
#[derive(Debug, Clone)]
pub struct OffersEditModel {
    file: String,
    data: OffersDocument,
    original: OffersDocument,
    dirty: bool,
}

impl OffersEditModel {
    pub fn new(file: &str, data: OffersDocument) -> Self {
        Self {
            file: file.to_string(),
            original: data.clone(),
            data,
            dirty: false,
        }
    }

    /// File name the document was loaded from and is saved as
    pub fn file(&self) -> &str {
        &self.file
    }

    pub fn data(&self) -> &OffersDocument {
        &self.data
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Replace a day's title, creating the day entry if missing
    pub fn set_title(&mut self, day: &str, title: &str) -> Result<(), OffersError> {
        self.day_entry(day)?.title = title.to_string();
        self.dirty = true;
        Ok(())
    }

    /// Append a line to a day, creating the day entry if missing
    ///
    /// # Returns
    /// * `Ok(usize)` - Index of the new line
    pub fn add_line(&mut self, day: &str, text: &str) -> Result<usize, OffersError> {
        let entry = self.day_entry(day)?;
        entry.lines.push(text.to_string());
        let idx = entry.lines.len() - 1;
        self.dirty = true;
        Ok(idx)
    }

    /// Overwrite one line
    pub fn set_line(&mut self, day: &str, line: usize, text: &str) -> Result<(), OffersError> {
        *self.line_mut(day, line)? = text.to_string();
        self.dirty = true;
        Ok(())
    }

    /// Remove one line; later lines shift up
    pub fn delete_line(&mut self, day: &str, line: usize) -> Result<String, OffersError> {
        let lines = &mut self
            .data
            .days
            .get_mut(day)
            .ok_or_else(|| OffersError::UnknownDay(day.to_string()))?
            .lines;
        if line >= lines.len() {
            return Err(OffersError::UnknownLine {
                day: day.to_string(),
                line,
            });
        }
        let removed = lines.remove(line);
        self.dirty = true;
        Ok(removed)
    }

    /// Restore the last clean snapshot
    pub fn reset(&mut self) {
        self.data = self.original.clone();
        self.dirty = false;
    }

    /// Snapshot the current data as the clean state
    pub fn mark_clean(&mut self) {
        self.original = self.data.clone();
        self.dirty = false;
    }

    fn day_entry(&mut self, day: &str) -> Result<&mut DayOffer, OffersError> {
        let key = day.trim();
        if day_name(key).is_none() {
            return Err(OffersError::InvalidDay(day.to_string()));
        }
        Ok(self.data.days.entry(key.to_string()).or_default())
    }

    fn line_mut(&mut self, day: &str, line: usize) -> Result<&mut String, OffersError> {
        self.data
            .days
            .get_mut(day)
            .ok_or_else(|| OffersError::UnknownDay(day.to_string()))?
            .lines
            .get_mut(line)
            .ok_or_else(|| OffersError::UnknownLine {
                day: day.to_string(),
                line,
            })
    }
}
