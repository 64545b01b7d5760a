//! Subjects and labs.
//!
//! A subject is a regular class taught by one teacher in single-slot
//! sessions, a fixed number of times per week. A lab is a practical
//! class held once per week as a contiguous multi-slot block, with its
//! own instructor and room (center).

use serde::{Deserialize, Serialize};
use std::ops::Range;

use super::Weekday;

/// Sessions every regular subject needs per week.
pub const REQUIRED_WEEKLY_SESSIONS: usize = 3;

/// Upper bound on subjects per stream.
pub const MAX_SUBJECTS_PER_STREAM: usize = 10;

/// A regular subject of a stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subject {
    /// Subject name.
    pub name: String,
    /// Teacher identity (name). Shared across streams means the same person.
    pub teacher: String,
}

impl Subject {
    /// Creates a subject.
    pub fn new(name: impl Into<String>, teacher: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            teacher: teacher.into(),
        }
    }
}

/// A lab of a stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lab {
    /// Lab name.
    pub name: String,
    /// Lab center; doubles as the room name in the ledger.
    pub center: String,
    /// Instructor identity (name).
    pub instructor: String,
    /// Requested length in minutes.
    pub duration_minutes: u32,
}

impl Lab {
    /// Creates a lab.
    pub fn new(
        name: impl Into<String>,
        center: impl Into<String>,
        instructor: impl Into<String>,
        duration_minutes: u32,
    ) -> Self {
        Self {
            name: name.into(),
            center: center.into(),
            instructor: instructor.into(),
            duration_minutes,
        }
    }
}

/// The contiguous slot range a placed lab occupies on one day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabBlock {
    /// Day of the block.
    pub day: Weekday,
    /// First occupied slot.
    pub start_slot: usize,
    /// Number of occupied slots.
    pub slot_count: usize,
}

impl LabBlock {
    /// Creates a block.
    pub fn new(day: Weekday, start_slot: usize, slot_count: usize) -> Self {
        Self {
            day,
            start_slot,
            slot_count,
        }
    }

    /// One past the last occupied slot.
    #[inline]
    pub fn end_slot(&self) -> usize {
        self.start_slot + self.slot_count
    }

    /// Occupied slots.
    #[inline]
    pub fn slots(&self) -> Range<usize> {
        self.start_slot..self.end_slot()
    }

    /// Whether the block covers `slot`.
    pub fn contains(&self, slot: usize) -> bool {
        self.slots().contains(&slot)
    }
}

/// Outcome of placing one lab for one section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabPlacement {
    /// Index of the lab in its stream's lab list.
    pub lab_index: usize,
    /// Slots the lab needs.
    pub slots_needed: usize,
    /// Where it landed; `None` when every candidate was rejected.
    pub block: Option<LabBlock>,
}

impl LabPlacement {
    /// A successful placement.
    pub fn placed(lab_index: usize, block: LabBlock) -> Self {
        Self {
            lab_index,
            slots_needed: block.slot_count,
            block: Some(block),
        }
    }

    /// A failed placement.
    pub fn unplaced(lab_index: usize, slots_needed: usize) -> Self {
        Self {
            lab_index,
            slots_needed,
            block: None,
        }
    }

    /// Whether the lab found a block.
    #[inline]
    pub fn is_placed(&self) -> bool {
        self.block.is_some()
    }
}
