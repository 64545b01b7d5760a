//! Weekly slot grid and lunch slot derivation.
//!
//! # Time Model
//! All times are whole minutes since midnight. A teaching day is an
//! ordered list of slots; consecutive slots are separated by a fixed
//! break. The week always has five teaching days.
//!
//! # Lunch Slot
//! The lunch slot is never configured directly. It is the first slot
//! whose half-open window contains the lunch start time. When the lunch
//! start falls outside every window (before the first slot, inside a
//! break, or after the last slot) there is no lunch slot and no cell is
//! excluded on that basis.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Break between two consecutive teaching slots (minutes).
pub const DEFAULT_BREAK_MINUTES: u32 = 5;

/// Lunch duration used when none is configured (minutes).
pub const DEFAULT_LUNCH_DURATION: u32 = 60;

/// Minutes in a calendar day; slots and lunch must end by then.
pub const MINUTES_PER_DAY: u32 = 24 * 60;

/// A teaching day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Weekday {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
}

impl Weekday {
    /// Number of teaching days per week.
    pub const COUNT: usize = 5;

    /// All teaching days in calendar order.
    pub const ALL: [Weekday; Weekday::COUNT] = [
        Weekday::Monday,
        Weekday::Tuesday,
        Weekday::Wednesday,
        Weekday::Thursday,
        Weekday::Friday,
    ];

    /// Zero-based position in the week.
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Day at a zero-based position, if any.
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Upper-case day name (`MONDAY`).
    pub fn name(self) -> &'static str {
        match self {
            Weekday::Monday => "MONDAY",
            Weekday::Tuesday => "TUESDAY",
            Weekday::Wednesday => "WEDNESDAY",
            Weekday::Thursday => "THURSDAY",
            Weekday::Friday => "FRIDAY",
        }
    }

    /// Three-letter day name (`MON`).
    pub fn short_name(self) -> &'static str {
        &self.name()[..3]
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A slot interval [start, end) in minutes since midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotWindow {
    /// Interval start (inclusive).
    pub start_minute: u32,
    /// Interval end (exclusive).
    pub end_minute: u32,
}

impl SlotWindow {
    /// Creates a new window.
    pub fn new(start_minute: u32, end_minute: u32) -> Self {
        Self {
            start_minute,
            end_minute,
        }
    }

    /// Length of the window in minutes.
    #[inline]
    pub fn duration(&self) -> u32 {
        self.end_minute.saturating_sub(self.start_minute)
    }

    /// Whether a minute falls within this window.
    #[inline]
    pub fn contains(&self, minute: u32) -> bool {
        minute >= self.start_minute && minute < self.end_minute
    }

    /// Whether two windows overlap.
    pub fn overlaps(&self, other: &Self) -> bool {
        self.start_minute < other.end_minute && other.start_minute < self.end_minute
    }
}

impl fmt::Display for SlotWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_range(self))
    }
}

/// Daily slot geometry shared by every timetable of a run.
///
/// The lunch slot is derived from the other fields and recomputed by
/// every builder, so it can never disagree with the slot layout.
///
/// # Example
///
/// ```
/// use u_timetable::models::TimeGrid;
///
/// let grid = TimeGrid::new(9 * 60, vec![60, 60, 60, 60], 13 * 60);
/// assert_eq!(grid.lunch_slot(), Some(3));
/// assert_eq!(grid.slot_window(1).unwrap().to_string(), "10:05-11:05");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimeGrid {
    start_minute: u32,
    slot_durations: Vec<u32>,
    break_minutes: u32,
    lunch_start_minute: u32,
    lunch_duration: u32,
    lunch_slot: Option<usize>,
}

impl TimeGrid {
    /// Creates a grid with the default break and lunch duration.
    pub fn new(start_minute: u32, slot_durations: Vec<u32>, lunch_start_minute: u32) -> Self {
        let mut grid = Self {
            start_minute,
            slot_durations,
            break_minutes: DEFAULT_BREAK_MINUTES,
            lunch_start_minute,
            lunch_duration: DEFAULT_LUNCH_DURATION,
            lunch_slot: None,
        };
        grid.resolve_lunch_slot();
        grid
    }

    /// Sets the break between consecutive slots.
    pub fn with_break_minutes(mut self, break_minutes: u32) -> Self {
        self.break_minutes = break_minutes;
        self.resolve_lunch_slot();
        self
    }

    /// Sets the lunch duration. Only affects [`TimeGrid::lunch_window`].
    pub fn with_lunch_duration(mut self, lunch_duration: u32) -> Self {
        self.lunch_duration = lunch_duration;
        self
    }

    fn resolve_lunch_slot(&mut self) {
        let lunch = self.lunch_start_minute;
        let lunch_slot = self.slot_windows().position(|w| w.contains(lunch));
        self.lunch_slot = lunch_slot;
    }

    /// Start of the teaching day.
    #[inline]
    pub fn start_minute(&self) -> u32 {
        self.start_minute
    }

    /// Break between consecutive slots.
    #[inline]
    pub fn break_minutes(&self) -> u32 {
        self.break_minutes
    }

    /// Configured lunch start.
    #[inline]
    pub fn lunch_start_minute(&self) -> u32 {
        self.lunch_start_minute
    }

    /// Configured lunch duration.
    #[inline]
    pub fn lunch_duration(&self) -> u32 {
        self.lunch_duration
    }

    /// Slot durations in order.
    pub fn slot_durations(&self) -> &[u32] {
        &self.slot_durations
    }

    /// Number of slots per day, lunch slot included.
    #[inline]
    pub fn slot_count(&self) -> usize {
        self.slot_durations.len()
    }

    /// Duration of the first slot, the unit for lab lengths.
    pub fn first_slot_duration(&self) -> Option<u32> {
        self.slot_durations.first().copied()
    }

    /// The lunch slot, if the lunch start falls inside a slot.
    #[inline]
    pub fn lunch_slot(&self) -> Option<usize> {
        self.lunch_slot
    }

    /// Whether `slot` is the lunch slot.
    #[inline]
    pub fn is_lunch(&self, slot: usize) -> bool {
        self.lunch_slot == Some(slot)
    }

    /// Number of slots per day available for teaching.
    pub fn teaching_slot_count(&self) -> usize {
        self.slot_count() - usize::from(self.lunch_slot.is_some())
    }

    /// Windows of all slots, accumulated from the day start.
    pub fn slot_windows(&self) -> impl Iterator<Item = SlotWindow> + '_ {
        let break_minutes = self.break_minutes;
        self.slot_durations
            .iter()
            .scan(self.start_minute, move |cursor, &duration| {
                let window = SlotWindow::new(*cursor, cursor.saturating_add(duration));
                *cursor = window.end_minute.saturating_add(break_minutes);
                Some(window)
            })
    }

    /// Window of a single slot.
    pub fn slot_window(&self, slot: usize) -> Option<SlotWindow> {
        self.slot_windows().nth(slot)
    }

    /// Window of the lunch break itself.
    pub fn lunch_window(&self) -> SlotWindow {
        SlotWindow::new(
            self.lunch_start_minute,
            self.lunch_start_minute.saturating_add(self.lunch_duration),
        )
    }

    /// End of the last slot, or the day start if there are no slots.
    pub fn day_end_minute(&self) -> u32 {
        self.slot_windows()
            .last()
            .map_or(self.start_minute, |w| w.end_minute)
    }

    /// Number of contiguous slots a lab of `duration_minutes` needs.
    ///
    /// Rounds up using the first slot's duration as the unit; never less
    /// than one.
    pub fn lab_slots_needed(&self, duration_minutes: u32) -> usize {
        match self.first_slot_duration() {
            Some(unit) if unit > 0 => (duration_minutes.div_ceil(unit) as usize).max(1),
            _ => 1,
        }
    }
}

/// Formats minutes since midnight as zero-padded `HH:MM`.
///
/// ```
/// use u_timetable::models::format_time;
///
/// assert_eq!(format_time(75), "01:15");
/// ```
pub fn format_time(minutes: u32) -> String {
    format!("{:02}:{:02}", minutes / 60, minutes % 60)
}

/// Formats a window as `HH:MM-HH:MM`.
pub fn format_range(window: &SlotWindow) -> String {
    format!(
        "{}-{}",
        format_time(window.start_minute),
        format_time(window.end_minute)
    )
}

/// Parses `HH:MM` into minutes since midnight.
///
/// Accepts hours `0..=23` and minutes `0..=59`; surrounding whitespace
/// is ignored.
pub fn parse_time(text: &str) -> Option<u32> {
    let (hours, minutes) = text.trim().split_once(':')?;
    let hours: u32 = hours.trim().parse().ok()?;
    let minutes: u32 = minutes.trim().parse().ok()?;
    if hours > 23 || minutes > 59 {
        return None;
    }
    Some(hours * 60 + minutes)
}
