//! Validation for timetabling runs.
//!
//! Three passes, at three points of a run:
//! - [`validate_config`]: structural checks before any allocation.
//!   Any error aborts the run.
//! - [`empty_days`]: advisory scan of a finished timetable for days
//!   without a single class.
//! - [`audit`]: re-checks the institution-wide invariants over every
//!   timetable of a run (no teacher or room in two places at once,
//!   lunch kept free, one session per subject per day, contiguous labs).

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;
use thiserror::Error;

use crate::models::{
    parse_time, InstitutionConfig, Session, TimeGrid, Timetable, Weekday,
    MAX_SUBJECTS_PER_STREAM, MINUTES_PER_DAY,
};

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq, Serialize, Error)]
#[error("{message}")]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ValidationErrorKind {
    /// No stream is configured.
    NoStreams,
    /// The day has no teaching slots.
    NoTeachingSlots,
    /// A slot has zero length.
    InvalidSlotDuration,
    /// The lunch start is not a valid `HH:MM` time.
    InvalidLunchTime,
    /// The room pool is empty.
    NoRooms,
    /// The start hour is not a valid hour of the day.
    InvalidStartHour,
    /// A stream has no sections.
    NoSections,
    /// A stream has more subjects than allowed.
    TooManySubjects,
    /// A lab has zero length.
    InvalidLabDuration,
    /// Slots or lunch run past the end of the day.
    ExceedsDay,
}

impl ValidationError {
    pub(crate) fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Validates the structure of a run configuration.
///
/// Checks:
/// 1. At least one stream
/// 2. At least one teaching slot, none of zero length
/// 3. Lunch start is a valid `HH:MM`
/// 4. At least one room
/// 5. Start hour within 0..=23
/// 6. Every stream has at least one section and at most
///    [`MAX_SUBJECTS_PER_STREAM`] subjects
/// 7. Every lab has a positive duration
/// 8. The teaching day and the lunch break end within the day
///    ([`MINUTES_PER_DAY`])
///
/// A stream without subjects is allowed; the generator only warns.
///
/// # Returns
/// `Ok(())` if all checks pass, `Err(errors)` with all detected issues.
pub fn validate_config(config: &InstitutionConfig) -> ValidationResult {
    let mut errors = Vec::new();

    if config.streams.is_empty() {
        errors.push(ValidationError::new(
            ValidationErrorKind::NoStreams,
            "no streams configured",
        ));
    }

    if config.slot_durations.is_empty() {
        errors.push(ValidationError::new(
            ValidationErrorKind::NoTeachingSlots,
            "at least one teaching slot is required",
        ));
    }
    for (slot, &duration) in config.slot_durations.iter().enumerate() {
        if duration == 0 {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidSlotDuration,
                format!("teaching slot {} has zero duration", slot + 1),
            ));
        }
    }

    if parse_time(&config.lunch_start).is_none() {
        errors.push(ValidationError::new(
            ValidationErrorKind::InvalidLunchTime,
            format!("invalid lunch start '{}' (expected HH:MM)", config.lunch_start),
        ));
    }

    if config.start_hour <= 23 && !config.slot_durations.is_empty() {
        let slots: u64 = config.slot_durations.iter().map(|&d| u64::from(d)).sum();
        let breaks = u64::from(config.break_minutes) * (config.slot_durations.len() as u64 - 1);
        let day_end = u64::from(config.start_hour) * 60 + slots + breaks;
        if day_end > u64::from(MINUTES_PER_DAY) {
            errors.push(ValidationError::new(
                ValidationErrorKind::ExceedsDay,
                format!(
                    "teaching slots end {day_end} minutes after midnight, past the end of the day"
                ),
            ));
        }
    }

    if let Some(lunch) = parse_time(&config.lunch_start) {
        if u64::from(lunch) + u64::from(config.lunch_duration) > u64::from(MINUTES_PER_DAY) {
            errors.push(ValidationError::new(
                ValidationErrorKind::ExceedsDay,
                format!(
                    "lunch at {} for {} minutes runs past the end of the day",
                    config.lunch_start, config.lunch_duration
                ),
            ));
        }
    }

    if config.room_count == 0 {
        errors.push(ValidationError::new(
            ValidationErrorKind::NoRooms,
            "room count must be positive",
        ));
    }

    if config.start_hour > 23 {
        errors.push(ValidationError::new(
            ValidationErrorKind::InvalidStartHour,
            format!("start hour {} is not an hour of the day", config.start_hour),
        ));
    }

    for stream in &config.streams {
        if stream.sections == 0 {
            errors.push(ValidationError::new(
                ValidationErrorKind::NoSections,
                format!("stream '{}' has no sections", stream.name),
            ));
        }
        if stream.subjects.len() > MAX_SUBJECTS_PER_STREAM {
            errors.push(ValidationError::new(
                ValidationErrorKind::TooManySubjects,
                format!(
                    "stream '{}' has {} subjects (max {})",
                    stream.name,
                    stream.subjects.len(),
                    MAX_SUBJECTS_PER_STREAM
                ),
            ));
        }
        for lab in &stream.labs {
            if lab.duration_minutes == 0 {
                errors.push(ValidationError::new(
                    ValidationErrorKind::InvalidLabDuration,
                    format!(
                        "lab '{}' of stream '{}' has zero duration",
                        lab.name, stream.name
                    ),
                ));
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Days on which every non-lunch slot is free.
pub fn empty_days(timetable: &Timetable, grid: &TimeGrid) -> Vec<Weekday> {
    Weekday::ALL
        .into_iter()
        .filter(|&day| {
            timetable
                .day(day)
                .iter()
                .enumerate()
                .all(|(slot, cell)| grid.is_lunch(slot) || cell.is_free())
        })
        .collect()
}

/// A broken invariant found by [`audit`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Conflict {
    /// What went wrong.
    pub kind: ConflictKind,
    /// Position of the offending timetable in the audited sequence.
    pub timetable: usize,
    /// Day of the conflict.
    pub day: Weekday,
    /// Slot of the conflict.
    pub slot: usize,
    /// Human-readable description.
    pub message: String,
}

/// Classification of audit conflicts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ConflictKind {
    /// A teacher holds two cells at the same (day, slot).
    TeacherClash,
    /// A room holds two cells at the same (day, slot).
    RoomClash,
    /// The lunch slot is booked.
    LunchOccupied,
    /// A subject meets more than once on the same day.
    RepeatedSubject,
    /// A lab's cells on one day are not contiguous.
    FragmentedLab,
}

/// Re-checks the run invariants across a sequence of timetables.
///
/// Timetables are identified in the result by their position in
/// `timetables`. Blank teacher or room names are ignored.
pub fn audit<'a, I>(timetables: I, grid: &TimeGrid) -> Vec<Conflict>
where
    I: IntoIterator<Item = &'a Timetable>,
{
    let mut conflicts = Vec::new();
    let mut teachers: HashMap<(Weekday, usize, &'a str), usize> = HashMap::new();
    let mut rooms: HashMap<(Weekday, usize, &'a str), usize> = HashMap::new();

    for (index, timetable) in timetables.into_iter().enumerate() {
        for (day, slot, cell) in timetable.iter() {
            let Some(booking) = cell.booking() else {
                continue;
            };
            let conflict = |kind, message: String| Conflict {
                kind,
                timetable: index,
                day,
                slot,
                message,
            };

            if grid.is_lunch(slot) {
                conflicts.push(conflict(
                    ConflictKind::LunchOccupied,
                    format!("lunch slot booked on {day}"),
                ));
            }

            let teacher = booking.teacher.as_str();
            if !teacher.trim().is_empty() {
                if let Some(&first) = teachers.get(&(day, slot, teacher)) {
                    conflicts.push(conflict(
                        ConflictKind::TeacherClash,
                        format!("teacher '{teacher}' also booked in timetable {first}"),
                    ));
                } else {
                    teachers.insert((day, slot, teacher), index);
                }
            }

            let room = booking.room.as_str();
            if !room.trim().is_empty() {
                if let Some(&first) = rooms.get(&(day, slot, room)) {
                    conflicts.push(conflict(
                        ConflictKind::RoomClash,
                        format!("room '{room}' also booked in timetable {first}"),
                    ));
                } else {
                    rooms.insert((day, slot, room), index);
                }
            }
        }

        for day in Weekday::ALL {
            audit_day(index, day, timetable, &mut conflicts);
        }
    }

    conflicts
}

fn audit_day(index: usize, day: Weekday, timetable: &Timetable, conflicts: &mut Vec<Conflict>) {
    let mut subjects: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
    let mut labs: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
    for (slot, cell) in timetable.day(day).iter().enumerate() {
        match cell.session() {
            Some(Session::Regular(subject)) => subjects.entry(subject).or_default().push(slot),
            Some(Session::Lab(lab)) => labs.entry(lab).or_default().push(slot),
            None => {}
        }
    }

    for (subject, slots) in subjects {
        if slots.len() > 1 {
            conflicts.push(Conflict {
                kind: ConflictKind::RepeatedSubject,
                timetable: index,
                day,
                slot: slots[1],
                message: format!("subject {subject} meets {} times on {day}", slots.len()),
            });
        }
    }

    for (lab, slots) in labs {
        // Slots are collected in ascending order
        let span = slots[slots.len() - 1] - slots[0] + 1;
        if span != slots.len() {
            conflicts.push(Conflict {
                kind: ConflictKind::FragmentedLab,
                timetable: index,
                day,
                slot: slots[0],
                message: format!("lab {lab} is split on {day}"),
            });
        }
    }
}
