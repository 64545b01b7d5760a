//! Timetabling domain models.
//!
//! Provides the data types shared by the allocation engine: the daily
//! slot grid, subjects and labs, section timetables, and the run
//! configuration.
//!
//! # Domain Mappings
//!
//! | u-timetable | Meaning |
//! |-------------|---------|
//! | Stream | Program/cohort with its own subjects and labs |
//! | Section | Independently scheduled class group of a stream |
//! | TimeGrid | Daily slot layout, lunch slot |
//! | Timetable | (day × slot) grid of one section |
//! | Booking | Session + teacher + room in one cell |

mod config;
mod course;
mod grid;
mod timetable;

pub use config::{InstitutionConfig, Stream, DEFAULT_LUNCH_START};
pub use course::{
    Lab, LabBlock, LabPlacement, Subject, MAX_SUBJECTS_PER_STREAM, REQUIRED_WEEKLY_SESSIONS,
};
pub use grid::{
    format_range, format_time, parse_time, SlotWindow, TimeGrid, Weekday, DEFAULT_BREAK_MINUTES,
    DEFAULT_LUNCH_DURATION, MINUTES_PER_DAY,
};
pub use timetable::{Booking, Cell, GridError, Session, Timetable};
