//! Placement engine and run summaries.
//!
//! # Algorithm
//!
//! Randomized greedy placement with bounded trials, no backtracking.
//! Per section, `LabPlacer` claims contiguous blocks first, then
//! `SubjectAssigner` fills the remaining cells. Both consult and update
//! one `ResourceLedger` shared across the whole run.
//!
//! # Summary
//!
//! `ScheduleSummary` derives per-teacher schedules, room usage and
//! section load from a finished `GenerationResult`.

mod generator;
mod lab;
mod subject;
mod summary;

pub use generator::{
    section_label, GenerationResult, SectionSchedule, Shortfall, StreamSchedule,
    TimetableGenerator,
};
pub use lab::LabPlacer;
pub use subject::{SubjectAssigner, DEFAULT_MAX_ATTEMPTS};
pub use summary::{ScheduleSummary, SectionLoad, TeacherEntry};
