//! Run driver: every stream, every section, one at a time.
//!
//! # Algorithm
//!
//! 1. Validate the configuration; any structural error aborts the run
//!    before a single cell is touched.
//! 2. Derive the slot grid and lunch slot once.
//! 3. Create one [`ResourceLedger`] for the whole run.
//! 4. For each stream, then each section: place labs, then subjects,
//!    then scan for empty days.
//! 5. Audit the invariants over all timetables.
//!
//! Sections are generated strictly in sequence against the shared
//! ledger; that ordering is what keeps teachers and rooms from being
//! double-booked across sections and streams.
//!
//! Randomness is injected. Two runs with the same configuration and
//! identically seeded generators produce identical results.

use std::fmt;

use log::{debug, error, info, warn};
use rand::Rng;
use serde::Serialize;

use crate::error::ScheduleError;
use crate::ledger::ResourceLedger;
use crate::models::{
    format_time, InstitutionConfig, Lab, LabPlacement, Session, Stream, Subject, TimeGrid,
    Timetable, Weekday,
};
use crate::validation::{self, validate_config, ValidationError, ValidationErrorKind};

use super::lab::LabPlacer;
use super::subject::{SubjectAssigner, DEFAULT_MAX_ATTEMPTS};

/// Spreadsheet-style section label: `A`..`Z`, then `AA`, `AB`, ...
pub fn section_label(index: usize) -> String {
    let mut label = Vec::new();
    let mut n = index + 1;
    while n > 0 {
        let rem = (n - 1) % 26;
        label.push(b'A' + rem as u8);
        n = (n - 1) / 26;
    }
    label.reverse();
    String::from_utf8_lossy(&label).into_owned()
}

/// A soft failure recorded during generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Shortfall {
    /// A lab found no legal block.
    UnplacedLab {
        stream: String,
        section: String,
        lab: String,
    },
    /// A subject received fewer sessions than required.
    SubjectBelowTarget {
        stream: String,
        section: String,
        subject: String,
        placed: usize,
        required: usize,
    },
    /// A day without any class.
    EmptyDay {
        stream: String,
        section: String,
        day: Weekday,
    },
}

impl fmt::Display for Shortfall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Shortfall::UnplacedLab {
                stream,
                section,
                lab,
            } => write!(f, "[{stream}-{section}] lab '{lab}' could not be scheduled"),
            Shortfall::SubjectBelowTarget {
                stream,
                section,
                subject,
                placed,
                required,
            } => write!(
                f,
                "[{stream}-{section}] subject '{subject}' placed {placed} of {required} times"
            ),
            Shortfall::EmptyDay {
                stream,
                section,
                day,
            } => write!(f, "[{stream}-{section}] no classes on {day}"),
        }
    }
}

/// Generated timetable of one section.
#[derive(Debug, Clone, Serialize)]
pub struct SectionSchedule {
    /// Index of the owning stream.
    pub stream_index: usize,
    /// Index of the section within its stream.
    pub section_index: usize,
    /// Section label (`A`, `B`, ...).
    pub label: String,
    /// The weekly grid.
    pub timetable: Timetable,
    /// Placement per lab, index-aligned with the stream's labs.
    pub lab_placements: Vec<LabPlacement>,
    /// Sessions placed per subject, index-aligned with the stream's subjects.
    pub subject_sessions: Vec<usize>,
    /// Days left without any class.
    pub empty_days: Vec<Weekday>,
}

impl SectionSchedule {
    /// Placement of a lab, by index.
    pub fn lab_placement(&self, lab_index: usize) -> Option<&LabPlacement> {
        self.lab_placements.get(lab_index)
    }
}

/// Generated timetables of one stream.
#[derive(Debug, Clone, Serialize)]
pub struct StreamSchedule {
    /// Stream name.
    pub name: String,
    /// Subjects, after default naming.
    pub subjects: Vec<Subject>,
    /// Labs, after default naming.
    pub labs: Vec<Lab>,
    /// One schedule per section, in order.
    pub sections: Vec<SectionSchedule>,
}

impl StreamSchedule {
    /// Name of the subject or lab a session refers to.
    pub fn session_name(&self, session: Session) -> Option<&str> {
        match session {
            Session::Regular(index) => self.subjects.get(index).map(|s| s.name.as_str()),
            Session::Lab(index) => self.labs.get(index).map(|l| l.name.as_str()),
        }
    }
}

/// Output of a generation run.
#[derive(Debug, Clone, Serialize)]
pub struct GenerationResult {
    /// Slot geometry, including the resolved lunch slot.
    pub grid: TimeGrid,
    /// Weekly session target per subject.
    pub required_sessions: usize,
    /// Per-stream schedules, in configuration order.
    pub streams: Vec<StreamSchedule>,
    /// Every soft failure of the run.
    pub shortfalls: Vec<Shortfall>,
}

impl GenerationResult {
    /// A section's schedule.
    pub fn section(&self, stream_index: usize, section_index: usize) -> Option<&SectionSchedule> {
        self.streams
            .get(stream_index)
            .and_then(|s| s.sections.get(section_index))
    }

    /// All section schedules in generation order.
    pub fn sections(&self) -> impl Iterator<Item = &SectionSchedule> + '_ {
        self.streams.iter().flat_map(|s| s.sections.iter())
    }

    /// All timetables in generation order.
    pub fn timetables(&self) -> impl Iterator<Item = &Timetable> + '_ {
        self.sections().map(|s| &s.timetable)
    }

    /// Whether every lab and subject met its target and no day is empty.
    pub fn is_complete(&self) -> bool {
        self.shortfalls.is_empty()
    }

    /// Total booked cells across the institution.
    pub fn booked_cells(&self) -> usize {
        self.timetables().map(Timetable::occupied_count).sum()
    }
}

/// Generates timetables for every stream and section of an institution.
///
/// # Example
///
/// ```
/// use rand::rngs::StdRng;
/// use rand::SeedableRng;
/// use u_timetable::models::{InstitutionConfig, Stream, Subject};
/// use u_timetable::scheduler::TimetableGenerator;
///
/// let config = InstitutionConfig::new(9, vec![60, 60, 60, 60])
///     .with_rooms(10)
///     .with_stream(Stream::new("CSE").with_subject(Subject::new("Maths", "Rao")));
///
/// let generator = TimetableGenerator::new(config).unwrap();
/// let mut rng = StdRng::seed_from_u64(7);
/// let result = generator.generate(&mut rng).unwrap();
/// assert_eq!(result.section(0, 0).unwrap().subject_sessions, vec![3]);
/// ```
#[derive(Debug, Clone)]
pub struct TimetableGenerator {
    config: InstitutionConfig,
    grid: TimeGrid,
    max_attempts: usize,
}

impl TimetableGenerator {
    /// Validates the configuration and derives the slot grid.
    ///
    /// Blank subject, teacher and lab names are replaced by generated
    /// defaults.
    ///
    /// # Errors
    /// [`ScheduleError::InvalidConfig`] with every structural problem found.
    pub fn new(config: InstitutionConfig) -> Result<Self, ScheduleError> {
        validate_config(&config).map_err(ScheduleError::InvalidConfig)?;

        for stream in config.streams.iter().filter(|s| s.subjects.is_empty()) {
            warn!("no subjects defined for stream '{}'", stream.name);
        }

        let config = config.with_default_names();
        let grid = config.time_grid().ok_or_else(|| {
            ValidationError::new(
                ValidationErrorKind::InvalidLunchTime,
                format!("invalid lunch start '{}'", config.lunch_start),
            )
        })?;

        match grid.lunch_slot() {
            Some(slot) => debug!(
                "lunch at {} falls in slot {slot}",
                format_time(grid.lunch_start_minute())
            ),
            None => info!(
                "lunch at {} is outside teaching hours; no lunch slot",
                format_time(grid.lunch_start_minute())
            ),
        }

        Ok(Self {
            config,
            grid,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        })
    }

    /// Sets the trial budget per subject.
    pub fn with_max_attempts(mut self, max_attempts: usize) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// The validated configuration, after default naming.
    pub fn config(&self) -> &InstitutionConfig {
        &self.config
    }

    /// The derived slot grid.
    pub fn grid(&self) -> &TimeGrid {
        &self.grid
    }

    fn subject_assigner(&self) -> SubjectAssigner<'_> {
        SubjectAssigner::new(&self.grid, self.config.room_count)
            .with_max_attempts(self.max_attempts)
    }

    /// Generates every section of every stream, in order.
    ///
    /// # Errors
    /// [`ScheduleError::Grid`] if a timetable rejects a checked write.
    pub fn generate<R: Rng>(&self, rng: &mut R) -> Result<GenerationResult, ScheduleError> {
        let mut ledger = ResourceLedger::new();
        let required = self.subject_assigner().required_sessions();
        let mut streams = Vec::with_capacity(self.config.streams.len());
        let mut shortfalls = Vec::new();

        for (stream_index, stream) in self.config.streams.iter().enumerate() {
            let mut sections = Vec::with_capacity(stream.sections);
            for section_index in 0..stream.sections {
                let section = self.generate_section(stream_index, section_index, &mut ledger, rng)?;
                shortfalls.extend(section_shortfalls(stream, &section, required));
                sections.push(section);
            }
            streams.push(StreamSchedule {
                name: stream.name.clone(),
                subjects: stream.subjects.clone(),
                labs: stream.labs.clone(),
                sections,
            });
        }

        let result = GenerationResult {
            grid: self.grid.clone(),
            required_sessions: required,
            streams,
            shortfalls,
        };

        for conflict in validation::audit(result.timetables(), &self.grid) {
            error!("invariant violated: {}", conflict.message);
        }
        info!(
            "generated {} timetables, {} booked cells, {} shortfalls",
            result.sections().count(),
            result.booked_cells(),
            result.shortfalls.len()
        );

        Ok(result)
    }

    /// Generates one section against a shared ledger.
    ///
    /// Labs are placed first, then subjects fill the remaining cells.
    /// Shortfalls are logged and reflected in the returned schedule.
    ///
    /// # Panics
    /// Panics if `stream_index` is out of range.
    ///
    /// # Errors
    /// [`ScheduleError::Grid`] if a timetable rejects a checked write.
    pub fn generate_section<R: Rng>(
        &self,
        stream_index: usize,
        section_index: usize,
        ledger: &mut ResourceLedger,
        rng: &mut R,
    ) -> Result<SectionSchedule, ScheduleError> {
        let stream = &self.config.streams[stream_index];
        let label = section_label(section_index);
        let name = format!("{}-{}", stream.name, label);
        info!("generating timetable for {name}");

        let mut timetable = Timetable::new(self.grid.slot_count());
        let lab_placements =
            LabPlacer::new(&self.grid).place_all(&stream.labs, &name, &mut timetable, ledger, rng)?;
        let subject_sessions = self.subject_assigner().assign_all(
            &stream.subjects,
            &name,
            &mut timetable,
            ledger,
            rng,
        )?;

        let empty_days = validation::empty_days(&timetable, &self.grid);
        for day in &empty_days {
            warn!("{name}: no classes scheduled on {day}");
        }

        Ok(SectionSchedule {
            stream_index,
            section_index,
            label,
            timetable,
            lab_placements,
            subject_sessions,
            empty_days,
        })
    }
}

fn section_shortfalls(
    stream: &Stream,
    section: &SectionSchedule,
    required: usize,
) -> Vec<Shortfall> {
    let mut shortfalls = Vec::new();

    for placement in section.lab_placements.iter().filter(|p| !p.is_placed()) {
        shortfalls.push(Shortfall::UnplacedLab {
            stream: stream.name.clone(),
            section: section.label.clone(),
            lab: stream.labs[placement.lab_index].name.clone(),
        });
    }

    for (subject, &placed) in stream.subjects.iter().zip(&section.subject_sessions) {
        if placed < required {
            shortfalls.push(Shortfall::SubjectBelowTarget {
                stream: stream.name.clone(),
                section: section.label.clone(),
                subject: subject.name.clone(),
                placed,
                required,
            });
        }
    }

    for &day in &section.empty_days {
        shortfalls.push(Shortfall::EmptyDay {
            stream: stream.name.clone(),
            section: section.label.clone(),
            day,
        });
    }

    shortfalls
}
