//! Institution configuration.
//!
//! Everything the generator needs for one run: the daily slot layout,
//! the lunch break, the room pool, and the streams with their subjects,
//! labs and section counts. The input layer that collects this data is
//! not part of the crate; it hands over an [`InstitutionConfig`],
//! usually deserialized from JSON.
//!
//! Optional fields fall back to the same defaults the interactive
//! input used: lunch at `13:00` for 60 minutes, 5-minute breaks.

use serde::{Deserialize, Serialize};

use super::grid::{DEFAULT_BREAK_MINUTES, DEFAULT_LUNCH_DURATION};
use super::{parse_time, Lab, Subject, TimeGrid};

/// Default lunch start (`HH:MM`).
pub const DEFAULT_LUNCH_START: &str = "13:00";

fn default_lunch_start() -> String {
    DEFAULT_LUNCH_START.to_string()
}

fn default_lunch_duration() -> u32 {
    DEFAULT_LUNCH_DURATION
}

fn default_break_minutes() -> u32 {
    DEFAULT_BREAK_MINUTES
}

fn default_sections() -> usize {
    1
}

/// An academic stream: subjects and labs shared by all its sections.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stream {
    /// Stream name (e.g. `CSE`).
    pub name: String,
    /// Number of independently scheduled sections.
    #[serde(default = "default_sections")]
    pub sections: usize,
    /// Regular subjects, in scheduling order.
    #[serde(default)]
    pub subjects: Vec<Subject>,
    /// Labs, in scheduling order.
    #[serde(default)]
    pub labs: Vec<Lab>,
}

impl Stream {
    /// Creates a single-section stream with no subjects or labs.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sections: 1,
            subjects: Vec::new(),
            labs: Vec::new(),
        }
    }

    /// Sets the section count.
    pub fn with_sections(mut self, sections: usize) -> Self {
        self.sections = sections;
        self
    }

    /// Adds a subject.
    pub fn with_subject(mut self, subject: Subject) -> Self {
        self.subjects.push(subject);
        self
    }

    /// Adds a lab.
    pub fn with_lab(mut self, lab: Lab) -> Self {
        self.labs.push(lab);
        self
    }

    /// Fills blank subject, teacher and lab names.
    ///
    /// Subjects become `SUBJ_<n>`, teachers `TEACHER_<n>`, labs
    /// `LAB_<stream>_<n>`, all 1-based.
    pub fn with_default_names(mut self) -> Self {
        for (i, subject) in self.subjects.iter_mut().enumerate() {
            if subject.name.trim().is_empty() {
                subject.name = format!("SUBJ_{}", i + 1);
            }
            if subject.teacher.trim().is_empty() {
                subject.teacher = format!("TEACHER_{}", i + 1);
            }
        }
        for (i, lab) in self.labs.iter_mut().enumerate() {
            if lab.name.trim().is_empty() {
                lab.name = format!("LAB_{}_{}", self.name, i + 1);
            }
        }
        self
    }
}

/// Full input of a generation run.
///
/// # Example
///
/// ```
/// use u_timetable::models::{InstitutionConfig, Stream, Subject};
///
/// let config = InstitutionConfig::new(9, vec![60, 60, 60, 60])
///     .with_rooms(10)
///     .with_stream(Stream::new("CSE").with_subject(Subject::new("Maths", "Rao")));
/// assert_eq!(config.lunch_start_minute(), Some(13 * 60));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstitutionConfig {
    /// Hour classes begin (0..=23).
    pub start_hour: u32,
    /// Size of the general room pool (`Room 1` ..= `Room n`).
    pub room_count: usize,
    /// Duration of each teaching slot, in order (minutes).
    pub slot_durations: Vec<u32>,
    /// Lunch start as `HH:MM`.
    #[serde(default = "default_lunch_start")]
    pub lunch_start: String,
    /// Lunch length (minutes).
    #[serde(default = "default_lunch_duration")]
    pub lunch_duration: u32,
    /// Break between consecutive slots (minutes).
    #[serde(default = "default_break_minutes")]
    pub break_minutes: u32,
    /// Streams, in generation order.
    pub streams: Vec<Stream>,
}

impl InstitutionConfig {
    /// Creates a configuration with default lunch, break, and 20 rooms.
    pub fn new(start_hour: u32, slot_durations: Vec<u32>) -> Self {
        Self {
            start_hour,
            room_count: 20,
            slot_durations,
            lunch_start: default_lunch_start(),
            lunch_duration: DEFAULT_LUNCH_DURATION,
            break_minutes: DEFAULT_BREAK_MINUTES,
            streams: Vec::new(),
        }
    }

    /// Sets the room pool size.
    pub fn with_rooms(mut self, room_count: usize) -> Self {
        self.room_count = room_count;
        self
    }

    /// Sets the lunch start (`HH:MM`).
    pub fn with_lunch_start(mut self, lunch_start: impl Into<String>) -> Self {
        self.lunch_start = lunch_start.into();
        self
    }

    /// Sets the lunch duration.
    pub fn with_lunch_duration(mut self, minutes: u32) -> Self {
        self.lunch_duration = minutes;
        self
    }

    /// Sets the break between slots.
    pub fn with_break_minutes(mut self, minutes: u32) -> Self {
        self.break_minutes = minutes;
        self
    }

    /// Adds a stream.
    pub fn with_stream(mut self, stream: Stream) -> Self {
        self.streams.push(stream);
        self
    }

    /// Start of the teaching day in minutes since midnight.
    #[inline]
    pub fn start_minute(&self) -> u32 {
        self.start_hour.saturating_mul(60)
    }

    /// Parsed lunch start, `None` if malformed.
    pub fn lunch_start_minute(&self) -> Option<u32> {
        parse_time(&self.lunch_start)
    }

    /// Builds the slot grid, `None` if the lunch start is malformed.
    pub fn time_grid(&self) -> Option<TimeGrid> {
        let lunch = self.lunch_start_minute()?;
        Some(
            TimeGrid::new(self.start_minute(), self.slot_durations.clone(), lunch)
                .with_break_minutes(self.break_minutes)
                .with_lunch_duration(self.lunch_duration),
        )
    }

    /// Applies [`Stream::with_default_names`] to every stream.
    pub fn with_default_names(mut self) -> Self {
        self.streams = self
            .streams
            .into_iter()
            .map(Stream::with_default_names)
            .collect();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_json() {
        let json = r#"{
            "start_hour": 9,
            "room_count": 5,
            "slot_durations": [60, 60, 60, 60],
            "streams": [{ "name": "CSE" }]
        }"#;
        let config: InstitutionConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.lunch_start, "13:00");
        assert_eq!(config.lunch_duration, 60);
        assert_eq!(config.break_minutes, 5);
        assert_eq!(config.streams[0].sections, 1);
        assert!(config.streams[0].subjects.is_empty());
    }

    #[test]
    fn test_time_grid_from_config() {
        let config = InstitutionConfig::new(9, vec![60, 60, 60, 60]);
        let grid = config.time_grid().unwrap();
        assert_eq!(grid.start_minute(), 540);
        assert_eq!(grid.lunch_slot(), Some(3));
        assert_eq!(grid.lunch_duration(), 60);
    }

    #[test]
    fn test_time_grid_rejects_bad_lunch() {
        let config = InstitutionConfig::new(9, vec![60]).with_lunch_start("noon");
        assert!(config.time_grid().is_none());
    }

    #[test]
    fn test_default_names() {
        let stream = Stream::new("ECE")
            .with_subject(Subject::new("", ""))
            .with_subject(Subject::new("Signals", " "))
            .with_lab(Lab::new("", "Center A", "Iyer", 120))
            .with_default_names();

        assert_eq!(stream.subjects[0].name, "SUBJ_1");
        assert_eq!(stream.subjects[0].teacher, "TEACHER_1");
        assert_eq!(stream.subjects[1].name, "Signals");
        assert_eq!(stream.subjects[1].teacher, "TEACHER_2");
        assert_eq!(stream.labs[0].name, "LAB_ECE_1");
    }
}
