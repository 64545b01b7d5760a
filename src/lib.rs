//! Weekly academic timetable allocation.
//!
//! Builds a Monday-to-Friday timetable for every section of every
//! stream in an institution. Each section needs its subjects three times
//! a week on distinct days and its labs as contiguous multi-slot blocks,
//! around a lunch slot derived from the day's slot layout. Teachers and
//! rooms are shared institution-wide and never double-booked.
//!
//! # Modules
//!
//! - **`models`**: Domain types: `TimeGrid`, `Weekday`, `Subject`, `Lab`,
//!   `Timetable`, `InstitutionConfig`
//! - **`ledger`**: Institution-wide teacher/room occupancy
//! - **`scheduler`**: `LabPlacer`, `SubjectAssigner`, `TimetableGenerator`,
//!   `ScheduleSummary`
//! - **`validation`**: Configuration checks and post-run invariant audit
//! - **`error`**: Fatal run errors
//!
//! # Example
//!
//! ```
//! use rand::rngs::StdRng;
//! use rand::SeedableRng;
//! use u_timetable::models::{InstitutionConfig, Lab, Stream, Subject};
//! use u_timetable::scheduler::{ScheduleSummary, TimetableGenerator};
//!
//! let config = InstitutionConfig::new(9, vec![60, 60, 60, 60, 60])
//!     .with_rooms(6)
//!     .with_stream(
//!         Stream::new("CSE")
//!             .with_sections(2)
//!             .with_subject(Subject::new("Maths", "Rao"))
//!             .with_lab(Lab::new("OS Lab", "Lab Center 1", "Pillai", 120)),
//!     );
//!
//! let generator = TimetableGenerator::new(config).unwrap();
//! let result = generator.generate(&mut StdRng::seed_from_u64(1)).unwrap();
//! let summary = ScheduleSummary::calculate(&result);
//! assert_eq!(summary.sections.len(), 2);
//! ```

pub mod error;
pub mod ledger;
pub mod models;
pub mod scheduler;
pub mod validation;

pub use error::ScheduleError;
