//! Derived views of a finished run.
//!
//! # Views
//!
//! | View | Definition |
//! |------|-----------|
//! | Teacher schedule | Every booking of a teacher, ordered by day then slot |
//! | Room usage | Booked cells per room across the week |
//! | Section load | Placed sessions and free teaching cells per section |

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

use crate::models::Weekday;

use super::generator::GenerationResult;

/// One booking in a teacher's week.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TeacherEntry {
    /// Day of the booking.
    pub day: Weekday,
    /// Slot index within the day.
    pub slot: usize,
    /// Slot time range, e.g. `09:00-10:00`.
    pub time: String,
    /// Stream the section belongs to.
    pub stream: String,
    /// Section label.
    pub section: String,
    /// Room or lab center.
    pub room: String,
    /// Subject or lab name.
    pub session: String,
}

/// Occupancy of one section's timetable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SectionLoad {
    /// Stream name.
    pub stream: String,
    /// Section label.
    pub section: String,
    /// Cells holding a subject or lab.
    pub sessions: usize,
    /// Unbooked cells outside the lunch slot.
    pub free_cells: usize,
}

/// Summary of a generation run.
#[derive(Debug, Clone, Serialize)]
pub struct ScheduleSummary {
    /// Weekly schedule per teacher.
    pub teachers: BTreeMap<String, Vec<TeacherEntry>>,
    /// Booked cells per room.
    pub room_usage: BTreeMap<String, usize>,
    /// Load per section, in generation order.
    pub sections: Vec<SectionLoad>,
    /// Booked fraction of all teaching cells (0.0..1.0).
    pub utilization: f64,
}

impl ScheduleSummary {
    /// Computes the summary of a generation result.
    pub fn calculate(result: &GenerationResult) -> Self {
        let grid = &result.grid;
        let windows: HashMap<usize, String> = (0..grid.slot_count())
            .filter_map(|slot| grid.slot_window(slot).map(|w| (slot, w.to_string())))
            .collect();

        let mut teachers: BTreeMap<String, Vec<TeacherEntry>> = BTreeMap::new();
        let mut room_usage: BTreeMap<String, usize> = BTreeMap::new();
        let mut sections = Vec::new();
        let mut booked = 0;
        let mut teaching_cells = 0;

        for stream in &result.streams {
            for section in &stream.sections {
                let tt = &section.timetable;
                let sessions = tt.occupied_count();
                let capacity = grid.teaching_slot_count() * Weekday::COUNT;
                booked += sessions;
                teaching_cells += capacity;
                sections.push(SectionLoad {
                    stream: stream.name.clone(),
                    section: section.label.clone(),
                    sessions,
                    free_cells: capacity.saturating_sub(sessions),
                });

                for (day, slot, cell) in tt.iter() {
                    let Some(booking) = cell.booking() else {
                        continue;
                    };
                    *room_usage.entry(booking.room.clone()).or_insert(0) += 1;
                    teachers
                        .entry(booking.teacher.clone())
                        .or_default()
                        .push(TeacherEntry {
                            day,
                            slot,
                            time: windows.get(&slot).cloned().unwrap_or_default(),
                            stream: stream.name.clone(),
                            section: section.label.clone(),
                            room: booking.room.clone(),
                            session: stream
                                .session_name(booking.session)
                                .unwrap_or_default()
                                .to_string(),
                        });
                }
            }
        }

        for entries in teachers.values_mut() {
            entries.sort_by_key(|e| (e.day, e.slot));
        }

        let utilization = if teaching_cells == 0 {
            0.0
        } else {
            booked as f64 / teaching_cells as f64
        };

        Self {
            teachers,
            room_usage,
            sections,
            utilization,
        }
    }

    /// Booked cells of a teacher across the week.
    pub fn teacher_load(&self, teacher: &str) -> usize {
        self.teachers.get(teacher).map_or(0, Vec::len)
    }

    /// Room with the most booked cells; ties go to the first by name.
    pub fn busiest_room(&self) -> Option<(&str, usize)> {
        self.room_usage
            .iter()
            .max_by(|a, b| a.1.cmp(b.1).then_with(|| b.0.cmp(a.0)))
            .map(|(room, &count)| (room.as_str(), count))
    }

    /// Renders a teacher's week as plain text, one booking per line.
    pub fn teacher_report(&self, teacher: &str) -> Option<String> {
        let entries = self.teachers.get(teacher)?;
        let mut lines = vec![format!("Timetable for {teacher}")];
        for e in entries {
            lines.push(format!(
                "{} {} {}-{} {} ({})",
                e.day.short_name(),
                e.time,
                e.stream,
                e.section,
                e.session,
                e.room
            ));
        }
        Some(lines.join("\n"))
    }
}
