//! Regular subject placement.
//!
//! # Algorithm
//!
//! Bounded random trials, no backtracking. For each subject in index
//! order, up to `max_attempts` times:
//! 1. Draw a uniformly random day and slot.
//! 2. Reject the draw if it is the lunch slot, the cell is taken, the
//!    subject already meets that day, the teacher is busy anywhere in
//!    the institution at that position, or the teacher and a randomly
//!    drawn room (`Room 1` ..= `Room n`) cannot both be booked there.
//! 3. Otherwise book the cell and record it in the ledger.
//!
//! A subject stops as soon as it reaches its required session count.
//! When the budget runs out first, the shortfall is logged and the
//! remaining cells stay free.

use log::{trace, warn};
use rand::Rng;

use crate::ledger::ResourceLedger;
use crate::models::{
    Booking, GridError, Subject, TimeGrid, Timetable, Weekday, REQUIRED_WEEKLY_SESSIONS,
};

/// Trial budget per subject.
pub const DEFAULT_MAX_ATTEMPTS: usize = 100;

/// Fills free cells with regular subject sessions.
#[derive(Debug, Clone)]
pub struct SubjectAssigner<'a> {
    grid: &'a TimeGrid,
    room_count: usize,
    max_attempts: usize,
    required_sessions: usize,
}

impl<'a> SubjectAssigner<'a> {
    /// Creates an assigner drawing rooms from `Room 1` ..= `Room {room_count}`.
    pub fn new(grid: &'a TimeGrid, room_count: usize) -> Self {
        Self {
            grid,
            room_count,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            required_sessions: REQUIRED_WEEKLY_SESSIONS,
        }
    }

    /// Sets the trial budget per subject.
    pub fn with_max_attempts(mut self, max_attempts: usize) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Sets the weekly session target per subject.
    pub fn with_required_sessions(mut self, required_sessions: usize) -> Self {
        self.required_sessions = required_sessions;
        self
    }

    /// Weekly session target per subject.
    #[inline]
    pub fn required_sessions(&self) -> usize {
        self.required_sessions
    }

    /// Assigns every subject, in order.
    ///
    /// `section` only labels log messages. Returns the number of sessions
    /// placed per subject, index-aligned with `subjects`.
    ///
    /// # Errors
    /// Propagates a [`GridError`] if the timetable rejects a write that
    /// passed the trial checks.
    pub fn assign_all<R: Rng>(
        &self,
        subjects: &[Subject],
        section: &str,
        timetable: &mut Timetable,
        ledger: &mut ResourceLedger,
        rng: &mut R,
    ) -> Result<Vec<usize>, GridError> {
        let mut placed = Vec::with_capacity(subjects.len());
        for (index, subject) in subjects.iter().enumerate() {
            let count = self.assign(index, subject, timetable, ledger, rng)?;
            if count < self.required_sessions {
                warn!(
                    "{section}: could only assign subject '{}' {} times (target: {})",
                    subject.name, count, self.required_sessions
                );
            }
            placed.push(count);
        }
        Ok(placed)
    }

    /// Assigns one subject; returns the sessions placed.
    ///
    /// # Errors
    /// See [`SubjectAssigner::assign_all`].
    pub fn assign<R: Rng>(
        &self,
        subject_index: usize,
        subject: &Subject,
        timetable: &mut Timetable,
        ledger: &mut ResourceLedger,
        rng: &mut R,
    ) -> Result<usize, GridError> {
        let slot_count = self.grid.slot_count();
        if slot_count == 0 || self.room_count == 0 {
            return Ok(0);
        }

        let teacher = subject.teacher.as_str();
        let mut placed = 0;
        let mut attempts = 0;

        while placed < self.required_sessions && attempts < self.max_attempts {
            attempts += 1;
            let day = Weekday::ALL[rng.random_range(0..Weekday::COUNT)];
            let slot = rng.random_range(0..slot_count);

            if self.grid.is_lunch(slot)
                || !timetable.is_free(day, slot)
                || timetable.has_subject_on(day, subject_index)
                || ledger.teacher_busy(day, slot, teacher)
            {
                continue;
            }

            let room = format!("Room {}", rng.random_range(1..=self.room_count));
            if !ledger.can_place(day, slot, teacher, &room) {
                trace!("{} busy at {} slot {slot}", room, day.short_name());
                continue;
            }

            timetable.occupy(day, slot, Booking::regular(subject_index, teacher, &room))?;
            ledger.record(day, slot, teacher, &room);
            placed += 1;
        }

        Ok(placed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    fn grid() -> TimeGrid {
        TimeGrid::new(540, vec![60, 60, 60, 60], 780)
    }

    #[test]
    fn test_subject_gets_three_sessions_on_distinct_days() {
        let grid = grid();
        let assigner = SubjectAssigner::new(&grid, 10);
        let mut tt = Timetable::new(grid.slot_count());
        let mut ledger = ResourceLedger::new();
        let mut rng = SmallRng::seed_from_u64(42);

        let placed = assigner
            .assign(0, &Subject::new("Maths", "Rao"), &mut tt, &mut ledger, &mut rng)
            .unwrap();
        assert_eq!(placed, REQUIRED_WEEKLY_SESSIONS);
        assert_eq!(tt.sessions_of(0), 3);

        let days: HashSet<Weekday> = tt
            .iter()
            .filter(|(_, _, c)| c.subject_index() == Some(0))
            .map(|(d, _, _)| d)
            .collect();
        assert_eq!(days.len(), 3);
        assert_eq!(ledger.teacher_slots("Rao").len(), 3);
    }

    #[test]
    fn test_lunch_slot_never_used() {
        let grid = grid();
        let assigner = SubjectAssigner::new(&grid, 20);
        let subjects: Vec<Subject> = (0..5)
            .map(|i| Subject::new(format!("S{i}"), format!("T{i}")))
            .collect();

        for seed in 0..20 {
            let mut tt = Timetable::new(grid.slot_count());
            let mut ledger = ResourceLedger::new();
            let mut rng = SmallRng::seed_from_u64(seed);
            assigner
                .assign_all(&subjects, "X-A", &mut tt, &mut ledger, &mut rng)
                .unwrap();
            for day in Weekday::ALL {
                assert!(tt.is_free(day, 3));
            }
        }
    }

    #[test]
    fn test_busy_teacher_is_skipped() {
        let grid = grid();
        let assigner = SubjectAssigner::new(&grid, 5);
        let mut tt = Timetable::new(grid.slot_count());
        let mut ledger = ResourceLedger::new();
        // Rao teaches elsewhere in every non-lunch slot except Friday slot 0
        for day in Weekday::ALL {
            for slot in 0..3 {
                if (day, slot) != (Weekday::Friday, 0) {
                    ledger.record(day, slot, "Rao", "Other Room");
                }
            }
        }
        let mut rng = SmallRng::seed_from_u64(5);

        let placed = assigner
            .with_max_attempts(10_000)
            .assign(0, &Subject::new("Maths", "Rao"), &mut tt, &mut ledger, &mut rng)
            .unwrap();
        assert_eq!(placed, 1);
        assert_eq!(tt.cell(Weekday::Friday, 0).unwrap().subject_index(), Some(0));
    }

    #[test]
    fn test_budget_exhaustion_is_soft() {
        let grid = grid();
        let assigner = SubjectAssigner::new(&grid, 5).with_max_attempts(0);
        let mut tt = Timetable::new(grid.slot_count());
        let mut ledger = ResourceLedger::new();
        let mut rng = SmallRng::seed_from_u64(1);

        let placed = assigner
            .assign_all(
                &[Subject::new("Maths", "Rao")],
                "X-A",
                &mut tt,
                &mut ledger,
                &mut rng,
            )
            .unwrap();
        assert_eq!(placed, vec![0]);
        assert_eq!(tt.occupied_count(), 0);
    }

    #[test]
    fn test_rooms_come_from_pool() {
        let grid = grid();
        let assigner = SubjectAssigner::new(&grid, 2);
        let mut tt = Timetable::new(grid.slot_count());
        let mut ledger = ResourceLedger::new();
        let mut rng = SmallRng::seed_from_u64(9);
        let subjects: Vec<Subject> = (0..4)
            .map(|i| Subject::new(format!("S{i}"), format!("T{i}")))
            .collect();

        assigner
            .assign_all(&subjects, "X-A", &mut tt, &mut ledger, &mut rng)
            .unwrap();
        for (_, _, cell) in tt.iter() {
            if let Some(room) = cell.room() {
                assert!(room == "Room 1" || room == "Room 2", "unexpected {room}");
            }
        }
    }

    #[test]
    fn test_existing_lab_cells_are_respected() {
        let grid = grid();
        let assigner = SubjectAssigner::new(&grid, 10);
        let mut tt = Timetable::new(grid.slot_count());
        for day in Weekday::ALL {
            tt.occupy(day, 0, Booking::lab(0, "Ray", "Lab")).unwrap();
        }
        let mut ledger = ResourceLedger::new();
        let mut rng = SmallRng::seed_from_u64(2);

        assigner
            .assign(0, &Subject::new("Maths", "Rao"), &mut tt, &mut ledger, &mut rng)
            .unwrap();
        for day in Weekday::ALL {
            assert!(tt.cell(day, 0).unwrap().is_lab());
        }
    }

    #[test]
    fn test_custom_session_target() {
        let grid = grid();
        let assigner = SubjectAssigner::new(&grid, 10)
            .with_required_sessions(5)
            .with_max_attempts(1_000);
        let mut tt = Timetable::new(grid.slot_count());
        let mut ledger = ResourceLedger::new();
        let mut rng = SmallRng::seed_from_u64(4);

        let placed = assigner
            .assign(0, &Subject::new("Maths", "Rao"), &mut tt, &mut ledger, &mut rng)
            .unwrap();
        // One per day at most
        assert_eq!(placed, 5);
        assert_eq!(assigner.required_sessions(), 5);
    }
}
