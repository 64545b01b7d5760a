//! Lab block placement.
//!
//! # Algorithm
//!
//! For each lab of a stream, in declaration order:
//! 1. `slots_needed = max(1, ceil(duration / first_slot_duration))`.
//! 2. Shuffle the days; for each day shuffle the feasible start offsets
//!    `0..=slot_count - slots_needed`.
//! 3. Accept the first (day, start) whose range avoids the lunch slot,
//!    is free in this timetable, holds no other lab block anywhere in
//!    the institution, and has the instructor and center free on every
//!    covered slot.
//! 4. Book every covered cell and record it in the ledger.
//!
//! A lab whose candidates are all rejected stays unplaced. That is a
//! soft failure: it is logged and generation continues.
//!
//! # Complexity
//! O(d * s * k) per lab, where d=days, s=start offsets, k=slots needed.

use log::{debug, trace, warn};
use rand::seq::SliceRandom;
use rand::Rng;

use crate::ledger::ResourceLedger;
use crate::models::{Booking, GridError, Lab, LabBlock, LabPlacement, TimeGrid, Timetable, Weekday};

/// Places lab blocks onto a section timetable.
#[derive(Debug, Clone)]
pub struct LabPlacer<'a> {
    grid: &'a TimeGrid,
}

impl<'a> LabPlacer<'a> {
    /// Creates a placer over a slot grid.
    pub fn new(grid: &'a TimeGrid) -> Self {
        Self { grid }
    }

    /// Places every lab of a stream, in order.
    ///
    /// `section` only labels log messages. Returns one placement per lab,
    /// index-aligned with `labs`.
    ///
    /// # Errors
    /// Propagates a [`GridError`] if the timetable rejects a write that
    /// passed the candidate checks.
    pub fn place_all<R: Rng>(
        &self,
        labs: &[Lab],
        section: &str,
        timetable: &mut Timetable,
        ledger: &mut ResourceLedger,
        rng: &mut R,
    ) -> Result<Vec<LabPlacement>, GridError> {
        let mut placements = Vec::with_capacity(labs.len());
        for (index, lab) in labs.iter().enumerate() {
            let placement = self.place(index, lab, timetable, ledger, rng)?;
            match placement.block {
                Some(block) => debug!(
                    "{section}: lab '{}' on {} slots {}..{}",
                    lab.name,
                    block.day,
                    block.start_slot,
                    block.end_slot()
                ),
                None => warn!(
                    "{section}: could not schedule lab '{}' ({} slots needed)",
                    lab.name, placement.slots_needed
                ),
            }
            placements.push(placement);
        }
        Ok(placements)
    }

    /// Places a single lab.
    ///
    /// # Errors
    /// See [`LabPlacer::place_all`].
    pub fn place<R: Rng>(
        &self,
        lab_index: usize,
        lab: &Lab,
        timetable: &mut Timetable,
        ledger: &mut ResourceLedger,
        rng: &mut R,
    ) -> Result<LabPlacement, GridError> {
        let slots_needed = self.grid.lab_slots_needed(lab.duration_minutes);
        let slot_count = self.grid.slot_count();
        if slots_needed > slot_count {
            return Ok(LabPlacement::unplaced(lab_index, slots_needed));
        }

        let mut days = Weekday::ALL;
        days.shuffle(rng);

        for day in days {
            let mut starts: Vec<usize> = (0..=slot_count - slots_needed).collect();
            starts.shuffle(rng);

            for start in starts {
                let block = LabBlock::new(day, start, slots_needed);
                if !self.fits(&block, lab, timetable, ledger) {
                    trace!(
                        "lab '{}' rejected at {} slot {}",
                        lab.name,
                        day.short_name(),
                        start
                    );
                    continue;
                }

                for slot in block.slots() {
                    timetable.occupy(
                        day,
                        slot,
                        Booking::lab(lab_index, &lab.instructor, &lab.center),
                    )?;
                    ledger.record_lab(day, slot, &lab.instructor, &lab.center);
                }
                return Ok(LabPlacement::placed(lab_index, block));
            }
        }

        Ok(LabPlacement::unplaced(lab_index, slots_needed))
    }

    /// Whether `block` is a legal position for `lab`.
    pub fn fits(
        &self,
        block: &LabBlock,
        lab: &Lab,
        timetable: &Timetable,
        ledger: &ResourceLedger,
    ) -> bool {
        if block.end_slot() > self.grid.slot_count() {
            return false;
        }
        let day = block.day;
        block.slots().all(|slot| {
            !self.grid.is_lunch(slot)
                && timetable.is_free(day, slot)
                && !ledger.lab_occupies(day, slot)
                && ledger.can_place(day, slot, &lab.instructor, &lab.center)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn grid() -> TimeGrid {
        // Lunch at slot 3
        TimeGrid::new(540, vec![60, 60, 60, 60, 60, 60], 780)
    }

    fn chem() -> Lab {
        Lab::new("Chemistry", "Chem Center", "Ray", 120)
    }

    #[test]
    fn test_place_single_lab() {
        let grid = grid();
        let placer = LabPlacer::new(&grid);
        let mut tt = Timetable::new(grid.slot_count());
        let mut ledger = ResourceLedger::new();
        let mut rng = SmallRng::seed_from_u64(42);

        let placement = placer
            .place(0, &chem(), &mut tt, &mut ledger, &mut rng)
            .unwrap();
        let block = placement.block.expect("empty grid must fit a 2-slot lab");

        assert_eq!(block.slot_count, 2);
        assert!(!block.contains(3));
        for slot in block.slots() {
            let cell = tt.cell(block.day, slot).unwrap();
            assert_eq!(cell.lab_index(), Some(0));
            assert_eq!(cell.teacher(), Some("Ray"));
            assert_eq!(cell.room(), Some("Chem Center"));
            assert!(ledger.lab_occupies(block.day, slot));
        }
        assert_eq!(tt.occupied_count(), 2);
    }

    #[test]
    fn test_duration_rounds_up() {
        let grid = grid();
        let placer = LabPlacer::new(&grid);
        let mut tt = Timetable::new(grid.slot_count());
        let mut ledger = ResourceLedger::new();
        let mut rng = SmallRng::seed_from_u64(1);

        let lab = Lab::new("Physics", "Phy Center", "Bose", 150);
        let placement = placer.place(0, &lab, &mut tt, &mut ledger, &mut rng).unwrap();
        assert_eq!(placement.slots_needed, 3);
        assert_eq!(placement.block.unwrap().slot_count, 3);
    }

    #[test]
    fn test_never_covers_lunch() {
        let grid = grid();
        let placer = LabPlacer::new(&grid);
        for seed in 0..50 {
            let mut tt = Timetable::new(grid.slot_count());
            let mut ledger = ResourceLedger::new();
            let mut rng = SmallRng::seed_from_u64(seed);
            // 3 slots before lunch (0..3) or 2 after (4..6): only 0..3 fits
            let lab = Lab::new("Long", "Center", "Ray", 180);
            let block = placer
                .place(0, &lab, &mut tt, &mut ledger, &mut rng)
                .unwrap()
                .block
                .unwrap();
            assert_eq!(block.start_slot, 0);
            assert_eq!(block.slots(), 0..3);
        }
    }

    #[test]
    fn test_too_long_lab_is_unplaced() {
        let grid = grid();
        let placer = LabPlacer::new(&grid);
        let mut tt = Timetable::new(grid.slot_count());
        let mut ledger = ResourceLedger::new();
        let mut rng = SmallRng::seed_from_u64(7);

        // 4 slots never fit around lunch at slot 3 in a 6-slot day
        let lab = Lab::new("Marathon", "Center", "Ray", 240);
        let placement = placer.place(0, &lab, &mut tt, &mut ledger, &mut rng).unwrap();
        assert!(!placement.is_placed());
        assert_eq!(tt.occupied_count(), 0);
        assert!(ledger.is_empty());

        // Longer than the whole day
        let lab = Lab::new("Epic", "Center", "Ray", 600);
        let placement = placer.place(1, &lab, &mut tt, &mut ledger, &mut rng).unwrap();
        assert!(!placement.is_placed());
        assert_eq!(placement.slots_needed, 10);
    }

    #[test]
    fn test_instructor_conflict_blocks_candidate() {
        let grid = grid();
        let placer = LabPlacer::new(&grid);
        let tt = Timetable::new(grid.slot_count());
        let mut ledger = ResourceLedger::new();
        ledger.record(Weekday::Monday, 1, "Ray", "Room 1");

        let lab = chem();
        assert!(!placer.fits(&LabBlock::new(Weekday::Monday, 0, 2), &lab, &tt, &ledger));
        assert!(!placer.fits(&LabBlock::new(Weekday::Monday, 1, 2), &lab, &tt, &ledger));
        assert!(placer.fits(&LabBlock::new(Weekday::Monday, 4, 2), &lab, &tt, &ledger));
        assert!(placer.fits(&LabBlock::new(Weekday::Tuesday, 0, 2), &lab, &tt, &ledger));
    }

    #[test]
    fn test_other_lab_block_excludes_position() {
        let grid = grid();
        let placer = LabPlacer::new(&grid);
        let tt = Timetable::new(grid.slot_count());
        let mut ledger = ResourceLedger::new();
        ledger.record_lab(Weekday::Friday, 4, "Bose", "Phy Center");

        let lab = chem();
        assert!(!placer.fits(&LabBlock::new(Weekday::Friday, 4, 2), &lab, &tt, &ledger));
        assert!(!placer.fits(&LabBlock::new(Weekday::Friday, 3, 2), &lab, &tt, &ledger));
        assert!(placer.fits(&LabBlock::new(Weekday::Friday, 0, 2), &lab, &tt, &ledger));
    }

    #[test]
    fn test_occupied_cell_blocks_candidate() {
        let grid = grid();
        let placer = LabPlacer::new(&grid);
        let mut tt = Timetable::new(grid.slot_count());
        tt.occupy(Weekday::Monday, 5, Booking::regular(0, "Rao", "Room 2"))
            .unwrap();
        let ledger = ResourceLedger::new();

        assert!(!placer.fits(&LabBlock::new(Weekday::Monday, 4, 2), &chem(), &tt, &ledger));
        assert!(!placer.fits(&LabBlock::new(Weekday::Monday, 5, 2), &chem(), &tt, &ledger));
    }

    #[test]
    fn test_exhausted_week_leaves_lab_unplaced() {
        let grid = TimeGrid::new(540, vec![60, 60], 1200);
        let placer = LabPlacer::new(&grid);
        let mut tt = Timetable::new(grid.slot_count());
        let mut ledger = ResourceLedger::new();
        for day in Weekday::ALL {
            ledger.record(day, 0, "Ray", "Elsewhere");
        }
        let mut rng = SmallRng::seed_from_u64(3);

        let placement = placer
            .place(0, &chem(), &mut tt, &mut ledger, &mut rng)
            .unwrap();
        assert!(!placement.is_placed());
        assert_eq!(tt.occupied_count(), 0);
    }

    #[test]
    fn test_place_all_keeps_order_and_avoids_overlap() {
        let grid = grid();
        let placer = LabPlacer::new(&grid);
        let mut tt = Timetable::new(grid.slot_count());
        let mut ledger = ResourceLedger::new();
        let mut rng = SmallRng::seed_from_u64(11);

        let labs = vec![
            chem(),
            Lab::new("Physics", "Phy Center", "Bose", 120),
            Lab::new("Biology", "Bio Center", "Sen", 60),
        ];
        let placements = placer
            .place_all(&labs, "SCI-A", &mut tt, &mut ledger, &mut rng)
            .unwrap();

        assert_eq!(placements.len(), 3);
        for (i, p) in placements.iter().enumerate() {
            assert_eq!(p.lab_index, i);
            assert!(p.is_placed());
        }
        assert_eq!(tt.occupied_count(), 5);
    }

    #[test]
    fn test_same_seed_same_placement() {
        let grid = grid();
        let placer = LabPlacer::new(&grid);
        let run = |seed| {
            let mut tt = Timetable::new(grid.slot_count());
            let mut ledger = ResourceLedger::new();
            let mut rng = SmallRng::seed_from_u64(seed);
            placer
                .place(0, &chem(), &mut tt, &mut ledger, &mut rng)
                .unwrap()
        };
        assert_eq!(run(99), run(99));
    }
}
