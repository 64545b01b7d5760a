//! Institution-wide resource ledger.
//!
//! Records which teachers and rooms are busy at each (day, slot) across
//! every timetable generated in a run. It is the single source of truth
//! for conflict checks: a placement is legal only if neither its
//! teacher nor its room already appears at that position.
//!
//! The ledger also remembers which positions are held by lab blocks,
//! so that the lab placer can keep lab blocks apart institution-wide.
//!
//! # Concurrency
//! There is no atomic check-and-record. Callers run [`ResourceLedger::can_place`]
//! and then [`ResourceLedger::record`]; correctness relies on one
//! generation step at a time, which `&mut self` enforces.
//!
//! Blank teacher or room names do not denote a resource: they never
//! conflict and are never recorded.

use std::collections::{BTreeSet, HashMap};

use crate::models::Weekday;

type Occupancy = HashMap<Weekday, BTreeSet<usize>>;

/// Teacher and room occupancy for one run.
#[derive(Debug, Clone, Default)]
pub struct ResourceLedger {
    teachers: HashMap<String, Occupancy>,
    rooms: HashMap<String, Occupancy>,
    lab_blocks: Occupancy,
}

fn is_resource(name: &str) -> bool {
    !name.trim().is_empty()
}

fn holds(map: &HashMap<String, Occupancy>, name: &str, day: Weekday, slot: usize) -> bool {
    is_resource(name)
        && map
            .get(name)
            .and_then(|days| days.get(&day))
            .is_some_and(|slots| slots.contains(&slot))
}

fn insert(map: &mut HashMap<String, Occupancy>, name: &str, day: Weekday, slot: usize) {
    if is_resource(name) {
        map.entry(name.to_string())
            .or_default()
            .entry(day)
            .or_default()
            .insert(slot);
    }
}

impl ResourceLedger {
    /// Creates an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `teacher` is already booked at (day, slot).
    pub fn teacher_busy(&self, day: Weekday, slot: usize, teacher: &str) -> bool {
        holds(&self.teachers, teacher, day, slot)
    }

    /// Whether `room` is already booked at (day, slot).
    pub fn room_busy(&self, day: Weekday, slot: usize, room: &str) -> bool {
        holds(&self.rooms, room, day, slot)
    }

    /// Whether a session with this teacher and room fits at (day, slot).
    pub fn can_place(&self, day: Weekday, slot: usize, teacher: &str, room: &str) -> bool {
        !self.teacher_busy(day, slot, teacher) && !self.room_busy(day, slot, room)
    }

    /// Books `teacher` and `room` at (day, slot).
    ///
    /// Does not check for conflicts; call [`ResourceLedger::can_place`] first.
    pub fn record(&mut self, day: Weekday, slot: usize, teacher: &str, room: &str) {
        insert(&mut self.teachers, teacher, day, slot);
        insert(&mut self.rooms, room, day, slot);
    }

    /// Books one slot of a lab block.
    pub fn record_lab(&mut self, day: Weekday, slot: usize, instructor: &str, center: &str) {
        self.record(day, slot, instructor, center);
        self.lab_blocks.entry(day).or_default().insert(slot);
    }

    /// Whether any lab block already holds (day, slot).
    pub fn lab_occupies(&self, day: Weekday, slot: usize) -> bool {
        self.lab_blocks
            .get(&day)
            .is_some_and(|slots| slots.contains(&slot))
    }

    /// All (day, slot) positions booked for `teacher`, sorted.
    pub fn teacher_slots(&self, teacher: &str) -> Vec<(Weekday, usize)> {
        Self::positions(&self.teachers, teacher)
    }

    /// All (day, slot) positions booked for `room`, sorted.
    pub fn room_slots(&self, room: &str) -> Vec<(Weekday, usize)> {
        Self::positions(&self.rooms, room)
    }

    fn positions(map: &HashMap<String, Occupancy>, name: &str) -> Vec<(Weekday, usize)> {
        let mut positions: Vec<(Weekday, usize)> = map
            .get(name)
            .into_iter()
            .flat_map(|days| {
                days.iter()
                    .flat_map(|(&day, slots)| slots.iter().map(move |&slot| (day, slot)))
            })
            .collect();
        positions.sort();
        positions
    }

    /// Number of distinct teachers with at least one booking.
    pub fn teacher_count(&self) -> usize {
        self.teachers.len()
    }

    /// Number of distinct rooms with at least one booking.
    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    /// Whether nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.teachers.is_empty() && self.rooms.is_empty() && self.lab_blocks.is_empty()
    }
}
