//! Section timetable model.
//!
//! A timetable is a dense (day × slot) grid for one section of one
//! stream. Every cell is either free or holds exactly one booking: a
//! regular subject session or one slot of a lab block, together with
//! the teacher and room resolved for that cell.
//!
//! Cells are stored row-major by day in a flat vector. All access goes
//! through bounds-checked accessors; writes never overwrite a booking.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::Weekday;

/// What a booked cell is used for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "index", rename_all = "snake_case")]
pub enum Session {
    /// A regular subject, by index into the stream's subject list.
    Regular(usize),
    /// A lab slot, by index into the stream's lab list.
    Lab(usize),
}

/// A booked cell: session plus resolved teacher and room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Booking {
    /// Session held in the cell.
    pub session: Session,
    /// Teacher (or lab instructor) for the cell.
    pub teacher: String,
    /// Room (or lab center) for the cell.
    pub room: String,
}

impl Booking {
    /// A regular subject session.
    pub fn regular(
        subject_index: usize,
        teacher: impl Into<String>,
        room: impl Into<String>,
    ) -> Self {
        Self {
            session: Session::Regular(subject_index),
            teacher: teacher.into(),
            room: room.into(),
        }
    }

    /// One slot of a lab block.
    pub fn lab(lab_index: usize, instructor: impl Into<String>, center: impl Into<String>) -> Self {
        Self {
            session: Session::Lab(lab_index),
            teacher: instructor.into(),
            room: center.into(),
        }
    }
}

/// A single (day, slot) cell.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum Cell {
    /// Nothing scheduled.
    #[default]
    Free,
    /// Holds a booking.
    Occupied(Booking),
}

impl Cell {
    /// Whether nothing is scheduled here.
    #[inline]
    pub fn is_free(&self) -> bool {
        matches!(self, Cell::Free)
    }

    /// The booking, if occupied.
    pub fn booking(&self) -> Option<&Booking> {
        match self {
            Cell::Free => None,
            Cell::Occupied(booking) => Some(booking),
        }
    }

    /// The session, if occupied.
    pub fn session(&self) -> Option<Session> {
        self.booking().map(|b| b.session)
    }

    /// Resolved teacher name, if occupied.
    pub fn teacher(&self) -> Option<&str> {
        self.booking().map(|b| b.teacher.as_str())
    }

    /// Resolved room name, if occupied.
    pub fn room(&self) -> Option<&str> {
        self.booking().map(|b| b.room.as_str())
    }

    /// Whether the cell holds a lab slot.
    pub fn is_lab(&self) -> bool {
        matches!(self.session(), Some(Session::Lab(_)))
    }

    /// Subject index for regular sessions.
    pub fn subject_index(&self) -> Option<usize> {
        match self.session() {
            Some(Session::Regular(index)) => Some(index),
            _ => None,
        }
    }

    /// Lab index for lab slots.
    pub fn lab_index(&self) -> Option<usize> {
        match self.session() {
            Some(Session::Lab(index)) => Some(index),
            _ => None,
        }
    }
}

/// Rejected grid write.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GridError {
    /// The slot index is past the end of the day.
    #[error("slot {slot} on {day} is outside the grid ({slots_per_day} slots per day)")]
    OutOfBounds {
        day: Weekday,
        slot: usize,
        slots_per_day: usize,
    },
    /// The cell already holds a booking.
    #[error("slot {slot} on {day} is already occupied")]
    AlreadyOccupied { day: Weekday, slot: usize },
    /// A stored grid does not hold one cell per (day, slot).
    #[error("timetable with {slots_per_day} slots per day needs {expected} cells, found {actual}")]
    CellCount {
        slots_per_day: usize,
        expected: usize,
        actual: usize,
    },
}

/// Weekly grid of one section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "StoredTimetable")]
pub struct Timetable {
    slots_per_day: usize,
    cells: Vec<Cell>,
}

#[derive(Deserialize)]
struct StoredTimetable {
    slots_per_day: usize,
    cells: Vec<Cell>,
}

impl TryFrom<StoredTimetable> for Timetable {
    type Error = GridError;

    fn try_from(stored: StoredTimetable) -> Result<Self, Self::Error> {
        let expected = stored
            .slots_per_day
            .checked_mul(Weekday::COUNT)
            .unwrap_or(usize::MAX);
        if stored.cells.len() != expected {
            return Err(GridError::CellCount {
                slots_per_day: stored.slots_per_day,
                expected,
                actual: stored.cells.len(),
            });
        }
        Ok(Self {
            slots_per_day: stored.slots_per_day,
            cells: stored.cells,
        })
    }
}

impl Timetable {
    /// Creates an all-free timetable.
    pub fn new(slots_per_day: usize) -> Self {
        Self {
            slots_per_day,
            cells: vec![Cell::Free; slots_per_day * Weekday::COUNT],
        }
    }

    /// Slots per day.
    #[inline]
    pub fn slots_per_day(&self) -> usize {
        self.slots_per_day
    }

    fn offset(&self, day: Weekday, slot: usize) -> Option<usize> {
        (slot < self.slots_per_day).then(|| day.index() * self.slots_per_day + slot)
    }

    /// The cell at (day, slot), or `None` when out of range.
    pub fn cell(&self, day: Weekday, slot: usize) -> Option<&Cell> {
        self.offset(day, slot).and_then(|i| self.cells.get(i))
    }

    /// Whether (day, slot) exists and is free.
    pub fn is_free(&self, day: Weekday, slot: usize) -> bool {
        self.cell(day, slot).is_some_and(Cell::is_free)
    }

    /// Books a free cell.
    ///
    /// # Errors
    /// [`GridError::OutOfBounds`] for an invalid slot,
    /// [`GridError::AlreadyOccupied`] when the cell is taken.
    pub fn occupy(&mut self, day: Weekday, slot: usize, booking: Booking) -> Result<(), GridError> {
        let index = self.offset(day, slot).ok_or(GridError::OutOfBounds {
            day,
            slot,
            slots_per_day: self.slots_per_day,
        })?;
        let cell = self.cells.get_mut(index).ok_or(GridError::OutOfBounds {
            day,
            slot,
            slots_per_day: self.slots_per_day,
        })?;
        if !cell.is_free() {
            return Err(GridError::AlreadyOccupied { day, slot });
        }
        *cell = Cell::Occupied(booking);
        Ok(())
    }

    /// All cells of one day, slot order.
    pub fn day(&self, day: Weekday) -> &[Cell] {
        let start = day.index() * self.slots_per_day;
        self.cells
            .get(start..start + self.slots_per_day)
            .unwrap_or_default()
    }

    /// Iterates over every cell with its coordinates.
    pub fn iter(&self) -> impl Iterator<Item = (Weekday, usize, &Cell)> + '_ {
        Weekday::ALL.into_iter().flat_map(move |day| {
            self.day(day)
                .iter()
                .enumerate()
                .map(move |(slot, cell)| (day, slot, cell))
        })
    }

    /// Whether a subject already has a session on `day`.
    pub fn has_subject_on(&self, day: Weekday, subject_index: usize) -> bool {
        self.day(day)
            .iter()
            .any(|c| c.subject_index() == Some(subject_index))
    }

    /// Number of sessions of a subject across the week.
    pub fn sessions_of(&self, subject_index: usize) -> usize {
        self.cells
            .iter()
            .filter(|c| c.subject_index() == Some(subject_index))
            .count()
    }

    /// Number of booked cells.
    pub fn occupied_count(&self) -> usize {
        self.cells.iter().filter(|c| !c.is_free()).count()
    }

    /// Number of free cells, lunch cells included.
    pub fn free_count(&self) -> usize {
        self.cells.len() - self.occupied_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_timetable_is_free() {
        let tt = Timetable::new(4);
        assert_eq!(tt.slots_per_day(), 4);
        assert_eq!(tt.free_count(), 20);
        assert_eq!(tt.occupied_count(), 0);
        assert!(tt.iter().all(|(_, _, c)| c.is_free()));
    }

    #[test]
    fn test_occupy_and_read_back() {
        let mut tt = Timetable::new(4);
        tt.occupy(Weekday::Tuesday, 2, Booking::regular(1, "Smith", "Room 3"))
            .unwrap();

        let cell = tt.cell(Weekday::Tuesday, 2).unwrap();
        assert_eq!(cell.subject_index(), Some(1));
        assert_eq!(cell.teacher(), Some("Smith"));
        assert_eq!(cell.room(), Some("Room 3"));
        assert!(!cell.is_lab());
        assert!(tt.is_free(Weekday::Monday, 2));
        assert!(!tt.is_free(Weekday::Tuesday, 2));
    }

    #[test]
    fn test_occupy_rejects_double_booking() {
        let mut tt = Timetable::new(4);
        tt.occupy(Weekday::Monday, 0, Booking::lab(0, "Ray", "Chem Lab"))
            .unwrap();
        let err = tt
            .occupy(Weekday::Monday, 0, Booking::regular(0, "Smith", "Room 1"))
            .unwrap_err();
        assert_eq!(
            err,
            GridError::AlreadyOccupied {
                day: Weekday::Monday,
                slot: 0
            }
        );
        // Original booking intact
        assert!(tt.cell(Weekday::Monday, 0).unwrap().is_lab());
    }

    #[test]
    fn test_out_of_bounds_access() {
        let mut tt = Timetable::new(3);
        assert!(tt.cell(Weekday::Friday, 3).is_none());
        assert!(!tt.is_free(Weekday::Friday, 3));
        assert!(matches!(
            tt.occupy(Weekday::Friday, 3, Booking::regular(0, "T", "R")),
            Err(GridError::OutOfBounds { slot: 3, .. })
        ));
    }

    #[test]
    fn test_stored_timetable_round_trip() {
        let mut tt = Timetable::new(3);
        tt.occupy(Weekday::Wednesday, 2, Booking::regular(1, "Rao", "Room 4"))
            .unwrap();
        let json = serde_json::to_string(&tt).unwrap();
        let back: Timetable = serde_json::from_str(&json).unwrap();
        assert_eq!(back, tt);
    }

    #[test]
    fn test_stored_timetable_cell_count_checked() {
        let err = serde_json::from_str::<Timetable>(r#"{"slots_per_day":4,"cells":[]}"#)
            .unwrap_err();
        assert!(err.to_string().contains("needs 20 cells, found 0"));

        let short = serde_json::json!({
            "slots_per_day": 1,
            "cells": [{ "state": "free" }, { "state": "free" }],
        });
        assert!(serde_json::from_value::<Timetable>(short).is_err());
    }

    #[test]
    fn test_subject_queries() {
        let mut tt = Timetable::new(4);
        tt.occupy(Weekday::Monday, 0, Booking::regular(2, "T", "Room 1"))
            .unwrap();
        tt.occupy(Weekday::Thursday, 3, Booking::regular(2, "T", "Room 2"))
            .unwrap();
        tt.occupy(Weekday::Thursday, 1, Booking::lab(0, "I", "Lab"))
            .unwrap();

        assert!(tt.has_subject_on(Weekday::Monday, 2));
        assert!(!tt.has_subject_on(Weekday::Tuesday, 2));
        assert_eq!(tt.sessions_of(2), 2);
        assert_eq!(tt.sessions_of(0), 0);
        assert_eq!(tt.occupied_count(), 3);
        assert_eq!(tt.cell(Weekday::Thursday, 1).unwrap().lab_index(), Some(0));
    }

    #[test]
    fn test_iter_order() {
        let tt = Timetable::new(2);
        let coords: Vec<_> = tt.iter().map(|(d, s, _)| (d, s)).take(3).collect();
        assert_eq!(
            coords,
            vec![
                (Weekday::Monday, 0),
                (Weekday::Monday, 1),
                (Weekday::Tuesday, 0)
            ]
        );
    }

    #[test]
    fn test_cell_serde_shape() {
        let free = serde_json::to_value(Cell::Free).unwrap();
        assert_eq!(free, serde_json::json!({ "state": "free" }));

        let booked = serde_json::to_value(Cell::Occupied(Booking::lab(1, "Ray", "Chem"))).unwrap();
        assert_eq!(booked["state"], "occupied");
        assert_eq!(booked["session"]["kind"], "lab");
        assert_eq!(booked["session"]["index"], 1);
        assert_eq!(booked["teacher"], "Ray");
    }
}
