//! Slot availability engine.
//!
//! Given the resource capacity of one sport at one facility and the bookings
//! already recorded for one date, this module computes per-hour occupancy,
//! decides whether a proposed booking can be admitted and reports which
//! candidate slots are still bookable.
//!
//! Everything here is a pure function of its inputs. Callers fetch the
//! bookings, run the engine and persist the outcome; nothing is cached
//! between requests.
//!
//! Two views of occupancy exist on purpose:
//!
//! - [`Availability`] counts every non-cancelled booking and is what
//!   admission uses. Elapsed bookings still hold their hours.
//! - [`reported_occupancy`] hides bookings that have fully elapsed when the
//!   queried date is today. It is for display only.

use std::collections::BTreeMap;
use std::ops::Range;

use chrono::{NaiveDate, NaiveDateTime, Timelike};

use crate::booking::BookingStatus;
use crate::error::CoreError;
use crate::operating::OperatingWindow;
use crate::timeslot::LAST_START_HOUR;
use crate::types::Hour;

/// Longest booking, in hours.
pub const MAX_DURATION_HOURS: u8 = 5;

// ---------------------------------------------------------------------------
// Slots
// ---------------------------------------------------------------------------

/// A contiguous whole-hour window: `[start_hour, start_hour + duration_hours)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slot {
    start_hour: Hour,
    duration_hours: u8,
}

impl Slot {
    pub fn new(start_hour: Hour, duration_hours: u8) -> Result<Self, CoreError> {
        if start_hour > LAST_START_HOUR {
            return Err(CoreError::Validation(format!(
                "Start hour {start_hour} is out of range (0-{LAST_START_HOUR})"
            )));
        }
        if !(1..=MAX_DURATION_HOURS).contains(&duration_hours) {
            return Err(CoreError::Validation(format!(
                "Duration must be between 1 and {MAX_DURATION_HOURS} hours, got {duration_hours}"
            )));
        }
        Ok(Self {
            start_hour,
            duration_hours,
        })
    }

    pub fn start_hour(&self) -> Hour {
        self.start_hour
    }

    pub fn duration_hours(&self) -> u8 {
        self.duration_hours
    }

    /// Exclusive end hour. Not wrapped past midnight.
    pub fn end_hour(&self) -> u32 {
        u32::from(self.start_hour) + u32::from(self.duration_hours)
    }

    /// The hours this slot occupies.
    pub fn hours(&self) -> Range<u32> {
        u32::from(self.start_hour)..self.end_hour()
    }

    /// Hour-granular overlap: true iff the two hour sets intersect.
    pub fn overlaps(&self, other: &Slot) -> bool {
        u32::from(self.start_hour) < other.end_hour() && u32::from(other.start_hour) < self.end_hour()
    }
}

/// An existing booking as seen by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reservation {
    pub slot: Slot,
    pub resource_count: u32,
    pub status: BookingStatus,
}

impl Reservation {
    /// Whether this reservation currently holds capacity.
    pub fn is_active(&self) -> bool {
        self.status.holds_capacity()
    }
}

/// A booking being considered for admission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Proposal {
    pub slot: Slot,
    pub resource_count: u32,
}

impl Proposal {
    pub fn new(slot: Slot, resource_count: u32) -> Result<Self, CoreError> {
        if resource_count == 0 {
            return Err(CoreError::Validation(
                "At least one resource must be requested".into(),
            ));
        }
        Ok(Self {
            slot,
            resource_count,
        })
    }
}

// ---------------------------------------------------------------------------
// Occupied-hour map
// ---------------------------------------------------------------------------

/// Sum of reserved resource units per hour. Hours with no bookings are absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OccupancyMap {
    booked: BTreeMap<u32, u32>,
}

impl OccupancyMap {
    /// Build the map from every active (non-cancelled) reservation.
    pub fn build<'a, I>(reservations: I) -> Self
    where
        I: IntoIterator<Item = &'a Reservation>,
    {
        let mut map = Self::default();
        for reservation in reservations.into_iter().filter(|r| r.is_active()) {
            map.add(&reservation.slot, reservation.resource_count);
        }
        map
    }

    fn add(&mut self, slot: &Slot, resource_count: u32) {
        for hour in slot.hours() {
            *self.booked.entry(hour).or_insert(0) += resource_count;
        }
    }

    /// Units reserved at `hour`.
    pub fn booked_at(&self, hour: u32) -> u32 {
        self.booked.get(&hour).copied().unwrap_or(0)
    }

    /// Highest occupancy of any hour within `slot`.
    pub fn peak_within(&self, slot: &Slot) -> u32 {
        self.booked
            .range(slot.hours())
            .map(|(_, &units)| units)
            .max()
            .unwrap_or(0)
    }

    /// `(hour, booked_units)` pairs in ascending hour order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        self.booked.iter().map(|(&hour, &units)| (hour, units))
    }

    pub fn is_empty(&self) -> bool {
        self.booked.is_empty()
    }
}

/// Occupancy for display. When `date` is the reference date, reservations
/// whose window ended at or before the current hour are dropped; ongoing
/// ones stay.
pub fn reported_occupancy<'a, I>(reservations: I, date: NaiveDate, now: NaiveDateTime) -> OccupancyMap
where
    I: IntoIterator<Item = &'a Reservation>,
{
    let is_today = date == now.date();
    let current_hour = now.hour();
    OccupancyMap::build(
        reservations
            .into_iter()
            .filter(|r| !is_today || r.slot.end_hour() > current_hour),
    )
}

/// Earliest start hour a new booking may be offered on `date`.
///
/// `None` for dates already in the past. For today, the next whole hour
/// (the current hour itself when it is exactly on the hour).
pub fn first_offerable_hour(date: NaiveDate, now: NaiveDateTime) -> Option<u32> {
    let today = now.date();
    if date < today {
        return None;
    }
    if date > today {
        return Some(0);
    }
    let next = if now.minute() > 0 || now.second() > 0 {
        now.hour() + 1
    } else {
        now.hour()
    };
    Some(next)
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// Availability of one sport at one facility on one date.
#[derive(Debug, Clone)]
pub struct Availability {
    capacity: u32,
    occupancy: OccupancyMap,
}

/// One candidate slot in a [`Availability::slot_report`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotAvailability {
    pub slot: Slot,
    /// Minimum free units across the slot's hours.
    pub available: u32,
    /// `available >= requested`.
    pub bookable: bool,
}

impl Availability {
    pub fn new<'a, I>(capacity: u32, reservations: I) -> Self
    where
        I: IntoIterator<Item = &'a Reservation>,
    {
        Self {
            capacity,
            occupancy: OccupancyMap::build(reservations),
        }
    }

    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    pub fn occupancy(&self) -> &OccupancyMap {
        &self.occupancy
    }

    /// Free units for the whole of `slot`: capacity minus the busiest hour.
    pub fn available_for(&self, slot: &Slot) -> u32 {
        self.capacity
            .saturating_sub(self.occupancy.peak_within(slot))
    }

    /// Admit or reject `proposal`.
    ///
    /// Returns the units that remain free across the window after admission.
    pub fn admit(&self, proposal: &Proposal) -> Result<u32, CoreError> {
        let available = self.available_for(&proposal.slot);
        if proposal.resource_count > available {
            return Err(CoreError::InsufficientCapacity {
                available,
                requested: proposal.resource_count,
            });
        }
        Ok(available - proposal.resource_count)
    }

    /// Per-slot report for the candidate grid.
    ///
    /// Candidates are every start within `window` whose `duration` fits
    /// before closing and that is not earlier than `first_offerable_hour`.
    /// Closed days and past dates produce an empty report.
    pub fn slot_report(
        &self,
        window: &OperatingWindow,
        date: NaiveDate,
        now: NaiveDateTime,
        duration: u8,
        requested: u32,
    ) -> Result<Vec<SlotAvailability>, CoreError> {
        // Validates the duration even when the report ends up empty.
        Slot::new(window.opening_hour().min(LAST_START_HOUR), duration)?;

        if !window.days().is_open_on(date) {
            return Ok(Vec::new());
        }
        let Some(earliest) = first_offerable_hour(date, now) else {
            return Ok(Vec::new());
        };

        window
            .candidate_starts(duration)
            .filter(|&start| u32::from(start) >= earliest)
            .map(|start| {
                let slot = Slot::new(start, duration)?;
                let available = self.available_for(&slot);
                Ok(SlotAvailability {
                    slot,
                    available,
                    bookable: available >= requested,
                })
            })
            .collect()
    }
}
