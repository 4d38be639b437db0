//! Booking lifecycle rules: status values, who may move a booking between
//! them, party-size limits and pricing.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::roles::{ROLE_ADMIN, ROLE_OWNER};

/// Lifecycle state of a booking. Stored as text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Cancelled,
}

impl BookingStatus {
    pub const ALL: [BookingStatus; 3] = [Self::Pending, Self::Confirmed, Self::Cancelled];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Confirmed => "Confirmed",
            Self::Cancelled => "Cancelled",
        }
    }

    /// Cancelled bookings release their resources; every other state holds them.
    pub fn holds_capacity(self) -> bool {
        !matches!(self, Self::Cancelled)
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BookingStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| {
                CoreError::Validation(format!(
                    "Unknown booking status '{s}' (expected Pending, Confirmed or Cancelled)"
                ))
            })
    }
}

/// Whether a user with `role` may set a booking to `target`.
///
/// Owners act on bookings at their own facilities and may only confirm or
/// cancel. Admins may set any status. Ownership itself is checked by the
/// caller.
pub fn can_set_status(role: &str, target: BookingStatus) -> bool {
    match role {
        ROLE_ADMIN => true,
        ROLE_OWNER => matches!(target, BookingStatus::Confirmed | BookingStatus::Cancelled),
        _ => false,
    }
}

/// Whether moving `from -> to` needs a fresh capacity check.
///
/// Only a booking leaving `Cancelled` re-claims resources.
pub fn transition_reclaims_capacity(from: BookingStatus, to: BookingStatus) -> bool {
    !from.holds_capacity() && to.holds_capacity()
}

/// Check the party size against the per-unit limit.
pub fn check_occupants(
    people: u32,
    resource_count: u32,
    max_people_per_unit: u32,
) -> Result<(), CoreError> {
    if people == 0 {
        return Err(CoreError::Validation(
            "At least one person is required".into(),
        ));
    }
    let limit = u64::from(resource_count) * u64::from(max_people_per_unit);
    if u64::from(people) > limit {
        return Err(CoreError::Validation(format!(
            "{people} people exceed the limit of {limit} for {resource_count} resource(s)"
        )));
    }
    Ok(())
}

/// `unit_price * resources * duration`, in the smallest currency unit.
pub fn total_price(unit_price: i64, resource_count: u32, duration_hours: u8) -> Result<i64, CoreError> {
    if unit_price < 0 {
        return Err(CoreError::Validation("Price cannot be negative".into()));
    }
    unit_price
        .checked_mul(i64::from(resource_count))
        .and_then(|p| p.checked_mul(i64::from(duration_hours)))
        .ok_or_else(|| CoreError::Validation("Booking total is too large".into()))
}
