//! Domain types and rules for the sportsbook service.
//!
//! This crate has no internal dependencies so the availability engine and
//! booking rules can be shared by the repository layer, the HTTP layer and
//! any future tooling.

pub mod availability;
pub mod booking;
pub mod error;
pub mod operating;
pub mod roles;
pub mod timeslot;
pub mod types;
