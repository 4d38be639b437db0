//! Operating window of a sport offered at a facility.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use crate::availability::Slot;
use crate::error::CoreError;
use crate::timeslot::END_OF_DAY;
use crate::types::Hour;

/// Days of the week a sport can be booked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OperatingDays {
    #[serde(rename = "Mon-Fri")]
    Weekdays,
    #[serde(rename = "Sat-Sun")]
    Weekends,
    #[serde(rename = "All Days")]
    AllDays,
}

impl OperatingDays {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Weekdays => "Mon-Fri",
            Self::Weekends => "Sat-Sun",
            Self::AllDays => "All Days",
        }
    }

    pub fn is_open_on(self, date: NaiveDate) -> bool {
        let weekend = matches!(date.weekday(), Weekday::Sat | Weekday::Sun);
        match self {
            Self::Weekdays => !weekend,
            Self::Weekends => weekend,
            Self::AllDays => true,
        }
    }
}

impl fmt::Display for OperatingDays {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OperatingDays {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Mon-Fri" => Ok(Self::Weekdays),
            "Sat-Sun" => Ok(Self::Weekends),
            "All Days" => Ok(Self::AllDays),
            other => Err(CoreError::Validation(format!(
                "Unknown operating days '{other}' (expected Mon-Fri, Sat-Sun or All Days)"
            ))),
        }
    }
}

/// Opening hours for one sport at one facility. `closing_hour` is exclusive
/// and may be 24 for a midnight close.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperatingWindow {
    opening_hour: Hour,
    closing_hour: Hour,
    days: OperatingDays,
}

impl OperatingWindow {
    pub fn new(opening_hour: Hour, closing_hour: Hour, days: OperatingDays) -> Result<Self, CoreError> {
        if closing_hour > END_OF_DAY || opening_hour >= closing_hour {
            return Err(CoreError::Validation(format!(
                "Opening hour {opening_hour} must be before closing hour {closing_hour} (max {END_OF_DAY})"
            )));
        }
        Ok(Self {
            opening_hour,
            closing_hour,
            days,
        })
    }

    pub fn opening_hour(&self) -> Hour {
        self.opening_hour
    }

    pub fn closing_hour(&self) -> Hour {
        self.closing_hour
    }

    pub fn days(&self) -> OperatingDays {
        self.days
    }

    /// Whether the whole slot fits between opening and closing.
    pub fn contains(&self, slot: &Slot) -> bool {
        slot.start_hour() >= self.opening_hour && slot.end_hour() <= u32::from(self.closing_hour)
    }

    /// Every start hour whose `duration`-hour window ends by closing time.
    pub fn candidate_starts(&self, duration: u8) -> impl Iterator<Item = Hour> {
        let opening = u32::from(self.opening_hour);
        // Exclusive bound: the last start is `closing - duration`.
        let end = (u32::from(self.closing_hour) + 1).saturating_sub(u32::from(duration.max(1)));
        (opening..end).map(|h| h as Hour)
    }

    /// Validate that a booking for `slot` on `date` falls inside the window.
    pub fn check_slot(&self, date: NaiveDate, slot: &Slot) -> Result<(), CoreError> {
        if !self.days.is_open_on(date) {
            return Err(CoreError::Validation(format!(
                "Facility is open {} only; {date} is not bookable",
                self.days
            )));
        }
        if !self.contains(slot) {
            return Err(CoreError::Validation(format!(
                "Requested slot {:02}:00-{:02}:00 is outside operating hours {:02}:00-{:02}:00",
                slot.start_hour(),
                slot.end_hour(),
                self.opening_hour,
                self.closing_hour
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn nine_to_nine() -> OperatingWindow {
        OperatingWindow::new(9, 21, OperatingDays::AllDays).unwrap()
    }

    #[test]
    fn three_hour_candidates_stop_where_the_window_still_fits() {
        let starts: Vec<Hour> = nine_to_nine().candidate_starts(3).collect();
        assert_eq!(starts, (9..=18).collect::<Vec<_>>());
        assert!(!starts.contains(&19));
    }

    #[test]
    fn duration_longer_than_window_yields_nothing() {
        let window = OperatingWindow::new(10, 12, OperatingDays::AllDays).unwrap();
        assert_eq!(window.candidate_starts(3).count(), 0);
        assert_eq!(window.candidate_starts(2).collect::<Vec<_>>(), vec![10]);
    }

    #[test]
    fn midnight_close_allows_late_slot() {
        let window = OperatingWindow::new(18, 24, OperatingDays::AllDays).unwrap();
        assert_eq!(window.candidate_starts(1).last(), Some(23));
        assert!(window.contains(&Slot::new(22, 2).unwrap()));
    }

    #[test]
    fn rejects_inverted_window() {
        assert_matches!(
            OperatingWindow::new(21, 9, OperatingDays::AllDays),
            Err(CoreError::Validation(_))
        );
        assert_matches!(
            OperatingWindow::new(9, 25, OperatingDays::AllDays),
            Err(CoreError::Validation(_))
        );
    }

    #[test]
    fn slot_past_closing_is_rejected() {
        let date = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
        let window = nine_to_nine();
        assert!(window.check_slot(date, &Slot::new(18, 3).unwrap()).is_ok());
        assert_matches!(
            window.check_slot(date, &Slot::new(19, 3).unwrap()),
            Err(CoreError::Validation(_))
        );
        assert_matches!(
            window.check_slot(date, &Slot::new(8, 1).unwrap()),
            Err(CoreError::Validation(_))
        );
    }

    #[test]
    fn operating_days() {
        // 2026-10-17 is a Saturday, 2026-10-19 a Monday.
        let saturday = NaiveDate::from_ymd_opt(2026, 10, 17).unwrap();
        let monday = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
        assert!(OperatingDays::Weekends.is_open_on(saturday));
        assert!(!OperatingDays::Weekends.is_open_on(monday));
        assert!(OperatingDays::Weekdays.is_open_on(monday));
        assert!(!OperatingDays::Weekdays.is_open_on(saturday));
        assert!(OperatingDays::AllDays.is_open_on(saturday));
    }

    #[test]
    fn operating_days_text_round_trip() {
        assert_eq!("All Days".parse::<OperatingDays>().unwrap(), OperatingDays::AllDays);
        assert_eq!(OperatingDays::Weekdays.to_string(), "Mon-Fri");
        assert_matches!("Weekdays".parse::<OperatingDays>(), Err(CoreError::Validation(_)));
        let json = serde_json::to_string(&OperatingDays::Weekends).unwrap();
        assert_eq!(json, "\"Sat-Sun\"");
    }
}
