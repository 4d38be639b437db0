//! Time-slot string parsing and formatting.
//!
//! Slots are hour-granular and are carried through the system as integer
//! hours. Two textual forms reach the API: the 24-hour `"14:00"` form and the
//! 12-hour `"2:00 PM"` form used by booking clients. Both parse to the same
//! [`Hour`]; formatting happens only when building responses.

use crate::error::CoreError;
use crate::types::Hour;

/// Last hour a slot may start in.
pub const LAST_START_HOUR: Hour = 23;

/// Upper bound for clock boundaries (closing at midnight is `24`).
pub const END_OF_DAY: Hour = 24;

/// Parse a slot start such as `"14:00"`, `"14"`, `"2:00 PM"` or `"12 AM"`.
///
/// Returns an hour in `0..=23`. Minutes other than `00` are rejected since
/// bookings are whole-hour only.
pub fn parse_hour(input: &str) -> Result<Hour, CoreError> {
    let hour = parse_clock(input, false)?;
    if hour > LAST_START_HOUR {
        return Err(invalid(input));
    }
    Ok(hour)
}

/// Parse an operating-window boundary. Same forms as [`parse_hour`], plus
/// `"24:00"` for a midnight close.
pub fn parse_clock_hour(input: &str) -> Result<Hour, CoreError> {
    parse_clock(input, true)
}

fn parse_clock(input: &str, allow_end_of_day: bool) -> Result<Hour, CoreError> {
    let trimmed = input.trim();
    let upper = trimmed.to_ascii_uppercase();

    let (clock, meridiem) = if let Some(rest) = upper.strip_suffix("AM") {
        (rest.trim_end(), Some(false))
    } else if let Some(rest) = upper.strip_suffix("PM") {
        (rest.trim_end(), Some(true))
    } else {
        (upper.as_str(), None)
    };

    let (hour_part, minute_part) = match clock.split_once(':') {
        Some((h, m)) => (h, Some(m)),
        None => (clock, None),
    };

    if let Some(minutes) = minute_part {
        if minutes != "00" {
            return Err(CoreError::Validation(format!(
                "Time slot '{input}' must start on the hour"
            )));
        }
    }

    if hour_part.is_empty() || !hour_part.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid(input));
    }
    let raw: u32 = hour_part.parse().map_err(|_| invalid(input))?;

    match meridiem {
        Some(is_pm) => {
            if !(1..=12).contains(&raw) {
                return Err(invalid(input));
            }
            let base = (raw % 12) as Hour;
            Ok(if is_pm { base + 12 } else { base })
        }
        None => {
            let max = if allow_end_of_day {
                END_OF_DAY
            } else {
                LAST_START_HOUR
            };
            if raw > u32::from(max) {
                return Err(invalid(input));
            }
            Ok(raw as Hour)
        }
    }
}

fn invalid(input: &str) -> CoreError {
    CoreError::Validation(format!("Invalid time slot '{input}'"))
}

/// Zero-padded 24-hour form, e.g. `"09:00"`.
pub fn format_24h(hour: Hour) -> String {
    format!("{hour:02}:00")
}

/// 12-hour form with meridiem, e.g. `"9:00 AM"`. Hour 24 renders as midnight.
pub fn format_12h(hour: Hour) -> String {
    let of_day = hour % 24;
    let display = match of_day % 12 {
        0 => 12,
        h => h,
    };
    let meridiem = if of_day < 12 { "AM" } else { "PM" };
    format!("{display}:00 {meridiem}")
}

/// Human label for a slot window, e.g. `"2:00 PM to 5:00 PM"`.
pub fn slot_label(start: Hour, duration: u8) -> String {
    format!(
        "{} to {}",
        format_12h(start),
        format_12h(start.saturating_add(duration))
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn both_clock_forms_reach_the_same_hour() {
        assert_eq!(parse_hour("14:00").unwrap(), 14);
        assert_eq!(parse_hour("2:00 PM").unwrap(), 14);
        assert_eq!(parse_hour("2:00pm").unwrap(), 14);
        assert_eq!(parse_hour("14").unwrap(), 14);
    }

    #[test]
    fn midnight_and_noon_in_twelve_hour_form() {
        assert_eq!(parse_hour("12:00 AM").unwrap(), 0);
        assert_eq!(parse_hour("12:00 PM").unwrap(), 12);
        assert_eq!(parse_hour("9 AM").unwrap(), 9);
    }

    #[test]
    fn rejects_partial_hours_and_garbage() {
        assert_matches!(parse_hour("14:30"), Err(CoreError::Validation(_)));
        assert_matches!(parse_hour("abc"), Err(CoreError::Validation(_)));
        assert_matches!(parse_hour(""), Err(CoreError::Validation(_)));
        assert_matches!(parse_hour("13:00 PM"), Err(CoreError::Validation(_)));
        assert_matches!(parse_hour("0:00 AM"), Err(CoreError::Validation(_)));
        assert_matches!(parse_hour("-1:00"), Err(CoreError::Validation(_)));
    }

    #[test]
    fn slot_start_cannot_be_end_of_day() {
        assert_matches!(parse_hour("24:00"), Err(CoreError::Validation(_)));
        assert_eq!(parse_clock_hour("24:00").unwrap(), 24);
        assert_matches!(parse_clock_hour("25:00"), Err(CoreError::Validation(_)));
    }

    #[test]
    fn formatting() {
        assert_eq!(format_24h(9), "09:00");
        assert_eq!(format_24h(21), "21:00");
        assert_eq!(format_12h(0), "12:00 AM");
        assert_eq!(format_12h(9), "9:00 AM");
        assert_eq!(format_12h(12), "12:00 PM");
        assert_eq!(format_12h(14), "2:00 PM");
        assert_eq!(format_12h(24), "12:00 AM");
        assert_eq!(slot_label(14, 3), "2:00 PM to 5:00 PM");
    }

    #[test]
    fn formatted_forms_parse_back() {
        for hour in 0..=LAST_START_HOUR {
            assert_eq!(parse_hour(&format_24h(hour)).unwrap(), hour);
            assert_eq!(parse_hour(&format_12h(hour)).unwrap(), hour);
        }
    }
}
