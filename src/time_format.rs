// SPDX-License-Identifier: GPL-3.0-only

//! Timestamp rendering for the overlay and for export file names
//!
//! Both functions are pure in the instant they are given; the `*_now`
//! helpers sample the local clock.

use chrono::{DateTime, Datelike, Local, Offset, TimeZone, Timelike};

/// Render `Weekday, DD/MM/YYYY hh:mm AM|PM GMT ±HH:MM`
///
/// The offset is taken from the instant's own time zone.
pub fn format_display_time<Tz: TimeZone>(instant: &DateTime<Tz>) -> String {
    let weekday = match instant.weekday() {
        chrono::Weekday::Mon => "Monday",
        chrono::Weekday::Tue => "Tuesday",
        chrono::Weekday::Wed => "Wednesday",
        chrono::Weekday::Thu => "Thursday",
        chrono::Weekday::Fri => "Friday",
        chrono::Weekday::Sat => "Saturday",
        chrono::Weekday::Sun => "Sunday",
    };

    let (is_pm, hour12) = instant.hour12();
    let meridiem = if is_pm { "PM" } else { "AM" };

    let offset_minutes = instant.offset().fix().local_minus_utc() / 60;
    let sign = if offset_minutes >= 0 { '+' } else { '-' };
    let offset_minutes = offset_minutes.abs();

    format!(
        "{}, {:02}/{:02}/{} {:02}:{:02} {} GMT {}{:02}:{:02}",
        weekday,
        instant.day(),
        instant.month(),
        instant.year(),
        hour12,
        instant.minute(),
        meridiem,
        sign,
        offset_minutes / 60,
        offset_minutes % 60
    )
}

/// Render the sortable `YYYYMMDD_HHMMSS` token used in export file names
pub fn format_file_token<Tz: TimeZone>(instant: &DateTime<Tz>) -> String {
    format!(
        "{:04}{:02}{:02}_{:02}{:02}{:02}",
        instant.year(),
        instant.month(),
        instant.day(),
        instant.hour(),
        instant.minute(),
        instant.second()
    )
}

/// Display time for the current local instant
pub fn display_time_now() -> String {
    format_display_time(&Local::now())
}

/// File token for the current local instant
pub fn file_token_now() -> String {
    format_file_token(&Local::now())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;

    fn at(offset_secs: i32, y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> DateTime<FixedOffset> {
        FixedOffset::east_opt(offset_secs)
            .unwrap()
            .with_ymd_and_hms(y, mo, d, h, mi, s)
            .unwrap()
    }

    #[test]
    fn test_display_time_afternoon_positive_offset() {
        let t = at(7 * 3600, 2025, 1, 5, 15, 4, 9);
        assert_eq!(
            format_display_time(&t),
            "Sunday, 05/01/2025 03:04 PM GMT +07:00"
        );
    }

    #[test]
    fn test_display_time_midnight_is_twelve_am() {
        let t = at(0, 2024, 2, 29, 0, 0, 0);
        assert_eq!(
            format_display_time(&t),
            "Thursday, 29/02/2024 12:00 AM GMT +00:00"
        );
    }

    #[test]
    fn test_display_time_negative_half_hour_offset() {
        let t = at(-(3 * 3600 + 30 * 60), 2023, 11, 20, 12, 30, 0);
        assert_eq!(
            format_display_time(&t),
            "Monday, 20/11/2023 12:30 PM GMT -03:30"
        );
    }

    #[test]
    fn test_file_token_zero_padded() {
        let t = at(3600, 2025, 3, 7, 8, 5, 2);
        assert_eq!(format_file_token(&t), "20250307_080502");
    }

    #[test]
    fn test_file_token_now_shape() {
        let token = file_token_now();
        assert_eq!(token.len(), crate::constants::FILE_TOKEN_LEN);
        assert_eq!(token.as_bytes()[8], b'_');
        assert!(
            token
                .chars()
                .enumerate()
                .all(|(i, c)| i == 8 || c.is_ascii_digit())
        );
    }
}
