//! Date shifting for deidentified records

use chrono::{Days, NaiveDate};

const DATE_FORMAT: &str = "%Y%m%d";

/// Subtract `days` from a `YYYYMMDD` date. Negative values move forward.
///
/// Returns `None` for anything that is not exactly eight digits forming a
/// valid calendar date, or when the result leaves chrono's range.
#[must_use]
pub fn shift_date(date: &str, days: i64) -> Option<String> {
    let date = date.trim();
    if date.len() != 8 || !date.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    let parsed = NaiveDate::parse_from_str(date, DATE_FORMAT).ok()?;
    let shifted = if days >= 0 {
        parsed.checked_sub_days(Days::new(days.unsigned_abs()))?
    } else {
        parsed.checked_add_days(Days::new(days.unsigned_abs()))?
    };
    Some(shifted.format(DATE_FORMAT).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leap_year_month_rollover() {
        assert_eq!(shift_date("20200301", 1).as_deref(), Some("20200229"));
        assert_eq!(shift_date("20190301", 1).as_deref(), Some("20190228"));
    }

    #[test]
    fn year_rollover_both_directions() {
        assert_eq!(shift_date("20210101", 1).as_deref(), Some("20201231"));
        assert_eq!(shift_date("20201231", -1).as_deref(), Some("20210101"));
        assert_eq!(shift_date("20200615", 0).as_deref(), Some("20200615"));
        assert_eq!(shift_date("20200101", 366).as_deref(), Some("20190101"));
    }

    #[test]
    fn malformed_dates_are_rejected() {
        assert_eq!(shift_date("", 1), None);
        assert_eq!(shift_date("2020-03-01", 1), None);
        assert_eq!(shift_date("20200230", 1), None);
        assert_eq!(shift_date("2020031", 1), None);
        assert_eq!(shift_date("+2020301", 1), None);
    }

    #[test]
    fn padding_is_tolerated() {
        assert_eq!(shift_date("20200301 ", 1).as_deref(), Some("20200229"));
    }
}
