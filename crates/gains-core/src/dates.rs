//! Date handling for brokerage activity data.
//!
//! The upstream service exchanges calendar dates as `mm/dd/yyyy` strings.
//! Parsing is strict: a malformed date is `None`, never a guess.

use chrono::{Datelike, NaiveDate};

/// Parse a strict `mm/dd/yyyy` date string.
///
/// Exactly three `/`-separated fields, each made of ASCII digits only and
/// non-zero, forming a real calendar date with a four-digit-or-fewer year.
/// Anything else yields `None`.
pub fn parse_mdy(value: &str) -> Option<NaiveDate> {
    let mut fields = value.split('/');
    let month = parse_field(fields.next()?)?;
    let day = parse_field(fields.next()?)?;
    let year = parse_field(fields.next()?)?;
    if fields.next().is_some() {
        return None;
    }
    if year > 9999 {
        return None;
    }
    NaiveDate::from_ymd_opt(year as i32, month, day)
}

fn parse_field(field: &str) -> Option<u32> {
    if field.is_empty() || !field.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    match field.parse::<u32>() {
        Ok(0) => None,
        Ok(n) => Some(n),
        Err(_) => None,
    }
}

/// Format a date back into the zero-padded `mm/dd/yyyy` wire form.
pub fn format_mdy(date: NaiveDate) -> String {
    date.format("%m/%d/%Y").to_string()
}

/// The date one calendar year after `date`, month and day preserved.
///
/// Rollover rule: Feb 29 in a non-leap target year rolls forward to Mar 1.
pub fn first_anniversary(date: NaiveDate) -> Option<NaiveDate> {
    let year = date.year() + 1;
    date.with_year(year)
        .or_else(|| NaiveDate::from_ymd_opt(year, 3, 1))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_parse_valid_dates() {
        assert_eq!(parse_mdy("01/02/2023"), Some(date(2023, 1, 2)));
        assert_eq!(parse_mdy("12/31/1999"), Some(date(1999, 12, 31)));
        // Unpadded fields are still numeric
        assert_eq!(parse_mdy("1/2/2023"), Some(date(2023, 1, 2)));
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert_eq!(parse_mdy(""), None);
        assert_eq!(parse_mdy("01-02-2023"), None);
        assert_eq!(parse_mdy("01/02"), None);
        assert_eq!(parse_mdy("01/02/2023/4"), None);
        assert_eq!(parse_mdy("1a/02/2023"), None);
        assert_eq!(parse_mdy("01/02/20x3"), None);
        assert_eq!(parse_mdy(" 01/02/2023"), None);
        assert_eq!(parse_mdy("+1/02/2023"), None);
    }

    #[test]
    fn test_parse_rejects_zero_fields() {
        assert_eq!(parse_mdy("00/02/2023"), None);
        assert_eq!(parse_mdy("01/00/2023"), None);
        assert_eq!(parse_mdy("01/02/0000"), None);
    }

    #[test]
    fn test_parse_rejects_impossible_dates() {
        assert_eq!(parse_mdy("02/30/2023"), None);
        assert_eq!(parse_mdy("13/01/2023"), None);
        assert_eq!(parse_mdy("02/29/2023"), None); // not a leap year
        assert_eq!(parse_mdy("02/29/2024"), Some(date(2024, 2, 29)));
    }

    #[test]
    fn test_format_round_trip() {
        let d = date(2023, 7, 4);
        assert_eq!(format_mdy(d), "07/04/2023");
        assert_eq!(parse_mdy(&format_mdy(d)), Some(d));
    }

    #[test]
    fn test_first_anniversary() {
        assert_eq!(first_anniversary(date(2023, 1, 15)), Some(date(2024, 1, 15)));
        assert_eq!(first_anniversary(date(2023, 2, 28)), Some(date(2024, 2, 28)));
        // Feb 29 rolls forward to Mar 1 in the non-leap target year
        assert_eq!(first_anniversary(date(2024, 2, 29)), Some(date(2025, 3, 1)));
    }
}
