//! Tolerant calendar-date parsing.
//!
//! Source files mix ISO dates, slash dates with two- or four-digit years and
//! the occasional timestamp. Ambiguous numeric dates are read month-first;
//! day-first is the fallback when the first field cannot be a month.
//! Anything that does not resolve to a real calendar date yields `None`,
//! which the standardizer stores as the missing-date sentinel.

use chrono::{DateTime, NaiveDate, NaiveTime};

/// Separators allowed between the three date fields.
const DATE_SEPARATORS: [char; 3] = ['-', '/', '.'];

/// Time-of-day layouts accepted after the date; only the date is kept.
const TIME_FORMATS: [&str; 3] = ["%H:%M:%S%.f", "%H:%M:%S", "%H:%M"];

/// Two-digit years below this value are in the 2000s, others in the 1900s.
const TWO_DIGIT_YEAR_PIVOT: i32 = 69;

/// Parse a raw date value, returning `None` for empty or invalid text.
pub fn parse_tolerant_date(value: &str) -> Option<NaiveDate> {
    let trimmed = value.trim();
    if trimmed.is_empty() || !trimmed.starts_with(|c: char| c.is_ascii_digit()) {
        return None;
    }

    let (date_part, time_part) = match trimmed.find(['T', ' ']) {
        Some(idx) => (&trimmed[..idx], Some(trimmed[idx + 1..].trim())),
        None => (trimmed, None),
    };

    if let Some(time) = time_part
        && !TIME_FORMATS
            .iter()
            .any(|format| NaiveTime::parse_from_str(time, format).is_ok())
    {
        return DateTime::parse_from_rfc3339(trimmed)
            .ok()
            .map(|dt| dt.date_naive());
    }

    parse_date_fields(date_part)
}

/// Split `a<sep>b<sep>c` into three all-digit fields sharing one separator.
fn split_fields(text: &str) -> Option<[&str; 3]> {
    let separator = text.chars().find(|c| DATE_SEPARATORS.contains(c))?;
    let mut parts = text.split(separator);
    let fields = [parts.next()?, parts.next()?, parts.next()?];
    if parts.next().is_some()
        || fields
            .iter()
            .any(|f| f.is_empty() || !f.bytes().all(|b| b.is_ascii_digit()))
    {
        return None;
    }
    Some(fields)
}

fn parse_date_fields(text: &str) -> Option<NaiveDate> {
    let [first, second, third] = split_fields(text)?;

    if first.len() == 4 {
        if !(1..=2).contains(&second.len()) || !(1..=2).contains(&third.len()) {
            return None;
        }
        return NaiveDate::from_ymd_opt(
            first.parse().ok()?,
            second.parse().ok()?,
            third.parse().ok()?,
        );
    }

    if !(1..=2).contains(&first.len()) || !(1..=2).contains(&second.len()) {
        return None;
    }
    let year = match third.len() {
        4 => third.parse().ok()?,
        2 => expand_two_digit_year(third.parse().ok()?),
        _ => return None,
    };
    let a: u32 = first.parse().ok()?;
    let b: u32 = second.parse().ok()?;
    NaiveDate::from_ymd_opt(year, a, b).or_else(|| NaiveDate::from_ymd_opt(year, b, a))
}

fn expand_two_digit_year(year: i32) -> i32 {
    if year < TWO_DIGIT_YEAR_PIVOT {
        2000 + year
    } else {
        1900 + year
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(y, m, d)
    }

    #[test]
    fn parses_iso_and_slash_layouts() {
        assert_eq!(parse_tolerant_date("2023-12-25"), ymd(2023, 12, 25));
        assert_eq!(parse_tolerant_date("2023/12/25"), ymd(2023, 12, 25));
        assert_eq!(parse_tolerant_date(" 2023-12-25 "), ymd(2023, 12, 25));
        assert_eq!(parse_tolerant_date("2023-1-5"), ymd(2023, 1, 5));
    }

    #[test]
    fn reads_ambiguous_dates_month_first() {
        assert_eq!(parse_tolerant_date("05/03/2020"), ymd(2020, 5, 3));
        assert_eq!(parse_tolerant_date("05-03-2020"), ymd(2020, 5, 3));
        assert_eq!(parse_tolerant_date("05.03.2020"), ymd(2020, 5, 3));
    }

    #[test]
    fn falls_back_to_day_first_when_month_first_is_impossible() {
        assert_eq!(parse_tolerant_date("17/05/1990"), ymd(1990, 5, 17));
        assert_eq!(parse_tolerant_date("12/31/2020"), ymd(2020, 12, 31));
    }

    #[test]
    fn expands_two_digit_years() {
        assert_eq!(parse_tolerant_date("05/03/20"), ymd(2020, 5, 3));
        assert_eq!(parse_tolerant_date("17/05/90"), ymd(1990, 5, 17));
        assert_eq!(parse_tolerant_date("01/02/68"), ymd(2068, 1, 2));
        assert_eq!(parse_tolerant_date("01/02/69"), ymd(1969, 1, 2));
    }

    #[test]
    fn short_years_never_parse_year_first() {
        assert_eq!(parse_tolerant_date("20/05/03"), ymd(2003, 5, 20));
        assert_eq!(parse_tolerant_date("5-03-20"), ymd(2020, 5, 3));
        assert_eq!(parse_tolerant_date("020/05/03"), None);
        assert_eq!(parse_tolerant_date("05/03/2020/1"), None);
        assert_eq!(parse_tolerant_date("05/03-2020"), None);
    }

    #[test]
    fn keeps_date_part_of_timestamps() {
        assert_eq!(parse_tolerant_date("2021-07-04 13:45:00"), ymd(2021, 7, 4));
        assert_eq!(parse_tolerant_date("2021-07-04T13:45:00.250"), ymd(2021, 7, 4));
        assert_eq!(parse_tolerant_date("2021-07-04T13:45:00+02:00"), ymd(2021, 7, 4));
        assert_eq!(parse_tolerant_date("05/03/2020 10:00"), ymd(2020, 5, 3));
        assert_eq!(parse_tolerant_date("17/05/1990 08:30:15"), ymd(1990, 5, 17));
    }

    #[test]
    fn invalid_values_become_none() {
        assert_eq!(parse_tolerant_date("31/13/2020"), None);
        assert_eq!(parse_tolerant_date("2023-02-30"), None);
        assert_eq!(parse_tolerant_date("05/03/2020 25:00"), None);
        assert_eq!(parse_tolerant_date(""), None);
        assert_eq!(parse_tolerant_date("   "), None);
        assert_eq!(parse_tolerant_date("NaT"), None);
        assert_eq!(parse_tolerant_date("hier"), None);
    }
}
