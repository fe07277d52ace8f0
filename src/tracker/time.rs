//! Small helpers for the clock strings posted by the calendar forms.

use chrono::{NaiveDate, NaiveTime};

use crate::error::AppError;

/// Splits `"HH:MM"` (or `"HH:MM:SS"`) into hour and minute.
pub fn parse_time(value: &str) -> Result<(u32, u32), AppError> {
    let mut parts = value.trim().split(':');
    let hour = parts.next().and_then(|h| h.parse::<u32>().ok());
    let minute = parts.next().and_then(|m| m.parse::<u32>().ok());
    let second = parts.next().map(|s| s.parse::<u32>().ok());

    match (hour, minute, second, parts.next()) {
        (Some(h), Some(m), None | Some(Some(0..=59)), None) if h < 24 && m < 60 => Ok((h, m)),
        _ => Err(AppError::validation("Date Error")),
    }
}

/// Parses a clock string into a `NaiveTime`; seconds are dropped.
pub fn parse_clock(value: &str) -> Result<NaiveTime, AppError> {
    let (h, m) = parse_time(value)?;
    NaiveTime::from_hms_opt(h, m, 0).ok_or_else(|| AppError::validation("Date Error"))
}

pub fn parse_date(value: &str) -> Result<NaiveDate, AppError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|_| AppError::validation("Date Error"))
}

/// True iff `start` strictly precedes `end`.
pub fn validate_time(start: &str, end: &str) -> Result<bool, AppError> {
    Ok(parse_clock(start)? < parse_clock(end)?)
}

pub fn pad(value: &str, padchr: char, amount: usize) -> String {
    let len = value.chars().count();
    if len >= amount {
        return value.to_string();
    }
    let mut out: String = std::iter::repeat(padchr).take(amount - len).collect();
    out.push_str(value);
    out
}

/// Decimal hours to `"HH:MM"`.
pub fn float_to_time(hours: f64) -> String {
    let total_minutes = (hours * 60.0).round() as i64;
    let sign = if total_minutes < 0 { "-" } else { "" };
    let total_minutes = total_minutes.abs();
    format!("{sign}{:02}:{:02}", total_minutes / 60, total_minutes % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_time_requires_strict_order() {
        assert!(validate_time("00:00", "00:01").unwrap());
        assert!(validate_time("00:00", "23:00").unwrap());
        assert!(!validate_time("00:00", "00:00").unwrap());
        assert!(!validate_time("23:00", "00:00").unwrap());
        assert!(!validate_time("00:01", "00:00").unwrap());
    }

    #[test]
    fn validate_time_agrees_with_ordering_for_every_minute_pair() {
        let times: Vec<String> = (0..24)
            .step_by(5)
            .flat_map(|h| (0..60).step_by(17).map(move |m| format!("{h:02}:{m:02}")))
            .collect();
        for s in &times {
            for e in &times {
                let expected = parse_time(s).unwrap() < parse_time(e).unwrap();
                assert_eq!(validate_time(s, e).unwrap(), expected, "{s} -> {e}");
            }
        }
    }

    #[test]
    fn malformed_times_are_date_errors() {
        for bad in ["", "9", "24:00", "12:60", "aa:bb", "12:00:00:00", "12:00:75"] {
            let err = parse_time(bad).unwrap_err();
            assert_eq!(err.to_string(), "Date Error", "{bad:?}");
        }
        assert!(validate_time("09:00", "nope").is_err());
    }

    #[test]
    fn parse_time_values() {
        assert_eq!(parse_time("00:01").unwrap(), (0, 1));
        assert_eq!(parse_time("23:57").unwrap(), (23, 57));
        assert_eq!(parse_time("12:12").unwrap(), (12, 12));
        assert_eq!(parse_time("00:15:00").unwrap(), (0, 15));
    }

    #[test]
    fn parse_date_values() {
        assert_eq!(
            parse_date("2012-01-03").unwrap(),
            NaiveDate::from_ymd_opt(2012, 1, 3).unwrap()
        );
        assert!(parse_date("2012-13-03").is_err());
        assert!(parse_date("03/01/2012").is_err());
    }

    #[test]
    fn padding() {
        assert_eq!(pad("teststring", '0', 2), "teststring");
        assert_eq!(pad("t", '0', 2), "0t");
        assert_eq!(pad("teststring", '0', 20), "0000000000teststring");
        assert_eq!(pad("teststring", '1', 20), "1111111111teststring");
        assert_eq!(pad("t", '1', 2), "1t");
    }

    #[test]
    fn float_hours_to_clock() {
        assert_eq!(float_to_time(0.1), "00:06");
        assert_eq!(float_to_time(0.2), "00:12");
        assert_eq!(float_to_time(0.5), "00:30");
        assert_eq!(float_to_time(1.0), "01:00");
        assert_eq!(float_to_time(5.0), "05:00");
        assert_eq!(float_to_time(-0.25), "-00:15");
    }
}
