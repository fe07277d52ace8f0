use chrono::{NaiveDate, NaiveTime, TimeDelta, Timelike};
use serde::Serialize;
use utoipa::ToSchema;

use crate::model::daytype::DayType;

/// One day's record for one user. `(user_id, entry_date)` is unique.
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow, ToSchema)]
pub struct TrackingEntry {
    #[schema(example = 42)]
    pub id: u64,

    #[schema(example = 7)]
    pub user_id: u64,

    #[schema(example = "2012-01-02", value_type = String, format = "date")]
    pub entry_date: NaiveDate,

    #[schema(example = "09:00:00", value_type = String)]
    pub start_time: NaiveTime,

    #[schema(example = "17:00:00", value_type = String)]
    pub end_time: NaiveTime,

    #[schema(example = "00:15:00", value_type = String)]
    pub breaks: NaiveTime,

    #[sqlx(try_from = "String")]
    pub daytype: DayType,
}

/// Field names, in CSV column order.
pub const HEADINGS: [&str; 7] = [
    "id",
    "user_id",
    "entry_date",
    "start_time",
    "end_time",
    "breaks",
    "daytype",
];

/// Duration represented by a time-of-day value used as a length (break, shift).
pub fn as_duration(length: NaiveTime) -> TimeDelta {
    TimeDelta::seconds(i64::from(length.num_seconds_from_midnight()))
}

impl TrackingEntry {
    /// end - start - breaks
    pub fn worked_duration(&self) -> TimeDelta {
        (self.end_time - self.start_time) - as_duration(self.breaks)
    }

    /// Worked time minus the standard shift; positive, negative or zero.
    pub fn time_difference(&self, shiftlength: NaiveTime) -> TimeDelta {
        self.worked_duration() - as_duration(shiftlength)
    }

    pub fn is_overtime(&self, shiftlength: NaiveTime) -> bool {
        self.time_difference(shiftlength) > TimeDelta::zero()
    }

    pub fn headings() -> [&'static str; 7] {
        HEADINGS
    }

    pub fn display_as_csv(&self) -> [String; 7] {
        [
            self.id.to_string(),
            self.user_id.to_string(),
            self.entry_date.format("%Y-%m-%d").to_string(),
            self.start_time.format("%H:%M").to_string(),
            self.end_time.format("%H:%M").to_string(),
            self.breaks.format("%H:%M").to_string(),
            self.daytype.to_string(),
        ]
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub fn hm(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    pub fn entry(user_id: u64, date: &str, daytype: DayType) -> TrackingEntry {
        TrackingEntry {
            id: 0,
            user_id,
            entry_date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            start_time: hm(0, 0),
            end_time: hm(0, 0),
            breaks: hm(0, 0),
            daytype,
        }
    }

    pub fn workday(date: &str, start: NaiveTime, end: NaiveTime) -> TrackingEntry {
        TrackingEntry {
            start_time: start,
            end_time: end,
            breaks: hm(0, 15),
            ..entry(1, date, DayType::Wkday)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::{hm, workday};
    use super::*;

    fn shift() -> NaiveTime {
        hm(7, 45)
    }

    #[test]
    fn full_shift_is_not_overtime() {
        let e = workday("2012-01-01", hm(9, 0), hm(17, 0));
        assert_eq!(e.worked_duration(), TimeDelta::minutes(7 * 60 + 45));
        assert_eq!(e.time_difference(shift()), TimeDelta::zero());
        assert!(!e.is_overtime(shift()));
    }

    #[test]
    fn short_days_are_not_overtime() {
        for end in [hm(14, 0), hm(16, 46), hm(16, 45)] {
            let e = workday("2012-01-02", hm(9, 0), end);
            assert!(!e.is_overtime(shift()), "ending {end}");
            assert!(e.time_difference(shift()) < TimeDelta::zero());
        }
    }

    #[test]
    fn long_days_are_overtime() {
        for end in [hm(18, 1), hm(19, 0)] {
            let e = workday("2012-01-06", hm(9, 0), end);
            assert!(e.is_overtime(shift()), "ending {end}");
        }
        let e = workday("2012-01-09", hm(9, 0), hm(18, 1));
        assert_eq!(e.time_difference(shift()), TimeDelta::minutes(61));
    }

    #[test]
    fn csv_row_lines_up_with_headings() {
        let mut e = workday("2012-01-03", hm(9, 0), hm(17, 30));
        e.id = 5;
        let row = e.display_as_csv();
        assert_eq!(row.len(), TrackingEntry::headings().len());
        assert_eq!(
            row,
            ["5", "1", "2012-01-03", "09:00", "17:30", "00:15", "WKDAY"].map(String::from)
        );
    }
}
