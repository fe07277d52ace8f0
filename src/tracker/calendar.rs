//! Month grid for the calendar page.
//!
//! Weeks start on Monday and always hold seven cells; days outside the month
//! are blank placeholders. Every in-month day carries the user's entry for
//! that date when one exists.

use std::collections::HashMap;
use std::fmt::Write;

use chrono::{Datelike, NaiveDate, Timelike};
use serde::Serialize;
use utoipa::ToSchema;

use crate::error::AppError;
use crate::model::tracking_entry::{TrackingEntry, as_duration};
use crate::tracker::balance::Period;
use crate::tracker::time::pad;

pub const DAY_NAMES: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

pub const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

pub fn month_name(month: u32) -> Option<&'static str> {
    MONTH_NAMES.get(month.checked_sub(1)? as usize).copied()
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CalendarCell {
    Blank,
    Day {
        day: u32,
        #[schema(value_type = String, format = "date")]
        date: NaiveDate,
        selected: bool,
        entry: Option<TrackingEntry>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct MonthRef {
    pub year: i32,
    pub month: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct CalendarMonth {
    pub year: i32,
    pub month: u32,
    pub month_name: &'static str,
    pub previous: MonthRef,
    pub next: MonthRef,
    pub weeks: Vec<Vec<CalendarCell>>,
}

/// Builds the grid for `year`/`month`. `entries` may contain dates outside
/// the month; those are ignored.
pub fn build_month(
    year: i32,
    month: u32,
    day: Option<u32>,
    entries: &[TrackingEntry],
) -> Result<CalendarMonth, AppError> {
    let name = month_name(month).ok_or_else(|| AppError::validation("Invalid month"))?;
    let period = Period::month(year, month)?;
    let days_in_month = period.days();

    if let Some(d) = day {
        if d == 0 || d > days_in_month {
            return Err(AppError::validation("Invalid day"));
        }
    }

    let by_day: HashMap<u32, &TrackingEntry> = entries
        .iter()
        .filter(|e| period.contains(e.entry_date))
        .map(|e| (e.entry_date.day(), e))
        .collect();

    let leading = period.start.weekday().num_days_from_monday();
    let mut cells: Vec<CalendarCell> = Vec::with_capacity(42);
    cells.extend((0..leading).map(|_| CalendarCell::Blank));
    for d in 1..=days_in_month {
        let date = period.start + chrono::Days::new(u64::from(d - 1));
        cells.push(CalendarCell::Day {
            day: d,
            date,
            selected: day == Some(d),
            entry: by_day.get(&d).map(|e| (*e).clone()),
        });
    }
    while cells.len() % 7 != 0 {
        cells.push(CalendarCell::Blank);
    }

    let weeks = cells.chunks(7).map(<[CalendarCell]>::to_vec).collect();

    let invalid_year = || AppError::validation("Invalid year");
    let previous = if month == 1 {
        MonthRef { year: year.checked_sub(1).ok_or_else(invalid_year)?, month: 12 }
    } else {
        MonthRef { year, month: month - 1 }
    };
    let next = if month == 12 {
        MonthRef { year: year.checked_add(1).ok_or_else(invalid_year)?, month: 1 }
    } else {
        MonthRef { year, month: month + 1 }
    };

    Ok(CalendarMonth {
        year,
        month,
        month_name: name,
        previous,
        next,
        weeks,
    })
}

impl CalendarMonth {
    /// HTML table with click handlers for the entry forms. `link` gives the
    /// href of the previous/next month.
    pub fn to_html(&self, link: impl Fn(MonthRef) -> String) -> String {
        let mut html = String::with_capacity(4096);
        let previous = link(self.previous);
        let next = link(self.next);

        // writing to a String cannot fail
        let _ = write!(
            html,
            "<table id=\"calendar\" border=\"1\">\n\
             \t<tr>\n\
             \t\t<td class=\"table-header\" colspan=\"2\"><a class=\"table-links\" href=\"{previous}\">&lt;</a></td>\n\
             \t\t<td class=\"table-header\" colspan=\"3\">{name} {year}</td>\n\
             \t\t<td class=\"table-header\" colspan=\"2\"><a class=\"table-links\" href=\"{next}\">&gt;</a></td>\n\
             \t</tr>\n",
            name = self.month_name,
            year = self.year,
        );

        html.push_str("\t<tr>\n");
        for name in DAY_NAMES {
            let _ = writeln!(html, "\t\t<td class=\"day-names\">{name}</td>");
        }
        html.push_str("\t</tr>\n");

        for week in &self.weeks {
            html.push_str("\t<tr>\n");
            for cell in week {
                html.push_str("\t\t");
                render_cell(&mut html, cell);
                html.push('\n');
            }
            html.push_str("\t</tr>\n");
        }
        html.push_str("</table>");
        html
    }

    pub fn days(&self) -> impl Iterator<Item = &CalendarCell> {
        self.weeks
            .iter()
            .flatten()
            .filter(|c| matches!(c, CalendarCell::Day { .. }))
    }
}

fn render_cell(html: &mut String, cell: &CalendarCell) {
    match cell {
        CalendarCell::Blank => {
            html.push_str("<td onclick=\"hideEntries('')\" class=\"empty\">&nbsp;</td>");
        }
        CalendarCell::Day {
            day,
            date,
            selected,
            entry: None,
        } => {
            let iso = format!(
                "{}-{}-{}",
                date.year(),
                pad(&date.month().to_string(), '0', 2),
                pad(&day.to_string(), '0', 2)
            );
            let selected = if *selected { " selected" } else { "" };
            let _ = write!(
                html,
                "<td onclick=\"hideEntries('{iso}')\" class=\"day-class empty-day{selected}\">{day}</td>"
            );
        }
        CalendarCell::Day {
            day,
            selected,
            entry: Some(e),
            ..
        } => {
            let selected = if *selected { " selected" } else { "" };
            let break_minutes = as_duration(e.breaks).num_minutes();
            let _ = write!(
                html,
                "<td onclick=\"toggleChangeEntries({sh}, {sm}, '{start}', {eh}, {em}, '{end}', '{date}', '{daytype}', {id}, {break_minutes}, '{breaks}')\" class=\"day-class {daytype}{selected}\">{day}</td>",
                sh = e.start_time.hour(),
                sm = e.start_time.minute(),
                start = e.start_time.format("%H:%M"),
                eh = e.end_time.hour(),
                em = e.end_time.minute(),
                end = e.end_time.format("%H:%M"),
                date = e.entry_date.format("%Y-%m-%d"),
                daytype = e.daytype,
                id = e.id,
                breaks = e.breaks.format("%H:%M"),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::daytype::DayType;
    use crate::model::tracking_entry::fixtures::{entry, hm, workday};

    fn day_numbers(week: &[CalendarCell]) -> Vec<u32> {
        week.iter()
            .map(|c| match c {
                CalendarCell::Blank => 0,
                CalendarCell::Day { day, .. } => *day,
            })
            .collect()
    }

    #[test]
    fn january_2012_starts_on_sunday() {
        let cal = build_month(2012, 1, None, &[]).unwrap();
        assert_eq!(cal.weeks.len(), 6);
        assert_eq!(day_numbers(&cal.weeks[0]), vec![0, 0, 0, 0, 0, 0, 1]);
        assert_eq!(day_numbers(&cal.weeks[1]), vec![2, 3, 4, 5, 6, 7, 8]);
        assert_eq!(day_numbers(&cal.weeks[5]), vec![30, 31, 0, 0, 0, 0, 0]);
        assert_eq!(cal.month_name, "January");
    }

    #[test]
    fn every_week_is_complete() {
        for year in [2011, 2012, 2024] {
            for month in 1..=12 {
                let cal = build_month(year, month, None, &[]).unwrap();
                assert!(cal.weeks.iter().all(|w| w.len() == 7));
                let days = cal.days().count() as u32;
                assert_eq!(days, Period::month(year, month).unwrap().days());
            }
        }
    }

    #[test]
    fn february_2010_has_no_padding() {
        let cal = build_month(2010, 2, None, &[]).unwrap();
        assert_eq!(cal.weeks.len(), 4);
        assert!(cal.weeks.iter().flatten().all(|c| *c != CalendarCell::Blank));
    }

    #[test]
    fn invalid_input_is_rejected() {
        assert_eq!(
            build_month(2012, 13, None, &[]).unwrap_err().to_string(),
            "Invalid month"
        );
        assert!(build_month(2012, 0, None, &[]).is_err());
        assert!(build_month(2012, 2, Some(30), &[]).is_err());
        assert!(build_month(2012, 2, Some(0), &[]).is_err());
        assert!(build_month(2012, 2, Some(29), &[]).is_ok());
    }

    #[test]
    fn entries_annotate_their_day() {
        let entries = vec![
            workday("2012-01-02", hm(9, 0), hm(17, 0)),
            entry(1, "2012-01-03", DayType::Holis),
            // other month: ignored
            entry(1, "2012-02-03", DayType::Holis),
        ];
        let cal = build_month(2012, 1, Some(3), &entries).unwrap();
        let annotated: Vec<(u32, DayType, bool)> = cal
            .days()
            .filter_map(|c| match c {
                CalendarCell::Day {
                    day,
                    selected,
                    entry: Some(e),
                    ..
                } => Some((*day, e.daytype, *selected)),
                _ => None,
            })
            .collect();
        assert_eq!(
            annotated,
            vec![(2, DayType::Wkday, false), (3, DayType::Holis, true)]
        );
    }

    #[test]
    fn extreme_years_are_rejected() {
        for (year, month) in [(i32::MAX, 12), (i32::MAX, 1), (i32::MIN, 1), (i32::MIN, 12)] {
            let err = build_month(year, month, None, &[]).unwrap_err();
            assert_eq!(err.to_string(), "Invalid year", "{year}-{month}");
        }
    }

    #[test]
    fn navigation_wraps_years() {
        let jan = build_month(2012, 1, None, &[]).unwrap();
        assert_eq!(jan.previous, MonthRef { year: 2011, month: 12 });
        assert_eq!(jan.next, MonthRef { year: 2012, month: 2 });
        let dec = build_month(2012, 12, None, &[]).unwrap();
        assert_eq!(dec.next, MonthRef { year: 2013, month: 1 });
    }

    #[test]
    fn html_fragment() {
        let mut e = workday("2012-01-02", hm(9, 0), hm(17, 0));
        e.id = 11;
        let html = build_month(2012, 1, None, &[e])
            .unwrap()
            .to_html(|m| format!("/calendar/{}/{}", m.year, m.month));

        assert!(html.starts_with("<table id=\"calendar\""));
        assert!(html.ends_with("</table>"));
        assert!(html.contains("href=\"/calendar/2011/12\""));
        assert!(html.contains("href=\"/calendar/2012/2\""));
        assert!(html.contains(
            "toggleChangeEntries(9, 0, '09:00', 17, 0, '17:00', '2012-01-02', 'WKDAY', 11, 15, '00:15')"
        ));
        assert!(html.contains("class=\"day-class WKDAY\">2</td>"));
        assert!(html.contains("hideEntries('2012-01-05')"));
        assert_eq!(html.matches("class=\"empty\"").count(), 6 + 5);
        assert_eq!(html.matches("<tr>").count(), 2 + 6);
    }
}
