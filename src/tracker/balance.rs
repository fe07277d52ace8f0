//! Holiday and overtime balances, recomputed on demand from a user's entries.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use anyhow::{Context, anyhow};
use chrono::{NaiveDate, NaiveTime};
use serde::Serialize;

use crate::error::AppError;
use crate::model::daytype::DayType;
use crate::model::tracking_entry::TrackingEntry;
use crate::tracker::time::float_to_time;

/// Half-open date range `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Period {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl Period {
    pub fn year(year: i32) -> Result<Self, AppError> {
        let start = NaiveDate::from_ymd_opt(year, 1, 1);
        let end = year
            .checked_add(1)
            .and_then(|next| NaiveDate::from_ymd_opt(next, 1, 1));
        match (start, end) {
            (Some(start), Some(end)) => Ok(Self { start, end }),
            _ => Err(AppError::validation("Invalid year")),
        }
    }

    pub fn month(year: i32, month: u32) -> Result<Self, AppError> {
        if !(1..=12).contains(&month) {
            return Err(AppError::validation("Invalid month"));
        }
        let next = if month == 12 {
            year.checked_add(1).map(|y| (y, 1))
        } else {
            Some((year, month + 1))
        };
        let start = NaiveDate::from_ymd_opt(year, month, 1);
        let end = next.and_then(|(y, m)| NaiveDate::from_ymd_opt(y, m, 1));
        match (start, end) {
            (Some(start), Some(end)) => Ok(Self { start, end }),
            _ => Err(AppError::validation("Invalid year")),
        }
    }

    /// Whole year, or a single month of it.
    pub fn of(year: i32, month: Option<u32>) -> Result<Self, AppError> {
        match month {
            Some(m) => Self::month(year, m),
            None => Self::year(year),
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date < self.end
    }

    pub fn days(&self) -> u32 {
        (self.end - self.start).num_days() as u32
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BalanceEffect {
    Neutral,
    Increment,
    Decrement,
}

/// Day-type to signed holiday-balance weight. Unlisted day-types are neutral.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BalanceRules {
    weights: HashMap<DayType, i32>,
}

impl Default for BalanceRules {
    fn default() -> Self {
        Self {
            weights: HashMap::from([
                (DayType::Holis, -1),
                (DayType::Puwrk, 2),
                (DayType::Retrn, -1),
            ]),
        }
    }
}

impl BalanceRules {
    pub fn weight(&self, daytype: DayType) -> i32 {
        self.weights.get(&daytype).copied().unwrap_or(0)
    }

    pub fn effect(&self, daytype: DayType) -> BalanceEffect {
        match self.weight(daytype) {
            0 => BalanceEffect::Neutral,
            w if w > 0 => BalanceEffect::Increment,
            _ => BalanceEffect::Decrement,
        }
    }
}

/// Parses `"HOLIS=-1,PUWRK=2,RETRN=-1"`.
impl FromStr for BalanceRules {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut weights = HashMap::new();
        for pair in s.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            let (code, weight) = pair
                .split_once('=')
                .ok_or_else(|| anyhow!("expected CODE=WEIGHT, got {pair:?}"))?;
            let daytype: DayType = code
                .trim()
                .parse()
                .with_context(|| format!("unknown day-type {code:?}"))?;
            let weight: i32 = weight
                .trim()
                .parse()
                .with_context(|| format!("invalid weight for {code}"))?;
            if weights.insert(daytype, weight).is_some() {
                return Err(anyhow!("day-type {code} listed twice"));
            }
        }
        Ok(Self { weights })
    }
}

impl fmt::Display for BalanceRules {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut pairs: Vec<_> = self.weights.iter().collect();
        pairs.sort();
        let joined = pairs
            .into_iter()
            .map(|(d, w)| format!("{d}={w}"))
            .collect::<Vec<_>>()
            .join(",");
        f.write_str(&joined)
    }
}

/// Stored base balance adjusted by every entry's weight.
pub fn holiday_balance<'a>(
    base: i32,
    entries: impl IntoIterator<Item = &'a TrackingEntry>,
    rules: &BalanceRules,
) -> i32 {
    base + entries
        .into_iter()
        .map(|e| rules.weight(e.daytype))
        .sum::<i32>()
}

/// Sum of signed time differences over working entries, in hours.
pub fn overtime_hours<'a>(
    entries: impl IntoIterator<Item = &'a TrackingEntry>,
    shiftlength: NaiveTime,
) -> f64 {
    let minutes: i64 = entries
        .into_iter()
        .filter(|e| e.daytype.is_working())
        .map(|e| e.time_difference(shiftlength).num_minutes())
        .sum();
    minutes as f64 / 60.0
}

/// Tabular rendering: zero shows as a placeholder.
pub fn format_balance(value: f64) -> String {
    if value.abs() < 0.005 {
        "-".to_string()
    } else {
        format!("{value:.2}")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, utoipa::ToSchema)]
pub struct BalanceSummary {
    #[schema(example = 7)]
    pub user_id: u64,
    #[schema(example = 2012)]
    pub year: i32,
    #[schema(example = 1, nullable = true)]
    pub month: Option<u32>,
    /// Stored holiday balance.
    #[schema(example = 20)]
    pub base: i32,
    #[schema(example = 20)]
    pub holiday_balance: i32,
    #[schema(example = 1.25)]
    pub overtime_hours: f64,
    /// `overtime_hours` as a signed clock string.
    #[schema(example = "01:15")]
    pub overtime: String,
}

pub fn summarize(
    user_id: u64,
    year: i32,
    month: Option<u32>,
    base: i32,
    shiftlength: NaiveTime,
    entries: &[TrackingEntry],
    rules: &BalanceRules,
) -> BalanceSummary {
    let overtime = overtime_hours(entries, shiftlength);
    BalanceSummary {
        user_id,
        year,
        month,
        base,
        holiday_balance: holiday_balance(base, entries, rules),
        overtime_hours: overtime,
        overtime: float_to_time(overtime),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::tracking_entry::fixtures::{entry, hm, workday};

    fn entries(days: &[(&str, DayType)]) -> Vec<TrackingEntry> {
        days.iter().map(|(d, t)| entry(1, d, *t)).collect()
    }

    #[test]
    fn mixed_entries_are_net_neutral() {
        let e = entries(&[
            ("2012-01-01", DayType::Holis),
            ("2012-01-02", DayType::Puwrk),
            ("2012-01-03", DayType::Retrn),
        ]);
        assert_eq!(holiday_balance(20, &e, &BalanceRules::default()), 20);
    }

    #[test]
    fn public_holiday_work_adds() {
        let e = entries(&[
            ("2012-01-01", DayType::Puwrk),
            ("2012-01-02", DayType::Puwrk),
            ("2012-01-03", DayType::Puwrk),
        ]);
        assert_eq!(holiday_balance(20, &e, &BalanceRules::default()), 26);
    }

    #[test]
    fn returns_decrement() {
        let e = entries(&[
            ("2012-01-01", DayType::Retrn),
            ("2012-01-02", DayType::Retrn),
            ("2012-01-03", DayType::Retrn),
        ]);
        assert_eq!(holiday_balance(20, &e, &BalanceRules::default()), 17);
    }

    #[test]
    fn neutral_entries_leave_base_untouched() {
        let e = entries(&[("2012-01-02", DayType::Wkday), ("2012-01-03", DayType::Sickd)]);
        assert_eq!(holiday_balance(20, &e, &BalanceRules::default()), 20);
        assert_eq!(holiday_balance(20, &Vec::<TrackingEntry>::new(), &BalanceRules::default()), 20);
    }

    #[test]
    fn accumulation_is_order_independent() {
        let mut e = entries(&[
            ("2012-01-01", DayType::Holis),
            ("2012-01-02", DayType::Puwrk),
            ("2012-01-03", DayType::Retrn),
            ("2012-01-04", DayType::Puwrk),
            ("2012-01-05", DayType::Holis),
            ("2012-01-06", DayType::Wkday),
        ]);
        let rules = BalanceRules::default();
        let expected = holiday_balance(20, &e, &rules);
        e.reverse();
        assert_eq!(holiday_balance(20, &e, &rules), expected);
        e.rotate_left(2);
        assert_eq!(holiday_balance(20, &e, &rules), expected);
        assert_eq!(expected, 21);
    }

    #[test]
    fn effects_follow_weight_sign() {
        let rules = BalanceRules::default();
        assert_eq!(rules.effect(DayType::Puwrk), BalanceEffect::Increment);
        assert_eq!(rules.effect(DayType::Retrn), BalanceEffect::Decrement);
        assert_eq!(rules.effect(DayType::Wkday), BalanceEffect::Neutral);
    }

    #[test]
    fn rules_parse_from_configuration() {
        let rules: BalanceRules = "HOLIS=-1, PUWRK=2,RETRN=-1".parse().unwrap();
        assert_eq!(rules, BalanceRules::default());

        let custom: BalanceRules = "ROVER=1".parse().unwrap();
        assert_eq!(custom.weight(DayType::Rover), 1);
        assert_eq!(custom.weight(DayType::Holis), 0);

        assert!("HOLIS".parse::<BalanceRules>().is_err());
        assert!("NOPE=1".parse::<BalanceRules>().is_err());
        assert!("HOLIS=x".parse::<BalanceRules>().is_err());
        assert!("HOLIS=1,HOLIS=2".parse::<BalanceRules>().is_err());
    }

    #[test]
    fn rules_display_round_trips() {
        let rules = BalanceRules::default();
        let again: BalanceRules = rules.to_string().parse().unwrap();
        assert_eq!(again, rules);
    }

    #[test]
    fn overtime_sums_working_days_only() {
        let shift = hm(7, 45);
        let mut holiday = entry(1, "2012-01-05", DayType::Holis);
        holiday.end_time = hm(23, 0);
        let e = vec![
            workday("2012-01-02", hm(9, 0), hm(18, 0)),  // +60
            workday("2012-01-03", hm(9, 0), hm(16, 45)), // -15
            workday("2012-01-04", hm(9, 0), hm(17, 0)),  // 0
            holiday,
        ];
        assert_eq!(overtime_hours(&e, shift), 0.75);
    }

    #[test]
    fn summary_for_a_month() {
        let e = vec![
            workday("2012-01-02", hm(9, 0), hm(18, 15)), // +75
            entry(1, "2012-01-03", DayType::Puwrk),
        ];
        let summary = summarize(1, 2012, Some(1), 20, hm(7, 45), &e, &BalanceRules::default());
        assert_eq!(summary.holiday_balance, 22);
        assert_eq!(summary.overtime_hours, 1.25);
        assert_eq!(summary.overtime, "01:15");
        assert_eq!(summary.base, 20);
    }

    #[test]
    fn zero_renders_as_placeholder() {
        assert_eq!(format_balance(0.0), "-");
        assert_eq!(format_balance(-0.0), "-");
        assert_eq!(format_balance(1.25), "1.25");
        assert_eq!(format_balance(-0.5), "-0.50");
    }

    #[test]
    fn periods() {
        let jan = Period::month(2012, 1).unwrap();
        assert_eq!(jan.days(), 31);
        assert!(jan.contains(NaiveDate::from_ymd_opt(2012, 1, 31).unwrap()));
        assert!(!jan.contains(NaiveDate::from_ymd_opt(2012, 2, 1).unwrap()));

        let dec = Period::month(2012, 12).unwrap();
        assert_eq!(dec.end, NaiveDate::from_ymd_opt(2013, 1, 1).unwrap());

        assert_eq!(Period::year(2012).unwrap().days(), 366);
        assert_eq!(Period::of(2012, Some(2)).unwrap().days(), 29);
        assert!(Period::month(2012, 0).is_err());
        assert!(Period::month(2012, 13).is_err());
    }

    #[test]
    fn extreme_years_are_rejected() {
        for year in [i32::MAX, i32::MIN] {
            assert_eq!(Period::year(year).unwrap_err().to_string(), "Invalid year");
            assert!(Period::month(year, 12).is_err());
            assert!(Period::month(year, 1).is_err());
        }
        assert!(Period::of(i32::MAX, None).is_err());
    }
}
