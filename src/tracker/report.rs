//! CSV report bodies. Every file is UTF-8 with a byte-order mark so that
//! spreadsheet tools pick the right encoding.

use std::collections::HashMap;

use chrono::Datelike;
use csv::Writer;

use crate::error::AppError;
use crate::model::daytype::DayType;
use crate::model::tracking_entry::TrackingEntry;
use crate::model::user::User;
use crate::tracker::balance::{BalanceRules, format_balance, holiday_balance, overtime_hours};
use crate::tracker::calendar::{MONTH_NAMES, month_name};

const BOM: &[u8] = b"\xEF\xBB\xBF";

fn writer() -> Writer<Vec<u8>> {
    Writer::from_writer(BOM.to_vec())
}

fn finish(wtr: Writer<Vec<u8>>) -> Result<Vec<u8>, AppError> {
    wtr.into_inner()
        .map_err(|e| AppError::Internal(e.to_string()))
}

/// Overtime figures for one user.
#[derive(Debug, Clone, PartialEq)]
pub struct OvertimeRow {
    pub name: String,
    pub team: String,
    pub hours: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HolidayRow {
    pub name: String,
    /// Holidays taken per month, January first.
    pub per_month: [u32; 12],
    pub remaining: i32,
}

fn by_user(entries: &[TrackingEntry]) -> HashMap<u64, Vec<&TrackingEntry>> {
    let mut grouped: HashMap<u64, Vec<&TrackingEntry>> = HashMap::new();
    for entry in entries {
        grouped.entry(entry.user_id).or_default().push(entry);
    }
    grouped
}

/// Overtime per user for each of `months`, in that order.
pub fn overtime_rows(users: &[User], entries: &[TrackingEntry], months: &[u32]) -> Vec<OvertimeRow> {
    let grouped = by_user(entries);
    users
        .iter()
        .map(|user| {
            let own = grouped.get(&user.id).map(Vec::as_slice).unwrap_or_default();
            let hours = months
                .iter()
                .map(|&month| {
                    overtime_hours(
                        own.iter().copied().filter(|e| e.entry_date.month() == month),
                        user.shiftlength,
                    )
                })
                .collect();
            OvertimeRow {
                name: user.name(),
                team: user.process.clone(),
                hours,
            }
        })
        .collect()
}

/// Holidays taken per month of a year's `entries`, with the balance left.
pub fn holiday_rows(users: &[User], entries: &[TrackingEntry], rules: &BalanceRules) -> Vec<HolidayRow> {
    let grouped = by_user(entries);
    users
        .iter()
        .map(|user| {
            let own = grouped.get(&user.id).map(Vec::as_slice).unwrap_or_default();
            let mut per_month = [0u32; 12];
            for entry in own.iter().filter(|e| e.daytype == DayType::Holis) {
                per_month[entry.entry_date.month0() as usize] += 1;
            }
            HolidayRow {
                name: user.name(),
                per_month,
                remaining: holiday_balance(user.holiday_balance, own.iter().copied(), rules),
            }
        })
        .collect()
}

/// One row per entry, headed by the entry field names.
pub fn entries_csv<'a>(
    entries: impl IntoIterator<Item = &'a TrackingEntry>,
) -> Result<Vec<u8>, AppError> {
    let mut wtr = writer();
    wtr.write_record(TrackingEntry::headings())?;
    for entry in entries {
        wtr.write_record(entry.display_as_csv())?;
    }
    finish(wtr)
}

/// `Name, Team, <Month>` with a total row.
pub fn overtime_by_month_csv(month: u32, rows: &[OvertimeRow]) -> Result<Vec<u8>, AppError> {
    let name = month_name(month).ok_or_else(|| AppError::validation("Invalid month"))?;
    let mut wtr = writer();
    wtr.write_record(["Name", "Team", name])?;

    let mut total = 0.0;
    for row in rows {
        let hours = row.hours.first().copied().unwrap_or(0.0);
        total += hours;
        let cell = format_balance(hours);
        wtr.write_record([row.name.as_str(), row.team.as_str(), cell.as_str()])?;
    }
    let total = format!("{total:.2}");
    wtr.write_record(["Total", "Total", total.as_str()])?;
    finish(wtr)
}

/// `Name, Team, January..December` with a total row per month.
pub fn overtime_by_year_csv(rows: &[OvertimeRow]) -> Result<Vec<u8>, AppError> {
    let mut wtr = writer();
    let header: Vec<&str> = ["Name", "Team"].into_iter().chain(MONTH_NAMES).collect();
    wtr.write_record(&header)?;

    let mut totals = [0.0_f64; 12];
    for row in rows {
        let mut record = vec![row.name.clone(), row.team.clone()];
        for (month, total) in totals.iter_mut().enumerate() {
            let hours = row.hours.get(month).copied().unwrap_or(0.0);
            *total += hours;
            record.push(format_balance(hours));
        }
        wtr.write_record(&record)?;
    }

    let mut total_row = vec!["Total".to_string(), "Total".to_string()];
    total_row.extend(totals.iter().map(|t| format!("{t:.2}")));
    wtr.write_record(&total_row)?;
    finish(wtr)
}

/// `Name, January..December, Used, Remaining`.
pub fn holidays_for_year_csv(rows: &[HolidayRow]) -> Result<Vec<u8>, AppError> {
    let mut wtr = writer();
    let header: Vec<&str> = std::iter::once("Name")
        .chain(MONTH_NAMES)
        .chain(["Used", "Remaining"])
        .collect();
    wtr.write_record(&header)?;

    for row in rows {
        let used: u32 = row.per_month.iter().sum();
        let mut record = vec![row.name.clone()];
        record.extend(row.per_month.iter().map(u32::to_string));
        record.push(used.to_string());
        record.push(row.remaining.to_string());
        wtr.write_record(&record)?;
    }
    finish(wtr)
}
