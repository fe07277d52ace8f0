use std::collections::BTreeSet;

use chrono::{NaiveDate, NaiveTime};
use sqlx::MySqlPool;
use tracing::debug;

use crate::error::AppError;
use crate::model::daytype::DayType;
use crate::model::tracking_entry::TrackingEntry;
use crate::tracker::balance::Period;

const ENTRY_COLUMNS: &str = "id, user_id, entry_date, start_time, end_time, breaks, daytype";

/// Field values of an entry that is about to be written.
#[derive(Debug, Clone, PartialEq)]
pub struct EntryInput {
    pub entry_date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub breaks: NaiveTime,
    pub daytype: DayType,
}

impl EntryInput {
    /// A day with no clock times, as written by the holiday grid.
    pub fn marker(entry_date: NaiveDate, daytype: DayType) -> Self {
        Self {
            entry_date,
            start_time: NaiveTime::MIN,
            end_time: NaiveTime::MIN,
            breaks: NaiveTime::MIN,
            daytype,
        }
    }
}

/// Change to a single day of the holiday grid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DayChange {
    Set(NaiveDate, DayType),
    Clear(NaiveDate),
}

pub async fn insert(pool: &MySqlPool, user_id: u64, input: &EntryInput) -> Result<u64, AppError> {
    let result = sqlx::query(
        r#"
        INSERT INTO tracking_entries
            (user_id, entry_date, start_time, end_time, breaks, daytype)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(user_id)
    .bind(input.entry_date)
    .bind(input.start_time)
    .bind(input.end_time)
    .bind(input.breaks)
    .bind(input.daytype.to_string())
    .execute(pool)
    .await?;
    Ok(result.last_insert_id())
}

pub async fn find(pool: &MySqlPool, id: u64, user_id: u64) -> Result<Option<TrackingEntry>, AppError> {
    let entry = sqlx::query_as::<_, TrackingEntry>(&format!(
        "SELECT {ENTRY_COLUMNS} FROM tracking_entries WHERE id = ? AND user_id = ?"
    ))
    .bind(id)
    .bind(user_id)
    .fetch_optional(pool)
    .await?;
    Ok(entry)
}

/// Rewrites entry `id`, which must belong to `user_id`.
pub async fn update(
    pool: &MySqlPool,
    id: u64,
    user_id: u64,
    input: &EntryInput,
) -> Result<(), AppError> {
    if find(pool, id, user_id).await?.is_none() {
        return Err(AppError::NotFound("Entry"));
    }

    sqlx::query(
        r#"
        UPDATE tracking_entries
        SET entry_date = ?, start_time = ?, end_time = ?, breaks = ?, daytype = ?
        WHERE id = ? AND user_id = ?
        "#,
    )
    .bind(input.entry_date)
    .bind(input.start_time)
    .bind(input.end_time)
    .bind(input.breaks)
    .bind(input.daytype.to_string())
    .bind(id)
    .bind(user_id)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn delete(pool: &MySqlPool, id: u64, user_id: u64) -> Result<bool, AppError> {
    let result = sqlx::query("DELETE FROM tracking_entries WHERE id = ? AND user_id = ?")
        .bind(id)
        .bind(user_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn in_period(
    pool: &MySqlPool,
    user_id: u64,
    period: &Period,
) -> Result<Vec<TrackingEntry>, AppError> {
    let entries = sqlx::query_as::<_, TrackingEntry>(&format!(
        r#"
        SELECT {ENTRY_COLUMNS} FROM tracking_entries
        WHERE user_id = ? AND entry_date >= ? AND entry_date < ?
        ORDER BY entry_date
        "#
    ))
    .bind(user_id)
    .bind(period.start)
    .bind(period.end)
    .fetch_all(pool)
    .await?;
    Ok(entries)
}

pub async fn all_for_user(pool: &MySqlPool, user_id: u64) -> Result<Vec<TrackingEntry>, AppError> {
    let entries = sqlx::query_as::<_, TrackingEntry>(&format!(
        "SELECT {ENTRY_COLUMNS} FROM tracking_entries WHERE user_id = ? ORDER BY entry_date"
    ))
    .bind(user_id)
    .fetch_all(pool)
    .await?;
    Ok(entries)
}

/// Entries of several users in one round trip, ordered by user then date.
pub async fn in_period_for_users(
    pool: &MySqlPool,
    user_ids: &BTreeSet<u64>,
    period: &Period,
) -> Result<Vec<TrackingEntry>, AppError> {
    if user_ids.is_empty() {
        return Ok(Vec::new());
    }
    let placeholders = vec!["?"; user_ids.len()].join(", ");
    let sql = format!(
        r#"
        SELECT {ENTRY_COLUMNS} FROM tracking_entries
        WHERE user_id IN ({placeholders}) AND entry_date >= ? AND entry_date < ?
        ORDER BY user_id, entry_date
        "#
    );
    debug!(users = user_ids.len(), start = %period.start, end = %period.end, "Fetching entries");

    let mut query = sqlx::query_as::<_, TrackingEntry>(&sql);
    for id in user_ids {
        query = query.bind(*id);
    }
    Ok(query.bind(period.start).bind(period.end).fetch_all(pool).await?)
}

/// Applies a month of holiday-grid changes atomically.
pub async fn apply_day_changes(
    pool: &MySqlPool,
    user_id: u64,
    changes: &[DayChange],
) -> Result<(), AppError> {
    let mut tx = pool.begin().await?;

    for change in changes {
        match *change {
            DayChange::Clear(date) => {
                sqlx::query("DELETE FROM tracking_entries WHERE user_id = ? AND entry_date = ?")
                    .bind(user_id)
                    .bind(date)
                    .execute(&mut *tx)
                    .await?;
            }
            DayChange::Set(date, daytype) => {
                let input = EntryInput::marker(date, daytype);
                sqlx::query(
                    r#"
                    INSERT INTO tracking_entries
                        (user_id, entry_date, start_time, end_time, breaks, daytype)
                    VALUES (?, ?, ?, ?, ?, ?)
                    ON DUPLICATE KEY UPDATE daytype = VALUES(daytype)
                    "#,
                )
                .bind(user_id)
                .bind(input.entry_date)
                .bind(input.start_time)
                .bind(input.end_time)
                .bind(input.breaks)
                .bind(input.daytype.to_string())
                .execute(&mut *tx)
                .await?;
            }
        }
    }

    tx.commit().await?;
    debug!(user_id, changes = changes.len(), "Applied holiday grid");
    Ok(())
}
