use chrono::{NaiveDate, NaiveTime};
use sqlx::MySqlPool;

use crate::error::AppError;

/// SQL bindable value
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    String(String),
    I64(i64),
    Date(NaiveDate),
    Time(NaiveTime),
}

/// SQL update container
#[derive(Debug)]
pub struct SqlUpdate {
    pub sql: String,
    pub values: Vec<SqlValue>,
}

/// Build a dynamic `UPDATE` over pre-validated columns.
///
/// Column names are interpolated, so callers must only pass names from a
/// fixed whitelist; values are always bound.
pub fn build_update_sql(
    table: &str,
    fields: Vec<(&'static str, SqlValue)>,
    id_column: &str,
    id_value: u64,
) -> Result<SqlUpdate, AppError> {
    if fields.is_empty() {
        return Err(AppError::validation("No fields provided for update"));
    }

    let set_clause = fields
        .iter()
        .map(|(column, _)| format!("{} = ?", column))
        .collect::<Vec<_>>()
        .join(", ");

    let sql = format!("UPDATE {} SET {} WHERE {} = ?", table, set_clause, id_column);

    let mut values: Vec<SqlValue> = fields.into_iter().map(|(_, v)| v).collect();
    // WHERE id = ?
    values.push(SqlValue::I64(id_value as i64));

    Ok(SqlUpdate { sql, values })
}

/// Execute the update
pub async fn execute_update(pool: &MySqlPool, update: SqlUpdate) -> Result<u64, AppError> {
    let mut query = sqlx::query(&update.sql);

    for value in update.values {
        query = match value {
            SqlValue::String(v) => query.bind(v),
            SqlValue::I64(v) => query.bind(v),
            SqlValue::Date(v) => query.bind(v),
            SqlValue::Time(v) => query.bind(v),
        };
    }

    let result = query.execute(pool).await?;
    Ok(result.rows_affected())
}
