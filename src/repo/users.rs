use std::collections::BTreeSet;

use chrono::{NaiveDate, NaiveTime};
use sqlx::MySqlPool;
use tracing::debug;

use crate::error::AppError;
use crate::model::authorization::{AuthLink, Member};
use crate::model::role::Role;
use crate::model::user::User;
use crate::tracker::subordinates::Org;

const USER_COLUMNS: &str = "id, user_id, firstname, lastname, password, user_type, market, \
                            process, start_date, breaklength, shiftlength, job_code, holiday_balance";

/// Validated form data for a new account.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub user_id: String,
    pub firstname: String,
    pub lastname: String,
    pub user_type: Role,
    pub market: String,
    pub process: String,
    pub start_date: NaiveDate,
    pub breaklength: NaiveTime,
    pub shiftlength: NaiveTime,
    pub job_code: String,
    pub holiday_balance: i32,
}

pub async fn find_by_id(pool: &MySqlPool, id: u64) -> Result<Option<User>, AppError> {
    let user = sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?"))
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(user)
}

pub async fn get(pool: &MySqlPool, id: u64) -> Result<User, AppError> {
    find_by_id(pool, id).await?.ok_or(AppError::NotFound("User"))
}

pub async fn find_by_login(pool: &MySqlPool, login: &str) -> Result<Option<User>, AppError> {
    let user = sqlx::query_as::<_, User>(&format!(
        "SELECT {USER_COLUMNS} FROM users WHERE user_id = ?"
    ))
    .bind(login.trim())
    .fetch_optional(pool)
    .await?;
    Ok(user)
}

pub async fn list_by_ids(pool: &MySqlPool, ids: &BTreeSet<u64>) -> Result<Vec<User>, AppError> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }
    let placeholders = vec!["?"; ids.len()].join(", ");
    let sql = format!(
        "SELECT {USER_COLUMNS} FROM users WHERE id IN ({placeholders}) ORDER BY lastname, firstname, id"
    );

    let mut query = sqlx::query_as::<_, User>(&sql);
    for id in ids {
        query = query.bind(*id);
    }
    Ok(query.fetch_all(pool).await?)
}

/// Links plus the role and process of every account.
pub async fn org(pool: &MySqlPool) -> Result<Org, AppError> {
    let links = sqlx::query_as::<_, AuthLink>("SELECT admin_id, user_id FROM authorization_links")
        .fetch_all(pool)
        .await?;
    let members = sqlx::query_as::<_, Member>("SELECT id, user_type, process FROM users")
        .fetch_all(pool)
        .await?;
    Ok(Org::new(links, members))
}

/// Everyone `viewer` may see, the viewer included.
pub async fn subordinates(pool: &MySqlPool, viewer: &User) -> Result<Vec<User>, AppError> {
    let ids = org(pool).await?.visible_user_ids(viewer.id);
    debug!(viewer = viewer.id, visible = ids.len(), "Resolved subordinates");
    list_by_ids(pool, &ids).await
}

/// Creates the account and links it under `admin_id` in one transaction.
pub async fn insert(
    pool: &MySqlPool,
    new_user: &NewUser,
    password_hash: &str,
    admin_id: u64,
) -> Result<u64, AppError> {
    let mut tx = pool.begin().await?;

    let result = sqlx::query(
        r#"
        INSERT INTO users
            (user_id, firstname, lastname, password, user_type, market, process,
             start_date, breaklength, shiftlength, job_code, holiday_balance)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&new_user.user_id)
    .bind(&new_user.firstname)
    .bind(&new_user.lastname)
    .bind(password_hash)
    .bind(new_user.user_type.to_string())
    .bind(&new_user.market)
    .bind(&new_user.process)
    .bind(new_user.start_date)
    .bind(new_user.breaklength)
    .bind(new_user.shiftlength)
    .bind(&new_user.job_code)
    .bind(new_user.holiday_balance)
    .execute(&mut *tx)
    .await?;

    let id = result.last_insert_id();

    sqlx::query("INSERT INTO authorization_links (admin_id, user_id) VALUES (?, ?)")
        .bind(admin_id)
        .bind(id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    Ok(id)
}

/// Returns false when no such user existed.
pub async fn delete(pool: &MySqlPool, id: u64) -> Result<bool, AppError> {
    let result = sqlx::query("DELETE FROM users WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn touch_last_login(pool: &MySqlPool, id: u64) -> Result<(), AppError> {
    sqlx::query("UPDATE users SET last_login_at = NOW() WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}
