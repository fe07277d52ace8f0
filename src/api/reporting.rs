use std::collections::BTreeSet;

use actix_web::{HttpResponse, http::header::CONTENT_DISPOSITION, web};
use sqlx::MySqlPool;
use tracing::debug;

use crate::auth::auth::AuthUser;
use crate::config::Config;
use crate::error::AppError;
use crate::model::user::User;
use crate::repo::{entries, users};
use crate::tracker::balance::Period;
use crate::tracker::report::{
    entries_csv, holiday_rows, holidays_for_year_csv, overtime_by_month_csv,
    overtime_by_year_csv, overtime_rows,
};

fn csv_attachment(filename: &str, body: Vec<u8>) -> HttpResponse {
    HttpResponse::Ok()
        .content_type("text/csv; charset=utf-8")
        .insert_header((CONTENT_DISPOSITION, format!("attachment;filename={filename}")))
        .body(body)
}

/// Managers only; the caller's subordinates, the caller included.
async fn team(pool: &MySqlPool, auth: &AuthUser) -> Result<Vec<User>, AppError> {
    auth.require_manager()?;
    let viewer = auth.current(pool).await?;
    users::subordinates(pool, &viewer).await
}

fn ids(team: &[User]) -> BTreeSet<u64> {
    team.iter().map(|u| u.id).collect()
}

/// Every entry of one employee
#[utoipa::path(
    get,
    path = "/api/reporting/all_holiday_data/{who}",
    params(("who", Path, description = "Database id of the employee")),
    responses(
        (status = 200, description = "CSV attachment AllHolidayData_<id>.csv", content_type = "text/csv"),
        (status = 403, description = "Caller is not a manager"),
        (status = 404, description = "Employee outside the caller's team")
    ),
    tag = "Reporting",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn all_holiday_data(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> Result<HttpResponse, AppError> {
    let who = path.into_inner();
    let team = team(pool.get_ref(), &auth).await?;
    let target = team
        .iter()
        .find(|u| u.id == who)
        .ok_or(AppError::NotFound("User"))?;

    let entries = entries::all_for_user(pool.get_ref(), target.id).await?;
    let body = entries_csv(&entries)?;
    Ok(csv_attachment(&format!("AllHolidayData_{}.csv", target.id), body))
}

/// Entries of the whole team for one month
#[utoipa::path(
    get,
    path = "/api/reporting/holiday_data/{year}/{month}",
    params(
        ("year", Path, description = "Calendar year"),
        ("month", Path, description = "Month, 1-12")
    ),
    responses(
        (status = 200, description = "CSV attachment HolidayData_<year>_<month>.csv", content_type = "text/csv"),
        (status = 400, description = "Invalid month")
    ),
    tag = "Reporting",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn holiday_data(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<(i32, u32)>,
) -> Result<HttpResponse, AppError> {
    let (year, month) = path.into_inner();
    let period = Period::month(year, month)?;
    let team = team(pool.get_ref(), &auth).await?;

    let entries = entries::in_period_for_users(pool.get_ref(), &ids(&team), &period).await?;
    debug!(team = team.len(), entries = entries.len(), "Holiday data report");
    let body = entries_csv(&entries)?;
    Ok(csv_attachment(&format!("HolidayData_{year}_{month}.csv"), body))
}

/// Overtime of the team in one month
#[utoipa::path(
    get,
    path = "/api/reporting/ot_by_month/{year}/{month}",
    params(
        ("year", Path, description = "Calendar year"),
        ("month", Path, description = "Month, 1-12")
    ),
    responses(
        (status = 200, description = "CSV attachment OT_By_Month_<year>_<month>.csv", content_type = "text/csv"),
        (status = 400, description = "Invalid month")
    ),
    tag = "Reporting",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn ot_by_month(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<(i32, u32)>,
) -> Result<HttpResponse, AppError> {
    let (year, month) = path.into_inner();
    let period = Period::month(year, month)?;
    let team = team(pool.get_ref(), &auth).await?;

    let entries = entries::in_period_for_users(pool.get_ref(), &ids(&team), &period).await?;
    let rows = overtime_rows(&team, &entries, &[month]);
    let body = overtime_by_month_csv(month, &rows)?;
    Ok(csv_attachment(&format!("OT_By_Month_{year}_{month}.csv"), body))
}

/// Overtime of the team per month of a year
#[utoipa::path(
    get,
    path = "/api/reporting/ot_by_year/{year}",
    params(("year", Path, description = "Calendar year")),
    responses(
        (status = 200, description = "CSV attachment OT_By_Year_<year>.csv", content_type = "text/csv")
    ),
    tag = "Reporting",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn ot_by_year(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    let year = path.into_inner();
    let period = Period::year(year)?;
    let team = team(pool.get_ref(), &auth).await?;

    let entries = entries::in_period_for_users(pool.get_ref(), &ids(&team), &period).await?;
    let months: Vec<u32> = (1..=12).collect();
    let rows = overtime_rows(&team, &entries, &months);
    let body = overtime_by_year_csv(&rows)?;
    Ok(csv_attachment(&format!("OT_By_Year_{year}.csv"), body))
}

/// Holidays taken per month of a year, with the balance left
#[utoipa::path(
    get,
    path = "/api/reporting/holidays_for_year/{year}",
    params(("year", Path, description = "Calendar year")),
    responses(
        (status = 200, description = "CSV attachment Holidays_for_year<year>.csv", content_type = "text/csv")
    ),
    tag = "Reporting",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn holidays_for_year(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
    path: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    let year = path.into_inner();
    let period = Period::year(year)?;
    let team = team(pool.get_ref(), &auth).await?;

    let entries = entries::in_period_for_users(pool.get_ref(), &ids(&team), &period).await?;
    let rows = holiday_rows(&team, &entries, &config.balance_rules);
    let body = holidays_for_year_csv(&rows)?;
    Ok(csv_attachment(&format!("Holidays_for_year{year}.csv"), body))
}
