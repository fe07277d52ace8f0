use actix_web::{HttpResponse, web};
use chrono::{Datelike, Local};
use serde::Deserialize;
use sqlx::MySqlPool;
use tracing::debug;
use utoipa::{IntoParams, ToSchema};

use crate::api::envelope::{AjaxResponse, respond};
use crate::api::optional_field;
use crate::auth::auth::AuthUser;
use crate::config::Config;
use crate::error::AppError;
use crate::repo::entries;
use crate::tracker::balance::Period;
use crate::tracker::calendar::{CalendarMonth, MonthRef, build_month};

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CalendarQuery {
    /// Database id of the user to show; defaults to the caller.
    pub user: Option<u64>,
    /// Day to highlight.
    pub day: Option<u32>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CalendarForm {
    /// Database id of the user to show; defaults to the caller.
    pub eeid: Option<String>,
    pub year: Option<String>,
    pub month: Option<String>,
}

/// Grid for `target` (the caller when `None`), after a permission check.
pub async fn load_month(
    pool: &MySqlPool,
    auth: &AuthUser,
    target: Option<u64>,
    year: i32,
    month: u32,
    day: Option<u32>,
) -> Result<CalendarMonth, AppError> {
    let user = auth.authorize(pool, target.unwrap_or(auth.user_id)).await?;
    let period = Period::month(year, month)?;
    let entries = entries::in_period(pool, user.id, &period).await?;
    debug!(user = user.id, year, month, entries = entries.len(), "Building calendar");
    build_month(year, month, day, &entries)
}

/// HTML fragment as embedded in AJAX answers.
pub async fn render_fragment(
    pool: &MySqlPool,
    config: &Config,
    auth: &AuthUser,
    target: Option<u64>,
    year: i32,
    month: u32,
    day: Option<u32>,
) -> Result<String, AppError> {
    let calendar = load_month(pool, auth, target, year, month, day).await?;
    let user = target.unwrap_or(auth.user_id);
    Ok(calendar.to_html(|m| fragment_link(&config.api_prefix, user, m)))
}

/// Navigation target: the HTML fragment route for `user`.
fn fragment_link(api_prefix: &str, user: u64, month: MonthRef) -> String {
    format!(
        "{api_prefix}/calendar/{}/{}/fragment?user={user}",
        month.year, month.month
    )
}

/// Calendar month as JSON
#[utoipa::path(
    get,
    path = "/api/calendar/{year}/{month}",
    params(
        ("year", Path, description = "Calendar year"),
        ("month", Path, description = "Month, 1-12"),
        CalendarQuery
    ),
    responses(
        (status = 200, description = "Week-structured month grid", body = CalendarMonth),
        (status = 400, description = "Invalid month or day"),
        (status = 403, description = "User is not managed by the caller"),
        (status = 404, description = "Unknown user")
    ),
    tag = "Calendar",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn get_calendar(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<(i32, u32)>,
    query: web::Query<CalendarQuery>,
) -> Result<HttpResponse, AppError> {
    let (year, month) = path.into_inner();
    let calendar = load_month(pool.get_ref(), &auth, query.user, year, month, query.day).await?;
    Ok(HttpResponse::Ok().json(calendar))
}

/// Calendar month as an HTML fragment
#[utoipa::path(
    get,
    path = "/api/calendar/{year}/{month}/fragment",
    params(
        ("year", Path, description = "Calendar year"),
        ("month", Path, description = "Month, 1-12"),
        CalendarQuery
    ),
    responses(
        (status = 200, description = "HTML table", content_type = "text/html"),
        (status = 400, description = "Invalid month or day")
    ),
    tag = "Calendar",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn get_calendar_fragment(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
    path: web::Path<(i32, u32)>,
    query: web::Query<CalendarQuery>,
) -> Result<HttpResponse, AppError> {
    let (year, month) = path.into_inner();
    let html = render_fragment(
        pool.get_ref(),
        &config,
        &auth,
        query.user,
        year,
        month,
        query.day,
    )
    .await?;
    Ok(HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(html))
}

/// Calendar fragment inside the AJAX envelope
///
/// Missing year or month fall back to the current date.
#[utoipa::path(
    post,
    path = "/api/ajax/calendar",
    request_body(content = CalendarForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Envelope carrying the calendar", body = AjaxResponse)
    ),
    tag = "Calendar",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn ajax_calendar(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
    form: web::Form<CalendarForm>,
) -> Result<HttpResponse, AppError> {
    respond(calendar_envelope(pool.get_ref(), &config, &auth, &form).await)
}

async fn calendar_envelope(
    pool: &MySqlPool,
    config: &Config,
    auth: &AuthUser,
    form: &CalendarForm,
) -> Result<AjaxResponse, AppError> {
    let today = Local::now().date_naive();
    let target = optional_field(form.eeid.as_deref(), "Invalid user")?;
    let year = optional_field(form.year.as_deref(), "Invalid year")?.unwrap_or(today.year());
    let month = optional_field(form.month.as_deref(), "Invalid month")?.unwrap_or(today.month());

    let html = render_fragment(pool, config, auth, target, year, month, None).await?;
    Ok(AjaxResponse::with_calendar(html))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn navigation_targets_the_fragment_route() {
        let link = |m| fragment_link("/api", 7, m);
        let html = build_month(2012, 12, None, &[]).unwrap().to_html(link);
        assert!(html.contains("href=\"/api/calendar/2012/11/fragment?user=7\""));
        assert!(html.contains("href=\"/api/calendar/2013/1/fragment?user=7\""));
        assert!(!html.contains("href=\"/api/calendar/2013/1\""));
    }
}
