use std::str::FromStr;

use actix_web::{HttpResponse, web};
use chrono::{Datelike, NaiveDate, NaiveTime};
use serde::Deserialize;
use sqlx::MySqlPool;
use tracing::{debug, info};
use utoipa::ToSchema;

use crate::api::calendar::render_fragment;
use crate::api::envelope::{AjaxResponse, respond};
use crate::api::optional_field;
use crate::auth::auth::AuthUser;
use crate::config::Config;
use crate::error::AppError;
use crate::model::daytype::DayType;
use crate::repo::entries::{self, EntryInput};
use crate::tracker::time::{parse_clock, parse_date, validate_time};

#[derive(Debug, Deserialize, ToSchema)]
pub struct EntryForm {
    #[schema(example = "2012-01-02")]
    pub entry_date: String,
    #[schema(example = "09:00")]
    pub start_time: String,
    #[schema(example = "17:00")]
    pub end_time: String,
    #[schema(example = "WKDAY")]
    pub daytype: String,
    #[serde(default)]
    #[schema(example = "00:15")]
    pub breaks: String,
    /// User to act on; defaults to the caller.
    #[serde(default)]
    pub eeid: Option<String>,
    /// Entry being changed.
    #[serde(rename = "hidden-id", default)]
    pub hidden_id: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct DeleteEntryForm {
    #[serde(rename = "hidden-id", default)]
    pub hidden_id: Option<String>,
    pub entry_date: String,
    #[serde(default)]
    pub eeid: Option<String>,
}

/// Day-type codes accepted for storage, case-insensitively.
pub(crate) fn parse_daytype(raw: &str) -> Result<DayType, AppError> {
    let daytype = DayType::from_str(&raw.trim().to_uppercase())
        .map_err(|_| AppError::validation("Invalid day type"))?;
    if !daytype.is_storable() {
        return Err(AppError::validation("Weekend days cannot be stored"));
    }
    Ok(daytype)
}

impl EntryForm {
    fn parse(&self) -> Result<EntryInput, AppError> {
        let entry_date = parse_date(&self.entry_date)?;
        if !validate_time(&self.start_time, &self.end_time)? {
            return Err(AppError::validation("Start time after end time"));
        }
        let breaks = match self.breaks.trim() {
            "" => NaiveTime::MIN,
            raw => parse_clock(raw)?,
        };

        Ok(EntryInput {
            entry_date,
            start_time: parse_clock(&self.start_time)?,
            end_time: parse_clock(&self.end_time)?,
            breaks,
            daytype: parse_daytype(&self.daytype)?,
        })
    }
}

/// Calendar of the entry's month with the entry's day selected.
async fn calendar_for(
    pool: &MySqlPool,
    config: &Config,
    auth: &AuthUser,
    user_id: u64,
    date: NaiveDate,
) -> Result<AjaxResponse, AppError> {
    let html = render_fragment(
        pool,
        config,
        auth,
        Some(user_id),
        date.year(),
        date.month(),
        Some(date.day()),
    )
    .await?;
    Ok(AjaxResponse::with_calendar(html))
}

/// Add entry
#[utoipa::path(
    post,
    path = "/api/ajax/add_entry",
    request_body(content = EntryForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Envelope; on success carries the re-rendered calendar", body = AjaxResponse,
            example = json!({"success": false, "error": "There is a duplicate entry for this value"})),
        (status = 403, description = "User is not managed by the caller"),
        (status = 404, description = "Unknown user")
    ),
    tag = "Entry",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn add_entry(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
    form: web::Form<EntryForm>,
) -> Result<HttpResponse, AppError> {
    respond(add(pool.get_ref(), &config, &auth, &form).await)
}

async fn add(
    pool: &MySqlPool,
    config: &Config,
    auth: &AuthUser,
    form: &EntryForm,
) -> Result<AjaxResponse, AppError> {
    let input = form.parse()?;
    let target = optional_field(form.eeid.as_deref(), "Invalid user")?;
    let user = auth.authorize(pool, target.unwrap_or(auth.user_id)).await?;

    let id = entries::insert(pool, user.id, &input).await?;
    info!(entry = id, user = user.id, date = %input.entry_date, "Entry added");

    calendar_for(pool, config, auth, user.id, input.entry_date).await
}

/// Change entry
///
/// Only entries owned by the target user can be changed.
#[utoipa::path(
    post,
    path = "/api/ajax/change_entry",
    request_body(content = EntryForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Envelope; on success carries the re-rendered calendar", body = AjaxResponse),
        (status = 404, description = "Unknown user or entry")
    ),
    tag = "Entry",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn change_entry(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
    form: web::Form<EntryForm>,
) -> Result<HttpResponse, AppError> {
    respond(change(pool.get_ref(), &config, &auth, &form).await)
}

async fn change(
    pool: &MySqlPool,
    config: &Config,
    auth: &AuthUser,
    form: &EntryForm,
) -> Result<AjaxResponse, AppError> {
    let input = form.parse()?;
    let target = optional_field(form.eeid.as_deref(), "Invalid user")?;
    let user = auth.authorize(pool, target.unwrap_or(auth.user_id)).await?;

    match optional_field::<u64>(form.hidden_id.as_deref(), "Invalid entry")? {
        Some(id) => {
            entries::update(pool, id, user.id, &input).await?;
            info!(entry = id, user = user.id, "Entry changed");
        }
        None => debug!(user = user.id, "Change request without entry id"),
    }

    calendar_for(pool, config, auth, user.id, input.entry_date).await
}

/// Delete entry
#[utoipa::path(
    post,
    path = "/api/ajax/delete_entry",
    request_body(content = DeleteEntryForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Envelope; on success carries the re-rendered calendar", body = AjaxResponse)
    ),
    tag = "Entry",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn delete_entry(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
    form: web::Form<DeleteEntryForm>,
) -> Result<HttpResponse, AppError> {
    respond(delete(pool.get_ref(), &config, &auth, &form).await)
}

async fn delete(
    pool: &MySqlPool,
    config: &Config,
    auth: &AuthUser,
    form: &DeleteEntryForm,
) -> Result<AjaxResponse, AppError> {
    let entry_date = parse_date(&form.entry_date)?;
    let target = optional_field(form.eeid.as_deref(), "Invalid user")?;
    let user = auth.authorize(pool, target.unwrap_or(auth.user_id)).await?;

    if let Some(id) = optional_field::<u64>(form.hidden_id.as_deref(), "Invalid entry")? {
        let removed = entries::delete(pool, id, user.id).await?;
        info!(entry = id, user = user.id, removed, "Entry delete requested");
    }

    calendar_for(pool, config, auth, user.id, entry_date).await
}
