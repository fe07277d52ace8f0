use actix_web::{HttpResponse, web};
use serde::Deserialize;
use sqlx::MySqlPool;
use utoipa::IntoParams;

use crate::auth::auth::AuthUser;
use crate::config::Config;
use crate::error::AppError;
use crate::repo::entries;
use crate::tracker::balance::{BalanceSummary, Period, summarize};

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct BalanceQuery {
    /// Restrict the period to one month.
    pub month: Option<u32>,
}

/// Holiday and overtime balance
#[utoipa::path(
    get,
    path = "/api/balance/{user}/{year}",
    params(
        ("user", Path, description = "Database id of the user"),
        ("year", Path, description = "Calendar year"),
        BalanceQuery
    ),
    responses(
        (status = 200, description = "Balance for the period", body = BalanceSummary),
        (status = 400, description = "Invalid month"),
        (status = 403, description = "User is not managed by the caller"),
        (status = 404, description = "Unknown user")
    ),
    tag = "Balance",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn get_balance(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
    path: web::Path<(u64, i32)>,
    query: web::Query<BalanceQuery>,
) -> Result<HttpResponse, AppError> {
    let (user_id, year) = path.into_inner();
    let user = auth.authorize(pool.get_ref(), user_id).await?;

    let period = Period::of(year, query.month)?;
    let entries = entries::in_period(pool.get_ref(), user.id, &period).await?;

    Ok(HttpResponse::Ok().json(summarize(
        user.id,
        year,
        query.month,
        user.holiday_balance,
        user.shiftlength,
        &entries,
        &config.balance_rules,
    )))
}
