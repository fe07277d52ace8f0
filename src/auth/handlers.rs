use actix_web::{HttpRequest, HttpResponse, web};
use sqlx::MySqlPool;
use sqlx::mysql::MySqlQueryResult;
use tracing::{debug, error, info, instrument};

use crate::{
    auth::{
        jwt::{generate_access_token, generate_refresh_token, verify_token},
        password::verify_password,
    },
    config::Config,
    error::AppError,
    model::user::User,
    models::{Claims, LoginReqDto, LoginResponse, TokenType},
    repo::users,
    utils::login_cache,
};

fn bearer(req: &HttpRequest) -> Option<&str> {
    req.headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
}

fn token_error(e: jsonwebtoken::errors::Error) -> AppError {
    error!(error = %e, "Failed to sign token");
    AppError::Internal(e.to_string())
}

async fn store_refresh_token(pool: &MySqlPool, claims: &Claims) -> Result<(), AppError> {
    sqlx::query(
        r#"
        INSERT INTO refresh_tokens (user_id, jti, expires_at)
        VALUES (?, ?, FROM_UNIXTIME(?))
        "#,
    )
    .bind(claims.user_id)
    .bind(&claims.jti)
    .bind(claims.exp as i64)
    .execute(pool)
    .await?;
    Ok(())
}

/// Signs an access/refresh pair for `user` with its current role.
fn issue_tokens(user: &User, config: &Config) -> Result<(LoginResponse, Claims), AppError> {
    let role = user.role().id();
    let access_token = generate_access_token(
        user.id,
        &user.user_id,
        role,
        &config.jwt_secret,
        config.access_token_ttl,
    )
    .map_err(token_error)?;

    let (refresh_token, refresh_claims) = generate_refresh_token(
        user.id,
        &user.user_id,
        role,
        &config.jwt_secret,
        config.refresh_token_ttl,
    )
    .map_err(token_error)?;

    Ok((
        LoginResponse {
            access_token,
            refresh_token,
        },
        refresh_claims,
    ))
}

/// Single-use check after the conditional revoke.
fn lost_rotation(revoked: &MySqlQueryResult) -> bool {
    revoked.rows_affected() == 0
}

const REVOKE_UNUSED: &str = "UPDATE refresh_tokens SET revoked = 1 WHERE id = ? AND revoked = 0";

/// Login
#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginReqDto,
    responses(
        (status = 200, description = "Token pair issued", body = LoginResponse),
        (status = 400, description = "Missing login or password"),
        (status = 401, description = "Invalid credentials")
    ),
    tag = "Auth"
)]
#[instrument(
    name = "auth_login",
    skip(pool, config, user),
    fields(login = %user.user_id)
)]
pub async fn login(
    user: web::Json<LoginReqDto>,
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
) -> Result<HttpResponse, AppError> {
    info!("Login request received");

    if user.user_id.trim().is_empty() || user.password.is_empty() {
        info!("Validation failed: empty login or password");
        return Ok(HttpResponse::BadRequest().body("Login and password required"));
    }

    debug!("Fetching user from database");

    let db_user = match users::find_by_login(pool.get_ref(), &user.user_id).await? {
        Some(u) => {
            debug!(user_id = u.id, "User found");
            u
        }
        None => {
            info!("Invalid credentials: user not found");
            return Ok(HttpResponse::Unauthorized().body("Invalid credentials"));
        }
    };

    if let Err(e) = verify_password(&user.password, &db_user.password) {
        info!(error = %e, "Invalid credentials: password mismatch");
        return Ok(HttpResponse::Unauthorized().body("Invalid credentials"));
    }

    debug!("Password verified");

    let (tokens, refresh_claims) = issue_tokens(&db_user, &config)?;

    debug!(user_id = db_user.id, jti = %refresh_claims.jti, "Storing refresh token");
    store_refresh_token(pool.get_ref(), &refresh_claims).await?;

    if let Err(e) = users::touch_last_login(pool.get_ref(), db_user.id).await {
        // not fatal for the login itself
        error!(error = %e, "Failed to update last_login_at");
    }
    login_cache::mark_taken(&db_user.user_id).await;

    info!("Login successful");

    Ok(HttpResponse::Ok().json(tokens))
}

/// Rotate refresh token
#[utoipa::path(
    post,
    path = "/auth/refresh",
    responses(
        (status = 200, description = "New token pair", body = LoginResponse),
        (status = 401, description = "Missing, invalid or revoked refresh token")
    ),
    tag = "Auth",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn refresh_token(
    req: HttpRequest,
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
) -> Result<HttpResponse, AppError> {
    let token = match bearer(&req) {
        Some(t) => t,
        None => return Ok(HttpResponse::Unauthorized().body("No token")),
    };

    let claims = match verify_token(token, &config.jwt_secret) {
        Ok(c) => c,
        Err(_) => return Ok(HttpResponse::Unauthorized().finish()),
    };

    if claims.token_type != TokenType::Refresh {
        return Ok(HttpResponse::Unauthorized().finish());
    }

    let record = sqlx::query_as::<_, (u64, u64, i8)>(
        "SELECT id, user_id, revoked FROM refresh_tokens WHERE jti = ?",
    )
    .bind(&claims.jti)
    .fetch_optional(pool.get_ref())
    .await?;

    let (record_id, record_user) = match record {
        Some((id, user_id, 0)) => (id, user_id),
        _ => return Ok(HttpResponse::Unauthorized().finish()),
    };

    // a concurrent refresh with the same token loses here
    let revoked = sqlx::query(REVOKE_UNUSED)
        .bind(record_id)
        .execute(pool.get_ref())
        .await?;
    if lost_rotation(&revoked) {
        info!(jti = %claims.jti, "Refresh token already used");
        return Ok(HttpResponse::Unauthorized().finish());
    }

    // role and login come from the account as it is now
    let Some(db_user) = users::find_by_id(pool.get_ref(), record_user).await? else {
        info!(user_id = record_user, "Refresh for a deleted account");
        return Ok(HttpResponse::Unauthorized().finish());
    };
    let (tokens, new_claims) = issue_tokens(&db_user, &config)?;
    store_refresh_token(pool.get_ref(), &new_claims).await?;
    debug!(user_id = db_user.id, role = %db_user.role(), "Refresh token rotated");

    Ok(HttpResponse::Ok().json(tokens))
}

/// Logout
#[utoipa::path(
    post,
    path = "/auth/logout",
    responses(
        (status = 204, description = "Refresh token revoked (idempotent)")
    ),
    tag = "Auth",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn logout(
    req: HttpRequest,
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
) -> HttpResponse {
    let claims = match bearer(&req).map(|t| verify_token(t, &config.jwt_secret)) {
        Some(Ok(c)) => c,
        _ => return HttpResponse::NoContent().finish(),
    };

    // only refresh tokens can log out
    if claims.token_type != TokenType::Refresh {
        return HttpResponse::NoContent().finish();
    }

    if let Err(e) = sqlx::query("UPDATE refresh_tokens SET revoked = 1 WHERE jti = ?")
        .bind(&claims.jti)
        .execute(pool.get_ref())
        .await
    {
        error!(error = %e, "Failed to revoke refresh token");
    }

    HttpResponse::NoContent().finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;
    use crate::model::role::Role;
    use crate::model::user::fixtures::user;

    #[test]
    fn tokens_carry_the_current_role() {
        let config = Config::for_tests();
        // account demoted since its previous token pair was issued
        let demoted = user(7, Role::User);
        let (tokens, refresh_claims) = issue_tokens(&demoted, &config).unwrap();

        let access = verify_token(&tokens.access_token, &config.jwt_secret).unwrap();
        assert_eq!(access.role, Role::User.id());
        assert_eq!(access.user_id, 7);
        assert_eq!(access.sub, "test.user7@test.com");
        assert_eq!(access.token_type, TokenType::Access);

        let refresh = verify_token(&tokens.refresh_token, &config.jwt_secret).unwrap();
        assert_eq!(refresh.role, Role::User.id());
        assert_eq!(refresh.jti, refresh_claims.jti);
    }

    #[test]
    fn refresh_tokens_are_single_use() {
        assert!(REVOKE_UNUSED.ends_with("AND revoked = 0"));
        // nothing revoked: another request already used the token
        assert!(lost_rotation(&MySqlQueryResult::default()));
    }

    #[test]
    fn bearer_prefix_is_required() {
        let req = TestRequest::default()
            .insert_header(("Authorization", "Bearer abc.def"))
            .to_http_request();
        assert_eq!(bearer(&req), Some("abc.def"));

        let req = TestRequest::default()
            .insert_header(("Authorization", "Token abc.def"))
            .to_http_request();
        assert_eq!(bearer(&req), None);
        assert_eq!(bearer(&TestRequest::default().to_http_request()), None);
    }
}
