use actix_web::{FromRequest, HttpMessage, HttpRequest, dev::Payload, error::ErrorUnauthorized, web::Data};
use futures::future::{Ready, ready};
use sqlx::MySqlPool;
use tracing::debug;

use crate::auth::jwt::verify_token;
use crate::config::Config;
use crate::error::AppError;
use crate::model::role::Role;
use crate::model::user::User;
use crate::models::{Claims, TokenType};
use crate::repo::users;

/// The account a request acts as.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: u64,
    /// Login e-mail.
    pub username: String,
    pub role: Role,
}

impl TryFrom<Claims> for AuthUser {
    type Error = &'static str;

    fn try_from(claims: Claims) -> Result<Self, Self::Error> {
        if claims.token_type != TokenType::Access {
            return Err("Access token required");
        }
        let role = Role::from_id(claims.role).ok_or("Invalid role")?;
        Ok(AuthUser {
            user_id: claims.user_id,
            username: claims.sub,
            role,
        })
    }
}

impl FromRequest for AuthUser {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        // already resolved by the auth middleware
        if let Some(user) = req.extensions().get::<AuthUser>() {
            return ready(Ok(user.clone()));
        }

        let token = match req
            .headers()
            .get("Authorization")
            .and_then(|h| h.to_str().ok())
            .and_then(|h| h.strip_prefix("Bearer "))
        {
            Some(t) => t,
            None => return ready(Err(ErrorUnauthorized("Missing token"))),
        };

        let config = match req.app_data::<Data<Config>>() {
            Some(c) => c,
            None => {
                return ready(Err(
                    actix_web::error::ErrorInternalServerError("Config missing"),
                ));
            }
        };

        let claims = match verify_token(token, &config.jwt_secret) {
            Ok(c) => c,
            Err(_) => return ready(Err(ErrorUnauthorized("Invalid token"))),
        };

        ready(AuthUser::try_from(claims).map_err(ErrorUnauthorized))
    }
}

impl AuthUser {
    pub fn require_manager(&self) -> Result<(), AppError> {
        if self.role.sup_tl_or_admin() {
            Ok(())
        } else {
            Err(AppError::Forbidden("Managers only"))
        }
    }

    /// Loads `target_id` if this account may act on it.
    pub async fn authorize(&self, pool: &MySqlPool, target_id: u64) -> Result<User, AppError> {
        let target = users::get(pool, target_id).await?;
        if target.id == self.user_id {
            return Ok(target);
        }

        if users::org(pool).await?.can_manage(self.user_id, target.id) {
            Ok(target)
        } else {
            debug!(actor = self.user_id, target = target.id, "Access to user refused");
            Err(AppError::Forbidden("Not allowed to manage this user"))
        }
    }

    /// The account itself, re-read from the database.
    pub async fn current(&self, pool: &MySqlPool) -> Result<User, AppError> {
        users::get(pool, self.user_id).await
    }
}
