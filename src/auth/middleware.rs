use actix_web::middleware::Next;
use actix_web::{
    Error, HttpMessage, HttpResponse,
    body::BoxBody,
    dev::{ServiceRequest, ServiceResponse},
    web::Data,
};
use serde_json::json;

use crate::auth::auth::AuthUser;
use crate::auth::jwt::verify_token;
use crate::config::Config;

fn unauthorized(req: ServiceRequest, body: serde_json::Value) -> ServiceResponse<BoxBody> {
    let resp = HttpResponse::Unauthorized().json(body);
    req.into_response(resp.map_into_boxed_body())
}

pub async fn auth_middleware(
    req: ServiceRequest,
    next: Next<BoxBody>,
) -> Result<ServiceResponse<BoxBody>, Error> {
    let config = req
        .app_data::<Data<Config>>()
        .ok_or_else(|| actix_web::error::ErrorInternalServerError("App config missing"))?;

    let header_value = match req.headers().get("Authorization") {
        Some(h) => h.to_str().map_err(|_| {
            actix_web::error::ErrorUnauthorized(
                json!({"error": "Invalid Authorization header encoding"}),
            )
        })?,
        None => {
            return Ok(unauthorized(req, json!({"error": "Missing Authorization header"})));
        }
    };

    let token = match header_value.strip_prefix("Bearer ") {
        Some(t) => t,
        None => {
            return Ok(unauthorized(
                req,
                json!({"error": "Authorization header must start with Bearer"}),
            ));
        }
    };

    let auth_user = match verify_token(token, &config.jwt_secret) {
        Ok(claims) => AuthUser::try_from(claims),
        Err(e) => {
            return Ok(unauthorized(
                req,
                json!({"error": "Invalid or expired token", "details": e}),
            ));
        }
    };

    let auth_user = match auth_user {
        Ok(user) => user,
        Err(e) => return Ok(unauthorized(req, json!({"error": e}))),
    };

    req.extensions_mut().insert(auth_user);

    next.call(req).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::jwt::{generate_access_token, generate_refresh_token};
    use actix_web::{App, http::StatusCode, middleware::from_fn, test, web};

    async fn whoami(user: AuthUser) -> HttpResponse {
        HttpResponse::Ok().body(user.username)
    }

    macro_rules! app {
        () => {
            test::init_service(
                App::new()
                    .app_data(Data::new(Config::for_tests()))
                    .service(
                        web::scope("/api")
                            .wrap(from_fn(auth_middleware))
                            .route("/whoami", web::get().to(whoami)),
                    ),
            )
            .await
        };
    }

    #[actix_web::test]
    async fn missing_header_is_unauthorized() {
        let app = app!();
        let req = test::TestRequest::get().uri("/api/whoami").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn non_bearer_scheme_is_unauthorized() {
        let app = app!();
        let req = test::TestRequest::get()
            .uri("/api/whoami")
            .insert_header(("Authorization", "Basic dXNlcjpwYXNz"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn access_token_reaches_handler() {
        let app = app!();
        let token =
            generate_access_token(9, "test.user9@test.com", 2, "test-secret", 60).unwrap();
        let req = test::TestRequest::get()
            .uri("/api/whoami")
            .insert_header(("Authorization", format!("Bearer {token}")))
            .to_request();
        let body = test::call_and_read_body(&app, req).await;
        assert_eq!(body, "test.user9@test.com");
    }

    #[actix_web::test]
    async fn refresh_token_is_refused() {
        let app = app!();
        let (token, _) =
            generate_refresh_token(9, "test.user9@test.com", 2, "test-secret", 60).unwrap();
        let req = test::TestRequest::get()
            .uri("/api/whoami")
            .insert_header(("Authorization", format!("Bearer {token}")))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }
}
