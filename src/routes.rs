use crate::{
    api::{balance, calendar, entry, reporting, user},
    auth::{handlers, middleware::auth_middleware},
    config::Config,
};
use actix_governor::{
    Governor, GovernorConfigBuilder, PeerIpKeyExtractor, governor::middleware::NoOpMiddleware,
};
use actix_web::{middleware::from_fn, web};
use std::sync::Arc;

// Helper to build per-route limiter
fn build_limiter(requests_per_min: u32) -> Governor<PeerIpKeyExtractor, NoOpMiddleware> {
    let requests_per_min = requests_per_min.max(1);
    let per_ms = (60_000 / u64::from(requests_per_min)).max(1);
    let cfg = GovernorConfigBuilder::default()
        .per_millisecond(per_ms)
        .burst_size(requests_per_min)
        .key_extractor(PeerIpKeyExtractor)
        .finish()
        .unwrap_or_default();
    Governor::new(&cfg)
}

pub fn configure(cfg: &mut web::ServiceConfig, config: Config) {
    let login_limiter = Arc::new(build_limiter(config.rate_login_per_min));
    let refresh_limiter = Arc::new(build_limiter(config.rate_refresh_per_min));
    let protected_limiter = Arc::new(build_limiter(config.rate_protected_per_min));

    // Public routes
    cfg.service(
        web::scope("/auth")
            .service(
                web::resource("/login")
                    .wrap(login_limiter.clone())
                    .route(web::post().to(handlers::login)),
            )
            .service(
                web::resource("/refresh")
                    .wrap(refresh_limiter.clone())
                    .route(web::post().to(handlers::refresh_token)),
            )
            .service(
                web::resource("/logout")
                    .wrap(login_limiter.clone())
                    .route(web::post().to(handlers::logout)),
            ),
    );

    // Protected routes
    cfg.service(
        web::scope(&config.api_prefix)
            .wrap(from_fn(auth_middleware)) // authentication
            .wrap(protected_limiter) // rate limiting
            .service(
                web::scope("/calendar")
                    // /calendar/{year}/{month}
                    .service(
                        web::resource("/{year}/{month}")
                            .route(web::get().to(calendar::get_calendar)),
                    )
                    // /calendar/{year}/{month}/fragment
                    .service(
                        web::resource("/{year}/{month}/fragment")
                            .route(web::get().to(calendar::get_calendar_fragment)),
                    ),
            )
            .service(
                web::resource("/balance/{user}/{year}")
                    .route(web::get().to(balance::get_balance)),
            )
            .service(
                web::scope("/ajax")
                    .route("/calendar", web::post().to(calendar::ajax_calendar))
                    .route("/add_entry", web::post().to(entry::add_entry))
                    .route("/change_entry", web::post().to(entry::change_entry))
                    .route("/delete_entry", web::post().to(entry::delete_entry))
                    .route("/get_user_data", web::post().to(user::get_user_data))
                    .route("/add_user", web::post().to(user::add_user))
                    .route("/edit_user", web::post().to(user::edit_user))
                    .route("/delete_user", web::post().to(user::delete_user))
                    .route("/mass_holidays", web::post().to(user::mass_holidays)),
            )
            .service(
                web::scope("/reporting")
                    .route(
                        "/all_holiday_data/{who}",
                        web::get().to(reporting::all_holiday_data),
                    )
                    .route(
                        "/holiday_data/{year}/{month}",
                        web::get().to(reporting::holiday_data),
                    )
                    .route(
                        "/ot_by_month/{year}/{month}",
                        web::get().to(reporting::ot_by_month),
                    )
                    .route("/ot_by_year/{year}", web::get().to(reporting::ot_by_year))
                    .route(
                        "/holidays_for_year/{year}",
                        web::get().to(reporting::holidays_for_year),
                    ),
            ),
    );
}

// LOGIN
//  ├─ access_token (15 min)
//  └─ refresh_token (7 days)

// API REQUEST
//  └─ Authorization: Bearer access_token

// ACCESS EXPIRED
//  └─ POST /auth/refresh with refresh_token
//       └─ returns new access_token + rotated refresh_token

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{App, http::StatusCode, test, web::Data};
    use sqlx::MySqlPool;

    #[actix_web::test]
    async fn protected_scope_requires_token() {
        let config = Config::for_tests();
        let app = test::init_service(
            App::new()
                .app_data(Data::new(config.clone()))
                .configure(|cfg| configure(cfg, config.clone())),
        )
        .await;

        for uri in [
            "/api/calendar/2012/1",
            "/api/balance/1/2012",
            "/api/reporting/ot_by_year/2012",
        ] {
            let req = test::TestRequest::get()
                .uri(uri)
                .peer_addr("127.0.0.1:12345".parse().unwrap())
                .to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::UNAUTHORIZED, "{uri}");
        }
    }

    #[actix_web::test]
    async fn logout_without_token_is_no_content() {
        let config = Config::for_tests();
        // never connects; logout without a token does not touch the database
        let pool = MySqlPool::connect_lazy(&config.database_url).unwrap();
        let app = test::init_service(
            App::new()
                .app_data(Data::new(pool))
                .app_data(Data::new(config.clone()))
                .configure(|cfg| configure(cfg, config.clone())),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/auth/logout")
            .peer_addr("127.0.0.1:12345".parse().unwrap())
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    }
}
