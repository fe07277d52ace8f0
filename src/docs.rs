use crate::api::calendar::CalendarForm;
use crate::api::entry::{DeleteEntryForm, EntryForm};
use crate::api::envelope::AjaxResponse;
use crate::api::user::{AddUserForm, MassHolidaysForm, UserData, UserIdForm};
use crate::model::daytype::DayType;
use crate::model::role::Role;
use crate::model::tracking_entry::TrackingEntry;
use crate::models::{LoginReqDto, LoginResponse};
use crate::tracker::balance::BalanceSummary;
use crate::tracker::calendar::{CalendarCell, CalendarMonth, MonthRef};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Time Tracker API",
        version = "1.0.0",
        description = r#"
## Employee Time & Holiday Tracking

Managers keep daily time entries for the people they look after, review
them on a month calendar and export holiday/overtime reports.

### Key Features
- **Calendar**: week-structured month grid, as JSON or as an HTML fragment
- **Entries**: add, change and delete daily entries through AJAX forms
- **Users**: manage subordinate accounts and bulk-edit holidays
- **Balances**: holiday balance and overtime for a year or month
- **Reporting**: CSV downloads scoped to the caller's team

### Security
Everything except `/auth/*` needs a **JWT Bearer** access token.

### Response Format
AJAX endpoints always answer `{"success": bool, "error": str, "calendar"?: str}`.
Input and uniqueness problems come back inside that envelope with HTTP 200;
unknown records and permission problems use 404/403.
"#,
    ),
    paths(
        crate::auth::handlers::login,
        crate::auth::handlers::refresh_token,
        crate::auth::handlers::logout,

        crate::api::calendar::get_calendar,
        crate::api::calendar::get_calendar_fragment,
        crate::api::calendar::ajax_calendar,

        crate::api::entry::add_entry,
        crate::api::entry::change_entry,
        crate::api::entry::delete_entry,

        crate::api::user::get_user_data,
        crate::api::user::add_user,
        crate::api::user::edit_user,
        crate::api::user::delete_user,
        crate::api::user::mass_holidays,

        crate::api::balance::get_balance,

        crate::api::reporting::all_holiday_data,
        crate::api::reporting::holiday_data,
        crate::api::reporting::ot_by_month,
        crate::api::reporting::ot_by_year,
        crate::api::reporting::holidays_for_year
    ),
    components(
        schemas(
            LoginReqDto,
            LoginResponse,
            AjaxResponse,
            CalendarForm,
            CalendarMonth,
            CalendarCell,
            MonthRef,
            TrackingEntry,
            DayType,
            Role,
            EntryForm,
            DeleteEntryForm,
            UserIdForm,
            UserData,
            AddUserForm,
            MassHolidaysForm,
            BalanceSummary
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Auth", description = "Login and token rotation"),
        (name = "Calendar", description = "Month calendar"),
        (name = "Entry", description = "Daily tracking entries"),
        (name = "User", description = "Subordinate account management"),
        (name = "Balance", description = "Holiday and overtime balances"),
        (name = "Reporting", description = "CSV reports"),
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn documents_every_route() {
        let doc = ApiDoc::openapi();
        for path in [
            "/auth/login",
            "/api/calendar/{year}/{month}",
            "/api/ajax/add_entry",
            "/api/ajax/mass_holidays",
            "/api/balance/{user}/{year}",
            "/api/reporting/holidays_for_year/{year}",
        ] {
            assert!(doc.paths.paths.contains_key(path), "{path}");
        }
        let components = doc.components.unwrap();
        assert!(components.security_schemes.contains_key("bearer_auth"));
    }
}
