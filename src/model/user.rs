use chrono::{NaiveDate, NaiveTime};
use serde::Serialize;
use utoipa::ToSchema;

use crate::model::role::Role;

#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
pub struct User {
    #[schema(example = 7)]
    pub id: u64,

    /// Login e-mail, unique across all users.
    #[schema(example = "test.user@test.com")]
    pub user_id: String,

    #[schema(example = "test")]
    pub firstname: String,

    #[schema(example = "case")]
    pub lastname: String,

    #[serde(skip_serializing)]
    pub password: String,

    #[sqlx(try_from = "String")]
    pub user_type: Role,

    #[schema(example = "BG")]
    pub market: String,

    #[schema(example = "AP")]
    pub process: String,

    #[schema(example = "2012-01-01", value_type = String, format = "date")]
    pub start_date: NaiveDate,

    #[schema(example = "00:15:00", value_type = String)]
    pub breaklength: NaiveTime,

    #[schema(example = "07:45:00", value_type = String)]
    pub shiftlength: NaiveTime,

    #[schema(example = "00F20G")]
    pub job_code: String,

    #[schema(example = 20)]
    pub holiday_balance: i32,
}

impl User {
    pub fn name(&self) -> String {
        format!("{} {}", self.firstname, self.lastname)
    }

    pub fn role(&self) -> Role {
        self.user_type
    }
}
