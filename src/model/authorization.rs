use serde::Serialize;

use crate::model::role::Role;

/// `admin_id` manages `user_id`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, sqlx::FromRow)]
pub struct AuthLink {
    pub admin_id: u64,
    pub user_id: u64,
}

/// The parts of a user row that decide visibility.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct Member {
    pub id: u64,
    #[sqlx(rename = "user_type", try_from = "String")]
    pub role: Role,
    pub process: String,
}
