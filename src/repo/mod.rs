//! MySQL access for users, authorization links and tracking entries.

pub mod entries;
pub mod users;
