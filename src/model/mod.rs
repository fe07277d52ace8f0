pub mod authorization;
pub mod daytype;
pub mod role;
pub mod tracking_entry;
pub mod user;
