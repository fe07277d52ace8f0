//! Date, balance and reporting logic shared by the HTTP handlers.

pub mod balance;
pub mod calendar;
pub mod report;
pub mod subordinates;
pub mod time;
