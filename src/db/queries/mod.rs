//! Database queries

pub mod activity_log;
pub mod landlord;
