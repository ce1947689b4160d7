//! Type definitions

pub mod activity_log;
pub mod import;
pub mod landlord;
pub mod messages;

pub use activity_log::*;
pub use import::*;
pub use landlord::*;
pub use messages::*;
