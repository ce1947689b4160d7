//! Business logic services

pub mod celebrations;
pub mod error_report;
pub mod import_service;
pub mod normalize;
pub mod validation;
