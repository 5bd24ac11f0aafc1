//! Command implementations

pub mod admin;
pub mod reports;
pub mod tokens;
