//! API handlers

pub mod analyze;
pub mod health;
