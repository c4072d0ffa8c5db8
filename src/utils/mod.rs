//! Utility modules for tablekeeper

pub mod auth;
pub mod dates;
pub mod tools;
