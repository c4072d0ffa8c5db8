//! Configuration module for tablekeeper
//!
//! This module contains the application configuration structures and path management.

mod paths;
mod user_config;

pub use paths::Paths;
pub use user_config::UserConfig;
