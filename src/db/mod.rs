//! Database module for tablekeeper
//!
//! This module handles all database operations using SQLx with SQLite.

mod engine;
mod migrations;
pub mod tables;

pub use engine::DbEngine;
pub use migrations::get_migration_version;
pub use tables::*;
