//! Core library functions for tablekeeper

pub mod data_manager;
mod error;
pub mod login;
pub mod sql;

pub use data_manager::DataManager;
pub use error::DataError;
pub use login::{Authenticator, LoginError};
