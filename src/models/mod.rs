//! Data models for tablekeeper

mod column;
mod table;
mod user;

pub use column::ColumnInfo;
pub use table::{TableData, TableMeta, TypeFilter};
pub use user::{User, UserRole};
