//! Database table operations

mod meta_table;
mod user_table;

pub use meta_table::MetaTable;
pub use user_table::UserTable;
