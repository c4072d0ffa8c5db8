//! tablekeeper - spreadsheet-like tables kept in a local SQLite file
//!
//! Tables of named text columns are created, filled, read back and dropped
//! through the command line, with a metadata table tracking each table's
//! type and creation time, and password-checked user accounts.

mod config;
mod core;
mod db;
mod models;
mod serializers;
mod utils;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::config::{Paths, UserConfig};
use crate::core::{Authenticator, DataManager};
use crate::models::{TypeFilter, UserRole};
use crate::serializers::{
    render_table_data, render_text_table, rows_from_json, TableDataResponse, TableMetaResponse,
};

/// tablekeeper - local table manager
#[derive(Parser, Debug)]
#[command(name = "tablekeeper")]
#[command(version)]
#[command(about = "Store and retrieve spreadsheet-like tables in a local SQLite file")]
struct Args {
    /// Path to config directory
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Database file (overrides the configured dbFile)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List managed tables
    Tables {
        /// List every table in the database file, including internal ones
        #[arg(long)]
        all: bool,
    },

    /// Show table metadata, optionally filtered by type
    Info {
        /// Table type; "all" or "全部表格" selects every table
        #[arg(long = "type")]
        kind: Option<String>,

        #[arg(long)]
        json: bool,
    },

    /// Show the columns of a table
    Columns {
        table: String,

        /// Also show declared types
        #[arg(long)]
        types: bool,
    },

    /// Create a table
    Create {
        /// Table type
        kind: String,
        name: String,
        #[arg(required = true)]
        columns: Vec<String>,
    },

    /// Insert rows from a JSON file (an array of arrays)
    Insert {
        table: String,

        /// Comma-separated column names, in the order of each row's values
        #[arg(long, value_delimiter = ',', required = true)]
        columns: Vec<String>,

        #[arg(long)]
        rows: PathBuf,
    },

    /// Print a table's contents
    Show {
        table: String,

        #[arg(long)]
        json: bool,
    },

    /// Drop a table and its metadata
    Remove { table: String },

    /// Log in with a username and password
    Login {
        #[arg(long)]
        username: Option<String>,
    },

    /// Create a user account
    Useradd {
        username: String,

        #[arg(long)]
        admin: bool,
    },

    /// Reset a user's password
    PasswordReset,

    /// First-run setup
    Setup {
        /// JSON setup file to skip interactive prompts
        #[arg(long)]
        file: Option<PathBuf>,
    },

    /// Show database location, schema version and counts
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let log_level = if args.debug { "debug" } else { "info" };
    let filter = tracing_subscriber::EnvFilter::new(format!("{},sqlx=warn", log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();

    let paths = Paths::init(args.config)?;
    debug!("Config directory: {:?}", paths.config_dir());

    if let Command::Setup { file: Some(file) } = &args.command {
        utils::tools::apply_setup_file(file, args.db.as_deref()).await?;
        info!("Setup applied from {:?}", file);
        return Ok(());
    }

    let mut config = UserConfig::load()?;
    if config.ensure_server_id() {
        config.save()?;
    }

    let db_path = match args.db {
        Some(path) => path,
        None => config.db_path()?,
    };

    let manager = DataManager::open(&db_path)
        .await?
        .with_table_types(config.table_types.clone());
    let auth = Authenticator::new(manager.engine().clone(), config.server_id.clone());

    let result = run(args.command, &manager, &auth, &mut config, &db_path).await;
    manager.engine().close().await;
    result
}

async fn run(
    command: Command,
    manager: &DataManager,
    auth: &Authenticator,
    config: &mut UserConfig,
    db_path: &Path,
) -> Result<()> {
    match command {
        Command::Tables { all: true } => {
            for name in manager.get_tables().await? {
                println!("{}", name);
            }
        }
        Command::Tables { all: false } => {
            let mut rows = Vec::new();
            for name in manager.get_my_tables(&TypeFilter::All).await? {
                let Some(meta) = manager.get_table_info(&name).await? else {
                    continue;
                };
                let count = manager.row_count(&meta.name).await?;
                rows.push(vec![
                    meta.name.clone(),
                    meta.kind.clone(),
                    meta.created_at(),
                    count.to_string(),
                ]);
            }
            println!(
                "{}",
                render_text_table(&["name", "type", "created", "rows"], &rows)
            );
        }
        Command::Info { kind, json } => {
            let filter = TypeFilter::from(kind.as_deref());
            let mut infos = Vec::new();
            for meta in manager.get_my_tables_info(&filter).await? {
                let count = manager.row_count(&meta.name).await?;
                infos.push(TableMetaResponse::new(&meta, Some(count)));
            }

            if json {
                println!("{}", serde_json::to_string_pretty(&infos)?);
            } else {
                let rows: Vec<Vec<String>> = infos
                    .into_iter()
                    .map(|i| vec![i.name, i.kind, i.created, i.created_relative])
                    .collect();
                println!(
                    "{}",
                    render_text_table(&["name", "type", "created", "age"], &rows)
                );
            }
        }
        Command::Columns { table, types } => {
            let names = manager.get_column_names(&table).await?;
            if names.is_empty() {
                anyhow::bail!("Table '{}' has no columns or does not exist", table);
            }
            if types {
                let decl_types = manager.get_column_types(&table).await?;
                for name in names {
                    let decl_type = decl_types.get(&name).map(String::as_str).unwrap_or("");
                    println!("{}\t{}", name, decl_type);
                }
            } else {
                for name in names {
                    println!("{}", name);
                }
            }
        }
        Command::Create {
            kind,
            name,
            columns,
        } => {
            let meta = manager.create_table(&kind, &name, &columns).await?;
            println!("Created table '{}' ({}) at {}", meta.name, meta.kind, meta.created_at());
        }
        Command::Insert {
            table,
            columns,
            rows,
        } => {
            let content = std::fs::read_to_string(&rows)
                .with_context(|| format!("Failed to read rows file {}", rows.display()))?;
            let rows = rows_from_json(&content)?;
            let inserted = manager.insert_data(&table, &columns, &rows).await?;
            println!("Inserted {} rows into '{}'", inserted, table);
        }
        Command::Show { table, json } => {
            let data = manager.get_table(&table).await?;
            if json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&TableDataResponse::from(&data))?
                );
            } else {
                println!("{}", render_table_data(&data));
            }
        }
        Command::Remove { table } => {
            manager.remove_table(&table).await?;
            println!("Removed table '{}'", table);
        }
        Command::Login { username } => {
            utils::tools::login(auth, username).await?;
        }
        Command::Useradd { username, admin } => {
            let role = if admin { UserRole::Admin } else { UserRole::User };
            utils::tools::add_user(auth, &username, role).await?;
        }
        Command::PasswordReset => {
            utils::tools::password_reset(auth).await?;
        }
        Command::Setup { .. } => {
            if auth.has_users().await? {
                println!("Setup already done; users exist.");
            } else {
                utils::tools::interactive_setup(auth, config).await?;
            }
        }
        Command::Status => {
            let pool = manager.engine().pool();
            println!("database:       {}", db_path.display());
            println!("schema version: {}", db::get_migration_version(pool).await?);
            println!("managed tables: {}", db::MetaTable::count(pool).await?);
            println!("users:          {}", db::UserTable::count(pool).await?);
        }
    }

    Ok(())
}
