//! Interactive CLI tools

use anyhow::{Context, Result};
use std::fs;
use std::io::{self, Write};
use std::path::Path;

use crate::config::UserConfig;
use crate::core::{Authenticator, LoginError};
use crate::db::DbEngine;
use crate::models::{User, UserRole};
use crate::utils::auth::generate_random_string;

/// Prompt for credentials and log in
pub async fn login(auth: &Authenticator, username: Option<String>) -> Result<User> {
    println!("=== tablekeeper login ===\n");

    let username = match username {
        Some(u) => u,
        None => prompt_line("Username: ")?,
    };
    let password = prompt_password("Password: ")?;

    match auth.authenticate(&username, &password).await {
        Ok(user) => {
            if user.is_admin() {
                println!("\nWelcome, {} (admin).", user.username);
            } else {
                println!("\nWelcome, {}.", user.username);
            }
            Ok(user)
        }
        Err(LoginError::Other(e)) => Err(e),
        Err(e) => Err(anyhow::anyhow!("Login failed: {}", e)),
    }
}

/// Create an account, prompting for its password
pub async fn add_user(auth: &Authenticator, username: &str, role: UserRole) -> Result<()> {
    let password = prompt_password("Password: ")?;
    let confirm = prompt_password("Confirm password: ")?;
    if password != confirm {
        anyhow::bail!("Passwords do not match");
    }

    auth.register(username, &password, role).await?;
    println!("User '{}' created.", username);
    Ok(())
}

/// Password reset tool
pub async fn password_reset(auth: &Authenticator) -> Result<()> {
    println!("=== tablekeeper password reset ===\n");

    let username = prompt_line("Username: ")?;
    if username.is_empty() {
        println!("Error: Username cannot be empty");
        return Ok(());
    }

    let password = prompt_password("New password: ")?;
    if password.is_empty() {
        println!("Error: Password cannot be empty");
        return Ok(());
    }

    let confirm = prompt_password("Confirm password: ")?;
    if password != confirm {
        println!("Error: Passwords do not match");
        return Ok(());
    }

    if auth.change_password(&username, &password).await? {
        println!("\nPassword updated successfully for user: {}", username);
    } else {
        println!("Error: User '{}' not found", username);
    }

    Ok(())
}

/// Interactive first-run setup: table types and the admin account
pub async fn interactive_setup(auth: &Authenticator, config: &mut UserConfig) -> Result<()> {
    println!("=== tablekeeper setup ===\n");

    println!("Allowed table types, comma-separated (leave empty to allow any):");
    let types = prompt_line("Table types: ")?;
    let types: Vec<String> = types
        .split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
        .collect();
    if !types.is_empty() {
        config.table_types = types;
    }
    config.ensure_server_id();
    config.save()?;

    println!("\nCreate admin user:");
    let username = prompt_line("Username [admin]: ")?;
    let username = if username.is_empty() {
        "admin".to_string()
    } else {
        username
    };

    let password = prompt_password("Password: ")?;
    let confirm = prompt_password("Confirm password: ")?;
    if password != confirm {
        println!("Error: passwords do not match");
        return Ok(());
    }

    match auth.register(&username, &password, UserRole::Admin).await {
        Ok(_) => println!("Admin user '{}' created.", username),
        Err(e) => println!("Skipping admin creation: {}", e),
    }

    println!("\nSetup complete.");
    Ok(())
}

#[derive(serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct SetupFile {
    #[serde(flatten)]
    config: UserConfig,
    admin_username: Option<String>,
    admin_password: Option<String>,
}

/// Read a setup file, returning its config and optional admin credentials.
///
/// A username without a password gets a generated one.
fn read_setup_file(path: &Path) -> Result<(UserConfig, Option<(String, String, bool)>)> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("Failed to read setup file: {}", path.display()))?;
    let setup: SetupFile = serde_json::from_str(&data).context("Invalid setup file JSON")?;

    let admin = setup.admin_username.map(|user| match setup.admin_password {
        Some(pass) => (user, pass, false),
        None => (user, generate_random_string(16), true),
    });

    Ok((setup.config, admin))
}

/// Apply setup from a JSON file (skips interactive prompts)
pub async fn apply_setup_file(path: &Path, db_override: Option<&Path>) -> Result<UserConfig> {
    let (mut config, admin) = read_setup_file(path)?;

    // keep the existing salt so stored passwords stay valid
    if config.server_id.is_empty() {
        config.server_id = UserConfig::load()?.server_id;
    }
    config.ensure_server_id();
    config.save()?;

    let db_path = match db_override {
        Some(p) => p.to_path_buf(),
        None => config.db_path()?,
    };
    let engine = DbEngine::connect(&db_path).await?;
    let auth = Authenticator::new(engine, config.server_id.clone());
    if let Some((user, pass, generated)) = admin {
        match auth.register(&user, &pass, UserRole::Admin).await {
            Ok(_) => {
                println!("Admin user '{}' created from setup file.", user);
                if generated {
                    println!("Generated password: {}", pass);
                }
            }
            Err(e) => println!("Skipping admin creation: {}", e),
        }
    }

    Ok(config)
}

fn read_input(prompt: &str) -> Result<String> {
    print!("{}", prompt);
    io::stdout().flush()?;
    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(input)
}

fn prompt_line(prompt: &str) -> Result<String> {
    Ok(read_input(prompt)?.trim().to_string())
}

// input is echoed; hiding it would require a crate like rpassword
fn prompt_password(prompt: &str) -> Result<String> {
    Ok(strip_line_ending(&read_input(prompt)?).to_string())
}

/// Drop the trailing newline only; spaces are part of a password
fn strip_line_ending(input: &str) -> &str {
    input.trim_end_matches(['\r', '\n'])
}
