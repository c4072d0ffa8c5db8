//! Account login
//!
//! Checks a username and password against the `user` table. Password hashes
//! are salted with the configured server id.

use anyhow::{bail, Result};
use thiserror::Error;
use tracing::{info, warn};

use crate::db::{DbEngine, UserTable};
use crate::models::{User, UserRole};
use crate::utils::auth::{hash_password, verify_password};

/// Reasons a login attempt is refused
#[derive(Debug, Error)]
pub enum LoginError {
    #[error("username and password are required")]
    MissingCredentials,

    #[error("unknown user '{0}'")]
    UnknownUser(String),

    #[error("incorrect password")]
    BadPassword,

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Verifies credentials and manages accounts
#[derive(Debug, Clone)]
pub struct Authenticator {
    engine: DbEngine,
    salt: String,
}

impl Authenticator {
    pub fn new(engine: DbEngine, salt: impl Into<String>) -> Self {
        Self {
            engine,
            salt: salt.into(),
        }
    }

    /// Check `password` for `username`, returning the account on success
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<User, LoginError> {
        let username = username.trim();
        if username.is_empty() || password.is_empty() {
            return Err(LoginError::MissingCredentials);
        }

        let user = UserTable::get_by_username(self.engine.pool(), username)
            .await?
            .ok_or_else(|| LoginError::UnknownUser(username.to_string()))?;

        if !verify_password(password, &self.salt, &user.password) {
            warn!("Failed login for '{}'", username);
            return Err(LoginError::BadPassword);
        }

        info!("User '{}' logged in", username);
        Ok(user)
    }

    /// Create an account; fails if the username is taken
    pub async fn register(&self, username: &str, password: &str, role: UserRole) -> Result<User> {
        let username = username.trim();
        if username.is_empty() {
            bail!("Username cannot be empty");
        }
        if password.is_empty() {
            bail!("Password cannot be empty");
        }

        let pool = self.engine.pool();
        if UserTable::get_by_username(pool, username).await?.is_some() {
            bail!("User '{}' already exists", username);
        }

        let hash = hash_password(password, &self.salt);
        let mut user = User::with_role(username.to_string(), hash, role);
        user.id = UserTable::insert(pool, &user).await?;

        info!("Created {} account '{}'", role.as_str(), username);
        Ok(user)
    }

    /// Replace a user's password. Returns false when the user does not exist.
    pub async fn change_password(&self, username: &str, new_password: &str) -> Result<bool> {
        if new_password.is_empty() {
            bail!("Password cannot be empty");
        }

        let pool = self.engine.pool();
        match UserTable::get_by_username(pool, username.trim()).await? {
            Some(user) => {
                let hash = hash_password(new_password, &self.salt);
                UserTable::update_password(pool, user.id, &hash).await?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Check if any users exist
    pub async fn has_users(&self) -> Result<bool> {
        Ok(UserTable::count(self.engine.pool()).await? > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn authenticator() -> (Authenticator, TempDir) {
        let dir = TempDir::new().unwrap();
        let engine = DbEngine::connect(&dir.path().join("test.db")).await.unwrap();
        (Authenticator::new(engine, "server-id"), dir)
    }

    #[tokio::test]
    async fn test_login_flow() {
        let (auth, _dir) = authenticator().await;
        assert!(!auth.has_users().await.unwrap());

        auth.register("admin", "pw", UserRole::Admin).await.unwrap();
        assert!(auth.has_users().await.unwrap());

        let user = auth.authenticate(" admin ", "pw").await.unwrap();
        assert_eq!(user.username, "admin");
        assert!(user.is_admin());

        assert!(matches!(
            auth.authenticate("admin", "wrong").await,
            Err(LoginError::BadPassword)
        ));
        assert!(matches!(
            auth.authenticate("ghost", "pw").await,
            Err(LoginError::UnknownUser(_))
        ));
        assert!(matches!(
            auth.authenticate("admin", "").await,
            Err(LoginError::MissingCredentials)
        ));
    }

    #[tokio::test]
    async fn test_duplicate_register() {
        let (auth, _dir) = authenticator().await;
        auth.register("ann", "pw", UserRole::User).await.unwrap();
        assert!(auth.register("ann", "other", UserRole::User).await.is_err());
        assert!(auth.register("", "pw", UserRole::User).await.is_err());
    }

    #[tokio::test]
    async fn test_change_password() {
        let (auth, _dir) = authenticator().await;
        auth.register("ann", "old", UserRole::User).await.unwrap();

        assert!(auth.change_password("ann", "new").await.unwrap());
        assert!(!auth.change_password("bob", "new").await.unwrap());

        assert!(auth.authenticate("ann", "new").await.is_ok());
        assert!(matches!(
            auth.authenticate("ann", "old").await,
            Err(LoginError::BadPassword)
        ));
    }

    #[tokio::test]
    async fn test_salt_matters() {
        let (auth, _dir) = authenticator().await;
        auth.register("ann", "pw", UserRole::User).await.unwrap();

        let other = Authenticator::new(auth.engine.clone(), "another-server");
        assert!(matches!(
            other.authenticate("ann", "pw").await,
            Err(LoginError::BadPassword)
        ));
    }
}
