//! User model

use serde::{Deserialize, Serialize};

/// User roles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Admin,
    #[default]
    User,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Admin => "admin",
            UserRole::User => "user",
        }
    }
}

/// An account allowed to log in
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Database ID
    pub id: i64,
    pub username: String,
    /// Password hash (not serialized to JSON)
    #[serde(skip_serializing, default)]
    pub password: String,
    #[serde(default)]
    pub roles: Vec<UserRole>,
    /// Extra metadata
    #[serde(default)]
    pub extra: serde_json::Value,
}

impl User {
    pub fn with_role(username: String, password_hash: String, role: UserRole) -> Self {
        Self {
            id: 0,
            username,
            password: password_hash,
            roles: vec![role],
            extra: serde_json::Value::Null,
        }
    }

    /// Check if user is admin
    pub fn is_admin(&self) -> bool {
        self.roles.contains(&UserRole::Admin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_names() {
        assert_eq!(UserRole::Admin.as_str(), "admin");
        assert_eq!(UserRole::User.as_str(), "user");
        assert_eq!(UserRole::default(), UserRole::User);
    }

    #[test]
    fn test_password_not_serialized() {
        let user = User::with_role("root".to_string(), "secret-hash".to_string(), UserRole::Admin);
        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("secret-hash"));
        assert!(json.contains("\"admin\""));
        assert!(user.is_admin());
    }
}
