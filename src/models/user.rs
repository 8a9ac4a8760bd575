use serde::{Deserialize, Serialize};

use super::UserId;

/// A local account. Passwords are stored and compared as plain text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub password: String,
    pub is_admin: bool,
}

/// Registration payload
#[derive(Debug, Clone, Deserialize)]
pub struct NewUser {
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub is_admin: bool,
}

/// Outward-facing user view without the password
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserResponse {
    pub id: UserId,
    pub username: String,
    pub is_admin: bool,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            is_admin: user.is_admin,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_drops_password() {
        let user = User {
            id: 1,
            username: "ana".to_string(),
            password: "hunter2".to_string(),
            is_admin: false,
        };

        let json = serde_json::to_value(UserResponse::from(user)).unwrap();
        assert_eq!(json["username"], "ana");
        assert!(json.get("password").is_none());
    }

    #[test]
    fn test_new_user_is_admin_defaults_false() {
        let new_user: NewUser =
            serde_json::from_str(r#"{"username":"ana","password":"pw"}"#).unwrap();
        assert!(!new_user.is_admin);
    }
}
