use std::sync::Arc;

use crate::{
    db::UserStore,
    error::{AppError, AppResult},
    models::{NewUser, User},
};

/// Registration and login against the local user store
///
/// Passwords are compared as plain text. This is not a security boundary.
#[derive(Clone)]
pub struct AccountService {
    users: Arc<dyn UserStore>,
}

impl AccountService {
    pub fn new(users: Arc<dyn UserStore>) -> Self {
        Self { users }
    }

    pub async fn register(&self, new_user: &NewUser) -> AppResult<User> {
        if new_user.username.trim().is_empty() || new_user.password.is_empty() {
            return Err(AppError::InvalidInput(
                "Username and password are required".to_string(),
            ));
        }

        let user = self.users.insert(new_user).await?;
        tracing::info!(user_id = user.id, username = %user.username, "User registered");
        Ok(user)
    }

    pub async fn login(&self, username: &str, password: &str) -> AppResult<User> {
        match self.users.find_by_credentials(username, password).await? {
            Some(user) => Ok(user),
            None => {
                tracing::info!(username = %username, "Rejected login");
                Err(AppError::InvalidCredentials)
            }
        }
    }

    pub async fn list_users(&self) -> AppResult<Vec<User>> {
        self.users.list().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{create_memory_pool, SqliteUserStore};

    async fn accounts() -> AccountService {
        let pool = create_memory_pool().await.unwrap();
        AccountService::new(Arc::new(SqliteUserStore::new(pool)))
    }

    fn new_user(username: &str, password: &str, is_admin: bool) -> NewUser {
        NewUser {
            username: username.to_string(),
            password: password.to_string(),
            is_admin,
        }
    }

    #[tokio::test]
    async fn test_register_then_login() {
        let accounts = accounts().await;
        let registered = accounts
            .register(&new_user("admin", "secret", true))
            .await
            .unwrap();
        assert!(registered.is_admin);

        let logged_in = accounts.login("admin", "secret").await.unwrap();
        assert_eq!(logged_in, registered);
    }

    #[tokio::test]
    async fn test_wrong_password_is_invalid_credentials() {
        let accounts = accounts().await;
        accounts
            .register(&new_user("ana", "secret", false))
            .await
            .unwrap();

        let err = accounts.login("ana", "nope").await.unwrap_err();
        assert!(matches!(err, AppError::InvalidCredentials));
        assert!(!err.is_remote());
    }

    #[tokio::test]
    async fn test_blank_registration_is_rejected() {
        let accounts = accounts().await;
        let err = accounts
            .register(&new_user("  ", "secret", false))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));
        assert!(accounts.list_users().await.unwrap().is_empty());
    }
}
