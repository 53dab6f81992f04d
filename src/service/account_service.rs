use std::sync::Arc;

use validator::Validate;

use crate::{
    auth::AuthService,
    domain::{CreateUserRequest, UpdateUserRequest, User, UserRole},
    error::{AppError, Result},
    repository::UserRepository,
};

pub struct AccountService {
    users: Arc<dyn UserRepository>,
}

impl AccountService {
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self { users }
    }

    /// Registers a regular member account.
    pub async fn register(&self, username: &str, password: &str, password_confirm: &str) -> Result<User> {
        if password != password_confirm {
            return Err(AppError::Validation("The two password fields didn't match".to_string()));
        }

        self.create_user(CreateUserRequest {
            username: username.trim().to_string(),
            password: password.to_string(),
            email: None,
            role: UserRole::Member,
        })
        .await
    }

    pub async fn create_user(&self, request: CreateUserRequest) -> Result<User> {
        request.validate()?;

        if !is_valid_username(&request.username) {
            return Err(AppError::Validation(
                "Username may contain only letters, digits and @/./+/-/_ characters".to_string(),
            ));
        }

        if self.users.find_by_username(&request.username).await?.is_some() {
            return Err(AppError::Conflict("A user with that username already exists".to_string()));
        }

        let user = self.users.create(request).await?;
        tracing::info!("Registered user {} ({})", user.username, user.id);
        Ok(user)
    }

    /// Returns the user when the credentials match, `None` otherwise.
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<Option<User>> {
        let Some(hash) = self.users.password_hash(username).await? else {
            return Ok(None);
        };

        if !AuthService::verify_password(password, &hash).await? {
            return Ok(None);
        }

        self.users.find_by_username(username).await
    }

    pub async fn update_profile(&self, user: &User, update: UpdateUserRequest) -> Result<User> {
        // Role changes are not a profile concern.
        let update = UpdateUserRequest { role: None, ..update };
        self.users.update(user.id, update).await
    }
}

/// ASCII letters, digits and `@.+-_`.
pub fn is_valid_username(username: &str) -> bool {
    !username.is_empty()
        && username
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '@' | '.' | '+' | '-' | '_'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_username_charset() {
        assert!(is_valid_username("jane.doe+cv@example"));
        assert!(!is_valid_username("олена_1"));
        assert!(!is_valid_username("jane doe"));
        assert!(!is_valid_username("jane/doe"));
        assert!(!is_valid_username(""));
    }
}
