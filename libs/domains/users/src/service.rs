use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use axum_helpers::{Page, PageQuery};
use std::sync::Arc;
use uuid::Uuid;
use validator::{Validate, ValidationError, ValidationErrors};

use crate::error::{UserError, UserResult, taken};
use crate::models::{RegisterUser, UpdateUser, User, UserResponse, parse_birthday, parse_phone};
use crate::repository::UserRepository;

/// Service layer for User business logic
pub struct UserService<R: UserRepository> {
    repository: Arc<R>,
}

impl<R: UserRepository> Clone for UserService<R> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
        }
    }
}

impl<R: UserRepository> UserService<R> {
    pub fn new(repository: R) -> Self {
        Self {
            repository: Arc::new(repository),
        }
    }

    /// Register a new user; duplicate email and username are reported together.
    pub async fn register(&self, input: RegisterUser) -> UserResult<UserResponse> {
        input.validate()?;

        let name = required("name", input.name)?;
        let phone = required("phone", input.phone.as_deref().and_then(parse_phone))?;
        let username = required("username", input.username)?;
        let birthday = required("birthday", input.birthday.as_deref().and_then(parse_birthday))?;
        let email = required("email", input.email)?;
        let password = required("password", input.password)?;

        let mut errors = ValidationErrors::new();
        if self.repository.username_exists(&username, None).await? {
            errors.add("username", taken("username"));
        }
        if self.repository.email_exists(&email, None).await? {
            errors.add("email", taken("email"));
        }
        if !errors.is_empty() {
            return Err(UserError::Validation(errors));
        }

        let password_hash = hash_password(&password)?;
        let user = User::new(name, username, phone, birthday, email, password_hash);

        let created = self.repository.create(user).await?;
        Ok(created.into())
    }

    pub async fn get_user(&self, id: Uuid) -> UserResult<UserResponse> {
        let user = self
            .repository
            .get_by_id(id)
            .await?
            .ok_or(UserError::NotFound(id))?;

        Ok(user.into())
    }

    /// One page of users, newest first. `path` is echoed into the page links.
    pub async fn list_users(&self, query: &PageQuery, path: &str) -> UserResult<Page<UserResponse>> {
        let total = self.repository.count().await?;
        let users = self.repository.list(query.limit(), query.offset()).await?;

        let data = users.into_iter().map(UserResponse::from).collect();
        Ok(Page::new(data, total, query.page(), path))
    }

    /// Patch a user; only supplied fields change.
    pub async fn update_user(&self, id: Uuid, input: UpdateUser) -> UserResult<UserResponse> {
        input.validate()?;

        let mut user = self
            .repository
            .get_by_id(id)
            .await?
            .ok_or(UserError::NotFound(id))?;

        let mut errors = ValidationErrors::new();
        if let Some(username) = input.username.as_deref() {
            if username != user.username
                && self.repository.username_exists(username, Some(id)).await?
            {
                errors.add("username", taken("username"));
            }
        }
        if let Some(email) = input.email.as_deref() {
            if !email.eq_ignore_ascii_case(&user.email)
                && self.repository.email_exists(email, Some(id)).await?
            {
                errors.add("email", taken("email"));
            }
        }
        if !errors.is_empty() {
            return Err(UserError::Validation(errors));
        }

        user.apply_update(input);

        let updated = self.repository.update(user).await?;
        Ok(updated.into())
    }

    pub async fn delete_user(&self, id: Uuid) -> UserResult<()> {
        if !self.repository.delete(id).await? {
            return Err(UserError::NotFound(id));
        }

        Ok(())
    }

    /// Verify user credentials (for login).
    ///
    /// An unknown email and a wrong password both yield
    /// [`UserError::InvalidCredentials`], and both pay for one Argon2 run.
    pub async fn verify_credentials(&self, email: &str, password: &str) -> UserResult<User> {
        let Some(user) = self.repository.get_by_email(email).await? else {
            hash_password(password)?;
            return Err(UserError::InvalidCredentials);
        };

        if !verify_password(password, &user.password_hash)? {
            tracing::info!(user_id = %user.id, "Login rejected: wrong password");
            return Err(UserError::InvalidCredentials);
        }

        Ok(user)
    }

    pub async fn find_by_email(&self, email: &str) -> UserResult<Option<User>> {
        self.repository.get_by_email(email).await
    }

    /// Replace the stored password hash.
    pub async fn set_password(&self, mut user: User, password: &str) -> UserResult<User> {
        user.password_hash = hash_password(password)?;
        user.updated_at = chrono::Utc::now();

        self.repository.update(user).await
    }
}

fn required<T>(field: &'static str, value: Option<T>) -> UserResult<T> {
    value.ok_or_else(|| {
        let mut errors = ValidationErrors::new();
        errors.add(field, ValidationError::new("required"));
        UserError::Validation(errors)
    })
}

pub fn hash_password(password: &str) -> UserResult<String> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| UserError::PasswordHash(e.to_string()))
}

/// Constant-time check of `password` against a PHC string.
pub fn verify_password(password: &str, hash: &str) -> UserResult<bool> {
    let parsed_hash = PasswordHash::new(hash).map_err(|e| UserError::PasswordHash(e.to_string()))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}
