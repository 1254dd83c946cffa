use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

/// User entity - matches SQL schema
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    /// Unique
    pub username: String,
    pub phone: i64,
    pub birthday: NaiveDate,
    /// Unique
    pub email: String,
    pub email_verified_at: Option<DateTime<Utc>>,
    /// Argon2 PHC string, never leaves the service layer
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Public user representation (no password hash)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    pub id: Uuid,
    pub name: String,
    pub username: String,
    pub phone: i64,
    #[schema(value_type = String, format = Date, example = "1990-04-21")]
    pub birthday: NaiveDate,
    pub email: String,
    pub email_verified_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            username: user.username,
            phone: user.phone,
            birthday: user.birthday,
            email: user.email,
            email_verified_at: user.email_verified_at,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// Any JSON scalar as text, so a wrongly typed value surfaces as a field
/// error from validation instead of rejecting the whole body.
fn scalar_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Ok(match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => None,
        Some(Value::String(text)) => Some(text),
        Some(other) => Some(other.to_string()),
    })
}

pub(crate) fn parse_phone(value: &str) -> Option<i64> {
    value.trim().parse().ok()
}

pub(crate) fn parse_birthday(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").ok()
}

fn integer(value: &str) -> Result<(), ValidationError> {
    parse_phone(value)
        .map(|_| ())
        .ok_or_else(|| ValidationError::new("integer"))
}

fn date(value: &str) -> Result<(), ValidationError> {
    parse_birthday(value)
        .map(|_| ())
        .ok_or_else(|| ValidationError::new("date"))
}

/// Registration payload. Every field is required; a missing or malformed
/// one is reported as a field error rather than a decode failure.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct RegisterUser {
    #[validate(required, length(min = 1, max = 255))]
    #[schema(example = "Ada Lovelace")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "scalar_text")]
    #[validate(required, custom(function = "integer", message = "The phone must be an integer."))]
    #[schema(value_type = Option<i64>, example = 5512345678i64)]
    pub phone: Option<String>,
    #[validate(required, length(min = 1, max = 255))]
    #[schema(example = "ada")]
    pub username: Option<String>,
    #[serde(default, deserialize_with = "scalar_text")]
    #[validate(required, custom(function = "date", message = "The birthday is not a valid date."))]
    #[schema(value_type = Option<String>, format = Date, example = "1990-04-21")]
    pub birthday: Option<String>,
    #[validate(required, email, length(max = 100))]
    #[schema(example = "ada@example.com")]
    pub email: Option<String>,
    #[validate(required, length(min = 1))]
    pub password: Option<String>,
}

/// Partial profile update; absent fields keep their stored value.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateUser {
    #[validate(length(min = 1, max = 255))]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "scalar_text")]
    #[validate(custom(function = "integer", message = "The phone must be an integer."))]
    #[schema(value_type = Option<i64>)]
    pub phone: Option<String>,
    #[serde(default, deserialize_with = "scalar_text")]
    #[validate(custom(function = "date", message = "The birthday is not a valid date."))]
    #[schema(value_type = Option<String>, format = Date)]
    pub birthday: Option<String>,
    #[validate(length(min = 1, max = 255))]
    pub username: Option<String>,
    #[validate(email, length(max = 100))]
    pub email: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[validate(required, email)]
    pub email: Option<String>,
    #[validate(required, length(min = 1))]
    pub password: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct ForgotPasswordRequest {
    #[validate(required, email)]
    pub email: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct ResetPasswordRequest {
    #[validate(required, email)]
    pub email: Option<String>,
    #[validate(required, length(min = 1))]
    pub password: Option<String>,
    /// Token delivered by the forgot-password link
    #[validate(required, length(min = 1))]
    pub token: Option<String>,
}

/// `{ "message": ... }`
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RegisterResponse {
    pub message: String,
    pub user: UserResponse,
}

impl User {
    /// New record; the password must already be hashed.
    pub fn new(
        name: String,
        username: String,
        phone: i64,
        birthday: NaiveDate,
        email: String,
        password_hash: String,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            name,
            username,
            phone,
            birthday,
            email,
            email_verified_at: None,
            password_hash,
            created_at: now,
            updated_at: now,
        }
    }

    /// Merges supplied fields onto the record and bumps `updated_at`.
    /// `update` must have passed validation; unparsable values are skipped.
    pub fn apply_update(&mut self, update: UpdateUser) {
        if let Some(name) = update.name {
            self.name = name;
        }
        if let Some(phone) = update.phone.as_deref().and_then(parse_phone) {
            self.phone = phone;
        }
        if let Some(birthday) = update.birthday.as_deref().and_then(parse_birthday) {
            self.birthday = birthday;
        }
        if let Some(username) = update.username {
            self.username = username;
        }
        if let Some(email) = update.email {
            self.email = email;
        }
        self.updated_at = Utc::now();
    }
}
