use super::{AuthError, JwtConfig, TokenStore};
use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

/// Claims carried by every access token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtClaims {
    /// User id
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
    /// Token id, the key in the [`TokenStore`]
    pub jti: String,
}

impl JwtClaims {
    /// Seconds until expiry, never negative.
    pub fn remaining_seconds(&self) -> u64 {
        (self.exp - Utc::now().timestamp()).max(0) as u64
    }
}

/// Token payload returned by login and refresh.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct IssuedToken {
    pub access_token: String,
    /// Always `bearer`
    pub token_type: String,
    /// Lifetime in seconds
    pub expires_in: u64,
}

/// Signs and verifies bearer tokens; a token is valid while its signature
/// checks out, it has not expired, and its `jti` is active in the store.
#[derive(Clone)]
pub struct JwtAuth {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl_seconds: u64,
    store: Arc<dyn TokenStore>,
}

impl JwtAuth {
    pub fn new(config: &JwtConfig, store: Arc<dyn TokenStore>) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        tracing::info!(ttl_minutes = config.ttl_minutes, "JWT auth initialized");
        Self {
            encoding: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding: DecodingKey::from_secret(config.secret.as_bytes()),
            validation,
            ttl_seconds: config.ttl_seconds(),
            store,
        }
    }

    pub fn store(&self) -> &Arc<dyn TokenStore> {
        &self.store
    }

    pub async fn issue(&self, subject: &str) -> Result<IssuedToken, AuthError> {
        let now = Utc::now().timestamp();
        let claims = JwtClaims {
            sub: subject.to_string(),
            iat: now,
            exp: now + self.ttl_seconds as i64,
            jti: Uuid::new_v4().to_string(),
        };

        let access_token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)?;
        self.store
            .activate(&claims.jti, subject, self.ttl_seconds)
            .await?;

        tracing::debug!(user_id = %subject, jti = %claims.jti, "Issued access token");
        Ok(IssuedToken {
            access_token,
            token_type: "bearer".to_string(),
            expires_in: self.ttl_seconds,
        })
    }

    pub async fn verify(&self, token: &str) -> Result<JwtClaims, AuthError> {
        let claims = decode::<JwtClaims>(token, &self.decoding, &self.validation)?.claims;

        if !self.store.is_active(&claims.jti).await? {
            return Err(AuthError::Revoked);
        }

        Ok(claims)
    }

    /// Exchanges a valid token for a new one; the presented token stops working.
    /// Of several concurrent refreshes of the same token only one succeeds.
    pub async fn refresh(&self, token: &str) -> Result<IssuedToken, AuthError> {
        let claims = self.verify(token).await?;
        self.revoke(&claims).await?;
        self.issue(&claims.sub).await
    }

    /// Fails with [`AuthError::Revoked`] when the token was already gone.
    pub async fn revoke(&self, claims: &JwtClaims) -> Result<(), AuthError> {
        if !self.store.revoke(&claims.jti).await? {
            return Err(AuthError::Revoked);
        }
        tracing::debug!(user_id = %claims.sub, jti = %claims.jti, "Revoked access token");
        Ok(())
    }
}
