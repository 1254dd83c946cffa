use axum_helpers::{IssuedToken, JwtAuth, JwtClaims};
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use crate::error::{UserError, UserResult};
use crate::models::{
    ForgotPasswordRequest, LoginRequest, RegisterUser, ResetPasswordRequest, UserResponse,
};
use crate::password_reset::{
    PasswordReset, PasswordResetConfig, PasswordResetRepository, ResetNotifier, generate_token,
};
use crate::repository::UserRepository;
use crate::service::UserService;

/// Login, logout, refresh, registration and the password reset flow.
pub struct AuthService<R: UserRepository, P: PasswordResetRepository> {
    users: UserService<R>,
    jwt: JwtAuth,
    resets: Arc<P>,
    notifier: Arc<dyn ResetNotifier>,
    reset_config: PasswordResetConfig,
}

impl<R: UserRepository, P: PasswordResetRepository> Clone for AuthService<R, P> {
    fn clone(&self) -> Self {
        Self {
            users: self.users.clone(),
            jwt: self.jwt.clone(),
            resets: Arc::clone(&self.resets),
            notifier: Arc::clone(&self.notifier),
            reset_config: self.reset_config.clone(),
        }
    }
}

impl<R: UserRepository, P: PasswordResetRepository> AuthService<R, P> {
    pub fn new(
        users: UserService<R>,
        jwt: JwtAuth,
        resets: P,
        notifier: Arc<dyn ResetNotifier>,
        reset_config: PasswordResetConfig,
    ) -> Self {
        Self {
            users,
            jwt,
            resets: Arc::new(resets),
            notifier,
            reset_config,
        }
    }

    pub fn jwt(&self) -> &JwtAuth {
        &self.jwt
    }

    pub async fn login(&self, input: LoginRequest) -> UserResult<IssuedToken> {
        input.validate()?;
        let (Some(email), Some(password)) = (input.email, input.password) else {
            return Err(UserError::InvalidCredentials);
        };

        let user = self.users.verify_credentials(&email, &password).await?;
        let token = self.jwt.issue(&user.id.to_string()).await?;

        tracing::info!(user_id = %user.id, "User logged in");
        Ok(token)
    }

    pub async fn logout(&self, claims: &JwtClaims) -> UserResult<()> {
        self.jwt.revoke(claims).await?;
        tracing::info!(user_id = %claims.sub, "User logged out");
        Ok(())
    }

    /// New token for the bearer of `token`; the old one stops working.
    pub async fn refresh(&self, token: &str) -> UserResult<IssuedToken> {
        Ok(self.jwt.refresh(token).await?)
    }

    /// The authenticated user. A token whose user was since deleted is rejected.
    pub async fn me(&self, claims: &JwtClaims) -> UserResult<UserResponse> {
        let id = Uuid::parse_str(&claims.sub).map_err(|_| UserError::InvalidCredentials)?;

        match self.users.get_user(id).await {
            Err(UserError::NotFound(_)) => Err(UserError::InvalidCredentials),
            other => other,
        }
    }

    pub async fn register(&self, input: RegisterUser) -> UserResult<UserResponse> {
        let user = self.users.register(input).await?;
        tracing::info!(user_id = %user.id, "User registered");
        Ok(user)
    }

    /// Starts a reset for a known email. Unknown emails succeed silently so
    /// the response does not reveal which addresses are registered.
    pub async fn forgot_password(&self, input: ForgotPasswordRequest) -> UserResult<()> {
        input.validate()?;
        let Some(email) = input.email else {
            return Ok(());
        };

        let Some(user) = self.users.find_by_email(&email).await? else {
            tracing::debug!("Password reset requested for unknown email");
            return Ok(());
        };

        let token = generate_token();
        self.resets.upsert(PasswordReset::new(&user.email, &token)).await?;

        let link = self.reset_config.link_for(&user.email, &token);
        self.notifier.send_reset_link(&user.email, &link).await?;

        tracing::info!(user_id = %user.id, "Password reset requested");
        Ok(())
    }

    /// Exchanges a reset token for a new password; the token is single-use.
    pub async fn reset_password(&self, input: ResetPasswordRequest) -> UserResult<()> {
        input.validate()?;
        let (Some(email), Some(password), Some(token)) = (input.email, input.password, input.token)
        else {
            return Err(UserError::InvalidResetToken);
        };

        let Some(reset) = self.resets.consume(&email, &token).await? else {
            return Err(UserError::InvalidResetToken);
        };

        if reset.is_expired(self.reset_config.ttl_minutes) {
            tracing::info!("Expired password reset token presented");
            return Err(UserError::InvalidResetToken);
        }

        let Some(user) = self.users.find_by_email(&email).await? else {
            return Err(UserError::InvalidResetToken);
        };

        let user = self.users.set_password(user, &password).await?;

        tracing::info!(user_id = %user.id, "Password reset completed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::password_reset::{CapturingResetNotifier, InMemoryPasswordResetRepository};
    use async_trait::async_trait;
    use crate::repository::InMemoryUserRepository;
    use axum_helpers::{InMemoryTokenStore, JwtConfig};

    type Service = AuthService<InMemoryUserRepository, InMemoryPasswordResetRepository>;

    fn setup_with<P: PasswordResetRepository>(
        resets: P,
    ) -> (AuthService<InMemoryUserRepository, P>, CapturingResetNotifier) {
        let config = JwtConfig::new("0123456789abcdef0123456789abcdef", 60).unwrap();
        let jwt = JwtAuth::new(&config, Arc::new(InMemoryTokenStore::new()));
        let notifier = CapturingResetNotifier::new();

        let service = AuthService::new(
            UserService::new(InMemoryUserRepository::new()),
            jwt,
            resets,
            Arc::new(notifier.clone()),
            PasswordResetConfig::default(),
        );
        (service, notifier)
    }

    fn setup() -> (Service, CapturingResetNotifier) {
        setup_with(InMemoryPasswordResetRepository::new())
    }

    async fn register_ada<P: PasswordResetRepository>(
        service: &AuthService<InMemoryUserRepository, P>,
    ) -> UserResponse {
        service
            .register(RegisterUser {
                name: Some("Ada".to_string()),
                phone: Some("5512345678".to_string()),
                username: Some("ada".to_string()),
                birthday: Some("1990-04-21".to_string()),
                email: Some("ada@example.com".to_string()),
                password: Some("secret".to_string()),
            })
            .await
            .unwrap()
    }

    fn login(email: &str, password: &str) -> LoginRequest {
        LoginRequest {
            email: Some(email.to_string()),
            password: Some(password.to_string()),
        }
    }

    fn reset(email: &str, password: &str, token: &str) -> ResetPasswordRequest {
        ResetPasswordRequest {
            email: Some(email.to_string()),
            password: Some(password.to_string()),
            token: Some(token.to_string()),
        }
    }

    fn forgot(email: &str) -> ForgotPasswordRequest {
        ForgotPasswordRequest {
            email: Some(email.to_string()),
        }
    }

    #[tokio::test]
    async fn test_login_issues_verifiable_token() {
        let (service, _) = setup();
        let ada = register_ada(&service).await;

        let token = service.login(login("ada@example.com", "secret")).await.unwrap();
        let claims = service.jwt().verify(&token.access_token).await.unwrap();
        assert_eq!(claims.sub, ada.id.to_string());

        let me = service.me(&claims).await.unwrap();
        assert_eq!(me.email, "ada@example.com");
    }

    #[tokio::test]
    async fn test_login_wrong_password_is_unauthorized() {
        let (service, _) = setup();
        register_ada(&service).await;

        let result = service.login(login("ada@example.com", "nope")).await;
        assert!(matches!(result, Err(UserError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_logout_revokes_token() {
        let (service, _) = setup();
        register_ada(&service).await;

        let token = service.login(login("ada@example.com", "secret")).await.unwrap();
        let claims = service.jwt().verify(&token.access_token).await.unwrap();

        service.logout(&claims).await.unwrap();
        assert!(service.jwt().verify(&token.access_token).await.is_err());
    }

    #[tokio::test]
    async fn test_refresh_replaces_token() {
        let (service, _) = setup();
        register_ada(&service).await;
        let old = service.login(login("ada@example.com", "secret")).await.unwrap();

        let new = service.refresh(&old.access_token).await.unwrap();

        assert!(service.jwt().verify(&new.access_token).await.is_ok());
        assert!(service.jwt().verify(&old.access_token).await.is_err());
        assert!(matches!(
            service.refresh(&old.access_token).await,
            Err(UserError::Auth(_))
        ));
    }

    #[tokio::test]
    async fn test_forgot_password_unknown_email_sends_nothing() {
        let (service, notifier) = setup();

        service.forgot_password(forgot("ghost@example.com")).await.unwrap();
        assert!(notifier.sent().await.is_empty());
    }

    #[tokio::test]
    async fn test_reset_password_single_use() {
        let (service, notifier) = setup();
        register_ada(&service).await;

        service.forgot_password(forgot("ada@example.com")).await.unwrap();
        let token = notifier.last_token_for("ada@example.com").await.unwrap();

        service
            .reset_password(reset("ada@example.com", "new-secret", &token))
            .await
            .unwrap();

        assert!(service.login(login("ada@example.com", "new-secret")).await.is_ok());
        assert!(service.login(login("ada@example.com", "secret")).await.is_err());

        let again = service
            .reset_password(reset("ada@example.com", "other", &token))
            .await;
        assert!(matches!(again, Err(UserError::InvalidResetToken)));
    }

    #[tokio::test]
    async fn test_reset_password_rejects_unissued_token() {
        let (service, _) = setup();
        register_ada(&service).await;
        service.forgot_password(forgot("ada@example.com")).await.unwrap();

        let result = service
            .reset_password(reset("ada@example.com", "new", &generate_token()))
            .await;
        assert!(matches!(result, Err(UserError::InvalidResetToken)));
    }

    #[tokio::test]
    async fn test_new_request_overwrites_previous_token() {
        let (service, notifier) = setup();
        register_ada(&service).await;

        service.forgot_password(forgot("ada@example.com")).await.unwrap();
        let first = notifier.last_token_for("ada@example.com").await.unwrap();
        service.forgot_password(forgot("ada@example.com")).await.unwrap();
        let second = notifier.last_token_for("ada@example.com").await.unwrap();

        assert!(matches!(
            service.reset_password(reset("ada@example.com", "x", &first)).await,
            Err(UserError::InvalidResetToken)
        ));
        assert!(service
            .reset_password(reset("ada@example.com", "x", &second))
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_expired_reset_is_rejected_and_dropped() {
        let resets = InMemoryPasswordResetRepository::new();
        let (service, _) = setup_with(resets.clone());
        register_ada(&service).await;

        let mut stale = PasswordReset::new("ada@example.com", "stale-token");
        stale.created_at = chrono::Utc::now() - chrono::Duration::minutes(61);
        resets.upsert(stale).await.unwrap();

        let result = service
            .reset_password(reset("ada@example.com", "x", "stale-token"))
            .await;
        assert!(matches!(result, Err(UserError::InvalidResetToken)));
        assert!(resets.find("ada@example.com").await.unwrap().is_none());
    }

    /// Yields before each call so two in-flight resets interleave.
    struct YieldingResets(InMemoryPasswordResetRepository);

    #[async_trait]
    impl PasswordResetRepository for YieldingResets {
        async fn upsert(&self, reset: PasswordReset) -> UserResult<()> {
            tokio::task::yield_now().await;
            self.0.upsert(reset).await
        }

        async fn find(&self, email: &str) -> UserResult<Option<PasswordReset>> {
            tokio::task::yield_now().await;
            self.0.find(email).await
        }

        async fn consume(&self, email: &str, token: &str) -> UserResult<Option<PasswordReset>> {
            tokio::task::yield_now().await;
            self.0.consume(email, token).await
        }
    }

    #[tokio::test]
    async fn test_concurrent_resets_with_one_token_have_one_winner() {
        let (service, notifier) = setup_with(YieldingResets(InMemoryPasswordResetRepository::new()));
        register_ada(&service).await;
        service.forgot_password(forgot("ada@example.com")).await.unwrap();
        let token = notifier.last_token_for("ada@example.com").await.unwrap();

        let (first, second) = tokio::join!(
            service.reset_password(reset("ada@example.com", "first-secret", &token)),
            service.reset_password(reset("ada@example.com", "second-secret", &token)),
        );

        assert_eq!([first.is_ok(), second.is_ok()].iter().filter(|ok| **ok).count(), 1);
        let winner = if first.is_ok() { "first-secret" } else { "second-secret" };
        assert!(service.login(login("ada@example.com", winner)).await.is_ok());
    }
}
