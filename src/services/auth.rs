//! Authentication and user directory service

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::Utc;
use validator::Validate;

use crate::{
    config::AuthConfig,
    error::{AppError, AppResult},
    models::user::{LoginRequest, RegisterRequest, Role, User, UserClaims},
    repository::Repository,
};

/// Hash a password with argon2 and a fresh salt
pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))?;
    Ok(hash.to_string())
}

/// Verify a password against an argon2 hash
pub fn verify_password(password: &str, hash: &str) -> AppResult<bool> {
    let parsed = PasswordHash::new(hash)
        .map_err(|e| AppError::Internal(format!("Invalid password hash: {}", e)))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

/// Map a missing user row to an authentication failure. Infrastructure
/// errors pass through so they surface as 500, not 401.
fn unknown_user(err: AppError) -> AppError {
    match err {
        AppError::NotFound(_) => AppError::Authentication("Unknown user".to_string()),
        other => other,
    }
}

#[derive(Clone)]
pub struct AuthService {
    repository: Repository,
    config: AuthConfig,
}

impl AuthService {
    pub fn new(repository: Repository, config: AuthConfig) -> Self {
        Self { repository, config }
    }

    /// Register a new account and issue its first token
    pub async fn register(&self, request: RegisterRequest) -> AppResult<(User, String)> {
        request.validate()?;

        if self.repository.users.email_exists(&request.email).await? {
            return Err(AppError::EmailTaken(request.email));
        }

        let password_hash = hash_password(&request.password)?;
        let role = request.role.unwrap_or(Role::User);

        let user = self
            .repository
            .users
            .create(&request.name, &request.email, &password_hash, role)
            .await?;

        tracing::info!(user_id = user.id, role = %user.role, "user registered");

        let token = self.issue_token(&user)?;
        Ok((user, token))
    }

    /// Authenticate by email and password. All previously issued tokens
    /// are revoked before the new one is issued (one active token set
    /// per user).
    pub async fn login(&self, request: LoginRequest) -> AppResult<(User, String)> {
        request.validate()?;

        let mut user = self
            .repository
            .users
            .find_by_email(&request.email)
            .await?
            .ok_or_else(|| AppError::Authentication("Invalid email or password".to_string()))?;

        if !verify_password(&request.password, &user.password)? {
            return Err(AppError::Authentication("Invalid email or password".to_string()));
        }

        user.token_version = self.repository.users.bump_token_version(user.id).await?;

        let token = self.issue_token(&user)?;
        Ok((user, token))
    }

    /// Revoke the user's current token set
    pub async fn logout(&self, user_id: i32) -> AppResult<()> {
        self.repository.users.bump_token_version(user_id).await?;
        tracing::debug!(user_id, "tokens revoked on logout");
        Ok(())
    }

    /// Resolve claims to a live user, rejecting revoked tokens
    pub async fn verify_claims(&self, claims: &UserClaims) -> AppResult<User> {
        let user = self
            .repository
            .users
            .get_by_id(claims.user_id)
            .await
            .map_err(unknown_user)?;

        if user.token_version != claims.token_version {
            return Err(AppError::Authentication("Token has been revoked".to_string()));
        }

        Ok(user)
    }

    /// Get the acting user
    pub async fn current_user(&self, user_id: i32) -> AppResult<User> {
        self.repository.users.get_by_id(user_id).await
    }

    /// Count all users
    pub async fn count_users(&self) -> AppResult<i64> {
        self.repository.users.count().await
    }

    /// Create a JWT for the user embedding its current token version
    fn issue_token(&self, user: &User) -> AppResult<String> {
        let now = Utc::now().timestamp();
        let exp = now + (self.config.jwt_expiration_hours as i64 * 3600);

        let claims = UserClaims {
            sub: user.email.clone(),
            user_id: user.id,
            role: user.role,
            token_version: user.token_version,
            exp,
            iat: now,
        };

        claims
            .create_token(&self.config.jwt_secret)
            .map_err(|e| AppError::Internal(format!("Failed to create token: {}", e)))
    }
}
