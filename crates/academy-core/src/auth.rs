//! # Admin Session Guard
//!
//! Email/password login for the admin panel, HS256 bearer tokens valid for
//! seven days, and a ten-minute single-use password reset flow.
//!
//! There is no refresh and no revocation: logging out means the client drops
//! its token.

use crate::error::{AcademyError, AcademyResult};
use crate::notify::{password_reset_email, SharedNotifier};
use crate::registration::normalize_email;
use crate::store::StoreHandle;
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

/// Admin role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdminRole {
    Admin,
}

impl Default for AdminRole {
    fn default() -> Self {
        AdminRole::Admin
    }
}

/// An admin account. Secrets never serialize.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdminUser {
    pub id: String,
    pub email: String,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    #[serde(default)]
    pub role: AdminRole,
    #[serde(skip_serializing, default)]
    pub reset_token_hash: Option<String>,
    #[serde(skip_serializing, default)]
    pub reset_expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl AdminUser {
    pub fn new(email: &str, password_hash: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().simple().to_string(),
            email: normalize_email(email),
            password_hash,
            role: AdminRole::Admin,
            reset_token_hash: None,
            reset_expires_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn clear_reset_token(&mut self) {
        self.reset_token_hash = None;
        self.reset_expires_at = None;
        self.updated_at = Utc::now();
    }
}

/// JWT claims
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Admin user id
    pub sub: String,
    pub email: String,
    pub role: AdminRole,
    pub iat: i64,
    pub exp: i64,
}

/// Successful login
#[derive(Debug, Clone, Serialize)]
pub struct Session {
    pub token: String,
    pub user: AdminUser,
}

/// Guard configuration
#[derive(Clone)]
pub struct GuardConfig {
    pub jwt_secret: String,
    /// Public site URL; reset links point at `{frontend_url}/admin/reset-password/{token}`
    pub frontend_url: String,
    pub token_ttl: Duration,
    pub reset_ttl: Duration,
}

impl GuardConfig {
    pub fn new(jwt_secret: impl Into<String>, frontend_url: impl Into<String>) -> Self {
        Self {
            jwt_secret: jwt_secret.into(),
            frontend_url: frontend_url.into(),
            token_ttl: Duration::days(7),
            reset_ttl: Duration::minutes(10),
        }
    }
}

impl std::fmt::Debug for GuardConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GuardConfig")
            .field("frontend_url", &self.frontend_url)
            .field("token_ttl", &self.token_ttl)
            .field("reset_ttl", &self.reset_ttl)
            .finish_non_exhaustive()
    }
}

/// Message returned by `request_reset` regardless of outcome
pub const RESET_REQUESTED_MESSAGE: &str =
    "If an account exists for that email, password reset instructions have been sent";

pub fn hash_password(password: &str) -> AcademyResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AcademyError::Internal(format!("Password hashing failed: {e}")))?;
    Ok(hash.to_string())
}

pub fn verify_password(password: &str, hash: &str) -> AcademyResult<bool> {
    let parsed = PasswordHash::new(hash)
        .map_err(|e| AcademyError::Internal(format!("Stored password hash is invalid: {e}")))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

/// SHA-256 hex digest; reset tokens are stored only in this form
pub fn hash_reset_token(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}

fn generate_reset_token() -> String {
    let mut bytes = [0u8; 32];
    rand::rngs::OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Authentication and authorization for admin routes
#[derive(Clone)]
pub struct AdminGuard {
    store: StoreHandle,
    notifier: SharedNotifier,
    config: GuardConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl AdminGuard {
    pub fn new(store: StoreHandle, notifier: SharedNotifier, config: GuardConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.jwt_secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.jwt_secret.as_bytes());
        Self {
            store,
            notifier,
            config,
            encoding_key,
            decoding_key,
            validation: Validation::new(Algorithm::HS256),
        }
    }

    /// Exchange credentials for a session token
    #[instrument(skip(self, password))]
    pub async fn authenticate(&self, email: &str, password: &str) -> AcademyResult<Session> {
        if email.trim().is_empty() || password.is_empty() {
            return Err(AcademyError::validation("Email and password are required"));
        }

        let store = self.store.require()?;
        let Some(user) = store.find_admin_by_email(&normalize_email(email)).await? else {
            warn!("Login attempt for unknown admin");
            return Err(AcademyError::InvalidCredentials);
        };

        if !verify_password(password, &user.password_hash)? {
            warn!("Login attempt with wrong password for admin {}", user.id);
            return Err(AcademyError::InvalidCredentials);
        }

        let token = self.issue_token(&user)?;
        info!("Admin {} logged in", user.id);
        Ok(Session { token, user })
    }

    /// Sign a token for `user`
    pub fn issue_token(&self, user: &AdminUser) -> AcademyResult<String> {
        let now = Utc::now();
        let claims = Claims {
            sub: user.id.clone(),
            email: user.email.clone(),
            role: user.role,
            iat: now.timestamp(),
            exp: (now + self.config.token_ttl).timestamp(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AcademyError::Internal(format!("Token generation failed: {e}")))
    }

    /// Check signature and expiry only
    pub fn decode_token(&self, token: &str) -> AcademyResult<Claims> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|_| AcademyError::Unauthorized("Invalid or expired token".to_string()))
    }

    /// Resolve a bearer token to the admin it belongs to
    pub async fn authorize(&self, token: Option<&str>) -> AcademyResult<AdminUser> {
        let token = token
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| AcademyError::Unauthorized("Access denied. No token provided".into()))?;
        let claims = self.decode_token(token)?;

        let store = self.store.require()?;
        store
            .get_admin(&claims.sub)
            .await?
            .ok_or_else(|| AcademyError::Unauthorized("Invalid or expired token".into()))
    }

    /// Start a password reset. Never reveals whether the account exists.
    #[instrument(skip(self))]
    pub async fn request_reset(&self, email: &str) -> AcademyResult<()> {
        if email.trim().is_empty() {
            return Err(AcademyError::validation("Email is required"));
        }
        if let Err(e) = self.try_request_reset(&normalize_email(email)).await {
            error!("Password reset request failed: {}", e);
        }
        Ok(())
    }

    async fn try_request_reset(&self, email: &str) -> AcademyResult<()> {
        let store = self.store.require()?;
        let Some(mut user) = store.find_admin_by_email(email).await? else {
            info!("Password reset requested for unknown email");
            return Ok(());
        };

        let token = generate_reset_token();
        user.reset_token_hash = Some(hash_reset_token(&token));
        user.reset_expires_at = Some(Utc::now() + self.config.reset_ttl);
        user.updated_at = Utc::now();
        store.replace_admin(&user).await?;

        let reset_url = format!(
            "{}/admin/reset-password/{}",
            self.config.frontend_url.trim_end_matches('/'),
            token
        );
        let message = password_reset_email(&user.email, &reset_url);

        if let Err(e) = self.notifier.send(message).await {
            user.clear_reset_token();
            store.replace_admin(&user).await?;
            return Err(AcademyError::Internal(format!("Reset email not sent: {e}")));
        }

        info!("Password reset email sent to admin {}", user.id);
        Ok(())
    }

    /// Finish a password reset with the emailed token
    #[instrument(skip(self, token, new_password))]
    pub async fn complete_reset(&self, token: &str, new_password: &str) -> AcademyResult<()> {
        if new_password.is_empty() {
            return Err(AcademyError::validation("New password is required"));
        }

        let store = self.store.require()?;
        let mut user = store
            .find_admin_by_reset_hash(&hash_reset_token(token))
            .await?
            .filter(|u| u.reset_expires_at.is_some_and(|exp| exp > Utc::now()))
            .ok_or(AcademyError::InvalidOrExpiredToken)?;

        user.password_hash = hash_password(new_password)?;
        user.clear_reset_token();
        store.replace_admin(&user).await?;

        info!("Password reset completed for admin {}", user.id);
        Ok(())
    }

    /// Create the admin account if it does not exist yet
    pub async fn ensure_admin(&self, email: &str, password: &str) -> AcademyResult<AdminUser> {
        let store = self.store.require()?;
        let email = normalize_email(email);
        if let Some(existing) = store.find_admin_by_email(&email).await? {
            return Ok(existing);
        }

        let user = AdminUser::new(&email, hash_password(password)?);
        store.insert_admin(&user).await?;
        info!("Seeded admin account {}", user.email);
        Ok(user)
    }
}
