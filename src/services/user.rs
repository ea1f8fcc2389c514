//! User service
//!
//! Registration, login, logout, session resolution, and profile updates.
//! Uniqueness of username/email is left to the database constraints; the
//! repository reports violations and this service maps them to typed
//! errors.

use chrono::{Duration, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use std::sync::Arc;

use crate::db::repositories::{CreateUserError, SessionRepository, UserRepository};
use crate::models::{NewUser, ProfileUpdate, Session, User};
use crate::services::password::{hash_password, verify_password};
use crate::services::token::generate_session_token;

static USERNAME_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-zA-Z0-9]{3,20}$").unwrap());
static EMAIL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap());

const MIN_PASSWORD_LEN: usize = 6;

/// Registration input
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterInput {
    pub username: String,
    pub email: String,
    pub password: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

/// User service errors
#[derive(Debug, thiserror::Error)]
pub enum UserServiceError {
    #[error("{0}")]
    Validation(String),
    #[error("Invalid username or password")]
    InvalidCredentials,
    #[error("Username is already taken")]
    DuplicateUsername,
    #[error("Email is already registered")]
    DuplicateEmail,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

/// User service
pub struct UserService {
    users: Arc<dyn UserRepository>,
    sessions: Arc<dyn SessionRepository>,
    session_ttl: Duration,
}

impl UserService {
    pub fn new(users: Arc<dyn UserRepository>, sessions: Arc<dyn SessionRepository>) -> Self {
        Self::with_session_ttl(users, sessions, Duration::days(7))
    }

    pub fn with_session_ttl(
        users: Arc<dyn UserRepository>,
        sessions: Arc<dyn SessionRepository>,
        session_ttl: Duration,
    ) -> Self {
        Self {
            users,
            sessions,
            session_ttl,
        }
    }

    /// Seconds until a new session expires (used for cookie Max-Age)
    pub fn session_ttl_seconds(&self) -> i64 {
        self.session_ttl.num_seconds()
    }

    /// Register a new user and open a session for them
    pub async fn register(
        &self,
        input: RegisterInput,
    ) -> Result<(User, String), UserServiceError> {
        validate_username(&input.username)?;
        validate_email(&input.email)?;
        validate_password(&input.password)?;

        let password_hash = hash_password(&input.password)?;
        let user = self
            .users
            .create(NewUser {
                username: input.username,
                email: input.email,
                password_hash,
                first_name: input.first_name,
                last_name: input.last_name,
            })
            .await
            .map_err(|e| match e {
                CreateUserError::DuplicateUsername => UserServiceError::DuplicateUsername,
                CreateUserError::DuplicateEmail => UserServiceError::DuplicateEmail,
                CreateUserError::Other(e) => UserServiceError::Internal(e),
            })?;

        let token = self.create_session(&user.username).await?;
        tracing::info!("Registered user {}", user.username);
        Ok((user, token))
    }

    /// Verify credentials and open a session
    pub async fn login(
        &self,
        username: &str,
        password: &str,
    ) -> Result<(User, String), UserServiceError> {
        let user = self
            .users
            .find_by_username(username)
            .await?
            .ok_or(UserServiceError::InvalidCredentials)?;

        if !verify_password(password, &user.password_hash)? {
            return Err(UserServiceError::InvalidCredentials);
        }

        let token = self.create_session(&user.username).await?;
        Ok((user, token))
    }

    /// Revoke a session. Returns whether the session was active, so the
    /// caller can distinguish "Logged out" from "Already logged out".
    /// Revoking an unknown token is not an error.
    pub async fn logout(&self, token: &str) -> Result<bool, UserServiceError> {
        Ok(self.sessions.delete(token).await?)
    }

    /// Resolve a session token to its user
    ///
    /// Returns `None` for unknown or expired tokens. A store failure is an
    /// internal error, never a missing session.
    pub async fn resolve_session(&self, token: &str) -> Result<Option<User>, UserServiceError> {
        let Some(session) = self.sessions.get(token).await? else {
            return Ok(None);
        };

        if session.is_expired() {
            self.sessions.delete(token).await?;
            return Ok(None);
        }

        Ok(self.users.find_by_username(&session.username).await?)
    }

    /// Update the current user's profile
    pub async fn update_profile(
        &self,
        user_id: i64,
        update: ProfileUpdate,
    ) -> Result<User, UserServiceError> {
        if let Some(bio) = &update.bio {
            if bio.len() > 1000 {
                return Err(UserServiceError::Validation(
                    "Bio must be at most 1000 characters".to_string(),
                ));
            }
        }

        self.users
            .update_profile(user_id, update)
            .await?
            .ok_or_else(|| UserServiceError::Internal(anyhow::anyhow!("User not found")))
    }

    /// Remove expired sessions; returns how many were deleted
    pub async fn cleanup_expired_sessions(&self) -> Result<u64, UserServiceError> {
        Ok(self.sessions.delete_expired().await?)
    }

    async fn create_session(&self, username: &str) -> Result<String, UserServiceError> {
        let now = Utc::now();
        let session = Session {
            token: generate_session_token(),
            username: username.to_string(),
            created_at: now,
            expires_at: now + self.session_ttl,
        };
        self.sessions.create(&session).await?;
        Ok(session.token)
    }
}

fn validate_username(username: &str) -> Result<(), UserServiceError> {
    if USERNAME_RE.is_match(username) {
        Ok(())
    } else {
        Err(UserServiceError::Validation(
            "Username must be 3-20 alphanumeric characters".to_string(),
        ))
    }
}

fn validate_email(email: &str) -> Result<(), UserServiceError> {
    if EMAIL_RE.is_match(email) {
        Ok(())
    } else {
        Err(UserServiceError::Validation(
            "Invalid email address".to_string(),
        ))
    }
}

fn validate_password(password: &str) -> Result<(), UserServiceError> {
    if password.len() >= MIN_PASSWORD_LEN {
        Ok(())
    } else {
        Err(UserServiceError::Validation(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LEN
        )))
    }
}


#[cfg(test)]
mod property_tests {
    use super::*;
    use crate::db::repositories::{MemorySessionRepository, MemoryUserRepository};
    use proptest::prelude::*;

    fn runtime() -> tokio::runtime::Runtime {
        tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap()
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(8))]

        /// Any valid registration can log in with its own credentials and
        /// never with a different password.
        #[test]
        fn property_auth_roundtrip(
            username in "[a-zA-Z0-9]{3,20}",
            password in "[a-zA-Z0-9!?#]{6,24}",
            wrong in "[a-zA-Z0-9!?#]{6,24}",
        ) {
            runtime().block_on(async {
                let service = UserService::new(
                    Arc::new(MemoryUserRepository::new()),
                    Arc::new(MemorySessionRepository::new()),
                );

                let input = RegisterInput {
                    username: username.clone(),
                    email: format!("{}@example.com", username.to_lowercase()),
                    password: password.clone(),
                    first_name: None,
                    last_name: None,
                };
                let (user, _) = service.register(input).await.unwrap();

                prop_assert!(service.login(&username, &password).await.is_ok());
                prop_assert!(!user.password_hash.contains(&password));

                if wrong != password {
                    prop_assert!(matches!(
                        service.login(&username, &wrong).await,
                        Err(UserServiceError::InvalidCredentials)
                    ));
                }
                Ok(())
            })?;
        }
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        /// Validation accepts exactly the 3-20 alphanumeric usernames.
        #[test]
        fn property_username_validation(username in "\\PC{0,24}") {
            let expected = username.len() >= 3
                && username.len() <= 20
                && username.chars().all(|c| c.is_ascii_alphanumeric());
            prop_assert_eq!(validate_username(&username).is_ok(), expected);
        }
    }
}
