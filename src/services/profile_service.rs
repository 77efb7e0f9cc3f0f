use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use crate::database::models::{NewProfile, Profile, ProfileId, Session};
use crate::database::{ProfileRepository, SessionStore, StoreError};

use super::password::{hash_password, verify_password};
use super::{checked, trimmed, ServiceError, ServiceResult};

const MAX_SESSION_TTL_SECS: i64 = 365 * 24 * 60 * 60;

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(
        required(message = "이메일은 필수입니다"),
        email(message = "올바른 이메일 형식이 아닙니다")
    )]
    pub email: Option<String>,

    #[validate(
        required(message = "비밀번호는 필수입니다"),
        length(min = 6, message = "비밀번호는 6자 이상이어야 합니다")
    )]
    pub password: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(required(message = "이메일은 필수입니다"))]
    pub email: Option<String>,

    #[validate(required(message = "비밀번호는 필수입니다"))]
    pub password: Option<String>,
}

/// Validated email/password pair
#[derive(Debug, Clone)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl RegisterRequest {
    /// Email is trimmed; the password is kept as typed but may not be blank
    pub fn into_credentials(self) -> ServiceResult<Credentials> {
        let request = Self {
            email: trimmed(self.email),
            password: self.password.filter(|p| !p.trim().is_empty()),
        };
        request.validate()?;
        Ok(Credentials {
            email: checked("email", request.email)?,
            password: checked("password", request.password)?,
        })
    }
}

impl LoginRequest {
    pub fn into_credentials(self) -> ServiceResult<Credentials> {
        let request = Self {
            email: trimmed(self.email),
            password: self.password.filter(|p| !p.is_empty()),
        };
        request.validate()?;
        Ok(Credentials {
            email: checked("email", request.email)?,
            password: checked("password", request.password)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileView {
    pub id: ProfileId,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

impl From<Profile> for ProfileView {
    fn from(profile: Profile) -> Self {
        Self {
            id: profile.id,
            email: profile.email,
            created_at: profile.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub session_id: String,
    pub profile_id: ProfileId,
    pub email: String,
    pub expires_at: DateTime<Utc>,
}

/// Identity behind a live session; this is the body of `GET /profile/session`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionPrincipal {
    pub profile_id: ProfileId,
    pub email: String,
}

/// Registration, login and session lifecycle
#[derive(Clone)]
pub struct ProfileService {
    profiles: Arc<dyn ProfileRepository>,
    sessions: Arc<dyn SessionStore>,
    session_ttl: Duration,
}

impl ProfileService {
    pub fn new(
        profiles: Arc<dyn ProfileRepository>,
        sessions: Arc<dyn SessionStore>,
        session_ttl_secs: u64,
    ) -> Self {
        Self {
            profiles,
            sessions,
            session_ttl: Duration::seconds(
                i64::try_from(session_ttl_secs).unwrap_or(i64::MAX).min(MAX_SESSION_TTL_SECS),
            ),
        }
    }

    pub async fn register(&self, request: RegisterRequest) -> ServiceResult<ProfileView> {
        let credentials = request.into_credentials()?;

        if self.profiles.exists_by_email(&credentials.email).await? {
            return Err(ServiceError::business("이미 가입된 이메일입니다"));
        }

        let new_profile = NewProfile {
            email: credentials.email,
            password_hash: hash_password(credentials.password).await?,
        };
        let profile = match self.profiles.create(new_profile).await {
            Ok(profile) => profile,
            // lost a race against a concurrent registration
            Err(StoreError::Conflict(_)) => return Err(ServiceError::business("이미 가입된 이메일입니다")),
            Err(e) => return Err(e.into()),
        };

        tracing::info!("Registered profile {} ({})", profile.id, profile.email);
        Ok(profile.into())
    }

    pub async fn login(&self, request: LoginRequest) -> ServiceResult<LoginResponse> {
        let credentials = request.into_credentials()?;

        let Some(profile) = self.profiles.find_by_email(&credentials.email).await? else {
            return Err(failed_login(&credentials.email));
        };
        if !verify_password(credentials.password, profile.password_hash.clone()).await? {
            return Err(failed_login(&credentials.email));
        }

        let now = Utc::now();
        let purged = self.sessions.purge_expired(now).await?;
        if purged > 0 {
            tracing::debug!("Purged {} expired sessions", purged);
        }

        let session = self
            .sessions
            .create(Session {
                id: Uuid::new_v4().to_string(),
                profile_id: profile.id,
                created_at: now,
                expires_at: now + self.session_ttl,
            })
            .await?;

        tracing::info!("Profile {} logged in", profile.id);
        Ok(LoginResponse {
            session_id: session.id,
            profile_id: profile.id,
            email: profile.email,
            expires_at: session.expires_at,
        })
    }

    /// Idempotent; unknown sessions are not an error
    pub async fn logout(&self, session_id: &str) -> ServiceResult<()> {
        if self.sessions.delete(session_id).await? {
            tracing::debug!("Session {} closed", session_id);
        }
        Ok(())
    }

    /// Resolve a live session and extend its expiry
    pub async fn resolve_session(&self, session_id: &str) -> ServiceResult<SessionPrincipal> {
        let now = Utc::now();
        let session = self
            .sessions
            .find(session_id)
            .await?
            .ok_or_else(|| ServiceError::unauthorized("유효하지 않은 세션입니다"))?;

        if session.is_expired(now) {
            self.sessions.delete(session_id).await?;
            return Err(ServiceError::unauthorized("세션이 만료되었습니다"));
        }

        let Some(profile) = self.profiles.get(session.profile_id).await? else {
            self.sessions.delete(session_id).await?;
            return Err(ServiceError::unauthorized("유효하지 않은 세션입니다"));
        };

        self.sessions.touch(session_id, now + self.session_ttl).await?;

        Ok(SessionPrincipal {
            profile_id: profile.id,
            email: profile.email,
        })
    }

    pub async fn get_profile(&self, profile_id: ProfileId) -> ServiceResult<ProfileView> {
        self.profiles
            .get(profile_id)
            .await?
            .map(ProfileView::from)
            .ok_or_else(|| ServiceError::not_found(format!("Profile {} not found", profile_id)))
    }
}

fn failed_login(email: &str) -> ServiceError {
    tracing::warn!("Failed login attempt for {}", email);
    ServiceError::unauthorized("이메일 또는 비밀번호가 올바르지 않습니다")
}
