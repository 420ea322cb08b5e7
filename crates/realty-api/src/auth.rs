//! Admin authentication: one configured account, an argon2 password check,
//! and short-lived HS256 bearer tokens.

use std::num::NonZeroU32;

use argon2::{
    password_hash::{rand_core::OsRng, SaltString},
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
};
use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use chrono::{DateTime, Duration, Utc};
use governor::{DefaultKeyedRateLimiter, Quota, RateLimiter};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use realty_core::Settings;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::{
    error::{ApiError, ApiResult},
    state::AppState,
};

const UNKNOWN_USER_BUCKET: &str = "*";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminClaims {
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct IssuedToken {
    pub token: String,
    pub token_type: &'static str,
    pub expires_at: DateTime<Utc>,
}

struct SigningKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

pub struct AdminAuth {
    username: String,
    password_hash: Option<SecretString>,
    keys: Option<SigningKeys>,
    token_ttl: Duration,
    login_limiter: DefaultKeyedRateLimiter<String>,
}

impl AdminAuth {
    pub fn from_settings(settings: &Settings) -> Self {
        let keys = settings.secrets.jwt_secret.as_ref().map(|secret| {
            let secret = secret.expose_secret().as_bytes();
            SigningKeys {
                encoding: EncodingKey::from_secret(secret),
                decoding: DecodingKey::from_secret(secret),
            }
        });
        let per_minute = NonZeroU32::new(settings.security.login_attempts_per_minute)
            .unwrap_or(NonZeroU32::MIN);

        Self {
            username: settings.admin.username.clone(),
            password_hash: settings.admin.password_hash.clone(),
            keys,
            token_ttl: Duration::minutes(settings.admin.token_ttl_minutes),
            login_limiter: RateLimiter::keyed(Quota::per_minute(per_minute)),
        }
    }

    pub fn enabled(&self) -> bool {
        self.password_hash.is_some() && self.keys.is_some()
    }

    /// Checks the credentials and issues a token. Attempts are rate limited
    /// per username whether or not they succeed.
    pub fn login(&self, username: &str, password: &str) -> ApiResult<IssuedToken> {
        let (Some(hash), Some(keys)) = (&self.password_hash, &self.keys) else {
            return Err(ApiError::ServiceUnavailable(
                "admin panel is disabled".into(),
            ));
        };

        let attempt_key = self.attempt_key(username);
        if self.login_limiter.check_key(&attempt_key).is_err() {
            warn!(username = %attempt_key, "Login rate limit exceeded");
            return Err(ApiError::TooManyRequests);
        }

        let password_ok = verify_password(password, hash.expose_secret())?;
        if !password_ok || username.trim() != self.username {
            warn!(username = %attempt_key, "Rejected admin login");
            return Err(ApiError::Unauthorized(
                "invalid username or password".into(),
            ));
        }

        let issued = self.issue(keys, Utc::now())?;
        info!(username = %self.username, expires_at = %issued.expires_at, "Admin signed in");
        Ok(issued)
    }

    /// The configured account gets its own bucket; every other name shares
    /// one, so the limiter holds at most two keys.
    fn attempt_key(&self, username: &str) -> String {
        let username = username.trim();
        if username.eq_ignore_ascii_case(&self.username) {
            username.to_lowercase()
        } else {
            UNKNOWN_USER_BUCKET.to_string()
        }
    }

    fn issue(&self, keys: &SigningKeys, now: DateTime<Utc>) -> ApiResult<IssuedToken> {
        let expires_at = now + self.token_ttl;
        let claims = AdminClaims {
            sub: self.username.clone(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        };
        let token = encode(&Header::new(Algorithm::HS256), &claims, &keys.encoding)
            .map_err(|e| ApiError::Internal(format!("failed to sign token: {e}")))?;
        Ok(IssuedToken {
            token,
            token_type: "Bearer",
            expires_at,
        })
    }

    pub fn verify(&self, token: &str) -> ApiResult<AdminClaims> {
        let keys = self
            .keys
            .as_ref()
            .ok_or_else(|| ApiError::ServiceUnavailable("admin panel is disabled".into()))?;
        let validation = Validation::new(Algorithm::HS256);
        let data = decode::<AdminClaims>(token, &keys.decoding, &validation)
            .map_err(|e| ApiError::Unauthorized(format!("invalid token: {e}")))?;
        if data.claims.sub != self.username {
            return Err(ApiError::Unauthorized("unknown subject".into()));
        }
        Ok(data.claims)
    }
}

/// Produces the PHC string stored in `admin.password_hash`.
pub fn hash_password(password: &str) -> ApiResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| ApiError::Internal(format!("failed to hash password: {e}")))
}

fn verify_password(password: &str, phc: &str) -> ApiResult<bool> {
    let parsed = PasswordHash::new(phc)
        .map_err(|e| ApiError::Internal(format!("invalid admin.password_hash: {e}")))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

/// Rejects requests without a valid admin bearer token.
pub async fn require_admin(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> ApiResult<Response> {
    let token = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .ok_or_else(|| ApiError::Unauthorized("missing bearer token".into()))?;

    let claims = state.auth.verify(token)?;
    req.extensions_mut().insert(claims);
    Ok(next.run(req).await)
}
