//! Authentication module for the anime catalog
//!
//! This module provides authentication functionality including:
//! - Password hashing with Argon2id and a per-user salt
//! - Credential checking against the users table
//! - JWT token generation and verification
//! - An extractor for routes that require a bearer token
//! - HTTP-only cookie support for the HTML login flow

use actix_web::cookie::time::Duration as CookieDuration;
use actix_web::cookie::{Cookie, SameSite};
use actix_web::{web, FromRequest, HttpRequest};
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{self, PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, TokenData, Validation};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use std::future::{ready, Ready};
use thiserror::Error;
use tracing::error;

use crate::db::find_user_credentials;
use crate::error::AppError;
use crate::models::User;
use crate::routes::AppState;

/// JWT token expiry duration in days
const JWT_EXPIRY_DAYS: i64 = 7;

/// Cookie name for JWT token
pub const AUTH_COOKIE_NAME: &str = "auth_token";

/// Authentication errors
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Password hashing failed: {0}")]
    HashingError(String),

    #[error("Token generation failed: {0}")]
    TokenGenerationError(String),

    #[error("Token verification failed: {0}")]
    TokenVerificationError(String),

    #[error("Token expired")]
    TokenExpired,

    #[error("Missing authorization header")]
    MissingAuthHeader,

    #[error("Invalid authorization header format")]
    InvalidAuthHeaderFormat,
}

/// JWT claims structure
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issued at time (Unix timestamp)
    pub iat: i64,
}

/// Hash a password with Argon2id and a freshly generated salt
///
/// The result is a PHC string that embeds the algorithm parameters and salt,
/// so it can be verified later without extra state.
///
/// # Example
/// ```ignore
/// let hash = hash_password("my_secure_password")?;
/// ```
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AuthError::HashingError(e.to_string()))
}

/// Verify a password against a stored PHC hash
///
/// # Returns
/// * `Ok(true)` - If the password matches
/// * `Ok(false)` - If the password doesn't match
/// * `Err(AuthError)` - If the stored hash cannot be parsed
pub fn verify_password(password: &str, hash: &str) -> Result<bool, AuthError> {
    let parsed = PasswordHash::new(hash).map_err(|e| AuthError::HashingError(e.to_string()))?;

    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(password_hash::Error::Password) => Ok(false),
        Err(e) => Err(AuthError::HashingError(e.to_string())),
    }
}

/// Check a username/password pair against the users table
///
/// The username is matched without regard to case. Returns the public user on
/// success and `None` on a wrong password, an unknown user, or any lookup or
/// hashing failure (which is logged).
pub async fn authenticate(pool: &SqlitePool, username: &str, password: &str) -> Option<User> {
    let (user, password_hash) = match find_user_credentials(pool, username).await {
        Ok(Some(found)) => found,
        Ok(None) => return None,
        Err(e) => {
            error!("Authenticate: {}", e);
            return None;
        }
    };

    let password = password.to_owned();
    let verified =
        tokio::task::spawn_blocking(move || verify_password(&password, &password_hash)).await;

    match verified {
        Ok(Ok(true)) => Some(user),
        Ok(Ok(false)) => None,
        Ok(Err(e)) => {
            error!("Authenticate: {}", e);
            None
        }
        Err(e) => {
            error!("Authenticate: verification task failed: {}", e);
            None
        }
    }
}

/// Generate a JWT token for a user
///
/// # Example
/// ```ignore
/// let token = generate_token(user_id, &jwt_secret)?;
/// ```
pub fn generate_token(user_id: i64, secret: &str) -> Result<String, AuthError> {
    let now = Utc::now();
    let expiry = now + Duration::days(JWT_EXPIRY_DAYS);

    let claims = Claims {
        sub: user_id,
        exp: expiry.timestamp(),
        iat: now.timestamp(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AuthError::TokenGenerationError(e.to_string()))
}

/// Verify and decode a JWT token
///
/// Expired tokens are reported as [`AuthError::TokenExpired`].
pub fn verify_token(token: &str, secret: &str) -> Result<Claims, AuthError> {
    let token_data: TokenData<Claims> = decode(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
        _ => AuthError::TokenVerificationError(e.to_string()),
    })?;

    Ok(token_data.claims)
}

// ============================================================================
// HTTP-Only Cookie Management
// ============================================================================

/// Create an HTTP-only cookie containing the JWT token
///
/// Max-Age matches the token expiry. `secure` should only be false when the
/// site is served over plain HTTP.
pub fn create_auth_cookie(token: &str, secure: bool) -> Cookie<'static> {
    Cookie::build(AUTH_COOKIE_NAME, token.to_owned())
        .path("/")
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .max_age(CookieDuration::days(JWT_EXPIRY_DAYS))
        .finish()
}

/// Create a cookie that clears the auth token (for logout)
pub fn create_logout_cookie(secure: bool) -> Cookie<'static> {
    Cookie::build(AUTH_COOKIE_NAME, "")
        .path("/")
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .max_age(CookieDuration::ZERO)
        .finish()
}

/// Extract JWT token from cookie
pub fn extract_token_from_cookie(req: &HttpRequest) -> Option<String> {
    req.cookie(AUTH_COOKIE_NAME).map(|c| c.value().to_owned())
}

/// Extract JWT token from an `Authorization: Bearer <token>` header value
pub fn extract_token_from_header(auth_header: &str) -> Result<&str, AuthError> {
    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or(AuthError::InvalidAuthHeaderFormat)?
        .trim();

    if token.is_empty() {
        return Err(AuthError::InvalidAuthHeaderFormat);
    }

    Ok(token)
}

/// Validate an HTTP request and return the claims of its token
///
/// The Authorization header takes precedence over the auth cookie.
pub fn validate_http_request(req: &HttpRequest, secret: &str) -> Result<Claims, AuthError> {
    let token = if let Some(auth_header) = req
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
    {
        extract_token_from_header(auth_header)?.to_owned()
    } else if let Some(cookie_token) = extract_token_from_cookie(req) {
        cookie_token
    } else {
        return Err(AuthError::MissingAuthHeader);
    };

    verify_token(&token, secret)
}

/// Authenticated user extractor for Actix-web routes
///
/// Rejects the request with 401 when no valid token is present.
///
/// # Example
/// ```ignore
/// async fn protected_route(user: Auth) -> impl Responder {
///     HttpResponse::Ok().json(format!("Hello, user {}", user.user_id))
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Auth {
    /// The authenticated user's ID
    pub user_id: i64,
}

impl FromRequest for Auth {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut actix_web::dev::Payload) -> Self::Future {
        let result: Result<Self, Self::Error> = match req.app_data::<web::Data<AppState>>() {
            Some(state) => validate_http_request(req, &state.config.jwt_secret)
                .map(|claims| Auth {
                    user_id: claims.sub,
                })
                .map_err(|e| AppError::from(e).into()),
            None => Err(AppError::internal("Application state not configured").into()),
        };

        ready(result)
    }
}
