use std::collections::HashSet;

use crate::auth::claims::Claims;
use crate::models::user::PublicUser;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::Error, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header,
    TokenData, Validation,
};
use thiserror::Error;

/// Minimum acceptable size for the JWT secret in bytes.
pub const MIN_JWT_SECRET_LENGTH: usize = 32;
/// Minimum number of unique bytes expected for the JWT secret to avoid trivially guessable values.
const MIN_UNIQUE_JWT_BYTES: usize = 8;
/// Token lifetime when `JWT_EXPIRES_IN` is not configured.
pub const DEFAULT_TOKEN_TTL: Duration = Duration::days(7);
/// Longest lifetime `JWT_EXPIRES_IN` may request.
pub const MAX_TOKEN_TTL: Duration = Duration::days(365);

#[derive(Debug, Error)]
pub enum JwtSecretError {
    #[error("JWT_SECRET must be set")]
    Missing,
    #[error("JWT_SECRET must be at least {required} bytes, but {actual} bytes were provided")]
    TooShort { actual: usize, required: usize },
    #[error(
        "JWT_SECRET must contain sufficient entropy (at least {required} unique bytes); only {actual} unique bytes found"
    )]
    LowEntropy { actual: usize, required: usize },
}

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("token expiry falls outside the representable date range")]
    ExpiryOutOfRange,
    #[error(transparent)]
    Encode(#[from] Error),
}

#[derive(Clone)]
pub struct JwtKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl std::fmt::Debug for JwtKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtKeys").finish_non_exhaustive()
    }
}

impl JwtKeys {
    pub fn from_secret(secret: impl AsRef<[u8]>) -> Result<Self, JwtSecretError> {
        let bytes = secret.as_ref();
        validate_secret(bytes)?;

        Ok(Self {
            encoding: EncodingKey::from_secret(bytes),
            decoding: DecodingKey::from_secret(bytes),
        })
    }

    pub fn encoding_key(&self) -> &EncodingKey {
        &self.encoding
    }

    pub fn decoding_key(&self) -> &DecodingKey {
        &self.decoding
    }
}

pub fn validate_secret(secret: &[u8]) -> Result<(), JwtSecretError> {
    if secret.is_empty() {
        return Err(JwtSecretError::Missing);
    }

    if secret.len() < MIN_JWT_SECRET_LENGTH {
        return Err(JwtSecretError::TooShort {
            actual: secret.len(),
            required: MIN_JWT_SECRET_LENGTH,
        });
    }

    let unique = secret.iter().copied().collect::<HashSet<_>>().len();
    if unique < MIN_UNIQUE_JWT_BYTES {
        return Err(JwtSecretError::LowEntropy {
            actual: unique,
            required: MIN_UNIQUE_JWT_BYTES,
        });
    }

    Ok(())
}

pub fn create_jwt(claims: &Claims, keys: &JwtKeys) -> Result<String, Error> {
    encode(&Header::new(Algorithm::HS256), claims, keys.encoding_key())
}

/// Signature and structure only; expiry is checked against the caller's
/// clock in [`TokenService::verify_at`].
pub fn decode_jwt(token: &str, keys: &JwtKeys) -> Result<TokenData<Claims>, Error> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = false;
    validation.leeway = 0;
    validation.required_spec_claims = HashSet::from(["exp".to_string()]);
    decode::<Claims>(token, keys.decoding_key(), &validation)
}

/// Issues and verifies the bearer tokens handed out at login and registration.
#[derive(Debug, Clone)]
pub struct TokenService {
    keys: JwtKeys,
    ttl: Duration,
}

impl TokenService {
    pub fn new(keys: JwtKeys, ttl: Duration) -> Self {
        Self { keys, ttl }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn issue(&self, user: &PublicUser) -> Result<String, TokenError> {
        self.issue_at(user, Utc::now())
    }

    pub fn issue_at(&self, user: &PublicUser, now: DateTime<Utc>) -> Result<String, TokenError> {
        let claims = Claims::for_user(user, now, self.ttl).ok_or(TokenError::ExpiryOutOfRange)?;
        Ok(create_jwt(&claims, &self.keys)?)
    }

    /// `None` for a malformed, forged or expired token. Callers are not told
    /// which.
    pub fn verify(&self, token: &str) -> Option<Claims> {
        self.verify_at(token, Utc::now())
    }

    pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Option<Claims> {
        let claims = match decode_jwt(token, &self.keys) {
            Ok(data) => data.claims,
            Err(error) => {
                tracing::debug!(kind = ?error.kind(), "rejected bearer token");
                return None;
            }
        };

        if claims.exp <= now.timestamp() {
            tracing::debug!(kind = ?ErrorKind::ExpiredSignature, "rejected bearer token");
            return None;
        }

        Some(claims)
    }
}
