//! Password hashing and session tokens.

use crate::error::{AppError, AppResult};
use argon2::{Algorithm, Argon2, Params, Version};
use chrono::{Duration, Utc};
use common::model::user::User;
use jsonwebtoken::{encode, EncodingKey, Header};
use password_hash::rand_core::OsRng;
use password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use serde::{Deserialize, Serialize};

/// Argon2id, memory = 19456 KiB, iterations = 2, parallelism = 1.
fn argon2_instance() -> AppResult<Argon2<'static>> {
    let params = Params::new(19456, 2, 1, None)
        .map_err(|e| AppError::Internal(format!("argon2 parameters: {e}")))?;
    Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
}

pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = argon2_instance()?
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(format!("password hashing failed: {e}")))?;
    Ok(hash.to_string())
}

/// `Ok(false)` for a wrong password; an unparsable stored hash is an error.
pub fn verify_password(password: &str, hash: &str) -> AppResult<bool> {
    let parsed = PasswordHash::new(hash)
        .map_err(|e| AppError::Internal(format!("stored password hash is invalid: {e}")))?;
    Ok(argon2_instance()?
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub username: String,
    pub role: String,
    pub exp: i64,
}

/// Issues HS256 session tokens.
#[derive(Clone)]
pub struct TokenIssuer {
    key: EncodingKey,
    ttl: Duration,
}

impl TokenIssuer {
    pub fn new(secret: &str, ttl_hours: i64) -> Self {
        TokenIssuer {
            key: EncodingKey::from_secret(secret.as_bytes()),
            ttl: Duration::hours(ttl_hours),
        }
    }

    pub fn issue(&self, user: &User) -> AppResult<String> {
        let claims = Claims {
            sub: user.id.to_string(),
            username: user.username.clone(),
            role: user.role.clone(),
            exp: (Utc::now() + self.ttl).timestamp(),
        };
        encode(&Header::default(), &claims, &self.key)
            .map_err(|e| AppError::Internal(format!("token signing failed: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{decode, DecodingKey, Validation};

    #[test]
    fn hash_and_verify() {
        let hashed = hash_password("rahasia").unwrap();
        assert!(hashed.starts_with("$argon2id$"));
        assert!(verify_password("rahasia", &hashed).unwrap());
        assert!(!verify_password("salah", &hashed).unwrap());
    }

    #[test]
    fn garbage_hash_is_an_error() {
        assert!(verify_password("rahasia", "plain-text").is_err());
    }

    #[test]
    fn token_carries_user_claims() {
        let user = User {
            id: 7,
            name: "Budi".into(),
            username: "budi".into(),
            password: String::new(),
            role: "ADMIN-EO".into(),
            organization_id: 0,
            province: String::new(),
            regency: String::new(),
            retry_attempts: 0,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let token = TokenIssuer::new("secret", 1).issue(&user).unwrap();
        let decoded = decode::<Claims>(
            &token,
            &DecodingKey::from_secret(b"secret"),
            &Validation::default(),
        )
        .unwrap();
        assert_eq!(decoded.claims.sub, "7");
        assert_eq!(decoded.claims.role, "ADMIN-EO");
    }
}
