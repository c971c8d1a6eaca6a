//! Password login and session tokens
//!
//! A single user logs in with a password checked against an argon2 PHC hash
//! and receives an HS256 token valid for 24 hours.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Subject claim of every session token
pub const TOKEN_SUBJECT: &str = "burnrate_user";

/// Session token lifetime
const TOKEN_EXPIRY_HOURS: i64 = 24;

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    iat: i64,
    exp: i64,
}

/// Check a password against an argon2 PHC hash
pub fn verify_password(password: &str, phc_hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(phc_hash) else {
        warn!("Configured password hash is not a valid PHC string");
        return false;
    };

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

/// Hash a password into a PHC string suitable for `BURNRATE_PASSWORD_HASH`
pub fn hash_password(password: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("Failed to hash password: {}", e))?;
    Ok(hash.to_string())
}

/// Issue a session token, returning it with its expiry
pub fn create_token(secret: &str) -> anyhow::Result<(String, DateTime<Utc>)> {
    create_token_at(secret, Utc::now())
}

fn create_token_at(secret: &str, now: DateTime<Utc>) -> anyhow::Result<(String, DateTime<Utc>)> {
    let expires_at = now + Duration::hours(TOKEN_EXPIRY_HOURS);
    let claims = Claims {
        sub: TOKEN_SUBJECT.to_string(),
        iat: now.timestamp(),
        exp: expires_at.timestamp(),
    };

    let token = encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;
    Ok((token, expires_at))
}

/// Validate a session token, returning its expiry when it is still good
pub fn verify_token(token: &str, secret: &str) -> Option<DateTime<Utc>> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.sub = Some(TOKEN_SUBJECT.to_string());

    match decode::<Claims>(token, &DecodingKey::from_secret(secret.as_bytes()), &validation) {
        Ok(data) => DateTime::from_timestamp(data.claims.exp, 0),
        Err(e) => {
            debug!(error = %e, "Rejected session token");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_roundtrip() {
        let (token, expires_at) = create_token("s3cret").unwrap();
        let verified = verify_token(&token, "s3cret").unwrap();
        assert_eq!(verified.timestamp(), expires_at.timestamp());
        assert!(expires_at > Utc::now() + Duration::hours(23));
    }

    #[test]
    fn test_token_wrong_secret() {
        let (token, _) = create_token("s3cret").unwrap();
        assert!(verify_token(&token, "other").is_none());
        assert!(verify_token("not-a-token", "s3cret").is_none());
    }

    #[test]
    fn test_expired_token_rejected() {
        let issued = Utc::now() - Duration::hours(48);
        let (token, _) = create_token_at("s3cret", issued).unwrap();
        assert!(verify_token(&token, "s3cret").is_none());
    }

    #[test]
    fn test_password_hash_roundtrip() {
        let hash = hash_password("correct horse").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("correct horse", &hash));
        assert!(!verify_password("wrong", &hash));
        assert!(!verify_password("correct horse", "not-a-phc-string"));
    }
}
