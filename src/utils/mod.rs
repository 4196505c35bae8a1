use bcrypt::{hash, verify};
use chrono::Utc;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::Config;

// Matches the cost the accounts were originally hashed with.
const BCRYPT_COST: u32 = 10;

pub fn hash_password(password: &str) -> Result<String, bcrypt::BcryptError> {
    hash(password.as_bytes(), BCRYPT_COST)
}

pub fn verify_password(password: &str, hash: &str) -> Result<bool, bcrypt::BcryptError> {
    verify(password.as_bytes(), hash)
}

/// Claims embedded in the short-lived access token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessClaims {
    pub sub: String,
    pub email: String,
    pub username: String,
    pub name: String,
    pub iat: i64,
    pub exp: i64,
}

/// Claims embedded in the long-lived refresh token. Identity only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshClaims {
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
}

pub fn generate_access_token(
    user_id: Uuid,
    email: &str,
    username: &str,
    name: &str,
    config: &Config,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = Utc::now();
    let claims = AccessClaims {
        sub: user_id.to_string(),
        email: email.to_string(),
        username: username.to_string(),
        name: name.to_string(),
        iat: now.timestamp(),
        exp: (now + config.access_token_expiry()).timestamp(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.access_token_secret.as_bytes()),
    )
}

pub fn generate_refresh_token(
    user_id: Uuid,
    config: &Config,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = Utc::now();
    let claims = RefreshClaims {
        sub: user_id.to_string(),
        iat: now.timestamp(),
        exp: (now + config.refresh_token_expiry()).timestamp(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.refresh_token_secret.as_bytes()),
    )
}

pub fn verify_access_token(
    token: &str,
    config: &Config,
) -> Result<AccessClaims, jsonwebtoken::errors::Error> {
    let token_data = decode::<AccessClaims>(
        token,
        &DecodingKey::from_secret(config.access_token_secret.as_bytes()),
        &Validation::default(),
    )?;

    Ok(token_data.claims)
}

/// Same shape the original contact/account emails were checked against:
/// no whitespace, something before the '@', a dot with content after it.
pub fn is_valid_email(value: &str) -> bool {
    if value.is_empty() || value.chars().any(char::is_whitespace) {
        return false;
    }
    match (value.find('@'), value.rfind('.')) {
        (Some(at), Some(dot)) => at > 0 && dot > at + 1 && dot < value.len() - 1,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> Config {
        Config {
            database_url: "postgres://localhost/test".into(),
            server_host: "127.0.0.1".into(),
            server_port: 3000,
            access_token_secret: "access-secret".into(),
            refresh_token_secret: "refresh-secret".into(),
            access_token_expiry_secs: 15 * 60,
            refresh_token_expiry_secs: 7 * 24 * 3600,
        }
    }

    #[test]
    fn hashed_password_verifies_and_differs_from_plaintext() {
        let hashed = hash_password("secret1").unwrap();
        assert_ne!(hashed, "secret1");
        assert!(verify_password("secret1", &hashed).unwrap());
        assert!(!verify_password("wrong", &hashed).unwrap());
    }

    #[test]
    fn access_token_round_trips_identity_claims() {
        let config = test_config();
        let user_id = Uuid::new_v4();
        let token =
            generate_access_token(user_id, "a@b.com", "ann1", "Ann", &config).unwrap();

        let claims = verify_access_token(&token, &config).unwrap();
        assert_eq!(claims.sub, user_id.to_string());
        assert_eq!(claims.email, "a@b.com");
        assert_eq!(claims.username, "ann1");
        assert_eq!(claims.name, "Ann");
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn access_token_rejected_with_wrong_secret() {
        let config = test_config();
        let token =
            generate_access_token(Uuid::new_v4(), "a@b.com", "ann1", "Ann", &config).unwrap();

        let mut other = test_config();
        other.access_token_secret = "not-the-secret".into();
        assert!(verify_access_token(&token, &other).is_err());
    }

    #[test]
    fn refresh_token_does_not_verify_as_access_token() {
        let config = test_config();
        let token = generate_refresh_token(Uuid::new_v4(), &config).unwrap();
        // Signed with the refresh secret, so the access-token check must fail.
        assert!(verify_access_token(&token, &config).is_err());
    }

    #[test]
    fn expired_access_token_is_rejected() {
        let mut config = test_config();
        config.access_token_expiry_secs = -120;
        let token =
            generate_access_token(Uuid::new_v4(), "a@b.com", "ann1", "Ann", &config).unwrap();
        assert!(verify_access_token(&token, &config).is_err());
    }

    #[test]
    fn email_pattern_accepts_and_rejects() {
        assert!(is_valid_email("a@b.com"));
        assert!(is_valid_email("first.last@sub.example.org"));
        assert!(!is_valid_email(""));
        assert!(!is_valid_email("no-at-sign.com"));
        assert!(!is_valid_email("@b.com"));
        assert!(!is_valid_email("a@.com"));
        assert!(!is_valid_email("a@b."));
        assert!(!is_valid_email("a b@c.com"));
        assert!(!is_valid_email("a.b@c"));
    }
}
