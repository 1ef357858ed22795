use anyhow::{Context, Result};
use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::Config;
use crate::models::Role;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,  // user_id
    pub role: String, // "donor" | "recipient"
    pub jti: String,  // JWT ID (unique per token)
    pub exp: i64,     // Expiration time
    pub iat: i64,     // Issued at
    pub iss: String,  // Issuer
}

/// Verifies bearer tokens issued by the external auth service (HS256 with a
/// shared secret, issuer-checked).
///
/// Token issuance lives in the auth service; `create_token` exists here for
/// tooling and integration tests, which mint tokens directly instead of going
/// through a login flow.
pub struct AuthManager {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    /// Access token TTL in hours
    access_token_ttl_hours: i64,
    issuer: String,
}

impl AuthManager {
    pub fn new(config: &Config) -> Result<Self> {
        if config.jwt_secret.is_empty() {
            anyhow::bail!("JWT_SECRET is not configured");
        }

        Ok(Self {
            encoding_key: EncodingKey::from_secret(config.jwt_secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            access_token_ttl_hours: config.access_token_ttl_hours,
            issuer: config.jwt_issuer.clone(),
        })
    }

    /// Create an access token carrying the user's id and declared role.
    /// Returns (token, jti, expiration timestamp).
    pub fn create_token(&self, user_id: &Uuid, role: Role) -> Result<(String, String, i64)> {
        let now = Utc::now();
        let exp = now + Duration::hours(self.access_token_ttl_hours);
        let jti = Uuid::new_v4().to_string();

        let claims = Claims {
            sub: user_id.to_string(),
            role: role.as_str().to_string(),
            jti: jti.clone(),
            exp: exp.timestamp(),
            iat: now.timestamp(),
            iss: self.issuer.clone(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .context("Failed to encode JWT token")?;

        Ok((token, jti, exp.timestamp()))
    }

    /// Verify a token's signature, expiration and issuer, returning its claims.
    pub fn verify_token(&self, token: &str) -> Result<Claims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[self.issuer.clone()]);

        let token_data = decode::<Claims>(token, &self.decoding_key, &validation)
            .context("Token verification failed")?;

        Ok(token_data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DbConfig, LoggingConfig};

    fn test_config(secret: &str, issuer: &str) -> Config {
        Config {
            database_url: "postgres://localhost/unused".to_string(),
            port: 0,
            jwt_secret: secret.to_string(),
            jwt_issuer: issuer.to_string(),
            access_token_ttl_hours: 1,
            rust_log: "info".to_string(),
            logging: LoggingConfig {
                hash_salt: "test-salt".to_string(),
            },
            db: DbConfig {
                max_connections: 1,
                acquire_timeout_secs: 5,
                idle_timeout_secs: 60,
            },
        }
    }

    #[test]
    fn token_round_trip_preserves_claims() {
        let config = test_config("0123456789abcdef0123456789abcdef", "lifelink-auth");
        let manager = AuthManager::new(&config).unwrap();
        let user_id = Uuid::new_v4();

        let (token, jti, exp) = manager.create_token(&user_id, Role::Donor).unwrap();
        let claims = manager.verify_token(&token).unwrap();

        assert_eq!(claims.sub, user_id.to_string());
        assert_eq!(claims.role, "donor");
        assert_eq!(claims.jti, jti);
        assert_eq!(claims.exp, exp);
        assert_eq!(claims.iss, "lifelink-auth");
    }

    #[test]
    fn tampered_token_is_rejected() {
        let config = test_config("0123456789abcdef0123456789abcdef", "lifelink-auth");
        let manager = AuthManager::new(&config).unwrap();

        let (token, _, _) = manager
            .create_token(&Uuid::new_v4(), Role::Recipient)
            .unwrap();
        let mut tampered = token.clone();
        tampered.pop();
        tampered.push(if token.ends_with('x') { 'y' } else { 'x' });

        assert!(manager.verify_token(&tampered).is_err());
    }

    #[test]
    fn token_from_other_issuer_is_rejected() {
        let secret = "0123456789abcdef0123456789abcdef";
        let issuing = AuthManager::new(&test_config(secret, "someone-else")).unwrap();
        let verifying = AuthManager::new(&test_config(secret, "lifelink-auth")).unwrap();

        let (token, _, _) = issuing.create_token(&Uuid::new_v4(), Role::Donor).unwrap();
        assert!(verifying.verify_token(&token).is_err());
    }

    #[test]
    fn token_signed_with_other_secret_is_rejected() {
        let signing =
            AuthManager::new(&test_config("0123456789abcdef0123456789abcdef", "lifelink-auth"))
                .unwrap();
        let verifying =
            AuthManager::new(&test_config("fedcba9876543210fedcba9876543210", "lifelink-auth"))
                .unwrap();

        let (token, _, _) = signing.create_token(&Uuid::new_v4(), Role::Donor).unwrap();
        assert!(verifying.verify_token(&token).is_err());
    }
}
