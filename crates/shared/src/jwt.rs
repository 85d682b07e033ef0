//! JWT bearer-token validation using RS256.
//!
//! EventSnaps does not issue tokens: the identity provider is external and
//! signs access tokens with its RSA private key. This service holds the
//! public key and validates the `sub` (user id) and `role` claims. The
//! encoding side exists for integration tests and local development, where
//! the test harness plays the role of the identity provider.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Error type for JWT operations.
#[derive(Debug, Error)]
pub enum JwtError {
    #[error("Failed to encode token: {0}")]
    EncodingError(String),

    #[error("Failed to decode token: {0}")]
    DecodingError(String),

    #[error("Token has expired")]
    TokenExpired,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Invalid key: {0}")]
    InvalidKey(String),
}

/// Role carried in the token, distinguishing administrators from
/// regular organizers/guests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    User,
    Admin,
}

impl UserRole {
    pub fn is_admin(self) -> bool {
        matches!(self, UserRole::Admin)
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UserRole::User => write!(f, "user"),
            UserRole::Admin => write!(f, "admin"),
        }
    }
}

/// JWT access-token claims.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,
    /// Role granted by the identity provider
    #[serde(default = "default_role")]
    pub role: UserRole,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// JWT ID (unique token identifier)
    pub jti: String,
}

fn default_role() -> UserRole {
    UserRole::User
}

/// Default leeway in seconds for clock skew tolerance.
pub const DEFAULT_LEEWAY_SECS: u64 = 30;

/// Configuration for JWT validation (and test-only issuance).
#[derive(Clone)]
pub struct JwtConfig {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    /// Access token expiration in seconds, used when issuing test tokens.
    pub access_token_expiry_secs: i64,
    /// Leeway in seconds for clock skew tolerance.
    pub leeway_secs: u64,
}

impl std::fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtConfig")
            .field("access_token_expiry_secs", &self.access_token_expiry_secs)
            .field("leeway_secs", &self.leeway_secs)
            .field("encoding_key", &"[REDACTED]")
            .field("decoding_key", &"[REDACTED]")
            .finish()
    }
}

impl JwtConfig {
    /// Creates a new JwtConfig from an RSA key pair in PEM format.
    pub fn new(
        private_key_pem: &str,
        public_key_pem: &str,
        access_token_expiry_secs: i64,
    ) -> Result<Self, JwtError> {
        Self::with_leeway(
            private_key_pem,
            public_key_pem,
            access_token_expiry_secs,
            DEFAULT_LEEWAY_SECS,
        )
    }

    /// Creates a new JwtConfig with a custom clock-skew leeway.
    pub fn with_leeway(
        private_key_pem: &str,
        public_key_pem: &str,
        access_token_expiry_secs: i64,
        leeway_secs: u64,
    ) -> Result<Self, JwtError> {
        let encoding_key = EncodingKey::from_rsa_pem(private_key_pem.as_bytes())
            .map_err(|e| JwtError::InvalidKey(format!("Invalid private key: {}", e)))?;

        let decoding_key = DecodingKey::from_rsa_pem(public_key_pem.as_bytes())
            .map_err(|e| JwtError::InvalidKey(format!("Invalid public key: {}", e)))?;

        Ok(Self {
            encoding_key,
            decoding_key,
            access_token_expiry_secs,
            leeway_secs,
        })
    }

    /// Generates an access token for the given user. Outside of tests this
    /// mirrors what the external identity provider would sign.
    pub fn generate_access_token(
        &self,
        user_id: Uuid,
        role: UserRole,
    ) -> Result<String, JwtError> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id.to_string(),
            role,
            exp: (now + Duration::seconds(self.access_token_expiry_secs)).timestamp(),
            iat: now.timestamp(),
            jti: Uuid::new_v4().to_string(),
        };

        encode(&Header::new(Algorithm::RS256), &claims, &self.encoding_key)
            .map_err(|e| JwtError::EncodingError(e.to_string()))
    }

    /// Validates a token and returns its claims.
    pub fn validate_access_token(&self, token: &str) -> Result<Claims, JwtError> {
        let mut validation = Validation::new(Algorithm::RS256);
        validation.leeway = self.leeway_secs;

        let data = decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| {
            match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => JwtError::TokenExpired,
                _ => JwtError::DecodingError(e.to_string()),
            }
        })?;

        Ok(data.claims)
    }
}

/// Parses the user id out of validated claims.
pub fn extract_user_id(claims: &Claims) -> Result<Uuid, JwtError> {
    Uuid::parse_str(&claims.sub).map_err(|_| JwtError::InvalidToken)
}

#[cfg(test)]
mod tests {
    use super::*;

    // 2048-bit RSA test key pair, generated for tests only.
    const TEST_PRIVATE_KEY: &str = include_str!("../testdata/jwt_test_private.pem");
    const TEST_PUBLIC_KEY: &str = include_str!("../testdata/jwt_test_public.pem");

    fn test_config() -> JwtConfig {
        JwtConfig::with_leeway(TEST_PRIVATE_KEY, TEST_PUBLIC_KEY, 3600, 0)
            .expect("test keys should parse")
    }

    #[test]
    fn test_generate_and_validate_round_trip() {
        let config = test_config();
        let user_id = Uuid::new_v4();

        let token = config
            .generate_access_token(user_id, UserRole::User)
            .unwrap();
        let claims = config.validate_access_token(&token).unwrap();

        assert_eq!(claims.sub, user_id.to_string());
        assert_eq!(claims.role, UserRole::User);
        assert_eq!(extract_user_id(&claims).unwrap(), user_id);
    }

    #[test]
    fn test_admin_role_round_trip() {
        let config = test_config();
        let token = config
            .generate_access_token(Uuid::new_v4(), UserRole::Admin)
            .unwrap();
        let claims = config.validate_access_token(&token).unwrap();
        assert!(claims.role.is_admin());
    }

    #[test]
    fn test_garbage_token_rejected() {
        let config = test_config();
        let result = config.validate_access_token("not-a-jwt");
        assert!(matches!(result, Err(JwtError::DecodingError(_))));
    }

    #[test]
    fn test_tampered_token_rejected() {
        let config = test_config();
        let token = config
            .generate_access_token(Uuid::new_v4(), UserRole::User)
            .unwrap();

        // Flip a character in the signature segment
        let mut tampered = token.clone();
        let last = tampered.pop().unwrap();
        tampered.push(if last == 'A' { 'B' } else { 'A' });

        assert!(config.validate_access_token(&tampered).is_err());
    }

    #[test]
    fn test_invalid_key_material() {
        let result = JwtConfig::new("not a pem", "also not a pem", 3600);
        assert!(matches!(result, Err(JwtError::InvalidKey(_))));
    }

    #[test]
    fn test_role_defaults_to_user_when_absent() {
        // Tokens minted before the role claim existed must still validate.
        let json = r#"{"sub":"x","exp":0,"iat":0,"jti":"y"}"#;
        let claims: Claims = serde_json::from_str(json).unwrap();
        assert_eq!(claims.role, UserRole::User);
    }

    #[test]
    fn test_user_role_display() {
        assert_eq!(UserRole::User.to_string(), "user");
        assert_eq!(UserRole::Admin.to_string(), "admin");
    }
}
