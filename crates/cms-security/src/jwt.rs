//! JWT token handling

use chrono::{Duration, Utc};
use cms_shared::constants::ADMIN_ROLE;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum JwtError {
    #[error("Token creation failed: {0}")]
    CreationError(String),
    #[error("Token validation failed: {0}")]
    ValidationError(String),
    #[error("Token expired")]
    TokenExpired,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Claims {
    pub sub: String,
    pub role: String,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    pub fn is_admin(&self) -> bool {
        self.role == ADMIN_ROLE
    }
}

/// HS256 bearer tokens for the admin API.
pub struct JwtService {
    secret: String,
    token_ttl_secs: i64,
}

impl JwtService {
    pub fn new(secret: String, token_ttl_secs: i64) -> Self {
        Self {
            secret,
            token_ttl_secs,
        }
    }

    pub fn issue(&self, subject: &str, role: &str) -> Result<String, JwtError> {
        let now = Utc::now();
        let claims = Claims {
            sub: subject.to_string(),
            role: role.to_string(),
            iat: now.timestamp(),
            exp: (now + Duration::seconds(self.token_ttl_secs)).timestamp(),
        };
        self.encode_claims(&claims)
    }

    pub fn issue_admin(&self, subject: &str) -> Result<String, JwtError> {
        self.issue(subject, ADMIN_ROLE)
    }

    fn encode_claims(&self, claims: &Claims) -> Result<String, JwtError> {
        encode(
            &Header::default(),
            claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| JwtError::CreationError(e.to_string()))
    }

    pub fn validate(&self, token: &str) -> Result<Claims, JwtError> {
        decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &Validation::default(),
        )
        .map(|data| data.claims)
        .map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => JwtError::TokenExpired,
            _ => JwtError::ValidationError(e.to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> JwtService {
        JwtService::new("unit-test-secret".to_string(), 600)
    }

    #[test]
    fn test_issue_and_validate_admin() {
        let jwt = service();
        let token = jwt.issue_admin("editor@lightbox.example").unwrap();
        let claims = jwt.validate(&token).unwrap();
        assert_eq!(claims.sub, "editor@lightbox.example");
        assert!(claims.is_admin());
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_non_admin_role() {
        let jwt = service();
        let claims = jwt.validate(&jwt.issue("guest", "viewer").unwrap()).unwrap();
        assert!(!claims.is_admin());
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = service().issue_admin("editor").unwrap();
        let other = JwtService::new("another-secret".to_string(), 600);
        assert!(matches!(other.validate(&token), Err(JwtError::ValidationError(_))));
    }

    #[test]
    fn test_expired_token() {
        let jwt = service();
        let now = Utc::now().timestamp();
        let token = jwt
            .encode_claims(&Claims {
                sub: "editor".to_string(),
                role: ADMIN_ROLE.to_string(),
                iat: now - 7200,
                exp: now - 3600,
            })
            .unwrap();
        assert!(matches!(jwt.validate(&token), Err(JwtError::TokenExpired)));
    }
}
