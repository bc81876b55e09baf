use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::AuthConfig;
use crate::models::Principal;

/// Claims embedded in every token issued by this service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Standard JWT subject — set to the username.
    pub sub: String,
    /// Roles granted at issuance time ("USER" / "ADMIN").
    pub roles: Vec<String>,
    /// Issued-at (Unix timestamp, seconds).
    pub iat: usize,
    /// Expiry (Unix timestamp, seconds).
    pub exp: usize,
}

/// Why a presented token was rejected. Callers must treat every variant as
/// "unauthenticated"; the distinction exists for logging.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum TokenError {
    #[error("token is malformed")]
    Malformed,

    #[error("token signature does not verify")]
    BadSignature,

    #[error("token has expired")]
    Expired,
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("jwt signing secret is not configured")]
pub struct ConfigError;

/// Issues and validates HS256 bearer tokens.
///
/// Holds only the derived signing keys and the TTL; no state is kept
/// between calls, so one instance is shared across all request tasks.
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl_secs: i64,
}

impl TokenService {
    pub fn new(secret: &str, ttl_secs: i64) -> Result<Self, ConfigError> {
        if secret.trim().is_empty() {
            return Err(ConfigError);
        }
        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            ttl_secs,
        })
    }

    pub fn from_config(auth: &AuthConfig) -> Result<Self, ConfigError> {
        Self::new(&auth.jwt_secret, auth.jwt_expiration_secs)
    }

    /// Issue a token for an authenticated principal. Subject is the
    /// username; `exp` is `iat` plus the configured TTL.
    pub fn issue(&self, principal: &Principal) -> Result<String, jsonwebtoken::errors::Error> {
        let now = Utc::now();
        let claims = Claims {
            sub: principal.username.clone(),
            roles: vec![principal.role.as_str().to_string()],
            iat: now.timestamp() as usize,
            exp: (now + Duration::seconds(self.ttl_secs)).timestamp() as usize,
        };
        encode(&Header::default(), &claims, &self.encoding_key)
    }

    /// Verify a presented token and return its claims.
    ///
    /// Checked in two passes: first the claim shape and expiry with the
    /// signature ignored, then the signature itself. An expired token is
    /// therefore reported as `Expired` no matter what key signed it; the
    /// ordering only affects which rejection gets logged.
    pub fn validate(&self, token: &str) -> Result<Claims, TokenError> {
        let mut unsigned = Validation::new(Algorithm::HS256);
        unsigned.insecure_disable_signature_validation();
        unsigned.leeway = 0;
        decode::<Claims>(token, &DecodingKey::from_secret(&[]), &unsigned).map_err(|e| {
            match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Malformed,
            }
        })?;

        let mut signed = Validation::new(Algorithm::HS256);
        signed.leeway = 0;
        let data = decode::<Claims>(token, &self.decoding_key, &signed).map_err(|e| {
            match e.kind() {
                ErrorKind::InvalidSignature => TokenError::BadSignature,
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Malformed,
            }
        })?;
        Ok(data.claims)
    }

    /// Project the subject out of a token without re-verifying the
    /// signature. The caller must have run `validate` first; this exists
    /// so hot paths do not pay for a second HMAC.
    pub fn extract_subject(token: &str) -> Result<String, TokenError> {
        let mut unsigned = Validation::new(Algorithm::HS256);
        unsigned.insecure_disable_signature_validation();
        unsigned.validate_exp = false;
        unsigned.required_spec_claims.clear();
        let data = decode::<Claims>(token, &DecodingKey::from_secret(&[]), &unsigned)
            .map_err(|_| TokenError::Malformed)?;
        Ok(data.claims.sub)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RoleType;

    fn service(secret: &str, ttl_secs: i64) -> TokenService {
        TokenService::new(secret, ttl_secs).unwrap()
    }

    fn principal(role: RoleType) -> Principal {
        Principal {
            id: 1,
            username: "alice".to_string(),
            role,
        }
    }

    fn raw_token(secret: &str, sub: &str, iat: i64, exp: i64) -> String {
        let claims = Claims {
            sub: sub.to_string(),
            roles: vec!["USER".to_string()],
            iat: iat as usize,
            exp: exp as usize,
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    #[test]
    fn validate_accepts_freshly_issued_token() {
        let tokens = service("test-secret", 3600);
        let token = tokens.issue(&principal(RoleType::User)).unwrap();

        let claims = tokens.validate(&token).unwrap();
        assert_eq!(claims.sub, "alice");
        assert_eq!(claims.roles, vec!["USER".to_string()]);
        assert_eq!(claims.exp, claims.iat + 3600);
    }

    #[test]
    fn extract_subject_matches_issued_username() {
        let tokens = service("test-secret", 3600);
        let token = tokens.issue(&principal(RoleType::Admin)).unwrap();

        assert_eq!(TokenService::extract_subject(&token).unwrap(), "alice");
    }

    #[test]
    fn expired_token_is_rejected_as_expired() {
        let tokens = service("test-secret", 3600);
        let now = Utc::now().timestamp();
        // Issued at t=0 with TTL 3600, presented at t=3601.
        let token = raw_token("test-secret", "alice", now - 3601, now - 1);

        assert_eq!(tokens.validate(&token), Err(TokenError::Expired));
    }

    #[test]
    fn expired_wins_over_bad_signature() {
        let tokens = service("test-secret", 3600);
        let now = Utc::now().timestamp();
        let token = raw_token("some-other-secret", "alice", now - 7200, now - 60);

        assert_eq!(tokens.validate(&token), Err(TokenError::Expired));
    }

    #[test]
    fn token_signed_with_different_key_is_rejected() {
        let tokens = service("test-secret", 3600);
        let now = Utc::now().timestamp();
        let token = raw_token("some-other-secret", "alice", now, now + 3600);

        assert_eq!(tokens.validate(&token), Err(TokenError::BadSignature));
    }

    #[test]
    fn garbage_token_is_malformed() {
        let tokens = service("test-secret", 3600);

        assert_eq!(tokens.validate("not.a.token"), Err(TokenError::Malformed));
        assert_eq!(tokens.validate(""), Err(TokenError::Malformed));
    }

    #[test]
    fn extract_subject_does_not_verify_signature() {
        let now = Utc::now().timestamp();
        // Signed with a key this service has never seen; projection still works.
        let token = raw_token("some-other-secret", "mallory", now - 7200, now - 3600);

        assert_eq!(TokenService::extract_subject(&token).unwrap(), "mallory");
    }

    #[test]
    fn empty_secret_is_a_config_error() {
        assert_eq!(TokenService::new("", 3600).err(), Some(ConfigError));
        assert_eq!(TokenService::new("   ", 3600).err(), Some(ConfigError));
    }
}
