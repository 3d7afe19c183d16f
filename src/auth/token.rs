use crate::config::AuthConfig;
use crate::error::AppError;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// Represents the claims encoded within a JWT (JSON Web Token).
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject of the token: the username of the authenticated user.
    pub sub: String,
    /// Expiration timestamp (seconds since epoch) for the token.
    pub exp: usize,
    /// Timestamp (seconds since epoch) at which the token was issued.
    pub iat: usize,
}

/// Issues and verifies signed bearer tokens.
///
/// Built once at startup from an immutable [`AuthConfig`] and shared across
/// requests. Keys and the accepted algorithm are fixed for the lifetime of
/// the process. Tokens are stateless; there is no revocation list, a token
/// stays valid until its expiry no matter what happens to the account in
/// between (the resolver re-checks the account on every request instead).
pub struct TokenService {
    header: Header,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    default_ttl: Duration,
}

impl TokenService {
    pub fn new(config: &AuthConfig) -> Self {
        let mut validation = Validation::new(config.jwt_algorithm);
        // No leeway: a token issued with ttl=0 is dead on arrival.
        validation.leeway = 0;

        Self {
            header: Header::new(config.jwt_algorithm),
            encoding_key: EncodingKey::from_secret(config.jwt_secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            validation,
            default_ttl: config.token_ttl,
        }
    }

    /// Issues a signed token for `subject`, expiring after `ttl`
    /// (or the configured default when `None`).
    pub fn issue(&self, subject: &str, ttl: Option<Duration>) -> Result<String, AppError> {
        let now = Utc::now();
        let expires_at = now
            .checked_add_signed(ttl.unwrap_or(self.default_ttl))
            .ok_or_else(|| AppError::Internal("token expiry out of range".into()))?;

        let claims = Claims {
            sub: subject.to_owned(),
            exp: expires_at.timestamp() as usize,
            iat: now.timestamp() as usize,
        };

        encode(&self.header, &claims, &self.encoding_key)
            .map_err(|e| AppError::Internal(format!("Failed to generate token: {}", e)))
    }

    /// Verifies a token and returns its claims.
    ///
    /// Every failure mode collapses into the same `Unauthenticated` error:
    /// malformed token, bad signature, expired timestamp, or an algorithm
    /// other than the configured one. Callers cannot tell these apart, which
    /// keeps the endpoint from acting as a token oracle.
    pub fn verify(&self, token: &str) -> Result<Claims, AppError> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|_| AppError::Unauthenticated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::Algorithm;
    use std::thread;
    use std::time::Duration as StdDuration;

    fn test_config(secret: &str, algorithm: Algorithm) -> AuthConfig {
        AuthConfig {
            jwt_secret: secret.to_string(),
            jwt_algorithm: algorithm,
            token_ttl: Duration::minutes(30),
        }
    }

    fn test_service(secret: &str) -> TokenService {
        TokenService::new(&test_config(secret, Algorithm::HS256))
    }

    #[test]
    fn test_token_generation_and_verification() {
        let service = test_service("test_secret_for_gen_verify");
        let token = service.issue("alice", None).unwrap();
        let claims = service.verify(&token).unwrap();
        assert_eq!(claims.sub, "alice");
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_token_expiration() {
        let service = test_service("test_secret_for_expiration");

        // A negative TTL produces a token that expired before it was issued.
        let expired_token = service
            .issue("bob", Some(Duration::minutes(-5)))
            .unwrap();

        match service.verify(&expired_token) {
            Err(AppError::Unauthenticated) => {}
            Ok(_) => panic!("Token should have been invalid due to expiration"),
            Err(e) => panic!("Unexpected error type for expired token: {:?}", e),
        }
    }

    #[test]
    fn test_zero_ttl_token_is_rejected() {
        let service = test_service("test_secret_for_zero_ttl");
        let token = service.issue("carol", Some(Duration::zero())).unwrap();

        // exp == iat and the validator has no leeway, so one second later
        // the token must be dead.
        thread::sleep(StdDuration::from_millis(1100));
        assert!(service.verify(&token).is_err());
    }

    #[test]
    fn test_tampered_token_is_rejected() {
        let service = test_service("test_secret_for_tampering");
        let token = service.issue("dave", None).unwrap();

        // Flip one character of the payload segment.
        let mut bytes = token.into_bytes();
        let idx = bytes.len() / 2;
        bytes[idx] = if bytes[idx] == b'a' { b'b' } else { b'a' };
        let tampered = String::from_utf8(bytes).unwrap();

        assert!(service.verify(&tampered).is_err());
    }

    #[test]
    fn test_invalid_token_signature() {
        let issuing = test_service("one_secret");
        let verifying = test_service("a_completely_different_secret");

        let token = issuing.issue("eve", None).unwrap();
        match verifying.verify(&token) {
            Err(AppError::Unauthenticated) => {}
            Ok(_) => panic!("Token should have been invalid due to signature mismatch"),
            Err(e) => panic!("Unexpected error type for invalid signature: {:?}", e),
        }
    }

    #[test]
    fn test_unsupported_algorithm_is_rejected() {
        // Token signed with HS384 must not pass a service configured for HS256,
        // even though both use the same secret.
        let hs384 = TokenService::new(&test_config("shared_secret", Algorithm::HS384));
        let hs256 = TokenService::new(&test_config("shared_secret", Algorithm::HS256));

        let token = hs384.issue("frank", None).unwrap();
        assert!(hs384.verify(&token).is_ok());
        assert!(hs256.verify(&token).is_err());
    }

    #[test]
    fn test_malformed_token_is_rejected() {
        let service = test_service("test_secret_for_malformed");
        assert!(service.verify("not-a-jwt").is_err());
        assert!(service.verify("").is_err());
        assert!(service.verify("a.b.c").is_err());
    }
}
