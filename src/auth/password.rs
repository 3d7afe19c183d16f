use crate::error::AppError;
use bcrypt::{hash, verify, DEFAULT_COST};

/// Hashes a plaintext password with bcrypt.
///
/// Empty input hashes like any other string; minimum-length rules live in
/// request validation, not here.
pub fn hash_password(password: &str) -> Result<String, AppError> {
    hash(password, DEFAULT_COST)
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))
}

/// Checks a plaintext password against a stored bcrypt hash.
///
/// A malformed or truncated stored hash counts as a mismatch rather than an
/// error, so a corrupted row can never crash a login attempt.
pub fn verify_password(password: &str, hashed_password: &str) -> bool {
    verify(password, hashed_password).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_hashing_and_verification() {
        let password = "test_password123";
        let hashed = hash_password(password).unwrap();

        assert!(verify_password(password, &hashed));
        assert!(!verify_password("wrong_password", &hashed));
    }

    #[test]
    fn test_distinct_passwords_do_not_cross_verify() {
        let first = hash_password("first-password").unwrap();
        let second = hash_password("second-password").unwrap();

        assert!(!verify_password("first-password", &second));
        assert!(!verify_password("second-password", &first));
    }

    #[test]
    fn test_verify_with_invalid_hash() {
        // Garbage in the hash column must read as "no match", not a panic.
        assert!(!verify_password("test_password123", "invalidhashformat"));
        assert!(!verify_password("test_password123", ""));
    }

    #[test]
    fn test_empty_password_round_trip() {
        let hashed = hash_password("").unwrap();
        assert!(verify_password("", &hashed));
        assert!(!verify_password("not-empty", &hashed));
    }
}
