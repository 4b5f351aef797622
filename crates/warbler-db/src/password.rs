use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{SaltString, rand_core::OsRng},
};

use crate::{DbError, Result};

/// Salted Argon2id hash in PHC string form (`$argon2id$...`).
pub fn hash(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| DbError::Hash(e.to_string()))
}

/// False for a wrong password and for any stored value that is not a PHC hash.
pub fn verify(password: &str, stored: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(stored) else {
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hashes_are_salted() {
        let a = hash("cottoncandy").unwrap();
        let b = hash("cottoncandy").unwrap();
        assert!(a.starts_with("$argon2id$"));
        assert_ne!(a, b);
        assert!(verify("cottoncandy", &a));
        assert!(verify("cottoncandy", &b));
        assert!(!verify("cotton", &a));
    }

    #[test]
    fn plain_text_never_verifies() {
        assert!(!verify("HASHED_PASSWORD", "HASHED_PASSWORD"));
    }
}
