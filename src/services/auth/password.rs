/*
 * Responsibility
 * - Argon2id password hashing and verification (PHC strings in the db)
 * - CPU-bound: call sites run this under spawn_blocking
 */
use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher as Argon2Hasher, PasswordVerifier, SaltString},
};
use rand::rngs::OsRng;

#[derive(Clone, Default)]
pub struct PasswordHasher {
    argon2: Argon2<'static>,
}

impl PasswordHasher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hash with a fresh random salt; output is a PHC string
    /// (`$argon2id$v=19$...`) that carries its own parameters.
    pub fn hash(&self, password: &str) -> Result<String, argon2::password_hash::Error> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = self.argon2.hash_password(password.as_bytes(), &salt)?;
        Ok(hash.to_string())
    }

    /// Verify a candidate password against a stored PHC string.
    ///
    /// `Ok(false)` is a wrong password; `Err` means the stored hash itself
    /// is malformed.
    pub fn verify(
        &self,
        password: &str,
        stored: &str,
    ) -> Result<bool, argon2::password_hash::Error> {
        let parsed = PasswordHash::new(stored)?;
        match self.argon2.verify_password(password.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_then_verify() {
        let hasher = PasswordHasher::new();
        let hash = hasher.hash("s3cret-pass").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(hasher.verify("s3cret-pass", &hash).unwrap());
    }

    #[test]
    fn wrong_password_fails_cleanly() {
        let hasher = PasswordHasher::new();
        let hash = hasher.hash("s3cret-pass").unwrap();
        assert!(!hasher.verify("not-the-pass", &hash).unwrap());
    }

    #[test]
    fn salts_are_unique() {
        let hasher = PasswordHasher::new();
        let a = hasher.hash("same").unwrap();
        let b = hasher.hash("same").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn malformed_stored_hash_is_an_error() {
        let hasher = PasswordHasher::new();
        assert!(hasher.verify("whatever", "not-a-phc-string").is_err());
    }
}
