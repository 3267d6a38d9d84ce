//! Default avatar URL for a new account, derived from the email address
//! (Gravatar's SHA-256 address hashing: trim, lowercase, hash).

use sha2::{Digest, Sha256};

pub fn gravatar_url(email: &str) -> String {
    let normalized = email.trim().to_lowercase();
    let digest = Sha256::digest(normalized.as_bytes());
    format!(
        "https://www.gravatar.com/avatar/{}?d=identicon",
        hex::encode(digest)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_case_and_whitespace() {
        assert_eq!(
            gravatar_url("  User@Example.COM "),
            gravatar_url("user@example.com")
        );
    }

    #[test]
    fn hash_is_lowercase_hex_sha256() {
        let url = gravatar_url("a@example.com");
        let hash = url
            .strip_prefix("https://www.gravatar.com/avatar/")
            .and_then(|rest| rest.split('?').next())
            .unwrap();
        assert_eq!(hash.len(), 64);
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn different_addresses_differ() {
        assert_ne!(gravatar_url("a@example.com"), gravatar_url("b@example.com"));
    }
}
