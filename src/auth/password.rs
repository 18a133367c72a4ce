//! Password hashing and verification.

/// bcrypt cost factor for seeded credentials.
pub const BCRYPT_COST: u32 = 12;

/// Hash a password with bcrypt.
pub fn hash(plain: &str) -> Result<String, bcrypt::BcryptError> {
    bcrypt::hash(plain, BCRYPT_COST)
}

/// Verify a password against a bcrypt hash. A malformed hash verifies as
/// false rather than erroring; callers only see a credential mismatch.
pub fn verify(plain: &str, hashed: &str) -> bool {
    bcrypt::verify(plain, hashed).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let hashed = hash("correct horse battery staple").unwrap();
        assert!(verify("correct horse battery staple", &hashed));
        assert!(!verify("wrong password", &hashed));
    }

    #[test]
    fn test_malformed_hash_verifies_false() {
        assert!(!verify("anything", "not-a-bcrypt-hash"));
    }
}
