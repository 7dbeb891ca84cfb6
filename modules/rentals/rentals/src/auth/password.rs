use super::AuthError;

/// bcrypt password hashing with a configurable cost factor.
///
/// Verification treats malformed stored hashes as a mismatch rather than
/// an error, so login never leaks storage state to the caller.
#[derive(Clone, Copy, Debug)]
pub struct PasswordHasher {
    cost: u32,
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self {
            cost: bcrypt::DEFAULT_COST,
        }
    }
}

impl PasswordHasher {
    #[must_use]
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }

    /// Hasher with the minimum cost bcrypt accepts. Test use only; far
    /// too weak for real credentials.
    #[must_use]
    pub fn fast_for_tests() -> Self {
        Self { cost: 4 }
    }

    pub fn hash(&self, plain: &str) -> Result<String, AuthError> {
        Ok(bcrypt::hash(plain, self.cost)?)
    }

    #[must_use]
    pub fn verify(&self, plain: &str, stored_hash: &str) -> bool {
        bcrypt::verify(plain, stored_hash).unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn hash_then_verify_roundtrip() {
        let hasher = PasswordHasher::fast_for_tests();
        let hash = hasher.hash("correct horse").unwrap();

        assert_ne!(hash, "correct horse");
        assert!(hasher.verify("correct horse", &hash));
        assert!(!hasher.verify("battery staple", &hash));
    }

    #[test]
    fn malformed_stored_hash_is_a_mismatch() {
        let hasher = PasswordHasher::fast_for_tests();
        assert!(!hasher.verify("anything", "not-a-bcrypt-hash"));
    }

    #[test]
    fn hashes_are_salted() {
        let hasher = PasswordHasher::fast_for_tests();
        let a = hasher.hash("same input").unwrap();
        let b = hasher.hash("same input").unwrap();
        assert_ne!(a, b);
    }
}
