//! [`PasswordHasher`] backed by Argon2id with a random per-password salt.

use argon2::password_hash::{
    PasswordHash as PhcString, PasswordHasher as _, PasswordVerifier as _, SaltString,
};
use argon2::{Algorithm, Argon2, Params, Version};
use rand::RngCore;
use rand::rngs::OsRng;

use crate::domain::ports::{PasswordHashError, PasswordHasher};
use crate::domain::{Password, PasswordHash};

const SALT_LEN: usize = 16;

/// Argon2id hasher. Verification reads the cost parameters from the stored
/// PHC string, so hashes created with other parameters still verify.
#[derive(Debug, Clone)]
pub struct Argon2PasswordHasher {
    params: Params,
}

impl Default for Argon2PasswordHasher {
    fn default() -> Self {
        Self::new()
    }
}

impl Argon2PasswordHasher {
    /// Create a hasher with default Argon2id parameters.
    pub fn new() -> Self {
        Self {
            params: Params::default(),
        }
    }

    /// Create a hasher with explicit cost parameters.
    pub fn with_params(params: Params) -> Self {
        Self { params }
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }
}

impl PasswordHasher for Argon2PasswordHasher {
    fn hash(&self, password: &Password) -> Result<PasswordHash, PasswordHashError> {
        let mut salt = [0_u8; SALT_LEN];
        OsRng.fill_bytes(&mut salt);
        let salt = SaltString::encode_b64(&salt)
            .map_err(|err| PasswordHashError::hash(err.to_string()))?;
        let phc = self
            .argon2()
            .hash_password(password.expose().as_bytes(), &salt)
            .map_err(|err| PasswordHashError::hash(err.to_string()))?;
        Ok(PasswordHash::new(phc.to_string()))
    }

    fn verify(&self, candidate: &str, hash: &PasswordHash) -> Result<bool, PasswordHashError> {
        let parsed = PhcString::new(hash.as_str())
            .map_err(|err| PasswordHashError::malformed(err.to_string()))?;
        match self.argon2().verify_password(candidate.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(err) => Err(PasswordHashError::hash(err.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn password(raw: &str) -> Password {
        Password::new(raw).expect("valid password")
    }

    #[test]
    fn hash_is_phc_and_salted() {
        let hasher = Argon2PasswordHasher::new();
        let first = hasher.hash(&password("correct horse")).expect("hash");
        let second = hasher.hash(&password("correct horse")).expect("hash");

        assert!(first.as_str().starts_with("$argon2id$"));
        assert_ne!(first, second);
        assert!(!first.as_str().contains("correct horse"));
    }

    #[rstest]
    #[case("correct horse", true)]
    #[case("correct horsE", false)]
    #[case("", false)]
    fn verify_matches_only_the_original(#[case] candidate: &str, #[case] expected: bool) {
        let hasher = Argon2PasswordHasher::new();
        let hash = hasher.hash(&password("correct horse")).expect("hash");
        assert_eq!(hasher.verify(candidate, &hash).expect("verify"), expected);
    }

    #[test]
    fn garbage_hash_is_reported_as_malformed() {
        let hasher = Argon2PasswordHasher::new();
        let err = hasher
            .verify("anything", &PasswordHash::new("not-a-phc-string"))
            .expect_err("malformed");
        assert!(matches!(err, PasswordHashError::Malformed { .. }));
    }
}
