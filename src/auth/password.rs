use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use rand::rngs::OsRng;

/// Hash a plaintext password with Argon2id and a fresh random salt.
pub fn hash_password(plain: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(plain.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| anyhow::anyhow!("password hashing failed: {e}"))
}

/// Check a plaintext password against a stored hash. A mismatching password
/// is `Ok(false)`; a stored hash that does not parse is an error.
pub fn verify_password(plain: &str, hash: &str) -> anyhow::Result<bool> {
    let parsed = PasswordHash::new(hash)
        .map_err(|e| anyhow::anyhow!("stored password hash is malformed: {e}"))?;
    Ok(Argon2::default()
        .verify_password(plain.as_bytes(), &parsed)
        .is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_has_argon2id_shape_and_verifies() {
        // Same credentials the bootstrap uses for the default admin.
        let hash = hash_password("admin123").expect("hash");
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("admin123", &hash).expect("verify"));
    }

    #[test]
    fn same_password_salts_to_different_hashes() {
        let first = hash_password("kasir-pagi").expect("hash");
        let second = hash_password("kasir-pagi").expect("hash");
        assert_ne!(first, second);
        assert!(verify_password("kasir-pagi", &second).expect("verify"));
    }

    #[test]
    fn wrong_password_is_rejected() {
        let hash = hash_password("kasir-pagi").expect("hash");
        assert!(!verify_password("kasir-sore", &hash).expect("verify"));
    }

    #[test]
    fn malformed_stored_hash_is_an_error() {
        assert!(verify_password("admin123", "plaintext-from-legacy-import").is_err());
    }
}
