//! Password Hashing
//!
//! One-way argon2 hash + verify helpers. The rest of the system treats
//! these as an opaque collaborator and never sees raw password material
//! beyond this module's inputs.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};

/// Hash a password using argon2
pub fn hash(password: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let password_hash = argon2.hash_password(password.as_bytes(), &salt)?;
    Ok(password_hash.to_string())
}

/// Verify a password against a stored argon2 hash
pub fn verify(password: &str, stored_hash: &str) -> Result<bool, argon2::password_hash::Error> {
    let parsed_hash = PasswordHash::new(stored_hash)?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_and_verify_round_trip() {
        let hashed = hash("password123").expect("hashing failed");
        assert!(verify("password123", &hashed).expect("verify failed"));
        assert!(!verify("wrong-password", &hashed).expect("verify failed"));
    }

    #[test]
    fn verify_rejects_malformed_hash() {
        assert!(verify("password123", "not-a-hash").is_err());
    }
}
