use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

use crate::errors::ServiceError;

/// Hashes a plaintext password into an Argon2 PHC string.
pub fn hash_password(plain: &str) -> Result<String, ServiceError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(plain.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| ServiceError::HashError(format!("Failed to hash password: {}", e)))
}

/// Checks a plaintext password against a stored PHC string.
pub fn verify_password(plain: &str, stored: &str) -> Result<bool, ServiceError> {
    let parsed = PasswordHash::new(stored)
        .map_err(|e| ServiceError::HashError(format!("Invalid password hash: {}", e)))?;

    Ok(Argon2::default()
        .verify_password(plain.as_bytes(), &parsed)
        .is_ok())
}
