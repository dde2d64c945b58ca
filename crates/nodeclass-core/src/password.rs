//! Salted password hashing.

use argon2::Argon2;
use argon2::password_hash::{
    Error as PasswordHashError, PasswordHash, PasswordHasher, PasswordVerifier, SaltString,
    rand_core::OsRng,
};

use crate::error::{EncError, EncResult};

/// Hash `plaintext` into an Argon2 PHC string with a fresh salt.
///
/// # Errors
///
/// Returns [`EncError::PasswordHash`] if the hasher rejects the input.
pub fn hash_password(plaintext: &str) -> EncResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(plaintext.as_bytes(), &salt)
        .map_err(|err| EncError::PasswordHash {
            detail: err.to_string(),
        })?;
    Ok(hash.to_string())
}

/// Check `candidate` against a stored PHC hash.
///
/// # Errors
///
/// Returns [`EncError::StoredHashInvalid`] when the stored hash cannot be
/// parsed or verification fails for a reason other than a mismatch.
pub fn verify_password(stored_hash: &str, candidate: &str) -> EncResult<bool> {
    let parsed = PasswordHash::new(stored_hash).map_err(|err| EncError::StoredHashInvalid {
        detail: err.to_string(),
    })?;
    match Argon2::default().verify_password(candidate.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(PasswordHashError::Password) => Ok(false),
        Err(err) => Err(EncError::StoredHashInvalid {
            detail: err.to_string(),
        }),
    }
}
