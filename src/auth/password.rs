//! Password hashing and verification

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PasswordError {
    #[error("Password hashing failed: {0}")]
    HashingFailed(String),
}

impl From<bcrypt::BcryptError> for PasswordError {
    fn from(e: bcrypt::BcryptError) -> Self {
        PasswordError::HashingFailed(e.to_string())
    }
}

/// Checks a plaintext password against a stored hash
pub trait CredentialVerifier: Send + Sync {
    fn verify(&self, password: &str, stored_hash: &str) -> Result<bool, PasswordError>;
}

/// bcrypt-backed credential verifier
#[derive(Debug, Clone, Copy, Default)]
pub struct BcryptVerifier;

impl CredentialVerifier for BcryptVerifier {
    fn verify(&self, password: &str, stored_hash: &str) -> Result<bool, PasswordError> {
        Ok(bcrypt::verify(password, stored_hash)?)
    }
}

/// Hash a password for storage
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    hash_password_with_cost(password, bcrypt::DEFAULT_COST)
}

pub fn hash_password_with_cost(password: &str, cost: u32) -> Result<String, PasswordError> {
    Ok(bcrypt::hash(password, cost)?)
}
