//! Password hashing with bcrypt.
//!
//! Hashing is deliberately slow, so both operations run on the blocking pool.

/// bcrypt cost used when none is configured.
pub const DEFAULT_HASH_COST: u32 = 10;

/// Hash a password with a fresh salt.
pub async fn hash_password(password: &str, cost: u32) -> Result<String, PasswordError> {
    let password = password.to_owned();
    tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
        .await
        .map_err(|_| PasswordError::TaskFailed)?
        .map_err(PasswordError::Bcrypt)
}

/// Check a password against a stored hash.
/// A stored hash that bcrypt cannot parse is an error, not a mismatch.
pub async fn verify_password(password: &str, hash: &str) -> Result<bool, PasswordError> {
    let password = password.to_owned();
    let hash = hash.to_owned();
    tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
        .await
        .map_err(|_| PasswordError::TaskFailed)?
        .map_err(PasswordError::Bcrypt)
}

#[derive(Debug)]
pub enum PasswordError {
    Bcrypt(bcrypt::BcryptError),
    TaskFailed,
}

impl std::fmt::Display for PasswordError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PasswordError::Bcrypt(e) => write!(f, "bcrypt error: {}", e),
            PasswordError::TaskFailed => write!(f, "Password hashing task failed"),
        }
    }
}

impl std::error::Error for PasswordError {}
