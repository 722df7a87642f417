use thiserror::Error;

#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("no operator is signed in")]
    NotSignedIn,

    #[error("invalid email or password")]
    InvalidCredentials,

    #[error("credential must not be empty")]
    EmptyCredential,

    #[error("password directory error: {0}")]
    Directory(String),

    #[error("password hashing error: {0}")]
    Hash(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<argon2::Error> for IdentityError {
    fn from(e: argon2::Error) -> Self {
        IdentityError::Hash(e.to_string())
    }
}
