//! Argon2id password hashing.
//!
//! A hash entry stores its salt and parameters next to the digest, so
//! parameters can be raised later without invalidating existing entries.

use argon2::{Algorithm, Argon2, Params, Version};
use serde::{Deserialize, Serialize};

use crate::{Credential, IdentityError};

/// Argon2id parameters: 64 MB memory, 3 iterations, 1 lane of parallelism.
const ARGON2_MEMORY_KIB: u32 = 65536;
const ARGON2_ITERATIONS: u32 = 3;
const ARGON2_PARALLELISM: u32 = 1;
const ARGON2_OUTPUT_LEN: usize = 32;

/// Salt length in bytes.
const SALT_LEN: usize = 16;

/// KDF parameters for Argon2id.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HashParams {
    pub memory: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl Default for HashParams {
    fn default() -> Self {
        Self {
            memory: ARGON2_MEMORY_KIB,
            iterations: ARGON2_ITERATIONS,
            parallelism: ARGON2_PARALLELISM,
        }
    }
}

impl HashParams {
    /// The cheapest parameters Argon2 accepts; for tests only.
    pub fn insecure_fast() -> Self {
        Self {
            memory: 8,
            iterations: 1,
            parallelism: 1,
        }
    }
}

/// A salted Argon2id digest of a password.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PasswordHash {
    /// Hex-encoded salt.
    pub salt: String,
    /// Hex-encoded digest.
    pub hash: String,
    #[serde(flatten)]
    pub params: HashParams,
}

impl PasswordHash {
    /// Hash `password` under a fresh random salt.
    pub fn create(password: &Credential, params: HashParams) -> Result<Self, IdentityError> {
        if password.is_empty() {
            return Err(IdentityError::EmptyCredential);
        }
        let mut salt = [0u8; SALT_LEN];
        getrandom::getrandom(&mut salt).map_err(|e| IdentityError::Hash(e.to_string()))?;
        let digest = derive(password.expose(), &salt, params)?;
        Ok(Self {
            salt: hex::encode(salt),
            hash: hex::encode(digest),
            params,
        })
    }

    /// Whether `password` hashes to this digest.
    pub fn verify(&self, password: &Credential) -> Result<bool, IdentityError> {
        let salt = hex::decode(&self.salt)
            .map_err(|e| IdentityError::Directory(format!("invalid salt hex: {e}")))?;
        let expected = hex::decode(&self.hash)
            .map_err(|e| IdentityError::Directory(format!("invalid hash hex: {e}")))?;
        let actual = derive(password.expose(), &salt, self.params)?;
        Ok(constant_time_eq(&actual, &expected))
    }
}

/// Derive a 32-byte digest from a password and salt using Argon2id.
fn derive(password: &str, salt: &[u8], params: HashParams) -> Result<[u8; 32], IdentityError> {
    let params = Params::new(
        params.memory,
        params.iterations,
        params.parallelism,
        Some(ARGON2_OUTPUT_LEN),
    )?;
    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

    let mut output = [0u8; 32];
    argon2.hash_password_into(password.as_bytes(), salt, &mut output)?;
    Ok(output)
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
