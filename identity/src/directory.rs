//! TOML-backed directory of password hashes.
//!
//! ```toml
//! [[entries]]
//! id = "A1"
//! salt = "9f2c..."
//! hash = "41be..."
//! memory = 65536
//! iterations = 3
//! parallelism = 1
//! ```

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{Credential, IdentityError, PasswordHash};

/// One identity and its password hash.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryEntry {
    pub id: String,
    #[serde(flatten)]
    pub password: PasswordHash,
}

#[derive(Default, Serialize, Deserialize)]
struct DirectoryFile {
    #[serde(default)]
    entries: Vec<DirectoryEntry>,
}

/// Identities (officer ids or operator emails) mapped to password hashes.
#[derive(Clone, Debug, Default)]
pub struct PasswordDirectory {
    entries: HashMap<String, PasswordHash>,
}

impl PasswordDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a directory from a TOML file.
    pub fn from_toml_file(path: &Path) -> Result<Self, IdentityError> {
        let content = std::fs::read_to_string(path)?;
        let directory = Self::from_toml_str(&content)?;
        tracing::info!(
            path = %path.display(),
            entries = directory.len(),
            "loaded password directory"
        );
        Ok(directory)
    }

    /// Parse a directory from a TOML string. Duplicate ids are rejected.
    pub fn from_toml_str(s: &str) -> Result<Self, IdentityError> {
        let file: DirectoryFile =
            toml::from_str(s).map_err(|e| IdentityError::Directory(e.to_string()))?;
        let mut directory = Self::new();
        for entry in file.entries {
            let id = entry.id.trim().to_string();
            if id.is_empty() {
                return Err(IdentityError::Directory("entry with empty id".to_string()));
            }
            if directory.entries.insert(id.clone(), entry.password).is_some() {
                return Err(IdentityError::Directory(format!("duplicate entry for {id}")));
            }
        }
        Ok(directory)
    }

    pub fn insert(&mut self, id: &str, password: PasswordHash) {
        self.entries.insert(id.trim().to_string(), password);
    }

    pub fn get(&self, id: &str) -> Option<&PasswordHash> {
        self.entries.get(id.trim())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Check `credential` against the entry for `id`. Unknown ids never match.
    pub fn verify(&self, id: &str, credential: &Credential) -> Result<bool, IdentityError> {
        match self.get(id) {
            Some(hash) => hash.verify(credential),
            None => Ok(false),
        }
    }
}

impl DirectoryEntry {
    /// Render as a `[[entries]]` table ready to append to a directory file.
    pub fn to_toml_string(&self) -> Result<String, IdentityError> {
        let file = DirectoryFile {
            entries: vec![self.clone()],
        };
        toml::to_string(&file).map_err(|e| IdentityError::Directory(e.to_string()))
    }
}
