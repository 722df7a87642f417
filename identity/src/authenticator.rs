//! Officer credential verification.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use votecheck_types::OfficerId;

use crate::{Credential, IdentityError, PasswordDirectory};

/// A credential-verification service for election officers.
///
/// `Ok(false)` means the service answered and rejected the credential;
/// `Err` means it could not answer.
#[async_trait]
pub trait OfficerAuthenticator: Send + Sync {
    async fn verify(&self, officer: &OfficerId, credential: &Credential)
        -> Result<bool, IdentityError>;
}

/// Verifies officers against an Argon2id [`PasswordDirectory`].
///
/// Hashing runs on the blocking pool so a slow KDF does not stall the
/// runtime.
pub struct DirectoryAuthenticator {
    directory: Arc<PasswordDirectory>,
}

impl DirectoryAuthenticator {
    pub fn new(directory: PasswordDirectory) -> Self {
        Self {
            directory: Arc::new(directory),
        }
    }
}

#[async_trait]
impl OfficerAuthenticator for DirectoryAuthenticator {
    async fn verify(
        &self,
        officer: &OfficerId,
        credential: &Credential,
    ) -> Result<bool, IdentityError> {
        let directory = Arc::clone(&self.directory);
        let id = officer.as_str().to_string();
        let credential = credential.clone();
        tokio::task::spawn_blocking(move || directory.verify(&id, &credential))
            .await
            .map_err(|e| IdentityError::Hash(format!("verification task failed: {e}")))?
    }
}

/// Accepts any non-empty credential after a fixed delay.
///
/// Performs no real authentication. Only for demonstrations.
pub struct SimulatedAuthenticator {
    delay: Duration,
}

impl SimulatedAuthenticator {
    pub fn new(delay: Duration) -> Self {
        tracing::warn!(
            ?delay,
            "simulated officer authentication enabled: any non-empty credential is accepted"
        );
        Self { delay }
    }
}

#[async_trait]
impl OfficerAuthenticator for SimulatedAuthenticator {
    async fn verify(
        &self,
        _officer: &OfficerId,
        credential: &Credential,
    ) -> Result<bool, IdentityError> {
        tokio::time::sleep(self.delay).await;
        Ok(!credential.is_empty())
    }
}
