//! Operator sign-in and session gating.
//!
//! The dashboard only lets a signed-in operator open a verification
//! workflow. Rather than looking the user up from ambient global state, the
//! caller obtains a [`SessionContext`] once and passes it to the workflow.

use std::sync::{Arc, PoisonError, RwLock};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::{Credential, IdentityError, PasswordDirectory};

/// A signed-in dashboard user.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Operator {
    pub email: String,
}

impl Operator {
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
        }
    }
}

/// The auth service for dashboard operators.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// The signed-in operator, if any.
    fn current_user(&self) -> Option<Operator>;

    async fn sign_in(&self, email: &str, password: &Credential) -> Result<Operator, IdentityError>;

    fn sign_out(&self);
}

/// Proof that an operator was signed in when the session was established.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionContext {
    operator: Operator,
}

impl SessionContext {
    /// Capture the current operator, failing with
    /// [`IdentityError::NotSignedIn`] when nobody is signed in.
    pub fn require(provider: &dyn IdentityProvider) -> Result<Self, IdentityError> {
        provider
            .current_user()
            .map(|operator| Self { operator })
            .ok_or(IdentityError::NotSignedIn)
    }

    pub fn for_operator(operator: Operator) -> Self {
        Self { operator }
    }

    pub fn operator(&self) -> &Operator {
        &self.operator
    }
}

/// An [`IdentityProvider`] backed by a password directory keyed by email.
pub struct DirectoryIdentityProvider {
    directory: Arc<PasswordDirectory>,
    current: RwLock<Option<Operator>>,
}

impl DirectoryIdentityProvider {
    pub fn new(directory: PasswordDirectory) -> Self {
        Self {
            directory: Arc::new(directory),
            current: RwLock::new(None),
        }
    }
}

#[async_trait]
impl IdentityProvider for DirectoryIdentityProvider {
    fn current_user(&self) -> Option<Operator> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    async fn sign_in(&self, email: &str, password: &Credential) -> Result<Operator, IdentityError> {
        if password.is_empty() {
            return Err(IdentityError::EmptyCredential);
        }
        let directory = Arc::clone(&self.directory);
        let id = email.trim().to_string();
        let credential = password.clone();
        let matched = tokio::task::spawn_blocking(move || directory.verify(&id, &credential))
            .await
            .map_err(|e| IdentityError::Hash(format!("sign-in task failed: {e}")))??;

        if !matched {
            tracing::warn!(email = email.trim(), "operator sign-in rejected");
            return Err(IdentityError::InvalidCredentials);
        }

        let operator = Operator::new(email.trim());
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = Some(operator.clone());
        tracing::info!(email = %operator.email, "operator signed in");
        Ok(operator)
    }

    fn sign_out(&self) {
        let previous = self
            .current
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(operator) = previous {
            tracing::info!(email = %operator.email, "operator signed out");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{HashParams, PasswordHash};

    fn provider() -> DirectoryIdentityProvider {
        let mut directory = PasswordDirectory::new();
        directory.insert(
            "clerk@example.org",
            PasswordHash::create(&"secret".into(), HashParams::insecure_fast()).unwrap(),
        );
        DirectoryIdentityProvider::new(directory)
    }

    #[tokio::test]
    async fn session_requires_sign_in() {
        let provider = provider();
        assert!(matches!(
            SessionContext::require(&provider),
            Err(IdentityError::NotSignedIn)
        ));

        provider
            .sign_in("clerk@example.org", &"secret".into())
            .await
            .unwrap();
        let session = SessionContext::require(&provider).unwrap();
        assert_eq!(session.operator().email, "clerk@example.org");

        provider.sign_out();
        assert!(provider.current_user().is_none());
        assert!(SessionContext::require(&provider).is_err());
    }

    #[tokio::test]
    async fn wrong_password_leaves_nobody_signed_in() {
        let provider = provider();
        let err = provider
            .sign_in("clerk@example.org", &"guess".into())
            .await
            .unwrap_err();
        assert!(matches!(err, IdentityError::InvalidCredentials));
        assert!(provider.current_user().is_none());
    }

    #[tokio::test]
    async fn empty_password_is_rejected_before_hashing() {
        let provider = provider();
        assert!(matches!(
            provider.sign_in("clerk@example.org", &"".into()).await,
            Err(IdentityError::EmptyCredential)
        ));
    }
}
