//! Nullable identity provider: a controllable signed-in operator.

use std::sync::Mutex;

use async_trait::async_trait;
use votecheck_identity::{Credential, IdentityError, IdentityProvider, Operator};

/// An identity provider for testing.
///
/// `sign_in` accepts any non-empty password.
pub struct NullIdentityProvider {
    current: Mutex<Option<Operator>>,
}

impl NullIdentityProvider {
    pub fn signed_out() -> Self {
        Self {
            current: Mutex::new(None),
        }
    }

    pub fn signed_in(email: &str) -> Self {
        Self {
            current: Mutex::new(Some(Operator::new(email))),
        }
    }
}

#[async_trait]
impl IdentityProvider for NullIdentityProvider {
    fn current_user(&self) -> Option<Operator> {
        self.current.lock().unwrap().clone()
    }

    async fn sign_in(&self, email: &str, password: &Credential) -> Result<Operator, IdentityError> {
        if password.is_empty() {
            return Err(IdentityError::EmptyCredential);
        }
        let operator = Operator::new(email);
        *self.current.lock().unwrap() = Some(operator.clone());
        Ok(operator)
    }

    fn sign_out(&self) {
        self.current.lock().unwrap().take();
    }
}
