//! Nullable officer authenticator: scripted answers, recorded calls.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use votecheck_identity::{Credential, IdentityError, OfficerAuthenticator};
use votecheck_types::OfficerId;

/// A deterministic officer authenticator for testing.
///
/// By default only registered officers with matching passwords verify.
/// [`NullAuthenticator::accept_all`] accepts any non-empty credential, and
/// [`NullAuthenticator::set_unavailable`] makes every call error.
pub struct NullAuthenticator {
    officers: Mutex<HashMap<String, String>>,
    accept_all: bool,
    unavailable: AtomicBool,
    calls: Mutex<Vec<OfficerId>>,
}

impl NullAuthenticator {
    pub fn new() -> Self {
        Self {
            officers: Mutex::new(HashMap::new()),
            accept_all: false,
            unavailable: AtomicBool::new(false),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn accept_all() -> Self {
        Self {
            accept_all: true,
            ..Self::new()
        }
    }

    /// Register an officer that verifies with `password`.
    pub fn with_officer(self, id: &str, password: &str) -> Self {
        self.officers
            .lock()
            .unwrap()
            .insert(id.to_string(), password.to_string());
        self
    }

    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Officers passed to `verify`, in call order.
    pub fn calls(&self) -> Vec<OfficerId> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

impl Default for NullAuthenticator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl OfficerAuthenticator for NullAuthenticator {
    async fn verify(
        &self,
        officer: &OfficerId,
        credential: &Credential,
    ) -> Result<bool, IdentityError> {
        self.calls.lock().unwrap().push(officer.clone());
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(IdentityError::Directory(
                "null authenticator configured as unavailable".to_string(),
            ));
        }
        if self.accept_all {
            return Ok(!credential.is_empty());
        }
        Ok(self
            .officers
            .lock()
            .unwrap()
            .get(officer.as_str())
            .is_some_and(|pw| pw == credential.expose()))
    }
}
