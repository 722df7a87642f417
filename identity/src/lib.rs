//! Officer authentication and operator sessions.
//!
//! Two separate identity checks exist:
//! - **Operators** sign in to the dashboard; the signed-in operator gates
//!   access to the workflow through a [`SessionContext`].
//! - **Officers** attest a single manual verification with their own
//!   credentials through an [`OfficerAuthenticator`].
//!
//! Both are backed by a [`PasswordDirectory`] of Argon2id hashes in
//! production and by nullables in tests.

pub mod authenticator;
pub mod credential;
pub mod directory;
pub mod error;
pub mod password;
pub mod session;

pub use authenticator::{DirectoryAuthenticator, OfficerAuthenticator, SimulatedAuthenticator};
pub use credential::Credential;
pub use directory::{DirectoryEntry, PasswordDirectory};
pub use error::IdentityError;
pub use password::{HashParams, PasswordHash};
pub use session::{DirectoryIdentityProvider, IdentityProvider, Operator, SessionContext};
