//! Dual-officer manual verification.
//!
//! A voter case flagged for manual review (or an automatically verified case
//! being overridden) can only be approved or rejected after two *different*
//! election officers have each authenticated. The workflow then writes a
//! single [`votecheck_types::VerificationRecord`] keyed by voter id.
//!
//! ```text
//! AwaitingOfficerOne ─submit─▶ OfficerOneVerifying ─ok─▶ AwaitingOfficerTwo
//!        ▲                                                   │ submit (distinct id)
//!        │ reset (any state)                                 ▼
//!        │                   ReadyToDecide ◀─ok─ OfficerTwoVerifying
//!        │                        │ complete (decision + notes)
//!        │                        ▼
//!        └──────────────── Processing ─▶ Complete | PersistFailed
//! ```
//!
//! The progress shown while processing is cosmetic; the write is issued as
//! soon as processing starts and its result decides the final state.

pub mod error;
pub mod outcome;
pub mod progress;
pub mod state;
pub mod workflow;

pub use error::{InputField, MissingInput, Operation, WorkflowError};
pub use outcome::{CompletionReceipt, CompletionSummary};
pub use progress::ProgressTicker;
pub use state::{OfficerAttestation, WorkflowState};
pub use workflow::{ManualVerificationWorkflow, WorkflowOptions, WorkflowView};
