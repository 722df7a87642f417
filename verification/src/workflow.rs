//! The dual-officer manual verification state machine.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use votecheck_identity::{Credential, OfficerAuthenticator, SessionContext};
use votecheck_store::{put_verification_record, RecordStore, StoreError};
use votecheck_types::{
    Decision, OfficerId, RecordDraft, Timestamp, VerificationMethod, VerificationRecord,
    VoterCase, VoterId,
};

use crate::error::{InputField, MissingInput, Operation, WorkflowError};
use crate::progress::{ProgressTicker, DEFAULT_INTERVAL, DEFAULT_STEP};
use crate::{CompletionReceipt, CompletionSummary, OfficerAttestation, WorkflowState};

/// Tunables for the processing display.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WorkflowOptions {
    pub progress_step: u8,
    pub progress_interval: Duration,
}

impl WorkflowOptions {
    fn ticker(&self) -> ProgressTicker {
        ProgressTicker::new(self.progress_step, self.progress_interval)
    }
}

impl Default for WorkflowOptions {
    fn default() -> Self {
        Self {
            progress_step: DEFAULT_STEP,
            progress_interval: DEFAULT_INTERVAL,
        }
    }
}

/// Everything a UI needs to render the workflow. Credentials never appear.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WorkflowView {
    pub voter_id: VoterId,
    pub state: WorkflowState,
    pub officer_one_id: Option<OfficerId>,
    pub officer_one_verified: bool,
    pub officer_two_id: Option<OfficerId>,
    pub officer_two_verified: bool,
    pub decision: Option<Decision>,
    pub method: VerificationMethod,
    pub notes: String,
    pub progress: u8,
    pub last_error: Option<String>,
}

/// A record write issued by completion and not yet collected.
struct PendingWrite {
    draft: RecordDraft,
    handle: JoinHandle<Result<Timestamp, StoreError>>,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Slot {
    One,
    Two,
}

impl Slot {
    fn awaiting(self) -> WorkflowState {
        match self {
            Self::One => WorkflowState::AwaitingOfficerOne,
            Self::Two => WorkflowState::AwaitingOfficerTwo,
        }
    }

    fn verifying(self) -> WorkflowState {
        match self {
            Self::One => WorkflowState::OfficerOneVerifying,
            Self::Two => WorkflowState::OfficerTwoVerifying,
        }
    }

    fn verified(self) -> WorkflowState {
        match self {
            Self::One => WorkflowState::AwaitingOfficerTwo,
            Self::Two => WorkflowState::ReadyToDecide,
        }
    }

    fn operation(self) -> Operation {
        match self {
            Self::One => Operation::SubmitOfficerOne,
            Self::Two => Operation::SubmitOfficerTwo,
        }
    }

    fn id_field(self) -> InputField {
        match self {
            Self::One => InputField::OfficerOneId,
            Self::Two => InputField::OfficerTwoId,
        }
    }

    fn credential_field(self) -> InputField {
        match self {
            Self::One => InputField::OfficerOneCredential,
            Self::Two => InputField::OfficerTwoCredential,
        }
    }
}

/// Drives one voter case through two officer attestations and a single
/// record write.
///
/// The API takes `&mut self` throughout: one session owns one workflow.
/// Every error is also kept as the view's `last_error`, and [`reset`]
/// always returns to a clean [`WorkflowState::AwaitingOfficerOne`].
///
/// [`reset`]: ManualVerificationWorkflow::reset
pub struct ManualVerificationWorkflow {
    session: SessionContext,
    case: VoterCase,
    authenticator: Arc<dyn OfficerAuthenticator>,
    store: Arc<dyn RecordStore>,
    options: WorkflowOptions,

    state: WorkflowState,
    officer_one: Option<OfficerAttestation>,
    officer_two: Option<OfficerAttestation>,
    decision: Option<Decision>,
    method: VerificationMethod,
    notes: String,
    progress: u8,
    last_error: Option<String>,
    receipt: Option<CompletionReceipt>,
    pending: Option<PendingWrite>,

    view_tx: watch::Sender<WorkflowView>,
}

impl ManualVerificationWorkflow {
    /// Open a workflow on `case` for the signed-in operator of `session`.
    pub fn new(
        session: SessionContext,
        case: VoterCase,
        authenticator: Arc<dyn OfficerAuthenticator>,
        store: Arc<dyn RecordStore>,
    ) -> Self {
        let view = WorkflowView {
            voter_id: case.id.clone(),
            state: WorkflowState::AwaitingOfficerOne,
            officer_one_id: None,
            officer_one_verified: false,
            officer_two_id: None,
            officer_two_verified: false,
            decision: None,
            method: VerificationMethod::default(),
            notes: String::new(),
            progress: 0,
            last_error: None,
        };
        let (view_tx, _) = watch::channel(view);
        tracing::info!(
            voter = %case.id,
            operator = %session.operator().email,
            manual_check = case.needs_manual_check(),
            "manual verification opened"
        );
        Self {
            session,
            case,
            authenticator,
            store,
            options: WorkflowOptions::default(),
            state: WorkflowState::AwaitingOfficerOne,
            officer_one: None,
            officer_two: None,
            decision: None,
            method: VerificationMethod::default(),
            notes: String::new(),
            progress: 0,
            last_error: None,
            receipt: None,
            pending: None,
            view_tx,
        }
    }

    pub fn with_options(mut self, options: WorkflowOptions) -> Self {
        self.options = options;
        self
    }

    // ── Officer attestations ────────────────────────────────────────────

    /// Authenticate the first officer. Only valid while awaiting officer one.
    pub async fn submit_officer_one(
        &mut self,
        officer_id: &str,
        credential: Credential,
    ) -> Result<(), WorkflowError> {
        let result = self.submit(Slot::One, officer_id, credential).await;
        self.settle(result)
    }

    /// Authenticate the second officer, who must differ from the first.
    pub async fn submit_officer_two(
        &mut self,
        officer_id: &str,
        credential: Credential,
    ) -> Result<(), WorkflowError> {
        let result = self.submit(Slot::Two, officer_id, credential).await;
        self.settle(result)
    }

    async fn submit(
        &mut self,
        slot: Slot,
        officer_id: &str,
        credential: Credential,
    ) -> Result<(), WorkflowError> {
        if self.state != slot.awaiting() {
            return Err(WorkflowError::InvalidState {
                operation: slot.operation(),
                state: self.state,
            });
        }
        let officer_id = OfficerId::parse(officer_id).map_err(|_| WorkflowError::EmptyInput {
            field: slot.id_field(),
        })?;
        if credential.is_empty() {
            return Err(WorkflowError::EmptyInput {
                field: slot.credential_field(),
            });
        }
        if slot == Slot::Two
            && self
                .officer_one
                .as_ref()
                .is_some_and(|one| one.officer_id == officer_id)
        {
            return Err(WorkflowError::DuplicateOfficer);
        }

        *self.attestation_mut(slot) = Some(OfficerAttestation::pending(officer_id.clone()));
        self.transition(slot.verifying());

        let authenticator = Arc::clone(&self.authenticator);
        let verdict = authenticator.verify(&officer_id, &credential).await;
        drop(credential);

        match verdict {
            Ok(true) => {
                if let Some(attestation) = self.attestation_mut(slot) {
                    attestation.verified = true;
                }
                self.transition(slot.verified());
                Ok(())
            }
            Ok(false) => {
                tracing::warn!(voter = %self.case.id, officer = %officer_id, "officer rejected");
                *self.attestation_mut(slot) = None;
                self.transition(slot.awaiting());
                Err(WorkflowError::AuthenticationFailed {
                    officer: officer_id,
                })
            }
            Err(e) => {
                tracing::warn!(
                    voter = %self.case.id,
                    officer = %officer_id,
                    error = %e,
                    "officer authentication failed"
                );
                *self.attestation_mut(slot) = None;
                self.transition(slot.awaiting());
                Err(e.into())
            }
        }
    }

    fn attestation_mut(&mut self, slot: Slot) -> &mut Option<OfficerAttestation> {
        match slot {
            Slot::One => &mut self.officer_one,
            Slot::Two => &mut self.officer_two,
        }
    }

    // ── Decision inputs ─────────────────────────────────────────────────

    pub fn set_decision(&mut self, decision: Decision) -> Result<(), WorkflowError> {
        let result = self.ensure_editable(Operation::SetDecision).map(|()| {
            self.decision = Some(decision);
        });
        self.settle(result)
    }

    pub fn set_method(&mut self, method: VerificationMethod) -> Result<(), WorkflowError> {
        let result = self.ensure_editable(Operation::SetMethod).map(|()| {
            self.method = method;
        });
        self.settle(result)
    }

    pub fn set_notes(&mut self, notes: impl Into<String>) -> Result<(), WorkflowError> {
        let notes = notes.into();
        let result = self.ensure_editable(Operation::SetNotes).map(|()| {
            self.notes = notes;
        });
        self.settle(result)
    }

    fn ensure_editable(&self, operation: Operation) -> Result<(), WorkflowError> {
        match self.state {
            WorkflowState::ReadyToDecide | WorkflowState::PersistFailed => Ok(()),
            WorkflowState::Processing | WorkflowState::Complete => {
                Err(WorkflowError::InvalidState {
                    operation,
                    state: self.state,
                })
            }
            _ => Err(WorkflowError::QuorumNotReached),
        }
    }

    // ── Completion ──────────────────────────────────────────────────────

    /// Persist the decision.
    ///
    /// The record is written once, immediately, while the progress display
    /// runs alongside. There is no automatic retry: after a failed write the
    /// workflow sits in [`WorkflowState::PersistFailed`] until the caller
    /// completes again or resets.
    ///
    /// The write runs as its own task. If this future is dropped while
    /// processing, the write still finishes, and calling
    /// `complete_verification` again collects its result without writing
    /// twice.
    pub async fn complete_verification(&mut self) -> Result<CompletionReceipt, WorkflowError> {
        let result = self.complete().await;
        self.settle(result)
    }

    async fn complete(&mut self) -> Result<CompletionReceipt, WorkflowError> {
        match self.state {
            WorkflowState::Complete => {
                return Err(WorkflowError::InvalidState {
                    operation: Operation::CompleteVerification,
                    state: self.state,
                });
            }
            WorkflowState::Processing => {
                tracing::info!(voter = %self.case.id, "collecting in-flight record write");
            }
            _ => {
                let draft = self.draft()?;
                let store = Arc::clone(&self.store);
                let body = draft.clone();
                let handle = tokio::spawn(async move {
                    put_verification_record(store.as_ref(), &body).await
                });
                self.pending = Some(PendingWrite { draft, handle });
                self.progress = 0;
                self.transition(WorkflowState::Processing);
            }
        }
        self.collect_write().await
    }

    /// Wait for the pending write and the rest of the progress display.
    async fn collect_write(&mut self) -> Result<CompletionReceipt, WorkflowError> {
        let ticker = self.options.ticker();
        let from = self.progress;
        let Some(pending) = self.pending.as_mut() else {
            return Err(WorkflowError::InvalidState {
                operation: Operation::CompleteVerification,
                state: self.state,
            });
        };
        let draft = pending.draft.clone();
        let view_tx = &self.view_tx;
        let progress = &mut self.progress;
        let (joined, ()) = tokio::join!(
            &mut pending.handle,
            ticker.run_from(from, |step| {
                *progress = step;
                view_tx.send_modify(|view| view.progress = step);
            }),
        );
        self.pending = None;
        let written = joined.unwrap_or_else(|e| {
            Err(StoreError::Backend(format!("record write task failed: {e}")))
        });

        match written {
            Ok(timestamp) => {
                let receipt = CompletionReceipt {
                    record: VerificationRecord::from_draft(draft, timestamp),
                };
                tracing::info!(
                    voter = %self.case.id,
                    decision = %receipt.decision(),
                    timestamp = timestamp.as_secs(),
                    "verification record saved"
                );
                self.receipt = Some(receipt.clone());
                self.transition(WorkflowState::Complete);
                Ok(receipt)
            }
            Err(e) => {
                tracing::error!(
                    voter = %self.case.id,
                    error = %e,
                    "failed to save verification record"
                );
                self.transition(WorkflowState::PersistFailed);
                Err(e.into())
            }
        }
    }

    /// Build the record from the current inputs, or name everything missing.
    fn draft(&self) -> Result<RecordDraft, WorkflowError> {
        let verified = |attestation: &Option<OfficerAttestation>| {
            attestation
                .as_ref()
                .filter(|a| a.verified)
                .map(|a| a.officer_id.clone())
        };
        let officer_one = verified(&self.officer_one);
        let officer_two = verified(&self.officer_two);
        let notes = self.notes.trim();

        let mut missing = Vec::new();
        if officer_one.is_none() {
            missing.push(MissingInput::OfficerOneAttestation);
        }
        if officer_two.is_none() {
            missing.push(MissingInput::OfficerTwoAttestation);
        }
        if self.decision.is_none() {
            missing.push(MissingInput::Decision);
        }
        if notes.is_empty() {
            missing.push(MissingInput::Notes);
        }

        match (officer_one, officer_two, self.decision) {
            (Some(one), Some(two), Some(decision)) if missing.is_empty() => Ok(RecordDraft::new(
                &self.case,
                decision,
                self.method,
                notes,
                one,
                two,
                self.session.operator().email.clone(),
            )),
            _ => Err(WorkflowError::IncompleteInputs { missing }),
        }
    }

    // ── Lifecycle ───────────────────────────────────────────────────────

    /// Discard all inputs and return to awaiting officer one. Valid in any state.
    ///
    /// A write still in flight from an abandoned completion is left to finish
    /// on its own; its result is no longer reported.
    pub fn reset(&mut self) {
        if self.pending.take().is_some() {
            tracing::warn!(voter = %self.case.id, "reset with a record write in flight");
        }
        self.officer_one = None;
        self.officer_two = None;
        self.decision = None;
        self.method = VerificationMethod::default();
        self.notes.clear();
        self.progress = 0;
        self.last_error = None;
        self.receipt = None;
        self.transition(WorkflowState::AwaitingOfficerOne);
    }

    /// Reset and switch to `case`.
    pub fn reopen(&mut self, case: VoterCase) {
        tracing::info!(from = %self.case.id, to = %case.id, "reopening workflow");
        self.case = case;
        self.reset();
    }

    // ── Observation ─────────────────────────────────────────────────────

    pub fn view(&self) -> WorkflowView {
        WorkflowView {
            voter_id: self.case.id.clone(),
            state: self.state,
            officer_one_id: self.officer_one.as_ref().map(|a| a.officer_id.clone()),
            officer_one_verified: self.officer_one_verified(),
            officer_two_id: self.officer_two.as_ref().map(|a| a.officer_id.clone()),
            officer_two_verified: self.officer_two_verified(),
            decision: self.decision,
            method: self.method,
            notes: self.notes.clone(),
            progress: self.progress,
            last_error: self.last_error.clone(),
        }
    }

    /// A receiver that observes every change, including progress ticks.
    pub fn watch(&self) -> watch::Receiver<WorkflowView> {
        self.view_tx.subscribe()
    }

    /// The completion panel, once the record is saved.
    pub fn summary(&self) -> Option<CompletionSummary> {
        match self.state {
            WorkflowState::Complete => self.receipt.as_ref().map(CompletionReceipt::summary),
            _ => None,
        }
    }

    pub fn state(&self) -> WorkflowState {
        self.state
    }

    pub fn case(&self) -> &VoterCase {
        &self.case
    }

    pub fn session(&self) -> &SessionContext {
        &self.session
    }

    pub fn officer_one_id(&self) -> Option<&OfficerId> {
        self.officer_one.as_ref().map(|a| &a.officer_id)
    }

    pub fn officer_two_id(&self) -> Option<&OfficerId> {
        self.officer_two.as_ref().map(|a| &a.officer_id)
    }

    pub fn officer_one_verified(&self) -> bool {
        self.officer_one.as_ref().is_some_and(|a| a.verified)
    }

    pub fn officer_two_verified(&self) -> bool {
        self.officer_two.as_ref().is_some_and(|a| a.verified)
    }

    pub fn decision(&self) -> Option<Decision> {
        self.decision
    }

    pub fn method(&self) -> VerificationMethod {
        self.method
    }

    pub fn notes(&self) -> &str {
        &self.notes
    }

    pub fn progress(&self) -> u8 {
        self.progress
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn receipt(&self) -> Option<&CompletionReceipt> {
        self.receipt.as_ref()
    }

    // ── Internals ───────────────────────────────────────────────────────

    fn transition(&mut self, next: WorkflowState) {
        if self.state != next {
            tracing::info!(
                voter = %self.case.id,
                from = %self.state,
                to = %next,
                "workflow transition"
            );
        }
        self.state = next;
        self.publish();
    }

    /// Record the outcome of an operation in the view.
    fn settle<T>(&mut self, result: Result<T, WorkflowError>) -> Result<T, WorkflowError> {
        self.last_error = result.as_ref().err().map(ToString::to_string);
        self.publish();
        result
    }

    fn publish(&self) {
        self.view_tx.send_replace(self.view());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use votecheck_identity::{IdentityError, Operator};
    use votecheck_nullables::{NullAuthenticator, NullRecordStore};
    use votecheck_store::{get_verification_record, VERIFICATION_COLLECTION};

    const OPERATOR: &str = "operator@booth.example";

    fn case() -> VoterCase {
        VoterCase::from_roll_entry(0, "Asha Rao", "1234 5678 9012", 12)
            .unwrap()
            .flag_for_manual_check("Photo mismatch")
    }

    fn instant() -> WorkflowOptions {
        WorkflowOptions {
            progress_step: 10,
            progress_interval: Duration::ZERO,
        }
    }

    struct Harness {
        workflow: ManualVerificationWorkflow,
        auth: Arc<NullAuthenticator>,
        store: Arc<NullRecordStore>,
    }

    fn harness() -> Harness {
        harness_with(instant())
    }

    fn harness_with(options: WorkflowOptions) -> Harness {
        let auth = Arc::new(
            NullAuthenticator::new()
                .with_officer("A1", "pw-a")
                .with_officer("B2", "pw-b"),
        );
        let store = Arc::new(NullRecordStore::new());
        let workflow = ManualVerificationWorkflow::new(
            SessionContext::for_operator(Operator::new(OPERATOR)),
            case(),
            auth.clone(),
            store.clone(),
        )
        .with_options(options);
        Harness {
            workflow,
            auth,
            store,
        }
    }

    async fn reach_quorum(wf: &mut ManualVerificationWorkflow) {
        wf.submit_officer_one("A1", "pw-a".into()).await.unwrap();
        wf.submit_officer_two("B2", "pw-b".into()).await.unwrap();
        assert_eq!(wf.state(), WorkflowState::ReadyToDecide);
    }

    #[tokio::test]
    async fn approve_flow_writes_exactly_one_record() {
        let mut h = harness();
        let wf = &mut h.workflow;

        wf.submit_officer_one("A1", "pw-a".into()).await.unwrap();
        assert_eq!(wf.state(), WorkflowState::AwaitingOfficerTwo);
        assert!(wf.officer_one_verified());
        wf.submit_officer_two("B2", "pw-b".into()).await.unwrap();
        assert_eq!(wf.state(), WorkflowState::ReadyToDecide);

        wf.set_decision(Decision::Approve).unwrap();
        wf.set_notes("Matched ID").unwrap();
        let receipt = wf.complete_verification().await.unwrap();

        assert_eq!(wf.state(), WorkflowState::Complete);
        assert_eq!(wf.progress(), 100);
        assert_eq!(h.store.write_count(), 1);

        let attempt = &h.store.write_attempts()[0];
        assert_eq!(attempt.collection, VERIFICATION_COLLECTION);
        assert_eq!(attempt.key, "1");
        assert_eq!(attempt.document["verificationStatus"], "approve");
        assert_eq!(attempt.document["verificationMethod"], "id_documents");
        assert_eq!(attempt.document["officerOne"], "A1");
        assert_eq!(attempt.document["officerTwo"], "B2");
        assert_eq!(attempt.document["verificationNotes"], "Matched ID");
        assert_eq!(attempt.document["recordedBy"], OPERATOR);

        let stored = get_verification_record(h.store.as_ref(), &VoterId::from(1))
            .await
            .unwrap();
        assert_eq!(stored, receipt.record);
        assert_eq!(receipt.timestamp(), stored.timestamp);
        assert!(wf.summary().is_some());
    }

    #[tokio::test]
    async fn duplicate_second_officer_is_rejected_without_authenticating() {
        let mut h = harness();
        let wf = &mut h.workflow;
        wf.submit_officer_one("A1", "pw-a".into()).await.unwrap();

        let err = wf
            .submit_officer_two("  A1 ", "pw-a".into())
            .await
            .unwrap_err();
        assert!(matches!(err, WorkflowError::DuplicateOfficer));
        assert_eq!(wf.state(), WorkflowState::AwaitingOfficerTwo);
        assert!(!wf.officer_two_verified());
        assert_eq!(h.auth.call_count(), 1);
        assert_eq!(
            wf.last_error(),
            Some("second verification officer must be different from the first officer")
        );
        assert_eq!(h.store.write_count(), 0);
    }

    #[tokio::test]
    async fn second_officer_must_be_a_different_person() {
        let auth = Arc::new(
            NullAuthenticator::new()
                .with_officer("A1", "pw1")
                .with_officer("A2", "pw2"),
        );
        let mut wf = ManualVerificationWorkflow::new(
            SessionContext::for_operator(Operator::new(OPERATOR)),
            case(),
            auth.clone(),
            Arc::new(NullRecordStore::new()),
        )
        .with_options(instant());

        wf.submit_officer_one("A1", "pw1".into()).await.unwrap();
        let err = wf
            .submit_officer_two("A1", "pw2".into())
            .await
            .unwrap_err();
        assert!(matches!(err, WorkflowError::DuplicateOfficer));
        assert!(!wf.officer_two_verified());
        assert_eq!(wf.state(), WorkflowState::AwaitingOfficerTwo);
        assert_eq!(auth.call_count(), 1);

        wf.submit_officer_two("A2", "pw2".into()).await.unwrap();
        assert_eq!(wf.state(), WorkflowState::ReadyToDecide);
        assert!(wf.officer_one_verified());
        assert!(wf.officer_two_verified());
        assert_eq!(wf.last_error(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn dropped_completion_can_be_collected_later() {
        let mut h = harness_with(WorkflowOptions::default());
        let wf = &mut h.workflow;
        reach_quorum(wf).await;
        wf.set_decision(Decision::Approve).unwrap();
        wf.set_notes("Matched ID").unwrap();

        let abandoned =
            tokio::time::timeout(Duration::from_millis(500), wf.complete_verification()).await;
        assert!(abandoned.is_err());
        assert_eq!(wf.state(), WorkflowState::Processing);
        assert_eq!(h.store.write_count(), 1);
        assert!(wf.progress() > 0 && wf.progress() < 100);
        assert_eq!(wf.view().progress, wf.progress());

        let receipt = wf.complete_verification().await.unwrap();
        assert_eq!(wf.state(), WorkflowState::Complete);
        assert_eq!(wf.progress(), 100);
        assert_eq!(h.store.write_count(), 1);
        let stored = get_verification_record(h.store.as_ref(), &VoterId::from(1))
            .await
            .unwrap();
        assert_eq!(stored, receipt.record);
    }

    #[tokio::test(start_paused = true)]
    async fn reset_after_dropped_completion_keeps_the_issued_write() {
        let mut h = harness_with(WorkflowOptions::default());
        let wf = &mut h.workflow;
        reach_quorum(wf).await;
        wf.set_decision(Decision::Reject).unwrap();
        wf.set_notes("Photo does not match").unwrap();

        let abandoned =
            tokio::time::timeout(Duration::from_millis(500), wf.complete_verification()).await;
        assert!(abandoned.is_err());

        wf.reset();
        assert_eq!(wf.state(), WorkflowState::AwaitingOfficerOne);
        assert_eq!(wf.progress(), 0);
        assert_eq!(h.store.write_count(), 1);
        assert!(get_verification_record(h.store.as_ref(), &VoterId::from(1))
            .await
            .is_ok());

        let err = wf.complete_verification().await.unwrap_err();
        assert!(matches!(err, WorkflowError::IncompleteInputs { .. }));
        assert_eq!(h.store.write_count(), 1);
    }

    #[tokio::test]
    async fn officer_two_cannot_start_first() {
        let mut h = harness();
        let err = h
            .workflow
            .submit_officer_two("B2", "pw-b".into())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            WorkflowError::InvalidState {
                operation: Operation::SubmitOfficerTwo,
                state: WorkflowState::AwaitingOfficerOne,
            }
        ));
        assert_eq!(h.auth.call_count(), 0);
    }

    #[tokio::test]
    async fn empty_inputs_do_not_transition() {
        let mut h = harness();
        let wf = &mut h.workflow;

        let err = wf.submit_officer_one("   ", "pw-a".into()).await.unwrap_err();
        assert!(matches!(
            err,
            WorkflowError::EmptyInput {
                field: InputField::OfficerOneId
            }
        ));
        let err = wf.submit_officer_one("A1", "".into()).await.unwrap_err();
        assert!(matches!(
            err,
            WorkflowError::EmptyInput {
                field: InputField::OfficerOneCredential
            }
        ));
        assert_eq!(wf.state(), WorkflowState::AwaitingOfficerOne);
        assert_eq!(h.auth.call_count(), 0);
    }

    #[tokio::test]
    async fn rejected_officer_returns_to_awaiting() {
        let mut h = harness();
        let wf = &mut h.workflow;

        let err = wf
            .submit_officer_one("A1", "wrong".into())
            .await
            .unwrap_err();
        assert!(matches!(err, WorkflowError::AuthenticationFailed { .. }));
        assert_eq!(wf.state(), WorkflowState::AwaitingOfficerOne);
        assert!(!wf.officer_one_verified());
        assert!(wf.officer_one_id().is_none());

        // A retry with the right password goes through.
        wf.submit_officer_one("A1", "pw-a".into()).await.unwrap();
        assert_eq!(wf.state(), WorkflowState::AwaitingOfficerTwo);
        assert!(wf.last_error().is_none());
    }

    #[tokio::test]
    async fn authenticator_outage_is_retryable() {
        let mut h = harness();
        h.auth.set_unavailable(true);
        let err = h
            .workflow
            .submit_officer_one("A1", "pw-a".into())
            .await
            .unwrap_err();
        assert!(matches!(err, WorkflowError::Identity(_)));
        assert!(err.is_retryable());
        assert_eq!(h.workflow.state(), WorkflowState::AwaitingOfficerOne);
    }

    #[tokio::test]
    async fn edits_before_quorum_change_nothing() {
        let mut h = harness();
        let wf = &mut h.workflow;
        wf.submit_officer_one("A1", "pw-a".into()).await.unwrap();

        assert!(matches!(
            wf.set_decision(Decision::Reject),
            Err(WorkflowError::QuorumNotReached)
        ));
        assert!(matches!(
            wf.set_method(VerificationMethod::Alternative),
            Err(WorkflowError::QuorumNotReached)
        ));
        assert!(matches!(
            wf.set_notes("too early"),
            Err(WorkflowError::QuorumNotReached)
        ));
        assert_eq!(wf.decision(), None);
        assert_eq!(wf.method(), VerificationMethod::IdDocuments);
        assert_eq!(wf.notes(), "");
    }

    #[tokio::test]
    async fn completion_names_every_missing_input() {
        let mut h = harness();
        let wf = &mut h.workflow;

        let err = wf.complete_verification().await.unwrap_err();
        match err {
            WorkflowError::IncompleteInputs { missing } => assert_eq!(
                missing,
                vec![
                    MissingInput::OfficerOneAttestation,
                    MissingInput::OfficerTwoAttestation,
                    MissingInput::Decision,
                    MissingInput::Notes,
                ]
            ),
            other => panic!("unexpected error: {other}"),
        }

        reach_quorum(wf).await;
        wf.set_decision(Decision::Reject).unwrap();
        wf.set_notes("   ").unwrap();
        let err = wf.complete_verification().await.unwrap_err();
        assert!(matches!(
            err,
            WorkflowError::IncompleteInputs { ref missing } if missing == &[MissingInput::Notes]
        ));
        assert_eq!(wf.state(), WorkflowState::ReadyToDecide);
        assert_eq!(h.store.write_count(), 0);
    }

    #[tokio::test]
    async fn failed_write_ends_in_persist_failed() {
        let mut h = harness();
        h.store.fail_writes(true);
        let wf = &mut h.workflow;
        reach_quorum(wf).await;
        wf.set_decision(Decision::Reject).unwrap();
        wf.set_notes("Photo mismatch").unwrap();

        let err = wf.complete_verification().await.unwrap_err();
        assert!(matches!(err, WorkflowError::Persistence(_)));
        assert_eq!(wf.state(), WorkflowState::PersistFailed);
        assert_eq!(h.store.write_count(), 1);
        assert_eq!(h.store.document_count(), 0);
        assert!(wf.summary().is_none());
        assert!(wf
            .last_error()
            .is_some_and(|msg| msg.starts_with("failed to save verification details")));
        // The decision is kept for a user-initiated retry.
        assert_eq!(wf.decision(), Some(Decision::Reject));
    }

    #[tokio::test]
    async fn retry_from_persist_failed_issues_one_new_write() {
        let mut h = harness();
        h.store.fail_writes(true);
        let wf = &mut h.workflow;
        reach_quorum(wf).await;
        wf.set_decision(Decision::Approve).unwrap();
        wf.set_notes("Matched ID").unwrap();
        wf.complete_verification().await.unwrap_err();

        h.store.fail_writes(false);
        wf.set_method(VerificationMethod::Alternative).unwrap();
        wf.complete_verification().await.unwrap();
        assert_eq!(wf.state(), WorkflowState::Complete);
        assert_eq!(h.store.write_count(), 2);
        assert_eq!(h.store.document_count(), 1);
        assert_eq!(
            h.store.write_attempts()[1].document["verificationMethod"],
            "alternative"
        );
    }

    #[tokio::test]
    async fn complete_is_terminal() {
        let mut h = harness();
        let wf = &mut h.workflow;
        reach_quorum(wf).await;
        wf.set_decision(Decision::Approve).unwrap();
        wf.set_notes("ok").unwrap();
        wf.complete_verification().await.unwrap();

        assert!(matches!(
            wf.set_notes("changed"),
            Err(WorkflowError::InvalidState {
                state: WorkflowState::Complete,
                ..
            })
        ));
        assert!(matches!(
            wf.complete_verification().await,
            Err(WorkflowError::InvalidState { .. })
        ));
        assert_eq!(h.store.write_count(), 1);
    }

    #[tokio::test]
    async fn reset_clears_everything() {
        let mut h = harness();
        let wf = &mut h.workflow;
        reach_quorum(wf).await;
        wf.set_decision(Decision::Reject).unwrap();
        wf.set_method(VerificationMethod::BiometricOverride).unwrap();
        wf.set_notes("notes").unwrap();
        wf.complete_verification().await.unwrap();

        wf.reset();
        let view = wf.view();
        assert_eq!(view.state, WorkflowState::AwaitingOfficerOne);
        assert_eq!(view.officer_one_id, None);
        assert_eq!(view.officer_two_id, None);
        assert!(!view.officer_one_verified && !view.officer_two_verified);
        assert_eq!(view.decision, None);
        assert_eq!(view.method, VerificationMethod::IdDocuments);
        assert_eq!(view.notes, "");
        assert_eq!(view.progress, 0);
        assert_eq!(view.last_error, None);
        assert!(wf.receipt().is_none());
    }

    #[tokio::test]
    async fn reopen_switches_case_without_leaking_inputs() {
        let mut h = harness();
        let wf = &mut h.workflow;
        wf.submit_officer_one("A1", "pw-a".into()).await.unwrap();

        let other = VoterCase::from_roll_entry(4, "Vikram Singh", "9999-8888-7777", 3).unwrap();
        wf.reopen(other);
        assert_eq!(wf.case().id, VoterId::from(5));
        assert_eq!(wf.state(), WorkflowState::AwaitingOfficerOne);
        assert!(wf.officer_one_id().is_none());
        assert_eq!(wf.view().voter_id, VoterId::from(5));
    }

    #[tokio::test]
    async fn watchers_see_every_progress_step() {
        let mut h = harness();
        let mut rx = h.workflow.watch();
        let seen = tokio::spawn(async move {
            let mut progress = Vec::new();
            while rx.changed().await.is_ok() {
                let view = rx.borrow_and_update().clone();
                if progress.last() != Some(&view.progress) {
                    progress.push(view.progress);
                }
                if view.state == WorkflowState::Complete {
                    break;
                }
            }
            progress
        });

        let wf = &mut h.workflow;
        reach_quorum(wf).await;
        wf.set_decision(Decision::Approve).unwrap();
        wf.set_notes("ok").unwrap();
        wf.complete_verification().await.unwrap();
        drop(h);

        let progress = seen.await.unwrap();
        assert_eq!(progress.last(), Some(&100));
        assert!(progress.windows(2).all(|w| w[0] < w[1]));
    }

    #[tokio::test(start_paused = true)]
    async fn default_progress_paces_the_processing_state() {
        let h = harness();
        let mut wf = ManualVerificationWorkflow::new(
            SessionContext::for_operator(Operator::new(OPERATOR)),
            case(),
            h.auth.clone(),
            h.store.clone(),
        );
        reach_quorum(&mut wf).await;
        wf.set_decision(Decision::Approve).unwrap();
        wf.set_notes("ok").unwrap();

        let started = tokio::time::Instant::now();
        let receipt = wf.complete_verification().await.unwrap();
        assert!(started.elapsed() >= Duration::from_millis(3000));
        assert_eq!(receipt.timestamp(), Timestamp::new(1_700_000_000));
        assert_eq!(h.store.write_count(), 1);
    }

    #[test]
    fn not_signed_in_has_no_session() {
        let provider = votecheck_nullables::NullIdentityProvider::signed_out();
        assert!(matches!(
            SessionContext::require(&provider),
            Err(IdentityError::NotSignedIn)
        ));
    }
}
