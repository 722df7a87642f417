use std::sync::Arc;
use std::time::Duration;

use proptest::prelude::*;

use votecheck_identity::{Operator, SessionContext};
use votecheck_nullables::{NullAuthenticator, NullRecordStore};
use votecheck_types::{Decision, VerificationMethod, VoterCase};
use votecheck_verification::{ManualVerificationWorkflow, WorkflowOptions, WorkflowState};

#[derive(Clone, Debug)]
enum Op {
    SubmitOne(&'static str, &'static str),
    SubmitTwo(&'static str, &'static str),
    Decide(Decision),
    Method(VerificationMethod),
    Notes(&'static str),
    Complete,
    Reset,
}

fn officer() -> impl Strategy<Value = &'static str> {
    prop::sample::select(vec!["A1", "B2", "C3", " A1 ", ""])
}

fn password() -> impl Strategy<Value = &'static str> {
    prop::sample::select(vec!["pw", "wrong", ""])
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => (officer(), password()).prop_map(|(o, p)| Op::SubmitOne(o, p)),
        3 => (officer(), password()).prop_map(|(o, p)| Op::SubmitTwo(o, p)),
        2 => prop::sample::select(vec![Decision::Approve, Decision::Reject]).prop_map(Op::Decide),
        1 => prop::sample::select(vec![
            VerificationMethod::IdDocuments,
            VerificationMethod::BiometricOverride,
            VerificationMethod::Alternative,
        ])
        .prop_map(Op::Method),
        2 => prop::sample::select(vec!["Matched ID", "  ", ""]).prop_map(Op::Notes),
        2 => Just(Op::Complete),
        1 => Just(Op::Reset),
    ]
}

struct Run {
    states: Vec<WorkflowState>,
    distinct_officers: bool,
    writes_while_outside_complete: usize,
    writes: usize,
    completes: usize,
}

fn run(ops: Vec<Op>, fail_writes: bool) -> Run {
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .unwrap();
    rt.block_on(async move {
        let auth = Arc::new(
            NullAuthenticator::new()
                .with_officer("A1", "pw")
                .with_officer("B2", "pw")
                .with_officer("C3", "pw"),
        );
        let store = Arc::new(NullRecordStore::new());
        store.fail_writes(fail_writes);
        let case = VoterCase::from_roll_entry(0, "Asha Rao", "1234 5678 9012", 12)
            .unwrap()
            .flag_for_manual_check("Photo mismatch");
        let mut wf = ManualVerificationWorkflow::new(
            SessionContext::for_operator(Operator::new("operator@booth.example")),
            case,
            auth,
            store.clone(),
        )
        .with_options(WorkflowOptions {
            progress_step: 50,
            progress_interval: Duration::ZERO,
        });

        let mut run = Run {
            states: Vec::new(),
            distinct_officers: true,
            writes_while_outside_complete: 0,
            writes: 0,
            completes: 0,
        };
        for op in ops {
            let before = store.write_count();
            let completing = matches!(op, Op::Complete);
            let _ = match op {
                Op::SubmitOne(o, p) => wf.submit_officer_one(o, p.into()).await,
                Op::SubmitTwo(o, p) => wf.submit_officer_two(o, p.into()).await,
                Op::Decide(d) => wf.set_decision(d),
                Op::Method(m) => wf.set_method(m),
                Op::Notes(n) => wf.set_notes(n),
                Op::Complete => wf.complete_verification().await.map(|_| ()),
                Op::Reset => {
                    wf.reset();
                    Ok(())
                }
            };
            let written = store.write_count() - before;
            if !completing {
                run.writes_while_outside_complete += written;
            }
            if completing && wf.state() == WorkflowState::Complete && written == 1 {
                run.completes += 1;
            }
            if let (Some(one), Some(two)) = (wf.officer_one_id(), wf.officer_two_id()) {
                run.distinct_officers &= one != two;
            }
            let state = wf.state();
            if state.has_quorum() {
                assert!(wf.officer_one_verified() && wf.officer_two_verified());
            }
            run.states.push(state);
        }
        run.writes = store.write_count();
        run
    })
}

proptest! {
    /// Deciding states are only reachable with both officers verified, and
    /// the two officers are always different people.
    #[test]
    fn quorum_and_distinct_officers_hold(ops in prop::collection::vec(op(), 0..40)) {
        let run = run(ops, false);
        prop_assert!(run.distinct_officers);
        for state in &run.states {
            prop_assert!(!matches!(state, WorkflowState::Processing));
        }
    }

    /// Only `complete_verification` writes, and each successful completion
    /// writes exactly once.
    #[test]
    fn writes_happen_only_on_completion(ops in prop::collection::vec(op(), 0..40)) {
        let run = run(ops, false);
        prop_assert_eq!(run.writes_while_outside_complete, 0);
        prop_assert_eq!(run.writes, run.completes);
    }

    /// A failing store never reaches `Complete`.
    #[test]
    fn failed_writes_never_complete(ops in prop::collection::vec(op(), 0..40)) {
        let run = run(ops, true);
        prop_assert!(run.states.iter().all(|s| *s != WorkflowState::Complete));
        prop_assert_eq!(run.writes_while_outside_complete, 0);
    }
}
