//! Property-based tests for the state machine
//!
//! These tests verify the single-flight and ordering invariants across
//! arbitrary event sequences.

use super::*;
use crate::failure::{ChatFailure, FailureKind};
use crate::message::{HistoryRecord, Sender};
use proptest::prelude::*;

// ============================================================================
// Test Helpers
// ============================================================================

fn test_context(low_bandwidth: bool) -> ChatContext {
    ChatContext::new("test-user").with_low_bandwidth(low_bandwidth)
}

/// Minimal effect interpreter standing in for the runtime
#[derive(Debug, Default)]
struct Simulation {
    state: ChatState,
    log: Vec<Draft>,
    input: String,
    calls: usize,
}

impl Simulation {
    fn step(&mut self, context: &ChatContext, event: Event) -> Option<Vec<Effect>> {
        let result = transition(&self.state, context, event).ok()?;
        self.state = result.new_state;
        for effect in &result.effects {
            match effect {
                Effect::AppendMessage(draft) => self.log.push(draft.clone()),
                Effect::ReplaceLog { entries } => self.log.clone_from(entries),
                Effect::RestoreHistory { records } => {
                    self.log = records
                        .iter()
                        .map(|r| Draft {
                            sender: r.sender,
                            text: r.message.clone(),
                        })
                        .collect();
                }
                Effect::ClearInput => self.input.clear(),
                Effect::Call(_) => self.calls += 1,
                Effect::LogFailure { .. } => {}
            }
        }
        Some(result.effects)
    }
}

// ============================================================================
// Arbitrary Generators
// ============================================================================

fn arb_failure() -> impl Strategy<Value = ChatFailure> {
    prop_oneof![
        "[a-zA-Z ]{0,20}".prop_map(ChatFailure::transport),
        "[a-z ]{1,20}".prop_map(|d| ChatFailure::transport(format!(r#"HTTP 400: {{"detail":"{d}"}}"#))),
        Just(ChatFailure::opaque(FailureKind::MalformedPayload)),
    ]
}

fn arb_sender() -> impl Strategy<Value = Sender> {
    prop_oneof![Just(Sender::User), Just(Sender::Bot)]
}

fn arb_records() -> impl Strategy<Value = Vec<HistoryRecord>> {
    proptest::collection::vec(
        (arb_sender(), "[a-z ]{1,12}").prop_map(|(sender, text)| HistoryRecord::new(sender, text, None)),
        0..4,
    )
}

fn arb_request_event() -> impl Strategy<Value = Event> {
    prop_oneof![
        "[a-zA-Z ?]{0,16}".prop_map(|text| Event::Submit { text }),
        "[ \t\n]{0,4}".prop_map(|text| Event::Submit { text }),
        Just(Event::ClearConfirmed),
        Just(Event::HistoryRequested),
    ]
}

fn arb_outcome_event() -> impl Strategy<Value = Event> {
    prop_oneof![
        "[a-zA-Z* ]{0,16}".prop_map(|result| Event::ReplyReceived { result }),
        arb_failure().prop_map(|failure| Event::SendFailed { failure }),
        "[a-z ]{1,16}".prop_map(|result| Event::ClearCompleted { result }),
        arb_failure().prop_map(|failure| Event::ClearFailed { failure }),
        arb_records().prop_map(|records| Event::HistoryLoaded { records }),
        arb_failure().prop_map(|failure| Event::HistoryFailed { failure }),
    ]
}

fn arb_event() -> impl Strategy<Value = Event> {
    prop_oneof![arb_request_event(), arb_outcome_event()]
}

fn arb_pending_call() -> impl Strategy<Value = PendingCall> {
    prop_oneof![
        Just(PendingCall::Prompt),
        Just(PendingCall::ClearHistory),
        Just(PendingCall::History),
    ]
}

/// The outcome event that completes a given pending call
fn arb_matching_outcome(call: PendingCall) -> BoxedStrategy<Event> {
    match call {
        PendingCall::Prompt => prop_oneof![
            "[a-z ]{0,16}".prop_map(|result| Event::ReplyReceived { result }),
            arb_failure().prop_map(|failure| Event::SendFailed { failure }),
        ]
        .boxed(),
        PendingCall::ClearHistory => prop_oneof![
            "[a-z ]{0,16}".prop_map(|result| Event::ClearCompleted { result }),
            arb_failure().prop_map(|failure| Event::ClearFailed { failure }),
        ]
        .boxed(),
        PendingCall::History => prop_oneof![
            arb_records().prop_map(|records| Event::HistoryLoaded { records }),
            arb_failure().prop_map(|failure| Event::HistoryFailed { failure }),
        ]
        .boxed(),
    }
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    /// A new call is only ever issued from Idle, and at most one per step
    #[test]
    fn prop_single_flight(
        events in proptest::collection::vec(arb_event(), 0..40),
        low_bandwidth in any::<bool>(),
    ) {
        let context = test_context(low_bandwidth);
        let mut sim = Simulation::default();

        for event in events {
            let was_idle = sim.state.is_idle();
            let calls_before = sim.calls;
            if sim.step(&context, event).is_none() {
                continue;
            }
            let issued = sim.calls - calls_before;
            prop_assert!(issued <= 1);
            if issued == 1 {
                prop_assert!(was_idle, "call issued while another was outstanding");
                prop_assert!(sim.state.is_loading());
            }
            if sim.state.is_loading() && was_idle {
                prop_assert_eq!(issued, 1);
            }
        }
    }

    /// Requests while Sending are rejected with `Busy`
    #[test]
    fn prop_busy_rejects_requests(call in arb_pending_call(), event in arb_request_event()) {
        let state = ChatState::sending(call);
        let result = transition(&state, &test_context(false), event);
        prop_assert!(matches!(result, Err(TransitionError::Busy)));
    }

    /// Every pending call's outcome returns to Idle
    #[test]
    fn prop_outcomes_return_to_idle(
        (call, event) in arb_pending_call().prop_flat_map(|call| (Just(call), arb_matching_outcome(call)))
    ) {
        let result = transition(&ChatState::sending(call), &test_context(false), event);
        let result = result.map_err(|e| TestCaseError::fail(e.to_string()))?;
        prop_assert_eq!(result.new_state, ChatState::Idle);
        prop_assert!(result.effects.iter().all(|e| !e.is_outbound()));
    }

    /// Outcomes never arrive in Idle
    #[test]
    fn prop_idle_rejects_outcomes(event in arb_outcome_event()) {
        let result = transition(&ChatState::Idle, &test_context(false), event);
        prop_assert!(matches!(result, Err(TransitionError::InvalidTransition(_))));
    }

    /// A completed prompt turn ends the log with its user line then one bot line
    #[test]
    fn prop_turn_pairs_are_adjacent(
        text in "[a-zA-Z][a-zA-Z ?]{0,16}",
        outcome in arb_matching_outcome(PendingCall::Prompt),
        prior in arb_records(),
    ) {
        let context = test_context(false);
        let mut sim = Simulation::default();
        sim.step(&context, Event::HistoryRequested);
        sim.step(&context, Event::HistoryLoaded { records: prior });
        let before = sim.log.len();

        sim.input = text.clone();
        let accepted = sim.step(&context, Event::Submit { text: text.clone() }).is_some();
        prop_assert!(accepted);
        prop_assert!(sim.input.is_empty());
        prop_assert!(sim.step(&context, outcome).is_some());

        prop_assert_eq!(sim.log.len(), before + 2);
        prop_assert_eq!(sim.log[before].sender, Sender::User);
        prop_assert_eq!(&sim.log[before].text, text.trim());
        prop_assert_eq!(sim.log[before + 1].sender, Sender::Bot);
        prop_assert!(sim.state.is_idle());
    }

    /// A rejected submit leaves the log and input untouched
    #[test]
    fn prop_rejected_submit_is_noop(
        text in "[ \t\n]{0,6}",
        call in proptest::option::of(arb_pending_call()),
    ) {
        let state = call.map_or(ChatState::Idle, ChatState::sending);
        let mut sim = Simulation { state, input: "draft".into(), ..Simulation::default() };
        let rejected = sim.step(&test_context(false), Event::Submit { text }).is_none();
        prop_assert!(rejected);
        prop_assert!(sim.log.is_empty());
        prop_assert_eq!(sim.input.as_str(), "draft");
        prop_assert_eq!(sim.state, state);
    }
}
