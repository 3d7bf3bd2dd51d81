use chrono::Utc;
use serde::{Deserialize, Serialize};

use parley_negotiation_utils::{
    Agreement, EngineError, NegotiationConfig, NegotiationState, NegotiationStatus, Offer,
};

use crate::events::{EventSink, EventType, NegotiationEvent};

/// How a negotiation ends. Carries the data each terminal status needs, so a
/// non-terminal status can never be committed as final.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum Termination {
    Agreement(Agreement),
    RoundsExhausted,
    Walkaway { reason: Option<String> },
    Failure { reason: String },
}

impl Termination {
    pub fn status(&self) -> NegotiationStatus {
        match self {
            Termination::Agreement(_) => NegotiationStatus::AgreementReached,
            Termination::RoundsExhausted => NegotiationStatus::MaxRoundsExceeded,
            Termination::Walkaway { .. } => NegotiationStatus::ExplicitWalkaway,
            Termination::Failure { .. } => NegotiationStatus::Error,
        }
    }
}

/// Sole owner and mutation surface of a negotiation's authoritative state.
///
/// All mutation goes through `commit_offer` and `commit_terminal`; both take
/// `&mut self`, so commits on one instance are serialized by construction.
/// Everything else gets read-only snapshots, which stay valid forever
/// because history entries are never edited or removed.
///
/// Being the single commit point, the manager also emits the engine's
/// persistence/analytics events: exactly one per committed offer and one for
/// the terminal transition.
pub struct StateManager {
    state: NegotiationState,
    sinks: Vec<Box<dyn EventSink>>,
}

impl StateManager {
    /// Validates the configuration and opens a fresh in-progress record.
    /// A malformed configuration fails here and no negotiation exists.
    pub fn new(config: NegotiationConfig) -> Result<StateManager, EngineError> {
        config.validate()?;
        let state = NegotiationState::initialize(config);
        log::info!(
            "Negotiation [{}] created: {} vs {}, max {} rounds",
            state.id,
            state.parties[0].id,
            state.parties[1].id,
            state.max_rounds
        );
        Ok(StateManager {
            state,
            sinks: vec![],
        })
    }

    pub fn add_sink(&mut self, sink: Box<dyn EventSink>) {
        self.sinks.push(sink);
    }

    /// Borrow for engine-internal reads.
    pub fn state(&self) -> &NegotiationState {
        &self.state
    }

    /// Read-only snapshot for external observers. Holding an old snapshot is
    /// safe; committed offers never change underneath it.
    pub fn current_view(&self) -> NegotiationState {
        self.state.clone()
    }

    /// Appends an offer to the history.
    ///
    /// Rejected once the status is terminal, and when the offer's party,
    /// turn index or round disagree with what the alternation protocol
    /// expects next; such a mismatch is a caller bug, never silently fixed.
    pub fn commit_offer(&mut self, offer: Offer) -> Result<(), EngineError> {
        if self.state.status.is_terminal() {
            return Err(EngineError::InvalidTransition {
                id: self.state.id,
                status: self.state.status,
            });
        }

        let expected_party = self.state.party_on_turn().clone();
        let expected_turn = self.state.turn_count() + 1;
        let expected_round = self.state.round_of_next_turn();
        if offer.party != expected_party
            || offer.turn_index != expected_turn
            || offer.round != expected_round
        {
            return Err(EngineError::OutOfOrderCommit {
                id: self.state.id,
                expected: format!(
                    "party [{}] at turn {} round {}",
                    expected_party, expected_turn, expected_round
                ),
                got: format!(
                    "party [{}] at turn {} round {}",
                    offer.party, offer.turn_index, offer.round
                ),
            });
        }

        self.state.current_round = expected_round;
        log::debug!(
            "Negotiation [{}]: committed {} offer from [{}] (turn {}, round {})",
            self.state.id,
            offer.kind,
            offer.party,
            offer.turn_index,
            offer.round
        );
        self.state.history.push(offer.clone());

        self.emit(EventType::OfferCommitted, serde_json::json!(offer));
        Ok(())
    }

    /// Transitions to a terminal status, exactly once. The history collected
    /// so far is preserved whatever the outcome.
    pub fn commit_terminal(&mut self, termination: Termination) -> Result<(), EngineError> {
        if self.state.status.is_terminal() {
            return Err(EngineError::InvalidTransition {
                id: self.state.id,
                status: self.state.status,
            });
        }

        let status = termination.status();
        match termination {
            Termination::Agreement(agreement) => {
                log::info!(
                    "Negotiation [{}]: agreement reached at round {} turn {}",
                    self.state.id,
                    agreement.reached_at_round,
                    agreement.reached_at_turn
                );
                self.state.agreement = Some(agreement);
            }
            Termination::RoundsExhausted => {
                log::info!(
                    "Negotiation [{}]: round limit of {} exhausted without agreement",
                    self.state.id,
                    self.state.max_rounds
                );
            }
            Termination::Walkaway { reason } => {
                log::info!(
                    "Negotiation [{}]: explicit walkaway{}",
                    self.state.id,
                    reason.as_deref().map(|r| format!(" ({})", r)).unwrap_or_default()
                );
                self.state.failure_reason = reason;
            }
            Termination::Failure { reason } => {
                log::warn!("Negotiation [{}]: terminated on error: {}", self.state.id, reason);
                self.state.failure_reason = Some(reason);
            }
        }
        self.state.status = status;
        self.state.ended_at = Some(Utc::now());

        self.emit(
            EventType::Terminated,
            serde_json::json!({
                "status": self.state.status,
                "agreement": self.state.agreement,
                "failure_reason": self.state.failure_reason,
                "turns": self.state.turn_count(),
            }),
        );
        Ok(())
    }

    fn emit(&self, event_type: EventType, payload: serde_json::Value) {
        for sink in &self.sinks {
            sink.emit(NegotiationEvent {
                negotiation_id: self.state.id,
                event_type,
                payload: payload.clone(),
            });
        }
    }
}
