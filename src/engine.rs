use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::time::timeout;

use parley_negotiation_utils::{
    EngineError, NegotiationConfig, NegotiationId, NegotiationState, Offer, OfferKind,
    OfferTerms, PartyId,
};
use parley_strategy_component::{ProposalContext, StrategyAction};

use crate::detector::{AgreementDetector, ConvergencePolicy, DetectionResult};
use crate::events::EventSink;
use crate::parties::PartyAddr;
use crate::state::{StateManager, Termination};
use crate::turn::{RetryVerdict, TurnManager, TurnState};
use crate::validator::ZopaValidator;

enum TurnOutcome {
    Committed,
    Walkaway { reason: Option<String> },
}

/// One negotiation instance: the state manager, the turn state machine and
/// the two party addresses, wired together.
///
/// Instances are fully isolated from each other; running several
/// concurrently needs no coordination. Within an instance turns execute
/// strictly sequentially: there is exactly one outstanding `ProposeOffer`
/// at a time, awaited to completion before termination is evaluated.
pub struct Negotiation {
    state: StateManager,
    turn: TurnManager,
    detector: AgreementDetector,
    parties: HashMap<PartyId, Arc<PartyAddr>>,
    proposal_timeout: Option<Duration>,
}

impl Negotiation {
    /// Validates the configuration and wires both parties. `party_a` and
    /// `party_b` correspond to `config.parties` in order. Fails without
    /// side effects on a malformed configuration.
    pub fn new(
        config: NegotiationConfig,
        party_a: Arc<PartyAddr>,
        party_b: Arc<PartyAddr>,
    ) -> Result<Negotiation, EngineError> {
        Self::with_policy(config, party_a, party_b, ConvergencePolicy::default())
    }

    pub fn with_policy(
        config: NegotiationConfig,
        party_a: Arc<PartyAddr>,
        party_b: Arc<PartyAddr>,
        policy: ConvergencePolicy,
    ) -> Result<Negotiation, EngineError> {
        let proposal_timeout = config.proposal_timeout;
        let state = StateManager::new(config)?;

        let mut parties = HashMap::new();
        parties.insert(state.state().parties[0].id.clone(), party_a);
        parties.insert(state.state().parties[1].id.clone(), party_b);

        let turn = TurnManager::new(state.state().id);
        Ok(Negotiation {
            turn,
            detector: AgreementDetector::new(policy),
            parties,
            proposal_timeout,
            state,
        })
    }

    pub fn id(&self) -> NegotiationId {
        self.state.state().id
    }

    pub fn add_sink(&mut self, sink: Box<dyn EventSink>) {
        self.state.add_sink(sink);
    }

    /// Read-only snapshot of the authoritative state.
    pub fn view(&self) -> NegotiationState {
        self.state.current_view()
    }

    /// Runs turns until the negotiation terminates and returns the final
    /// state. Runtime negotiation conditions (walkaways, exhausted rounds,
    /// repeated generation failures) end up as terminal statuses, never as
    /// `Err`; only invariant violations surface as errors.
    pub async fn run(&mut self) -> Result<NegotiationState, EngineError> {
        while !self.turn.is_terminated() {
            self.step().await?;
        }
        Ok(self.state.current_view())
    }

    /// Executes a single turn: one offer request to the active party, plus
    /// at most one retry of the same party on a malformed offer or a
    /// generation failure. Requesting a turn on a terminated negotiation is
    /// an `InvalidTransition`.
    pub async fn step(&mut self) -> Result<(), EngineError> {
        if let TurnState::Terminated(status) = self.turn.state() {
            let status = *status;
            return Err(EngineError::InvalidTransition {
                id: self.state.state().id,
                status,
            });
        }
        // No-op once the machine has left `NotStarted`.
        let opening = self.state.state().opening_party.clone();
        self.turn.begin(opening);

        // Round bound: never request an offer that would open a round past
        // the limit.
        if self.state.state().round_of_next_turn() > self.state.state().max_rounds {
            return self.finish(Termination::RoundsExhausted);
        }

        let party = match self.turn.active_party() {
            Some(party) => party.clone(),
            // Unreachable after begin(); treated as a caller bug.
            None => {
                return Err(EngineError::InvalidTransition {
                    id: self.state.state().id,
                    status: self.state.state().status,
                })
            }
        };

        loop {
            match self.execute_attempt(&party).await {
                Ok(TurnOutcome::Walkaway { reason }) => {
                    return self.finish(Termination::Walkaway { reason });
                }
                Ok(TurnOutcome::Committed) => {
                    return match self.detector.evaluate(self.state.state()) {
                        DetectionResult::Agreement(agreement) => {
                            self.finish(Termination::Agreement(agreement))
                        }
                        DetectionResult::RoundsExhausted => {
                            self.finish(Termination::RoundsExhausted)
                        }
                        DetectionResult::Continue => {
                            let next = self.state.state().party_on_turn().clone();
                            self.turn.alternate(next);
                            Ok(())
                        }
                    };
                }
                Err(error @ EngineError::StructuralOffer { .. })
                | Err(error @ EngineError::Generation { .. }) => {
                    match self.turn.note_failure() {
                        RetryVerdict::Retry => {
                            log::warn!(
                                "Negotiation [{}]: re-prompting [{}] after: {}",
                                self.state.state().id,
                                party,
                                error
                            );
                        }
                        RetryVerdict::Escalate => {
                            return self.finish(Termination::Failure {
                                reason: error.to_string(),
                            });
                        }
                    }
                }
                Err(error) => return Err(error),
            }
        }
    }

    /// Aborts between turns, preserving the history collected so far as an
    /// explicit walkaway.
    pub fn abort(&mut self, reason: Option<String>) -> Result<NegotiationState, EngineError> {
        self.finish(Termination::Walkaway { reason })?;
        Ok(self.state.current_view())
    }

    fn finish(&mut self, termination: Termination) -> Result<(), EngineError> {
        let status = termination.status();
        self.state.commit_terminal(termination)?;
        self.turn.terminate(status);
        Ok(())
    }

    /// Requests one candidate offer, validates it and commits it.
    async fn execute_attempt(&mut self, party: &PartyId) -> Result<TurnOutcome, EngineError> {
        let action = self.request_action(party).await?;
        let offer = match action {
            StrategyAction::Walkaway { reason } => {
                return Ok(TurnOutcome::Walkaway { reason })
            }
            StrategyAction::Counter { terms } => self.stamp_offer(party, OfferKind::Counter, terms)?,
            StrategyAction::Accept => {
                let state = self.state.state();
                let accepted = state.latest_offer_of(&state.counterpart_of(party).id).ok_or_else(
                    || EngineError::StructuralOffer {
                        party: party.clone(),
                        reason: "acceptance with no standing counterpart offer".to_string(),
                    },
                )?;
                let terms = OfferTerms {
                    values: accepted.values.clone(),
                    message: "Accepts the standing offer.".to_string(),
                    confidence: 1.0,
                    reasoning: None,
                };
                self.stamp_offer(party, OfferKind::Acceptance, terms)?
            }
        };

        // Self-compliance check against the offering party's own boundary.
        // Range violations are recorded, not rejected; only structural
        // mismatches abort the attempt.
        let state = self.state.state();
        let boundaries = &state
            .party(party)
            .ok_or_else(|| EngineError::Configuration(format!("unknown party [{}]", party)))?
            .boundaries;
        let report = ZopaValidator::validate(&offer, boundaries)?;
        if report.fully_compliant() {
            log::debug!(
                "Negotiation [{}]: offer from [{}] is self-compliant",
                state.id,
                party
            );
        } else {
            log::info!(
                "Negotiation [{}]: offer from [{}] leaves its own range on [{}] (score {:.2})",
                state.id,
                party,
                report
                    .violations()
                    .map(|name| name.as_str())
                    .collect::<Vec<_>>()
                    .join(", "),
                report.compliance_score
            );
        }

        self.state.commit_offer(offer)?;
        Ok(TurnOutcome::Committed)
    }

    fn stamp_offer(
        &self,
        party: &PartyId,
        kind: OfferKind,
        terms: OfferTerms,
    ) -> Result<Offer, EngineError> {
        let state = self.state.state();
        Offer::from_terms(
            party.clone(),
            state.round_of_next_turn(),
            state.turn_count() + 1,
            kind,
            terms,
            &state.dimensions,
        )
    }

    async fn request_action(&self, party: &PartyId) -> Result<StrategyAction, EngineError> {
        let addr = self
            .parties
            .get(party)
            .ok_or_else(|| EngineError::Configuration(format!("unknown party [{}]", party)))?;
        let context = self.proposal_context(party)?;

        let answer = match self.proposal_timeout {
            Some(budget) => match timeout(budget, addr.propose(context)).await {
                Ok(answer) => answer,
                Err(_) => {
                    return Err(EngineError::Generation {
                        party: party.clone(),
                        reason: format!("no offer within {:?}", budget),
                    })
                }
            },
            None => addr.propose(context).await,
        };

        answer.map_err(|error| EngineError::Generation {
            party: party.clone(),
            reason: error.to_string(),
        })
    }

    fn proposal_context(&self, party: &PartyId) -> Result<ProposalContext, EngineError> {
        let state = self.state.state();
        let config = state
            .party(party)
            .ok_or_else(|| EngineError::Configuration(format!("unknown party [{}]", party)))?;
        Ok(ProposalContext {
            party: config.clone(),
            counterpart: state.counterpart_of(party).id.clone(),
            dimensions: state.dimensions.clone(),
            visible_history: state.history.clone(),
            round: state.round_of_next_turn(),
            turn_index: state.turn_count() + 1,
            max_rounds: state.max_rounds,
        })
    }
}
