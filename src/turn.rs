use parley_negotiation_utils::{NegotiationId, NegotiationStatus, PartyId};

/// Alternating-turn protocol state.
#[derive(Clone, Debug, PartialEq)]
pub enum TurnState {
    NotStarted,
    AwaitingOffer { party: PartyId, retried: bool },
    Terminated(NegotiationStatus),
}

/// What to do after a failed offer attempt: one retry of the same turn is
/// allowed, persistent malformation is fatal for the negotiation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum RetryVerdict {
    Retry,
    Escalate,
}

/// The alternating-turn state machine.
///
/// `NotStarted → AwaitingOffer(opening) ⇄ AwaitingOffer(other) → Terminated`.
/// A retry keeps the machine in the same `AwaitingOffer` state: failures
/// never shift whose turn it is. Once terminated the machine never leaves
/// that state.
pub struct TurnManager {
    id: NegotiationId,
    state: TurnState,
}

impl TurnManager {
    pub fn new(id: NegotiationId) -> TurnManager {
        TurnManager {
            id,
            state: TurnState::NotStarted,
        }
    }

    pub fn state(&self) -> &TurnState {
        &self.state
    }

    pub fn is_terminated(&self) -> bool {
        matches!(self.state, TurnState::Terminated(_))
    }

    /// First transition, to the configured opening party. Ignored unless the
    /// machine is still in `NotStarted`.
    pub fn begin(&mut self, opening: PartyId) {
        if self.state == TurnState::NotStarted {
            log::debug!("Negotiation [{}]: opening turn goes to [{}]", self.id, opening);
            self.state = TurnState::AwaitingOffer {
                party: opening,
                retried: false,
            };
        }
    }

    /// Party whose offer is currently awaited, if any.
    pub fn active_party(&self) -> Option<&PartyId> {
        match &self.state {
            TurnState::AwaitingOffer { party, .. } => Some(party),
            _ => None,
        }
    }

    /// Records a failed attempt for the active turn and answers whether the
    /// same party may be re-prompted.
    pub fn note_failure(&mut self) -> RetryVerdict {
        match &mut self.state {
            TurnState::AwaitingOffer { party, retried } => {
                if *retried {
                    log::warn!(
                        "Negotiation [{}]: retry budget for [{}] exhausted",
                        self.id,
                        party
                    );
                    RetryVerdict::Escalate
                } else {
                    *retried = true;
                    RetryVerdict::Retry
                }
            }
            _ => RetryVerdict::Escalate,
        }
    }

    /// Hands the turn to the other party, resetting the retry budget.
    pub fn alternate(&mut self, next: PartyId) {
        if let TurnState::AwaitingOffer { .. } = self.state {
            self.state = TurnState::AwaitingOffer {
                party: next,
                retried: false,
            };
        }
    }

    pub fn terminate(&mut self, status: NegotiationStatus) {
        if !self.is_terminated() {
            self.state = TurnState::Terminated(status);
        }
    }
}
