use thiserror::Error;

use crate::party::PartyId;
use crate::state::{NegotiationId, NegotiationStatus};

/// Errors raised by the negotiation engine.
///
/// `Configuration`, `OutOfOrderCommit` and `InvalidTransition` indicate caller
/// bugs and are returned directly. `StructuralOffer` and `Generation` are
/// runtime conditions of the offer-generation collaborator and are absorbed by
/// the turn manager's retry budget before they can escalate.
#[derive(Error, Clone, Debug, PartialEq)]
pub enum EngineError {
    #[error("invalid negotiation configuration: {0}")]
    Configuration(String),

    #[error("malformed offer from [{party}]: {reason}")]
    StructuralOffer { party: PartyId, reason: String },

    #[error("offer generation failed for [{party}]: {reason}")]
    Generation { party: PartyId, reason: String },

    #[error("out of order commit on negotiation [{id}]: expected {expected}, got {got}")]
    OutOfOrderCommit {
        id: NegotiationId,
        expected: String,
        got: String,
    },

    #[error("negotiation [{id}] is already terminated ({status})")]
    InvalidTransition {
        id: NegotiationId,
        status: NegotiationStatus,
    },
}
