mod composite;
mod detector;
mod engine;
mod events;
pub mod factory;
mod parties;
mod state;
mod turn;
mod validator;

pub use composite::StrategyParty;
pub use detector::{AgreementDetector, ConvergencePolicy, DetectionResult};
pub use engine::Negotiation;
pub use events::{EventSink, EventType, NegotiationEvent};
pub use parties::{Party, PartyAddr, ProposeOffer};
pub use state::{StateManager, Termination};
pub use turn::{RetryVerdict, TurnManager, TurnState};
pub use validator::{ComplianceReport, DimensionVerdict, ZopaValidator};

pub use parley_negotiation_utils::{
    Agreement, DimensionName, DimensionSpec, EngineError, NegotiationConfig, NegotiationId,
    NegotiationState, NegotiationStatus, Offer, OfferKind, OfferTerms, PartyConfig, PartyId,
    PreferenceDirection, SatisfiedParties, ValueKind, ZopaBoundary, ZopaOverlap,
};

pub mod builtin {
    pub use parley_builtin_strategies::{AcceptAll, Concession, Scripted};
}

pub mod component {
    pub use parley_strategy_component::{OfferStrategy, ProposalContext, StrategyAction};
}
