pub mod config;
pub mod dimension;
pub mod error;
pub mod offer;
pub mod party;
pub mod state;
pub mod zopa;

pub use config::NegotiationConfig;
pub use dimension::{DimensionName, DimensionSpec, PreferenceDirection, ValueKind};
pub use error::EngineError;
pub use offer::{Offer, OfferKind, OfferTerms};
pub use party::{PartyConfig, PartyId};
pub use state::{
    Agreement, NegotiationId, NegotiationState, NegotiationStatus, SatisfiedParties,
};
pub use zopa::{ZopaBoundary, ZopaOverlap};
