pub mod component;
pub mod context;

pub use component::{OfferStrategy, StrategyAction};
pub use context::ProposalContext;
