use derive_more::Display;
use serde::{Deserialize, Serialize};

use parley_negotiation_utils::OfferTerms;

use crate::context::ProposalContext;

/// Decision returned by an `OfferStrategy` for one turn.
#[derive(Clone, Debug, Display, Serialize, Deserialize)]
pub enum StrategyAction {
    /// Propose new values for every configured dimension.
    #[display(fmt = "Counter")]
    Counter { terms: OfferTerms },
    /// Accept the counterpart's immediately preceding offer verbatim.
    /// Invalid as an opening move, when there is nothing to accept.
    Accept,
    /// Leave the table. Terminal for the whole negotiation.
    #[display(
        fmt = "Walkaway{}",
        "reason.as_ref().map(|r| format!(\" ({})\", r)).unwrap_or_default()"
    )]
    Walkaway { reason: Option<String> },
}

/// The offer-generation collaborator consumed by the negotiation engine.
///
/// The engine never looks behind this trait: a rule-based heuristic, a
/// scripted sequence, a human form, or a language-model pipeline are all
/// equally valid implementations. An implementation only sees the committed
/// history, its own boundary and the turn position, and answers with a
/// `StrategyAction`; the engine owns validation, bookkeeping and termination.
///
/// Returning `Err` signals a generation failure (upstream outage, timeout
/// mapped by the host). The engine re-prompts once, then terminates the
/// negotiation with an error status.
pub trait OfferStrategy: Send {
    fn propose(&mut self, context: &ProposalContext) -> anyhow::Result<StrategyAction>;
}
