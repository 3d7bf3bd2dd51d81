use serde::{Deserialize, Serialize};

use parley_negotiation_utils::{DimensionSpec, Offer, PartyConfig, PartyId};

/// Everything a strategy may see when asked for its next move: the committed
/// history, its own configuration (including its private boundary) and the
/// turn position. Strategies never see the counterpart's boundary.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProposalContext {
    pub party: PartyConfig,
    pub counterpart: PartyId,
    pub dimensions: Vec<DimensionSpec>,
    pub visible_history: Vec<Offer>,
    /// Round this proposal will belong to (1-based).
    pub round: u32,
    /// Turn index this proposal will be committed at (1-based).
    pub turn_index: u32,
    pub max_rounds: u32,
}

impl ProposalContext {
    pub fn own_last_offer(&self) -> Option<&Offer> {
        self.visible_history
            .iter()
            .rev()
            .find(|offer| offer.party == self.party.id)
    }

    pub fn counterpart_last_offer(&self) -> Option<&Offer> {
        self.visible_history
            .iter()
            .rev()
            .find(|offer| offer.party == self.counterpart)
    }

    pub fn is_opening_turn(&self) -> bool {
        self.visible_history.is_empty()
    }

    pub fn rounds_remaining(&self) -> u32 {
        self.max_rounds.saturating_sub(self.round)
    }
}
