use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use derive_more::Display;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::NegotiationConfig;
use crate::dimension::{DimensionName, DimensionSpec};
use crate::offer::Offer;
use crate::party::{PartyConfig, PartyId};

/// Identifier of a negotiation instance.
#[derive(
    Clone, Copy, Debug, Display, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct NegotiationId(pub Uuid);

impl NegotiationId {
    pub fn generate() -> NegotiationId {
        NegotiationId(Uuid::new_v4())
    }
}

/// Lifecycle status. `InProgress` is the only non-terminal state and a
/// negotiation leaves it exactly once.
#[derive(Clone, Copy, Debug, Display, PartialEq, Eq, Serialize, Deserialize)]
pub enum NegotiationStatus {
    #[display(fmt = "in progress")]
    InProgress,
    #[display(fmt = "agreement reached")]
    AgreementReached,
    #[display(fmt = "max rounds exceeded")]
    MaxRoundsExceeded,
    #[display(fmt = "explicit walkaway")]
    ExplicitWalkaway,
    #[display(fmt = "error")]
    Error,
}

impl NegotiationStatus {
    pub fn is_terminal(&self) -> bool {
        *self != NegotiationStatus::InProgress
    }
}

/// How the agreed terms relate to the parties' own acceptable ranges.
#[derive(Clone, Copy, Debug, Display, PartialEq, Eq, Serialize, Deserialize)]
pub enum SatisfiedParties {
    /// Agreed values lie inside both parties' boundaries on every dimension.
    Both,
    /// Inside exactly one party's boundaries (e.g. an acceptance override).
    One,
    /// Inside neither party's boundaries.
    Forced,
}

/// Terminal artifact produced when a negotiation reaches agreement.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Agreement {
    pub values: BTreeMap<DimensionName, f64>,
    pub reached_at_round: u32,
    pub reached_at_turn: u32,
    pub satisfied_parties: SatisfiedParties,
}

impl Agreement {
    /// Classifies agreed values against both parties' own boundaries.
    pub fn classify(values: &BTreeMap<DimensionName, f64>, parties: &[PartyConfig; 2]) -> SatisfiedParties {
        let satisfied = |party: &PartyConfig| {
            values.iter().all(|(dimension, value)| {
                party
                    .boundary(dimension)
                    .map(|b| b.contains(*value))
                    .unwrap_or(false)
            })
        };
        match (satisfied(&parties[0]), satisfied(&parties[1])) {
            (true, true) => SatisfiedParties::Both,
            (false, false) => SatisfiedParties::Forced,
            _ => SatisfiedParties::One,
        }
    }
}

/// The authoritative record of one negotiation.
///
/// Owned exclusively by the engine's state manager; everything else reads
/// snapshots. `history` is append-only, which makes any snapshot a verifiable
/// audit trail of the exchange so far.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NegotiationState {
    pub id: NegotiationId,
    pub parties: [PartyConfig; 2],
    pub dimensions: Vec<DimensionSpec>,
    pub history: Vec<Offer>,
    pub status: NegotiationStatus,
    pub agreement: Option<Agreement>,
    pub failure_reason: Option<String>,
    /// Round currently being played (1-based). A round is one offer from
    /// each party; the counter advances when the next round's first offer is
    /// committed.
    pub current_round: u32,
    pub max_rounds: u32,
    pub opening_party: PartyId,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
}

impl NegotiationState {
    /// Fresh state for a validated configuration: empty history, round 1,
    /// `InProgress`. Callers are expected to go through the engine's state
    /// manager rather than mutating the result directly.
    pub fn initialize(config: NegotiationConfig) -> NegotiationState {
        let NegotiationConfig {
            dimensions,
            parties,
            max_rounds,
            opening_party,
            ..
        } = config;
        NegotiationState {
            id: NegotiationId::generate(),
            parties,
            dimensions,
            history: vec![],
            status: NegotiationStatus::InProgress,
            agreement: None,
            failure_reason: None,
            current_round: 1,
            max_rounds,
            opening_party,
            started_at: Utc::now(),
            ended_at: None,
        }
    }

    pub fn party(&self, id: &PartyId) -> Option<&PartyConfig> {
        self.parties.iter().find(|p| &p.id == id)
    }

    pub fn counterpart_of(&self, id: &PartyId) -> &PartyConfig {
        if self.parties[0].id == *id {
            &self.parties[1]
        } else {
            &self.parties[0]
        }
    }

    pub fn offers_of<'a>(&'a self, id: &'a PartyId) -> impl DoubleEndedIterator<Item = &'a Offer> {
        self.history.iter().filter(move |offer| &offer.party == id)
    }

    pub fn latest_offer_of(&self, id: &PartyId) -> Option<&Offer> {
        self.history.iter().rev().find(|offer| &offer.party == id)
    }

    /// Latest offer from each party, in `parties` order, once both have moved.
    pub fn latest_offer_pair(&self) -> Option<(&Offer, &Offer)> {
        let first = self.latest_offer_of(&self.parties[0].id)?;
        let second = self.latest_offer_of(&self.parties[1].id)?;
        Some((first, second))
    }

    pub fn turn_count(&self) -> u32 {
        self.history.len() as u32
    }

    /// Party expected to produce the next offer, derived from the opening
    /// party and strict alternation of the committed history.
    pub fn party_on_turn(&self) -> &PartyId {
        match self.history.last() {
            None => &self.opening_party,
            Some(offer) => &self.counterpart_of(&offer.party).id,
        }
    }

    /// Round the next committed offer will belong to.
    pub fn round_of_next_turn(&self) -> u32 {
        (self.history.len() as u32) / 2 + 1
    }
}
