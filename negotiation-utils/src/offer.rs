use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use derive_more::Display;
use serde::{Deserialize, Serialize};

use crate::dimension::{DimensionName, DimensionSpec};
use crate::error::EngineError;
use crate::party::PartyId;

/// Whether an offer is a counter-proposal or an explicit acceptance of the
/// counterpart's immediately preceding offer. Acceptance offers carry the
/// accepted values verbatim and act as a terminal signal.
#[derive(Clone, Copy, Debug, Display, PartialEq, Eq, Serialize, Deserialize)]
pub enum OfferKind {
    Counter,
    Acceptance,
}

/// The raw material of an offer as produced by an offer-generation
/// collaborator, before the engine stamps provenance onto it.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct OfferTerms {
    pub values: BTreeMap<DimensionName, f64>,
    pub message: String,
    pub confidence: f64,
    pub reasoning: Option<String>,
}

impl OfferTerms {
    pub fn new(values: impl IntoIterator<Item = (DimensionName, f64)>) -> OfferTerms {
        OfferTerms {
            values: values.into_iter().collect(),
            message: String::new(),
            confidence: 0.5,
            reasoning: None,
        }
    }

    pub fn message(mut self, message: impl Into<String>) -> OfferTerms {
        self.message = message.into();
        self
    }

    pub fn confidence(mut self, confidence: f64) -> OfferTerms {
        self.confidence = confidence;
        self
    }
}

/// Immutable snapshot of one party's proposed values across all dimensions,
/// with provenance. Never modified after creation; a party's next move is a
/// new `Offer`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Offer {
    pub party: PartyId,
    pub round: u32,
    /// 1-based position in the overall offer history.
    pub turn_index: u32,
    pub values: BTreeMap<DimensionName, f64>,
    pub kind: OfferKind,
    pub message: String,
    pub confidence: f64,
    pub reasoning: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl Offer {
    /// Stamps provenance onto generated terms, checking structure against the
    /// configured dimension set. Missing or extra dimensions and non-finite
    /// values fail here, before the offer can enter any history.
    pub fn from_terms(
        party: PartyId,
        round: u32,
        turn_index: u32,
        kind: OfferKind,
        terms: OfferTerms,
        dimensions: &[DimensionSpec],
    ) -> Result<Offer, EngineError> {
        for spec in dimensions {
            match terms.values.get(&spec.name) {
                None => {
                    return Err(EngineError::StructuralOffer {
                        party,
                        reason: format!("missing value for dimension [{}]", spec.name),
                    })
                }
                Some(value) if !value.is_finite() => {
                    return Err(EngineError::StructuralOffer {
                        party,
                        reason: format!("non-finite value for dimension [{}]", spec.name),
                    })
                }
                Some(_) => {}
            }
        }
        if terms.values.len() != dimensions.len() {
            let unknown = terms
                .values
                .keys()
                .find(|name| !dimensions.iter().any(|spec| &spec.name == *name))
                .cloned()
                .unwrap_or_else(|| DimensionName::from("?"));
            return Err(EngineError::StructuralOffer {
                party,
                reason: format!("value for unconfigured dimension [{}]", unknown),
            });
        }
        if !(0.0..=1.0).contains(&terms.confidence) {
            return Err(EngineError::StructuralOffer {
                party,
                reason: format!("confidence {} outside [0, 1]", terms.confidence),
            });
        }
        Ok(Offer {
            party,
            round,
            turn_index,
            values: terms.values,
            kind,
            message: terms.message,
            confidence: terms.confidence,
            reasoning: terms.reasoning,
            timestamp: Utc::now(),
        })
    }

    pub fn value(&self, dimension: &DimensionName) -> Option<f64> {
        self.values.get(dimension).copied()
    }

    pub fn is_acceptance(&self) -> bool {
        self.kind == OfferKind::Acceptance
    }
}
