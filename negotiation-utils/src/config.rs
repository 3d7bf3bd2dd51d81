use std::collections::BTreeSet;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::dimension::DimensionSpec;
use crate::error::EngineError;
use crate::party::{PartyConfig, PartyId};

fn default_max_rounds() -> u32 {
    20
}

/// Everything the engine consumes at negotiation start. Validated before any
/// turn executes; a malformed configuration means the negotiation never
/// begins.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NegotiationConfig {
    pub dimensions: Vec<DimensionSpec>,
    pub parties: [PartyConfig; 2],
    #[serde(default = "default_max_rounds")]
    pub max_rounds: u32,
    pub opening_party: PartyId,
    /// Wall-clock budget for a single offer-generation call. Elapsing counts
    /// as a generation failure, subject to the turn retry budget.
    #[serde(with = "humantime_serde", default)]
    pub proposal_timeout: Option<Duration>,
}

impl NegotiationConfig {
    pub fn new(
        dimensions: Vec<DimensionSpec>,
        parties: [PartyConfig; 2],
        max_rounds: u32,
    ) -> NegotiationConfig {
        let opening_party = parties[0].id.clone();
        NegotiationConfig {
            dimensions,
            parties,
            max_rounds,
            opening_party,
            proposal_timeout: None,
        }
    }

    pub fn opening_party(mut self, id: impl Into<PartyId>) -> NegotiationConfig {
        self.opening_party = id.into();
        self
    }

    pub fn proposal_timeout(mut self, timeout: Duration) -> NegotiationConfig {
        self.proposal_timeout = Some(timeout);
        self
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        if self.max_rounds == 0 {
            return Err(EngineError::Configuration(
                "max_rounds must be positive".to_string(),
            ));
        }
        if self.dimensions.is_empty() {
            return Err(EngineError::Configuration(
                "at least one dimension is required".to_string(),
            ));
        }

        let mut names = BTreeSet::new();
        for spec in &self.dimensions {
            if !names.insert(&spec.name) {
                return Err(EngineError::Configuration(format!(
                    "duplicate dimension [{}]",
                    spec.name
                )));
            }
        }

        if self.parties[0].id == self.parties[1].id {
            return Err(EngineError::Configuration(format!(
                "parties must have distinct ids, got [{}] twice",
                self.parties[0].id
            )));
        }
        if self.parties.iter().all(|p| p.id != self.opening_party) {
            return Err(EngineError::Configuration(format!(
                "opening party [{}] is not one of the negotiating parties",
                self.opening_party
            )));
        }

        for party in self.parties.iter() {
            for spec in &self.dimensions {
                let boundary = party.boundary(&spec.name).ok_or_else(|| {
                    EngineError::Configuration(format!(
                        "party [{}] has no boundary for dimension [{}]",
                        party.id, spec.name
                    ))
                })?;
                // Re-validated here since configs may be deserialized rather
                // than built through `ZopaBoundary::new`.
                if boundary.min_acceptable > boundary.max_desired {
                    return Err(EngineError::Configuration(format!(
                        "party [{}] has an inverted boundary on dimension [{}]",
                        party.id, spec.name
                    )));
                }
            }
            for dimension in party.boundaries.keys() {
                if !names.contains(dimension) {
                    return Err(EngineError::Configuration(format!(
                        "party [{}] has a boundary for unconfigured dimension [{}]",
                        party.id, dimension
                    )));
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dimension::{DimensionName, PreferenceDirection, ValueKind};
    use crate::zopa::ZopaBoundary;

    fn price_dimension() -> DimensionSpec {
        DimensionSpec::new("price", "$/unit", ValueKind::Continuous)
    }

    fn party(id: &str, min: f64, max: f64) -> PartyConfig {
        PartyConfig::new(
            id,
            id,
            vec![
                ZopaBoundary::new("price", min, max, PreferenceDirection::LowerBetter).unwrap(),
            ],
        )
    }

    fn config() -> NegotiationConfig {
        NegotiationConfig::new(
            vec![price_dimension()],
            [party("buyer", 10.0, 15.0), party("seller", 12.0, 20.0)],
            3,
        )
    }

    #[test]
    fn test_valid_config() {
        config().validate().unwrap();
    }

    #[test]
    fn test_zero_rounds_rejected() {
        let mut config = config();
        config.max_rounds = 0;
        assert!(matches!(
            config.validate(),
            Err(EngineError::Configuration(_))
        ));
    }

    #[test]
    fn test_inverted_boundary_rejected() {
        let mut config = config();
        config.parties[0]
            .boundaries
            .get_mut(&DimensionName::from("price"))
            .unwrap()
            .min_acceptable = 99.0;
        assert!(matches!(
            config.validate(),
            Err(EngineError::Configuration(_))
        ));
    }

    #[test]
    fn test_missing_boundary_rejected() {
        let mut config = config();
        config.parties[1].boundaries.clear();
        assert!(matches!(
            config.validate(),
            Err(EngineError::Configuration(_))
        ));
    }

    #[test]
    fn test_unknown_opening_party_rejected() {
        let config = config().opening_party("mediator");
        assert!(matches!(
            config.validate(),
            Err(EngineError::Configuration(_))
        ));
    }
}
