use anyhow::anyhow;
use serde::{Deserialize, Serialize};

use parley_negotiation_utils::OfferTerms;
use parley_strategy_component::{OfferStrategy, ProposalContext, StrategyAction};

fn default_concession_rate() -> f64 {
    0.15
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    /// Fraction of the own range conceded toward the counterpart per turn.
    #[serde(default = "default_concession_rate")]
    pub concession_rate: f64,
    /// Walk away if the counterpart is still outside the own range on every
    /// dimension after this many rounds. `None` keeps negotiating to the
    /// round limit.
    #[serde(default)]
    pub patience_rounds: Option<u32>,
}

impl Default for Config {
    fn default() -> Config {
        Config {
            concession_rate: default_concession_rate(),
            patience_rounds: None,
        }
    }
}

/// Linear concession strategy: opens at its desired extreme on every
/// dimension, then moves a fixed fraction of its own range toward the
/// counterpart's last offer each turn, never leaving its own boundary.
/// Accepts as soon as the counterpart's offer is acceptable on all
/// dimensions.
pub struct Concession {
    config: Config,
}

impl Concession {
    pub fn new(config: serde_yaml::Value) -> anyhow::Result<Concession> {
        let config: Config = if config.is_null() {
            Config::default()
        } else {
            serde_yaml::from_value(config)?
        };
        if !(0.0..=1.0).contains(&config.concession_rate) {
            return Err(anyhow!(
                "concession_rate {} outside [0, 1]",
                config.concession_rate
            ));
        }
        Ok(Concession { config })
    }
}

impl OfferStrategy for Concession {
    fn propose(&mut self, context: &ProposalContext) -> anyhow::Result<StrategyAction> {
        let their_last = context.counterpart_last_offer();

        if let Some(their) = their_last {
            let acceptable = context.dimensions.iter().all(|spec| {
                match (context.party.boundary(&spec.name), their.value(&spec.name)) {
                    (Some(boundary), Some(value)) => boundary.contains(value),
                    _ => false,
                }
            });
            if acceptable {
                log::debug!(
                    "[{}] counterpart offer at turn {} is fully acceptable",
                    context.party.id,
                    their.turn_index
                );
                return Ok(StrategyAction::Accept);
            }
            if let Some(patience) = self.config.patience_rounds {
                if context.round > patience {
                    return Ok(StrategyAction::Walkaway {
                        reason: Some(format!("no acceptable offer within {} rounds", patience)),
                    });
                }
            }
        }

        let mut values = vec![];
        for spec in &context.dimensions {
            let boundary = context
                .party
                .boundary(&spec.name)
                .ok_or_else(|| anyhow!("no boundary for dimension [{}]", spec.name))?;
            let own_prev = context
                .own_last_offer()
                .and_then(|offer| offer.value(&spec.name));

            let value = match (own_prev, their_last.and_then(|o| o.value(&spec.name))) {
                // Opening move: ask for the ideal outcome.
                (None, _) => boundary.desired_extreme(),
                // Nothing to converge toward yet; hold position.
                (Some(prev), None) => prev,
                (Some(prev), Some(theirs)) => {
                    let step = boundary.range_size() * self.config.concession_rate;
                    let conceded = if theirs > prev {
                        (prev + step).min(theirs)
                    } else {
                        (prev - step).max(theirs)
                    };
                    // Concede within the own range only.
                    conceded
                        .max(boundary.min_acceptable)
                        .min(boundary.max_desired)
                }
            };
            values.push((spec.name.clone(), value));
        }

        Ok(StrategyAction::Counter {
            terms: OfferTerms::new(values)
                .message("Counter-offer, conceding toward your position.")
                .confidence(0.6),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parley_negotiation_utils::{
        DimensionName, DimensionSpec, Offer, OfferKind, PartyConfig, PreferenceDirection,
        ValueKind, ZopaBoundary,
    };

    fn context(history: Vec<Offer>) -> ProposalContext {
        let dimensions = vec![DimensionSpec::new("price", "$/unit", ValueKind::Continuous)];
        ProposalContext {
            party: PartyConfig::new(
                "seller",
                "Seller",
                vec![ZopaBoundary::new(
                    "price",
                    12.0,
                    20.0,
                    PreferenceDirection::HigherBetter,
                )
                .unwrap()],
            ),
            counterpart: "buyer".into(),
            dimensions,
            round: 1,
            turn_index: history.len() as u32 + 1,
            max_rounds: 10,
            visible_history: history,
        }
    }

    fn offer(party: &str, turn_index: u32, price: f64) -> Offer {
        let dimensions = vec![DimensionSpec::new("price", "$/unit", ValueKind::Continuous)];
        Offer::from_terms(
            party.into(),
            (turn_index - 1) / 2 + 1,
            turn_index,
            OfferKind::Counter,
            OfferTerms::new(vec![("price".into(), price)]),
            &dimensions,
        )
        .unwrap()
    }

    #[test]
    fn test_opens_at_desired_extreme() {
        let mut strategy = Concession::new(serde_yaml::Value::Null).unwrap();
        let action = strategy.propose(&context(vec![])).unwrap();
        match action {
            StrategyAction::Counter { terms } => {
                assert_eq!(terms.values[&DimensionName::from("price")], 20.0);
            }
            other => panic!("expected counter, got {}", other),
        }
    }

    #[test]
    fn test_concedes_toward_counterpart_within_own_range() {
        let mut strategy = Concession::new(serde_yaml::Value::Null).unwrap();
        let history = vec![offer("seller", 1, 20.0), offer("buyer", 2, 10.0)];
        let action = strategy.propose(&context(history)).unwrap();
        match action {
            StrategyAction::Counter { terms } => {
                // One step of 0.15 * 8.0 down from 20.0, clamped to own range.
                assert!((terms.values[&DimensionName::from("price")] - 18.8).abs() < 1e-9);
            }
            other => panic!("expected counter, got {}", other),
        }
    }

    #[test]
    fn test_accepts_acceptable_counterpart_offer() {
        let mut strategy = Concession::new(serde_yaml::Value::Null).unwrap();
        let history = vec![offer("seller", 1, 20.0), offer("buyer", 2, 14.0)];
        let action = strategy.propose(&context(history)).unwrap();
        assert!(matches!(action, StrategyAction::Accept));
    }
}
