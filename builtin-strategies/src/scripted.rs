use std::collections::{BTreeMap, VecDeque};

use anyhow::bail;
use serde::{Deserialize, Serialize};

use parley_negotiation_utils::{DimensionName, OfferTerms};
use parley_strategy_component::{OfferStrategy, ProposalContext, StrategyAction};

fn default_confidence() -> f64 {
    0.5
}

/// One pre-scripted move.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum Step {
    Counter {
        values: BTreeMap<DimensionName, f64>,
        #[serde(default)]
        message: String,
        #[serde(default = "default_confidence")]
        confidence: f64,
    },
    Accept,
    Walkaway {
        #[serde(default)]
        reason: Option<String>,
    },
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    pub steps: Vec<Step>,
}

/// Strategy that replays a fixed sequence of moves. Intended for tests and
/// deterministic simulations; an exhausted script reports a generation
/// failure, which exercises the engine's retry and escalation path.
pub struct Scripted {
    steps: VecDeque<Step>,
}

impl Scripted {
    pub fn new(config: serde_yaml::Value) -> anyhow::Result<Scripted> {
        let config: Config = serde_yaml::from_value(config)?;
        Ok(Scripted {
            steps: config.steps.into(),
        })
    }

    pub fn from_steps(steps: Vec<Step>) -> Scripted {
        Scripted {
            steps: steps.into(),
        }
    }
}

impl OfferStrategy for Scripted {
    fn propose(&mut self, context: &ProposalContext) -> anyhow::Result<StrategyAction> {
        match self.steps.pop_front() {
            Some(Step::Counter {
                values,
                message,
                confidence,
            }) => Ok(StrategyAction::Counter {
                terms: OfferTerms {
                    values,
                    message,
                    confidence,
                    reasoning: None,
                },
            }),
            Some(Step::Accept) => Ok(StrategyAction::Accept),
            Some(Step::Walkaway { reason }) => Ok(StrategyAction::Walkaway { reason }),
            None => bail!(
                "script exhausted for [{}] at turn {}",
                context.party.id,
                context.turn_index
            ),
        }
    }
}
