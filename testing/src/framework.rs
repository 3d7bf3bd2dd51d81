use std::time::Duration;

use anyhow::anyhow;
use tokio::time::timeout;

use parley::factory::{create_party, StrategyConfig};
use parley::Negotiation;
use parley_negotiation_utils::{
    DimensionName, DimensionSpec, NegotiationConfig, NegotiationState, PartyConfig,
    PreferenceDirection, ValueKind, ZopaBoundary,
};

use crate::record::NegotiationRecordSync;

/// Emulates a full negotiation between two strategy-backed parties and
/// collects the emitted event stream.
pub struct Framework {
    pub config: NegotiationConfig,
    pub record: NegotiationRecordSync,
    pub test_timeout: Duration,
}

impl Framework {
    pub fn new(config: NegotiationConfig) -> anyhow::Result<Framework> {
        let _ = env_logger::builder().is_test(true).try_init();
        config.validate()?;

        Ok(Framework {
            config,
            record: NegotiationRecordSync::new(),
            test_timeout: Duration::from_secs(10),
        })
    }

    pub fn test_timeout(mut self, test_timeout: Duration) -> Self {
        self.test_timeout = test_timeout;
        self
    }

    /// Runs the negotiation to its terminal state with the given strategies,
    /// in `config.parties` order.
    pub async fn run(
        &self,
        strategy_a: StrategyConfig,
        strategy_b: StrategyConfig,
    ) -> anyhow::Result<NegotiationState> {
        let party_a = create_party(strategy_a)?;
        let party_b = create_party(strategy_b)?;

        let mut negotiation = Negotiation::new(self.config.clone(), party_a, party_b)?;
        negotiation.add_sink(Box::new(self.record.clone()));

        timeout(self.test_timeout, negotiation.run())
            .await
            .map_err(|_| anyhow!("negotiation did not finish within {:?}", self.test_timeout))?
            .map_err(|e| e.into())
    }
}

pub fn dimension(name: &str, unit: &str, kind: ValueKind) -> DimensionSpec {
    DimensionSpec::new(name, unit, kind)
}

pub fn boundary(
    name: &str,
    min_acceptable: f64,
    max_desired: f64,
    direction: PreferenceDirection,
) -> ZopaBoundary {
    ZopaBoundary::new(DimensionName::from(name), min_acceptable, max_desired, direction)
        .expect("test boundary must be well-formed")
}

pub fn party(id: &str, boundaries: Vec<ZopaBoundary>) -> PartyConfig {
    PartyConfig::new(id, id, boundaries)
}
