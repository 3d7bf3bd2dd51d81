use anyhow::bail;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::composite::StrategyParty;
use crate::parties::PartyAddr;

use parley_strategy_component::OfferStrategy;

use crate::builtin::AcceptAll;
use crate::builtin::Concession;
use crate::builtin::Scripted;

/// Declarative description of one party's offer strategy, typically read
/// from yaml alongside the negotiation configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StrategyConfig {
    pub name: String,
    pub params: serde_yaml::Value,
}

impl StrategyConfig {
    pub fn builtin(name: &str) -> StrategyConfig {
        StrategyConfig {
            name: name.to_string(),
            params: serde_yaml::Value::Null,
        }
    }

    pub fn with_params<T: Serialize>(name: &str, params: &T) -> anyhow::Result<StrategyConfig> {
        Ok(StrategyConfig {
            name: name.to_string(),
            params: serde_yaml::to_value(params)?,
        })
    }
}

pub fn create_party(config: StrategyConfig) -> anyhow::Result<Arc<PartyAddr>> {
    let strategy = create_builtin(&config.name, config.params)?;
    Ok(Arc::new(PartyAddr::from(StrategyParty::new(strategy))))
}

pub fn create_builtin(
    name: &str,
    params: serde_yaml::Value,
) -> anyhow::Result<Box<dyn OfferStrategy>> {
    let strategy = match name {
        "AcceptAll" => Box::new(AcceptAll::new(params)?) as Box<dyn OfferStrategy>,
        "Concession" => Box::new(Concession::new(params)?) as Box<dyn OfferStrategy>,
        "Scripted" => Box::new(Scripted::new(params)?) as Box<dyn OfferStrategy>,
        _ => bail!("BuiltIn strategy {} doesn't exist.", name),
    };
    Ok(strategy)
}

#[cfg(test)]
mod tests {
    use super::*;
    use parley_builtin_strategies::concession;

    #[actix_rt::test]
    async fn test_strategy_config_roundtrip() {
        let concession_conf = StrategyConfig::with_params(
            "Concession",
            &concession::Config {
                concession_rate: 0.25,
                patience_rounds: Some(4),
            },
        )
        .unwrap();

        let serialized = serde_yaml::to_string(&concession_conf).unwrap();
        create_party(serde_yaml::from_str(&serialized).unwrap()).unwrap();
    }

    #[actix_rt::test]
    async fn test_unknown_builtin_rejected() {
        assert!(create_party(StrategyConfig::builtin("Haggler")).is_err());
    }
}
