use anyhow::anyhow;

use parley_negotiation_utils::OfferTerms;
use parley_strategy_component::{OfferStrategy, ProposalContext, StrategyAction};

/// Strategy that accepts whatever the counterpart last proposed. When it has
/// to open, it asks for its own desired extreme on every dimension.
pub struct AcceptAll;

impl AcceptAll {
    pub fn new(_config: serde_yaml::Value) -> anyhow::Result<AcceptAll> {
        Ok(AcceptAll)
    }
}

impl OfferStrategy for AcceptAll {
    fn propose(&mut self, context: &ProposalContext) -> anyhow::Result<StrategyAction> {
        if context.counterpart_last_offer().is_some() {
            return Ok(StrategyAction::Accept);
        }

        let mut values = vec![];
        for spec in &context.dimensions {
            let boundary = context
                .party
                .boundary(&spec.name)
                .ok_or_else(|| anyhow!("no boundary for dimension [{}]", spec.name))?;
            values.push((spec.name.clone(), boundary.desired_extreme()));
        }
        Ok(StrategyAction::Counter {
            terms: OfferTerms::new(values).message("Opening at preferred terms."),
        })
    }
}
