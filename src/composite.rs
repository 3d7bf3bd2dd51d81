use actix::{Actor, Context, Handler};

use parley_strategy_component::{OfferStrategy, StrategyAction};

use crate::parties::{Party, ProposeOffer};

/// Adapts any boxed `OfferStrategy` to the actor-based `Party` interface.
pub struct StrategyParty {
    strategy: Box<dyn OfferStrategy>,
}

impl StrategyParty {
    pub fn new(strategy: Box<dyn OfferStrategy>) -> StrategyParty {
        StrategyParty { strategy }
    }
}

impl Handler<ProposeOffer> for StrategyParty {
    type Result = anyhow::Result<StrategyAction>;

    fn handle(&mut self, msg: ProposeOffer, _: &mut Context<Self>) -> Self::Result {
        self.strategy.propose(&msg.context)
    }
}

impl Party for StrategyParty {}
impl Actor for StrategyParty {
    type Context = Context<Self>;
}
