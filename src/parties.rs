use actix::prelude::*;
use anyhow::Result;

use parley_strategy_component::{ProposalContext, StrategyAction};

// =========================================== //
// Party interface
// =========================================== //

/// Request for the active party's next move. Exactly one of these is
/// outstanding per negotiation at any time; the engine awaits the answer
/// before evaluating termination or advancing the turn.
#[derive(Message)]
#[rtype(result = "Result<StrategyAction>")]
pub struct ProposeOffer {
    pub context: ProposalContext,
}

/// Actor implementing one side of a negotiation.
///
/// The engine drives parties only through this interface and stays agnostic
/// about what produces the numbers: built-in strategies, a remote service or
/// an interactive client are interchangeable behind the same mailbox.
pub trait Party: Actor + Handler<ProposeOffer, Result = <ProposeOffer as Message>::Result> {}

/// Address of a `Party`, as handed to the engine.
#[derive(Clone)]
pub struct PartyAddr {
    pub on_propose: Recipient<ProposeOffer>,
}

impl PartyAddr {
    pub async fn propose(&self, context: ProposalContext) -> Result<StrategyAction> {
        self.on_propose.send(ProposeOffer { context }).await?
    }

    pub fn from<T: Party + Actor<Context = Context<T>>>(party: T) -> PartyAddr {
        let addr = party.start();
        PartyAddr {
            on_propose: addr.recipient(),
        }
    }
}
