use derive_more::Display;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use parley_negotiation_utils::NegotiationId;

#[derive(Clone, Copy, Debug, Display, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventType {
    OfferCommitted,
    Terminated,
}

/// Immutable notification emitted after every committed offer and after the
/// terminal transition. The payload is a self-contained json rendering of
/// the offer or of the final status/agreement, so sinks can be replayed
/// without access to live state.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NegotiationEvent {
    pub negotiation_id: NegotiationId,
    pub event_type: EventType,
    pub payload: serde_json::Value,
}

/// Receiver of engine events. Emission is fire-and-forget: the engine never
/// waits on a sink and never fails because one stopped listening.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: NegotiationEvent);
}

impl EventSink for mpsc::UnboundedSender<NegotiationEvent> {
    fn emit(&self, event: NegotiationEvent) {
        // A dropped receiver is a sink that stopped caring.
        let _ = self.send(event);
    }
}
