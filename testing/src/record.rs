use std::fmt;
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};

use parley::{EventSink, EventType, NegotiationEvent};
use parley_negotiation_utils::{Agreement, NegotiationStatus, Offer};

/// Everything a negotiation emitted, in order. Rebuilt purely from the event
/// stream, so it doubles as a check that emitted payloads are self-contained.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct NegotiationRecord {
    pub events: Vec<NegotiationEvent>,
    pub offers: Vec<Offer>,
    pub terminal_status: Option<NegotiationStatus>,
    pub agreement: Option<Agreement>,
}

impl NegotiationRecord {
    pub fn is_finished(&self) -> bool {
        self.terminal_status.is_some()
    }
}

/// Shared, thread-safe record handed to the engine as an event sink.
#[derive(Clone, Debug, Default)]
pub struct NegotiationRecordSync(pub Arc<Mutex<NegotiationRecord>>);

impl NegotiationRecordSync {
    pub fn new() -> NegotiationRecordSync {
        NegotiationRecordSync::default()
    }

    pub fn snapshot(&self) -> NegotiationRecord {
        self.0.lock().unwrap().clone()
    }
}

impl EventSink for NegotiationRecordSync {
    fn emit(&self, event: NegotiationEvent) {
        let mut record = self.0.lock().unwrap();

        match event.event_type {
            EventType::OfferCommitted => {
                if let Ok(offer) = serde_json::from_value::<Offer>(event.payload.clone()) {
                    record.offers.push(offer);
                }
            }
            EventType::Terminated => {
                record.terminal_status = event
                    .payload
                    .get("status")
                    .and_then(|status| serde_json::from_value(status.clone()).ok());
                record.agreement = event
                    .payload
                    .get("agreement")
                    .and_then(|agreement| serde_json::from_value(agreement.clone()).ok());
            }
        }
        record.events.push(event);
    }
}

impl fmt::Display for NegotiationRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", serde_json::to_string_pretty(&self).unwrap())
    }
}
