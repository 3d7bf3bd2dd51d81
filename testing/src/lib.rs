mod framework;
mod record;

pub use framework::{boundary, dimension, party, Framework};
pub use record::{NegotiationRecord, NegotiationRecordSync};
