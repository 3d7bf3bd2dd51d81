use std::collections::BTreeMap;

use derive_more::Display;
use serde::{Deserialize, Serialize};

use crate::dimension::DimensionName;
use crate::zopa::ZopaBoundary;

/// Identifier of one negotiating party, unique within a negotiation.
#[derive(
    Clone, Debug, Display, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct PartyId(pub String);

impl From<&str> for PartyId {
    fn from(id: &str) -> PartyId {
        PartyId(id.to_string())
    }
}

impl From<String> for PartyId {
    fn from(id: String) -> PartyId {
        PartyId(id)
    }
}

/// Static configuration of one party: identity plus its private acceptable
/// range on every configured dimension.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PartyConfig {
    pub id: PartyId,
    pub name: String,
    pub boundaries: BTreeMap<DimensionName, ZopaBoundary>,
}

impl PartyConfig {
    pub fn new(
        id: impl Into<PartyId>,
        name: impl Into<String>,
        boundaries: impl IntoIterator<Item = ZopaBoundary>,
    ) -> PartyConfig {
        PartyConfig {
            id: id.into(),
            name: name.into(),
            boundaries: boundaries
                .into_iter()
                .map(|b| (b.dimension.clone(), b))
                .collect(),
        }
    }

    pub fn boundary(&self, dimension: &DimensionName) -> Option<&ZopaBoundary> {
        self.boundaries.get(dimension)
    }
}
