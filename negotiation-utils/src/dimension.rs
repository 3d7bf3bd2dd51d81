use derive_more::Display;
use serde::{Deserialize, Serialize};

/// Key identifying one negotiation dimension (e.g. "price", "volume").
#[derive(
    Clone, Debug, Display, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct DimensionName(pub String);

impl From<&str> for DimensionName {
    fn from(name: &str) -> DimensionName {
        DimensionName(name.to_string())
    }
}

impl From<String> for DimensionName {
    fn from(name: String) -> DimensionName {
        DimensionName(name)
    }
}

impl DimensionName {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Which end of an acceptable range is the desired outcome. Party-relative:
/// price is `LowerBetter` for a buyer and `HigherBetter` for a seller of the
/// same good, so the direction travels with each party's boundary.
#[derive(Clone, Copy, Debug, Display, PartialEq, Eq, Serialize, Deserialize)]
pub enum PreferenceDirection {
    HigherBetter,
    LowerBetter,
}

/// Value domain of a dimension. Discrete dimensions (units, days) converge
/// only on exact equality; continuous ones within a numeric tolerance.
#[derive(Clone, Copy, Debug, Display, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValueKind {
    Discrete,
    Continuous,
}

/// Static description of a single negotiated dimension.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DimensionSpec {
    pub name: DimensionName,
    /// Unit of measurement, for display only (e.g. "$/unit", "days").
    pub unit: String,
    pub kind: ValueKind,
}

impl DimensionSpec {
    pub fn new(
        name: impl Into<DimensionName>,
        unit: impl Into<String>,
        kind: ValueKind,
    ) -> DimensionSpec {
        DimensionSpec {
            name: name.into(),
            unit: unit.into(),
            kind,
        }
    }
}
