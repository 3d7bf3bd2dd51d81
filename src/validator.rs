use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use parley_negotiation_utils::{
    DimensionName, EngineError, Offer, PartyId, ZopaBoundary,
};

/// Verdict for one dimension of one offer against one party's boundary.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DimensionVerdict {
    pub value: f64,
    /// Inclusive: a value exactly on a bound is compliant.
    pub within_range: bool,
    /// Slack to the nearest bound when inside the range, overshoot past it
    /// when outside.
    pub distance_from_nearest_bound: f64,
    /// Relative position inside the range; `None` for violations.
    pub position_in_range: Option<f64>,
}

/// Result of checking a whole offer against one party's boundary set.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ComplianceReport {
    pub party: PartyId,
    pub turn_index: u32,
    pub dimensions: BTreeMap<DimensionName, DimensionVerdict>,
    /// Fraction of dimensions within range, in `[0, 1]`.
    pub compliance_score: f64,
}

impl ComplianceReport {
    pub fn fully_compliant(&self) -> bool {
        self.dimensions.values().all(|verdict| verdict.within_range)
    }

    pub fn violations(&self) -> impl Iterator<Item = &DimensionName> {
        self.dimensions
            .iter()
            .filter(|(_, verdict)| !verdict.within_range)
            .map(|(name, _)| name)
    }
}

/// Pure offer-against-boundary classification.
///
/// Which boundary set is passed decides the question being answered: a
/// party's own boundaries check self-consistency of its offer; the receiving
/// party's boundaries check whether an incoming offer would be acceptable to
/// them. The validator itself is oblivious to the distinction.
pub struct ZopaValidator;

impl ZopaValidator {
    /// Classifies every dimension of `offer` against `boundaries`.
    ///
    /// A structural mismatch between the offer's dimension set and the
    /// boundary set is an error distinct from any range violation; range
    /// violations are reported, never raised.
    pub fn validate(
        offer: &Offer,
        boundaries: &BTreeMap<DimensionName, ZopaBoundary>,
    ) -> Result<ComplianceReport, EngineError> {
        let mut dimensions = BTreeMap::new();

        for (name, boundary) in boundaries {
            let value = offer.value(name).ok_or_else(|| EngineError::StructuralOffer {
                party: offer.party.clone(),
                reason: format!("missing value for dimension [{}]", name),
            })?;
            dimensions.insert(name.clone(), Self::verdict(value, boundary));
        }
        if let Some(unknown) = offer.values.keys().find(|name| !boundaries.contains_key(*name)) {
            return Err(EngineError::StructuralOffer {
                party: offer.party.clone(),
                reason: format!("value for unconfigured dimension [{}]", unknown),
            });
        }

        let within = dimensions.values().filter(|v| v.within_range).count();
        let compliance_score = within as f64 / dimensions.len() as f64;

        Ok(ComplianceReport {
            party: offer.party.clone(),
            turn_index: offer.turn_index,
            dimensions,
            compliance_score,
        })
    }

    fn verdict(value: f64, boundary: &ZopaBoundary) -> DimensionVerdict {
        DimensionVerdict {
            value,
            within_range: boundary.contains(value),
            distance_from_nearest_bound: boundary.distance_from_nearest_bound(value),
            position_in_range: boundary.position_in_range(value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parley_negotiation_utils::{
        DimensionSpec, OfferKind, OfferTerms, PreferenceDirection, ValueKind,
    };

    fn dimensions() -> Vec<DimensionSpec> {
        vec![
            DimensionSpec::new("price", "$/unit", ValueKind::Continuous),
            DimensionSpec::new("volume", "units", ValueKind::Discrete),
        ]
    }

    fn boundaries(price: (f64, f64), volume: (f64, f64)) -> BTreeMap<DimensionName, ZopaBoundary> {
        vec![
            ZopaBoundary::new("price", price.0, price.1, PreferenceDirection::LowerBetter)
                .unwrap(),
            ZopaBoundary::new("volume", volume.0, volume.1, PreferenceDirection::HigherBetter)
                .unwrap(),
        ]
        .into_iter()
        .map(|b| (b.dimension.clone(), b))
        .collect()
    }

    fn offer(price: f64, volume: f64) -> Offer {
        Offer::from_terms(
            "buyer".into(),
            1,
            1,
            OfferKind::Counter,
            OfferTerms::new(vec![
                (DimensionName::from("price"), price),
                (DimensionName::from("volume"), volume),
            ]),
            &dimensions(),
        )
        .unwrap()
    }

    #[test]
    fn test_boundary_values_are_compliant() {
        let report =
            ZopaValidator::validate(&offer(10.0, 5000.0), &boundaries((10.0, 15.0), (1000.0, 5000.0)))
                .unwrap();
        assert!(report.fully_compliant());
        assert_eq!(report.compliance_score, 1.0);
    }

    #[test]
    fn test_partial_violation_scores_fractionally() {
        let report =
            ZopaValidator::validate(&offer(9.0, 3000.0), &boundaries((10.0, 15.0), (1000.0, 5000.0)))
                .unwrap();
        assert!(!report.fully_compliant());
        assert_eq!(report.compliance_score, 0.5);

        let verdict = &report.dimensions[&DimensionName::from("price")];
        assert!(!verdict.within_range);
        assert_eq!(verdict.distance_from_nearest_bound, 1.0);
        assert_eq!(verdict.position_in_range, None);
    }

    #[test]
    fn test_boundary_set_mismatch_is_structural() {
        let narrow: BTreeMap<_, _> = boundaries((10.0, 15.0), (0.0, 1.0))
            .into_iter()
            .filter(|(name, _)| name.as_str() == "price")
            .collect();
        let result = ZopaValidator::validate(&offer(12.0, 100.0), &narrow);
        assert!(matches!(result, Err(EngineError::StructuralOffer { .. })));
    }
}
