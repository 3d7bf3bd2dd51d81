use serde::{Deserialize, Serialize};

use parley_negotiation_utils::{
    Agreement, DimensionSpec, NegotiationState, Offer, ValueKind,
};

fn default_tolerance() -> f64 {
    1e-6
}

/// Tolerance configuration for convergence agreement. Discrete dimensions
/// always compare exactly; continuous ones within `continuous_tolerance`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ConvergencePolicy {
    #[serde(default = "default_tolerance")]
    pub continuous_tolerance: f64,
}

impl Default for ConvergencePolicy {
    fn default() -> ConvergencePolicy {
        ConvergencePolicy {
            continuous_tolerance: default_tolerance(),
        }
    }
}

impl ConvergencePolicy {
    fn within_tolerance(&self, spec: &DimensionSpec, a: f64, b: f64) -> bool {
        match spec.kind {
            ValueKind::Discrete => a == b,
            ValueKind::Continuous => (a - b).abs() <= self.continuous_tolerance,
        }
    }
}

/// Advisory verdict after a committed offer. Only the state manager turns
/// this into a committed status.
#[derive(Clone, Debug)]
pub enum DetectionResult {
    Continue,
    Agreement(Agreement),
    RoundsExhausted,
}

/// Inspects the growing offer history for terminal conditions.
///
/// Checked in order: round exhaustion, explicit acceptance, numeric
/// convergence. Acceptance adopts the accepted values verbatim, even when
/// they fall outside the accepting party's own boundary; the override is
/// intentional and surfaces in the agreement's `satisfied_parties`
/// classification instead. Walk-aways terminate in the turn manager and
/// never produce an offer to inspect here.
pub struct AgreementDetector {
    policy: ConvergencePolicy,
}

impl AgreementDetector {
    pub fn new(policy: ConvergencePolicy) -> AgreementDetector {
        AgreementDetector { policy }
    }

    pub fn evaluate(&self, state: &NegotiationState) -> DetectionResult {
        if state.current_round > state.max_rounds {
            return DetectionResult::RoundsExhausted;
        }

        let latest = match state.history.last() {
            Some(offer) => offer,
            None => return DetectionResult::Continue,
        };

        if latest.is_acceptance() {
            return DetectionResult::Agreement(self.agreement_from(state, latest));
        }

        let (first, second) = match state.latest_offer_pair() {
            Some(pair) => pair,
            None => return DetectionResult::Continue,
        };
        if self.converged(state, first, second) {
            return DetectionResult::Agreement(self.agreement_from(state, latest));
        }

        if self.is_stalled_repeat(state, latest) {
            log::debug!(
                "Negotiation [{}]: [{}] repeated its previous position at turn {}",
                state.id,
                latest.party,
                latest.turn_index
            );
        }
        DetectionResult::Continue
    }

    /// A party re-submitting its previous values verbatim is not terminal,
    /// but worth surfacing: it usually precedes an impasse.
    fn is_stalled_repeat(&self, state: &NegotiationState, latest: &Offer) -> bool {
        state
            .offers_of(&latest.party)
            .rev()
            .nth(1)
            .map(|previous| previous.values == latest.values)
            .unwrap_or(false)
    }

    /// Convergence agreement is all-dimensions-or-none: every dimension must
    /// be within tolerance between the parties' latest offers AND inside
    /// each party's own boundary independently.
    fn converged(&self, state: &NegotiationState, first: &Offer, second: &Offer) -> bool {
        state.dimensions.iter().all(|spec| {
            let (a, b) = match (first.value(&spec.name), second.value(&spec.name)) {
                (Some(a), Some(b)) => (a, b),
                _ => return false,
            };
            if !self.policy.within_tolerance(spec, a, b) {
                return false;
            }
            let own_compliant = |offer_value: f64, party_index: usize| {
                state.parties[party_index]
                    .boundary(&spec.name)
                    .map(|boundary| boundary.contains(offer_value))
                    .unwrap_or(false)
            };
            own_compliant(a, 0) && own_compliant(b, 1)
        })
    }

    /// Adopts the triggering offer's values as the agreed terms.
    fn agreement_from(&self, state: &NegotiationState, latest: &Offer) -> Agreement {
        Agreement {
            values: latest.values.clone(),
            reached_at_round: latest.round,
            reached_at_turn: latest.turn_index,
            satisfied_parties: Agreement::classify(&latest.values, &state.parties),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parley_negotiation_utils::{
        DimensionName, NegotiationConfig, OfferKind, OfferTerms, PartyConfig,
        PreferenceDirection, SatisfiedParties, ValueKind, ZopaBoundary,
    };

    fn dimensions() -> Vec<DimensionSpec> {
        vec![
            DimensionSpec::new("price", "$/unit", ValueKind::Continuous),
            DimensionSpec::new("volume", "units", ValueKind::Discrete),
        ]
    }

    fn state() -> NegotiationState {
        let buyer = PartyConfig::new(
            "buyer",
            "Buyer",
            vec![
                ZopaBoundary::new("price", 10.0, 15.0, PreferenceDirection::LowerBetter)
                    .unwrap(),
                ZopaBoundary::new("volume", 1000.0, 5000.0, PreferenceDirection::HigherBetter)
                    .unwrap(),
            ],
        );
        let seller = PartyConfig::new(
            "seller",
            "Seller",
            vec![
                ZopaBoundary::new("price", 12.0, 20.0, PreferenceDirection::HigherBetter)
                    .unwrap(),
                ZopaBoundary::new("volume", 2000.0, 8000.0, PreferenceDirection::LowerBetter)
                    .unwrap(),
            ],
        );
        NegotiationState::initialize(NegotiationConfig::new(
            dimensions(),
            [buyer, seller],
            5,
        ))
    }

    fn push_offer(state: &mut NegotiationState, party: &str, kind: OfferKind, price: f64, volume: f64) {
        let turn_index = state.turn_count() + 1;
        let round = state.round_of_next_turn();
        let offer = Offer::from_terms(
            party.into(),
            round,
            turn_index,
            kind,
            OfferTerms::new(vec![
                (DimensionName::from("price"), price),
                (DimensionName::from("volume"), volume),
            ]),
            &dimensions(),
        )
        .unwrap();
        state.current_round = round;
        state.history.push(offer);
    }

    #[test]
    fn test_no_agreement_with_single_offer() {
        let mut state = state();
        push_offer(&mut state, "buyer", OfferKind::Counter, 13.0, 3000.0);
        let detector = AgreementDetector::new(ConvergencePolicy::default());
        assert!(matches!(detector.evaluate(&state), DetectionResult::Continue));
    }

    #[test]
    fn test_convergence_on_all_dimensions() {
        let mut state = state();
        push_offer(&mut state, "buyer", OfferKind::Counter, 13.5, 3000.0);
        push_offer(&mut state, "seller", OfferKind::Counter, 13.5, 3000.0);

        let detector = AgreementDetector::new(ConvergencePolicy::default());
        match detector.evaluate(&state) {
            DetectionResult::Agreement(agreement) => {
                assert_eq!(agreement.values[&DimensionName::from("price")], 13.5);
                assert_eq!(agreement.reached_at_turn, 2);
                assert_eq!(agreement.reached_at_round, 1);
                assert_eq!(agreement.satisfied_parties, SatisfiedParties::Both);
            }
            other => panic!("expected agreement, got {:?}", other),
        }
    }

    #[test]
    fn test_agreement_is_all_or_nothing() {
        let mut state = state();
        // Same price, volumes differ beyond any tolerance.
        push_offer(&mut state, "buyer", OfferKind::Counter, 13.5, 3000.0);
        push_offer(&mut state, "seller", OfferKind::Counter, 13.5, 4000.0);

        let detector = AgreementDetector::new(ConvergencePolicy::default());
        assert!(matches!(detector.evaluate(&state), DetectionResult::Continue));
    }

    #[test]
    fn test_no_convergence_outside_own_boundary() {
        let mut state = state();
        // Both at 9.0: identical, but outside both parties' price ranges.
        push_offer(&mut state, "buyer", OfferKind::Counter, 9.0, 3000.0);
        push_offer(&mut state, "seller", OfferKind::Counter, 9.0, 3000.0);

        let detector = AgreementDetector::new(ConvergencePolicy::default());
        assert!(matches!(detector.evaluate(&state), DetectionResult::Continue));
    }

    #[test]
    fn test_acceptance_overrides_own_boundary() {
        let mut state = state();
        // Seller accepts a price below its own minimum; the override is
        // intentional and classifies as one-sided satisfaction.
        push_offer(&mut state, "buyer", OfferKind::Counter, 11.0, 3000.0);
        push_offer(&mut state, "seller", OfferKind::Acceptance, 11.0, 3000.0);

        let detector = AgreementDetector::new(ConvergencePolicy::default());
        match detector.evaluate(&state) {
            DetectionResult::Agreement(agreement) => {
                assert_eq!(agreement.values[&DimensionName::from("price")], 11.0);
                assert_eq!(agreement.satisfied_parties, SatisfiedParties::One);
            }
            other => panic!("expected agreement, got {:?}", other),
        }
    }

    #[test]
    fn test_rounds_exhaustion_reported() {
        let mut state = state();
        state.current_round = state.max_rounds + 1;
        let detector = AgreementDetector::new(ConvergencePolicy::default());
        assert!(matches!(
            detector.evaluate(&state),
            DetectionResult::RoundsExhausted
        ));
    }
}
