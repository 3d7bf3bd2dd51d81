use serde::{Deserialize, Serialize};

use crate::dimension::{DimensionName, PreferenceDirection};
use crate::error::EngineError;

/// One party's acceptable range on a single dimension, together with which
/// end of it the party actually wants.
///
/// Bounds are inclusive; `min_acceptable == max_desired` is a legal point
/// range. Boundaries are fixed once a negotiation starts.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ZopaBoundary {
    pub dimension: DimensionName,
    pub min_acceptable: f64,
    pub max_desired: f64,
    pub direction: PreferenceDirection,
}

impl ZopaBoundary {
    pub fn new(
        dimension: impl Into<DimensionName>,
        min_acceptable: f64,
        max_desired: f64,
        direction: PreferenceDirection,
    ) -> Result<ZopaBoundary, EngineError> {
        let dimension = dimension.into();
        if !min_acceptable.is_finite() || !max_desired.is_finite() {
            return Err(EngineError::Configuration(format!(
                "non-finite boundary on dimension [{}]",
                dimension
            )));
        }
        if min_acceptable > max_desired {
            return Err(EngineError::Configuration(format!(
                "inverted boundary on dimension [{}]: {} > {}",
                dimension, min_acceptable, max_desired
            )));
        }
        Ok(ZopaBoundary {
            dimension,
            min_acceptable,
            max_desired,
            direction,
        })
    }

    pub fn range_size(&self) -> f64 {
        self.max_desired - self.min_acceptable
    }

    pub fn midpoint(&self) -> f64 {
        (self.min_acceptable + self.max_desired) / 2.0
    }

    /// Inclusive containment check.
    pub fn contains(&self, value: f64) -> bool {
        value >= self.min_acceptable && value <= self.max_desired
    }

    /// The bound this party would ideally settle at.
    pub fn desired_extreme(&self) -> f64 {
        match self.direction {
            PreferenceDirection::HigherBetter => self.max_desired,
            PreferenceDirection::LowerBetter => self.min_acceptable,
        }
    }

    /// The bound at which this party is indifferent between dealing and not.
    pub fn walk_away(&self) -> f64 {
        match self.direction {
            PreferenceDirection::HigherBetter => self.min_acceptable,
            PreferenceDirection::LowerBetter => self.max_desired,
        }
    }

    /// Absolute distance to the closest bound. For values inside the range
    /// this is the remaining slack; for values outside, how far the nearest
    /// bound was overshot.
    pub fn distance_from_nearest_bound(&self, value: f64) -> f64 {
        let to_min = (value - self.min_acceptable).abs();
        let to_max = (value - self.max_desired).abs();
        to_min.min(to_max)
    }

    /// Relative position inside the range, `0.0` at `min_acceptable` and
    /// `1.0` at `max_desired`. `None` for out-of-range values; point ranges
    /// report `1.0`.
    pub fn position_in_range(&self, value: f64) -> Option<f64> {
        if !self.contains(value) {
            return None;
        }
        if self.range_size() == 0.0 {
            return Some(1.0);
        }
        Some((value - self.min_acceptable) / self.range_size())
    }

    /// Linear satisfaction score in `[0, 1]`: `1.0` at the desired extreme,
    /// `0.0` at the walk-away bound and outside the range.
    pub fn satisfaction(&self, value: f64) -> f64 {
        match self.position_in_range(value) {
            None => 0.0,
            Some(_) if self.range_size() == 0.0 => 1.0,
            Some(position) => match self.direction {
                PreferenceDirection::HigherBetter => position,
                PreferenceDirection::LowerBetter => 1.0 - position,
            },
        }
    }
}

/// Derived overlap of two parties' acceptable ranges on one dimension.
/// Never stored in negotiation state.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ZopaOverlap {
    pub dimension: DimensionName,
    pub low: f64,
    pub high: f64,
}

impl ZopaOverlap {
    /// `[max(a.min, b.min), min(a.max, b.max)]` if non-empty.
    pub fn between(a: &ZopaBoundary, b: &ZopaBoundary) -> Option<ZopaOverlap> {
        let low = a.min_acceptable.max(b.min_acceptable);
        let high = a.max_desired.min(b.max_desired);
        if low > high {
            return None;
        }
        Some(ZopaOverlap {
            dimension: a.dimension.clone(),
            low,
            high,
        })
    }

    pub fn size(&self) -> f64 {
        self.high - self.low
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.low && value <= self.high
    }

    /// Overlap size as a fraction of the combined span of both ranges.
    /// Identical point ranges count as full coverage.
    pub fn coverage(&self, a: &ZopaBoundary, b: &ZopaBoundary) -> f64 {
        let span_low = a.min_acceptable.min(b.min_acceptable);
        let span_high = a.max_desired.max(b.max_desired);
        let span = span_high - span_low;
        if span == 0.0 {
            return 1.0;
        }
        self.size() / span
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn boundary(min: f64, max: f64) -> ZopaBoundary {
        ZopaBoundary::new("price", min, max, PreferenceDirection::HigherBetter).unwrap()
    }

    #[test_case(10.0, true; "exactly at min is compliant")]
    #[test_case(15.0, true; "exactly at max is compliant")]
    #[test_case(12.5, true; "interior value")]
    #[test_case(9.999, false; "below min")]
    #[test_case(15.001, false; "above max")]
    fn test_boundary_inclusive(value: f64, expected: bool) {
        assert_eq!(boundary(10.0, 15.0).contains(value), expected);
    }

    #[test]
    fn test_inverted_boundary_rejected() {
        assert!(
            ZopaBoundary::new("price", 20.0, 10.0, PreferenceDirection::HigherBetter).is_err()
        );
        assert!(
            ZopaBoundary::new("price", 10.0, 10.0, PreferenceDirection::HigherBetter).is_ok()
        );
    }

    #[test]
    fn test_overlap_range() {
        let overlap =
            ZopaOverlap::between(&boundary(1000.0, 5000.0), &boundary(2000.0, 8000.0)).unwrap();
        assert_eq!(overlap.low, 2000.0);
        assert_eq!(overlap.high, 5000.0);
        assert_eq!(overlap.size(), 3000.0);
    }

    #[test]
    fn test_no_overlap() {
        assert_eq!(
            ZopaOverlap::between(&boundary(10.0, 15.0), &boundary(20.0, 25.0)),
            None
        );
    }

    #[test]
    fn test_touching_ranges_overlap_in_a_point() {
        let overlap =
            ZopaOverlap::between(&boundary(10.0, 15.0), &boundary(15.0, 25.0)).unwrap();
        assert_eq!((overlap.low, overlap.high), (15.0, 15.0));
        assert_eq!(overlap.size(), 0.0);
    }

    #[test]
    fn test_overlap_coverage() {
        let a = boundary(1000.0, 5000.0);
        let b = boundary(2000.0, 8000.0);
        let overlap = ZopaOverlap::between(&a, &b).unwrap();
        assert!((overlap.coverage(&a, &b) - 3000.0 / 7000.0).abs() < 1e-9);
    }

    #[test]
    fn test_satisfaction_by_direction() {
        let seller = boundary(10.0, 20.0);
        assert_eq!(seller.satisfaction(20.0), 1.0);
        assert_eq!(seller.satisfaction(10.0), 0.0);
        assert_eq!(seller.satisfaction(25.0), 0.0);

        let buyer =
            ZopaBoundary::new("price", 10.0, 20.0, PreferenceDirection::LowerBetter).unwrap();
        assert_eq!(buyer.satisfaction(10.0), 1.0);
        assert_eq!(buyer.satisfaction(20.0), 0.0);
        assert_eq!(buyer.desired_extreme(), 10.0);
        assert_eq!(buyer.walk_away(), 20.0);
    }
}
