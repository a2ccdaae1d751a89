use crate::shared::constants::{MIN_RANGE_SPAN, RANGE_CONTRACTION_RATE};

/// Self-calibrating `[min, max]` window for one raw signal.
///
/// Starts from seeded bounds. The first observation re-centers the window on
/// that value at a tenth of the seeded span; afterwards extremes widen the
/// window immediately and every observation pulls both bounds slowly toward
/// the value, so the window follows the user's actual range.
#[derive(Clone, Debug, PartialEq)]
pub struct RangeTracker {
    min: f64,
    max: f64,
    has_data: bool,
}

impl RangeTracker {
    pub fn new(min: f64, max: f64) -> Self {
        Self {
            min,
            max,
            has_data: false,
        }
    }

    pub fn update(&mut self, value: f64) {
        if !self.has_data {
            let span = self.max - self.min;
            self.min = value - span * 0.1;
            self.max = value + span * 0.1;
            self.has_data = true;
        }
        self.min = self.min.min(value);
        self.max = self.max.max(value);
        self.min += (value - self.min) * RANGE_CONTRACTION_RATE;
        self.max += (value - self.max) * RANGE_CONTRACTION_RATE;
    }

    /// Position of `value` in the window, clamped to `[0, 1]`.
    pub fn map(&self, value: f64, invert: bool) -> f64 {
        let span = self.max - self.min;
        if span < MIN_RANGE_SPAN {
            return 0.0;
        }
        let t = ((value - self.min) / span).clamp(0.0, 1.0);
        if invert {
            1.0 - t
        } else {
            t
        }
    }

    /// Next observation re-centers the window; the bounds themselves stay.
    pub fn forget(&mut self) {
        self.has_data = false;
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    pub fn has_data(&self) -> bool {
        self.has_data
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rstest::rstest;

    #[test]
    fn test_first_observation_narrows_to_tenth_of_seed_span() {
        let mut r = RangeTracker::new(0.05, 0.35);

        r.update(0.3);

        // +-0.03 around 0.3, then one contraction step toward 0.3.
        assert_relative_eq!(r.min(), 0.27 + 0.03 * 0.001, epsilon = 1e-12);
        assert_relative_eq!(r.max(), 0.33 - 0.03 * 0.001, epsilon = 1e-12);
        assert!(r.has_data());
    }

    #[test]
    fn test_extremes_expand_immediately() {
        let mut r = RangeTracker::new(0.0, 0.5);
        r.update(0.2);

        r.update(0.9);
        assert!(r.max() > 0.899);

        r.update(-0.4);
        assert!(r.min() < -0.399);
    }

    #[test]
    fn test_repeated_value_contracts_bounds() {
        let mut r = RangeTracker::new(0.0, 1.0);
        r.update(0.0);
        r.update(1.0);
        let (min0, max0) = (r.min(), r.max());

        for _ in 0..2000 {
            r.update(0.5);
        }

        assert!(r.min() > min0);
        assert!(r.max() < max0);
        assert!(r.min() < 0.5 && r.max() > 0.5);
    }

    #[rstest]
    #[case(0.0, false, 0.0)]
    #[case(0.25, false, 0.25)]
    #[case(1.0, false, 1.0)]
    #[case(2.0, false, 1.0)]
    #[case(-1.0, false, 0.0)]
    #[case(0.25, true, 0.75)]
    #[case(-1.0, true, 1.0)]
    fn test_map(#[case] value: f64, #[case] invert: bool, #[case] expected: f64) {
        let r = RangeTracker::new(0.0, 1.0);
        assert_relative_eq!(r.map(value, invert), expected);
    }

    #[test]
    fn test_collapsed_range_maps_to_zero() {
        let r = RangeTracker::new(0.4, 0.4005);
        assert_eq!(r.map(0.4, false), 0.0);
        assert_eq!(r.map(0.4, true), 0.0);
    }

    #[test]
    fn test_forget_keeps_bounds_and_recenters_next_time() {
        let mut r = RangeTracker::new(0.0, 1.0);
        r.update(0.5);
        r.update(0.9);
        let (min, max) = (r.min(), r.max());

        r.forget();

        assert!(!r.has_data());
        assert_eq!((r.min(), r.max()), (min, max));

        let span = max - min;
        r.update(0.1);
        assert_relative_eq!(
            r.min(),
            (0.1 - span * 0.1) + span * 0.1 * 0.001,
            epsilon = 1e-12
        );
    }
}
