//! Exponential smoothing of raw probe readings.
//!
//! Each sampling period folds one raw half-degree count into the
//! running ×10 value:
//!
//! ```text
//! value = value * 4 / 5 + raw
//! ```
//!
//! The raw count is ×2 Celsius while the accumulator is ×10, so the
//! new sample arrives pre-scaled to exactly 1/5 of the accumulator's
//! units — the 4/5-retain term and the implicit 1/5 weight sum to a
//! stable weighted average with no separate divisor.
//!
//! The arithmetic is integer with truncating division; truncation
//! leaves a small band of fixed points up to four tenths below
//! `raw * 5` when approaching from below, which the tests pin down.

use crate::units::Deci;

/// One smoothing channel (the instrument runs one per probe).
#[derive(Debug, Clone, Copy)]
pub struct SmoothingFilter {
    value: i32,
    floor: Deci,
}

impl SmoothingFilter {
    /// Create a filter resting at its floor.
    pub fn new(floor: Deci) -> Self {
        Self {
            value: floor.raw(),
            floor,
        }
    }

    /// Seed from one unfiltered raw reading (used at startup so the
    /// gauge does not sweep up from the floor on power-on).
    pub fn seed(&mut self, raw: i32) {
        self.value = Deci::from_raw(raw).max_floor(self.floor).raw();
    }

    /// Fold in one raw sample and return the new filtered value.
    ///
    /// The stored value is pegged at the floor, so a run of zero or
    /// negative raw samples can never drag the gauge below it.
    pub fn update(&mut self, raw: i32) -> Deci {
        let folded = (self.value * 4) / 5 + raw;
        self.value = Deci::new(folded).max_floor(self.floor).raw();
        Deci::new(self.value)
    }

    /// Current filtered value.
    pub fn value(&self) -> Deci {
        Deci::new(self.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seed_promotes_raw_to_tenths() {
        let mut f = SmoothingFilter::new(Deci::new(100));
        f.seed(75); // 37.5 C
        assert_eq!(f.value(), Deci::new(375));
    }

    #[test]
    fn seed_respects_floor() {
        let mut f = SmoothingFilter::new(Deci::new(200));
        f.seed(3); // 1.5 C — below the gauge floor
        assert_eq!(f.value(), Deci::new(200));
    }

    #[test]
    fn converges_monotonically_from_floor() {
        // Plate channel: floor 100, raw fixed at 100 counts (50.0 C).
        // Steady state is raw * 5 = 500; approach must be monotone.
        let mut f = SmoothingFilter::new(Deci::new(100));
        let mut prev = f.value();
        for _ in 0..5 {
            let v = f.update(100);
            assert!(v >= prev, "filter must approach the input monotonically");
            assert!(v >= Deci::new(100));
            assert!(v <= Deci::new(500));
            prev = v;
        }
        // Truncating division settles a few tenths shy of raw * 5 when
        // approaching from below (any value with ceil(v / 5) == raw is
        // a fixed point).
        for _ in 0..40 {
            f.update(100);
        }
        assert_eq!(f.value(), Deci::new(496));
    }

    #[test]
    fn seeded_at_steady_state_holds_exactly() {
        let mut f = SmoothingFilter::new(Deci::new(100));
        f.seed(100); // value = raw * 5 exactly
        for _ in 0..20 {
            assert_eq!(f.update(100), Deci::new(500));
        }
    }

    #[test]
    fn solution_channel_scenario_converges() {
        // Solution channel: floor 200, raw fixed at 200 counts (100.0 C
        // equivalent input, steady state 1000).
        let mut f = SmoothingFilter::new(Deci::new(200));
        let mut prev = f.value();
        for _ in 0..5 {
            let v = f.update(200);
            assert!(v >= prev);
            assert!(v >= Deci::new(200));
            prev = v;
        }
    }

    #[test]
    fn never_reports_below_floor() {
        let mut f = SmoothingFilter::new(Deci::new(200));
        f.seed(80); // 40.0 C
        for raw in [0, -5, -100, 0, 1] {
            let v = f.update(raw);
            assert!(v >= Deci::new(200), "raw {raw} dragged gauge below floor");
        }
    }
}
