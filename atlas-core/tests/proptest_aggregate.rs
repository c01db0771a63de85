//! Property-based tests for the emotion aggregator.
//!
//! Uses `proptest` to verify aggregation invariants under random inputs:
//! merged profiles stay in bounds no matter what arrives, influence decays
//! monotonically with visit count, and dominant selection is consistent
//! with the vector it was computed from.

use proptest::prelude::*;

use atlas_core::aggregate::{self, BASE_RATE, MIN_RATE};
use atlas_core::types::{Emotion, EmotionVector};

// ---------------------------------------------------------------------------
// Strategy helpers
// ---------------------------------------------------------------------------

/// A well-formed vector with every dimension in [0, 1].
fn arb_vector() -> impl Strategy<Value = EmotionVector> {
    (
        0.0..=1.0f32,
        0.0..=1.0f32,
        0.0..=1.0f32,
        0.0..=1.0f32,
        0.0..=1.0f32,
    )
        .prop_map(|(w, l, t, n, b)| EmotionVector::new(w, l, t, n, b))
}

/// A hostile vector: any finite magnitude, far outside [0, 1].
fn arb_wild_vector() -> impl Strategy<Value = EmotionVector> {
    (
        -1e6..=1e6f32,
        -1e6..=1e6f32,
        -1e6..=1e6f32,
        -1e6..=1e6f32,
        -1e6..=1e6f32,
    )
        .prop_map(|(w, l, t, n, b)| EmotionVector {
            warmth: w,
            loneliness: l,
            tension: t,
            nostalgia: n,
            belonging: b,
        })
}

// ---------------------------------------------------------------------------
// Property: merge output is always in [0, 1]
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn merge_output_always_in_bounds(
        existing in arb_wild_vector(),
        incoming in arb_wild_vector(),
        visits in 0..100_000u32,
    ) {
        let merged = aggregate::merge(&existing, &incoming, visits);
        for dim in Emotion::ALL {
            let v = merged.get(dim);
            prop_assert!((0.0..=1.0).contains(&v), "{dim} out of bounds: {v}");
            prop_assert!(!v.is_nan());
        }
    }
}

// ---------------------------------------------------------------------------
// Property: influence of one interaction shrinks as visit count grows
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn merge_influence_non_increasing_in_visits(
        existing in arb_vector(),
        incoming in arb_vector(),
        visits in 0..10_000u32,
        step in 1..1_000u32,
    ) {
        let delta = |n: u32| {
            let merged = aggregate::merge(&existing, &incoming, n);
            Emotion::ALL
                .iter()
                .map(|&d| (merged.get(d) - existing.get(d).clamp(0.0, 1.0)).abs())
                .fold(0.0f32, f32::max)
        };

        // Three-decimal rounding can wobble a comparison by ±0.001.
        prop_assert!(delta(visits + step) <= delta(visits) + 0.0011);
    }
}

// ---------------------------------------------------------------------------
// Property: the adaptive rate stays inside its documented band
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn adaptive_rate_stays_in_band(visits in 0..u32::MAX) {
        let rate = aggregate::adaptive_rate(visits);
        prop_assert!(rate >= MIN_RATE);
        prop_assert!(rate <= BASE_RATE);
    }
}

// ---------------------------------------------------------------------------
// Property: dominant names a dimension carrying the maximum value
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn dominant_carries_the_maximum(vector in arb_vector()) {
        let winner = aggregate::dominant(&vector);
        let max = Emotion::ALL
            .iter()
            .map(|&d| vector.get(d))
            .fold(f32::MIN, f32::max);
        prop_assert!((vector.get(winner) - max).abs() < f32::EPSILON);
    }

    #[test]
    fn dominant_is_deterministic(vector in arb_vector()) {
        prop_assert_eq!(aggregate::dominant(&vector), aggregate::dominant(&vector));
    }
}

// ---------------------------------------------------------------------------
// Property: repeated merging converges toward a constant incoming vector
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn repeated_merge_converges(start in arb_vector(), target in arb_vector()) {
        let mut profile = start;
        for visits in 0..400u32 {
            profile = aggregate::merge(&profile, &target, visits);
        }
        for dim in Emotion::ALL {
            // Rounding to 3 decimals leaves at most a few millis of gap.
            prop_assert!(
                (profile.get(dim) - target.get(dim)).abs() < 0.05,
                "{dim} did not converge: {} vs {}",
                profile.get(dim),
                target.get(dim),
            );
        }
    }
}
