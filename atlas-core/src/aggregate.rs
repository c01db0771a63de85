//! Decaying-weight emotion aggregation — "personality inertia".
//!
//! A place's profile is an exponential moving average over player choices
//! where the learning rate shrinks with visit count:
//!
//!   r = max(r_min, r_base / sqrt(1 + d * visits))
//!   merged = existing * (1 - r) + incoming * r
//!
//! Early interactions swing a fresh profile noticeably; as the visit count
//! grows the same-magnitude interaction has progressively less effect, so
//! long-established places stabilize without ever fully freezing.
//!
//! All functions here are pure and total: no input can cause a panic, and
//! invalid numeric input degrades to 0 rather than propagating NaN.

use chrono::{DateTime, Utc};

use crate::config::AggregateTuning;
use crate::types::{
    clamp01, Coordinates, Emotion, EmotionVector, Mood, PlaceProfile,
};

/// Default learning rate for a never-visited place.
pub const BASE_RATE: f32 = 0.15;

/// Floor below which the learning rate never drops.
pub const MIN_RATE: f32 = 0.05;

/// Visit-count damping factor inside the square root.
pub const VISIT_DAMPING: f32 = 0.1;

/// Compute the adaptive learning rate for a place with `prior_visits`
/// interactions already folded in.
#[must_use]
pub fn adaptive_rate(prior_visits: u32) -> f32 {
    adaptive_rate_with(prior_visits, &AggregateTuning::default())
}

/// [`adaptive_rate`] with explicit tuning.
#[must_use]
pub fn adaptive_rate_with(prior_visits: u32, tuning: &AggregateTuning) -> f32 {
    #[allow(clippy::cast_precision_loss)]
    let damped = (1.0 + tuning.visit_damping * prior_visits as f32).sqrt();
    (tuning.base_rate / damped).max(tuning.min_rate)
}

/// Fold `incoming` into `existing` using the adaptive rate for
/// `prior_visits`.
///
/// Both inputs are re-clamped to [0, 1] per dimension (NaN → 0) before
/// blending, and each merged value is rounded to three decimal places.
#[must_use]
pub fn merge(
    existing: &EmotionVector,
    incoming: &EmotionVector,
    prior_visits: u32,
) -> EmotionVector {
    merge_with(existing, incoming, prior_visits, &AggregateTuning::default())
}

/// [`merge`] with explicit tuning.
#[must_use]
pub fn merge_with(
    existing: &EmotionVector,
    incoming: &EmotionVector,
    prior_visits: u32,
    tuning: &AggregateTuning,
) -> EmotionVector {
    let rate = adaptive_rate_with(prior_visits, tuning);
    let mut merged = EmotionVector::ZERO;
    for dim in Emotion::ALL {
        let old = clamp01(existing.get(dim));
        let new = clamp01(incoming.get(dim));
        merged.set(dim, round3(old.mul_add(1.0 - rate, new * rate)));
    }
    merged
}

/// The dimension with the strictly greatest value.
///
/// Ties break toward the first dimension in [`Emotion::ALL`] order.
#[must_use]
pub fn dominant(vector: &EmotionVector) -> Emotion {
    let mut best = Emotion::ALL[0];
    let mut best_value = vector.get(best);
    for dim in Emotion::ALL.into_iter().skip(1) {
        let value = vector.get(dim);
        if value > best_value {
            best = dim;
            best_value = value;
        }
    }
    best
}

/// A fresh profile for a place nobody has interacted with yet.
///
/// Every dimension rests at 0.5 and the dominant label is
/// [`Mood::Neutral`]. Each call returns an independently mutable value —
/// there is no shared default instance.
#[must_use]
pub fn default_profile(
    name: impl Into<String>,
    region: Option<String>,
    coords: Option<Coordinates>,
) -> PlaceProfile {
    PlaceProfile {
        name: name.into(),
        region,
        coords,
        emotions: EmotionVector::NEUTRAL,
        dominant: Mood::Neutral,
        visit_count: 0,
        last_updated: Utc::now(),
    }
}

/// Fold one chosen interaction into a profile in place.
///
/// Merges the choice vector at the profile's current visit count, then
/// increments the counter, recomputes the dominant label, and stamps
/// `last_updated`.
pub fn apply_choice(profile: &mut PlaceProfile, choice: &EmotionVector, now: DateTime<Utc>) {
    profile.emotions = merge(&profile.emotions, choice, profile.visit_count);
    profile.visit_count = profile.visit_count.saturating_add(1);
    profile.dominant = Mood::from(dominant(&profile.emotions));
    profile.last_updated = now;
}

/// Round to three decimal places.
fn round3(value: f32) -> f32 {
    (value * 1000.0).round() / 1000.0
}
