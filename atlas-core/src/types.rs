//! Core type definitions for the atlas.
//!
//! All types are serializable and cheap to clone.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ---------------------------------------------------------------------------
// Emotion Dimensions
// ---------------------------------------------------------------------------

/// One of the five emotion dimensions a place is scored on.
///
/// The declared order is load-bearing: it is the enumeration order used for
/// dominant-dimension tie-breaks, so it must not be reordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Emotion {
    /// Comfort, friendliness, being welcomed.
    Warmth,
    /// Isolation, emptiness, being unseen.
    Loneliness,
    /// Unease, pressure, alertness.
    Tension,
    /// Longing for something past.
    Nostalgia,
    /// Feeling at home, being part of the place.
    Belonging,
}

impl Emotion {
    /// Every dimension, in tie-break order.
    pub const ALL: [Emotion; 5] = [
        Emotion::Warmth,
        Emotion::Loneliness,
        Emotion::Tension,
        Emotion::Nostalgia,
        Emotion::Belonging,
    ];

    /// The wire/storage name of this dimension.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Warmth => "warmth",
            Self::Loneliness => "loneliness",
            Self::Tension => "tension",
            Self::Nostalgia => "nostalgia",
            Self::Belonging => "belonging",
        }
    }
}

impl fmt::Display for Emotion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Emotion {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "warmth" => Ok(Self::Warmth),
            "loneliness" => Ok(Self::Loneliness),
            "tension" => Ok(Self::Tension),
            "nostalgia" => Ok(Self::Nostalgia),
            "belonging" => Ok(Self::Belonging),
            _ => Err(format!("unknown emotion dimension: '{s}'")),
        }
    }
}

/// A profile's dominant-dimension label.
///
/// `Neutral` is the state of a place nobody has interacted with yet; after
/// the first merge the label always names a concrete dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mood {
    /// No interactions yet — all dimensions at their resting value.
    Neutral,
    /// Warmth dominates.
    Warmth,
    /// Loneliness dominates.
    Loneliness,
    /// Tension dominates.
    Tension,
    /// Nostalgia dominates.
    Nostalgia,
    /// Belonging dominates.
    Belonging,
}

impl Mood {
    /// The wire/storage name of this mood.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Neutral => "neutral",
            Self::Warmth => "warmth",
            Self::Loneliness => "loneliness",
            Self::Tension => "tension",
            Self::Nostalgia => "nostalgia",
            Self::Belonging => "belonging",
        }
    }
}

impl From<Emotion> for Mood {
    fn from(e: Emotion) -> Self {
        match e {
            Emotion::Warmth => Self::Warmth,
            Emotion::Loneliness => Self::Loneliness,
            Emotion::Tension => Self::Tension,
            Emotion::Nostalgia => Self::Nostalgia,
            Emotion::Belonging => Self::Belonging,
        }
    }
}

impl fmt::Display for Mood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

// ---------------------------------------------------------------------------
// Emotion Vector
// ---------------------------------------------------------------------------

/// A score in [0, 1] for each of the five dimensions.
///
/// Values are clamped on construction; NaN coerces to 0. The vector is not
/// required to sum to 1.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmotionVector {
    /// Warmth score.
    pub warmth: f32,
    /// Loneliness score.
    pub loneliness: f32,
    /// Tension score.
    pub tension: f32,
    /// Nostalgia score.
    pub nostalgia: f32,
    /// Belonging score.
    pub belonging: f32,
}

impl EmotionVector {
    /// The resting profile vector — every dimension at 0.5.
    pub const NEUTRAL: Self = Self {
        warmth: 0.5,
        loneliness: 0.5,
        tension: 0.5,
        nostalgia: 0.5,
        belonging: 0.5,
    };

    /// The zero vector — the default for absent input.
    pub const ZERO: Self = Self {
        warmth: 0.0,
        loneliness: 0.0,
        tension: 0.0,
        nostalgia: 0.0,
        belonging: 0.0,
    };

    /// Create a new vector, clamping each value to [0, 1] (NaN → 0).
    #[must_use]
    pub fn new(warmth: f32, loneliness: f32, tension: f32, nostalgia: f32, belonging: f32) -> Self {
        Self {
            warmth: clamp01(warmth),
            loneliness: clamp01(loneliness),
            tension: clamp01(tension),
            nostalgia: clamp01(nostalgia),
            belonging: clamp01(belonging),
        }
    }

    /// Build a vector from an untrusted JSON value.
    ///
    /// Recognized keys are read as numbers and clamped; missing or
    /// non-numeric values default to 0; unrecognized keys are ignored.
    /// Non-object input yields [`EmotionVector::ZERO`].
    #[must_use]
    pub fn from_loose(value: &serde_json::Value) -> Self {
        let mut out = Self::ZERO;
        if let Some(map) = value.as_object() {
            for dim in Emotion::ALL {
                #[allow(clippy::cast_possible_truncation)]
                let v = map
                    .get(dim.name())
                    .and_then(serde_json::Value::as_f64)
                    .unwrap_or(0.0) as f32;
                out.set(dim, v);
            }
        }
        out
    }

    /// Read one dimension's value.
    #[must_use]
    pub fn get(&self, dim: Emotion) -> f32 {
        match dim {
            Emotion::Warmth => self.warmth,
            Emotion::Loneliness => self.loneliness,
            Emotion::Tension => self.tension,
            Emotion::Nostalgia => self.nostalgia,
            Emotion::Belonging => self.belonging,
        }
    }

    /// Write one dimension's value, clamped to [0, 1] (NaN → 0).
    pub fn set(&mut self, dim: Emotion, value: f32) {
        let value = clamp01(value);
        match dim {
            Emotion::Warmth => self.warmth = value,
            Emotion::Loneliness => self.loneliness = value,
            Emotion::Tension => self.tension = value,
            Emotion::Nostalgia => self.nostalgia = value,
            Emotion::Belonging => self.belonging = value,
        }
    }
}

impl Default for EmotionVector {
    fn default() -> Self {
        Self::ZERO
    }
}

/// Clamp a raw score to [0, 1]; NaN coerces to 0 rather than propagating.
#[must_use]
pub fn clamp01(value: f32) -> f32 {
    if value.is_nan() { 0.0 } else { value.clamp(0.0, 1.0) }
}

// ---------------------------------------------------------------------------
// Place Identity
// ---------------------------------------------------------------------------

/// Normalized place identity used as the storage and cache key.
///
/// Normalization: trimmed, lowercased, internal whitespace runs collapsed
/// to a single space.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlaceKey(String);

impl PlaceKey {
    /// Normalize a raw place name into a key.
    #[must_use]
    pub fn new(raw: &str) -> Self {
        let mut key = String::with_capacity(raw.len());
        for word in raw.split_whitespace() {
            if !key.is_empty() {
                key.push(' ');
            }
            for c in word.chars() {
                key.extend(c.to_lowercase());
            }
        }
        Self(key)
    }

    /// The normalized key string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the raw name normalized to nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for PlaceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Geographic coordinates of a place.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    /// Latitude in degrees.
    pub lat: f64,
    /// Longitude in degrees.
    pub lon: f64,
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.4}, {:.4})", self.lat, self.lon)
    }
}

// ---------------------------------------------------------------------------
// Place Profile
// ---------------------------------------------------------------------------

/// The accumulated emotional profile of one place.
///
/// Created on first interaction, mutated only by the aggregate merge,
/// never deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaceProfile {
    /// Display name as first entered (pre-normalization).
    pub name: String,
    /// Optional parent region (country for a city, continent for a country).
    pub region: Option<String>,
    /// Optional coordinates from the geodata provider.
    pub coords: Option<Coordinates>,
    /// Current aggregated emotion scores.
    pub emotions: EmotionVector,
    /// Precomputed dominant-dimension label.
    pub dominant: Mood,
    /// Number of interactions folded into this profile.
    pub visit_count: u32,
    /// When the profile last changed.
    pub last_updated: DateTime<Utc>,
}

/// Compact profile view for ranked overviews.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileSummary {
    /// Display name.
    pub name: String,
    /// Dominant-dimension label.
    pub dominant: Mood,
    /// Interaction count.
    pub visit_count: u32,
}

impl From<&PlaceProfile> for ProfileSummary {
    fn from(profile: &PlaceProfile) -> Self {
        Self {
            name: profile.name.clone(),
            dominant: profile.dominant,
            visit_count: profile.visit_count,
        }
    }
}
