//! Display derivation — dominant mood to client-side color.
//!
//! The client tints each place marker by its dominant mood. The palette
//! lives here so every surface (map, overview, choice acknowledgement)
//! derives the same color from the same profile state.

use atlas_core::types::Mood;

/// Hex color for a dominant mood.
#[must_use]
pub fn mood_color(mood: Mood) -> &'static str {
    match mood {
        Mood::Neutral => "#9aa5b1",
        Mood::Warmth => "#e07a5f",
        Mood::Loneliness => "#5c7da5",
        Mood::Tension => "#b5443c",
        Mood::Nostalgia => "#b08bc0",
        Mood::Belonging => "#7fb069",
    }
}
