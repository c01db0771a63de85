//! Place-chain rules — is this name a legal next move?
//!
//! The naming game is a chain: each place must start with the last letter
//! of the previous one, and no place can be named twice in a session.
//! Validation is pure string work; the geodata lookup that confirms the
//! place actually exists happens upstream of this module.

use std::collections::HashSet;
use std::fmt;

use atlas_core::types::PlaceKey;
use rand::seq::SliceRandom;
use serde::Serialize;

/// Minimum characters a place name must carry after normalization.
pub const MIN_NAME_LENGTH: usize = 2;

/// Maximum hints returned with a ruling.
pub const MAX_HINTS: usize = 3;

/// Curated hint pool. Not a gazetteer — just enough well-known names to
/// nudge a stuck player for most starting letters.
const HINT_POOL: &[&str] = &[
    "Amsterdam", "Athens", "Auckland", "Bergen", "Bogota", "Brisbane",
    "Cairo", "Casablanca", "Denver", "Dubrovnik", "Edinburgh", "Essen",
    "Florence", "Geneva", "Hanoi", "Istanbul", "Izmir", "Jakarta",
    "Kyoto", "Lisbon", "Lima", "Marseille", "Nairobi", "Naples",
    "Oslo", "Odessa", "Porto", "Prague", "Quito", "Riga", "Rotterdam",
    "Seville", "Sarajevo", "Tbilisi", "Tunis", "Ulm", "Valparaiso",
    "Windhoek", "Xalapa", "Yerevan", "Zagreb",
];

/// Outcome of validating one candidate name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaceVerdict {
    /// Legal move; carries the letter the NEXT place must start with.
    Accepted {
        /// Last letter of the accepted name.
        next_letter: char,
    },
    /// Illegal move.
    Rejected {
        /// Why it was rejected.
        reason: RejectReason,
    },
}

/// Why a candidate name was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectReason {
    /// Nothing left after normalization.
    Empty,
    /// Shorter than [`MIN_NAME_LENGTH`].
    TooShort,
    /// Characters outside letters, whitespace, hyphen, apostrophe, period.
    IllegalCharacters,
    /// Doesn't start with the required chain letter.
    WrongFirstLetter {
        /// The letter the chain demands.
        required: char,
    },
    /// Already named this session.
    AlreadyUsed,
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "name is empty"),
            Self::TooShort => write!(f, "name is too short"),
            Self::IllegalCharacters => write!(f, "name contains illegal characters"),
            Self::WrongFirstLetter { required } => {
                write!(f, "name must start with '{required}'")
            }
            Self::AlreadyUsed => write!(f, "place was already named"),
        }
    }
}

/// A verdict plus hints for the player's current position in the chain.
#[derive(Debug, Clone, Serialize)]
pub struct PlaceRuling {
    /// Whether the move is legal, and what follows.
    pub verdict: PlaceVerdict,
    /// Up to [`MAX_HINTS`] unused pool names legal at this position.
    pub hints: Vec<&'static str>,
}

/// Validate a candidate against the chain position.
///
/// `previous` is the last accepted name (None at the start of a chain);
/// `used` holds every key already named this session. Hints are sampled
/// from the pool for the letter the player currently needs.
#[must_use]
pub fn validate_place(
    name: &str,
    previous: Option<&str>,
    used: &HashSet<PlaceKey>,
) -> PlaceRuling {
    let required = previous.and_then(last_letter);
    let hints = sample_hints(required, used);
    let verdict = judge(name, required, used);
    PlaceRuling { verdict, hints }
}

fn judge(name: &str, required: Option<char>, used: &HashSet<PlaceKey>) -> PlaceVerdict {
    let key = PlaceKey::new(name);
    if key.is_empty() {
        return PlaceVerdict::Rejected {
            reason: RejectReason::Empty,
        };
    }
    if key.as_str().chars().count() < MIN_NAME_LENGTH {
        return PlaceVerdict::Rejected {
            reason: RejectReason::TooShort,
        };
    }
    if !name
        .chars()
        .all(|c| c.is_alphabetic() || c.is_whitespace() || matches!(c, '-' | '\'' | '.'))
    {
        return PlaceVerdict::Rejected {
            reason: RejectReason::IllegalCharacters,
        };
    }
    if let Some(required) = required {
        if first_letter(key.as_str()) != Some(required) {
            return PlaceVerdict::Rejected {
                reason: RejectReason::WrongFirstLetter { required },
            };
        }
    }
    if used.contains(&key) {
        return PlaceVerdict::Rejected {
            reason: RejectReason::AlreadyUsed,
        };
    }
    match last_letter(key.as_str()) {
        Some(next_letter) => PlaceVerdict::Accepted { next_letter },
        None => PlaceVerdict::Rejected {
            reason: RejectReason::IllegalCharacters,
        },
    }
}

/// Sample unused hint names for the required letter (any letter if the
/// chain hasn't started).
fn sample_hints(required: Option<char>, used: &HashSet<PlaceKey>) -> Vec<&'static str> {
    let candidates: Vec<&'static str> = HINT_POOL
        .iter()
        .copied()
        .filter(|name| !used.contains(&PlaceKey::new(name)))
        .filter(|name| match required {
            Some(letter) => first_letter(&name.to_lowercase()) == Some(letter),
            None => true,
        })
        .collect();

    candidates
        .choose_multiple(&mut rand::thread_rng(), MAX_HINTS)
        .copied()
        .collect()
}

/// First alphabetic character, lowercased.
fn first_letter(s: &str) -> Option<char> {
    s.chars()
        .find(|c| c.is_alphabetic())
        .and_then(|c| c.to_lowercase().next())
}

/// Last alphabetic character, lowercased.
fn last_letter(s: &str) -> Option<char> {
    s.chars()
        .rev()
        .find(|c| c.is_alphabetic())
        .and_then(|c| c.to_lowercase().next())
}
