//! # atlas-game — Game-Facing Surface for the Atlas
//!
//! This crate wires the game-agnostic `atlas-core` library and the
//! `atlas-llm` generation pipeline into the operations the routing layer
//! calls.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │              HTTP routing (not here)          │
//! │  ┌────────────────────────────────────────┐  │
//! │  │             atlas-game                 │  │
//! │  │  ┌─────────┐ ┌─────────┐ ┌──────────┐  │  │
//! │  │  │  rules  │ │ service │ │  store   │  │  │
//! │  │  └────┬────┘ └────┬────┘ └────┬─────┘  │  │
//! │  │       ▼           ▼           ▼        │  │
//! │  │  ┌──────────────┐  ┌────────────────┐  │  │
//! │  │  │  atlas-core  │  │   atlas-llm    │  │  │
//! │  │  └──────────────┘  └────────────────┘  │  │
//! │  └────────────────────────────────────────┘  │
//! └──────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - `rules` — place-chain validation (required letter, reuse, hints)
//! - `store` — the `ProfileStore` boundary and its in-memory implementation
//! - `display` — dominant-mood → display color derivation
//! - `service` — `GameService`, the six operations the routing layer calls

pub mod display;
pub mod rules;
pub mod service;
pub mod store;

pub use rules::{PlaceRuling, PlaceVerdict, RejectReason};
pub use service::{ChoiceOutcome, GameService};
pub use store::{MemoryProfileStore, ProfileStore};
