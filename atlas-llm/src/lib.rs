//! # atlas-llm — Generation Pipeline for the Atlas
//!
//! Everything between the game and the external generative text service:
//!
//! - **client** — thin single-attempt HTTP client (OpenAI-compatible or
//!   Ollama), injected explicitly, with a `None` marker for "no upstream"
//! - **pipeline** — bounded retries with exponential backoff, then
//!   deterministic fallback; results cached by place identity
//! - **validate** — structural gate on the returned JSON shape
//! - **sanitize** — allow-list text filter, the security boundary against
//!   injection via model output
//! - **fallback** — curated static scenarios, no external dependency
//!
//! # Degradation chain
//!
//! ```text
//! cache hit ──────────────────────────────────────────────▶ [<0.1ms]
//! generated: up to 3 attempts, 500ms/1000ms backoff ───────▶ [0.2–10s]
//! fallback: static pool picked by place identity ──────────▶ [<0.1ms]
//! ```
//!
//! The pipeline's public API never fails: the caller always receives a
//! structurally valid scenario, marked `generated: false` when the
//! upstream was unavailable or exhausted its attempts.

pub mod client;
pub mod error;
pub mod fallback;
pub mod pipeline;
pub mod prompt;
pub mod sanitize;
pub mod types;
pub mod validate;

pub use client::{GenerateText, GeneratorClient, GeneratorProvider};
pub use error::GenError;
pub use pipeline::{RetryPolicy, ScenarioPipeline};
pub use types::{GenRequest, GenResponse, ScenarioChoice, ScenarioResult};
