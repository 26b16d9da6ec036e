//! Content guards built on top of an `LlmProvider`

pub mod toxicity;

pub use toxicity::{Assessment, ToxicityGuard, ToxicityVerdict};
