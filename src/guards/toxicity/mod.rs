//! Toxicity guard: judge prompt, structured-output shaping and verdict validation

mod detector;
pub mod prompts;
pub mod structured_output;
mod verdict;

pub use detector::{Assessment, ToxicityGuard};
pub use prompts::SYSTEM_PROMPT;
pub use structured_output::{
    verdict_gemini_schema, verdict_json_schema, SpecBuilder, StructuredOutputRegistry,
};
pub use verdict::{ToxicityCategory, ToxicityScore, ToxicityVerdict, VerdictError};
