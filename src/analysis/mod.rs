// Request handling: length policy, validation gate, orchestration
pub mod pipeline;
pub mod policy;
pub mod validation;

pub use pipeline::{Pipeline, PipelineState};
pub use policy::{length_budget, truncate_chars, DEFAULT_MAX_CHARS};
pub use validation::validate;
