// Evaluation: the end-to-end scoring pipeline, result persistence, and the HTTP handlers
// in front of them. Scoring logic itself lives in crate::scoring.

pub mod handlers;
pub mod pipeline;
pub mod store;
