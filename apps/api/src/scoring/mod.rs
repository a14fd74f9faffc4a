// Scoring core: skill coverage, experience fit, external signals and the final aggregate.
// Everything except `signals` is pure and synchronous. `signals` is the only place that
// awaits a collaborator, and it never surfaces an external failure to callers.

pub mod aggregate;
pub mod config;
pub mod experience;
pub mod prompts;
pub mod signals;
pub mod skills;
