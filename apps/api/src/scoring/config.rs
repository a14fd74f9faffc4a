use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Allowed deviation of the weight sum from 1.0.
pub const WEIGHT_SUM_TOLERANCE: f64 = 0.01;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("Scoring weights must sum to 1.0 (current sum: {sum:.2})")]
    WeightSum { sum: f64 },

    #[error("Scoring weight '{name}' must be within 0.0–1.0 (got {value})")]
    WeightRange { name: &'static str, value: f64 },

    #[error("Threshold '{name}' must be within 0–100 (got {value})")]
    ThresholdRange { name: &'static str, value: u8 },

    #[error("High threshold ({high}) must be greater than medium threshold ({medium})")]
    ThresholdOrder { high: u8, medium: u8 },
}

/// Relative weight of each local signal in the weighted-average path.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoringWeights {
    pub hard: f64,
    pub semantic: f64,
    pub experience: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            hard: 0.4,
            semantic: 0.4,
            experience: 0.2,
        }
    }
}

impl ScoringWeights {
    pub fn sum(&self) -> f64 {
        self.hard + self.semantic + self.experience
    }

    /// Checks the weights without correcting them. The aggregator uses whatever it is given.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("hard", self.hard),
            ("semantic", self.semantic),
            ("experience", self.experience),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::WeightRange { name, value });
            }
        }

        let sum = self.sum();
        if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(ConfigError::WeightSum { sum });
        }
        Ok(())
    }
}

/// Verdict band boundaries on the 0–100 overall score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VerdictThresholds {
    pub high: u8,
    pub medium: u8,
}

impl Default for VerdictThresholds {
    fn default() -> Self {
        Self {
            high: 75,
            medium: 50,
        }
    }
}

impl VerdictThresholds {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.high > 100 {
            return Err(ConfigError::ThresholdRange {
                name: "high",
                value: self.high,
            });
        }
        if self.medium > 100 {
            return Err(ConfigError::ThresholdRange {
                name: "medium",
                value: self.medium,
            });
        }
        if self.high <= self.medium {
            return Err(ConfigError::ThresholdOrder {
                high: self.high,
                medium: self.medium,
            });
        }
        Ok(())
    }
}

/// The full configuration surface of the scoring core.
/// Passed by value into every evaluation; never read from global state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoringConfig {
    #[serde(default)]
    pub weights: ScoringWeights,
    #[serde(default)]
    pub thresholds: VerdictThresholds,
}

impl ScoringConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.weights.validate()?;
        self.thresholds.validate()
    }
}
