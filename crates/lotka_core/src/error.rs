//! Error taxonomy of the simulation core.
//!
//! Invalid input is rejected before any stepping happens; numerical failures
//! abort the whole integration. There is no partial-trajectory fallback.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Input fields a [`ParameterViolation`] can point at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Field {
    #[serde(rename = "x0")]
    InitialPrey,
    #[serde(rename = "y0")]
    InitialPredator,
    #[serde(rename = "alpha")]
    Alpha,
    #[serde(rename = "beta")]
    Beta,
    #[serde(rename = "gamma")]
    Gamma,
    #[serde(rename = "delta")]
    Delta,
    #[serde(rename = "T")]
    Duration,
    #[serde(rename = "samples")]
    Samples,
}

impl Field {
    pub fn as_str(self) -> &'static str {
        match self {
            Field::InitialPrey => "x0",
            Field::InitialPredator => "y0",
            Field::Alpha => "alpha",
            Field::Beta => "beta",
            Field::Gamma => "gamma",
            Field::Delta => "delta",
            Field::Duration => "T",
            Field::Samples => "samples",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The constraint a field failed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Constraint {
    NotFinite,
    NotPositive,
    ExceedsMaximum { max: f64 },
    TooFewSamples { min: usize },
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Constraint::NotFinite => f.write_str("must be a finite number"),
            Constraint::NotPositive => f.write_str("must be strictly positive"),
            Constraint::ExceedsMaximum { max } => write!(f, "must not exceed {max}"),
            Constraint::TooFewSamples { min } => write!(f, "must be at least {min}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, thiserror::Error)]
#[error("invalid parameter {field}: {constraint}")]
pub struct ParameterViolation {
    pub field: Field,
    pub constraint: Constraint,
}

impl ParameterViolation {
    pub fn new(field: Field, constraint: Constraint) -> Self {
        Self { field, constraint }
    }
}

/// What went non-finite (or stalled) inside the stepper.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DivergenceCause {
    NonFiniteDerivative,
    NonFiniteState,
    StepSizeUnderflow,
    StepBudgetExhausted,
}

impl fmt::Display for DivergenceCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            DivergenceCause::NonFiniteDerivative => "derivative became non-finite",
            DivergenceCause::NonFiniteState => "state became non-finite",
            DivergenceCause::StepSizeUnderflow => "adaptive step size underflowed",
            DivergenceCause::StepBudgetExhausted => "step budget exhausted",
        };
        f.write_str(text)
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SimulationError {
    #[error(transparent)]
    InvalidParameter(#[from] ParameterViolation),

    #[error("numerical divergence at t = {time}: {cause}")]
    NumericalDivergence { time: f64, cause: DivergenceCause },
}

impl SimulationError {
    /// True when the caller supplied bad input, false when the computation itself failed.
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, SimulationError::InvalidParameter(_))
    }
}
