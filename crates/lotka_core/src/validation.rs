//! Pure input checks, independent of whichever gateway decoded the request.

use crate::error::{Constraint, Field, ParameterViolation};
use crate::simulation::{SimulationLimits, SimulationRequest};

/// Minimum number of samples that still describes a trajectory.
pub const MIN_SAMPLES: usize = 2;

fn positive(field: Field, value: f64) -> Result<(), ParameterViolation> {
    if !value.is_finite() {
        return Err(ParameterViolation::new(field, Constraint::NotFinite));
    }
    if value <= 0.0 {
        return Err(ParameterViolation::new(field, Constraint::NotPositive));
    }
    Ok(())
}

/// Checks every field of `request` in wire order and reports the first violation.
pub fn validate(
    request: &SimulationRequest,
    limits: &SimulationLimits,
) -> Result<(), ParameterViolation> {
    positive(Field::InitialPrey, request.x0)?;
    positive(Field::InitialPredator, request.y0)?;
    positive(Field::Alpha, request.alpha)?;
    positive(Field::Beta, request.beta)?;
    positive(Field::Gamma, request.gamma)?;
    positive(Field::Delta, request.delta)?;

    if request.duration == 0 {
        return Err(ParameterViolation::new(
            Field::Duration,
            Constraint::NotPositive,
        ));
    }
    if request.duration > limits.max_duration {
        return Err(ParameterViolation::new(
            Field::Duration,
            Constraint::ExceedsMaximum {
                max: f64::from(limits.max_duration),
            },
        ));
    }
    if limits.samples < MIN_SAMPLES {
        return Err(ParameterViolation::new(
            Field::Samples,
            Constraint::TooFewSamples { min: MIN_SAMPLES },
        ));
    }
    Ok(())
}
