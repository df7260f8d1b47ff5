//! Request-level entry point: validate, integrate, flatten.

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::error::SimulationError;
use crate::integrator::{integrate_with, IntegratorSettings, Trajectory, TrajectoryWarning};
use crate::model::{ModelParameters, State};
use crate::validation::validate;

/// Everything a caller supplies for one run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimulationRequest {
    pub x0: f64,
    pub y0: f64,
    pub alpha: f64,
    pub beta: f64,
    pub gamma: f64,
    pub delta: f64,
    /// Total simulated time.
    #[serde(rename = "T")]
    pub duration: u32,
}

impl SimulationRequest {
    pub fn initial_state(&self) -> State {
        State::new(self.x0, self.y0)
    }

    pub fn params(&self) -> ModelParameters {
        ModelParameters::new(self.alpha, self.beta, self.gamma, self.delta)
    }
}

/// Bounds that keep a single run cheap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationLimits {
    pub max_duration: u32,
    pub samples: usize,
}

impl Default for SimulationLimits {
    fn default() -> Self {
        Self {
            max_duration: 1000,
            samples: 500,
        }
    }
}

/// Column-oriented trajectory as handed to serializers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationOutput {
    pub time: Vec<f64>,
    pub prey: Vec<f64>,
    pub predator: Vec<f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<TrajectoryWarning>,
}

impl From<Trajectory> for SimulationOutput {
    fn from(trajectory: Trajectory) -> Self {
        let (time, states, warnings) = trajectory.into_parts();
        let (prey, predator) = states.iter().map(|s| (s.prey, s.predator)).unzip();
        Self {
            time,
            prey,
            predator,
            warnings,
        }
    }
}

/// Validates `request` against `limits`, then integrates it.
///
/// Invalid input never reaches the stepper.
#[instrument(level = "debug", skip_all, fields(duration = request.duration))]
pub fn simulate(
    request: &SimulationRequest,
    limits: &SimulationLimits,
    settings: &IntegratorSettings,
) -> Result<SimulationOutput, SimulationError> {
    validate(request, limits)?;
    let trajectory = integrate_with(
        request.initial_state(),
        &request.params(),
        f64::from(request.duration),
        limits.samples,
        settings,
    )?;
    debug!(samples = trajectory.len(), "Simulation finished");
    Ok(trajectory.into())
}
