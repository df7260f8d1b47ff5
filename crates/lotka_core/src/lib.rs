//! The `lotka_core` crate is the numerical engine behind the Lotka simulator.
//! It turns the Lotka-Volterra predator-prey equations into sampled trajectories
//! and is agnostic to how requests arrive (HTTP, WASM, tests).
//!
//! Key components:
//! - **Traits**: `Scalar`, `DynamicalSystem` (vector fields), `Steppable` / `EmbeddedStepper` (solvers).
//! - **Model**: the rate law, its conserved quantity, equilibrium and Jacobian.
//! - **Solvers**: RK4 and Dormand-Prince 5(4).
//! - **Integrator**: sampling over `[0, T]` with divergence detection.
//! - **Simulation / Validation**: request-level entry point and input checks.
//! - **Analysis**: equilibrium classification, invariant drift, trajectory summaries.
pub mod analysis;
pub mod error;
pub mod info;
pub mod integrator;
pub mod model;
pub mod simulation;
pub mod solvers;
pub mod traits;
pub mod validation;

pub use error::{ParameterViolation, SimulationError};
pub use integrator::{integrate, integrate_with, IntegratorSettings, Method, Trajectory};
pub use model::{ModelParameters, State};
pub use simulation::{simulate, SimulationLimits, SimulationOutput, SimulationRequest};
