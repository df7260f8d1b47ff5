//! The predator-prey rate law and its closed-form companions.

use crate::traits::{DynamicalSystem, Scalar};
use serde::{Deserialize, Serialize};

/// Population pair (x, y). Negative values are representable; the model never clamps.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct State {
    pub prey: f64,
    pub predator: f64,
}

impl State {
    pub const DIM: usize = 2;

    pub fn new(prey: f64, predator: f64) -> Self {
        Self { prey, predator }
    }

    pub fn to_array(self) -> [f64; 2] {
        [self.prey, self.predator]
    }

    pub fn from_slice(values: &[f64]) -> Option<Self> {
        match values {
            [prey, predator] => Some(Self::new(*prey, *predator)),
            _ => None,
        }
    }

    pub fn is_finite(&self) -> bool {
        self.prey.is_finite() && self.predator.is_finite()
    }
}

/// Rate constants of the model. Positivity is enforced by [`crate::validation`], not here.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModelParameters {
    /// Prey birth rate.
    pub alpha: f64,
    /// Predation rate.
    pub beta: f64,
    /// Predator death rate.
    pub gamma: f64,
    /// Predator growth rate per prey consumed.
    pub delta: f64,
}

impl ModelParameters {
    pub fn new(alpha: f64, beta: f64, gamma: f64, delta: f64) -> Self {
        Self {
            alpha,
            beta,
            gamma,
            delta,
        }
    }
}

fn rate<T: Scalar>(x: T, y: T, params: &ModelParameters) -> (T, T) {
    let alpha = T::constant(params.alpha);
    let beta = T::constant(params.beta);
    let gamma = T::constant(params.gamma);
    let delta = T::constant(params.delta);

    let dx = alpha * x - beta * x * y;
    let dy = delta * x * y - gamma * y;
    (dx, dy)
}

fn norm_bound<T: Scalar>(x: T, y: T, params: &ModelParameters) -> T {
    let alpha = T::constant(params.alpha);
    let beta = T::constant(params.beta);
    let gamma = T::constant(params.gamma);
    let delta = T::constant(params.delta);

    let prey_row = (alpha - beta * y).abs() + (beta * x).abs();
    let predator_row = (delta * y).abs() + (delta * x - gamma).abs();
    prey_row.max(predator_row)
}

/// Instantaneous (dx/dt, dy/dt). Overflow to inf/NaN is returned as-is.
pub fn derivative(state: State, params: &ModelParameters) -> (f64, f64) {
    rate(state.prey, state.predator, params)
}

/// V = delta·x − gamma·ln(x) + beta·y − alpha·ln(y), constant along exact solutions.
/// Only defined for strictly positive populations; returns NaN otherwise.
pub fn conserved_quantity(state: State, params: &ModelParameters) -> f64 {
    if state.prey <= 0.0 || state.predator <= 0.0 {
        return f64::NAN;
    }
    params.delta * state.prey - params.gamma * state.prey.ln() + params.beta * state.predator
        - params.alpha * state.predator.ln()
}

/// Non-trivial fixed point (gamma/delta, alpha/beta).
pub fn coexistence_equilibrium(params: &ModelParameters) -> State {
    State::new(params.gamma / params.delta, params.alpha / params.beta)
}

/// Row-major 2x2 Jacobian of the rate law at `state`.
pub fn jacobian(state: State, params: &ModelParameters) -> [f64; 4] {
    let (x, y) = (state.prey, state.predator);
    [
        params.alpha - params.beta * y,
        -params.beta * x,
        params.delta * y,
        params.delta * x - params.gamma,
    ]
}

/// Infinity norm of the Jacobian at `state`. Bounds every eigenvalue, so
/// `1 / jacobian_norm` is the fastest local time scale of the flow.
pub fn jacobian_norm(state: State, params: &ModelParameters) -> f64 {
    norm_bound(state.prey, state.predator, params)
}

/// The Lotka-Volterra vector field, usable by any [`crate::traits::Steppable`].
#[derive(Debug, Clone, Copy)]
pub struct LotkaVolterra {
    params: ModelParameters,
}

impl LotkaVolterra {
    pub fn new(params: ModelParameters) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &ModelParameters {
        &self.params
    }
}

impl<T: Scalar> DynamicalSystem<T> for LotkaVolterra {
    fn dimension(&self) -> usize {
        State::DIM
    }

    fn apply(&self, _t: T, x: &[T], out: &mut [T]) {
        let (dx, dy) = rate(x[0], x[1], &self.params);
        out[0] = dx;
        out[1] = dy;
    }

    fn rate_bound(&self, _t: T, x: &[T]) -> T {
        norm_bound(x[0], x[1], &self.params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classic() -> ModelParameters {
        ModelParameters::new(1.1, 0.4, 0.4, 0.1)
    }

    #[test]
    fn derivative_matches_rate_law() {
        let (dx, dy) = derivative(State::new(10.0, 5.0), &classic());
        assert!((dx - (1.1 * 10.0 - 0.4 * 10.0 * 5.0)).abs() < 1e-12);
        assert!((dy - (0.1 * 10.0 * 5.0 - 0.4 * 5.0)).abs() < 1e-12);
    }

    #[test]
    fn derivative_vanishes_at_coexistence_equilibrium() {
        let params = classic();
        let eq = coexistence_equilibrium(&params);
        assert!((eq.prey - 4.0).abs() < 1e-12);
        assert!((eq.predator - 2.75).abs() < 1e-12);
        let (dx, dy) = derivative(eq, &params);
        assert!(dx.abs() < 1e-12);
        assert!(dy.abs() < 1e-12);
    }

    #[test]
    fn derivative_propagates_non_finite_values() {
        let (dx, dy) = derivative(State::new(f64::MAX, f64::MAX), &classic());
        assert!(!dx.is_finite());
        assert!(!dy.is_finite());
        let (dx, _) = derivative(State::new(f64::NAN, 1.0), &classic());
        assert!(dx.is_nan());
    }

    #[test]
    fn vector_field_agrees_with_derivative() {
        let params = classic();
        let system = LotkaVolterra::new(params);
        let mut out = [0.0; 2];
        system.apply(0.0, &[3.0, 7.0], &mut out);
        let (dx, dy) = derivative(State::new(3.0, 7.0), &params);
        assert_eq!(out, [dx, dy]);
        assert_eq!(DynamicalSystem::<f64>::dimension(&system), 2);
    }

    #[test]
    fn vector_field_is_generic_over_scalar() {
        let system = LotkaVolterra::new(classic());
        let mut out = [0.0f32; 2];
        system.apply(0.0f32, &[10.0, 5.0], &mut out);
        assert!((out[0] - (-9.0)).abs() < 1e-4);
        assert!((out[1] - 3.0).abs() < 1e-4);
    }

    #[test]
    fn conserved_quantity_requires_positive_populations() {
        let params = classic();
        assert!(conserved_quantity(State::new(0.0, 1.0), &params).is_nan());
        assert!(conserved_quantity(State::new(1.0, -1.0), &params).is_nan());
        let v = conserved_quantity(State::new(1.0, 1.0), &params);
        assert!((v - (0.1 + 0.4)).abs() < 1e-12);
    }

    #[test]
    fn jacobian_is_row_major() {
        let jac = jacobian(State::new(2.0, 3.0), &classic());
        assert!((jac[0] - (1.1 - 1.2)).abs() < 1e-12);
        assert!((jac[1] + 0.8).abs() < 1e-12);
        assert!((jac[2] - 0.3).abs() < 1e-12);
        assert!((jac[3] - (0.2 - 0.4)).abs() < 1e-12);
    }

    #[test]
    fn jacobian_norm_tracks_rate_constants() {
        let params = classic();
        let norm = jacobian_norm(State::new(2.0, 3.0), &params);
        assert!((norm - 0.9).abs() < 1e-12);
        let system = LotkaVolterra::new(params);
        assert_eq!(DynamicalSystem::<f64>::rate_bound(&system, 0.0, &[2.0, 3.0]), norm);

        // The linearized frequency at coexistence is sqrt(alpha * gamma).
        let fast = ModelParameters::new(100.0, 0.4, 100.0, 0.1);
        let eq = coexistence_equilibrium(&fast);
        let norm = jacobian_norm(eq, &fast);
        assert!((norm - 400.0).abs() < 1e-9);
        assert!(norm >= (fast.alpha * fast.gamma).sqrt());
    }

    #[test]
    fn state_from_slice_checks_length() {
        assert_eq!(State::from_slice(&[1.0, 2.0]), Some(State::new(1.0, 2.0)));
        assert_eq!(State::from_slice(&[1.0]), None);
    }
}
