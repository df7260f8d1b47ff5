use crate::model::{coexistence_equilibrium, conserved_quantity, jacobian, ModelParameters, State};
use crate::simulation::SimulationOutput;
use anyhow::{bail, Result};
use nalgebra::DMatrix;
use num_complex::Complex;
use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EquilibriumKind {
    Center,
    StableSpiral,
    UnstableSpiral,
    StableNode,
    UnstableNode,
    Saddle,
    Degenerate,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EquilibriumReport {
    pub state: State,
    /// Row-major 2x2 Jacobian at `state`.
    pub jacobian: Vec<f64>,
    pub eigenvalues: Vec<Complex<f64>>,
    pub kind: EquilibriumKind,
    /// Period of small oscillations, when the linearization rotates.
    pub linear_period: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixedPoints {
    pub extinction: EquilibriumReport,
    pub coexistence: EquilibriumReport,
}

fn check_params(params: &ModelParameters) -> Result<()> {
    let named = [
        ("alpha", params.alpha),
        ("beta", params.beta),
        ("gamma", params.gamma),
        ("delta", params.delta),
    ];
    for (name, value) in named {
        if !value.is_finite() || value <= 0.0 {
            bail!("Parameter {name} must be finite and positive, got {value}.");
        }
    }
    Ok(())
}

/// Linearizes the vector field at `state` and classifies it.
pub fn linearize(state: State, params: &ModelParameters) -> Result<EquilibriumReport> {
    let jac = jacobian(state, params);
    if jac.iter().any(|v| !v.is_finite()) {
        bail!("Jacobian is not finite at ({}, {}).", state.prey, state.predator);
    }
    let matrix = DMatrix::from_row_slice(2, 2, &jac);
    let eigenvalues: Vec<Complex<f64>> = matrix.complex_eigenvalues().iter().copied().collect();

    let scale = jac.iter().fold(1.0_f64, |acc, v| acc.max(v.abs()));
    let kind = classify(&eigenvalues, 1e-9 * scale);
    let linear_period = match kind {
        EquilibriumKind::Center | EquilibriumKind::StableSpiral | EquilibriumKind::UnstableSpiral => {
            eigenvalues
                .iter()
                .map(|l| l.im.abs())
                .fold(None, |acc: Option<f64>, w| Some(acc.map_or(w, |a| a.max(w))))
                .map(|w| TAU / w)
        }
        _ => None,
    };

    Ok(EquilibriumReport {
        state,
        jacobian: jac.to_vec(),
        eigenvalues,
        kind,
        linear_period,
    })
}

fn classify(eigenvalues: &[Complex<f64>], tol: f64) -> EquilibriumKind {
    let rotating = eigenvalues.iter().any(|l| l.im.abs() > tol);
    let max_re = eigenvalues.iter().map(|l| l.re).fold(f64::NEG_INFINITY, f64::max);
    let min_re = eigenvalues.iter().map(|l| l.re).fold(f64::INFINITY, f64::min);
    let any_zero = eigenvalues.iter().any(|l| l.re.abs() <= tol);

    if rotating {
        if max_re.abs() <= tol && min_re.abs() <= tol {
            EquilibriumKind::Center
        } else if max_re < 0.0 {
            EquilibriumKind::StableSpiral
        } else {
            EquilibriumKind::UnstableSpiral
        }
    } else if any_zero {
        EquilibriumKind::Degenerate
    } else if max_re < 0.0 {
        EquilibriumKind::StableNode
    } else if min_re > 0.0 {
        EquilibriumKind::UnstableNode
    } else {
        EquilibriumKind::Saddle
    }
}

/// Coexistence equilibrium (gamma/delta, alpha/beta) with its linearization.
pub fn analyze_equilibrium(params: &ModelParameters) -> Result<EquilibriumReport> {
    check_params(params)?;
    linearize(coexistence_equilibrium(params), params)
}

/// Both fixed points of the model: total extinction and coexistence.
pub fn analyze_fixed_points(params: &ModelParameters) -> Result<FixedPoints> {
    check_params(params)?;
    Ok(FixedPoints {
        extinction: linearize(State::new(0.0, 0.0), params)?,
        coexistence: linearize(coexistence_equilibrium(params), params)?,
    })
}

/// Largest relative deviation of the conserved quantity from its initial value.
pub fn conservation_drift(output: &SimulationOutput, params: &ModelParameters) -> Result<f64> {
    if output.time.is_empty() {
        bail!("Trajectory is empty.");
    }
    if output.prey.len() != output.time.len() || output.predator.len() != output.time.len() {
        bail!("Trajectory columns have mismatched lengths.");
    }

    let v0 = conserved_quantity(State::new(output.prey[0], output.predator[0]), params);
    if !v0.is_finite() || v0 == 0.0 {
        bail!("Conserved quantity is undefined at the initial state.");
    }

    let mut drift = 0.0_f64;
    for ((&t, &x), &y) in output.time.iter().zip(&output.prey).zip(&output.predator) {
        let v = conserved_quantity(State::new(x, y), params);
        if !v.is_finite() {
            bail!("Conserved quantity is undefined at t = {t}.");
        }
        drift = drift.max(((v - v0) / v0).abs());
    }
    Ok(drift)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrajectorySummary {
    pub prey_min: f64,
    pub prey_max: f64,
    pub predator_min: f64,
    pub predator_max: f64,
    /// Sample times of local prey maxima.
    pub prey_peaks: Vec<f64>,
    /// Mean spacing of successive prey peaks.
    pub estimated_period: Option<f64>,
}

fn local_maxima(time: &[f64], values: &[f64]) -> Vec<f64> {
    values
        .windows(3)
        .zip(time.iter().skip(1))
        .filter(|(w, _)| w[1] > w[0] && w[1] >= w[2])
        .map(|(_, &t)| t)
        .collect()
}

pub fn summarize(output: &SimulationOutput) -> TrajectorySummary {
    let range = |values: &[f64]| {
        values.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        })
    };
    let (prey_min, prey_max) = range(output.prey.as_slice());
    let (predator_min, predator_max) = range(output.predator.as_slice());
    let prey_peaks = local_maxima(&output.time, &output.prey);
    let estimated_period = match prey_peaks.as_slice() {
        [first, .., last] => Some((last - first) / (prey_peaks.len() - 1) as f64),
        _ => None,
    };

    TrajectorySummary {
        prey_min,
        prey_max,
        predator_min,
        predator_max,
        prey_peaks,
        estimated_period,
    }
}
