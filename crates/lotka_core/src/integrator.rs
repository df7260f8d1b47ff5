//! Sampled integration of the predator-prey initial value problem.
//!
//! The reported samples are `N` evenly spaced times over `[0, T]`. Between two
//! samples the state is advanced either by RK4 micro-steps sized to the local
//! Jacobian norm or by an adaptive Dormand-Prince 5(4) controller, so the accuracy
//! depends neither on how densely the caller samples nor on the rate constants.
//!
//! Any non-finite derivative or state aborts the run with
//! [`SimulationError::NumericalDivergence`]. Negative populations are allowed and
//! reported as [`TrajectoryWarning`]s.

use std::cell::Cell;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{Constraint, DivergenceCause, Field, ParameterViolation, SimulationError};
use crate::model::{LotkaVolterra, ModelParameters, State};
use crate::solvers::{Dopri5, RK4};
use crate::traits::{DynamicalSystem, EmbeddedStepper, Steppable};

/// Stepping algorithm used between sample points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Method {
    /// Fixed-step classical Runge-Kutta, global error O(h^4).
    #[default]
    Rk4,
    /// Adaptive Dormand-Prince 5(4) with local error control.
    Dopri5,
}

impl FromStr for Method {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "rk4" => Ok(Method::Rk4),
            "dopri5" | "rk45" => Ok(Method::Dopri5),
            other => Err(format!("Unknown integration method '{other}'.")),
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Method::Rk4 => f.write_str("rk4"),
            Method::Dopri5 => f.write_str("dopri5"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IntegratorSettings {
    pub method: Method,
    /// Lower bound on RK4 micro-steps per sample interval.
    pub min_substeps: usize,
    /// Upper bound on the RK4 micro-step size.
    pub max_step: f64,
    /// RK4 steps are further capped at `step_fraction / |J|`, with `|J|` the
    /// Jacobian norm at the current state.
    pub step_fraction: f64,
    /// Relative tolerance of the adaptive controller.
    pub rtol: f64,
    /// Absolute tolerance of the adaptive controller.
    pub atol: f64,
    /// Maximum number of step attempts per run, across all intervals.
    pub max_steps: usize,
}

impl Default for IntegratorSettings {
    fn default() -> Self {
        Self {
            method: Method::Rk4,
            min_substeps: 8,
            max_step: 0.01,
            step_fraction: 0.05,
            rtol: 1e-9,
            atol: 1e-12,
            max_steps: 2_000_000,
        }
    }
}

impl IntegratorSettings {
    pub fn with_method(method: Method) -> Self {
        Self {
            method,
            ..Self::default()
        }
    }

    /// Largest RK4 micro-step allowed inside an interval of length `span` when
    /// the local Jacobian norm is `rate_bound`.
    pub fn step_cap(&self, span: f64, rate_bound: f64) -> f64 {
        let mut h = span / self.min_substeps.max(1) as f64;
        if self.max_step > 0.0 && self.max_step.is_finite() {
            h = h.min(self.max_step);
        }
        if self.step_fraction > 0.0 && rate_bound > 0.0 {
            h = h.min(self.step_fraction / rate_bound);
        }
        h
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Species {
    Prey,
    Predator,
}

/// Non-fatal signals raised while sampling.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TrajectoryWarning {
    /// First sample at which a species dropped below zero.
    NegativePopulation {
        species: Species,
        time: f64,
        value: f64,
    },
}

/// Sampled solution. Built once by the integrator and read-only afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Trajectory {
    times: Vec<f64>,
    states: Vec<State>,
    warnings: Vec<TrajectoryWarning>,
}

impl Trajectory {
    pub fn times(&self) -> &[f64] {
        &self.times
    }

    pub fn states(&self) -> &[State] {
        &self.states
    }

    pub fn warnings(&self) -> &[TrajectoryWarning] {
        &self.warnings
    }

    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    pub fn prey(&self) -> Vec<f64> {
        self.states.iter().map(|s| s.prey).collect()
    }

    pub fn predator(&self) -> Vec<f64> {
        self.states.iter().map(|s| s.predator).collect()
    }

    pub fn into_parts(self) -> (Vec<f64>, Vec<State>, Vec<TrajectoryWarning>) {
        (self.times, self.states, self.warnings)
    }
}

/// `samples` evenly spaced times over `[0, duration]`, with the last one exactly `duration`.
pub fn sample_times(duration: f64, samples: usize) -> Vec<f64> {
    match samples {
        0 => Vec::new(),
        1 => vec![0.0],
        n => {
            let last = n - 1;
            (0..n)
                .map(|i| {
                    if i == last {
                        duration
                    } else {
                        duration * i as f64 / last as f64
                    }
                })
                .collect()
        }
    }
}

/// Integrates with [`IntegratorSettings::default`].
pub fn integrate(
    initial: State,
    params: &ModelParameters,
    duration: f64,
    samples: usize,
) -> Result<Trajectory, SimulationError> {
    integrate_with(initial, params, duration, samples, &IntegratorSettings::default())
}

pub fn integrate_with(
    initial: State,
    params: &ModelParameters,
    duration: f64,
    samples: usize,
    settings: &IntegratorSettings,
) -> Result<Trajectory, SimulationError> {
    if samples == 0 {
        return Err(
            ParameterViolation::new(Field::Samples, Constraint::TooFewSamples { min: 1 }).into(),
        );
    }
    if !duration.is_finite() {
        return Err(ParameterViolation::new(Field::Duration, Constraint::NotFinite).into());
    }
    if duration <= 0.0 {
        return Err(ParameterViolation::new(Field::Duration, Constraint::NotPositive).into());
    }
    if !initial.prey.is_finite() {
        return Err(ParameterViolation::new(Field::InitialPrey, Constraint::NotFinite).into());
    }
    if !initial.predator.is_finite() {
        return Err(ParameterViolation::new(Field::InitialPredator, Constraint::NotFinite).into());
    }

    let times = sample_times(duration, samples);
    let system = LotkaVolterra::new(*params);
    debug!(
        method = %settings.method,
        samples,
        duration,
        "Integrating predator-prey system"
    );

    let raw = sample_system(&system, initial.to_array(), &times, settings).inspect_err(|err| {
        warn!(error = %err, "Integration aborted");
    })?;

    let states: Vec<State> = raw.iter().map(|s| State::new(s[0], s[1])).collect();
    let warnings = collect_warnings(&times, &states);
    for warning in &warnings {
        warn!(?warning, "Population went negative");
    }

    Ok(Trajectory {
        times,
        states,
        warnings,
    })
}

fn collect_warnings(times: &[f64], states: &[State]) -> Vec<TrajectoryWarning> {
    let mut warnings = Vec::new();
    let first_negative = |pick: fn(&State) -> f64| {
        times
            .iter()
            .zip(states)
            .map(|(&t, s)| (t, pick(s)))
            .find(|&(_, v)| v < 0.0)
    };
    if let Some((time, value)) = first_negative(|s| s.prey) {
        warnings.push(TrajectoryWarning::NegativePopulation {
            species: Species::Prey,
            time,
            value,
        });
    }
    if let Some((time, value)) = first_negative(|s| s.predator) {
        warnings.push(TrajectoryWarning::NegativePopulation {
            species: Species::Predator,
            time,
            value,
        });
    }
    warnings
}

/// Wraps a system and remembers the first time its vector field went non-finite.
struct Watched<'a, S> {
    inner: &'a S,
    tripped: Cell<Option<f64>>,
}

impl<'a, S: DynamicalSystem<f64>> Watched<'a, S> {
    fn new(inner: &'a S) -> Self {
        Self {
            inner,
            tripped: Cell::new(None),
        }
    }

    fn check(&self) -> Result<(), SimulationError> {
        match self.tripped.get() {
            Some(time) => Err(SimulationError::NumericalDivergence {
                time,
                cause: DivergenceCause::NonFiniteDerivative,
            }),
            None => Ok(()),
        }
    }
}

impl<S: DynamicalSystem<f64>> DynamicalSystem<f64> for Watched<'_, S> {
    fn dimension(&self) -> usize {
        self.inner.dimension()
    }

    fn apply(&self, t: f64, x: &[f64], out: &mut [f64]) {
        self.inner.apply(t, x, out);
        if self.tripped.get().is_none() && out.iter().any(|v| !v.is_finite()) {
            self.tripped.set(Some(t));
        }
    }

    fn rate_bound(&self, t: f64, x: &[f64]) -> f64 {
        self.inner.rate_bound(t, x)
    }
}

fn check_state(time: f64, state: &[f64]) -> Result<(), SimulationError> {
    if state.iter().all(|v| v.is_finite()) {
        Ok(())
    } else {
        Err(SimulationError::NumericalDivergence {
            time,
            cause: DivergenceCause::NonFiniteState,
        })
    }
}

/// Advances `system` from `times[0]` and records the state at every entry of `times`.
pub(crate) fn sample_system<S, const D: usize>(
    system: &S,
    initial: [f64; D],
    times: &[f64],
    settings: &IntegratorSettings,
) -> Result<Vec<[f64; D]>, SimulationError>
where
    S: DynamicalSystem<f64>,
{
    let watched = Watched::new(system);
    let mut out = Vec::with_capacity(times.len());
    let mut state = initial;
    out.push(state);

    let mut budget = Budget::new(settings.max_steps);
    match settings.method {
        Method::Rk4 => {
            let mut solver: RK4<f64> = RK4::new(D);
            for window in times.windows(2) {
                let (start, end) = (window[0], window[1]);
                let mut t = start;
                while t < end {
                    // Re-split the rest of the interval into equal steps under the local cap,
                    // so the last one lands exactly on `end`.
                    let remaining = end - t;
                    let cap = settings.step_cap(end - start, watched.rate_bound(t, &state));
                    let count = (remaining / cap).ceil().max(1.0);
                    let last = count <= 1.0;
                    let dt = remaining / count;

                    budget.spend(t)?;
                    let from = t;
                    solver.step(&watched, &mut t, &mut state[..], dt);
                    if last {
                        t = end;
                    }
                    watched.check()?;
                    check_state(t, &state)?;
                    if !last && !(dt > 16.0 * f64::EPSILON * from.abs().max(1.0)) {
                        return Err(SimulationError::NumericalDivergence {
                            time: from,
                            cause: DivergenceCause::StepSizeUnderflow,
                        });
                    }
                }
                out.push(state);
            }
        }
        Method::Dopri5 => {
            let mut solver: Dopri5<f64> = Dopri5::new(D);
            let mut controller = Controller::new(settings, times.last().copied().unwrap_or(0.0));
            for window in times.windows(2) {
                controller.advance(
                    &mut solver,
                    &watched,
                    window[0],
                    window[1],
                    &mut state,
                    &mut budget,
                )?;
                out.push(state);
            }
        }
    }
    Ok(out)
}

struct Budget {
    remaining: usize,
}

impl Budget {
    fn new(max_steps: usize) -> Self {
        Self {
            remaining: max_steps,
        }
    }

    fn spend(&mut self, time: f64) -> Result<(), SimulationError> {
        if self.remaining == 0 {
            return Err(SimulationError::NumericalDivergence {
                time,
                cause: DivergenceCause::StepBudgetExhausted,
            });
        }
        self.remaining -= 1;
        Ok(())
    }
}

const SAFETY: f64 = 0.9;
const MIN_FACTOR: f64 = 0.2;
const MAX_FACTOR: f64 = 5.0;

/// Step-size controller for the embedded pair. Keeps the last accepted step
/// size so consecutive sample intervals start from a good guess.
struct Controller {
    h: f64,
    rtol: f64,
    atol: f64,
}

impl Controller {
    fn new(settings: &IntegratorSettings, horizon: f64) -> Self {
        let h = if settings.max_step > 0.0 && settings.max_step.is_finite() {
            settings.max_step
        } else {
            horizon.abs().max(1.0) * 1e-3
        };
        Self {
            h,
            rtol: settings.rtol,
            atol: settings.atol,
        }
    }

    fn advance<S, const D: usize>(
        &mut self,
        solver: &mut Dopri5<f64>,
        system: &Watched<'_, S>,
        start: f64,
        end: f64,
        state: &mut [f64; D],
        budget: &mut Budget,
    ) -> Result<(), SimulationError>
    where
        S: DynamicalSystem<f64>,
    {
        let exponent = -1.0 / f64::from(solver.order());
        let mut t = start;
        let mut candidate = [0.0; D];

        while t < end {
            let remaining = end - t;
            let last = self.h >= remaining;
            let h = if last { remaining } else { self.h };
            let min_h = 16.0 * f64::EPSILON * t.abs().max(1.0);
            if h < min_h && !last {
                return Err(SimulationError::NumericalDivergence {
                    time: t,
                    cause: DivergenceCause::StepSizeUnderflow,
                });
            }

            budget.spend(t)?;
            let err = solver.attempt(
                system,
                t,
                &state[..],
                h,
                self.rtol,
                self.atol,
                &mut candidate[..],
            );
            system.check()?;

            if err.is_finite() && err <= 1.0 {
                check_state(t + h, &candidate)?;
                *state = candidate;
                t = if last { end } else { t + h };
                let factor = if err == 0.0 {
                    MAX_FACTOR
                } else {
                    (SAFETY * err.powf(exponent)).clamp(MIN_FACTOR, MAX_FACTOR)
                };
                // Clipped final steps say little about the natural step size.
                if !last || factor < 1.0 {
                    self.h = h * factor;
                }
            } else {
                let factor = if err.is_finite() {
                    (SAFETY * err.powf(exponent)).clamp(MIN_FACTOR, 1.0)
                } else {
                    MIN_FACTOR
                };
                self.h = h * factor;
                if self.h < min_h {
                    return Err(SimulationError::NumericalDivergence {
                        time: t,
                        cause: DivergenceCause::StepSizeUnderflow,
                    });
                }
            }
        }
        Ok(())
    }
}
