//! Manual stepping of the predator-prey vector field.

use lotka_core::model::{conserved_quantity, jacobian, LotkaVolterra, ModelParameters, State};
use lotka_core::solvers::{Dopri5, RK4};
use lotka_core::traits::Steppable;
use wasm_bindgen::prelude::*;

use crate::js_error;

#[wasm_bindgen]
pub struct WasmSystem {
    system: LotkaVolterra,
    state: Vec<f64>,
    t: f64,
    pub(crate) solver: SolverType,
}

pub(crate) enum SolverType {
    RK4(RK4<f64>),
    Dopri5(Dopri5<f64>),
}

impl SolverType {
    pub(crate) fn from_name(name: &str) -> Option<Self> {
        match name {
            "rk4" => Some(SolverType::RK4(RK4::new(State::DIM))),
            "dopri5" => Some(SolverType::Dopri5(Dopri5::new(State::DIM))),
            _ => None,
        }
    }
}

#[wasm_bindgen]
impl WasmSystem {
    #[wasm_bindgen(constructor)]
    pub fn new(
        alpha: f64,
        beta: f64,
        gamma: f64,
        delta: f64,
        solver_name: &str,
    ) -> Result<WasmSystem, JsValue> {
        console_error_panic_hook::set_once();

        let solver = SolverType::from_name(solver_name).ok_or_else(|| js_error("Unknown solver"))?;

        Ok(WasmSystem {
            system: LotkaVolterra::new(ModelParameters::new(alpha, beta, gamma, delta)),
            state: vec![0.0; State::DIM],
            t: 0.0,
            solver,
        })
    }

    pub fn set_state(&mut self, state: &[f64]) -> Result<(), JsValue> {
        if state.len() != State::DIM {
            return Err(js_error(format!(
                "State must have {} entries, got {}.",
                State::DIM,
                state.len()
            )));
        }
        self.state = state.to_vec();
        Ok(())
    }

    pub fn get_state(&self) -> Vec<f64> {
        self.state.clone()
    }

    pub fn set_t(&mut self, t: f64) {
        self.t = t;
    }

    pub fn get_t(&self) -> f64 {
        self.t
    }

    /// Advances by one step of size `dt`. A non-finite result is rejected and the
    /// previous state is kept.
    pub fn step(&mut self, dt: f64) -> Result<(), JsValue> {
        let mut next = self.state.clone();
        let mut t = self.t;
        match &mut self.solver {
            SolverType::RK4(s) => s.step(&self.system, &mut t, &mut next, dt),
            SolverType::Dopri5(s) => s.step(&self.system, &mut t, &mut next, dt),
        }
        if next.iter().any(|v| !v.is_finite()) {
            return Err(js_error(format!(
                "Numerical divergence at t = {}: state became non-finite",
                self.t
            )));
        }
        self.state = next;
        self.t = t;
        Ok(())
    }

    pub fn compute_jacobian(&self) -> Vec<f64> {
        jacobian(self.current(), self.system.params()).to_vec()
    }

    /// Value of the Lotka-Volterra invariant at the current state (NaN off the positive quadrant).
    pub fn conserved_quantity(&self) -> f64 {
        conserved_quantity(self.current(), self.system.params())
    }
}

impl WasmSystem {
    fn current(&self) -> State {
        State::new(self.state[0], self.state[1])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    #[cfg(target_arch = "wasm32")]
    use wasm_bindgen_test::wasm_bindgen_test;

    fn classic(solver: &str) -> WasmSystem {
        WasmSystem::new(1.1, 0.4, 0.4, 0.1, solver).expect("system should build")
    }

    #[test]
    fn wasm_system_step_advances_state_and_time() {
        let mut system = classic("rk4");
        system.set_state(&[10.0, 5.0]).expect("state");
        system.set_t(0.0);
        system.step(0.01).expect("step");

        let state = system.get_state();
        assert!((system.get_t() - 0.01).abs() < 1e-12);
        // dx/dt = -9 and dy/dt = 3 at the start.
        assert!((state[0] - (10.0 - 0.09)).abs() < 1e-3);
        assert!((state[1] - (5.0 + 0.03)).abs() < 1e-3);
    }

    #[test]
    fn wasm_system_solvers_agree_on_short_run() {
        let mut rk4 = classic("rk4");
        let mut dopri = classic("dopri5");
        for system in [&mut rk4, &mut dopri] {
            system.set_state(&[10.0, 5.0]).expect("state");
            for _ in 0..100 {
                system.step(0.01).expect("step");
            }
        }
        let (a, b) = (rk4.get_state(), dopri.get_state());
        assert!((a[0] - b[0]).abs() < 1e-6);
        assert!((a[1] - b[1]).abs() < 1e-6);
    }

    #[test]
    fn wasm_system_preserves_invariant() {
        let mut system = classic("rk4");
        system.set_state(&[10.0, 5.0]).expect("state");
        let v0 = system.conserved_quantity();
        for _ in 0..1000 {
            system.step(0.01).expect("step");
        }
        assert!(((system.conserved_quantity() - v0) / v0).abs() < 1e-6);
    }

    #[test]
    fn wasm_system_compute_jacobian_matches_rate_law() {
        let mut system = classic("rk4");
        system.set_state(&[4.0, 2.75]).expect("state");
        let jacobian = system.compute_jacobian();
        assert_eq!(jacobian.len(), 4);
        assert!(jacobian[0].abs() < 1e-12);
        assert!((jacobian[1] + 1.6).abs() < 1e-12);
        assert!((jacobian[2] - 0.275).abs() < 1e-12);
        assert!(jacobian[3].abs() < 1e-12);
    }

    #[test]
    fn wasm_system_get_state_returns_copy() {
        let mut system = classic("rk4");
        system.set_state(&[1.0, 2.0]).expect("state");
        let mut snapshot = system.get_state();
        snapshot[0] = 9.0;

        assert_eq!(system.get_state(), vec![1.0, 2.0]);
    }

    #[test]
    fn solver_names_resolve() {
        assert!(matches!(SolverType::from_name("rk4"), Some(SolverType::RK4(_))));
        assert!(matches!(
            SolverType::from_name("dopri5"),
            Some(SolverType::Dopri5(_))
        ));
        assert!(SolverType::from_name("nope").is_none());
    }

    #[cfg(target_arch = "wasm32")]
    #[wasm_bindgen_test]
    fn wasm_system_rejects_unknown_solver() {
        let result = WasmSystem::new(1.0, 1.0, 1.0, 1.0, "nope");
        assert!(result.is_err(), "expected unknown solver error");
    }

    #[cfg(target_arch = "wasm32")]
    #[wasm_bindgen_test]
    fn wasm_system_rejects_overflowing_step() {
        let mut system = classic("rk4");
        system.set_state(&[1e200, 1e200]).expect("state");
        assert!(system.step(0.1).is_err());
        assert_eq!(system.get_state(), vec![1e200, 1e200]);
    }
}
