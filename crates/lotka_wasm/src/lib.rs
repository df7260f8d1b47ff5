//! Browser bindings for the Lotka simulator.
//!
//! Free functions cover the one-shot request/response flow; [`WasmSimulator`]
//! keeps limits and integrator settings between runs and [`WasmSystem`] exposes
//! manual stepping for interactive phase-plane views.

mod simulator;
mod system;

pub use simulator::WasmSimulator;
pub use system::WasmSystem;

use lotka_core::analysis::analyze_fixed_points;
use lotka_core::info;
use lotka_core::{IntegratorSettings, ModelParameters, SimulationLimits, SimulationRequest};
use serde_wasm_bindgen::{from_value, to_value};
use wasm_bindgen::prelude::*;

pub(crate) fn js_error(message: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&message.to_string())
}

/// Runs one simulation with default limits; `request` is a plain JS object
/// `{ x0, y0, alpha, beta, gamma, delta, T }`.
#[wasm_bindgen]
pub fn simulate(request: JsValue) -> Result<JsValue, JsValue> {
    console_error_panic_hook::set_once();
    let request: SimulationRequest =
        from_value(request).map_err(|e| js_error(format!("Malformed request: {e}")))?;
    let output = lotka_core::simulate(
        &request,
        &SimulationLimits::default(),
        &IntegratorSettings::default(),
    )
    .map_err(js_error)?;
    to_value(&output).map_err(|e| js_error(format!("Serialization error: {e}")))
}

#[wasm_bindgen]
pub fn model_info() -> Result<JsValue, JsValue> {
    to_value(&info::model_info()).map_err(|e| js_error(format!("Serialization error: {e}")))
}

#[wasm_bindgen]
pub fn analyze_equilibrium(alpha: f64, beta: f64, gamma: f64, delta: f64) -> Result<JsValue, JsValue> {
    let params = ModelParameters::new(alpha, beta, gamma, delta);
    let points = analyze_fixed_points(&params)
        .map_err(|e| js_error(format!("Equilibrium analysis failed: {e}")))?;
    to_value(&points).map_err(|e| js_error(format!("Serialization error: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    #[cfg(target_arch = "wasm32")]
    use wasm_bindgen_test::wasm_bindgen_test;

    #[test]
    fn bridge_reexports_are_wired() {
        assert!(std::any::type_name::<WasmSimulator>().ends_with("WasmSimulator"));
        assert!(std::any::type_name::<WasmSystem>().ends_with("WasmSystem"));
    }

    #[cfg(target_arch = "wasm32")]
    #[wasm_bindgen_test]
    fn simulate_rejects_malformed_request() {
        let result = simulate(JsValue::from_str("not a request"));
        assert!(result.is_err(), "expected malformed request error");
    }

    #[cfg(target_arch = "wasm32")]
    #[wasm_bindgen_test]
    fn model_info_serializes() {
        assert!(model_info().is_ok());
    }
}
