//! Configurable simulation runner for the browser.

use lotka_core::analysis::{summarize, TrajectorySummary};
use lotka_core::{
    IntegratorSettings, Method, SimulationError, SimulationLimits, SimulationOutput,
    SimulationRequest,
};
use serde::Serialize;
use serde_wasm_bindgen::Serializer;
use wasm_bindgen::prelude::*;

use crate::js_error;

#[derive(Serialize)]
struct RunResult {
    #[serde(flatten)]
    output: SimulationOutput,
    summary: TrajectorySummary,
}

#[wasm_bindgen]
pub struct WasmSimulator {
    limits: SimulationLimits,
    settings: IntegratorSettings,
}

#[wasm_bindgen]
impl WasmSimulator {
    #[wasm_bindgen(constructor)]
    pub fn new(max_duration: u32, samples: u32, method: &str) -> Result<WasmSimulator, JsValue> {
        console_error_panic_hook::set_once();
        let method: Method = method.parse().map_err(js_error)?;
        Ok(WasmSimulator {
            limits: SimulationLimits {
                max_duration,
                samples: samples as usize,
            },
            settings: IntegratorSettings::with_method(method),
        })
    }

    /// Simulates and returns `{ time, prey, predator, warnings?, summary }`.
    #[allow(clippy::too_many_arguments)]
    pub fn run(
        &self,
        x0: f64,
        y0: f64,
        alpha: f64,
        beta: f64,
        gamma: f64,
        delta: f64,
        duration: u32,
    ) -> Result<JsValue, JsValue> {
        let request = SimulationRequest {
            x0,
            y0,
            alpha,
            beta,
            gamma,
            delta,
            duration,
        };
        let output = self.run_request(&request).map_err(js_error)?;
        let summary = summarize(&output);
        // Flattened fields go through serialize_map, which would otherwise yield a JS Map.
        let serializer = Serializer::new().serialize_maps_as_objects(true);
        RunResult { output, summary }
            .serialize(&serializer)
            .map_err(|e| js_error(format!("Serialization error: {e}")))
    }

    pub fn max_duration(&self) -> u32 {
        self.limits.max_duration
    }

    pub fn samples(&self) -> u32 {
        self.limits.samples as u32
    }
}

impl WasmSimulator {
    pub(crate) fn run_request(
        &self,
        request: &SimulationRequest,
    ) -> Result<SimulationOutput, SimulationError> {
        lotka_core::simulate(request, &self.limits, &self.settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    #[cfg(target_arch = "wasm32")]
    use wasm_bindgen_test::wasm_bindgen_test;

    fn request(duration: u32) -> SimulationRequest {
        SimulationRequest {
            x0: 10.0,
            y0: 5.0,
            alpha: 1.1,
            beta: 0.4,
            gamma: 0.4,
            delta: 0.1,
            duration,
        }
    }

    #[test]
    fn simulator_uses_configured_sample_count() {
        let simulator = WasmSimulator::new(100, 64, "dopri5").expect("simulator");
        let output = simulator.run_request(&request(20)).expect("run");
        assert_eq!(output.time.len(), 64);
        assert_eq!(simulator.samples(), 64);
        assert_eq!(simulator.max_duration(), 100);
    }

    #[test]
    fn simulator_enforces_configured_limit() {
        let simulator = WasmSimulator::new(10, 100, "rk4").expect("simulator");
        let err = simulator.run_request(&request(20)).unwrap_err();
        assert!(err.is_invalid_input());
    }

    #[cfg(target_arch = "wasm32")]
    #[wasm_bindgen_test]
    fn simulator_rejects_unknown_method() {
        assert!(WasmSimulator::new(10, 100, "euler").is_err());
    }
}
