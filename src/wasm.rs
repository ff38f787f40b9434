//! WASM bindings for browser integration.
//!
//! The browser supplies the objective as a JavaScript callback, which cannot
//! be shared across threads. Build with `--no-default-features` for wasm32.

#![cfg(target_arch = "wasm32")]

#[cfg(feature = "parallel")]
compile_error!("the `parallel` feature is not supported on wasm32; build with --no-default-features");

use js_sys::{Float64Array, Function};
use serde::Serialize;
use wasm_bindgen::prelude::*;

use crate::optimization::{
    CancellationFlag, GaParameters, GeneCodec, ObjectiveFunction, OptimizationResult,
    SolarPanelTiltAngleOptimizer, TiltAngleCodec,
};
use crate::site::SolarPanel;

/// Initialize panic hook for better error messages in browser console.
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

/// Objective that calls back into JavaScript with a `Float64Array` of tilts.
struct JsObjective {
    function: Function,
    cancelled: CancellationFlag,
}

impl ObjectiveFunction for JsObjective {
    fn compute(&self, parameters: &[f64]) -> anyhow::Result<f64> {
        let angles = Float64Array::from(parameters);
        let value = self
            .function
            .call1(&JsValue::NULL, &angles)
            .map_err(|e| anyhow::anyhow!("objective threw: {:?}", e))?;
        value
            .as_f64()
            .ok_or_else(|| anyhow::anyhow!("objective must return a number, got {:?}", value))
    }

    fn cancel(&self) {
        self.cancelled.cancel();
    }

    fn is_cancelled(&self) -> bool {
        self.cancelled.is_cancelled()
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TiltOptimization {
    panels: Vec<SolarPanel>,
    result: OptimizationResult,
}

/// Optimize the tilt angles of a set of panels.
///
/// # Arguments
/// * `panels_json` - JSON array of panels: `[{"tiltAngle": 10.0}, ...]`
/// * `params_json` - JSON object of GA parameters, camelCase; missing fields use defaults
/// * `objective` - `(angles: Float64Array) => number`, larger is better
///
/// # Returns
/// JSON object `{"panels": [...], "result": {...}}` with the optimized panels
#[wasm_bindgen]
pub fn optimize_tilt_angles(
    panels_json: &str,
    params_json: &str,
    objective: &Function,
) -> Result<String, JsValue> {
    let mut panels: Vec<SolarPanel> = serde_json::from_str(panels_json)
        .map_err(|e| JsValue::from_str(&format!("Invalid panels JSON: {}", e)))?;
    let mut params = GaParameters::from_json(params_json)
        .map_err(|e| JsValue::from_str(&format!("Invalid parameters: {}", e)))?;
    // std::time::Instant is unavailable in the browser.
    params.time_limit_ms = None;

    let objective = JsObjective {
        function: objective.clone(),
        cancelled: CancellationFlag::new(),
    };

    let result = SolarPanelTiltAngleOptimizer::tilt_angles(&mut panels, objective, params)
        .and_then(|mut optimizer| optimizer.evolve())
        .map_err(|e| JsValue::from_str(&e.to_string()))?;

    serde_json::to_string(&TiltOptimization { panels, result })
        .map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
}

/// Convert a tilt angle in degrees to its gene in [0, 1].
#[wasm_bindgen]
pub fn encode_tilt_angle(angle: f64) -> f64 {
    TiltAngleCodec.encode(angle)
}

/// Convert a gene in [0, 1] to a tilt angle in degrees.
#[wasm_bindgen]
pub fn decode_tilt_angle(gene: f64) -> f64 {
    TiltAngleCodec.decode(gene)
}
