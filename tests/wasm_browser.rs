//! WASM Browser Tests
//!
//! These tests drive the JavaScript-facing optimizer with real JS callbacks.
//! The JS objective is not thread-safe, so the `parallel` feature must be off.
//!
//! Run with:
//!   wasm-pack test --headless --chrome -- --no-default-features
//!   wasm-pack test --node -- --no-default-features

#![cfg(target_arch = "wasm32")]

use js_sys::Function;
use serde_json::Value;
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

use solar_tilt_ga::wasm::{decode_tilt_angle, encode_tilt_angle, optimize_tilt_angles};

const PARAMS: &str = r#"{"populationSize": 6, "maximumGenerations": 3, "seed": 5}"#;

/// A JS objective returning a constant drives the run to that fitness.
#[wasm_bindgen_test]
fn test_constant_js_objective() {
    let objective = Function::new_with_args("angles", "return 2.5;");
    let json = optimize_tilt_angles(r#"[{"tiltAngle": 10.0}]"#, PARAMS, &objective)
        .expect("optimization should succeed");

    let output: Value = serde_json::from_str(&json).unwrap();
    assert_eq!(output["result"]["finalFitness"], 2.5);
    assert_eq!(output["panels"].as_array().map(Vec::len), Some(1));
}

/// The objective receives one decoded angle per panel.
#[wasm_bindgen_test]
fn test_js_objective_sees_decoded_angles() {
    let objective = Function::new_with_args(
        "angles",
        "if (angles.length !== 2) { throw new Error('wrong length'); } \
         return -Math.abs(angles[0] - 30) - Math.abs(angles[1] + 30);",
    );
    let result = optimize_tilt_angles(r#"[{"tiltAngle": 0.0}, {"tiltAngle": 0.0}]"#, PARAMS, &objective);
    assert!(result.is_ok());
}

/// A non-numeric return value fails the run instead of scoring garbage.
#[wasm_bindgen_test]
fn test_non_numeric_objective_is_rejected() {
    let objective = Function::new_with_args("angles", "return 'bright';");
    let result = optimize_tilt_angles(r#"[{"tiltAngle": 10.0}]"#, PARAMS, &objective);
    assert!(result.is_err());
}

/// A throwing objective fails the run.
#[wasm_bindgen_test]
fn test_throwing_objective_is_rejected() {
    let objective = Function::new_with_args("angles", "throw new Error('backend offline');");
    let result = optimize_tilt_angles(r#"[{"tiltAngle": 10.0}]"#, PARAMS, &objective);
    assert!(result.is_err());
}

/// Panels go in and come out as camelCase JSON, one per input, in range.
#[wasm_bindgen_test]
fn test_panels_json_round_trip() {
    let objective = Function::new_with_args("angles", "return -Math.abs(angles[0] - 20);");
    let input = r#"[{"tiltAngle": -40.0}, {"tiltAngle": 0.0}, {"tiltAngle": 75.0}]"#;
    let json = optimize_tilt_angles(input, PARAMS, &objective).unwrap();

    let output: Value = serde_json::from_str(&json).unwrap();
    let panels = output["panels"].as_array().unwrap();
    assert_eq!(panels.len(), 3);
    for panel in panels {
        let tilt = panel["tiltAngle"].as_f64().unwrap();
        assert!((-90.0..=90.0).contains(&tilt));
    }
    assert_eq!(output["result"]["initialGenes"], serde_json::json!([-40.0, 0.0, 75.0]));
}

/// Malformed inputs are reported, not panicked on.
#[wasm_bindgen_test]
fn test_invalid_json_is_rejected() {
    let objective = Function::new_with_args("angles", "return 0;");
    assert!(optimize_tilt_angles("not json", PARAMS, &objective).is_err());
    assert!(optimize_tilt_angles("[]", r#"{"mutationRate": 2.0}"#, &objective).is_err());
}

#[wasm_bindgen_test]
fn test_tilt_angle_codec_helpers() {
    assert_eq!(encode_tilt_angle(45.0), 0.75);
    assert_eq!(decode_tilt_angle(0.25), -45.0);
    assert_eq!(decode_tilt_angle(encode_tilt_angle(-90.0)), -90.0);
}
