use serde::Serialize;
use serde_json::json;
use serde_wasm_bindgen as swb;
use wasm_bindgen::prelude::*;

use handpose_core::{ControllerConfig, HandController, HandError, Preset};

#[wasm_bindgen]
pub struct HandPose {
    core: HandController,
}

fn jsvalue_is_undefined_or_null(v: &JsValue) -> bool {
    v.is_undefined() || v.is_null()
}

fn hand_error(e: HandError) -> JsError {
    JsError::new(&format!("{}: {e}", e.category()))
}

/// Plain JS objects and arrays rather than `Map`s.
fn to_js<T: Serialize + ?Sized>(value: &T, what: &str) -> Result<JsValue, JsError> {
    value
        .serialize(&swb::Serializer::json_compatible())
        .map_err(|e| JsError::new(&format!("{what} error: {e}")))
}

#[wasm_bindgen]
impl HandPose {
    /// Create a hand controller. Pass a config object or undefined/null for defaults.
    /// Example:
    ///   new HandPose({ rig: { finger_count: 5, thumb: null } })
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue) -> Result<HandPose, JsError> {
        console_error_panic_hook::set_once();

        let cfg: ControllerConfig = if jsvalue_is_undefined_or_null(&config) {
            ControllerConfig::default()
        } else {
            swb::from_value(config).map_err(|e| JsError::new(&format!("config error: {e}")))?
        };
        let core = HandController::new(cfg).map_err(hand_error)?;
        Ok(HandPose { core })
    }

    /// Start a preset by name at `now_ms`. Returns `{ preset, runs, delayed_until_ms }`.
    #[wasm_bindgen(js_name = dispatch_preset)]
    pub fn dispatch_preset(&mut self, name: &str, now_ms: f64) -> Result<JsValue, JsError> {
        let receipts = self
            .core
            .dispatch_preset(name, now_ms)
            .map_err(hand_error)?;
        let runs: Vec<_> = receipts
            .immediate
            .iter()
            .map(|r| {
                json!({
                    "run": r.run.0,
                    "axes": r.axes,
                    "rejected": r.rejected.iter().map(|e| e.to_string()).collect::<Vec<_>>(),
                })
            })
            .collect();
        to_js(
            &json!({
                "preset": receipts.preset.name(),
                "runs": runs,
                "delayed_until_ms": receipts.delayed_until_ms,
            }),
            "dispatch",
        )
    }

    /// Advance to `now_ms`. Returns `{ changes, events }` for this frame.
    #[wasm_bindgen]
    pub fn tick(&mut self, now_ms: f64) -> Result<JsValue, JsError> {
        let out = self.core.tick(now_ms).map_err(hand_error)?;
        to_js(out, "outputs")
    }

    /// Current value of an axis path such as `finger[0].base.x`.
    #[wasm_bindgen(js_name = get_rotation)]
    pub fn get_rotation(&self, path: &str) -> Result<f32, JsError> {
        self.core.get_rotation_at(path).map_err(hand_error)
    }

    /// Manual override; returns the stored (clamped) value.
    #[wasm_bindgen(js_name = set_rotation)]
    pub fn set_rotation(&mut self, path: &str, value: f32) -> Result<f32, JsError> {
        self.core.set_rotation_at(path, value).map_err(hand_error)
    }

    /// `[min, max]` of an axis path.
    #[wasm_bindgen(js_name = get_range)]
    pub fn get_range(&self, path: &str) -> Result<Vec<f32>, JsError> {
        let range = self.core.get_range_at(path).map_err(hand_error)?;
        Ok(vec![range.min, range.max])
    }

    #[wasm_bindgen(js_name = axis_paths)]
    pub fn axis_paths(&self) -> Vec<String> {
        let rig = self.core.rig();
        rig.axes()
            .into_iter()
            .filter_map(|key| rig.axis_path(key))
            .collect()
    }

    #[wasm_bindgen(js_name = preset_names)]
    pub fn preset_names(&self) -> Vec<String> {
        Preset::ALL.iter().map(|p| p.name().to_string()).collect()
    }

    /// Every axis path mapped to its current value.
    #[wasm_bindgen]
    pub fn snapshot(&self) -> Result<JsValue, JsError> {
        to_js(&self.core.rig().snapshot(), "snapshot")
    }

    #[wasm_bindgen(js_name = is_idle)]
    pub fn is_idle(&self) -> bool {
        self.core.is_idle()
    }
}

#[wasm_bindgen]
pub fn abi_version() -> u32 {
    1
}
