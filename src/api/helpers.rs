//! Shared helpers for WASM API operations
//!
//! Console logging, (de)serialization of JS values and error conversion.
//! The browser console is only reachable on wasm32; native builds route the
//! same messages through the `log` facade.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt::Display;
use wasm_bindgen::prelude::*;

// ============================================================================
// Console Logging Functions
// ============================================================================

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = console)]
    fn log(s: &str);

    #[wasm_bindgen(js_namespace = console)]
    fn info(s: &str);

    #[wasm_bindgen(js_namespace = console)]
    fn warn(s: &str);

    #[wasm_bindgen(js_namespace = console)]
    fn error(s: &str);
}

// ============================================================================
// Logging Macros
// ============================================================================

/// Log a debug message with [WASM] prefix
#[macro_export]
macro_rules! wasm_log {
    ($($arg:tt)*) => {
        $crate::api::helpers::log_debug(&format!($($arg)*))
    };
}

/// Log an info message with [WASM] prefix
#[macro_export]
macro_rules! wasm_info {
    ($($arg:tt)*) => {
        $crate::api::helpers::log_info(&format!($($arg)*))
    };
}

/// Log a warning message with [WASM] ⚠️ prefix
#[macro_export]
macro_rules! wasm_warn {
    ($($arg:tt)*) => {
        $crate::api::helpers::log_warn(&format!($($arg)*))
    };
}

/// Log an error message with [WASM] ❌ prefix
#[macro_export]
macro_rules! wasm_error {
    ($($arg:tt)*) => {
        $crate::api::helpers::log_error(&format!($($arg)*))
    };
}

// ============================================================================
// Logging Helper Functions (called by macros)
// ============================================================================

#[cfg(target_arch = "wasm32")]
pub fn log_debug(msg: &str) {
    log(&format!("[WASM] {}", msg));
}

#[cfg(target_arch = "wasm32")]
pub fn log_info(msg: &str) {
    info(&format!("[WASM] {}", msg));
}

#[cfg(target_arch = "wasm32")]
pub fn log_warn(msg: &str) {
    warn(&format!("[WASM] ⚠️ {}", msg));
}

#[cfg(target_arch = "wasm32")]
pub fn log_error(msg: &str) {
    error(&format!("[WASM] ❌ {}", msg));
}

#[cfg(not(target_arch = "wasm32"))]
pub fn log_debug(msg: &str) {
    log::debug!("[WASM] {}", msg);
}

#[cfg(not(target_arch = "wasm32"))]
pub fn log_info(msg: &str) {
    log::info!("[WASM] {}", msg);
}

#[cfg(not(target_arch = "wasm32"))]
pub fn log_warn(msg: &str) {
    log::warn!("[WASM] ⚠️ {}", msg);
}

#[cfg(not(target_arch = "wasm32"))]
pub fn log_error(msg: &str) {
    log::error!("[WASM] ❌ {}", msg);
}

// ============================================================================
// Serialization/Deserialization Helpers
// ============================================================================

/// Deserialize a value from JavaScript with automatic error handling
pub fn deserialize<T: DeserializeOwned>(
    value: JsValue,
    error_context: &str,
) -> Result<T, JsValue> {
    serde_wasm_bindgen::from_value(value).map_err(|e| js_error(error_context, e))
}

/// Serialize a value to JavaScript with automatic error handling
pub fn serialize<T: Serialize>(value: &T, error_context: &str) -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(value).map_err(|e| js_error(error_context, e))
}

// ============================================================================
// Result Conversion Helpers
// ============================================================================

/// Log an error and convert it to a JsValue string
pub fn js_error(context: &str, err: impl Display) -> JsValue {
    let msg = format!("{}: {}", context, err);
    crate::wasm_error!("{}", msg);
    JsValue::from_str(&msg)
}
