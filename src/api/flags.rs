//! Resampler flag operations for the WASM API

use crate::api::helpers::{deserialize, js_error, serialize};
use crate::flag::{self, presets, Flags};
use crate::wasm_log;
use wasm_bindgen::prelude::*;

/// Parse a flag string for a named engine ("resampler" or "moresampler")
///
/// Returns an object of token → number/boolean in the order set.
#[wasm_bindgen(js_name = parseFlags)]
pub fn parse_flags(flags: &str, engine: &str, use_defaults: bool) -> Result<JsValue, JsValue> {
    let schema = presets::by_name(engine)
        .ok_or_else(|| js_error("parseFlags", format!("unknown engine '{}'", engine)))?;
    let parsed = flag::parse(flags, schema, use_defaults);
    wasm_log!("parseFlags: {} -> {} entries", flags, parsed.len());
    serialize(&parsed, "Failed to serialize flags")
}

/// Render a flag map produced by `parseFlags` back to a flag string
#[wasm_bindgen(js_name = serializeFlags)]
pub fn serialize_flags(flags: JsValue) -> Result<String, JsValue> {
    let flags: Flags = deserialize(flags, "Invalid flag map")?;
    Ok(flag::serialize(&flags))
}
