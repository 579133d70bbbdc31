//! Conversion operations for the WASM API
//!
//! - UST → NN and NN → UST as text
//! - UST / NN → Standard MIDI File bytes
//! - parsed projects as JS objects for inspection

use crate::api::helpers::{js_error, serialize};
use crate::codec;
use crate::converters::midi;
use crate::{wasm_info, wasm_log};
use wasm_bindgen::prelude::*;

/// Parse a UST file and return the project as a JS object
#[wasm_bindgen(js_name = openUst)]
pub fn open_ust(bytes: &[u8]) -> Result<JsValue, JsValue> {
    let ust = codec::ust::parse(bytes).map_err(|e| js_error("UST parse error", e))?;
    wasm_log!("openUst: {} notes", ust.notes.len());
    serialize(&ust, "Failed to serialize UST project")
}

/// Parse an NN file and return the project as a JS object
#[wasm_bindgen(js_name = openNn)]
pub fn open_nn(text: &str) -> Result<JsValue, JsValue> {
    let nn = codec::nn::parse(text).map_err(|e| js_error("NN parse error", e))?;
    wasm_log!("openNn: {} notes", nn.notes.len());
    serialize(&nn, "Failed to serialize NN project")
}

/// Convert UST bytes to NN text
#[wasm_bindgen(js_name = ustToNn)]
pub fn ust_to_nn(bytes: &[u8]) -> Result<String, JsValue> {
    wasm_info!("ustToNn called ({} bytes)", bytes.len());
    let ust = codec::ust::parse(bytes).map_err(|e| js_error("UST parse error", e))?;
    let nn = ust.to_nn().map_err(|e| js_error("UST to NN error", e))?;
    codec::nn::to_string(&nn).map_err(|e| js_error("NN export error", e))
}

/// Convert NN text to UST text
///
/// `use_text` picks the ideographic text as lyric instead of the reading.
#[wasm_bindgen(js_name = nnToUst)]
pub fn nn_to_ust(text: &str, use_text: bool) -> Result<String, JsValue> {
    wasm_info!("nnToUst called (use_text={})", use_text);
    let nn = codec::nn::parse(text).map_err(|e| js_error("NN parse error", e))?;
    let ust = nn.to_ust(use_text).map_err(|e| js_error("NN to UST error", e))?;
    Ok(codec::ust::to_string(&ust))
}

/// Snap every note boundary of a UST file to `grid` ticks
#[wasm_bindgen(js_name = quantizeUst)]
pub fn quantize_ust(bytes: &[u8], grid: u32) -> Result<String, JsValue> {
    let mut ust = codec::ust::parse(bytes).map_err(|e| js_error("UST parse error", e))?;
    ust.quantize(grid);
    Ok(codec::ust::to_string(&ust))
}

/// Export UST bytes as a Standard MIDI File
#[wasm_bindgen(js_name = ustToMidi)]
pub fn ust_to_midi(bytes: &[u8]) -> Result<Vec<u8>, JsValue> {
    let ust = codec::ust::parse(bytes).map_err(|e| js_error("UST parse error", e))?;
    let smf = midi::ust_to_midi(&ust).map_err(|e| js_error("MIDI export error", e))?;
    wasm_info!("ustToMidi: {} bytes", smf.len());
    Ok(smf)
}

/// Export NN text as a Standard MIDI File
#[wasm_bindgen(js_name = nnToMidi)]
pub fn nn_to_midi(text: &str, use_text: bool) -> Result<Vec<u8>, JsValue> {
    let nn = codec::nn::parse(text).map_err(|e| js_error("NN parse error", e))?;
    let smf = midi::nn_to_midi(&nn, use_text).map_err(|e| js_error("MIDI export error", e))?;
    wasm_info!("nnToMidi: {} bytes", smf.len());
    Ok(smf)
}
