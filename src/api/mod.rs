//! WASM API
//!
//! JavaScript-facing entry points. Project files cross the boundary as raw
//! bytes or text; parsed models and flag maps cross as plain JS objects via
//! `serde-wasm-bindgen`.
//!
//! - `helpers`: console logging, serde bridging, error conversion
//! - `convert`: format conversion and MIDI export
//! - `flags`: resampler flag parsing

pub mod convert;
pub mod flags;
pub mod helpers;

pub use convert::{nn_to_midi, nn_to_ust, open_nn, open_ust, quantize_ust, ust_to_midi, ust_to_nn};
pub use flags::{parse_flags, serialize_flags};
