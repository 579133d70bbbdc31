//! UTAU / NN Project WASM Module
//!
//! Reads and writes UTAU `.ust` and NN (`.nn`) singing-synthesis projects,
//! converts between them, and exports either one as a Standard MIDI File or
//! a key-aware score stream. Also parses resampler flag strings.

pub mod api;
pub mod codec;
pub mod converters;
pub mod defaults;
pub mod error;
pub mod flag;
pub mod models;

// Re-export commonly used types
pub use error::{Result, UtauError};
pub use flag::{FlagValue, Flags};
pub use models::{Curve, NnNote, NnProject, Properties, UstNote, UstProject, Value};

use wasm_bindgen::prelude::*;

// This is like the `main` function, but for WASM modules.
#[wasm_bindgen(start)]
pub fn main() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();

    // Fails only when a logger is already installed
    #[cfg(feature = "console_log")]
    let _ = console_log::init_with_level(log::Level::Debug);

    log::info!("utaufile WASM module initialized");
}
