//! Text codecs for the UST and NN project formats
//!
//! Each codec exposes the same surface: `open`/`save` for files and
//! `parse`/`to_string` for in-memory text.

pub mod nn;
pub mod ust;
