//! Models module
//!
//! In-memory representations of UST and NN projects, plus the typed
//! property values both formats share.

pub mod nn;
pub mod pitch;
pub mod properties;
pub mod tonic;
pub mod ust;
pub mod value;

// Re-export commonly used types
pub use nn::{Curve, NnNote, NnProject};
pub use pitch::note_name;
pub use properties::Properties;
pub use tonic::{Key, Mode, Tonic};
pub use ust::{UstNote, UstProject};
pub use value::{Value, ValueKind};
