//! Conversion utilities: frequency scales and pitch-class naming.

pub(crate) const A4_HZ: f32 = 440.0;

mod frequency;
mod pitch;

pub use frequency::*;
pub use pitch::*;
