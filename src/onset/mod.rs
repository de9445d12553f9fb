pub mod detect;
pub mod strength;

pub use detect::{OnsetDetectConfig, onset_detect, onset_detect_envelope};
pub use strength::{onset_strength, onset_strength_from_power};
