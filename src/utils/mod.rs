mod array;
mod validation;

// Array operations: argmax, fix_length, peak_pick
pub use array::{argmax, fix_length, peak_pick};

// Validation operations
pub use validation::valid_audio;
