//! Spectral features: mel spectrogram and chromagram.

pub mod chroma;
pub mod mel;

pub use chroma::{chroma_filterbank, chroma_from_power, chroma_stft};
pub use mel::{mel_filterbank, melspectrogram_from_power};
