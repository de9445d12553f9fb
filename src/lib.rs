//! Guitar recording to fretboard tablature.
//!
//! fretscribe decodes a recording, finds note onsets, takes the dominant pitch
//! class at each onset from an STFT chromagram, places every note on a
//! six-string fretboard and lays the result out as a fixed-width text tab.
//! The spectral routines follow [librosa](https://librosa.org/)'s defaults
//! for `chroma_stft` and `onset_detect`.
//!
//! # Quick Start
//!
//! ```rust
//! use fretscribe::io::{self, SampleBuffer};
//! use fretscribe::transcribe;
//!
//! // one second of G3
//! let buffer = SampleBuffer::new(io::tone(196.0, 22050, 1.0), 22050);
//!
//! let result = transcribe::transcribe(&buffer).unwrap();
//! let tab = result.tab_text();
//! assert_eq!(tab.lines().count(), 6);
//! assert!(tab.starts_with("E|"));
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`transcribe`] | Note estimation, fretboard mapping, tab grid, pipeline |
//! | [`io`] | Audio decoding, mono mixdown, resampling, WAV writing |
//! | [`config`] | TOML run configuration |
//! | [`export`] | `.txt` and paginated SVG output |
//! | [`feature`] | Mel and chroma filterbanks, STFT chromagram |
//! | [`onset`] | Onset strength and peak-picked onset detection |
//! | [`pitch`] | Parabolic peak tracking and tuning estimation |
//! | [`spectrum`] | STFT, power spectrogram, dB conversion |
//! | [`convert`] | Frequency and pitch-class conversions |
//! | [`utils`] | argmax, peak picking, length fixing, validation |
//! | [`window`] | Hann window |
//! | [`fft`] | Cached FFT plans |
//!
//! # Error Handling
//!
//! All fallible operations return [`Result<T>`], an alias for
//! `std::result::Result<T, Error>`.
//!
//! # Feature Flags
//!
//! | Flag | Description |
//! |------|-------------|
//! | `parallel` | Compute STFT frames with rayon |

#![forbid(unsafe_code)]

pub mod error;
pub use error::{Error, Result};

pub mod config;
pub mod convert;
pub mod export;
pub mod feature;
pub mod fft;
pub mod io;
pub mod onset;
pub mod pitch;
pub mod spectrum;
pub mod transcribe;
pub mod utils;
pub mod window;
