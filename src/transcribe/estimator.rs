//! Onset and pitch-class estimation over fixed-length chunks.

use crate::convert::pitch_class_name;
use crate::feature::chroma_from_power;
use crate::io::SampleBuffer;
use crate::onset::{OnsetDetectConfig, onset_detect_envelope, onset_strength_from_power};
use crate::spectrum::{StftConfig, power_spectrogram, stft};
use crate::utils::argmax;
use ndarray::Array2;

/// Analysis hop between frames, in samples.
pub const DEFAULT_HOP_LENGTH: usize = 2048;
/// Length of one analysis chunk, in seconds.
pub const DEFAULT_CHUNK_DURATION: f64 = 5.0;
/// Pitch classes per chroma frame.
pub const N_CHROMA: usize = 12;

/// A detected note: absolute onset frame and dominant pitch class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NoteEvent {
    /// Frame index at the analysis hop, counted from the start of the buffer.
    pub onset_frame: usize,
    /// Chroma bin, 0 = C.
    pub pitch_class: usize,
}

impl NoteEvent {
    pub fn new(onset_frame: usize, pitch_class: usize) -> Self {
        Self {
            onset_frame,
            pitch_class,
        }
    }
}

/// Features of one chunk.
#[derive(Debug, Clone)]
pub struct ChunkFeatures {
    /// Pitch-class energies, shape (n_chroma, n_frames).
    pub chroma: Array2<f32>,
    /// Sorted, unique onset frames local to the chunk.
    pub onsets: Vec<usize>,
}

/// Chroma and onset routines the estimator runs on every chunk.
pub trait FeatureExtractor {
    /// Pitch-class energy matrix (n_chroma, n_frames) at `hop_length`.
    fn chroma(&self, chunk: &[f32], sr: u32, hop_length: usize) -> crate::Result<Array2<f32>>;

    /// Sorted, unique onset frame indices at `hop_length`.
    fn onsets(&self, chunk: &[f32], sr: u32, hop_length: usize) -> crate::Result<Vec<usize>>;

    /// Both features for one chunk.
    fn analyze(&self, chunk: &[f32], sr: u32, hop_length: usize) -> crate::Result<ChunkFeatures> {
        Ok(ChunkFeatures {
            chroma: self.chroma(chunk, sr, hop_length)?,
            onsets: self.onsets(chunk, sr, hop_length)?,
        })
    }
}

/// STFT chromagram plus mel spectral-flux onsets, sharing one spectrogram.
#[derive(Debug, Clone)]
pub struct StftFeatures {
    pub n_fft: usize,
    /// Chroma tuning offset in fractional bins; `None` estimates it per chunk.
    pub tuning: Option<f32>,
}

impl Default for StftFeatures {
    fn default() -> Self {
        Self {
            n_fft: 2048,
            tuning: None,
        }
    }
}

impl StftFeatures {
    fn power(&self, chunk: &[f32], hop_length: usize) -> crate::Result<Array2<f32>> {
        let stft_matrix = stft(chunk, &StftConfig::hann(self.n_fft, hop_length))?;
        Ok(power_spectrogram(&stft_matrix))
    }

    fn onsets_from_power(
        &self,
        power: &Array2<f32>,
        sr: u32,
        hop_length: usize,
    ) -> crate::Result<Vec<usize>> {
        let env = onset_strength_from_power(power, sr, self.n_fft, hop_length)?;
        let config = OnsetDetectConfig::new()
            .with_n_fft(self.n_fft)
            .with_hop_length(hop_length);
        Ok(onset_detect_envelope(&env, sr, &config))
    }
}

impl FeatureExtractor for StftFeatures {
    fn chroma(&self, chunk: &[f32], sr: u32, hop_length: usize) -> crate::Result<Array2<f32>> {
        let power = self.power(chunk, hop_length)?;
        chroma_from_power(&power, sr, self.n_fft, N_CHROMA, self.tuning)
    }

    fn onsets(&self, chunk: &[f32], sr: u32, hop_length: usize) -> crate::Result<Vec<usize>> {
        let power = self.power(chunk, hop_length)?;
        self.onsets_from_power(&power, sr, hop_length)
    }

    fn analyze(&self, chunk: &[f32], sr: u32, hop_length: usize) -> crate::Result<ChunkFeatures> {
        let power = self.power(chunk, hop_length)?;
        Ok(ChunkFeatures {
            chroma: chroma_from_power(&power, sr, self.n_fft, N_CHROMA, self.tuning)?,
            onsets: self.onsets_from_power(&power, sr, hop_length)?,
        })
    }
}

/// Chunking and framing parameters of the estimator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EstimatorConfig {
    pub chunk_duration: f64,
    pub hop_length: usize,
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self {
            chunk_duration: DEFAULT_CHUNK_DURATION,
            hop_length: DEFAULT_HOP_LENGTH,
        }
    }
}

/// Samples per chunk: `floor(chunk_duration * sample_rate)`.
///
/// # Errors
/// [`crate::Error::InvalidConfig`] for a zero sample rate, a non-finite or
/// non-positive duration, or a chunk shorter than one sample.
pub fn chunk_samples(chunk_duration: f64, sample_rate: u32) -> crate::Result<usize> {
    if sample_rate == 0 {
        return Err(crate::Error::config("sample_rate", 0, "must be > 0"));
    }
    if !chunk_duration.is_finite() || chunk_duration <= 0.0 {
        return Err(crate::Error::config(
            "chunk_duration",
            chunk_duration,
            "must be a positive number of seconds",
        ));
    }
    let samples = (chunk_duration * sample_rate as f64).floor();
    if samples < 1.0 {
        return Err(crate::Error::config(
            "chunk_duration",
            chunk_duration,
            format!("is shorter than one sample at {sample_rate} Hz"),
        ));
    }
    Ok(samples as usize)
}

/// Detect note events in a buffer, chunk by chunk.
///
/// Each chunk is analyzed on its own; local onset frames are shifted by
/// `chunk_start / hop_length` and tagged with the argmax chroma bin at that
/// frame (lowest bin wins ties). An empty buffer gives no events.
pub fn analyze_notes<E: FeatureExtractor + ?Sized>(
    buffer: &SampleBuffer,
    config: &EstimatorConfig,
    extractor: &E,
) -> crate::Result<Vec<NoteEvent>> {
    let sr = buffer.sample_rate();
    let chunk_len = chunk_samples(config.chunk_duration, sr)?;
    let hop = config.hop_length;
    if hop == 0 {
        return Err(crate::Error::config("hop_length", 0, "must be > 0"));
    }

    let mut notes = Vec::new();
    for (chunk_index, chunk) in buffer.samples().chunks(chunk_len).enumerate() {
        let chunk_start = chunk_index * chunk_len;
        let features = extractor.analyze(chunk, sr, hop)?;
        let base_frame = chunk_start / hop;
        let n_frames = features.chroma.shape()[1];

        for &local in &features.onsets {
            if local >= n_frames {
                tracing::warn!(
                    chunk = chunk_index,
                    frame = local,
                    n_frames,
                    "onset past the last chroma frame, skipped"
                );
                continue;
            }
            let Some(pitch_class) = argmax(features.chroma.column(local).iter().copied()) else {
                tracing::warn!(chunk = chunk_index, frame = local, "empty chroma frame, skipped");
                continue;
            };
            tracing::trace!(
                frame = base_frame + local,
                pitch = pitch_class_name(pitch_class).unwrap_or("?"),
                "note"
            );
            notes.push(NoteEvent::new(base_frame + local, pitch_class));
        }

        tracing::debug!(
            chunk = chunk_index,
            start = chunk_start,
            onsets = features.onsets.len(),
            "analyzed chunk"
        );
    }

    Ok(notes)
}
