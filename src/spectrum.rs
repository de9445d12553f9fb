use crate::fft::FftPlan;
use crate::window;
use ndarray::Array2;
use num_complex::Complex32;

#[derive(Debug, Clone)]
pub struct StftConfig {
    pub n_fft: usize,
    pub hop_length: usize,
    pub win_length: usize,
    pub center: bool,
    pub window: Vec<f32>,
    pub pad_mode: PadMode,
}

#[derive(Debug, Clone, Copy)]
pub enum PadMode {
    Constant,
    Reflect,
}

impl StftConfig {
    /// Hann-windowed, centered configuration with `win_length == n_fft`.
    pub fn hann(n_fft: usize, hop_length: usize) -> Self {
        Self {
            n_fft,
            hop_length,
            win_length: n_fft,
            center: true,
            window: window::hann(n_fft),
            pad_mode: PadMode::Constant,
        }
    }
}

impl Default for StftConfig {
    fn default() -> Self {
        let n_fft = 2048;
        Self::hann(n_fft, n_fft / 4)
    }
}

fn pad_window(window: &[f32], n_fft: usize) -> Vec<f32> {
    if window.len() == n_fft {
        return window.to_vec();
    }
    let mut padded = vec![0.0f32; n_fft];
    let len = window.len().min(n_fft);
    let start = (n_fft - len) / 2;
    padded[start..start + len].copy_from_slice(&window[..len]);
    padded
}

fn reflect_index(mut idx: isize, len: usize) -> usize {
    if len <= 1 {
        return 0;
    }
    let last = len as isize - 1;
    while idx < 0 || idx > last {
        if idx < 0 {
            idx = -idx;
        }
        if idx > last {
            idx = 2 * last - idx;
        }
    }
    idx as usize
}

fn pad_center(y: &[f32], n_fft: usize, center: bool, pad_mode: PadMode) -> Vec<f32> {
    if !center {
        return y.to_vec();
    }
    let pad = n_fft / 2;
    let mut out = vec![0.0f32; y.len() + 2 * pad];
    match pad_mode {
        PadMode::Constant => {
            out[pad..pad + y.len()].copy_from_slice(y);
        }
        PadMode::Reflect => {
            for (i, out_val) in out.iter_mut().enumerate() {
                let src_idx = i as isize - pad as isize;
                *out_val = y[reflect_index(src_idx, y.len())];
            }
        }
    }
    out
}

#[inline]
fn compute_frame(
    frame: usize,
    padded: &[f32],
    window: &[f32],
    fft: &FftPlan,
    hop_length: usize,
    n_freq: usize,
) -> Vec<Complex32> {
    let start = frame * hop_length;
    let mut buffer = vec![Complex32::new(0.0, 0.0); fft.len()];
    for (i, slot) in buffer.iter_mut().enumerate() {
        let sample = padded.get(start + i).copied().unwrap_or(0.0);
        slot.re = sample * window[i];
    }
    fft.forward(&mut buffer);
    buffer.truncate(n_freq);
    buffer
}

/// Number of STFT frames produced for a signal of `len` samples.
pub fn frame_count(len: usize, config: &StftConfig) -> usize {
    if len == 0 || config.hop_length == 0 {
        return 0;
    }
    let padded = if config.center {
        len + 2 * (config.n_fft / 2)
    } else {
        len
    };
    if padded < config.n_fft {
        0
    } else {
        (padded - config.n_fft) / config.hop_length + 1
    }
}

/// Compute the Short-Time Fourier Transform (STFT).
///
/// # Arguments
/// * `y` - Input audio signal
/// * `config` - STFT configuration (FFT size, hop length, window, etc.)
///
/// # Returns
/// Complex STFT matrix of shape (n_freq, n_frames) where n_freq = n_fft/2 + 1.
/// An empty signal yields zero frames.
///
/// # Errors
/// Returns an error if the audio holds non-finite samples or if
/// n_fft/hop_length is zero.
pub fn stft(y: &[f32], config: &StftConfig) -> crate::Result<Array2<Complex32>> {
    crate::utils::valid_audio(y)?;
    if config.n_fft == 0 {
        return Err(crate::Error::config("n_fft", 0, "must be > 0"));
    }
    if config.hop_length == 0 {
        return Err(crate::Error::config("hop_length", 0, "must be > 0"));
    }

    let n_freq = config.n_fft / 2 + 1;
    let n_frames = frame_count(y.len(), config);
    if n_frames == 0 {
        return Ok(Array2::<Complex32>::zeros((n_freq, 0)));
    }

    let window = pad_window(&config.window, config.n_fft);
    let padded = pad_center(y, config.n_fft, config.center, config.pad_mode);
    let fft = FftPlan::new(config.n_fft);

    let frame_results: Vec<Vec<Complex32>> = {
        #[cfg(feature = "parallel")]
        {
            use rayon::prelude::*;
            (0..n_frames)
                .into_par_iter()
                .map(|frame| {
                    compute_frame(frame, &padded, &window, &fft, config.hop_length, n_freq)
                })
                .collect()
        }
        #[cfg(not(feature = "parallel"))]
        {
            (0..n_frames)
                .map(|frame| {
                    compute_frame(frame, &padded, &window, &fft, config.hop_length, n_freq)
                })
                .collect()
        }
    };

    let mut stft_matrix = Array2::<Complex32>::zeros((n_freq, n_frames));
    for (frame, result) in frame_results.iter().enumerate() {
        for (f, &val) in result.iter().enumerate() {
            stft_matrix[(f, frame)] = val;
        }
    }

    Ok(stft_matrix)
}

/// Squared magnitude of every STFT bin.
pub fn power_spectrogram(stft_matrix: &Array2<Complex32>) -> Array2<f32> {
    stft_matrix.mapv(|c| c.re * c.re + c.im * c.im)
}

/// Convert power spectrogram to dB scale.
/// S_db = 10 * log10(S / ref)
pub fn power_to_db(
    power: &Array2<f32>,
    ref_power: f32,
    amin: f32,
    top_db: Option<f32>,
) -> Array2<f32> {
    let log_ref = 10.0 * ref_power.max(amin).log10();
    let mut db = power.mapv(|p| 10.0 * p.max(amin).log10() - log_ref);

    if let Some(top) = top_db {
        let max_db = db.iter().copied().fold(f32::NEG_INFINITY, f32::max);
        let threshold = max_db - top;
        db.mapv_inplace(|v| v.max(threshold));
    }

    db
}
