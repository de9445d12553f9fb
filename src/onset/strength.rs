use crate::feature::melspectrogram_from_power;
use crate::spectrum::{StftConfig, power_spectrogram, power_to_db, stft};
use crate::utils::fix_length;
use ndarray::Array2;

/// Mel bands used for the onset strength envelope.
pub const ONSET_N_MELS: usize = 128;

/// Onset strength envelope from a power spectrogram.
///
/// The spectrogram is projected to [`ONSET_N_MELS`] mel bands and converted
/// to dB (80 dB dynamic range). Frame `t` of the envelope is the mean over
/// bands of the positive dB increase from frame `t - 1`. The envelope is
/// shifted right to line up with centered STFT frames and has exactly as
/// many frames as `power`.
pub fn onset_strength_from_power(
    power: &Array2<f32>,
    sr: u32,
    n_fft: usize,
    hop_length: usize,
) -> crate::Result<Vec<f32>> {
    let n_frames = power.shape()[1];
    if n_frames == 0 {
        return Ok(Vec::new());
    }
    if hop_length == 0 {
        return Err(crate::Error::config("hop_length", 0, "must be > 0"));
    }

    let mel = melspectrogram_from_power(power, sr, n_fft, ONSET_N_MELS)?;
    let db = power_to_db(&mel, 1.0, 1e-10, Some(80.0));
    let n_bands = db.shape()[0].max(1) as f32;

    let lag = 1usize;
    let mut flux = Vec::with_capacity(n_frames.saturating_sub(lag));
    for t in lag..n_frames {
        let sum: f32 = db
            .column(t)
            .iter()
            .zip(db.column(t - lag).iter())
            .map(|(cur, prev)| (cur - prev).max(0.0))
            .sum();
        flux.push(sum / n_bands);
    }

    let pad = lag + n_fft / (2 * hop_length);
    let mut env = vec![0.0f32; pad];
    env.extend(flux);
    Ok(fix_length(&env, n_frames, 0.0))
}

/// Compute the onset strength envelope of a signal.
///
/// # Arguments
/// * `y` - Input audio signal
/// * `sr` - Sample rate
/// * `n_fft` - FFT size
/// * `hop_length` - Hop length
///
/// # Returns
/// One non-negative value per centered STFT frame.
///
/// # Example
/// ```
/// use fretscribe::onset::onset_strength;
///
/// let mut y = vec![0.0f32; 4096];
/// y.extend((0..4096).map(|i| (i as f32 * 0.1).sin()));
/// let env = onset_strength(&y, 22050, 1024, 256).unwrap();
/// assert_eq!(env.len(), 1 + y.len() / 256);
/// ```
pub fn onset_strength(
    y: &[f32],
    sr: u32,
    n_fft: usize,
    hop_length: usize,
) -> crate::Result<Vec<f32>> {
    let stft_matrix = stft(y, &StftConfig::hann(n_fft, hop_length))?;
    onset_strength_from_power(&power_spectrogram(&stft_matrix), sr, n_fft, hop_length)
}
