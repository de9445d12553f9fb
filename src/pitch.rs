//! Tuning-deviation estimation from spectral peaks.
//!
//! Used by the chroma front end to align its filterbank with recordings
//! that are not tuned exactly to A440.

use crate::convert::{fft_frequencies, hz_to_octs};
use ndarray::Array2;

/// Lowest frequency considered by [`piptrack_from_power`].
pub const PIPTRACK_FMIN: f32 = 150.0;
/// Upper frequency bound (exclusive) considered by [`piptrack_from_power`].
pub const PIPTRACK_FMAX: f32 = 4000.0;
/// Peaks below this fraction of the frame maximum are ignored.
pub const PIPTRACK_THRESHOLD: f32 = 0.1;

/// Pitch tracking on thresholded parabolically-interpolated spectral peaks.
///
/// # Arguments
/// * `power` - Power spectrogram (n_fft/2 + 1, n_frames)
/// * `sr` - Sample rate
/// * `n_fft` - FFT size the spectrogram was computed with
/// * `fmin` / `fmax` - Frequency band searched for peaks, `[fmin, fmax)`
/// * `threshold` - Relative threshold against each frame's maximum
///
/// # Returns
/// Tuple of (pitches, magnitudes), both shaped like `power`. Bins that are
/// not peaks hold zero.
pub fn piptrack_from_power(
    power: &Array2<f32>,
    sr: u32,
    n_fft: usize,
    fmin: f32,
    fmax: f32,
    threshold: f32,
) -> (Array2<f32>, Array2<f32>) {
    let (n_freq, n_frames) = power.dim();
    let mut pitches = Array2::<f32>::zeros((n_freq, n_frames));
    let mut magnitudes = Array2::<f32>::zeros((n_freq, n_frames));
    if n_freq < 3 || n_frames == 0 || n_fft == 0 {
        return (pitches, magnitudes);
    }

    let freqs = fft_frequencies(sr, n_fft);
    let bin_hz = sr as f32 / n_fft as f32;

    for t in 0..n_frames {
        let column = power.column(t);
        let ref_value = threshold * column.iter().copied().fold(0.0f32, f32::max);
        let gated = |i: usize| {
            let v = column[i];
            if v > ref_value { v } else { 0.0 }
        };

        for bin in 1..n_freq - 1 {
            if freqs[bin] < fmin || freqs[bin] >= fmax {
                continue;
            }
            let (prev, curr, next) = (gated(bin - 1), gated(bin), gated(bin + 1));
            if !(curr > prev && curr >= next) {
                continue;
            }

            // Parabolic interpolation on the raw power values
            let (a, b, c) = (column[bin - 1], column[bin], column[bin + 1]);
            let avg = 0.5 * (c - a);
            let mut shift = 2.0 * b - c - a;
            if shift.abs() < f32::MIN_POSITIVE {
                shift += 1.0;
            }
            let shift = avg / shift;
            let dskew = 0.5 * avg * shift;

            pitches[(bin, t)] = (bin as f32 + shift) * bin_hz;
            magnitudes[(bin, t)] = b + dskew;
        }
    }

    (pitches, magnitudes)
}

/// Estimate tuning offset from a collection of detected pitches.
///
/// Residuals of each pitch against the equal-tempered grid are histogrammed
/// in steps of `resolution`; the left edge of the fullest bin is returned.
///
/// # Returns
/// Estimated tuning deviation in fractions of a bin, in range [-0.5, 0.5)
///
/// # Example
/// ```
/// use fretscribe::pitch::pitch_tuning;
///
/// let freqs = vec![440.0, 880.0, 220.0];
/// assert!(pitch_tuning(&freqs, 0.01, 12).abs() < 0.02);
/// ```
pub fn pitch_tuning(frequencies: &[f32], resolution: f32, bins_per_octave: usize) -> f32 {
    let valid: Vec<f32> = frequencies.iter().copied().filter(|&f| f > 0.0).collect();
    if valid.is_empty() || resolution <= 0.0 {
        return 0.0;
    }

    let n_bins = (1.0 / resolution).ceil() as usize;
    let mut histogram = vec![0usize; n_bins];
    for oct in hz_to_octs(&valid, 0.0, bins_per_octave) {
        let mut residual = (oct * bins_per_octave as f32).rem_euclid(1.0);
        if residual >= 0.5 {
            residual -= 1.0;
        }
        let idx = (((residual + 0.5) / resolution).floor() as usize).min(n_bins - 1);
        histogram[idx] += 1;
    }

    let peak = crate::utils::argmax(histogram.iter().map(|&c| c as f32)).unwrap_or(n_bins / 2);
    peak as f32 * resolution - 0.5
}

/// Estimate the tuning of a power spectrogram, in fractions of a chroma bin.
///
/// Peaks from [`piptrack_from_power`] whose magnitude reaches the median of
/// all peak magnitudes feed [`pitch_tuning`]. A spectrogram without peaks
/// yields 0.0.
pub fn estimate_tuning_from_power(
    power: &Array2<f32>,
    sr: u32,
    n_fft: usize,
    resolution: f32,
    bins_per_octave: usize,
) -> f32 {
    let (pitches, magnitudes) = piptrack_from_power(
        power,
        sr,
        n_fft,
        PIPTRACK_FMIN,
        PIPTRACK_FMAX,
        PIPTRACK_THRESHOLD,
    );

    let mut mags: Vec<f32> = pitches
        .iter()
        .zip(magnitudes.iter())
        .filter(|(p, _)| **p > 0.0)
        .map(|(_, m)| *m)
        .collect();
    if mags.is_empty() {
        return 0.0;
    }
    mags.sort_by(f32::total_cmp);
    let threshold = median_sorted(&mags);

    let selected: Vec<f32> = pitches
        .iter()
        .zip(magnitudes.iter())
        .filter(|(p, m)| **p > 0.0 && **m >= threshold)
        .map(|(p, _)| *p)
        .collect();

    pitch_tuning(&selected, resolution, bins_per_octave)
}

fn median_sorted(sorted: &[f32]) -> f32 {
    let n = sorted.len();
    if n % 2 == 1 {
        sorted[n / 2]
    } else {
        0.5 * (sorted[n / 2 - 1] + sorted[n / 2])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io;
    use crate::spectrum::{StftConfig, power_spectrogram, stft};

    fn power_of(y: &[f32]) -> Array2<f32> {
        power_spectrogram(&stft(y, &StftConfig::hann(2048, 512)).unwrap())
    }

    #[test]
    fn piptrack_finds_a440() {
        let power = power_of(&io::tone(440.0, 22050, 0.5));
        let (pitches, _) = piptrack_from_power(&power, 22050, 2048, 150.0, 4000.0, 0.1);
        let mid = pitches.shape()[1] / 2;
        let found: Vec<f32> = pitches.column(mid).iter().copied().filter(|&p| p > 0.0).collect();
        assert!(found.iter().any(|p| (p - 440.0).abs() < 3.0), "{found:?}");
    }

    #[test]
    fn tuned_tone_has_small_deviation() {
        let power = power_of(&io::tone(440.0, 22050, 1.0));
        let tuning = estimate_tuning_from_power(&power, 22050, 2048, 0.01, 12);
        assert!(tuning.abs() < 0.1, "tuning {tuning}");
    }

    #[test]
    fn sharp_tone_has_positive_deviation() {
        // a quarter tone sharp of A4
        let freq = 440.0 * 2.0f32.powf(0.25 / 12.0);
        let power = power_of(&io::tone(freq, 22050, 1.0));
        let tuning = estimate_tuning_from_power(&power, 22050, 2048, 0.01, 12);
        assert!(tuning > 0.1 && tuning < 0.4, "tuning {tuning}");
    }

    #[test]
    fn silence_has_zero_deviation() {
        let power = power_of(&vec![0.0; 4096]);
        assert_eq!(estimate_tuning_from_power(&power, 22050, 2048, 0.01, 12), 0.0);
    }

    #[test]
    fn pitch_tuning_ignores_non_positive() {
        assert_eq!(pitch_tuning(&[0.0, -5.0], 0.01, 12), 0.0);
    }
}
