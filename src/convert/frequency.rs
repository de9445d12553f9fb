use super::A4_HZ;

/// Get FFT bin frequencies.
///
/// # Example
/// ```
/// use fretscribe::convert::fft_frequencies;
///
/// let freqs = fft_frequencies(22050, 2048);
/// assert_eq!(freqs.len(), 1025); // n_fft/2 + 1
/// assert_eq!(freqs[0], 0.0);
/// ```
pub fn fft_frequencies(sr: u32, n_fft: usize) -> Vec<f32> {
    let n_bins = n_fft / 2 + 1;
    (0..n_bins)
        .map(|i| i as f32 * sr as f32 / n_fft as f32)
        .collect()
}

/// Convert Hz to mels (Slaney scale: linear below 1 kHz, logarithmic above).
pub fn hz_to_mel(hz: f32) -> f32 {
    let f_sp = 200.0 / 3.0;
    let min_log_hz = 1000.0;
    let min_log_mel = min_log_hz / f_sp;
    let logstep = (6.4f32).ln() / 27.0;
    if hz < min_log_hz {
        hz / f_sp
    } else {
        min_log_mel + (hz / min_log_hz).ln() / logstep
    }
}

/// Inverse of [`hz_to_mel`].
pub fn mel_to_hz(mel: f32) -> f32 {
    let f_sp = 200.0 / 3.0;
    let min_log_hz = 1000.0;
    let min_log_mel = min_log_hz / f_sp;
    let logstep = (6.4f32).ln() / 27.0;
    if mel < min_log_mel {
        mel * f_sp
    } else {
        min_log_hz * (logstep * (mel - min_log_mel)).exp()
    }
}

/// `n_mels` frequencies evenly spaced on the mel scale between `fmin` and `fmax`.
pub fn mel_frequencies(n_mels: usize, fmin: f32, fmax: f32) -> Vec<f32> {
    if n_mels == 0 {
        return Vec::new();
    }
    let mel_min = hz_to_mel(fmin.max(0.0));
    let mel_max = hz_to_mel(fmax.max(fmin));
    let step = (mel_max - mel_min) / (n_mels as f32 - 1.0).max(1.0);
    (0..n_mels)
        .map(|i| mel_to_hz(mel_min + step * i as f32))
        .collect()
}

/// Convert frequencies (Hz) to fractional octave numbers.
/// A440 (shifted by `tuning` fractional bins) sits at octave 4.0.
pub fn hz_to_octs(frequencies: &[f32], tuning: f32, bins_per_octave: usize) -> Vec<f32> {
    let a440 = A4_HZ * 2.0_f32.powf(tuning / bins_per_octave as f32);
    let ref_freq = a440 / 16.0;

    frequencies
        .iter()
        .map(|&f| {
            if f > 0.0 {
                (f / ref_freq).log2()
            } else {
                f32::NEG_INFINITY
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn mel_roundtrip_both_regions() {
        for hz in [100.0f32, 999.0, 1000.0, 4000.0, 11025.0] {
            assert_relative_eq!(mel_to_hz(hz_to_mel(hz)), hz, max_relative = 1e-4);
        }
    }

    #[test]
    fn mel_frequencies_span_range() {
        let f = mel_frequencies(130, 0.0, 11025.0);
        assert_eq!(f.len(), 130);
        assert_eq!(f[0], 0.0);
        assert_relative_eq!(f[129], 11025.0, max_relative = 1e-3);
        assert!(f.windows(2).all(|w| w[1] > w[0]));
    }

    #[test]
    fn a440_is_octave_four() {
        let octs = hz_to_octs(&[440.0, 880.0, 0.0], 0.0, 12);
        assert_relative_eq!(octs[0], 4.0, epsilon = 1e-5);
        assert_relative_eq!(octs[1], 5.0, epsilon = 1e-5);
        assert!(octs[2].is_infinite());
    }
}
