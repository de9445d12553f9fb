use crate::convert::mel_frequencies;
use ndarray::Array2;

/// Slaney-normalized triangular mel filterbank of shape (n_mels, n_fft/2 + 1).
pub fn mel_filterbank(sr: u32, n_fft: usize, n_mels: usize, fmin: f32, fmax: f32) -> Array2<f32> {
    let n_freq = n_fft / 2 + 1;
    let mut fb = Array2::<f32>::zeros((n_mels, n_freq));
    if n_mels == 0 || n_fft == 0 {
        return fb;
    }

    let fmax = fmax.min(sr as f32 / 2.0).max(fmin);
    let mel_points = mel_frequencies(n_mels + 2, fmin, fmax);
    let fft_freqs = crate::convert::fft_frequencies(sr, n_fft);

    for m in 0..n_mels {
        let f_m_minus = mel_points[m];
        let f_m = mel_points[m + 1];
        let f_m_plus = mel_points[m + 2];
        let denom_left = (f_m - f_m_minus).max(1e-8) as f64;
        let denom_right = (f_m_plus - f_m).max(1e-8) as f64;
        let enorm = 2.0 / (f_m_plus - f_m_minus).max(1e-8) as f64;

        for (k, &freq) in fft_freqs.iter().enumerate() {
            let lower = (freq - f_m_minus) as f64 / denom_left;
            let upper = (f_m_plus - freq) as f64 / denom_right;
            fb[(m, k)] = (lower.min(upper).max(0.0) * enorm) as f32;
        }
    }

    fb
}

/// Project a power spectrogram (n_fft/2 + 1, n_frames) onto `n_mels` mel bands
/// spanning 0 Hz to Nyquist.
pub fn melspectrogram_from_power(
    power: &Array2<f32>,
    sr: u32,
    n_fft: usize,
    n_mels: usize,
) -> crate::Result<Array2<f32>> {
    let n_freq = n_fft / 2 + 1;
    if power.shape()[0] != n_freq {
        return Err(crate::Error::input(
            "power",
            format!("{} frequency bins", power.shape()[0]),
            format!("expected n_fft/2 + 1 = {n_freq}"),
        ));
    }
    let fb = mel_filterbank(sr, n_fft, n_mels, 0.0, sr as f32 / 2.0);
    Ok(fb.dot(power))
}
