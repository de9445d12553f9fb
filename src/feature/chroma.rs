use crate::convert::hz_to_octs;
use crate::pitch::estimate_tuning_from_power;
use crate::spectrum::{StftConfig, power_spectrogram, stft};
use ndarray::Array2;

/// Create a chroma filter bank.
///
/// This creates a linear transformation matrix to project
/// FFT bins onto chroma bins (i.e. pitch classes).
///
/// # Arguments
/// * `sr` - Sample rate
/// * `n_fft` - FFT size
/// * `n_chroma` - Number of chroma bins (default 12)
/// * `tuning` - Tuning deviation from A440 in fractional bins
/// * `ctroct` - Center octave for Gaussian weighting (default 5.0)
/// * `octwidth` - Octave width for Gaussian weighting (None for flat)
/// * `base_c` - If true, start filter bank at C; otherwise start at A
pub fn chroma_filterbank(
    sr: u32,
    n_fft: usize,
    n_chroma: usize,
    tuning: f32,
    ctroct: f32,
    octwidth: Option<f32>,
    base_c: bool,
) -> Array2<f32> {
    let n_freq = n_fft / 2 + 1;
    let mut wts = Array2::<f32>::zeros((n_chroma, n_freq));

    if n_fft == 0 || n_chroma == 0 {
        return wts;
    }

    // FFT bin frequencies, DC excluded
    let frequencies: Vec<f32> = (1..n_fft)
        .map(|i| i as f32 * sr as f32 / n_fft as f32)
        .collect();

    let mut frqbins: Vec<f32> = hz_to_octs(&frequencies, tuning, n_chroma)
        .iter()
        .map(|&o| o * n_chroma as f32)
        .collect();

    // DC sits 1.5 octaves below bin 1
    let dc_bin = frqbins.first().map_or(0.0, |b| b - 1.5 * n_chroma as f32);
    frqbins.insert(0, dc_bin);

    let binwidthbins: Vec<f32> = (0..frqbins.len())
        .map(|i| {
            if i + 1 < frqbins.len() {
                (frqbins[i + 1] - frqbins[i]).max(1.0)
            } else {
                1.0
            }
        })
        .collect();

    let n_chroma_f = n_chroma as f32;
    let n_chroma2 = (n_chroma_f / 2.0).round();

    for chroma in 0..n_chroma {
        for fbin in 0..n_freq {
            let mut d = frqbins[fbin] - chroma as f32;
            // project into -n_chroma/2 .. n_chroma/2
            d = ((d + n_chroma2 + 10.0 * n_chroma_f) % n_chroma_f) - n_chroma2;
            let width = binwidthbins[fbin];
            wts[(chroma, fbin)] = (-0.5 * (2.0 * d / width).powi(2)).exp();
        }
    }

    // L2-normalize each column
    for fbin in 0..n_freq {
        let sum_sq: f64 = (0..n_chroma)
            .map(|c| (wts[(c, fbin)] as f64).powi(2))
            .sum();
        let norm = sum_sq.sqrt().max(1e-10);
        for chroma in 0..n_chroma {
            wts[(chroma, fbin)] = (wts[(chroma, fbin)] as f64 / norm) as f32;
        }
    }

    if let Some(octw) = octwidth {
        for fbin in 0..n_freq {
            let oct = frqbins[fbin] / n_chroma_f;
            let weight = (-0.5 * ((oct - ctroct) / octw).powi(2)).exp();
            for chroma in 0..n_chroma {
                wts[(chroma, fbin)] *= weight;
            }
        }
    }

    if base_c {
        let shift = 3 * (n_chroma / 12);
        if shift > 0 && shift < n_chroma {
            let mut rolled = Array2::<f32>::zeros((n_chroma, n_freq));
            for chroma in 0..n_chroma {
                let new_chroma = (chroma + n_chroma - shift) % n_chroma;
                rolled.row_mut(new_chroma).assign(&wts.row(chroma));
            }
            wts = rolled;
        }
    }

    wts
}

/// Chromagram from a power spectrogram (n_fft/2 + 1, n_frames).
///
/// Each frame is scaled so its largest bin is 1; frames with no energy are
/// left at zero. `tuning` of `None` estimates the deviation from A440 from
/// the spectrogram itself.
pub fn chroma_from_power(
    power: &Array2<f32>,
    sr: u32,
    n_fft: usize,
    n_chroma: usize,
    tuning: Option<f32>,
) -> crate::Result<Array2<f32>> {
    let n_freq = n_fft / 2 + 1;
    if power.shape()[0] != n_freq {
        return Err(crate::Error::input(
            "power",
            format!("{} frequency bins", power.shape()[0]),
            format!("expected n_fft/2 + 1 = {n_freq}"),
        ));
    }
    let n_frames = power.shape()[1];
    if n_frames == 0 {
        return Ok(Array2::<f32>::zeros((n_chroma, 0)));
    }

    let tuning = match tuning {
        Some(t) => t,
        None => estimate_tuning_from_power(power, sr, n_fft, 0.01, n_chroma),
    };

    let chromafb = chroma_filterbank(sr, n_fft, n_chroma, tuning, 5.0, Some(2.0), true);
    let mut chroma = chromafb.dot(power);

    // L-infinity normalize each frame
    for mut column in chroma.columns_mut() {
        let max_val = column.iter().fold(0.0f32, |m, v| m.max(v.abs()));
        if max_val > 1e-10 {
            column.mapv_inplace(|v| v / max_val);
        }
    }

    Ok(chroma)
}

/// Compute a chromagram from a waveform using STFT.
///
/// # Arguments
/// * `y` - Audio samples
/// * `sr` - Sample rate
/// * `n_fft` - FFT window size
/// * `hop_length` - Hop length between frames
/// * `n_chroma` - Number of chroma bins (default 12)
/// * `tuning` - Tuning deviation from A440 in fractional bins (None to estimate)
///
/// # Returns
/// Chromagram with shape (n_chroma, n_frames)
///
/// # Example
/// ```
/// use fretscribe::feature::chroma_stft;
/// use fretscribe::io;
///
/// // A3, 220 Hz
/// let signal = io::tone(220.0, 22050, 0.5);
/// let chroma = chroma_stft(&signal, 22050, 2048, 512, 12, Some(0.0)).unwrap();
/// assert_eq!(chroma.shape()[0], 12);
/// ```
pub fn chroma_stft(
    y: &[f32],
    sr: u32,
    n_fft: usize,
    hop_length: usize,
    n_chroma: usize,
    tuning: Option<f32>,
) -> crate::Result<Array2<f32>> {
    let stft_matrix = stft(y, &StftConfig::hann(n_fft, hop_length))?;
    chroma_from_power(&power_spectrogram(&stft_matrix), sr, n_fft, n_chroma, tuning)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io;
    use crate::utils::argmax;

    fn dominant_class(chroma: &Array2<f32>, frame: usize) -> usize {
        argmax(chroma.column(frame).iter().copied()).unwrap()
    }

    #[test]
    fn filterbank_shape() {
        let fb = chroma_filterbank(22050, 2048, 12, 0.0, 5.0, Some(2.0), true);
        assert_eq!(fb.shape(), &[12, 1025]);
        assert!(fb.iter().all(|w| w.is_finite() && *w >= 0.0));
    }

    #[test]
    fn pure_tones_land_in_their_pitch_class() {
        // (frequency, C-based pitch class)
        let cases = [(220.0, 9), (261.63, 0), (329.63, 4), (196.0, 7)];
        for (freq, expected) in cases {
            let y = io::tone(freq, 22050, 1.0);
            let chroma = chroma_stft(&y, 22050, 2048, 2048, 12, Some(0.0)).unwrap();
            let mid = chroma.shape()[1] / 2;
            assert_eq!(dominant_class(&chroma, mid), expected, "tone {freq} Hz");
        }
    }

    #[test]
    fn frames_are_max_normalized() {
        let y = io::tone(440.0, 22050, 0.5);
        let chroma = chroma_stft(&y, 22050, 2048, 1024, 12, None).unwrap();
        for column in chroma.columns() {
            let max = column.iter().copied().fold(0.0f32, f32::max);
            assert!((max - 1.0).abs() < 1e-5 || max == 0.0);
        }
    }

    #[test]
    fn silence_gives_zero_chroma() {
        let y = vec![0.0f32; 8192];
        let chroma = chroma_stft(&y, 22050, 2048, 2048, 12, None).unwrap();
        assert!(chroma.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn empty_signal_has_no_frames() {
        let chroma = chroma_stft(&[], 22050, 2048, 2048, 12, None).unwrap();
        assert_eq!(chroma.shape(), &[12, 0]);
    }
}
