use crate::onset::strength::onset_strength;
use crate::utils::peak_pick;

/// Configuration for onset detection.
///
/// Peak-picking windows are given in seconds and converted to frames with
/// `floor(seconds * sr / hop_length)`; the post windows get one extra frame
/// so that they always include the candidate frame.
///
/// # Example
/// ```
/// use fretscribe::onset::OnsetDetectConfig;
///
/// let config = OnsetDetectConfig::new()
///     .with_hop_length(2048)
///     .with_delta(0.1);
/// assert_eq!(config.hop_length, 2048);
/// ```
#[derive(Debug, Clone)]
pub struct OnsetDetectConfig {
    /// FFT window size
    pub n_fft: usize,
    /// Hop length for STFT
    pub hop_length: usize,
    /// Seconds before a candidate that it must dominate
    pub pre_max: f32,
    /// Seconds after a candidate that it must dominate
    pub post_max: f32,
    /// Seconds before a candidate included in the local mean
    pub pre_avg: f32,
    /// Seconds after a candidate included in the local mean
    pub post_avg: f32,
    /// Minimum spacing between onsets, in seconds
    pub wait: f32,
    /// Margin above the local mean of the normalized envelope
    pub delta: f32,
}

/// Peak-picking windows resolved to frame counts for one sample rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeakWindows {
    pub pre_max: usize,
    pub post_max: usize,
    pub pre_avg: usize,
    pub post_avg: usize,
    pub wait: usize,
}

impl OnsetDetectConfig {
    /// Create a new onset detection configuration with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the FFT window size.
    pub fn with_n_fft(mut self, n_fft: usize) -> Self {
        self.n_fft = n_fft;
        self
    }

    /// Set the hop length.
    pub fn with_hop_length(mut self, hop_length: usize) -> Self {
        self.hop_length = hop_length;
        self
    }

    /// Set the peak threshold above the local mean.
    pub fn with_delta(mut self, delta: f32) -> Self {
        self.delta = delta;
        self
    }

    /// Set the minimum spacing between onsets, in seconds.
    pub fn with_wait(mut self, wait: f32) -> Self {
        self.wait = wait;
        self
    }

    /// Resolve the peak-picking windows to frames.
    pub fn windows(&self, sr: u32) -> PeakWindows {
        let hop = self.hop_length.max(1) as f32;
        let frames = |seconds: f32| (seconds * sr as f32 / hop).floor().max(0.0) as usize;
        PeakWindows {
            pre_max: frames(self.pre_max),
            post_max: frames(self.post_max) + 1,
            pre_avg: frames(self.pre_avg),
            post_avg: frames(self.post_avg) + 1,
            wait: frames(self.wait),
        }
    }

    /// Detect onsets with this configuration.
    ///
    /// # Returns
    /// Sorted, unique onset frame indices
    pub fn detect(&self, y: &[f32], sr: u32) -> crate::Result<Vec<usize>> {
        let env = onset_strength(y, sr, self.n_fft, self.hop_length)?;
        Ok(onset_detect_envelope(&env, sr, self))
    }
}

impl Default for OnsetDetectConfig {
    fn default() -> Self {
        Self {
            n_fft: 2048,
            hop_length: 512,
            pre_max: 0.03,
            post_max: 0.0,
            pre_avg: 0.10,
            post_avg: 0.10,
            wait: 0.03,
            delta: 0.07,
        }
    }
}

/// Pick onsets from a precomputed onset strength envelope.
///
/// The envelope is rescaled to [0, 1] before peak picking. An envelope with
/// no variation has no onsets.
pub fn onset_detect_envelope(env: &[f32], sr: u32, config: &OnsetDetectConfig) -> Vec<usize> {
    if env.is_empty() {
        return Vec::new();
    }
    let min = env.iter().copied().fold(f32::INFINITY, f32::min);
    let max = env.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let range = max - min;
    if range <= 0.0 || !range.is_finite() {
        return Vec::new();
    }
    let normalized: Vec<f32> = env.iter().map(|v| (v - min) / range).collect();

    let w = config.windows(sr);
    peak_pick(
        &normalized,
        w.pre_max,
        w.post_max,
        w.pre_avg,
        w.post_avg,
        config.delta,
        w.wait,
    )
}

/// Detect onset frames in a signal with the default peak-picking windows.
///
/// # Arguments
/// * `y` - Input audio signal
/// * `sr` - Sample rate
/// * `n_fft` - FFT size
/// * `hop_length` - Hop length
///
/// # Returns
/// Sorted, unique onset frame indices (centered STFT frames)
pub fn onset_detect(
    y: &[f32],
    sr: u32,
    n_fft: usize,
    hop_length: usize,
) -> crate::Result<Vec<usize>> {
    OnsetDetectConfig::new()
        .with_n_fft(n_fft)
        .with_hop_length(hop_length)
        .detect(y, sr)
}
