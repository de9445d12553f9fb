use num_complex::Complex32;
use rustfft::{Fft, FftPlanner};
use std::sync::Arc;

/// Forward FFT plan for a fixed frame size.
///
/// The STFT plans once per call and reuses the plan for every frame.
///
/// # Example
/// ```
/// use fretscribe::fft::FftPlan;
/// use num_complex::Complex32;
///
/// let plan = FftPlan::new(8);
/// let mut buffer = vec![Complex32::new(1.0, 0.0); 8];
/// plan.forward(&mut buffer);
/// assert!((buffer[0].re - 8.0).abs() < 1e-5);
/// ```
pub struct FftPlan {
    forward: Arc<dyn Fft<f32>>,
    len: usize,
}

impl FftPlan {
    /// Create a new forward FFT plan for `len` points.
    pub fn new(len: usize) -> Self {
        let mut planner = FftPlanner::new();
        let forward = planner.plan_fft_forward(len);
        Self { forward, len }
    }

    /// Number of points this plan transforms.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Perform forward FFT in-place (unnormalized).
    pub fn forward(&self, buffer: &mut [Complex32]) {
        self.forward.process(buffer);
    }
}

#[cfg(feature = "parallel")]
const _: () = {
    fn _assert_send_sync<T: Send + Sync>() {}
    fn _check() {
        _assert_send_sync::<FftPlan>();
    }
};
