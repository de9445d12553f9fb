/// Validate audio data.
///
/// All samples must be finite (no NaN or Inf). An empty signal is valid;
/// callers decide what zero samples mean for them.
///
/// # Example
/// ```
/// use fretscribe::utils::valid_audio;
///
/// assert!(valid_audio(&[0.0, 0.5, -0.5, 0.0]).is_ok());
/// assert!(valid_audio(&[]).is_ok());
/// assert!(valid_audio(&[0.0, f32::INFINITY]).is_err());
/// ```
pub fn valid_audio(y: &[f32]) -> crate::Result<()> {
    if !y.iter().all(|&v| v.is_finite()) {
        return Err(crate::Error::NonFiniteAudio);
    }
    Ok(())
}
