//! Sample source: audio file decoding, mono mixdown and resampling.

use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use rubato::{
    Resampler, SincFixedIn, SincInterpolationParameters, SincInterpolationType, WindowFunction,
};
use std::path::Path;
use symphonia::core::audio::SampleBuffer as DecodedSamples;
use symphonia::core::codecs::DecoderOptions;
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

/// Analysis sample rate used when none is configured.
pub const DEFAULT_SAMPLE_RATE: u32 = 22050;

#[derive(Debug, thiserror::Error)]
pub enum AudioError {
    #[error("hound error: {0}")]
    Hound(#[from] hound::Error),
    #[error("symphonia error: {0}")]
    Symphonia(SymphoniaError),
    #[error("no audio track found")]
    NoAudioTrack,
    #[error("unsupported number of channels")]
    UnsupportedChannels,
    #[error("resampling error: {0}")]
    Resample(String),
}

impl From<SymphoniaError> for AudioError {
    fn from(err: SymphoniaError) -> Self {
        Self::Symphonia(err)
    }
}

/// Mono samples plus their sample rate.
///
/// Immutable once built; a transcription run owns its buffer and drops it
/// after analysis.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleBuffer {
    samples: Vec<f32>,
    sample_rate: u32,
}

impl SampleBuffer {
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> Self {
        Self {
            samples,
            sample_rate,
        }
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Duration in seconds; zero when the sample rate is zero.
    pub fn duration(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f64 / self.sample_rate as f64
    }
}

/// Lower-cased file extension, if any.
pub fn detect_format<P: AsRef<Path>>(path: P) -> Option<String> {
    path.as_ref()
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|s| s.to_ascii_lowercase())
}

/// Load an audio file as a mono buffer.
///
/// WAV files are read with hound, everything else goes through symphonia's
/// probe. Multi-channel audio is averaged to one channel. With `target_sr`
/// set, the signal is resampled to that rate.
///
/// # Example
/// ```no_run
/// use fretscribe::io;
///
/// let buffer = io::load("riff.mp3", Some(22050)).unwrap();
/// assert_eq!(buffer.sample_rate(), 22050);
/// ```
pub fn load<P: AsRef<Path>>(path: P, target_sr: Option<u32>) -> crate::Result<SampleBuffer> {
    let path = path.as_ref();
    let (interleaved, channels, sample_rate) = match detect_format(path).as_deref() {
        Some("wav") => read_wav(path)?,
        _ => decode(path)?,
    };

    let mono = to_mono(&interleaved, channels);
    tracing::debug!(
        path = %path.display(),
        channels,
        sample_rate,
        frames = mono.len(),
        "decoded audio"
    );

    match target_sr {
        Some(target) if target != sample_rate && sample_rate > 0 => {
            let resampled = resample(&mono, sample_rate, target)?;
            Ok(SampleBuffer::new(resampled, target))
        }
        _ => Ok(SampleBuffer::new(mono, sample_rate)),
    }
}

fn read_wav(path: &Path) -> Result<(Vec<f32>, usize, u32), AudioError> {
    let mut reader = WavReader::open(path)?;
    let spec = reader.spec();

    let samples = match (spec.sample_format, spec.bits_per_sample) {
        (SampleFormat::Float, _) => reader.samples::<f32>().collect::<Result<Vec<_>, _>>()?,
        (SampleFormat::Int, bits) if bits <= 16 => {
            let scale = (1i32 << (bits - 1)) as f32;
            reader
                .samples::<i16>()
                .map(|s| s.map(|v| v as f32 / scale))
                .collect::<Result<Vec<_>, _>>()?
        }
        (SampleFormat::Int, bits) => {
            let scale = (1i64 << (bits - 1)) as f32;
            reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f32 / scale))
                .collect::<Result<Vec<_>, _>>()?
        }
    };

    if spec.channels == 0 {
        return Err(AudioError::UnsupportedChannels);
    }
    Ok((samples, spec.channels as usize, spec.sample_rate))
}

fn decode(path: &Path) -> Result<(Vec<f32>, usize, u32), AudioError> {
    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }

    let file = std::fs::File::open(path).map_err(SymphoniaError::IoError)?;
    let mss = MediaSourceStream::new(Box::new(file), Default::default());
    let probed = symphonia::default::get_probe().format(
        &hint,
        mss,
        &FormatOptions::default(),
        &MetadataOptions::default(),
    )?;

    let mut format = probed.format;
    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.sample_rate.is_some())
        .ok_or(AudioError::NoAudioTrack)?
        .clone();

    let sample_rate = track.codec_params.sample_rate.unwrap_or(0);
    let mut channels = track
        .codec_params
        .channels
        .map(|c| c.count())
        .unwrap_or(0);

    let mut decoder =
        symphonia::default::get_codecs().make(&track.codec_params, &DecoderOptions::default())?;

    let mut samples: Vec<f32> = Vec::new();
    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::ResetRequired) => {
                decoder.reset();
                continue;
            }
            Err(SymphoniaError::IoError(_)) => break,
            Err(e) => return Err(e.into()),
        };

        if packet.track_id() != track.id {
            continue;
        }

        let decoded = match decoder.decode(&packet) {
            Ok(audio) => audio,
            Err(SymphoniaError::IoError(_)) => break,
            Err(SymphoniaError::DecodeError(msg)) => {
                tracing::warn!(%msg, "skipping undecodable packet");
                continue;
            }
            Err(e) => return Err(e.into()),
        };

        // some containers only report the layout once decoding starts
        if channels == 0 {
            channels = decoded.spec().channels.count();
        }
        let mut sb = DecodedSamples::<f32>::new(decoded.capacity() as u64, *decoded.spec());
        sb.copy_interleaved_ref(decoded);
        samples.extend_from_slice(sb.samples());
    }

    if channels == 0 {
        return Err(AudioError::UnsupportedChannels);
    }
    Ok((samples, channels, sample_rate))
}

/// Average interleaved multi-channel audio down to one channel.
pub fn to_mono(interleaved: &[f32], channels: usize) -> Vec<f32> {
    if channels <= 1 {
        return interleaved.to_vec();
    }
    interleaved
        .chunks_exact(channels)
        .map(|frame| frame.iter().sum::<f32>() / channels as f32)
        .collect()
}

/// Resample a mono signal with a windowed-sinc interpolator.
pub fn resample(y: &[f32], src_sr: u32, dst_sr: u32) -> Result<Vec<f32>, AudioError> {
    if src_sr == dst_sr || y.is_empty() {
        return Ok(y.to_vec());
    }
    if src_sr == 0 || dst_sr == 0 {
        return Err(AudioError::Resample(format!(
            "cannot resample {src_sr} Hz to {dst_sr} Hz"
        )));
    }

    let gcd = gcd_u32(src_sr, dst_sr);
    let resample_ratio = (dst_sr / gcd) as f64 / (src_sr / gcd) as f64;

    let chunk_size = 1024usize;
    let params = SincInterpolationParameters {
        sinc_len: 256,
        f_cutoff: 0.95,
        interpolation: SincInterpolationType::Linear,
        oversampling_factor: 256,
        window: WindowFunction::BlackmanHarris2,
    };
    let mut resampler = SincFixedIn::<f32>::new(resample_ratio, 2.0, params, chunk_size, 1)
        .map_err(|e| AudioError::Resample(e.to_string()))?;

    let mut output: Vec<f32> = Vec::new();
    let mut offset = 0usize;
    while offset < y.len() {
        let end = (offset + chunk_size).min(y.len());
        let mut buf = vec![0.0f32; chunk_size];
        buf[..end - offset].copy_from_slice(&y[offset..end]);

        let chunk_out = resampler
            .process(&[buf], None)
            .map_err(|e| AudioError::Resample(e.to_string()))?;
        output.extend_from_slice(&chunk_out[0]);
        offset = end;
    }

    let expected = ((y.len() as f64) * (dst_sr as f64) / (src_sr as f64)).round() as usize;
    output.truncate(expected);
    Ok(output)
}

fn gcd_u32(mut a: u32, mut b: u32) -> u32 {
    while b != 0 {
        let r = a % b;
        a = b;
        b = r;
    }
    a
}

/// Generate a pure tone.
pub fn tone(frequency: f32, sr: u32, duration: f32) -> Vec<f32> {
    let n_samples = (duration * sr as f32) as usize;
    let angular_freq = 2.0 * std::f32::consts::PI * frequency / sr as f32;
    (0..n_samples)
        .map(|i| (angular_freq * i as f32).sin())
        .collect()
}

/// Save a mono signal as a 16-bit PCM WAV file.
///
/// Samples are clipped to [-1.0, 1.0] before quantization.
pub fn save_wav<P: AsRef<Path>>(path: P, y: &[f32], sample_rate: u32) -> crate::Result<()> {
    let spec = WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };

    let mut writer = WavWriter::create(path, spec).map_err(AudioError::Hound)?;
    for &sample in y {
        let s = (sample.clamp(-1.0, 1.0) * i16::MAX as f32) as i16;
        writer.write_sample(s).map_err(AudioError::Hound)?;
    }
    writer.finalize().map_err(AudioError::Hound)?;
    Ok(())
}
