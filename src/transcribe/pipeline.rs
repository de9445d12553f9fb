//! End-to-end run: sample buffer in, tablature out.

use super::estimator::{FeatureExtractor, NoteEvent, StftFeatures, analyze_notes};
use super::fretboard::{FretPosition, Tuning, detect_tuning, map_pitch_to_fret};
use super::tab::{TabGrid, notes_to_tab};
use crate::config::TranscriberConfig;
use crate::io::{self, SampleBuffer};
use std::path::Path;

/// Everything one run produced.
#[derive(Debug, Clone, PartialEq)]
pub struct Transcription {
    pub tuning: Tuning,
    /// Detected notes in onset order.
    pub notes: Vec<NoteEvent>,
    /// Fretboard position of each note, same order as `notes`.
    pub positions: Vec<FretPosition>,
    pub grid: TabGrid,
}

impl Transcription {
    /// Rendered tab text.
    pub fn tab_text(&self) -> String {
        self.grid.render()
    }
}

/// Runs estimation, mapping and layout with one configuration.
#[derive(Debug, Clone)]
pub struct Transcriber<E = StftFeatures> {
    config: TranscriberConfig,
    extractor: E,
}

impl Transcriber<StftFeatures> {
    /// A transcriber with STFT features configured from `config`.
    ///
    /// # Errors
    /// [`crate::Error::InvalidConfig`] when the configuration does not validate.
    pub fn new(config: TranscriberConfig) -> crate::Result<Self> {
        config.validate()?;
        let extractor = config.features();
        Ok(Self { config, extractor })
    }
}

impl<E: FeatureExtractor> Transcriber<E> {
    /// A transcriber with a custom feature extractor.
    pub fn with_extractor(config: TranscriberConfig, extractor: E) -> crate::Result<Self> {
        config.validate()?;
        Ok(Self { config, extractor })
    }

    pub fn config(&self) -> &TranscriberConfig {
        &self.config
    }

    /// Transcribe an already decoded buffer.
    ///
    /// The buffer is analyzed at its own sample rate.
    pub fn transcribe(&self, buffer: &SampleBuffer) -> crate::Result<Transcription> {
        let tuning = match &self.config.tuning {
            Some(tuning) => tuning.clone(),
            None => detect_tuning(buffer),
        };

        let notes = analyze_notes(buffer, &self.config.estimator(), &self.extractor)?;
        let positions = notes
            .iter()
            .map(|note| {
                let pitch_class = i64::try_from(note.pitch_class).map_err(|_| {
                    crate::Error::input("pitch_class", note.pitch_class, "out of range")
                })?;
                map_pitch_to_fret(pitch_class, &tuning)
            })
            .collect::<crate::Result<Vec<_>>>()?;
        let grid = notes_to_tab(&positions, &tuning);

        tracing::info!(
            seconds = buffer.duration(),
            notes = notes.len(),
            dropped = grid.dropped(),
            tuning = %tuning,
            "transcribed"
        );

        Ok(Transcription {
            tuning,
            notes,
            positions,
            grid,
        })
    }

    /// Decode `path` at the configured sample rate and transcribe it.
    pub fn transcribe_file<P: AsRef<Path>>(&self, path: P) -> crate::Result<Transcription> {
        let buffer = io::load(path, Some(self.config.sample_rate))?;
        self.transcribe(&buffer)
    }
}

/// Transcribe a buffer with the default configuration.
pub fn transcribe(buffer: &SampleBuffer) -> crate::Result<Transcription> {
    Transcriber::new(TranscriberConfig::default())?.transcribe(buffer)
}
