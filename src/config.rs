//! Run configuration, loadable from TOML.
//!
//! ```toml
//! sample_rate = 22050
//! chunk_duration = 5.0
//! hop_length = 2048
//! tuning = ["D", "A", "D", "G", "B", "E"]
//!
//! [export]
//! document = false
//! ```

use crate::io::DEFAULT_SAMPLE_RATE;
use crate::transcribe::estimator::{
    DEFAULT_CHUNK_DURATION, DEFAULT_HOP_LENGTH, EstimatorConfig, StftFeatures,
};
use crate::transcribe::Tuning;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Settings for one transcription run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TranscriberConfig {
    /// Rate the decoded audio is resampled to before analysis.
    pub sample_rate: u32,
    /// Seconds per analysis chunk.
    pub chunk_duration: f64,
    /// Samples between analysis frames.
    pub hop_length: usize,
    /// STFT size.
    pub n_fft: usize,
    /// Estimate the recording's deviation from A440 before computing chroma.
    pub estimate_tuning: bool,
    /// Open-string labels, lowest first; standard tuning when absent.
    pub tuning: Option<Tuning>,
    pub export: ExportConfig,
}

impl Default for TranscriberConfig {
    fn default() -> Self {
        Self {
            sample_rate: DEFAULT_SAMPLE_RATE,
            chunk_duration: DEFAULT_CHUNK_DURATION,
            hop_length: DEFAULT_HOP_LENGTH,
            n_fft: 2048,
            estimate_tuning: true,
            tuning: None,
            export: ExportConfig::default(),
        }
    }
}

/// Output files and document layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExportConfig {
    /// Write `<name>.txt`.
    pub text: bool,
    /// Write the paginated document, `<name>-page-N.svg`.
    pub document: bool,
    /// Characters per printed line before wrapping.
    pub chars_per_line: usize,
    /// Printed lines per page.
    pub lines_per_page: usize,
    /// Font size in document units.
    pub font_size: f32,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            text: true,
            document: true,
            chars_per_line: 100,
            lines_per_page: 48,
            font_size: 12.0,
        }
    }
}

impl TranscriberConfig {
    /// Load a configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> crate::Result<Self> {
        let contents = fs::read_to_string(path.as_ref())?;
        Self::from_toml(&contents)
    }

    /// Parse a configuration from a TOML string; missing keys take defaults.
    pub fn from_toml(toml: &str) -> crate::Result<Self> {
        Ok(toml::from_str(toml)?)
    }

    pub fn to_toml(&self) -> crate::Result<String> {
        Ok(toml::to_string(self)?)
    }

    /// Reject settings that cannot produce a run.
    pub fn validate(&self) -> crate::Result<()> {
        if self.sample_rate == 0 {
            return Err(crate::Error::config("sample_rate", 0, "must be > 0"));
        }
        crate::transcribe::estimator::chunk_samples(self.chunk_duration, self.sample_rate)?;
        if self.hop_length == 0 {
            return Err(crate::Error::config("hop_length", 0, "must be > 0"));
        }
        if self.n_fft == 0 {
            return Err(crate::Error::config("n_fft", 0, "must be > 0"));
        }
        self.export.validate()
    }

    pub fn estimator(&self) -> EstimatorConfig {
        EstimatorConfig {
            chunk_duration: self.chunk_duration,
            hop_length: self.hop_length,
        }
    }

    pub fn features(&self) -> StftFeatures {
        StftFeatures {
            n_fft: self.n_fft,
            tuning: if self.estimate_tuning { None } else { Some(0.0) },
        }
    }
}

impl ExportConfig {
    pub fn validate(&self) -> crate::Result<()> {
        if self.chars_per_line == 0 {
            return Err(crate::Error::config("export.chars_per_line", 0, "must be > 0"));
        }
        if self.lines_per_page == 0 {
            return Err(crate::Error::config("export.lines_per_page", 0, "must be > 0"));
        }
        if !(self.font_size.is_finite() && self.font_size > 0.0) {
            return Err(crate::Error::config(
                "export.font_size",
                self.font_size,
                "must be a positive size",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_is_default() {
        assert_eq!(
            TranscriberConfig::from_toml("").unwrap(),
            TranscriberConfig::default()
        );
    }

    #[test]
    fn partial_toml_overrides() {
        let cfg = TranscriberConfig::from_toml(
            r#"
            chunk_duration = 2.5
            tuning = ["D", "A", "D", "G", "B", "E"]

            [export]
            document = false
            "#,
        )
        .unwrap();
        assert_eq!(cfg.chunk_duration, 2.5);
        assert_eq!(cfg.tuning.unwrap().label(0), Some("D"));
        assert!(!cfg.export.document);
        assert!(cfg.export.text);
        assert_eq!(cfg.hop_length, 2048);
    }

    #[test]
    fn short_tuning_fails_to_parse() {
        assert!(matches!(
            TranscriberConfig::from_toml(r#"tuning = ["E", "A"]"#),
            Err(crate::Error::Config(_))
        ));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(TranscriberConfig::from_toml("hop = 512").is_err());
    }

    #[test]
    fn toml_roundtrip() {
        let mut cfg = TranscriberConfig::default();
        cfg.tuning = Some(Tuning::standard());
        cfg.estimate_tuning = false;
        let text = cfg.to_toml().unwrap();
        assert_eq!(TranscriberConfig::from_toml(&text).unwrap(), cfg);
    }

    #[test]
    fn validate_rejects_bad_values() {
        let mut cfg = TranscriberConfig::default();
        cfg.chunk_duration = 0.0;
        assert!(cfg.validate().is_err());

        let mut cfg = TranscriberConfig::default();
        cfg.hop_length = 0;
        assert!(cfg.validate().is_err());

        let mut cfg = TranscriberConfig::default();
        cfg.export.font_size = -1.0;
        assert!(cfg.validate().is_err());

        assert!(TranscriberConfig::default().validate().is_ok());
    }

    #[test]
    fn features_follow_tuning_switch() {
        let mut cfg = TranscriberConfig::default();
        assert_eq!(cfg.features().tuning, None);
        cfg.estimate_tuning = false;
        assert_eq!(cfg.features().tuning, Some(0.0));
    }
}
