//! Guitar transcription: note estimation, fretboard mapping and tab layout.
//!
//! [`estimator`] turns a sample buffer into [`NoteEvent`]s, [`fretboard`]
//! places each pitch class on a string and fret, and [`tab`] lays the
//! positions out on a fixed-width grid. [`pipeline`] chains the three.

pub mod estimator;
pub mod fretboard;
pub mod pipeline;
pub mod tab;

pub use estimator::{
    ChunkFeatures, EstimatorConfig, FeatureExtractor, NoteEvent, StftFeatures, analyze_notes,
    chunk_samples,
};
pub use fretboard::{FretPosition, STRING_COUNT, Tuning, detect_tuning, map_pitch_to_fret};
pub use pipeline::{Transcriber, Transcription, transcribe};
pub use tab::{EMPTY_CELL, TAB_COLUMNS, TabGrid, fret_symbol, notes_to_tab};
