use fretscribe::Error;
use fretscribe::io::{SampleBuffer, tone};
use fretscribe::transcribe::{
    EstimatorConfig, FeatureExtractor, NoteEvent, StftFeatures, analyze_notes,
};
use ndarray::Array2;
use std::cell::Cell;

/// Returns the same chroma and onsets for every chunk and counts calls.
struct Scripted {
    chroma: Array2<f32>,
    onsets: Vec<usize>,
    calls: Cell<usize>,
}

impl Scripted {
    fn new(chroma: Array2<f32>, onsets: Vec<usize>) -> Self {
        Self {
            chroma,
            onsets,
            calls: Cell::new(0),
        }
    }
}

impl FeatureExtractor for Scripted {
    fn chroma(&self, _chunk: &[f32], _sr: u32, _hop: usize) -> fretscribe::Result<Array2<f32>> {
        self.calls.set(self.calls.get() + 1);
        Ok(self.chroma.clone())
    }

    fn onsets(&self, _chunk: &[f32], _sr: u32, _hop: usize) -> fretscribe::Result<Vec<usize>> {
        Ok(self.onsets.clone())
    }
}

fn config(chunk_duration: f64, hop_length: usize) -> EstimatorConfig {
    EstimatorConfig {
        chunk_duration,
        hop_length,
    }
}

#[test]
fn argmax_ties_pick_lowest_class() {
    let extractor = Scripted::new(Array2::from_elem((12, 4), 0.5), vec![1]);
    let buffer = SampleBuffer::new(vec![0.0; 100], 1000);
    let notes = analyze_notes(&buffer, &config(1.0, 10), &extractor).unwrap();
    assert_eq!(notes, vec![NoteEvent::new(1, 0)]);
}

#[test]
fn chunk_frames_are_offset_by_chunk_start() {
    let mut chroma = Array2::zeros((12, 11));
    chroma[[4, 1]] = 1.0;
    chroma[[11, 4]] = 0.9;
    let extractor = Scripted::new(chroma, vec![1, 4]);

    // 2500 samples in 1000-sample chunks: starts 0, 1000, 2000
    let buffer = SampleBuffer::new(vec![0.0; 2500], 1000);
    let notes = analyze_notes(&buffer, &config(1.0, 100), &extractor).unwrap();

    let frames: Vec<usize> = notes.iter().map(|n| n.onset_frame).collect();
    let classes: Vec<usize> = notes.iter().map(|n| n.pitch_class).collect();
    assert_eq!(frames, vec![1, 4, 11, 14, 21, 24]);
    assert_eq!(classes, vec![4, 11, 4, 11, 4, 11]);
    assert_eq!(extractor.calls.get(), 3);
}

#[test]
fn uneven_hop_keeps_frames_non_decreasing() {
    let extractor = Scripted::new(Array2::from_elem((12, 4), 1.0), vec![0, 3]);
    // chunk 1000 samples, hop 300: bases 0, 3, 6
    let buffer = SampleBuffer::new(vec![0.0; 3000], 1000);
    let notes = analyze_notes(&buffer, &config(1.0, 300), &extractor).unwrap();
    let frames: Vec<usize> = notes.iter().map(|n| n.onset_frame).collect();
    assert_eq!(frames, vec![0, 3, 3, 6, 6, 9]);
    assert!(frames.windows(2).all(|w| w[0] <= w[1]));
}

#[test]
fn onsets_without_chroma_frame_are_skipped() {
    let extractor = Scripted::new(Array2::from_elem((12, 2), 1.0), vec![1, 2, 7]);
    let buffer = SampleBuffer::new(vec![0.0; 50], 1000);
    let notes = analyze_notes(&buffer, &config(1.0, 10), &extractor).unwrap();
    assert_eq!(notes, vec![NoteEvent::new(1, 0)]);
}

#[test]
fn empty_buffer_gives_no_notes() {
    let extractor = Scripted::new(Array2::from_elem((12, 1), 1.0), vec![0]);
    let buffer = SampleBuffer::new(Vec::new(), 22050);
    let notes = analyze_notes(&buffer, &EstimatorConfig::default(), &extractor).unwrap();
    assert!(notes.is_empty());
    assert_eq!(extractor.calls.get(), 0);
}

#[test]
fn bad_chunking_is_invalid_config() {
    let extractor = Scripted::new(Array2::zeros((12, 1)), Vec::new());
    let buffer = SampleBuffer::new(vec![0.0; 10], 22050);
    for cfg in [config(0.0, 2048), config(-2.0, 2048), config(5.0, 0)] {
        assert!(matches!(
            analyze_notes(&buffer, &cfg, &extractor),
            Err(Error::InvalidConfig { .. })
        ));
    }
}

#[test]
fn silence_has_no_notes() {
    let buffer = SampleBuffer::new(vec![0.0; 22050 * 2], 22050);
    let notes = analyze_notes(&buffer, &EstimatorConfig::default(), &StftFeatures::default())
        .unwrap();
    assert!(notes.is_empty());
}

/// Three tones starting on analysis frame boundaries, each faded out before
/// the next starts.
fn three_note_phrase(sr: u32, hop: usize) -> (Vec<f32>, [(usize, usize); 3]) {
    let notes = [(2, 196.0, 7), (12, 220.0, 9), (22, 329.63, 4)];
    let mut y = vec![0.0f32; 30 * hop];
    for &(frame, freq, _) in &notes {
        let len = 6 * hop;
        let fade = hop;
        for (i, s) in tone(freq, sr, len as f32 / sr as f32).into_iter().enumerate() {
            let gain = if i + fade > len {
                (len - i) as f32 / fade as f32
            } else {
                1.0
            };
            y[frame * hop + i] = 0.8 * s * gain;
        }
    }
    (y, notes.map(|(frame, _, pc)| (frame, pc)))
}

#[test]
fn tones_are_found_at_their_onsets() {
    let sr = 22050;
    let hop = 2048;
    let (y, expected) = three_note_phrase(sr, hop);
    let buffer = SampleBuffer::new(y, sr);
    let features = StftFeatures {
        tuning: Some(0.0),
        ..StftFeatures::default()
    };
    let notes = analyze_notes(&buffer, &config(5.0, hop), &features).unwrap();

    for (frame, pitch_class) in expected {
        assert!(
            notes
                .iter()
                .any(|n| n.onset_frame.abs_diff(frame) <= 1 && n.pitch_class == pitch_class),
            "no pitch class {pitch_class} near frame {frame}: {notes:?}"
        );
    }
    assert!(notes.windows(2).all(|w| w[0].onset_frame <= w[1].onset_frame));
}

#[test]
fn noise_yields_valid_pitch_classes() {
    use rand::{Rng, SeedableRng, rngs::StdRng};

    let mut rng = StdRng::seed_from_u64(7);
    let y: Vec<f32> = (0..22050 * 3).map(|_| rng.gen_range(-0.5..0.5)).collect();
    let buffer = SampleBuffer::new(y, 22050);
    let notes = analyze_notes(&buffer, &config(1.0, 2048), &StftFeatures::default()).unwrap();
    assert!(notes.iter().all(|n| n.pitch_class < 12));
    assert!(notes.windows(2).all(|w| w[0].onset_frame <= w[1].onset_frame));
}
