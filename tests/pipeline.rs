use fretscribe::config::TranscriberConfig;
use fretscribe::io::{self, SampleBuffer};
use fretscribe::transcribe::{self, Transcriber, Tuning};

fn phrase(sr: u32) -> Vec<f32> {
    let hop = 2048;
    let mut y = vec![0.0f32; 4 * hop];
    let mut note = io::tone(196.0, sr, 0.5);
    let fade = note.len() / 4;
    let len = note.len();
    for (i, s) in note.iter_mut().enumerate().skip(len - fade) {
        *s *= (len - i) as f32 / fade as f32;
    }
    y.extend(note.iter().map(|s| 0.8 * s));
    y.extend(vec![0.0f32; 4 * hop]);
    y
}

#[test]
fn silence_transcribes_to_empty_tab() {
    let buffer = SampleBuffer::new(vec![0.0; 22050], 22050);
    let out = transcribe::transcribe(&buffer).unwrap();
    assert!(out.notes.is_empty());
    assert!(out.positions.is_empty());
    assert_eq!(out.tuning, Tuning::standard());

    let text = out.tab_text();
    assert_eq!(text.lines().count(), 6);
    assert!(text.lines().all(|l| l.chars().filter(|c| c.is_ascii_digit()).count() == 0));
}

#[test]
fn empty_buffer_is_not_an_error() {
    let out = transcribe::transcribe(&SampleBuffer::new(Vec::new(), 22050)).unwrap();
    assert!(out.notes.is_empty());
    assert_eq!(out.grid.dropped(), 0);
}

#[test]
fn positions_agree_with_notes_and_grid() {
    let buffer = SampleBuffer::new(phrase(22050), 22050);
    let out = transcribe::transcribe(&buffer).unwrap();
    assert!(!out.notes.is_empty());
    assert_eq!(out.notes.len(), out.positions.len());

    for (ordinal, (note, pos)) in out.notes.iter().zip(&out.positions).enumerate() {
        assert_eq!(pos.fret * 6 + pos.string_index, note.pitch_class);
        if ordinal < 200 {
            let expected = fretscribe::transcribe::fret_symbol(pos.fret);
            assert_eq!(out.grid.cell(pos.string_index, ordinal), Some(expected));
        }
    }
    assert!(out.notes.iter().any(|n| n.pitch_class == 7));
}

#[test]
fn wav_file_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("phrase.wav");
    io::save_wav(&path, &phrase(22050), 22050).unwrap();

    let transcriber = Transcriber::new(TranscriberConfig::default()).unwrap();
    let from_file = transcriber.transcribe_file(&path).unwrap();
    assert!(from_file.notes.iter().any(|n| n.pitch_class == 7));
    assert_eq!(from_file.tab_text().lines().count(), 6);
}

#[test]
fn wav_at_other_rate_is_resampled() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("phrase44.wav");
    io::save_wav(&path, &phrase(44100), 44100).unwrap();

    let buffer = io::load(&path, Some(22050)).unwrap();
    assert_eq!(buffer.sample_rate(), 22050);

    let transcriber = Transcriber::new(TranscriberConfig::default()).unwrap();
    let out = transcriber.transcribe_file(&path).unwrap();
    assert_eq!(out.tab_text().lines().count(), 6);
}

#[test]
fn configured_tuning_is_used() {
    let config = TranscriberConfig {
        tuning: Some("D A D G B E".parse().unwrap()),
        ..TranscriberConfig::default()
    };
    let transcriber = Transcriber::new(config).unwrap();
    let out = transcriber
        .transcribe(&SampleBuffer::new(phrase(22050), 22050))
        .unwrap();
    assert_eq!(out.tuning.label(0), Some("D"));
    let lowest: Vec<String> = out.grid.row(0).unwrap().iter().map(|c| c.to_string()).collect();
    assert!(out.tab_text().ends_with(&format!("D|{}|", lowest.join("-"))));
}

#[test]
fn missing_file_is_an_error() {
    let transcriber = Transcriber::new(TranscriberConfig::default()).unwrap();
    assert!(transcriber.transcribe_file("does/not/exist.wav").is_err());
}
