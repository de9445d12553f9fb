use fretscribe::Error;
use fretscribe::io::SampleBuffer;
use fretscribe::transcribe::{Tuning, detect_tuning, map_pitch_to_fret};

#[test]
fn standard_tuning_labels() {
    let t = Tuning::standard();
    assert_eq!(t.labels(), ["E", "A", "D", "G", "B", "E"]);
    assert_eq!(t, Tuning::default());
}

#[test]
fn every_chroma_bin_maps_below_fret_two() {
    let t = Tuning::standard();
    for pc in 0..12i64 {
        let pos = map_pitch_to_fret(pc, &t).unwrap();
        assert_eq!(pos.string_index, (pc % 6) as usize);
        assert_eq!(pos.fret, (pc / 6) as usize);
        assert!(pos.fret < 2);
        assert_eq!(pos.string, t.labels()[pos.string_index]);
    }
}

#[test]
fn large_pitch_classes_give_high_frets() {
    let pos = map_pitch_to_fret(1_000, &Tuning::standard()).unwrap();
    assert_eq!(pos.string_index, 4);
    assert_eq!(pos.string, "B");
    assert_eq!(pos.fret, 166);
}

#[test]
fn negative_pitch_class_is_invalid_input() {
    assert!(matches!(
        map_pitch_to_fret(-6, &Tuning::standard()),
        Err(Error::InvalidInput { .. })
    ));
}

#[test]
fn mapping_uses_given_labels() {
    let t: Tuning = "C G C F A D".parse().unwrap();
    let pos = map_pitch_to_fret(9, &t).unwrap();
    assert_eq!((pos.string_index, pos.string.as_str(), pos.fret), (3, "F", 1));
}

#[test]
fn wrong_label_count_is_invalid_input() {
    let err = "E A D G B E A".parse::<Tuning>().unwrap_err();
    assert!(matches!(err, Error::InvalidInput { name: "tuning", .. }));
    assert!(Tuning::new(Vec::<String>::new()).is_err());
}

#[test]
fn detected_tuning_does_not_depend_on_audio() {
    let quiet = SampleBuffer::new(vec![0.0; 10], 8000);
    let loud = SampleBuffer::new(fretscribe::io::tone(82.41, 22050, 0.5), 22050);
    let empty = SampleBuffer::new(Vec::new(), 22050);
    assert_eq!(detect_tuning(&quiet), Tuning::standard());
    assert_eq!(detect_tuning(&loud), Tuning::standard());
    assert_eq!(detect_tuning(&empty), Tuning::standard());
}
