const PITCH_CLASSES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// Name of a chroma bin in a C-based 12-bin chromagram.
///
/// # Example
/// ```
/// use fretscribe::convert::pitch_class_name;
///
/// assert_eq!(pitch_class_name(0), Some("C"));
/// assert_eq!(pitch_class_name(9), Some("A"));
/// assert_eq!(pitch_class_name(12), None);
/// ```
pub fn pitch_class_name(pitch_class: usize) -> Option<&'static str> {
    PITCH_CLASSES.get(pitch_class).copied()
}
