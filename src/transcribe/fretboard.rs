//! Pitch class to (string, fret) mapping on a fixed six-string tuning.

use crate::io::SampleBuffer;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Strings on the instrument; every [`Tuning`] has exactly this many labels.
pub const STRING_COUNT: usize = 6;

/// Open-string labels, index 0 is the lowest string.
///
/// Labels are free-form text; they are shown in the tab but never
/// interpreted as pitches.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct Tuning {
    labels: [String; STRING_COUNT],
}

impl Tuning {
    /// Standard guitar tuning, E A D G B E.
    pub fn standard() -> Self {
        Self {
            labels: ["E", "A", "D", "G", "B", "E"].map(String::from),
        }
    }

    /// Build a tuning from exactly six labels, lowest string first.
    ///
    /// # Errors
    /// [`crate::Error::InvalidInput`] when the label count is not six.
    pub fn new<I, S>(labels: I) -> crate::Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let labels: Vec<String> = labels.into_iter().map(Into::into).collect();
        let count = labels.len();
        let labels: [String; STRING_COUNT] = labels.try_into().map_err(|_| {
            crate::Error::input(
                "tuning",
                format!("{count} strings"),
                format!("a tuning needs exactly {STRING_COUNT} labels"),
            )
        })?;
        Ok(Self { labels })
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Label of the string at `index`, lowest string at 0.
    pub fn label(&self, index: usize) -> Option<&str> {
        self.labels.get(index).map(String::as_str)
    }
}

impl Default for Tuning {
    fn default() -> Self {
        Self::standard()
    }
}

impl TryFrom<Vec<String>> for Tuning {
    type Error = crate::Error;

    fn try_from(labels: Vec<String>) -> crate::Result<Self> {
        Tuning::new(labels)
    }
}

impl From<Tuning> for Vec<String> {
    fn from(tuning: Tuning) -> Self {
        tuning.labels.into()
    }
}

impl FromStr for Tuning {
    type Err = crate::Error;

    /// Parse labels separated by commas and/or whitespace, e.g. `"D,A,D,G,B,E"`.
    fn from_str(s: &str) -> crate::Result<Self> {
        Tuning::new(
            s.split(|c: char| c == ',' || c.is_whitespace())
                .filter(|label| !label.is_empty()),
        )
    }
}

impl fmt::Display for Tuning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.labels.join(" "))
    }
}

/// Tuning used for a recording.
///
/// Always standard tuning: no estimation is attempted from the audio.
pub fn detect_tuning(_buffer: &SampleBuffer) -> Tuning {
    Tuning::standard()
}

/// Where a note is played.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FretPosition {
    /// Index into the tuning, 0 = lowest string.
    pub string_index: usize,
    /// Label of that string.
    pub string: String,
    pub fret: usize,
}

/// Map a pitch class to a string and fret.
///
/// `string_index = pitch_class mod 6`, `fret = pitch_class div 6`. The fret
/// is not bounded by the length of a real fretboard.
///
/// # Errors
/// [`crate::Error::InvalidInput`] for a negative pitch class.
///
/// # Example
/// ```
/// use fretscribe::transcribe::{Tuning, map_pitch_to_fret};
///
/// let pos = map_pitch_to_fret(14, &Tuning::standard()).unwrap();
/// assert_eq!((pos.string_index, pos.string.as_str(), pos.fret), (2, "D", 2));
/// ```
pub fn map_pitch_to_fret(pitch_class: i64, tuning: &Tuning) -> crate::Result<FretPosition> {
    if pitch_class < 0 {
        return Err(crate::Error::input(
            "pitch_class",
            pitch_class,
            "must be non-negative",
        ));
    }
    let strings = STRING_COUNT as i64;
    let string_index = (pitch_class % strings) as usize;
    let fret = usize::try_from(pitch_class / strings)
        .map_err(|_| crate::Error::input("pitch_class", pitch_class, "fret does not fit usize"))?;
    Ok(FretPosition {
        string_index,
        string: tuning.labels[string_index].clone(),
        fret,
    })
}
