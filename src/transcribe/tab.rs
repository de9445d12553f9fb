//! Fixed-width tablature grid and its text form.

use super::fretboard::{FretPosition, STRING_COUNT, Tuning};
use std::fmt;

/// Columns in a tab grid.
pub const TAB_COLUMNS: usize = 200;

/// Symbol for a cell with no note.
pub const EMPTY_CELL: char = '-';

/// Cell symbol for a fret: the fret itself below 10, its last decimal digit
/// from 10 up.
///
/// # Example
/// ```
/// use fretscribe::transcribe::fret_symbol;
///
/// assert_eq!(fret_symbol(7), '7');
/// assert_eq!(fret_symbol(12), '2');
/// ```
pub fn fret_symbol(fret: usize) -> char {
    char::from(b'0' + (fret % 10) as u8)
}

/// Bounded grid of note cells, one row per string.
///
/// Columns are assigned by a note's ordinal among all notes of the run, so a
/// row has gaps where other strings sound. Ordinals at or past
/// [`TAB_COLUMNS`] are dropped and counted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabGrid {
    labels: Vec<String>,
    rows: Vec<[char; TAB_COLUMNS]>,
    dropped: usize,
}

impl TabGrid {
    /// An all-empty grid for `tuning`.
    pub fn new(tuning: &Tuning) -> Self {
        Self {
            labels: tuning.labels().to_vec(),
            rows: vec![[EMPTY_CELL; TAB_COLUMNS]; STRING_COUNT],
            dropped: 0,
        }
    }

    /// Write the note with ordinal `ordinal` into its string's row.
    ///
    /// Returns `false` when the ordinal is outside the grid and the note was
    /// dropped. A second write to the same cell replaces the first.
    pub fn place(&mut self, ordinal: usize, position: &FretPosition) -> bool {
        if ordinal >= TAB_COLUMNS {
            self.dropped += 1;
            return false;
        }
        match self.rows.get_mut(position.string_index) {
            Some(row) => {
                row[ordinal] = fret_symbol(position.fret);
                true
            }
            None => {
                self.dropped += 1;
                false
            }
        }
    }

    /// Cell symbol at (`string_index`, `column`).
    pub fn cell(&self, string_index: usize, column: usize) -> Option<char> {
        self.rows.get(string_index)?.get(column).copied()
    }

    /// Cells of one string, lowest string at 0.
    pub fn row(&self, string_index: usize) -> Option<&[char]> {
        self.rows.get(string_index).map(|r| r.as_slice())
    }

    /// Notes that did not fit into the grid.
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    /// Text form: highest string first, one line per string, each line
    /// `label|c-c-...-c|`, lines separated by `\n` with no trailing newline.
    pub fn render(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for TabGrid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (line, (label, row)) in self.labels.iter().zip(&self.rows).rev().enumerate() {
            if line > 0 {
                writeln!(f)?;
            }
            write!(f, "{label}|")?;
            for (col, cell) in row.iter().enumerate() {
                if col > 0 {
                    write!(f, "-")?;
                }
                write!(f, "{cell}")?;
            }
            write!(f, "|")?;
        }
        Ok(())
    }
}

/// Lay mapped notes out on a fresh grid, in onset order.
pub fn notes_to_tab(positions: &[FretPosition], tuning: &Tuning) -> TabGrid {
    let mut grid = TabGrid::new(tuning);
    for (ordinal, position) in positions.iter().enumerate() {
        grid.place(ordinal, position);
    }
    if grid.dropped() > 0 {
        tracing::warn!(
            dropped = grid.dropped(),
            capacity = TAB_COLUMNS,
            "tab grid full, later notes left out"
        );
    }
    grid
}
