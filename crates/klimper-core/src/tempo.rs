//! Tempo grid for the sequencer.
//!
//! Note lengths are whole sample counts derived with integer division, so the
//! grid is exact and identical on every platform.

/// Note lengths the sequencer picks from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum NoteDivision {
    /// Quarter note (1 beat)
    #[default]
    Quarter,
    /// Eighth note (1/2 beat)
    Eighth,
    /// Sixteenth note (1/4 beat)
    Sixteenth,
}

impl NoteDivision {
    /// All divisions, longest first.
    pub const ALL: [NoteDivision; 3] = [
        NoteDivision::Quarter,
        NoteDivision::Eighth,
        NoteDivision::Sixteenth,
    ];

    /// Number of beats this division represents.
    pub fn beats(&self) -> f32 {
        match self {
            NoteDivision::Quarter => 1.0,
            NoteDivision::Eighth => 0.5,
            NoteDivision::Sixteenth => 0.25,
        }
    }

    /// Position in [`NoteDivision::ALL`].
    pub fn index(&self) -> usize {
        match self {
            NoteDivision::Quarter => 0,
            NoteDivision::Eighth => 1,
            NoteDivision::Sixteenth => 2,
        }
    }

    /// Division at `index` in [`NoteDivision::ALL`], saturating at the shortest.
    pub fn from_index(index: usize) -> Self {
        Self::ALL[index.min(Self::ALL.len() - 1)]
    }
}

/// Sample counts for each [`NoteDivision`] at a given tempo.
///
/// `quarter = sample_rate * 60 / bpm`, each shorter division halves the
/// previous one, all with integer division.
///
/// # Example
///
/// ```rust
/// use klimper_core::{DurationTable, NoteDivision};
///
/// let table = DurationTable::new(44100, 80);
/// assert_eq!(table.samples(NoteDivision::Quarter), 33075);
/// assert_eq!(table.samples(NoteDivision::Eighth), 16537);
/// assert_eq!(table.samples(NoteDivision::Sixteenth), 8268);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DurationTable {
    sample_rate: u32,
    bpm: u32,
    samples: [u32; 3],
}

impl DurationTable {
    /// Builds the table. `bpm` below 1 is treated as 1.
    pub fn new(sample_rate: u32, bpm: u32) -> Self {
        let bpm = bpm.max(1);
        let quarter = sample_rate.saturating_mul(60) / bpm;
        let eighth = quarter / 2;
        let sixteenth = eighth / 2;
        Self {
            sample_rate,
            bpm,
            samples: [quarter, eighth, sixteenth],
        }
    }

    /// Recomputes the table for a new tempo.
    pub fn set_bpm(&mut self, bpm: u32) {
        *self = Self::new(self.sample_rate, bpm);
    }

    /// Current tempo.
    pub fn bpm(&self) -> u32 {
        self.bpm
    }

    /// Sample rate the table was computed for.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Length of `division` in samples.
    #[inline]
    pub fn samples(&self, division: NoteDivision) -> u32 {
        self.samples[division.index()]
    }
}
