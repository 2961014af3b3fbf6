/*
Pattern Compiler
================

Turns one instrument row into the beat-pattern descriptor the audio engine
plays. A descriptor is the list of positions (in steps) at which the
instrument sounds during one cycle:

    steps:   0:x  1:.  2:x/4  3:.  ...           (x = active, /4 = 4 hits)
    output:  0, 2, 2.25, 2.5, 2.75

A subdivided step splits its slot into N equal hits, all sounding the same
instrument. Rows are scanned in index order, so positions come out ascending.
A row with nothing to play compiles to the rest sentinel `-` rather than an
empty list, so the engine still reserves the track.

Positions are kept as exact fractions (`step + hit/of`). They only become
floating point when formatted, which keeps ordering and equality exact.
*/

use std::cmp::Ordering;
use std::fmt;

#[cfg(feature = "serde")]
use serde::Serialize;

use super::grid::{Row, Step};

/// Text the engine reads as "no hits this cycle"
pub const REST: &str = "-";

/// A trigger position within the cycle, measured in steps
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BeatPosition {
    step: u32,
    /// Numerator of the fractional part (reduced)
    hit: u32,
    /// Denominator of the fractional part (reduced, 1 when on the step)
    of: u32,
}

impl BeatPosition {
    /// Position exactly on a step
    pub fn on_step(step: u32) -> Self {
        Self { step, hit: 0, of: 1 }
    }

    /// Position `hit/of` of the way through `step`.
    ///
    /// `hit` must be smaller than `of`.
    pub fn within_step(step: u32, hit: u32, of: u32) -> Self {
        debug_assert!(of > 0 && hit < of, "fraction must lie within the step");
        if hit == 0 {
            return Self::on_step(step);
        }
        let divisor = gcd(hit, of);
        Self {
            step,
            hit: hit / divisor,
            of: of / divisor,
        }
    }

    /// The step this position falls in
    pub fn step(&self) -> u32 {
        self.step
    }

    /// True when the position is a whole step number
    pub fn is_whole(&self) -> bool {
        self.hit == 0
    }

    pub fn as_f64(&self) -> f64 {
        self.step as f64 + self.hit as f64 / self.of as f64
    }
}

impl Ord for BeatPosition {
    fn cmp(&self, other: &Self) -> Ordering {
        // Fractions are reduced, so cross-multiplying compares them exactly
        self.step.cmp(&other.step).then_with(|| {
            (self.hit as u64 * other.of as u64).cmp(&(other.hit as u64 * self.of as u64))
        })
    }
}

impl PartialOrd for BeatPosition {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for BeatPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_whole() {
            write!(f, "{}", self.step)
        } else {
            write!(f, "{}", self.as_f64())
        }
    }
}

/// Compiled descriptor for one instrument
#[cfg_attr(feature = "serde", derive(Serialize))]
#[cfg_attr(feature = "serde", serde(into = "String"))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BeatPattern {
    /// Nothing to play; the engine keeps the track silent
    Rest,
    /// Ascending, non-empty trigger positions
    Hits(Vec<BeatPosition>),
}

impl BeatPattern {
    /// Compile a row's steps into a descriptor
    pub fn compile(steps: &[Step]) -> Self {
        let mut positions = Vec::new();

        for (index, step) in steps.iter().enumerate() {
            if !step.active {
                continue;
            }
            let index = index as u32;
            let hits = step.subdivision.get() as u32;
            positions.extend((0..hits).map(|hit| BeatPosition::within_step(index, hit, hits)));
        }

        if positions.is_empty() {
            BeatPattern::Rest
        } else {
            BeatPattern::Hits(positions)
        }
    }

    /// Compile an instrument row
    pub fn from_row(row: &Row) -> Self {
        Self::compile(&row.steps)
    }

    pub fn is_rest(&self) -> bool {
        matches!(self, BeatPattern::Rest)
    }

    /// Trigger positions (empty for a rest)
    pub fn positions(&self) -> &[BeatPosition] {
        match self {
            BeatPattern::Rest => &[],
            BeatPattern::Hits(positions) => positions,
        }
    }

    /// Number of triggers per cycle
    pub fn len(&self) -> usize {
        self.positions().len()
    }

    pub fn is_empty(&self) -> bool {
        self.is_rest()
    }
}

impl fmt::Display for BeatPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BeatPattern::Rest => f.write_str(REST),
            BeatPattern::Hits(positions) => {
                for (i, position) in positions.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{position}")?;
                }
                Ok(())
            }
        }
    }
}

impl From<BeatPattern> for String {
    fn from(pattern: BeatPattern) -> Self {
        pattern.to_string()
    }
}

fn gcd(mut a: u32, mut b: u32) -> u32 {
    while b != 0 {
        let r = a % b;
        a = b;
        b = r;
    }
    a
}
