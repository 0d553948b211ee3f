use std::fmt;

use serde::{Deserialize, Serialize};

use super::Speaker;

/// A single time-aligned word from one speaker. Timestamps are seconds
/// from the start of the containing audio file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Word {
    pub start: f64,
    pub end: f64,
    pub text: String,
    pub speaker: Speaker,
}

impl Word {
    pub fn new(start: f64, end: f64, text: impl Into<String>, speaker: Speaker) -> Self {
        Self {
            start,
            end,
            text: text.into(),
            speaker,
        }
    }

    pub fn duration(&self) -> f64 {
        self.end - self.start
    }
}

impl fmt::Display for Word {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Inter-pausal unit: a maximal single-speaker stretch of words bounded by
/// silence markers (`#`) in the source annotation. Boundaries come from the
/// annotation, never from computed gaps.
///
/// The id is derived from speaker and boundaries so turns can reference
/// IPUs weakly without embedding them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ipu {
    pub ipu_id: String,
    pub words: Vec<Word>,
    pub start: f64,
    pub end: f64,
    pub speaker: Speaker,
    pub text: String,
}

impl Ipu {
    /// Build an IPU from its member words.
    ///
    /// `words` must be non-empty, time-ordered, and all from one speaker;
    /// the parsers guarantee this by construction.
    pub fn new(words: Vec<Word>) -> Self {
        assert!(!words.is_empty(), "an IPU needs at least one word");
        let start = words[0].start;
        let end = words[words.len() - 1].end;
        let speaker = words[0].speaker;
        let text = words
            .iter()
            .map(|w| w.text.as_str())
            .collect::<Vec<_>>()
            .join(" ");
        Self {
            ipu_id: ipu_id(speaker, start, end),
            words,
            start,
            end,
            speaker,
            text,
        }
    }

    pub fn duration(&self) -> f64 {
        self.end - self.start
    }

    pub fn num_words(&self) -> usize {
        self.words.len()
    }
}

impl fmt::Display for Ipu {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[IPU ({}) {:.2}:{:.2} ] {}",
            self.speaker, self.start, self.end, self.text
        )
    }
}

/// Deterministic IPU identity from speaker and boundaries.
pub fn ipu_id(speaker: Speaker, start: f64, end: f64) -> String {
    format!("ipu_{}_{:.3}_{:.3}", speaker, start, end)
}
