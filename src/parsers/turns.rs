use std::path::Path;

use anyhow::{Context, Result};

use crate::models::Speaker;

/// One raw line of a turn-taking annotation file: a declared turn interval
/// with its transition label, or a `#` silence interval.
#[derive(Debug, Clone, PartialEq)]
pub struct TurnRecord {
    pub start: f64,
    pub end: f64,
    pub label: String,
}

impl TurnRecord {
    pub fn is_silence(&self) -> bool {
        self.label == "#"
    }
}

/// Per-speaker turn records, as produced by [`parse_turn_file`] for both
/// speakers of a task. The reconstructor and the linker each take a full
/// scan over these.
pub type SpeakerTurnRecords = Vec<(Speaker, Vec<TurnRecord>)>;

/// Parse a turn file. Lines are `<start> <end> <label>`; lines without
/// exactly three fields are skipped. Silence records are kept so callers
/// can apply their own boundary filtering in file order.
pub fn parse_turn_file(path: &Path) -> Result<Vec<TurnRecord>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read turns file: {:?}", path))?;

    let mut records = Vec::new();
    for line in content.lines() {
        let parts: Vec<&str> = line.split_whitespace().collect();
        let [start, end, label] = parts.as_slice() else {
            continue;
        };
        let start: f64 = start
            .parse()
            .with_context(|| format!("bad turn start in {:?}: {line}", path))?;
        let end: f64 = end
            .parse()
            .with_context(|| format!("bad turn end in {:?}: {line}", path))?;
        records.push(TurnRecord {
            start,
            end,
            label: label.to_string(),
        });
    }
    Ok(records)
}
