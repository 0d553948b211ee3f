use std::path::Path;

use anyhow::{Context, Result};
use tracing::error;

use crate::models::{Ipu, Speaker, Word};

/// Parse one speaker's IPU-level transcription into IPUs.
///
/// Lines are `<start>\t<end>\t<text>`; `#` closes the open IPU. This layer
/// has no word-level timing, so the interval is divided evenly across the
/// whitespace-tokenized words — synthesized timestamps, not measured data.
/// Malformed lines are logged and skipped.
pub fn parse_phrase_file(path: &Path, speaker: Speaker) -> Result<Vec<Ipu>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read phrases file: {:?}", path))?;

    let mut ipus = Vec::new();
    let mut pending: Vec<Word> = Vec::new();

    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let mut fields = line.splitn(3, '\t');
        let (Some(start), Some(end), Some(text)) = (fields.next(), fields.next(), fields.next())
        else {
            error!("Malformed phrase line in {:?}: {}", path, line);
            continue;
        };

        if text.trim() == "#" {
            if !pending.is_empty() {
                ipus.push(Ipu::new(std::mem::take(&mut pending)));
            }
            continue;
        }

        let (Ok(start), Ok(end)) = (start.parse::<f64>(), end.parse::<f64>()) else {
            error!("Bad timestamps in phrase line in {:?}: {}", path, line);
            continue;
        };

        let cleaned = text.replace('#', "");
        let tokens: Vec<&str> = cleaned.split_whitespace().collect();
        if tokens.is_empty() {
            continue;
        }

        let word_duration = (end - start) / tokens.len() as f64;
        for (i, token) in tokens.iter().enumerate() {
            pending.push(Word::new(
                start + i as f64 * word_duration,
                start + (i + 1) as f64 * word_duration,
                *token,
                speaker,
            ));
        }
    }
    if !pending.is_empty() {
        ipus.push(Ipu::new(pending));
    }
    Ok(ipus)
}
