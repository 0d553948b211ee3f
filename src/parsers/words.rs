use std::path::Path;

use anyhow::{Context, Result, bail};

use crate::models::{Ipu, Speaker, Word};

/// Parse one speaker's word-level transcription (batch 1 only) into the
/// IPUs falling inside `[task_start, task_end]`.
///
/// Lines are `<start> <end> <text>`; a `#` text (or a bare two-field line)
/// marks a silent interval and closes the currently open IPU. Any other
/// field count is a hard error. The files are time-ordered ascending, so
/// scanning stops at the first line whose start exceeds the task end;
/// words ending before the task start are skipped.
pub fn parse_word_file(
    path: &Path,
    speaker: Speaker,
    task_start: f64,
    task_end: f64,
) -> Result<Vec<Ipu>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read words file: {:?}", path))?;

    let mut ipus = Vec::new();
    let mut pending: Vec<Word> = Vec::new();

    for line in content.lines() {
        let parts: Vec<&str> = line.split_whitespace().collect();
        let (start, end, text) = match parts.as_slice() {
            [] => continue,
            // Some files leave the silence symbol off an interval line.
            [start, end] => (*start, *end, "#"),
            [start, end, text] => (*start, *end, *text),
            _ => bail!("malformed word line in {:?}: {line}", path),
        };
        let start: f64 = start
            .parse()
            .with_context(|| format!("bad word start in {:?}: {line}", path))?;
        let end: f64 = end
            .parse()
            .with_context(|| format!("bad word end in {:?}: {line}", path))?;

        if start > task_end {
            break;
        }
        if end < task_start {
            continue;
        }

        if text == "#" {
            if !pending.is_empty() {
                ipus.push(Ipu::new(std::mem::take(&mut pending)));
            }
        } else {
            pending.push(Word::new(start, end, text, speaker));
        }
    }
    if !pending.is_empty() {
        ipus.push(Ipu::new(pending));
    }
    Ok(ipus)
}
