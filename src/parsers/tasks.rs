use std::path::Path;

use anyhow::{Context, Result, ensure};

use crate::models::{Batch, Speaker};

/// One parsed line of a tasks file. Pure metadata; no cross-referencing
/// against the transcription layers happens here.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskInfo {
    pub task_id: u32,
    pub start: f64,
    pub end: f64,
    pub images: Vec<String>,
    pub describer: Speaker,
    pub target: String,
    pub score: f64,
    pub time_used: f64,
}

/// Parse a tasks file for the given batch.
///
/// Batch 1 lines are `<start> <end> <;-separated fields>` and task ids are
/// 1-based line order; batch 2 lines are `<task-id> <;-separated fields>`
/// with start fixed at 0 and end equal to the declared time-used (batch 2
/// files are pre-split per task). Lines with fewer than three `;`-groups
/// are the `#` inter-task gaps and are skipped.
pub fn parse_tasks_file(path: &Path, batch: Batch) -> Result<Vec<TaskInfo>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read tasks file: {:?}", path))?;

    let mut infos = Vec::new();
    for line in content.lines() {
        let line = line.trim();
        match batch {
            Batch::One => {
                let groups: Vec<&str> = line.split(';').collect();
                if groups.len() < 3 {
                    continue;
                }
                ensure!(groups.len() == 5, "malformed task line: {line}");
                let head: Vec<&str> = groups[0].split_whitespace().collect();
                ensure!(head.len() == 3, "malformed task interval: {}", groups[0]);
                let start: f64 = head[0]
                    .parse()
                    .with_context(|| format!("bad task start in line: {line}"))?;
                let end: f64 = head[1]
                    .parse()
                    .with_context(|| format!("bad task end in line: {line}"))?;
                let task_id = infos.len() as u32 + 1;
                infos.push(build_info(
                    task_id, start, end, head[2], &groups[1..5], false,
                )?);
            }
            Batch::Two => {
                let Some((id, rest)) = line.split_once(' ') else {
                    continue;
                };
                let groups: Vec<&str> = rest.split(';').collect();
                if groups.len() < 3 {
                    continue;
                }
                ensure!(groups.len() == 5, "malformed task line: {line}");
                let task_id: u32 = id
                    .trim()
                    .parse()
                    .with_context(|| format!("bad task id in line: {line}"))?;
                infos.push(build_info(task_id, 0.0, 0.0, groups[0], &groups[1..5], true)?);
            }
        }
    }
    Ok(infos)
}

fn build_info(
    task_id: u32,
    start: f64,
    end: f64,
    images_field: &str,
    fields: &[&str],
    end_is_time_used: bool,
) -> Result<TaskInfo> {
    let images = field_value(images_field)
        .split(',')
        .map(|s| s.trim().to_string())
        .collect();
    let describer = Speaker::parse(field_value(fields[0]))?;
    let target = field_value(fields[1]).to_string();
    let score: f64 = field_value(fields[2])
        .parse()
        .with_context(|| format!("bad score field: {}", fields[2]))?;
    let time_used: f64 = field_value(fields[3])
        .parse()
        .with_context(|| format!("bad time-used field: {}", fields[3]))?;
    Ok(TaskInfo {
        task_id,
        start,
        end: if end_is_time_used { time_used } else { end },
        images,
        describer,
        target,
        score,
        time_used,
    })
}

/// The value after the last `:` of a `Key:value` field.
fn field_value(field: &str) -> &str {
    field.rsplit(':').next().unwrap_or(field).trim()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_fixture(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    const BATCH1_TASKS: &str = "\
0.000000 0.046000 #
0.046000 42.061000 Images:img1,img2;Describer:A;Target:img1;Score:99;Time-used:47.107
42.061000 45.468000 #
45.468000 90.000000 Images:img3,img4;Describer:B;Target:img3;Score:50;Time-used:40.5
";

    #[test]
    fn test_parse_batch1() {
        let file = write_fixture(BATCH1_TASKS);
        let infos = parse_tasks_file(file.path(), Batch::One).unwrap();
        assert_eq!(infos.len(), 2);

        assert_eq!(infos[0].task_id, 1);
        assert!((infos[0].start - 0.046).abs() < 1e-9);
        assert!((infos[0].end - 42.061).abs() < 1e-9);
        assert_eq!(infos[0].images, vec!["img1", "img2"]);
        assert_eq!(infos[0].describer, Speaker::A);
        assert_eq!(infos[0].target, "img1");
        assert_eq!(infos[0].score, 99.0);
        assert!((infos[0].time_used - 47.107).abs() < 1e-9);

        assert_eq!(infos[1].task_id, 2);
        assert_eq!(infos[1].describer, Speaker::B);
    }

    #[test]
    fn test_parse_batch2() {
        let content = "\
01 Images:yellowlion,ear;Describer:A;Target:mime;Score:88;Time-used:73.109
06 Images:eye,mirror;Describer:B;Target:yellowmoon;Score:94;Time-used:307.991
";
        let file = write_fixture(content);
        let infos = parse_tasks_file(file.path(), Batch::Two).unwrap();
        assert_eq!(infos.len(), 2);

        assert_eq!(infos[0].task_id, 1);
        assert_eq!(infos[0].start, 0.0);
        assert!((infos[0].end - 73.109).abs() < 1e-9); // end = time_used
        assert_eq!(infos[1].task_id, 6);
        assert_eq!(infos[1].target, "yellowmoon");
    }

    #[test]
    fn test_parse_is_deterministic() {
        let file = write_fixture(BATCH1_TASKS);
        let first = parse_tasks_file(file.path(), Batch::One).unwrap();
        let second = parse_tasks_file(file.path(), Batch::One).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_unknown_describer_is_fatal() {
        let content = "0.0 1.0 Images:a;Describer:C;Target:a;Score:1;Time-used:1.0\n";
        let file = write_fixture(content);
        assert!(parse_tasks_file(file.path(), Batch::One).is_err());
    }
}
