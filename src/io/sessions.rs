use std::path::Path;

use anyhow::{Context, Result, ensure};

use crate::models::Batch;

/// One row of the sessions index: which batch a session belongs to and the
/// anonymized subject codes behind each channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionRecord {
    pub session_id: u32,
    pub batch: Batch,
    pub subject_a: String,
    pub subject_b: String,
}

/// Parse `sessions-info.csv`. The file is a plain four-column index
/// (`session,batch,subject_a,subject_b`) with a header row.
pub fn parse_sessions_info(path: &Path) -> Result<Vec<SessionRecord>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read sessions index: {:?}", path))?;

    let mut records = Vec::new();
    for line in content.lines().skip(1) {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let fields: Vec<&str> = line.split(',').map(str::trim).collect();
        ensure!(fields.len() == 4, "malformed sessions-info line: {line}");
        let session_id: u32 = fields[0]
            .parse()
            .with_context(|| format!("bad session id: {}", fields[0]))?;
        let batch_number: u32 = fields[1]
            .parse()
            .with_context(|| format!("bad batch number: {}", fields[1]))?;
        records.push(SessionRecord {
            session_id,
            batch: Batch::from_number(batch_number)?,
            subject_a: fields[2].to_string(),
            subject_b: fields[3].to_string(),
        });
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_sessions_info() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            "session,batch,subject_a,subject_b\n3,1,s03a,s03b\n21,2,s21a,s21b\n"
        )
        .unwrap();

        let records = parse_sessions_info(file.path()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].session_id, 3);
        assert_eq!(records[0].batch, Batch::One);
        assert_eq!(records[0].subject_a, "s03a");
        assert_eq!(records[1].batch, Batch::Two);
    }

    #[test]
    fn test_unknown_batch_is_fatal() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "session,batch,subject_a,subject_b\n3,7,x,y\n").unwrap();
        assert!(parse_sessions_info(file.path()).is_err());
    }

    #[test]
    fn test_malformed_row_is_fatal() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "session,batch,subject_a,subject_b\n3,1,only-three\n").unwrap();
        assert!(parse_sessions_info(file.path()).is_err());
    }
}
