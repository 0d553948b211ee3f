use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::debug;

use crate::models::{Batch, Speaker};

/// Corpus member folder ids, matching the published archive names.
pub const B1_TASKS: &str = "b1-dialogue-tasks";
pub const B1_WORDS: &str = "b1-dialogue-words";
pub const B1_PHRASES: &str = "b1-dialogue-phrases";
pub const B1_TURNS: &str = "b1-dialogue-turns";
pub const B1_WAVS: &str = "b1-dialogue-wavs";
pub const B2_TASKS: &str = "b2-dialogue-tasks";
pub const B2_PHRASES: &str = "b2-dialogue-phrases";
pub const B2_TURNS: &str = "b2-dialogue-turns";
pub const B2_WAVS: &str = "b2-dialogue-wavs";
pub const SESSIONS_INFO: &str = "sessions-info.csv";

const ALL_FOLDERS: [&str; 9] = [
    B1_TASKS, B1_WORDS, B1_PHRASES, B1_TURNS, B1_WAVS, B2_TASKS, B2_PHRASES, B2_TURNS, B2_WAVS,
];

/// Folder ids relevant to one batch. Batch 2 has no word-level alignment.
#[derive(Debug, Clone, Copy)]
pub struct BatchLayout {
    pub tasks: &'static str,
    pub phrases: &'static str,
    pub turns: &'static str,
    pub words: Option<&'static str>,
    pub wavs: &'static str,
}

impl BatchLayout {
    pub fn for_batch(batch: Batch) -> Self {
        match batch {
            Batch::One => Self {
                tasks: B1_TASKS,
                phrases: B1_PHRASES,
                turns: B1_TURNS,
                words: Some(B1_WORDS),
                wavs: B1_WAVS,
            },
            Batch::Two => Self {
                tasks: B2_TASKS,
                phrases: B2_PHRASES,
                turns: B2_TURNS,
                words: None,
                wavs: B2_WAVS,
            },
        }
    }
}

/// Keyed view over an extracted corpus directory: folder id → file name →
/// local path. Folders that were not fetched (e.g. wavs) are simply
/// absent.
#[derive(Debug)]
pub struct CorpusStore {
    root: PathBuf,
    folders: HashMap<String, HashMap<String, PathBuf>>,
}

impl CorpusStore {
    pub fn open(root: &Path) -> Result<Self> {
        let mut folders = HashMap::new();
        for folder_id in ALL_FOLDERS {
            let dir = root.join(folder_id);
            if !dir.is_dir() {
                debug!("Corpus folder {} not present", folder_id);
                continue;
            }
            let mut files = HashMap::new();
            for entry in std::fs::read_dir(&dir)
                .with_context(|| format!("Failed to read corpus folder: {:?}", dir))?
            {
                let entry = entry?;
                files.insert(entry.file_name().to_string_lossy().into_owned(), entry.path());
            }
            folders.insert(folder_id.to_string(), files);
        }
        Ok(Self {
            root: root.to_path_buf(),
            folders,
        })
    }

    pub fn file(&self, folder_id: &str, file_name: &str) -> Option<&Path> {
        self.folders
            .get(folder_id)?
            .get(file_name)
            .map(PathBuf::as_path)
    }

    pub fn sessions_info_path(&self) -> PathBuf {
        self.root.join(SESSIONS_INFO)
    }
}

/// Channel suffix used in batch-dependent file names. Batch 2 recorded
/// each speaker on a numbered channel.
pub fn channel_suffix(speaker: Speaker, batch: Batch) -> &'static str {
    match (batch, speaker) {
        (Batch::One, Speaker::A) => "A",
        (Batch::One, Speaker::B) => "B",
        (Batch::Two, Speaker::A) => "channel1",
        (Batch::Two, Speaker::B) => "channel2",
    }
}

pub fn tasks_file_name(session_id: u32, batch: Batch) -> String {
    match batch {
        Batch::One => format!("s{:02}.objects.1.tasks", session_id),
        Batch::Two => format!("s{:02}.objects.tasks", session_id),
    }
}

pub fn words_file_name(session_id: u32, speaker: Speaker) -> String {
    format!("s{:02}.objects.1.{}.words", session_id, speaker)
}

pub fn phrases_file_name(session_id: u32, task_id: u32, speaker: Speaker, batch: Batch) -> String {
    annotated_file_name(session_id, task_id, speaker, batch, "phrases")
}

pub fn turns_file_name(session_id: u32, task_id: u32, speaker: Speaker, batch: Batch) -> String {
    annotated_file_name(session_id, task_id, speaker, batch, "turns")
}

pub fn wav_file_name(session_id: u32, task_id: u32, speaker: Speaker, batch: Batch) -> String {
    annotated_file_name(session_id, task_id, speaker, batch, "wav")
}

/// Batch 1 files cover the whole session; batch 2 files are per task.
fn annotated_file_name(
    session_id: u32,
    task_id: u32,
    speaker: Speaker,
    batch: Batch,
    extension: &str,
) -> String {
    let suffix = channel_suffix(speaker, batch);
    match batch {
        Batch::One => format!("s{:02}.objects.1.{}.{}", session_id, suffix, extension),
        Batch::Two => format!(
            "s{:02}.objects.{:02}.{}.{}",
            session_id, task_id, suffix, extension
        ),
    }
}
