use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::io::{CorpusStore, parse_sessions_info};
use crate::models::{Batch, BatchConfig, Session, Task};
use crate::stages::{BuildContext, build_session};

/// Sessions excluded from loading. Session 28's annotations were never
/// completed to the standard of the rest of the corpus.
pub const BANNED_SESSIONS: [u32; 1] = [28];

/// The fully loaded corpus: every non-banned session listed in the
/// sessions index, keyed by session id.
#[derive(Debug)]
pub struct GamesCorpus {
    sessions: BTreeMap<u32, Session>,
}

impl GamesCorpus {
    /// Load the corpus from an extracted directory tree.
    ///
    /// Structural problems (missing tasks file, unknown transition label,
    /// malformed index) abort the load; entity-level annotation mismatches
    /// are logged and dropped inside the build stages.
    pub fn load(root: &Path) -> Result<Self> {
        let store = CorpusStore::open(root)?;
        let records = parse_sessions_info(&store.sessions_info_path())?;
        info!("Sessions index lists {} sessions", records.len());

        let mut ctx = BuildContext::new();
        let mut sessions = BTreeMap::new();
        for record in &records {
            if BANNED_SESSIONS.contains(&record.session_id) {
                warn!("Session {:02} is banned. Skipping", record.session_id);
                continue;
            }
            let session = build_session(&store, record, &mut ctx)
                .with_context(|| format!("Failed to build session {:02}", record.session_id))?;
            sessions.insert(record.session_id, session);
        }

        info!("Loaded {} sessions", sessions.len());
        Ok(Self { sessions })
    }

    pub fn sessions(&self) -> impl Iterator<Item = &Session> {
        self.sessions.values()
    }

    pub fn session(&self, session_id: u32) -> Option<&Session> {
        self.sessions.get(&session_id)
    }

    pub fn sessions_by_batch(&self, batch: Batch) -> impl Iterator<Item = &Session> {
        self.sessions.values().filter(move |s| s.batch == batch)
    }

    /// Tasks of one batch available for development work.
    pub fn dev_tasks(&self, batch: Batch) -> Vec<&Task> {
        self.partition_tasks(batch, false)
    }

    /// Tasks of one batch reserved for evaluation. A task is held out when
    /// its whole session is held out or its (session, task) pair is
    /// flagged.
    pub fn held_out_tasks(&self, batch: Batch) -> Vec<&Task> {
        self.partition_tasks(batch, true)
    }

    fn partition_tasks(&self, batch: Batch, held_out: bool) -> Vec<&Task> {
        let config = BatchConfig::for_batch(batch);
        let mut tasks = Vec::new();
        for session in self.sessions_by_batch(batch) {
            let session_held_out = config.is_held_out_session(session.session_id);
            for task in &session.tasks {
                let task_held_out = session_held_out
                    || config.is_held_out_task(session.session_id, task.task_id);
                if task_held_out == held_out {
                    tasks.push(task);
                }
            }
        }
        tasks
    }
}
