pub mod corpus;
pub mod error;
pub mod io;
pub mod models;
pub mod parsers;
pub mod stages;

pub use corpus::{BANNED_SESSIONS, GamesCorpus};
pub use error::CorpusError;
pub use io::{CorpusStore, FetchConfig, SessionRecord, fetch_corpus, parse_sessions_info};
pub use models::{
    Batch, BatchConfig, Ipu, Session, Speaker, Task, Turn, TurnTransition, TurnTransitionType,
    Word,
};
pub use parsers::{
    TaskInfo, TurnRecord, parse_phrase_file, parse_tasks_file, parse_turn_file, parse_word_file,
};
pub use stages::{
    BuildContext, build_session, check_task, link_transitions, reconstruct_turns,
};
