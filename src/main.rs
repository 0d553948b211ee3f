use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

use games_corpus::{Batch, FetchConfig, GamesCorpus, fetch_corpus, stages::check_task};

#[derive(Parser)]
#[command(name = "games-corpus")]
#[command(author, version, about = "Spoken dialogue games corpus loader", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Download and extract the corpus annotation files
    Fetch {
        /// Directory to extract the corpus into
        #[arg(short, long)]
        dest: PathBuf,

        /// Override the download base URL
        #[arg(long)]
        url: Option<String>,

        /// Also fetch the audio archives (large)
        #[arg(long)]
        audio: bool,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Load the corpus and print summary statistics
    Stats {
        /// Extracted corpus directory
        #[arg(short, long)]
        corpus: PathBuf,

        /// Restrict to one batch (1 or 2)
        #[arg(short, long)]
        batch: Option<u32>,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Load the corpus and export sessions as JSON
    Export {
        /// Extracted corpus directory
        #[arg(short, long)]
        corpus: PathBuf,

        /// Output JSON file
        #[arg(short, long)]
        output: PathBuf,

        /// Restrict to one batch (1 or 2)
        #[arg(short, long)]
        batch: Option<u32>,

        /// Export only the held-out evaluation tasks
        #[arg(long)]
        held_out: bool,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Fetch {
            dest,
            url,
            audio,
            verbose,
        } => {
            setup_logging(verbose);
            let mut config = FetchConfig::default();
            if let Some(url) = url {
                config.base_url = url;
            }
            config.include_audio = audio;
            fetch_corpus(&config, &dest).await
        }
        Commands::Stats {
            corpus,
            batch,
            verbose,
        } => {
            setup_logging(verbose);
            let batch = batch.map(Batch::from_number).transpose()?;
            print_stats(corpus, batch)
        }
        Commands::Export {
            corpus,
            output,
            batch,
            held_out,
            verbose,
        } => {
            setup_logging(verbose);
            let batch = batch.map(Batch::from_number).transpose()?;
            export_sessions(corpus, output, batch, held_out)
        }
    }
}

fn setup_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber).ok();
}

fn selected_batches(batch: Option<Batch>) -> Vec<Batch> {
    match batch {
        Some(b) => vec![b],
        None => vec![Batch::One, Batch::Two],
    }
}

fn print_stats(corpus_dir: PathBuf, batch: Option<Batch>) -> Result<()> {
    let corpus = GamesCorpus::load(&corpus_dir)?;

    println!("Corpus Statistics");
    println!("=================");

    for batch in selected_batches(batch) {
        let sessions: Vec<_> = corpus.sessions_by_batch(batch).collect();
        if sessions.is_empty() {
            continue;
        }

        let tasks: usize = sessions.iter().map(|s| s.tasks.len()).sum();
        let turns: usize = sessions
            .iter()
            .flat_map(|s| &s.tasks)
            .map(|t| t.turns.len())
            .sum();
        let ipus: usize = sessions
            .iter()
            .flat_map(|s| &s.tasks)
            .map(|t| t.ipus.len())
            .sum();
        let words: usize = sessions
            .iter()
            .flat_map(|s| &s.tasks)
            .flat_map(|t| &t.ipus)
            .map(|ipu| ipu.num_words())
            .sum();

        println!();
        println!("Batch {}", batch);
        println!("-------");
        println!("Sessions: {}", sessions.len());
        println!("Tasks: {}", tasks);
        println!("Turns: {}", turns);
        println!("IPUs: {}", ipus);
        println!("Words: {}", words);
        println!("Dev tasks: {}", corpus.dev_tasks(batch).len());
        println!("Held-out tasks: {}", corpus.held_out_tasks(batch).len());

        let mut label_counts: BTreeMap<&str, usize> = BTreeMap::new();
        for session in &sessions {
            for task in &session.tasks {
                for transition in &task.turn_transitions {
                    *label_counts.entry(transition.label_type.code()).or_default() += 1;
                }
            }
        }
        println!();
        println!("Transition labels");
        for (code, count) in &label_counts {
            println!("  {:>5}: {}", code, count);
        }

        let problems: usize = sessions
            .iter()
            .flat_map(|s| &s.tasks)
            .map(|t| check_task(t).len())
            .sum();
        println!();
        println!("Annotation problems: {}", problems);
    }

    Ok(())
}

fn export_sessions(
    corpus_dir: PathBuf,
    output: PathBuf,
    batch: Option<Batch>,
    held_out: bool,
) -> Result<()> {
    let corpus = GamesCorpus::load(&corpus_dir)?;

    if held_out {
        let tasks: Vec<_> = selected_batches(batch)
            .into_iter()
            .flat_map(|b| corpus.held_out_tasks(b))
            .collect();
        info!("Exporting {} held-out tasks to {:?}", tasks.len(), output);
        let json = serde_json::to_string_pretty(&tasks)?;
        std::fs::write(&output, json)
            .with_context(|| format!("Failed to write {:?}", output))?;
    } else {
        let batches = selected_batches(batch);
        let sessions: Vec<_> = corpus
            .sessions()
            .filter(|s| batches.contains(&s.batch))
            .collect();
        info!("Exporting {} sessions to {:?}", sessions.len(), output);
        let json = serde_json::to_string_pretty(&sessions)?;
        std::fs::write(&output, json)
            .with_context(|| format!("Failed to write {:?}", output))?;
    }

    Ok(())
}
