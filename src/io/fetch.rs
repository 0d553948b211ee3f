use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::{info, warn};
use zip::ZipArchive;

use super::store::{
    B1_PHRASES, B1_TASKS, B1_TURNS, B1_WAVS, B1_WORDS, B2_PHRASES, B2_TASKS, B2_TURNS, B2_WAVS,
    SESSIONS_INFO,
};
use crate::error::CorpusError;

pub const DEFAULT_CORPUS_URL: &str =
    "https://catalog.ldc.upenn.edu/downloads/games-corpus";

/// Download settings. Audio archives are large and optional; everything
/// else is annotation text.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    pub base_url: String,
    pub include_audio: bool,
    pub max_retries: u32,
    pub retry_delay: Duration,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_CORPUS_URL.to_string(),
            include_audio: false,
            max_retries: 3,
            retry_delay: Duration::from_secs(5),
        }
    }
}

/// Archive names to fetch, one zip per corpus folder.
fn archive_manifest(include_audio: bool) -> Vec<&'static str> {
    let mut folders = vec![
        B1_TASKS, B1_WORDS, B1_PHRASES, B1_TURNS, B2_TASKS, B2_PHRASES, B2_TURNS,
    ];
    if include_audio {
        folders.push(B1_WAVS);
        folders.push(B2_WAVS);
    }
    folders
}

/// Fetch and extract the corpus into `dest`. Folders already extracted are
/// left alone, so an interrupted fetch can be resumed.
pub async fn fetch_corpus(config: &FetchConfig, dest: &Path) -> Result<()> {
    std::fs::create_dir_all(dest)
        .with_context(|| format!("Failed to create corpus directory: {:?}", dest))?;

    let client = reqwest::Client::new();

    let index_path = dest.join(SESSIONS_INFO);
    if index_path.is_file() {
        info!("{} already present. Skipping", SESSIONS_INFO);
    } else {
        let bytes = download_with_retry(&client, config, SESSIONS_INFO).await?;
        std::fs::write(&index_path, &bytes)
            .with_context(|| format!("Failed to write {:?}", index_path))?;
    }

    for folder_id in archive_manifest(config.include_audio) {
        let folder = dest.join(folder_id);
        if folder.is_dir() {
            info!("{} already extracted. Skipping", folder_id);
            continue;
        }
        let archive_name = format!("{folder_id}.zip");
        let bytes = download_with_retry(&client, config, &archive_name).await?;
        info!("Extracting {} ({} bytes)", archive_name, bytes.len());
        extract_zip(&bytes, dest)
            .with_context(|| format!("Failed to extract {archive_name}"))?;
    }

    info!("Corpus ready at {:?}", dest);
    Ok(())
}

/// GET one corpus file, retrying transient failures. Exhausting the
/// retries is fatal; a partial corpus is never left behind silently.
async fn download_with_retry(
    client: &reqwest::Client,
    config: &FetchConfig,
    file_name: &str,
) -> Result<Vec<u8>> {
    let url = format!("{}/{}", config.base_url.trim_end_matches('/'), file_name);
    for attempt in 1..=config.max_retries {
        info!("Downloading {} (attempt {})", url, attempt);
        match try_download(client, &url).await {
            Ok(bytes) => return Ok(bytes),
            Err(e) => {
                warn!("Download of {} failed: {:#}", file_name, e);
                if attempt < config.max_retries {
                    tokio::time::sleep(config.retry_delay).await;
                }
            }
        }
    }
    Err(CorpusError::DownloadFailed {
        file: file_name.to_string(),
        attempts: config.max_retries,
    }
    .into())
}

async fn try_download(client: &reqwest::Client, url: &str) -> Result<Vec<u8>> {
    let response = client.get(url).send().await?.error_for_status()?;
    Ok(response.bytes().await?.to_vec())
}

/// Extract a zip archive into `dest`, refusing entries that escape it.
fn extract_zip(bytes: &[u8], dest: &Path) -> Result<()> {
    let reader = std::io::Cursor::new(bytes);
    let mut archive = ZipArchive::new(reader).context("Invalid zip archive")?;
    for i in 0..archive.len() {
        let mut entry = archive.by_index(i)?;
        let Some(relative) = entry.enclosed_name().map(Path::to_path_buf) else {
            warn!("Skipping unsafe zip entry: {}", entry.name());
            continue;
        };
        let target = dest.join(relative);
        if entry.is_dir() {
            std::fs::create_dir_all(&target)?;
            continue;
        }
        if let Some(parent) = target.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut out = std::fs::File::create(&target)
            .with_context(|| format!("Failed to create {:?}", target))?;
        std::io::copy(&mut entry, &mut out)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::FileOptions;

    #[test]
    fn test_archive_manifest_audio_toggle() {
        let without = archive_manifest(false);
        assert!(!without.contains(&B1_WAVS));
        let with = archive_manifest(true);
        assert!(with.contains(&B1_WAVS));
        assert!(with.contains(&B2_WAVS));
    }

    #[test]
    fn test_extract_zip_roundtrip() {
        let mut buffer = std::io::Cursor::new(Vec::new());
        {
            let mut writer = zip::ZipWriter::new(&mut buffer);
            writer
                .start_file("b1-dialogue-tasks/s01.objects.1.tasks", FileOptions::default())
                .unwrap();
            writer.write_all(b"0.0 1.0 #\n").unwrap();
            writer.finish().unwrap();
        }

        let dir = tempfile::tempdir().unwrap();
        extract_zip(buffer.get_ref(), dir.path()).unwrap();
        let extracted = dir.path().join("b1-dialogue-tasks/s01.objects.1.tasks");
        assert_eq!(std::fs::read_to_string(extracted).unwrap(), "0.0 1.0 #\n");
    }

    #[test]
    fn test_default_config() {
        let config = FetchConfig::default();
        assert_eq!(config.max_retries, 3);
        assert!(!config.include_audio);
        assert_eq!(config.retry_delay, Duration::from_secs(5));
    }
}
