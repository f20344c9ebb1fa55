//! Turning a finished job into a `.jar` on disk.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use futures_util::StreamExt;
use serde::Serialize;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;

use crate::error::{ModcraftError, Result};
use crate::models::{GeneratedMod, JobPayload};
use crate::util::jar_file_name;

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedJar {
    pub path: PathBuf,
    pub file_name: String,
    pub bytes: u64,
    /// Number of archive entries, or `None` if the payload isn't a readable zip.
    pub entries: Option<usize>,
}

pub fn decode_payload(data: &str) -> Result<Vec<u8>> {
    Ok(STANDARD.decode(data.trim())?)
}

pub fn encode_payload(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

/// Count the entries of a jar, which is a zip archive.
pub fn inspect_jar(bytes: &[u8]) -> Option<usize> {
    zip::ZipArchive::new(Cursor::new(bytes))
        .ok()
        .map(|archive| archive.len())
}

/// Save `job` under `dir` as `<name>.jar`.
///
/// Only ready jobs with a payload are saved; anything else is `Ok(None)`.
/// Bytes land in a `.part` file first and are renamed into place, so a
/// failed download never leaves a truncated jar behind.
pub async fn save_job(job: &GeneratedMod, dir: &Path, http: &reqwest::Client) -> Result<Option<SavedJar>> {
    if !job.is_downloadable() {
        return Ok(None);
    }
    let Some(payload) = &job.payload else {
        return Ok(None);
    };

    tokio::fs::create_dir_all(dir).await?;
    let file_name = jar_file_name(&job.name);
    let path = dir.join(&file_name);
    let part = dir.join(format!("{file_name}.part"));

    let written = match payload {
        JobPayload::Inline { data } => write_inline(data, &part).await,
        JobPayload::Url { url } => fetch_to(http, url, &part).await,
    };
    let bytes = match written {
        Ok(n) => n,
        Err(e) => {
            let _ = tokio::fs::remove_file(&part).await;
            return Err(e);
        }
    };
    tokio::fs::rename(&part, &path).await?;

    let entries = inspect_jar(&tokio::fs::read(&path).await?);
    if entries.is_none() {
        tracing::warn!(path = %path.display(), "saved payload is not a valid jar archive");
    }
    tracing::info!(path = %path.display(), bytes, "jar saved");

    Ok(Some(SavedJar {
        path,
        file_name,
        bytes,
        entries,
    }))
}

async fn write_inline(data: &str, part: &Path) -> Result<u64> {
    let bytes = decode_payload(data)?;
    tokio::fs::write(part, &bytes).await?;
    Ok(bytes.len() as u64)
}

async fn fetch_to(http: &reqwest::Client, url: &str, part: &Path) -> Result<u64> {
    let response = http.get(url).send().await?;
    if !response.status().is_success() {
        return Err(ModcraftError::Remote {
            stage: "Download",
            status: response.status().as_u16(),
            message: format!("could not fetch {url}"),
        });
    }

    let mut file = tokio::fs::File::create(part).await?;
    let mut stream = response.bytes_stream();
    let mut written: u64 = 0;
    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        file.write_all(&chunk).await?;
        written += chunk.len() as u64;
    }
    file.flush().await?;
    Ok(written)
}
