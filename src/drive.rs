//! The externally hosted clip list: a CSV file of Google Drive links kept
//! next to the database.

use std::fs::OpenOptions;
use std::io::ErrorKind;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

const HEADERS: [&str; 4] = ["title", "description", "preview_url", "download_url"];
const MIN_RAW_ID_LEN: usize = 10;

#[derive(Debug, Error)]
pub enum DriveError {
    #[error("{0}")]
    Validation(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriveClip {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub preview_url: String,
    pub download_url: String,
}

impl DriveClip {
    pub fn from_file_id(id: &str, title: &str, description: &str) -> Self {
        Self {
            title: title.to_string(),
            description: description.to_string(),
            preview_url: format!("https://drive.google.com/file/d/{id}/preview"),
            download_url: format!("https://drive.google.com/uc?export=download&id={id}"),
        }
    }
}

/// Read the clip list. A missing file or a file without the expected
/// headers yields an empty list; rows lacking either URL are skipped.
pub fn read_drive_clips(path: impl AsRef<Path>) -> Result<Vec<DriveClip>, DriveError> {
    let path = path.as_ref();
    let mut reader = match csv::ReaderBuilder::new().flexible(true).from_path(path) {
        Ok(reader) => reader,
        Err(e) if is_not_found(&e) => {
            tracing::warn!(path = %path.display(), "Drive clip list not found");
            return Ok(Vec::new());
        }
        Err(e) => return Err(e.into()),
    };

    let headers = reader.headers()?.clone();
    if !HEADERS.iter().all(|h| headers.iter().any(|found| found.trim() == *h)) {
        tracing::warn!(
            path = %path.display(),
            headers = ?headers.iter().collect::<Vec<_>>(),
            "Drive clip list is missing required headers"
        );
        return Ok(Vec::new());
    }

    let mut clips = Vec::new();
    for (line, record) in reader.deserialize::<DriveClip>().enumerate() {
        let clip = match record {
            Ok(clip) => clip,
            Err(e) => {
                tracing::warn!(line = line + 2, error = %e, "Skipping unreadable drive clip row");
                continue;
            }
        };
        let clip = DriveClip {
            title: clip.title.trim().to_string(),
            description: clip.description.trim().to_string(),
            preview_url: clip.preview_url.trim().to_string(),
            download_url: clip.download_url.trim().to_string(),
        };
        if clip.preview_url.is_empty() || clip.download_url.is_empty() {
            continue;
        }
        clips.push(clip);
    }

    Ok(clips)
}

/// Append a clip built from a Drive share link (or bare file id).
pub fn add_drive_clip(
    path: impl AsRef<Path>,
    link: &str,
    title: &str,
    description: &str,
) -> Result<DriveClip, DriveError> {
    let title = title.trim();
    let id = extract_drive_id(link.trim());
    let (Some(id), false) = (id, title.is_empty()) else {
        return Err(DriveError::Validation(
            "Invalid link or missing title.".to_string(),
        ));
    };

    let clip = DriveClip::from_file_id(id, title, description.trim());
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let needs_header = file.metadata()?.len() == 0;

    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(file);
    if needs_header {
        writer.write_record(HEADERS)?;
    }
    writer.write_record([
        &clip.title,
        &clip.description,
        &clip.preview_url,
        &clip.download_url,
    ])?;
    writer.flush()?;

    tracing::info!(path = %path.display(), title = %clip.title, "Added drive clip");
    Ok(clip)
}

/// File id from `/d/{id}`, `id={id}`, or a bare id of at least ten
/// `[A-Za-z0-9_-]` characters.
pub fn extract_drive_id(link: &str) -> Option<&str> {
    for marker in ["/d/", "id="] {
        if let Some(start) = link.find(marker) {
            let id = leading_id(&link[start + marker.len()..]);
            if !id.is_empty() {
                return Some(id);
            }
        }
    }

    (link.len() >= MIN_RAW_ID_LEN && link.chars().all(is_id_char)).then_some(link)
}

fn leading_id(s: &str) -> &str {
    let end = s.find(|c: char| !is_id_char(c)).unwrap_or(s.len());
    &s[..end]
}

fn is_id_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '-'
}

fn is_not_found(e: &csv::Error) -> bool {
    matches!(e.kind(), csv::ErrorKind::Io(io) if io.kind() == ErrorKind::NotFound)
}
