use std::fs;
use std::path::Path;
use std::time::Duration;
use tracing::{info, warn};

use crate::error::FetchError;
use crate::types::DrawInfo;
use crate::utils::parse_document_filename;

/// One draw's document text together with its identifying metadata.
#[derive(Debug, Clone)]
pub struct DocumentSource {
    pub info: DrawInfo,
    pub text: String,
}

/// Fetches an already text-extracted result document.
pub async fn fetch_document_text(url: &str) -> Result<String, FetchError> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(30))
        .build()?;

    let response = client
        .get(url)
        .header("Accept", "text/plain")
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Status {
            status: status.as_u16(),
            url: url.to_string(),
        });
    }

    let text = response.text().await?;
    info!(url, bytes = text.len(), "fetched document");
    Ok(text)
}

/// Documents read from a directory, plus the number of matching files that
/// could not be read.
#[derive(Debug, Default)]
pub struct LoadedDocuments {
    pub documents: Vec<DocumentSource>,
    pub unreadable: usize,
}

/// Reads every `<lottery>_<YYYY-MM-DD>.txt` file in `dir`, sorted by file
/// name. Files whose names do not follow that shape are skipped. Files that
/// cannot be read as UTF-8 text are counted as unreadable.
pub fn load_document_dir(dir: &Path) -> Result<LoadedDocuments, FetchError> {
    let mut paths = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.extension().and_then(|s| s.to_str()) == Some("txt") {
            paths.push(path);
        }
    }
    paths.sort();

    let mut loaded = LoadedDocuments::default();
    for path in paths {
        let Some((lottery_name, draw_date)) = parse_document_filename(&path) else {
            warn!(path = %path.display(), "skipping document with unrecognized file name");
            continue;
        };

        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) => {
                warn!(path = %path.display(), "skipping unreadable document: {}", e);
                loaded.unreadable += 1;
                continue;
            }
        };
        let source = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
            .to_string();

        loaded.documents.push(DocumentSource {
            info: DrawInfo {
                lottery_name,
                draw_date,
                draw_number: None,
                source,
            },
            text,
        });
    }

    Ok(loaded)
}
