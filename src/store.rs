//! HTTP client for the remote project store.
//!
//! Enabled with the `store` feature. All requests go to
//! `EditorConfig::backend_url`.

use std::path::{Path, PathBuf};

use crate::config::EditorConfig;
use crate::error::{LoadError, StoreError};
use crate::export::{temp_path, AudioDownload};
use crate::project::{AudioData, EnvelopeData, EnvelopeSaveBody, ProjectMetadata};
use crate::session::EditorSession;

pub fn project_path(project_id: u64) -> String {
    format!("/api/projects/{project_id}/")
}

pub fn audio_data_path(project_id: u64) -> String {
    format!("/api/projects/{project_id}/audio-data/")
}

pub fn envelope_path(project_id: u64) -> String {
    format!("/api/projects/{project_id}/envelope/")
}

pub struct HttpProjectStore {
    client: reqwest::Client,
    config: EditorConfig,
}

impl HttpProjectStore {
    pub fn new(config: EditorConfig) -> Self {
        HttpProjectStore {
            client: reqwest::Client::new(),
            config,
        }
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    async fn get(&self, path: &str) -> Result<reqwest::Response, StoreError> {
        let url = self.config.resolve_url(path);
        let response = self.client.get(&url).send().await?;
        check_status(url, response)
    }

    pub async fn fetch_project(&self, project_id: u64) -> Result<ProjectMetadata, StoreError> {
        Ok(self.get(&project_path(project_id)).await?.json().await?)
    }

    pub async fn fetch_audio_data(&self, project_id: u64) -> Result<AudioData, StoreError> {
        Ok(self.get(&audio_data_path(project_id)).await?.json().await?)
    }

    /// Fetch metadata and audio data together and build a session.
    /// Either request failing fails the whole load.
    pub async fn load_session(&self, project_id: u64, width: u32, height: u32) -> Result<EditorSession, LoadError> {
        let (metadata, audio) = tokio::try_join!(self.fetch_project(project_id), self.fetch_audio_data(project_id))
            .map_err(|e| {
                log::warn!("loading project {project_id} failed: {e}");
                LoadError::Fetch(e.to_string())
            })?;
        EditorSession::from_parts(metadata, audio, self.config.clone(), width, height)
    }

    /// PUT the envelopes. The store reprocesses audio asynchronously; callers
    /// re-fetch afterwards to see the result.
    pub async fn save_envelope(&self, project_id: u64, envelopes: EnvelopeData) -> Result<(), StoreError> {
        let url = self.config.resolve_url(&envelope_path(project_id));
        let body = EnvelopeSaveBody {
            envelope_data: envelopes,
        };
        let response = self.client.put(&url).json(&body).send().await?;
        check_status(url, response)?;
        log::info!("saved envelope for project {project_id}");
        Ok(())
    }

    pub async fn download_audio(&self, download: &AudioDownload) -> Result<Vec<u8>, StoreError> {
        Ok(self.get(&download.url).await?.bytes().await?.to_vec())
    }

    /// Fetch each file and write it into `dir` under its download name.
    pub async fn download_to_dir(&self, downloads: &[AudioDownload], dir: &Path) -> Result<Vec<PathBuf>, StoreError> {
        let mut written = Vec::with_capacity(downloads.len());
        for download in downloads {
            let bytes = self.download_audio(download).await?;
            let path = dir.join(&download.file_name);
            write_atomic(&path, &bytes).await?;
            log::info!("downloaded {}", path.display());
            written.push(path);
        }
        Ok(written)
    }
}

/// Write through a sibling temp file and rename, removing the temp file on
/// failure so no partial download is left behind.
async fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), StoreError> {
    let tmp = temp_path(path);
    let result = match tokio::fs::write(&tmp, bytes).await {
        Ok(()) => tokio::fs::rename(&tmp, path).await,
        Err(e) => Err(e),
    };
    if let Err(e) = result {
        let _ = tokio::fs::remove_file(&tmp).await;
        log::warn!("writing {} failed: {e}", path.display());
        return Err(StoreError::Io(e));
    }
    Ok(())
}

fn check_status(url: String, response: reqwest::Response) -> Result<reqwest::Response, StoreError> {
    let status = response.status();
    if !status.is_success() {
        return Err(StoreError::Status {
            url,
            status: status.as_u16(),
        });
    }
    Ok(response)
}
