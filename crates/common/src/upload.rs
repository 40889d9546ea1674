//! Three-phase upload: reserve a file id and a pre-signed location, PUT the
//! bytes straight to object storage, then tell the backend the upload is done.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, AtomicU8, Ordering};
use std::sync::Arc;

use bytes::Bytes;
use futures::Stream;
use reqwest::header::{CONTENT_LENGTH, CONTENT_TYPE};
use reqwest::Body;
use tokio::io::AsyncReadExt;
use url::Url;
use uuid::Uuid;

use crate::api::v1::files::{CompleteUploadRequest, InitUploadRequest};
use crate::api::{ApiClient, ApiError};
use crate::validation::{check_upload_size, ValidationError};

const CHUNK_SIZE: usize = 64 * 1024;

#[derive(Debug, Clone)]
pub enum UploadSource {
    Memory(Bytes),
    Path(PathBuf),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadPhase {
    Initiated,
    Transferring,
    Completed,
    Failed,
}

impl UploadPhase {
    pub fn is_terminal(&self) -> bool {
        matches!(self, UploadPhase::Completed | UploadPhase::Failed)
    }
}

/// The network step an upload failed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadStage {
    Init,
    Transfer,
    Complete,
}

impl fmt::Display for UploadStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UploadStage::Init => f.write_str("init"),
            UploadStage::Transfer => f.write_str("transfer"),
            UploadStage::Complete => f.write_str("complete"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadEvent {
    Phase(UploadPhase),
    Progress(u8),
}

/// A file on its way to the backend.
#[derive(Debug, Clone)]
pub struct UploadTask {
    source: UploadSource,
    folder_id: Option<Uuid>,
    filename: String,
    size_bytes: u64,
    mime_type: String,
    progress_percent: u8,
    phase: UploadPhase,
}

impl UploadTask {
    /// Upload from memory. The MIME type is guessed from the filename.
    pub fn from_bytes(filename: impl Into<String>, content: impl Into<Bytes>) -> Self {
        let filename = filename.into();
        let content = content.into();
        let mime_type = guess_mime(&filename);
        Self {
            size_bytes: content.len() as u64,
            source: UploadSource::Memory(content),
            folder_id: None,
            filename,
            mime_type,
            progress_percent: 0,
            phase: UploadPhase::Initiated,
        }
    }

    /// Upload a local file. Size comes from the file's metadata.
    pub async fn from_path(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref();
        let metadata = tokio::fs::metadata(path).await?;
        let filename = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let mime_type = guess_mime(&filename);

        Ok(Self {
            source: UploadSource::Path(path.to_path_buf()),
            folder_id: None,
            filename,
            size_bytes: metadata.len(),
            mime_type,
            progress_percent: 0,
            phase: UploadPhase::Initiated,
        })
    }

    pub fn in_folder(mut self, folder_id: Option<Uuid>) -> Self {
        self.folder_id = folder_id;
        self
    }

    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = mime_type.into();
        self
    }

    pub fn source(&self) -> &UploadSource {
        &self.source
    }

    pub fn folder_id(&self) -> Option<Uuid> {
        self.folder_id
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn size_bytes(&self) -> u64 {
        self.size_bytes
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn progress_percent(&self) -> u8 {
        self.progress_percent
    }

    pub fn phase(&self) -> UploadPhase {
        self.phase
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.filename.trim().is_empty() {
            return Err(ValidationError::MissingFilename);
        }
        check_upload_size(self.size_bytes)
    }
}

fn guess_mime(filename: &str) -> String {
    mime_guess::from_path(filename)
        .first_or_octet_stream()
        .essence_str()
        .to_string()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    pub file_id: Uuid,
    pub filename: String,
    pub size_bytes: u64,
}

#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("upload failed during {stage}: {source}")]
    Stage {
        stage: UploadStage,
        #[source]
        source: ApiError,
    },
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl UploadError {
    fn stage(stage: UploadStage) -> impl FnOnce(ApiError) -> Self {
        move |source| UploadError::Stage { stage, source }
    }

    pub fn is_session_expired(&self) -> bool {
        matches!(
            self,
            UploadError::Stage {
                source: ApiError::SessionExpired { .. },
                ..
            }
        )
    }
}

/// Drives an `UploadTask` through init, transfer and completion.
///
/// Phases run strictly in order and any failure ends the run; there is no
/// resume. A failed task can be handed back to `upload` to start over from
/// init with a fresh file id.
#[derive(Debug, Clone)]
pub struct Uploader {
    client: ApiClient,
    events: Option<flume::Sender<UploadEvent>>,
}

impl Uploader {
    pub fn new(client: ApiClient) -> Self {
        Self {
            client,
            events: None,
        }
    }

    /// Report phase changes and transfer progress on `events`.
    pub fn with_events(mut self, events: flume::Sender<UploadEvent>) -> Self {
        self.events = Some(events);
        self
    }

    pub async fn upload(&self, task: &mut UploadTask) -> Result<UploadedFile, UploadError> {
        task.progress_percent = 0;
        self.set_phase(task, UploadPhase::Initiated);

        if let Err(e) = task.validate() {
            tracing::warn!("rejecting upload of {}: {}", task.filename, e);
            self.set_phase(task, UploadPhase::Failed);
            return Err(e.into());
        }

        match self.run(task).await {
            Ok(uploaded) => {
                self.set_phase(task, UploadPhase::Completed);
                tracing::info!("uploaded {} as {}", uploaded.filename, uploaded.file_id);
                Ok(uploaded)
            }
            Err(e) => {
                self.set_phase(task, UploadPhase::Failed);
                tracing::warn!("upload of {} failed: {}", task.filename, e);
                Err(e)
            }
        }
    }

    async fn run(&self, task: &mut UploadTask) -> Result<UploadedFile, UploadError> {
        tracing::info!(
            "initializing upload of {} ({} bytes, {})",
            task.filename,
            task.size_bytes,
            task.mime_type
        );
        let init = self
            .client
            .call(InitUploadRequest {
                filename: task.filename.clone(),
                size_bytes: task.size_bytes,
                mime_type: task.mime_type.clone(),
                folder_id: task.folder_id,
            })
            .await
            .map_err(UploadError::stage(UploadStage::Init))?;

        self.set_phase(task, UploadPhase::Transferring);
        self.transfer(task, &init.upload_url).await?;

        tracing::info!("completing upload {}", init.file_id);
        self.client
            .call(CompleteUploadRequest {
                file_id: init.file_id,
            })
            .await
            .map_err(UploadError::stage(UploadStage::Complete))?;

        Ok(UploadedFile {
            file_id: init.file_id,
            filename: task.filename.clone(),
            size_bytes: task.size_bytes,
        })
    }

    /// PUT the content to the pre-signed location. This goes to object
    /// storage, not the backend, so no bearer token is attached and a 401
    /// here says nothing about the session.
    async fn transfer(&self, task: &mut UploadTask, upload_url: &Url) -> Result<(), UploadError> {
        let reader = match &task.source {
            UploadSource::Memory(content) => ChunkReader::Memory(content.clone()),
            UploadSource::Path(path) => {
                let file = tokio::fs::File::open(path)
                    .await
                    .map_err(|source| UploadError::Io {
                        path: path.clone(),
                        source,
                    })?;
                ChunkReader::File(file)
            }
        };

        let progress = TransferProgress::new(task.size_bytes, self.events.clone());
        let body = Body::wrap_stream(chunk_stream(reader, progress.clone()));

        let result = self
            .client
            .http_client()
            .put(upload_url.clone())
            .header(CONTENT_TYPE, task.mime_type.as_str())
            .header(CONTENT_LENGTH, task.size_bytes)
            .body(body)
            .send()
            .await;
        task.progress_percent = progress.last();

        let response = result.map_err(|e| UploadError::Stage {
            stage: UploadStage::Transfer,
            source: e.into(),
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(UploadError::Stage {
                stage: UploadStage::Transfer,
                source: ApiError::backend(status, &body),
            });
        }

        task.progress_percent = 100;
        self.emit(UploadEvent::Progress(100));
        Ok(())
    }

    fn set_phase(&self, task: &mut UploadTask, phase: UploadPhase) {
        task.phase = phase;
        self.emit(UploadEvent::Phase(phase));
    }

    fn emit(&self, event: UploadEvent) {
        if let Some(events) = &self.events {
            // Nobody listening is fine
            let _ = events.send(event);
        }
    }
}

/// Percentage of `sent` over `total`, rounded, held below 100 while the
/// transfer is still in flight.
pub fn transfer_percent(sent: u64, total: u64) -> u8 {
    let total = total.max(1) as u128;
    let sent = (sent as u128).min(total);
    let percent = (sent * 100 + total / 2) / total;
    percent.min(99) as u8
}

#[derive(Debug, Clone)]
struct TransferProgress {
    total: u64,
    sent: Arc<AtomicU64>,
    last: Arc<AtomicU8>,
    events: Option<flume::Sender<UploadEvent>>,
}

impl TransferProgress {
    fn new(total: u64, events: Option<flume::Sender<UploadEvent>>) -> Self {
        Self {
            total,
            sent: Arc::new(AtomicU64::new(0)),
            last: Arc::new(AtomicU8::new(0)),
            events,
        }
    }

    fn advance(&self, bytes: u64) {
        let sent = self.sent.fetch_add(bytes, Ordering::Relaxed) + bytes;
        let percent = transfer_percent(sent, self.total);
        let previous = self.last.fetch_max(percent, Ordering::Relaxed);
        if percent > previous {
            if let Some(events) = &self.events {
                let _ = events.send(UploadEvent::Progress(percent));
            }
        }
    }

    fn last(&self) -> u8 {
        self.last.load(Ordering::Relaxed)
    }
}

enum ChunkReader {
    Memory(Bytes),
    File(tokio::fs::File),
}

fn chunk_stream(
    reader: ChunkReader,
    progress: TransferProgress,
) -> impl Stream<Item = Result<Bytes, std::io::Error>> + Send + 'static {
    futures::stream::try_unfold((reader, progress), |(reader, progress)| async move {
        let (chunk, next) = match reader {
            ChunkReader::Memory(mut remaining) => {
                if remaining.is_empty() {
                    return Ok(None);
                }
                let chunk = remaining.split_to(CHUNK_SIZE.min(remaining.len()));
                (chunk, ChunkReader::Memory(remaining))
            }
            ChunkReader::File(mut file) => {
                let mut buf = vec![0u8; CHUNK_SIZE];
                let read = file.read(&mut buf).await?;
                if read == 0 {
                    return Ok(None);
                }
                buf.truncate(read);
                (Bytes::from(buf), ChunkReader::File(file))
            }
        };

        progress.advance(chunk.len() as u64);
        Ok::<_, std::io::Error>(Some((chunk, (next, progress))))
    })
}
