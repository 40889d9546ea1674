use std::io::Write;
use std::path::PathBuf;

use clap::Args;
use uuid::Uuid;

use common::api::v1::DirectUploadRequest;
use common::api::ApiError;
use common::upload::{UploadError, UploadEvent, UploadTask, Uploader};
use common::validation::check_upload_size;

use super::format_size;
use crate::op::{Op, OpContext};

#[derive(Args, Debug, Clone)]
pub struct Upload {
    /// File to upload
    pub path: PathBuf,

    /// Folder to store the file in
    #[arg(long)]
    pub folder_id: Option<Uuid>,

    /// Send the bytes through the backend in one multipart request
    #[arg(long)]
    pub direct: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum UploadOpError {
    #[error(transparent)]
    Upload(UploadError),
    #[error("API error: {0}")]
    Api(ApiError),
    /// The expiry notice has already been printed.
    #[error("upload stopped: not signed in")]
    NotSignedIn,
}

impl From<UploadError> for UploadOpError {
    fn from(err: UploadError) -> Self {
        if err.is_session_expired() {
            UploadOpError::NotSignedIn
        } else {
            UploadOpError::Upload(err)
        }
    }
}

impl From<ApiError> for UploadOpError {
    fn from(err: ApiError) -> Self {
        if err.is_session_expired() {
            UploadOpError::NotSignedIn
        } else {
            UploadOpError::Api(err)
        }
    }
}

/// Draw upload events on stderr until the sender goes away.
pub fn spawn_progress(filename: String) -> (flume::Sender<UploadEvent>, tokio::task::JoinHandle<()>) {
    let (tx, rx) = flume::unbounded();
    let handle = tokio::spawn(async move {
        let mut drawn = false;
        while let Ok(event) = rx.recv_async().await {
            if let UploadEvent::Progress(percent) = event {
                eprint!("\r{}: {:>3}%", filename, percent);
                let _ = std::io::stderr().flush();
                drawn = true;
            }
        }
        if drawn {
            eprintln!();
        }
    });
    (tx, handle)
}

#[async_trait::async_trait]
impl Op for Upload {
    type Error = UploadOpError;
    type Output = String;

    async fn execute(&self, ctx: &OpContext) -> Result<Self::Output, Self::Error> {
        let task = UploadTask::from_path(&self.path)
            .await
            .map_err(|source| UploadError::Io {
                path: self.path.clone(),
                source,
            })?
            .in_folder(self.folder_id);

        if self.direct {
            return self.direct_upload(ctx, task).await;
        }

        let (events, progress) = spawn_progress(task.filename().to_string());
        let uploader = Uploader::new(ctx.client.clone()).with_events(events);

        let mut task = task;
        let result = uploader.upload(&mut task).await;
        // Dropping the uploader closes the channel and ends the progress line
        drop(uploader);
        let _ = progress.await;

        let uploaded = result?;
        Ok(format!(
            "Uploaded {} ({}) as {}",
            uploaded.filename,
            format_size(uploaded.size_bytes),
            uploaded.file_id
        ))
    }
}

impl Upload {
    async fn direct_upload(&self, ctx: &OpContext, task: UploadTask) -> Result<String, UploadOpError> {
        check_upload_size(task.size_bytes()).map_err(UploadError::from)?;

        let content = tokio::fs::read(&self.path)
            .await
            .map_err(|source| UploadError::Io {
                path: self.path.clone(),
                source,
            })?;
        let size = content.len() as u64;

        let response = ctx
            .client
            .call(DirectUploadRequest {
                filename: task.filename().to_string(),
                mime_type: task.mime_type().to_string(),
                folder_id: task.folder_id(),
                content: content.into(),
            })
            .await?;

        Ok(format!(
            "Uploaded {} ({}) as {}",
            response.filename.as_deref().unwrap_or(task.filename()),
            format_size(size),
            response.file_id
        ))
    }
}
