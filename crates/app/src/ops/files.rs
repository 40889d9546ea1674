use std::path::PathBuf;

use clap::{Args, Subcommand};
use tokio::io::AsyncWriteExt;

use common::api::v1::{DeleteFileRequest, DownloadRequest, FileEntry, ListFilesRequest};
use common::api::ApiError;

use super::{format_size, format_time};
use crate::op::{Op, OpContext};

crate::command_enum! {
    (List, ListFilesRequest),
    (Download, Download),
    (Delete, DeleteFileRequest),
}

pub type FilesCommand = Command;

#[derive(Args, Debug, Clone)]
pub struct Files {
    #[command(subcommand)]
    pub command: FilesCommand,
}

#[async_trait::async_trait]
impl Op for Files {
    type Error = OpError;
    type Output = OpOutput;

    async fn execute(&self, ctx: &OpContext) -> Result<Self::Output, Self::Error> {
        self.command.execute(ctx).await
    }
}

pub fn describe(file: &FileEntry) -> String {
    format!(
        "{}  {}  {}  {}",
        file.id,
        format_time(&file.created_at),
        format_size(file.size_bytes),
        file.filename
    )
}

pub fn describe_all(files: &[FileEntry]) -> String {
    if files.is_empty() {
        return "No files found".to_string();
    }
    files.iter().map(describe).collect::<Vec<_>>().join("\n")
}

#[async_trait::async_trait]
impl Op for ListFilesRequest {
    type Error = ApiError;
    type Output = String;

    async fn execute(&self, ctx: &OpContext) -> Result<Self::Output, Self::Error> {
        let files = ctx.client.call(self.clone()).await?;
        Ok(describe_all(&files))
    }
}

#[async_trait::async_trait]
impl Op for DeleteFileRequest {
    type Error = ApiError;
    type Output = String;

    async fn execute(&self, ctx: &OpContext) -> Result<Self::Output, Self::Error> {
        let response = ctx.client.call(self.clone()).await?;
        Ok(response
            .message
            .unwrap_or_else(|| format!("Deleted file {}", self.id)))
    }
}

#[derive(Args, Debug, Clone)]
pub struct Download {
    #[command(flatten)]
    pub request: DownloadRequest,

    /// Save the file here instead of printing the download link
    #[arg(long, short)]
    pub output: Option<PathBuf>,
}

#[derive(Debug, thiserror::Error)]
pub enum DownloadError {
    #[error("API error: {0}")]
    Api(#[from] ApiError),
    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[async_trait::async_trait]
impl Op for Download {
    type Error = DownloadError;
    type Output = String;

    async fn execute(&self, ctx: &OpContext) -> Result<Self::Output, Self::Error> {
        let link = ctx.client.call(self.request.clone()).await?;

        let Some(path) = &self.output else {
            return Ok(link.download_url.to_string());
        };

        // Pre-signed link: no credentials, straight to storage
        let mut response = ctx
            .client
            .http_client()
            .get(link.download_url.clone())
            .send()
            .await
            .map_err(ApiError::from)?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.map_err(ApiError::from)?;
            return Err(ApiError::backend(status, &body).into());
        }

        let write_err = |source| DownloadError::Write {
            path: path.clone(),
            source,
        };
        let mut file = tokio::fs::File::create(path).await.map_err(write_err)?;
        let mut written = 0u64;
        while let Some(chunk) = response.chunk().await.map_err(ApiError::from)? {
            file.write_all(&chunk).await.map_err(write_err)?;
            written += chunk.len() as u64;
        }
        file.flush().await.map_err(write_err)?;

        tracing::info!("downloaded {} bytes to {}", written, path.display());
        Ok(format!(
            "Saved {} ({}) to {}",
            link.filename.as_deref().unwrap_or("file"),
            format_size(written),
            path.display()
        ))
    }
}
