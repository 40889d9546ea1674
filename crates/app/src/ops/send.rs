use std::path::PathBuf;

use clap::Args;
use uuid::Uuid;

use common::api::v1::FolderCategory;
use common::send::{Attachment, FileSender, SendError, SendReceipt, SendRequest};
use common::upload::{UploadError, UploadTask, Uploader};

use super::upload::spawn_progress;
use crate::op::{Op, OpContext};

#[derive(Args, Debug, Clone)]
pub struct SendFile {
    /// Send a file already stored in FileFlow
    #[arg(long, required_unless_present = "path", conflicts_with = "path")]
    pub file_id: Option<Uuid>,

    /// Upload this local file first, then send it
    #[arg(long)]
    pub path: Option<PathBuf>,

    /// Recipient email
    #[arg(long)]
    pub to: String,

    /// Folder the file lands in on the recipient's side
    #[arg(long, value_enum)]
    pub folder: FolderCategory,

    /// Note for the recipient
    #[arg(long)]
    pub message: Option<String>,

    /// Your own folder to store an uploaded file in (only with --path)
    #[arg(long, requires = "path")]
    pub storage_folder: Option<Uuid>,
}

#[derive(Debug, thiserror::Error)]
pub enum SendFileError {
    #[error(transparent)]
    Send(SendError),
    #[error(transparent)]
    Upload(#[from] UploadError),
    /// The expiry notice has already been printed.
    #[error("send stopped: not signed in")]
    NotSignedIn,
}

impl From<SendError> for SendFileError {
    fn from(err: SendError) -> Self {
        if err.is_session_expired() {
            SendFileError::NotSignedIn
        } else {
            SendFileError::Send(err)
        }
    }
}

fn describe(receipt: &SendReceipt) -> String {
    let mut lines = vec![format!("Sent. Transaction ID: {}", receipt.transaction_id)];
    if receipt.uploaded {
        lines.push(format!("Uploaded as file {}", receipt.file_id));
    }
    lines.push(format!(
        "{} -> {} ({})",
        receipt.transaction.filename,
        receipt
            .transaction
            .recipient_name
            .as_deref()
            .unwrap_or("recipient"),
        receipt.transaction.target_folder_name
    ));
    lines.join("\n")
}

#[async_trait::async_trait]
impl Op for SendFile {
    type Error = SendFileError;
    type Output = String;

    async fn execute(&self, ctx: &OpContext) -> Result<Self::Output, Self::Error> {
        let attachment = match (&self.file_id, &self.path) {
            (Some(file_id), _) => Some(Attachment::Stored(*file_id)),
            (None, Some(path)) => {
                let task = UploadTask::from_path(path)
                    .await
                    .map_err(|source| UploadError::Io {
                        path: path.clone(),
                        source,
                    })?
                    .in_folder(self.storage_folder);
                Some(Attachment::Local(task))
            }
            (None, None) => None,
        };

        let progress = match &attachment {
            Some(Attachment::Local(task)) => Some(spawn_progress(task.filename().to_string())),
            _ => None,
        };
        let uploader = match &progress {
            Some((events, _)) => Uploader::new(ctx.client.clone()).with_events(events.clone()),
            None => Uploader::new(ctx.client.clone()),
        };
        let sender = FileSender::new(ctx.client.clone()).with_uploader(uploader);

        let result = sender
            .send(SendRequest {
                attachment,
                recipient_email: self.to.clone(),
                target_folder: Some(self.folder),
                message: self.message.clone(),
            })
            .await;

        drop(sender);
        if let Some((events, handle)) = progress {
            drop(events);
            let _ = handle.await;
        }

        if let Err(SendError::Share {
            file_id,
            uploaded: true,
            ..
        }) = &result
        {
            eprintln!(
                "The file was uploaded as {} but could not be shared. \
                 Retry with `fileflow send --file-id {}`",
                file_id, file_id
            );
        }

        Ok(describe(&result?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser, Debug)]
    struct Cli {
        #[command(flatten)]
        send: SendFile,
    }

    #[test]
    fn test_parses_stored_file() {
        let id = Uuid::new_v4();
        let id_arg = id.to_string();
        let cli = Cli::try_parse_from([
            "send",
            "--file-id",
            id_arg.as_str(),
            "--to",
            "jane@example.com",
            "--folder",
            "hospital-reports",
        ])
        .unwrap();
        assert_eq!(cli.send.file_id, Some(id));
        assert_eq!(cli.send.folder, FolderCategory::HospitalReports);
        assert_eq!(cli.send.storage_folder, None);
    }

    #[test]
    fn test_requires_exactly_one_attachment() {
        let id_arg = Uuid::new_v4().to_string();
        assert!(Cli::try_parse_from(["send", "--to", "a@b.c", "--folder", "bills"]).is_err());
        assert!(Cli::try_parse_from([
            "send",
            "--file-id",
            id_arg.as_str(),
            "--path",
            "bill.pdf",
            "--to",
            "a@b.c",
            "--folder",
            "bills",
        ])
        .is_err());
    }

    #[test]
    fn test_storage_folder_needs_path() {
        let id_arg = Uuid::new_v4().to_string();
        assert!(Cli::try_parse_from([
            "send",
            "--file-id",
            id_arg.as_str(),
            "--to",
            "a@b.c",
            "--folder",
            "bills",
            "--storage-folder",
            id_arg.as_str(),
        ])
        .is_err());
    }

    #[test]
    fn test_expired_session_is_not_a_generic_failure() {
        let err = SendFileError::from(SendError::Share {
            file_id: Uuid::nil(),
            uploaded: false,
            source: common::api::ApiError::SessionExpired {
                detail: "Could not validate credentials".to_string(),
            },
        });
        assert!(matches!(err, SendFileError::NotSignedIn));
        assert_eq!(err.to_string(), "send stopped: not signed in");

        let err = SendFileError::from(SendError::Validation(
            common::validation::ValidationError::MissingRecipient,
        ));
        assert!(matches!(err, SendFileError::Send(_)));
    }
}
