//! Sending a file to another user: optionally upload it first, then record
//! the share as a transaction.

use uuid::Uuid;

use crate::api::v1::shares::{CreateShareRequest, FolderCategory, ShareType, Transaction};
use crate::api::{ApiClient, ApiError};
use crate::upload::{UploadError, UploadTask, Uploader};
use crate::validation::ValidationError;

/// What is being sent.
#[derive(Debug, Clone)]
pub enum Attachment {
    /// A file already stored on the backend.
    Stored(Uuid),
    /// Local content that has to be uploaded first.
    Local(UploadTask),
}

#[derive(Debug, Clone, Default)]
pub struct SendRequest {
    pub attachment: Option<Attachment>,
    pub recipient_email: String,
    pub target_folder: Option<FolderCategory>,
    pub message: Option<String>,
}

impl SendRequest {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.recipient_email.trim().is_empty() {
            return Err(ValidationError::MissingRecipient);
        }
        if self.target_folder.is_none() {
            return Err(ValidationError::MissingTargetFolder);
        }
        if self.attachment.is_none() {
            return Err(ValidationError::MissingAttachment);
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct SendReceipt {
    pub transaction_id: String,
    pub file_id: Uuid,
    /// Whether the file was uploaded as part of this send.
    pub uploaded: bool,
    pub transaction: Transaction,
}

#[derive(Debug, thiserror::Error)]
pub enum SendError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Upload(UploadError),
    /// Share creation failed. When `uploaded` is set the file is stored but
    /// unshared; retry with `Attachment::Stored(file_id)`.
    #[error("send failed: {source}")]
    Share {
        file_id: Uuid,
        uploaded: bool,
        #[source]
        source: ApiError,
    },
}

impl SendError {
    pub fn is_session_expired(&self) -> bool {
        match self {
            SendError::Upload(e) => e.is_session_expired(),
            SendError::Share { source, .. } => source.is_session_expired(),
            SendError::Validation(_) => false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct FileSender {
    client: ApiClient,
    uploader: Uploader,
}

impl FileSender {
    pub fn new(client: ApiClient) -> Self {
        let uploader = Uploader::new(client.clone());
        Self { client, uploader }
    }

    /// Use a preconfigured uploader, e.g. one reporting progress.
    pub fn with_uploader(mut self, uploader: Uploader) -> Self {
        self.uploader = uploader;
        self
    }

    pub async fn send(&self, request: SendRequest) -> Result<SendReceipt, SendError> {
        request.validate()?;
        let SendRequest {
            attachment,
            recipient_email,
            target_folder,
            message,
        } = request;
        let (Some(attachment), Some(target_folder)) = (attachment, target_folder) else {
            return Err(ValidationError::MissingAttachment.into());
        };

        let (file_id, uploaded) = match attachment {
            Attachment::Stored(file_id) => (file_id, false),
            Attachment::Local(mut task) => {
                let uploaded = self
                    .uploader
                    .upload(&mut task)
                    .await
                    .map_err(SendError::Upload)?;
                (uploaded.file_id, true)
            }
        };

        let transaction = self
            .share(file_id, recipient_email.trim(), target_folder, message)
            .await
            .map_err(|source| {
                if uploaded {
                    tracing::warn!("file {} uploaded but not shared: {}", file_id, source);
                }
                SendError::Share {
                    file_id,
                    uploaded,
                    source,
                }
            })?;

        Ok(SendReceipt {
            transaction_id: transaction.transaction_id.clone(),
            file_id,
            uploaded,
            transaction,
        })
    }

    /// Create the share for an already stored file.
    pub async fn share(
        &self,
        file_id: Uuid,
        recipient_email: &str,
        target_folder: FolderCategory,
        message: Option<String>,
    ) -> Result<Transaction, ApiError> {
        let message = message.filter(|m| !m.trim().is_empty());
        let transaction = self
            .client
            .call(CreateShareRequest {
                file_id,
                recipient_email: recipient_email.to_string(),
                target_folder_name: target_folder,
                message,
                share_type: ShareType::Direct,
            })
            .await?;

        tracing::info!(
            "sent {} to {} as {}",
            file_id,
            recipient_email,
            transaction.transaction_id
        );
        Ok(transaction)
    }
}
