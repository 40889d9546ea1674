/// Largest file accepted for upload: 100 MiB.
pub const MAX_UPLOAD_BYTES: u64 = 100 * 1024 * 1024;

/// Problems caught before any request leaves the process.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("file size must be less than 100MB (got {size} bytes)")]
    FileTooLarge { size: u64 },
    #[error("a filename is required")]
    MissingFilename,
    #[error("recipient email is required")]
    MissingRecipient,
    #[error("target folder is required")]
    MissingTargetFolder,
    #[error("a file must be attached")]
    MissingAttachment,
}

pub fn check_upload_size(size: u64) -> Result<(), ValidationError> {
    if size > MAX_UPLOAD_BYTES {
        return Err(ValidationError::FileTooLarge { size });
    }
    Ok(())
}
