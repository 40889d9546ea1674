pub mod auth;
pub mod files;
pub mod folders;
pub mod shares;
pub mod users;

pub use auth::{LoginRequest, RegisterRequest, TokenResponse, User};
pub use files::{
    CompleteUploadRequest, DeleteFileRequest, DirectUploadRequest, DirectUploadResponse,
    DownloadLink, DownloadRequest, FileEntry, InitUploadRequest, InitUploadResponse,
    ListFilesRequest,
};
pub use folders::{CreateFolderRequest, DeleteFolderRequest, Folder, ListFoldersRequest};
pub use shares::{
    CreateShareRequest, FolderCategory, Receipt, ReceiptRequest, ReceivedRequest, SentRequest,
    ShareType, Transaction, TransactionDetails, TransactionRequest,
};
pub use users::{ProfileRequest, StorageRequest, StorageUsage};

use serde::{Deserialize, Serialize};

/// Acknowledgement body returned by mutating endpoints.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MessageResponse {
    #[serde(default)]
    pub message: Option<String>,
}

/// Backend timestamps are ISO-8601, sometimes without an offset. Naive
/// values are taken as UTC.
pub mod timestamp {
    use chrono::{DateTime, NaiveDateTime, Utc};
    use serde::{Deserialize, Deserializer};

    pub fn parse(raw: &str) -> Option<DateTime<Utc>> {
        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Some(dt.with_timezone(&Utc));
        }
        NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
            .ok()
            .map(|naive| naive.and_utc())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: {raw}")))
    }

    pub fn deserialize_option<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<String>::deserialize(deserializer)? {
            Some(raw) => parse(&raw)
                .map(Some)
                .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: {raw}"))),
            None => Ok(None),
        }
    }

}
