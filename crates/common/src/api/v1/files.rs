use bytes::Bytes;
use chrono::{DateTime, Utc};
use reqwest::multipart::{Form, Part};
use reqwest::{Body, Client, RequestBuilder, Url};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{timestamp, MessageResponse};
use crate::api::client::{endpoint, ApiError, ApiRequest};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileEntry {
    pub id: Uuid,
    pub filename: String,
    #[serde(alias = "sizeBytes")]
    pub size_bytes: u64,
    #[serde(alias = "mimeType")]
    pub mime_type: String,
    #[serde(default)]
    pub folder_id: Option<Uuid>,
    #[serde(alias = "createdAt", deserialize_with = "timestamp::deserialize")]
    pub created_at: DateTime<Utc>,
    #[serde(default, alias = "viewUrl")]
    pub view_url: Option<String>,
    #[serde(default)]
    pub thumbnail_url: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, clap::Args)]
pub struct ListFilesRequest {
    /// Only list files in this folder
    #[serde(skip_serializing_if = "Option::is_none")]
    #[arg(long)]
    pub folder_id: Option<Uuid>,

    /// Filter by filename
    #[serde(skip_serializing_if = "Option::is_none")]
    #[arg(long)]
    pub search: Option<String>,
}

impl ApiRequest for ListFilesRequest {
    type Response = Vec<FileEntry>;

    fn build_request(self, base_url: &Url, client: &Client) -> Result<RequestBuilder, ApiError> {
        Ok(client.get(endpoint(base_url, "files")?).query(&self))
    }
}

/// Phase one of an upload: ask the backend where to put the bytes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InitUploadRequest {
    pub filename: String,
    pub size_bytes: u64,
    pub mime_type: String,
    pub folder_id: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InitUploadResponse {
    #[serde(alias = "uploadUrl")]
    pub upload_url: Url,
    #[serde(alias = "fileId")]
    pub file_id: Uuid,
    #[serde(default)]
    pub storage_key: Option<String>,
}

impl ApiRequest for InitUploadRequest {
    type Response = InitUploadResponse;

    fn build_request(self, base_url: &Url, client: &Client) -> Result<RequestBuilder, ApiError> {
        Ok(client
            .post(endpoint(base_url, "files/upload/init")?)
            .json(&self))
    }
}

/// Phase three of an upload: the bytes are in place, make the file visible.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompleteUploadRequest {
    pub file_id: Uuid,
}

impl ApiRequest for CompleteUploadRequest {
    type Response = MessageResponse;

    fn build_request(self, base_url: &Url, client: &Client) -> Result<RequestBuilder, ApiError> {
        let path = format!("files/upload/{}/complete", self.file_id);
        Ok(client.post(endpoint(base_url, &path)?))
    }
}

/// Single-request multipart upload through the backend itself.
#[derive(Debug, Clone)]
pub struct DirectUploadRequest {
    pub filename: String,
    pub mime_type: String,
    pub folder_id: Option<Uuid>,
    pub content: Bytes,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectUploadResponse {
    #[serde(alias = "id", alias = "fileId")]
    pub file_id: Uuid,
    #[serde(default)]
    pub filename: Option<String>,
}

impl ApiRequest for DirectUploadRequest {
    type Response = DirectUploadResponse;

    fn build_request(self, base_url: &Url, client: &Client) -> Result<RequestBuilder, ApiError> {
        let length = self.content.len() as u64;
        let part = Part::stream_with_length(Body::from(self.content), length)
            .file_name(self.filename)
            .mime_str(&self.mime_type)?;

        let mut form = Form::new().part("file", part);
        if let Some(folder_id) = self.folder_id {
            form = form.text("folder_id", folder_id.to_string());
        }

        Ok(client
            .post(endpoint(base_url, "files/upload/direct")?)
            .multipart(form))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownloadLink {
    #[serde(alias = "downloadUrl")]
    pub download_url: Url,
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub expires_in: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, clap::Args)]
pub struct DownloadRequest {
    /// File ID
    #[arg(long)]
    pub id: Uuid,
}

impl ApiRequest for DownloadRequest {
    type Response = DownloadLink;

    fn build_request(self, base_url: &Url, client: &Client) -> Result<RequestBuilder, ApiError> {
        Ok(client.get(endpoint(base_url, &format!("files/{}/download", self.id))?))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, clap::Args)]
pub struct DeleteFileRequest {
    /// File ID
    #[arg(long)]
    pub id: Uuid,
}

impl ApiRequest for DeleteFileRequest {
    type Response = MessageResponse;

    fn build_request(self, base_url: &Url, client: &Client) -> Result<RequestBuilder, ApiError> {
        Ok(client.delete(endpoint(base_url, &format!("files/{}", self.id))?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_query_omits_unset_filters() {
        let base = Url::parse("http://localhost:8000").unwrap();
        let client = Client::new();

        let request = ListFilesRequest {
            folder_id: None,
            search: Some("invoice".to_string()),
        }
        .build_request(&base, &client)
        .unwrap()
        .build()
        .unwrap();
        assert_eq!(request.url().path(), "/api/v1/files");
        assert_eq!(request.url().query(), Some("search=invoice"));

        let request = ListFilesRequest::default()
            .build_request(&base, &client)
            .unwrap()
            .build()
            .unwrap();
        assert_eq!(request.url().query(), None);
    }

    #[test]
    fn test_file_entry_from_backend_listing() {
        let entry: FileEntry = serde_json::from_str(
            r#"{"id":"5f0c8a59-3f2e-4c1b-9d1e-0c3b8c1f7a10","filename":"bill.pdf",
                "size_bytes":2048,"mime_type":"application/pdf","folder_id":null,
                "created_at":"2025-01-02T03:04:05.678901","thumbnail_url":null}"#,
        )
        .unwrap();
        assert_eq!(entry.filename, "bill.pdf");
        assert_eq!(entry.size_bytes, 2048);
        assert!(entry.folder_id.is_none());
    }
}
