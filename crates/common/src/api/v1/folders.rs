use reqwest::{Client, RequestBuilder, Url};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::MessageResponse;
use crate::api::client::{endpoint, ApiError, ApiRequest};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Folder {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default, alias = "fileCount")]
    pub file_count: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, clap::Args)]
pub struct ListFoldersRequest;

impl ApiRequest for ListFoldersRequest {
    type Response = Vec<Folder>;

    fn build_request(self, base_url: &Url, client: &Client) -> Result<RequestBuilder, ApiError> {
        Ok(client.get(endpoint(base_url, "folders")?))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, clap::Args)]
pub struct CreateFolderRequest {
    /// Folder name
    #[arg(long)]
    pub name: String,

    /// Icon shown next to the folder
    #[serde(skip_serializing_if = "Option::is_none")]
    #[arg(long)]
    pub icon: Option<String>,

    /// Display colour, e.g. "#667eea"
    #[serde(skip_serializing_if = "Option::is_none")]
    #[arg(long)]
    pub color: Option<String>,
}

impl ApiRequest for CreateFolderRequest {
    type Response = Folder;

    fn build_request(self, base_url: &Url, client: &Client) -> Result<RequestBuilder, ApiError> {
        Ok(client.post(endpoint(base_url, "folders")?).json(&self))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, clap::Args)]
pub struct DeleteFolderRequest {
    /// Folder ID
    #[arg(long)]
    pub id: Uuid,
}

impl ApiRequest for DeleteFolderRequest {
    type Response = MessageResponse;

    fn build_request(self, base_url: &Url, client: &Client) -> Result<RequestBuilder, ApiError> {
        Ok(client.delete(endpoint(base_url, &format!("folders/{}", self.id))?))
    }
}
