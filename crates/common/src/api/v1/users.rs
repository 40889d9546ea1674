use reqwest::{Client, RequestBuilder, Url};
use serde::{Deserialize, Serialize};

use super::auth::User;
use crate::api::client::{endpoint, ApiError, ApiRequest};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageUsage {
    #[serde(alias = "usedGb")]
    pub used_gb: f64,
    #[serde(alias = "quotaGb")]
    pub quota_gb: f64,
    pub percentage: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, clap::Args)]
pub struct ProfileRequest;

impl ApiRequest for ProfileRequest {
    type Response = User;

    fn build_request(self, base_url: &Url, client: &Client) -> Result<RequestBuilder, ApiError> {
        Ok(client.get(endpoint(base_url, "users/me")?))
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, clap::Args)]
pub struct StorageRequest;

impl ApiRequest for StorageRequest {
    type Response = StorageUsage;

    fn build_request(self, base_url: &Url, client: &Client) -> Result<RequestBuilder, ApiError> {
        Ok(client.get(endpoint(base_url, "users/storage")?))
    }
}
