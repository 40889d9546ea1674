use std::fmt;

use chrono::{DateTime, Utc};
use reqwest::{Client, RequestBuilder, Url};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::timestamp;
use crate::api::client::{endpoint, ApiError, ApiRequest};

/// Folder the recipient will find a shared file in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
pub enum FolderCategory {
    Bills,
    #[serde(rename = "Hospital Reports")]
    HospitalReports,
    Company,
    Education,
    Receipts,
    Personal,
}

impl FolderCategory {
    pub const ALL: [FolderCategory; 6] = [
        FolderCategory::Bills,
        FolderCategory::HospitalReports,
        FolderCategory::Company,
        FolderCategory::Education,
        FolderCategory::Receipts,
        FolderCategory::Personal,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FolderCategory::Bills => "Bills",
            FolderCategory::HospitalReports => "Hospital Reports",
            FolderCategory::Company => "Company",
            FolderCategory::Education => "Education",
            FolderCategory::Receipts => "Receipts",
            FolderCategory::Personal => "Personal",
        }
    }
}

impl fmt::Display for FolderCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShareType {
    #[default]
    Direct,
    Link,
    Qr,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateShareRequest {
    pub file_id: Uuid,
    pub recipient_email: String,
    pub target_folder_name: FolderCategory,
    pub message: Option<String>,
    pub share_type: ShareType,
}

impl ApiRequest for CreateShareRequest {
    type Response = Transaction;

    fn build_request(self, base_url: &Url, client: &Client) -> Result<RequestBuilder, ApiError> {
        Ok(client.post(endpoint(base_url, "shares")?).json(&self))
    }
}

/// One file sent from one user to another, as recorded by the backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub id: Uuid,
    pub transaction_id: String,
    pub file_id: Uuid,
    pub filename: String,
    pub sender_name: String,
    #[serde(default)]
    pub recipient_name: Option<String>,
    pub target_folder_name: String,
    pub status: String,
    #[serde(deserialize_with = "timestamp::deserialize")]
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, clap::Args)]
pub struct SentRequest;

impl ApiRequest for SentRequest {
    type Response = Vec<Transaction>;

    fn build_request(self, base_url: &Url, client: &Client) -> Result<RequestBuilder, ApiError> {
        Ok(client.get(endpoint(base_url, "shares/sent")?))
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, clap::Args)]
pub struct ReceivedRequest;

impl ApiRequest for ReceivedRequest {
    type Response = Vec<Transaction>;

    fn build_request(self, base_url: &Url, client: &Client) -> Result<RequestBuilder, ApiError> {
        Ok(client.get(endpoint(base_url, "shares/received")?))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionFile {
    pub id: Uuid,
    pub filename: String,
    pub size_bytes: u64,
    pub mime_type: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Party {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionDetails {
    pub id: Uuid,
    pub transaction_id: String,
    pub file: TransactionFile,
    pub sender: Party,
    pub recipient: Party,
    pub target_folder: String,
    #[serde(default)]
    pub message: Option<String>,
    pub status: String,
    #[serde(deserialize_with = "timestamp::deserialize")]
    pub created_at: DateTime<Utc>,
    #[serde(default, deserialize_with = "timestamp::deserialize_option")]
    pub delivered_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "timestamp::deserialize_option")]
    pub viewed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, clap::Args)]
pub struct TransactionRequest {
    /// Transaction ID, as shown after sending
    #[arg(long)]
    pub transaction_id: String,
}

impl ApiRequest for TransactionRequest {
    type Response = TransactionDetails;

    fn build_request(self, base_url: &Url, client: &Client) -> Result<RequestBuilder, ApiError> {
        let path = format!("shares/{}", self.transaction_id);
        Ok(client.get(endpoint(base_url, &path)?))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReceiptParty {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReceiptItem {
    pub name: String,
    pub size: u64,
    pub checksum: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Receipt {
    pub receipt_id: String,
    pub transaction_id: String,
    #[serde(deserialize_with = "timestamp::deserialize")]
    pub timestamp: DateTime<Utc>,
    pub status: String,
    pub sender: ReceiptParty,
    pub recipient: ReceiptParty,
    pub item: ReceiptItem,
    pub verification_signature: String,
    #[serde(default)]
    pub legal_disclaimer: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, clap::Args)]
pub struct ReceiptRequest {
    /// Transaction ID, as shown after sending
    #[arg(long)]
    pub transaction_id: String,
}

impl ApiRequest for ReceiptRequest {
    type Response = Receipt;

    fn build_request(self, base_url: &Url, client: &Client) -> Result<RequestBuilder, ApiError> {
        let path = format!("shares/{}/receipt", self.transaction_id);
        Ok(client.get(endpoint(base_url, &path)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_wire_names() {
        for category in FolderCategory::ALL {
            let json = serde_json::to_string(&category).unwrap();
            assert_eq!(json, format!("\"{}\"", category.as_str()));
        }
        let parsed: FolderCategory = serde_json::from_str("\"Hospital Reports\"").unwrap();
        assert_eq!(parsed, FolderCategory::HospitalReports);
    }

    #[test]
    fn test_share_body_shape() {
        let request = CreateShareRequest {
            file_id: Uuid::nil(),
            recipient_email: "jane@example.com".to_string(),
            target_folder_name: FolderCategory::HospitalReports,
            message: None,
            share_type: ShareType::default(),
        };
        let body = serde_json::to_value(&request).unwrap();
        assert_eq!(body["target_folder_name"], "Hospital Reports");
        assert_eq!(body["share_type"], "direct");
        assert_eq!(body["recipient_email"], "jane@example.com");
        assert!(body["message"].is_null());
    }
}
