use clap::{Args, Subcommand};

use common::api::v1::shares::Party;
use common::api::v1::{
    Receipt, ReceiptRequest, ReceivedRequest, SentRequest, Transaction, TransactionDetails,
    TransactionRequest,
};
use common::api::ApiError;

use super::{format_size, format_time};
use crate::op::{Op, OpContext};

crate::command_enum! {
    (Sent, SentRequest),
    (Received, ReceivedRequest),
    (Show, TransactionRequest),
    (Receipt, ReceiptRequest),
}

pub type TransactionsCommand = Command;

#[derive(Args, Debug, Clone)]
pub struct Transactions {
    #[command(subcommand)]
    pub command: TransactionsCommand,
}

#[async_trait::async_trait]
impl Op for Transactions {
    type Error = OpError;
    type Output = OpOutput;

    async fn execute(&self, ctx: &OpContext) -> Result<Self::Output, Self::Error> {
        self.command.execute(ctx).await
    }
}

fn describe_list(transactions: &[Transaction], sent: bool) -> String {
    if transactions.is_empty() {
        return "No transactions found".to_string();
    }
    transactions
        .iter()
        .map(|tx| {
            let counterpart = if sent {
                format!("to {}", tx.recipient_name.as_deref().unwrap_or("unknown"))
            } else {
                format!("from {}", tx.sender_name)
            };
            format!(
                "{}  {}  {}  {} ({})  [{}]",
                tx.transaction_id,
                format_time(&tx.created_at),
                tx.filename,
                counterpart,
                tx.target_folder_name,
                tx.status
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn party(party: &Party) -> String {
    match (&party.name, &party.email) {
        (Some(name), Some(email)) => format!("{} <{}>", name, email),
        (Some(name), None) => name.clone(),
        (None, Some(email)) => email.clone(),
        (None, None) => "unknown".to_string(),
    }
}

fn describe_details(tx: &TransactionDetails) -> String {
    let mut lines = vec![
        format!("Transaction: {}", tx.transaction_id),
        format!(
            "File:        {} ({}, {})",
            tx.file.filename,
            format_size(tx.file.size_bytes),
            tx.file.mime_type
        ),
        format!("From:        {}", party(&tx.sender)),
        format!("To:          {}", party(&tx.recipient)),
        format!("Folder:      {}", tx.target_folder),
        format!("Status:      {}", tx.status),
        format!("Sent:        {}", format_time(&tx.created_at)),
    ];
    if let Some(delivered) = &tx.delivered_at {
        lines.push(format!("Delivered:   {}", format_time(delivered)));
    }
    if let Some(viewed) = &tx.viewed_at {
        lines.push(format!("Viewed:      {}", format_time(viewed)));
    }
    if let Some(message) = &tx.message {
        lines.push(format!("Message:     {}", message));
    }
    lines.join("\n")
}

fn describe_receipt(receipt: &Receipt) -> String {
    let mut lines = vec![
        format!("Receipt:     {}", receipt.receipt_id),
        format!("Transaction: {}", receipt.transaction_id),
        format!("Issued:      {}", receipt.timestamp.to_rfc3339()),
        format!("Status:      {}", receipt.status),
        format!(
            "From:        {}",
            receipt.sender.name.as_deref().unwrap_or("unknown")
        ),
        format!(
            "To:          {}",
            receipt.recipient.name.as_deref().unwrap_or("unknown")
        ),
        format!(
            "Item:        {} ({})",
            receipt.item.name,
            format_size(receipt.item.size)
        ),
        format!("Checksum:    {}", receipt.item.checksum),
        format!("Signature:   {}", receipt.verification_signature),
    ];
    if let Some(disclaimer) = &receipt.legal_disclaimer {
        lines.push(String::new());
        lines.push(disclaimer.clone());
    }
    lines.join("\n")
}

#[async_trait::async_trait]
impl Op for SentRequest {
    type Error = ApiError;
    type Output = String;

    async fn execute(&self, ctx: &OpContext) -> Result<Self::Output, Self::Error> {
        let transactions = ctx.client.call(self.clone()).await?;
        Ok(describe_list(&transactions, true))
    }
}

#[async_trait::async_trait]
impl Op for ReceivedRequest {
    type Error = ApiError;
    type Output = String;

    async fn execute(&self, ctx: &OpContext) -> Result<Self::Output, Self::Error> {
        let transactions = ctx.client.call(self.clone()).await?;
        Ok(describe_list(&transactions, false))
    }
}

#[async_trait::async_trait]
impl Op for TransactionRequest {
    type Error = ApiError;
    type Output = String;

    async fn execute(&self, ctx: &OpContext) -> Result<Self::Output, Self::Error> {
        let details = ctx.client.call(self.clone()).await?;
        Ok(describe_details(&details))
    }
}

#[async_trait::async_trait]
impl Op for ReceiptRequest {
    type Error = ApiError;
    type Output = String;

    async fn execute(&self, ctx: &OpContext) -> Result<Self::Output, Self::Error> {
        let receipt = ctx.client.call(self.clone()).await?;
        Ok(describe_receipt(&receipt))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use uuid::Uuid;

    fn transaction() -> Transaction {
        Transaction {
            id: Uuid::nil(),
            transaction_id: "TXN1".to_string(),
            file_id: Uuid::nil(),
            filename: "bill.pdf".to_string(),
            sender_name: "John".to_string(),
            recipient_name: Some("Jane".to_string()),
            target_folder_name: "Bills".to_string(),
            status: "sent".to_string(),
            created_at: chrono::Utc.with_ymd_and_hms(2025, 1, 2, 3, 4, 5).unwrap(),
            message: None,
        }
    }

    #[test]
    fn test_list_names_the_other_side() {
        let txs = vec![transaction()];
        assert_eq!(
            describe_list(&txs, true),
            "TXN1  2025-01-02 03:04  bill.pdf  to Jane (Bills)  [sent]"
        );
        assert_eq!(
            describe_list(&txs, false),
            "TXN1  2025-01-02 03:04  bill.pdf  from John (Bills)  [sent]"
        );
        assert_eq!(describe_list(&[], true), "No transactions found");
    }

    #[test]
    fn test_party() {
        let p = Party {
            name: Some("Jane".to_string()),
            email: Some("jane@example.com".to_string()),
        };
        assert_eq!(party(&p), "Jane <jane@example.com>");
        assert_eq!(
            party(&Party {
                name: None,
                email: None
            }),
            "unknown"
        );
    }
}
