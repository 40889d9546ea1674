use clap::{Args, Subcommand};

use common::api::v1::{CreateFolderRequest, DeleteFolderRequest, Folder, ListFoldersRequest};
use common::api::ApiError;

use crate::op::{Op, OpContext};

crate::command_enum! {
    (List, ListFoldersRequest),
    (Create, CreateFolderRequest),
    (Delete, DeleteFolderRequest),
}

pub type FoldersCommand = Command;

#[derive(Args, Debug, Clone)]
pub struct Folders {
    #[command(subcommand)]
    pub command: FoldersCommand,
}

#[async_trait::async_trait]
impl Op for Folders {
    type Error = OpError;
    type Output = OpOutput;

    async fn execute(&self, ctx: &OpContext) -> Result<Self::Output, Self::Error> {
        self.command.execute(ctx).await
    }
}

fn describe(folder: &Folder) -> String {
    let files = match folder.file_count {
        1 => "1 file".to_string(),
        n => format!("{} files", n),
    };
    format!("{}  {} ({})", folder.id, folder.name, files)
}

#[async_trait::async_trait]
impl Op for ListFoldersRequest {
    type Error = ApiError;
    type Output = String;

    async fn execute(&self, ctx: &OpContext) -> Result<Self::Output, Self::Error> {
        let folders = ctx.client.call(self.clone()).await?;
        if folders.is_empty() {
            return Ok("No folders found".to_string());
        }
        Ok(folders.iter().map(describe).collect::<Vec<_>>().join("\n"))
    }
}

#[async_trait::async_trait]
impl Op for CreateFolderRequest {
    type Error = ApiError;
    type Output = String;

    async fn execute(&self, ctx: &OpContext) -> Result<Self::Output, Self::Error> {
        let folder = ctx.client.call(self.clone()).await?;
        Ok(format!("Created folder {}", describe(&folder)))
    }
}

#[async_trait::async_trait]
impl Op for DeleteFolderRequest {
    type Error = ApiError;
    type Output = String;

    async fn execute(&self, ctx: &OpContext) -> Result<Self::Output, Self::Error> {
        let response = ctx.client.call(self.clone()).await?;
        Ok(response
            .message
            .unwrap_or_else(|| format!("Deleted folder {}", self.id)))
    }
}
