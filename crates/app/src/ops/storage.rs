use clap::Args;

use common::api::v1::{StorageRequest, StorageUsage};
use common::api::ApiError;

#[derive(Args, Debug, Clone)]
pub struct Storage;

fn describe(usage: &StorageUsage) -> String {
    format!(
        "{:.2} GB of {:.2} GB used ({:.1}%)",
        usage.used_gb, usage.quota_gb, usage.percentage
    )
}

#[async_trait::async_trait]
impl crate::op::Op for Storage {
    type Error = ApiError;
    type Output = String;

    async fn execute(&self, ctx: &crate::op::OpContext) -> Result<Self::Output, Self::Error> {
        let usage = ctx.client.call(StorageRequest).await?;
        Ok(describe(&usage))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe() {
        let usage = StorageUsage {
            used_gb: 1.5,
            quota_gb: 5.0,
            percentage: 30.0,
        };
        assert_eq!(describe(&usage), "1.50 GB of 5.00 GB used (30.0%)");
    }
}
