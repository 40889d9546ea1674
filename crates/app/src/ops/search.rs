use std::time::Duration;

use clap::Args;
use tokio::io::{AsyncBufReadExt, BufReader};
use uuid::Uuid;

use common::search::{SearchResults, SearchSession};

use super::files::describe_all;
use crate::op::{Op, OpContext};

/// Search files as you type: each line read from stdin replaces the pending
/// query, and only queries left alone for the debounce window are sent.
#[derive(Args, Debug, Clone)]
pub struct Search {
    /// Only search in this folder
    #[arg(long)]
    pub folder_id: Option<Uuid>,

    /// Debounce window in milliseconds (defaults to `search_debounce_ms` from config.toml)
    #[arg(long)]
    pub debounce_ms: Option<u64>,
}

#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error("failed to read queries from stdin: {0}")]
    Stdin(#[from] std::io::Error),
}

fn render(results: SearchResults) -> String {
    match results.result {
        Ok(files) => format!("Results for {:?}:\n{}", results.query, describe_all(&files)),
        Err(e) => format!("Search for {:?} failed: {}", results.query, e),
    }
}

#[async_trait::async_trait]
impl Op for Search {
    type Error = SearchError;
    type Output = String;

    async fn execute(&self, ctx: &OpContext) -> Result<Self::Output, Self::Error> {
        let delay = self
            .debounce_ms
            .map(Duration::from_millis)
            .unwrap_or_else(|| ctx.search_debounce());
        let (mut session, results) = SearchSession::new(ctx.client.clone(), self.folder_id, delay);

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        // Last query pushed that has not been answered yet
        let mut pending: Option<String> = None;

        loop {
            tokio::select! {
                line = lines.next_line() => {
                    match line? {
                        Some(line) => {
                            let query = line.trim().to_string();
                            session.push(query.as_str());
                            pending = (!query.is_empty()).then_some(query);
                        }
                        None => break,
                    }
                }
                Ok(result) = results.recv_async() => {
                    if pending.as_deref() == Some(result.query.as_str()) {
                        pending = None;
                    }
                    println!("{}", render(result));
                }
            }
        }

        // Input closed: let the last query through
        if let Some(query) = pending {
            while let Ok(result) = results.recv_async().await {
                let done = result.query == query;
                println!("{}", render(result));
                if done {
                    break;
                }
            }
        }

        Ok(String::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::api::ApiError;

    #[test]
    fn test_render_failure() {
        let rendered = render(SearchResults {
            query: "invoice".to_string(),
            result: Err(ApiError::SessionExpired {
                detail: "Could not validate credentials".to_string(),
            }),
        });
        assert_eq!(
            rendered,
            "Search for \"invoice\" failed: not authorized: Could not validate credentials"
        );
    }

    #[test]
    fn test_render_empty() {
        let rendered = render(SearchResults {
            query: "invoice".to_string(),
            result: Ok(vec![]),
        });
        assert_eq!(rendered, "Results for \"invoice\":\nNo files found");
    }
}
