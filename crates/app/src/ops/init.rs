use clap::Args;
use url::Url;

use crate::state::{AppConfig, AppState};

#[derive(Args, Debug, Clone)]
pub struct Init {
    /// Backend URL to store in config.toml (default: http://localhost:8000)
    #[arg(long)]
    pub api_url: Option<Url>,

    /// Default log level (default: warn)
    #[arg(long)]
    pub default_log_level: Option<String>,

    /// Search debounce in milliseconds (default: 500)
    #[arg(long)]
    pub search_debounce_ms: Option<u64>,
}

#[derive(Debug, thiserror::Error)]
pub enum InitError {
    #[error("init failed: {0}")]
    StateFailed(#[from] crate::state::StateError),
}

#[async_trait::async_trait]
impl crate::op::Op for Init {
    type Error = InitError;
    type Output = String;

    async fn execute(&self, ctx: &crate::op::OpContext) -> Result<Self::Output, Self::Error> {
        let defaults = AppConfig::default();
        let config = AppConfig {
            api_url: self.api_url.clone().unwrap_or(defaults.api_url),
            log_level: self.default_log_level.clone().unwrap_or(defaults.log_level),
            search_debounce_ms: self
                .search_debounce_ms
                .unwrap_or(defaults.search_debounce_ms),
        };

        let state = AppState::init(ctx.config_path.clone(), Some(config))?;

        let output = format!(
            "Initialized fileflow directory at: {}\n\
             - Config: {}\n\
             - Session: {}\n\
             - API URL: {}\n\
             - Log level: {}\n\
             - Search debounce: {}ms",
            state.fileflow_dir.display(),
            state.config_path.display(),
            state.session_path.display(),
            state.config.api_url,
            state.config.log_level,
            state.config.search_debounce_ms
        );

        Ok(output)
    }
}
