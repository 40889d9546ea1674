use std::error::Error;
use std::path::PathBuf;
use std::time::Duration;

use url::Url;

use common::api::{ApiClient, ApiError};
use common::session::{SessionStore, SESSION_FILE_NAME};

use crate::state::{default_api_url, AppConfig, AppState, StateError};

/// Resolve the remote URL for the API client.
///
/// Priority: explicit `--remote` flag > config file `api_url` > http://localhost:8000.
pub fn resolve_remote(explicit: Option<Url>, config: Option<&AppConfig>) -> Url {
    if let Some(url) = explicit {
        return url;
    }
    if let Some(config) = config {
        return config.api_url.clone();
    }
    default_api_url()
}

/// Resolve the log level.
///
/// Priority: explicit `--log-level` flag > config file `log_level` > warn.
pub fn resolve_log_level(explicit: Option<String>, config: Option<&AppConfig>) -> String {
    explicit
        .or_else(|| config.map(|c| c.log_level.clone()))
        .unwrap_or_else(|| AppConfig::default().log_level)
}

fn notify_session_expired() {
    eprintln!("Session expired. Run `fileflow login` to sign in again.");
}

#[derive(Debug, thiserror::Error)]
pub enum ContextError {
    #[error(transparent)]
    State(#[from] StateError),
    #[error("failed to create API client: {0}")]
    Api(#[from] ApiError),
}

#[derive(Clone)]
pub struct OpContext {
    /// API client carrying the persisted session
    pub client: ApiClient,
    /// Optional custom config path (defaults to ~/.fileflow)
    pub config_path: Option<PathBuf>,
    /// Loaded config, or defaults when the directory is not initialized
    pub config: AppConfig,
}

impl OpContext {
    /// Create context from the command line flags and the config loaded from
    /// disk, if any. Opening the session file may log, so callers install the
    /// subscriber first.
    pub fn open(
        remote: Option<Url>,
        config_path: Option<PathBuf>,
        state: Option<AppState>,
    ) -> Result<Self, ContextError> {
        let fileflow_dir = AppState::fileflow_dir(config_path.clone())?;

        let remote = resolve_remote(remote, state.as_ref().map(|s| &s.config));
        let session = SessionStore::open(fileflow_dir.join(SESSION_FILE_NAME));
        let client = ApiClient::new(&remote, session)?.with_redirect(notify_session_expired);

        Ok(Self {
            client,
            config_path,
            config: state.map(|s| s.config).unwrap_or_default(),
        })
    }

    pub fn session(&self) -> &SessionStore {
        self.client.session()
    }

    pub fn search_debounce(&self) -> Duration {
        Duration::from_millis(self.config.search_debounce_ms)
    }
}

#[async_trait::async_trait]
pub trait Op: Send + Sync {
    type Error: Error + Send + Sync + 'static;
    type Output;

    async fn execute(&self, ctx: &OpContext) -> Result<Self::Output, Self::Error>;
}

#[macro_export]
macro_rules! command_enum {
    ($(($variant:ident, $type:ty)),* $(,)?) => {
        #[derive(Subcommand, Debug, Clone)]
        pub enum Command {
            $($variant($type),)*
        }

        #[derive(Debug)]
        pub enum OpOutput {
            $($variant(<$type as $crate::op::Op>::Output),)*
        }

        #[derive(Debug, thiserror::Error)]
        pub enum OpError {
            $(
                #[error(transparent)]
                $variant(<$type as $crate::op::Op>::Error),
            )*
        }

        #[async_trait::async_trait]
        impl $crate::op::Op for Command {
            type Output = OpOutput;
            type Error = OpError;

            async fn execute(&self, ctx: &$crate::op::OpContext) -> Result<Self::Output, Self::Error> {
                match self {
                    $(
                        Command::$variant(op) => {
                            op.execute(ctx).await
                                .map(OpOutput::$variant)
                                .map_err(OpError::$variant)
                        },
                    )*
                }
            }
        }

        impl std::fmt::Display for OpOutput {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                match self {
                    $(
                        OpOutput::$variant(output) => write!(f, "{}", output),
                    )*
                }
            }
        }
    };
}
