pub use clap::Parser;

use std::path::PathBuf;
use url::Url;

#[derive(Parser, Debug)]
#[command(name = "fileflow")]
#[command(about = "Store, organize and send documents with FileFlow")]
pub struct Args {
    /// Backend URL (defaults to `api_url` from config.toml, then http://localhost:8000)
    #[arg(long, global = true)]
    pub remote: Option<Url>,

    /// Path to the fileflow config directory (defaults to ~/.fileflow)
    #[arg(long, global = true)]
    pub config_path: Option<PathBuf>,

    /// Log level: error, warn, info, debug or trace (defaults to `log_level` from config.toml)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: crate::Command,
}
