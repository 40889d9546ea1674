mod args;
mod logging;
mod op;
mod ops;
mod state;
mod version;

use args::Args;
use clap::{Parser, Subcommand};
use op::Op;
use state::AppState;
use ops::{
    Files, Folders, Init, Login, Logout, Register, Search, SendFile, Storage, Transactions,
    Upload, Version, Whoami,
};

command_enum! {
    (Init, Init),
    (Login, Login),
    (Register, Register),
    (Logout, Logout),
    (Whoami, Whoami),
    (Storage, Storage),
    (Folders, Folders),
    (Files, Files),
    (Upload, Upload),
    (Send, SendFile),
    (Search, Search),
    (Transactions, Transactions),
    (Version, Version),
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    // Logging comes up before the session file is read so load problems show
    let state = AppState::load(args.config_path.clone()).ok();
    let log_level = op::resolve_log_level(args.log_level, state.as_ref().map(|s| &s.config));
    let guard = logging::init_logging(&log_level);

    let ctx = match op::OpContext::open(args.remote, args.config_path, state) {
        Ok(ctx) => ctx,
        Err(e) => {
            eprintln!("Error: {}", e);
            drop(guard);
            std::process::exit(1);
        }
    };

    let code = match args.command.execute(&ctx).await {
        Ok(output) => {
            let output = output.to_string();
            if !output.is_empty() {
                println!("{}", output);
            }
            0
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    };

    // Exiting skips destructors; flush buffered log lines first
    drop(guard);
    std::process::exit(code);
}
