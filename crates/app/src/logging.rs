use std::str::FromStr;

use tracing::level_filters::LevelFilter;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// Initialize logging to stderr, keeping stdout for command output.
/// Returns a guard that must be kept alive for the duration of the program.
pub fn init_logging(log_level: &str) -> WorkerGuard {
    let (stderr_writer, stderr_guard) = tracing_appender::non_blocking(std::io::stderr());

    let env_filter = EnvFilter::builder()
        .with_default_directive(default_directive(log_level).into())
        .from_env_lossy();

    let stderr_layer = tracing_subscriber::fmt::layer()
        .compact()
        .with_target(false)
        .with_writer(stderr_writer)
        .with_filter(env_filter);

    tracing_subscriber::registry().with(stderr_layer).init();

    register_panic_logger();
    crate::version::report_build_info();

    stderr_guard
}

fn default_directive(log_level: &str) -> LevelFilter {
    match LevelFilter::from_str(log_level.trim()) {
        Ok(level) => level,
        Err(_) => {
            eprintln!("Warning: unknown log level {:?}, using warn", log_level);
            LevelFilter::WARN
        }
    }
}

/// Registers a panic hook that logs panics using the `tracing` crate
fn register_panic_logger() {
    std::panic::set_hook(Box::new(|panic| match panic.location() {
        Some(loc) => {
            tracing::error!(
                message = %panic,
                panic.file = loc.file(),
                panic.line = loc.line(),
                panic.column = loc.column(),
            );
        }
        None => tracing::error!(message = %panic),
    }));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directive() {
        assert_eq!(default_directive("debug"), LevelFilter::DEBUG);
        assert_eq!(default_directive(" INFO "), LevelFilter::INFO);
        assert_eq!(default_directive("off"), LevelFilter::OFF);
        assert_eq!(default_directive("chatty"), LevelFilter::WARN);
    }
}
