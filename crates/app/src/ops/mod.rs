pub mod auth;
pub mod files;
pub mod folders;
pub mod init;
pub mod search;
pub mod send;
pub mod storage;
pub mod transactions;
pub mod upload;
pub mod version;

pub use auth::{Login, Logout, Register, Whoami};
pub use files::Files;
pub use folders::Folders;
pub use init::Init;
pub use search::Search;
pub use send::SendFile;
pub use storage::Storage;
pub use transactions::Transactions;
pub use upload::Upload;
pub use version::Version;

use chrono::{DateTime, Utc};

/// Render a byte count the way people read file sizes.
pub fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["KB", "MB", "GB", "TB"];

    if bytes < 1024 {
        return format!("{} B", bytes);
    }

    let mut value = bytes as f64 / 1024.0;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{:.1} {}", value, UNITS[unit])
}

pub fn format_time(time: &DateTime<Utc>) -> String {
    time.format("%Y-%m-%d %H:%M").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(0), "0 B");
        assert_eq!(format_size(1023), "1023 B");
        assert_eq!(format_size(1536), "1.5 KB");
        assert_eq!(format_size(100 * 1024 * 1024), "100.0 MB");
        assert_eq!(format_size(3 * 1024 * 1024 * 1024), "3.0 GB");
    }
}
