use std::fmt;

/// Build metadata stamped in by `build.rs`.
#[derive(Debug, Clone, Copy)]
pub struct BuildInfo {
    pub version: &'static str,
    pub repo_version: &'static str,
    pub build_profile: &'static str,
    pub build_timestamp: &'static str,
    pub build_target: &'static str,
}

pub const fn build_info() -> BuildInfo {
    BuildInfo {
        version: env!("CARGO_PKG_VERSION"),
        repo_version: env!("REPO_VERSION"),
        build_profile: env!("BUILD_PROFILE"),
        build_timestamp: env!("BUILD_TIMESTAMP"),
        build_target: env!("BUILD_TARGET"),
    }
}

impl fmt::Display for BuildInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "fileflow {} ({}, {} build for {}, built {})",
            self.version,
            self.repo_version,
            self.build_profile,
            self.build_target,
            self.build_timestamp
        )
    }
}

/// Log what binary is running, once at startup.
pub fn report_build_info() {
    let build = build_info();

    tracing::debug!(
        version = build.version,
        repo_version = build.repo_version,
        build_profile = build.build_profile,
        build_target = build.build_target,
        "build info"
    );
}
