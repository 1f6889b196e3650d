//! Build information for the `version` command.

use serde::Serialize;
use std::fmt::Write as _;
use std::sync::OnceLock;

#[derive(Clone, Debug, Serialize)]
pub struct BuildInfo {
    pub name: &'static str,
    pub description: &'static str,
    pub version: &'static str,
    pub major: &'static str,
    pub minor: &'static str,
    pub patch: &'static str,
    pub license: &'static str,
    pub repository: &'static str,
    pub os: &'static str,
    pub arch: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub git_commit: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub build_time: Option<&'static str>,
}

static BUILD_INFO: OnceLock<BuildInfo> = OnceLock::new();

impl BuildInfo {
    /// Built once from Cargo metadata; commit and build time come from `DEDUP_GIT_COMMIT` and
    /// `DEDUP_BUILD_TIME` when set at compile time.
    pub fn current() -> &'static BuildInfo {
        BUILD_INFO.get_or_init(|| BuildInfo {
            name: env!("CARGO_PKG_NAME"),
            description: env!("CARGO_PKG_DESCRIPTION"),
            version: env!("CARGO_PKG_VERSION"),
            major: env!("CARGO_PKG_VERSION_MAJOR"),
            minor: env!("CARGO_PKG_VERSION_MINOR"),
            patch: env!("CARGO_PKG_VERSION_PATCH"),
            license: env!("CARGO_PKG_LICENSE"),
            repository: env!("CARGO_PKG_REPOSITORY"),
            os: std::env::consts::OS,
            arch: std::env::consts::ARCH,
            git_commit: option_env!("DEDUP_GIT_COMMIT"),
            build_time: option_env!("DEDUP_BUILD_TIME"),
        })
    }

    /// `dedup v0.1.0 (linux/x86_64)`
    pub fn short(&self) -> String {
        format!("{} v{} ({}/{})", self.name, self.version, self.os, self.arch)
    }

    pub fn verbose(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{}", self.short());
        let _ = writeln!(out, "  {}", self.description);
        let _ = writeln!(out, "  version:    {}.{}.{}", self.major, self.minor, self.patch);
        let _ = writeln!(out, "  license:    {}", self.license);
        if !self.repository.is_empty() {
            let _ = writeln!(out, "  repository: {}", self.repository);
        }
        if let Some(commit) = self.git_commit {
            let _ = writeln!(out, "  commit:     {}", commit);
        }
        if let Some(time) = self.build_time {
            let _ = writeln!(out, "  built:      {}", time);
        }
        out
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
