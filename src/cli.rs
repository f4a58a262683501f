// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// We use the "derive" API which lets us define the CLI structure using a
// Rust struct and attributes (the #[...] things). Flags with `env = ...`
// also read an environment variable when the flag is not given.
// =============================================================================

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use markval::context::{CheckerConfig, DEFAULT_MAX_CONNECTIONS, DEFAULT_TIMEOUT_SECS};
use markval::scan::DEFAULT_PATTERN;

#[derive(Parser, Debug)]
#[command(
    name = "markval",
    version,
    about = "Validate the links in a repository of markdown documents",
    long_about = "markval checks every link in the markdown files of a repository: \
                  local files and directories, #anchors in the same or another page, \
                  and remote http(s) URLs. It only reports broken links, it never changes files."
)]
pub struct Cli {
    /// Repository root directory
    ///
    /// Links starting with '/' are resolved from here, and no link may
    /// climb above it with '..'
    pub repo: PathBuf,

    /// Which files to check (glob)
    ///
    /// Matched against file names, or against the path relative to the
    /// repository root when it contains a '/'
    #[arg(default_value = DEFAULT_PATTERN)]
    pub pattern: String,

    /// Output problems as JSON instead of lines
    #[arg(long)]
    pub json: bool,

    /// Maximum remote requests in flight at once
    #[arg(long, env = "MARKVAL_MAX_CONNECTIONS", default_value_t = DEFAULT_MAX_CONNECTIONS)]
    pub max_connections: usize,

    /// Timeout for each remote request, in seconds
    #[arg(long, env = "MARKVAL_TIMEOUT_SECS", default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout: u64,

    /// Ignore HTTP_PROXY / HTTPS_PROXY for remote checks
    #[arg(long)]
    pub no_proxy: bool,

    /// How many files to validate concurrently
    #[arg(long, default_value_t = 8)]
    pub jobs: usize,

    /// Log what the checker is doing (to stderr)
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    pub fn checker_config(&self) -> CheckerConfig {
        CheckerConfig {
            max_connections: self.max_connections,
            timeout: Duration::from_secs(self.timeout),
            use_proxy: !self.no_proxy,
            ..CheckerConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cli = Cli::parse_from(["markval", "/repo"]);
        assert_eq!(cli.repo, PathBuf::from("/repo"));
        assert_eq!(cli.pattern, "*.md");
        assert!(!cli.json);
        assert_eq!(cli.jobs, 8);
    }

    #[test]
    fn test_checker_config_from_flags() {
        let cli = Cli::parse_from([
            "markval",
            "/repo",
            "docs/**/*.md",
            "--max-connections",
            "4",
            "--timeout",
            "5",
            "--no-proxy",
        ]);
        let config = cli.checker_config();
        assert_eq!(cli.pattern, "docs/**/*.md");
        assert_eq!(config.max_connections, 4);
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert!(!config.use_proxy);
    }
}
