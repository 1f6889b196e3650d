//! CLI entry: load the config file, set up logging, dispatch the subcommand.

use anyhow::Result;
use std::path::PathBuf;

use crate::engine::arg_parser::{Cli, Commands};
use crate::engine::handlers::{handle_index, handle_query, handle_version};
use crate::utils::config::PackagePaths;
use crate::utils::dedup_toml::{DedupToml, apply_file_to_log, load_dedup_toml};
use crate::utils::logger::{LogSettings, setup_logging};

fn load_config(cli: &Cli) -> Option<DedupToml> {
    let path = cli
        .config
        .clone()
        .unwrap_or_else(|| PathBuf::from(PackagePaths::get().config_filename()));
    load_dedup_toml(&path)
}

fn log_settings(cli: &Cli, file: Option<&DedupToml>) -> LogSettings {
    let mut settings = LogSettings::default();
    if let Some(file) = file {
        apply_file_to_log(file, &mut settings);
    }
    if let Some(level) = cli.log_level {
        settings.level = level;
    }
    if let Some(stream) = cli.log_stream {
        settings.stream = stream;
    }
    if let Some(format) = cli.log_format {
        settings.format = format;
    }
    settings
}

pub fn handle_run(cli: &Cli) -> Result<()> {
    let file = load_config(cli);
    setup_logging(&log_settings(cli, file.as_ref()));
    if cli.config.is_some() && file.is_none() {
        log::warn!("config file could not be loaded; using defaults");
    }

    match &cli.command {
        Commands::Index(args) => handle_index(args, file.as_ref()),
        Commands::Query(args) => handle_query(args, file.as_ref()),
        Commands::Version(args) => handle_version(args),
    }
}
