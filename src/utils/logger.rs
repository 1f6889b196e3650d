use clap::ValueEnum;
use colored::Colorize;
use env_logger::{Builder, Target};
use log::{Level, LevelFilter};
use serde::Deserialize;
use std::io::Write;

/// Verbosity for this crate's log output.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Off,
    Error,
    #[default]
    Warn,
    Info,
    Debug,
}

impl LogLevel {
    fn filter(self) -> LevelFilter {
        match self {
            LogLevel::Off => LevelFilter::Off,
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
        }
    }
}

/// Where log lines go.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogStream {
    #[default]
    Stderr,
    Stdout,
    /// `<executable>-<pid>.log` next to the executable.
    File,
    None,
}

/// Line layout.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LogSettings {
    pub level: LogLevel,
    pub stream: LogStream,
    pub format: LogFormat,
}

/// Log file path for [`LogStream::File`]: executable path without extension, plus pid.
fn log_file_path() -> Option<std::path::PathBuf> {
    let exe = std::env::current_exe().ok()?;
    let stem = exe.with_extension("");
    Some(std::path::PathBuf::from(format!(
        "{}-{}.log",
        stem.display(),
        std::process::id()
    )))
}

fn target_for(stream: LogStream) -> Target {
    match stream {
        LogStream::Stderr => Target::Stderr,
        LogStream::Stdout => Target::Stdout,
        LogStream::File => match log_file_path().and_then(|p| std::fs::File::create(p).ok()) {
            Some(file) => Target::Pipe(Box::new(file)),
            None => Target::Pipe(Box::new(std::io::sink())),
        },
        LogStream::None => Target::Pipe(Box::new(std::io::sink())),
    }
}

/// Install the process-wide logger. Later calls are ignored.
pub fn setup_logging(settings: &LogSettings) {
    let level = settings.level.filter();
    let deps_level = level.min(LevelFilter::Warn);
    if matches!(settings.stream, LogStream::File | LogStream::None) {
        colored::control::set_override(false);
    }
    let format = settings.format;

    let _ = Builder::from_default_env()
        .filter_level(deps_level) // Default: only warnings from dependencies
        .filter_module(env!("CARGO_PKG_NAME"), level) // Our crate: use requested level
        .target(target_for(settings.stream))
        .format(move |buf, record| {
            let name = env!("CARGO_PKG_NAME");
            if format == LogFormat::Json {
                let line = serde_json::json!({
                    "level": record.level().as_str(),
                    "target": record.target(),
                    "message": record.args().to_string(),
                });
                return writeln!(buf, "{}", line);
            }
            let line = match record.level() {
                Level::Error | Level::Warn => {
                    let level_str = match record.level() {
                        Level::Warn => "WARN".yellow(),
                        _ => "ERROR".red(),
                    };
                    let path = record.target().to_string().white();
                    format!("[{} {} {}] {}", name.cyan(), level_str, path, record.args())
                }
                _ => format!("[{}] {}", name.cyan(), record.args()),
            };
            writeln!(buf, "{}", line)
        })
        .try_init();
}
