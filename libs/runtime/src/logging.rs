use crate::config::{LoggingConfig, Section};
use std::{
    io::{IsTerminal, Write},
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};
use tracing::level_filters::LevelFilter;
use tracing::Level;
use tracing_subscriber::{
    filter::{FilterFn, Targets},
    fmt,
};

use file_rotate::{
    compression::Compression,
    suffix::AppendCount,
    ContentLimit, FileRotate,
};

fn parse_tracing_level(s: &str) -> Option<Level> {
    match s.to_ascii_lowercase().as_str() {
        "trace" => Some(Level::TRACE),
        "debug" => Some(Level::DEBUG),
        "info" => Some(Level::INFO),
        "warn" => Some(Level::WARN),
        "error" => Some(Level::ERROR),
        "off" | "none" => None,
        _ => Some(Level::INFO),
    }
}

/// Returns true if target == subsystem or target starts with "subsystem::"
fn matches_subsystem(target: &str, subsystem: &str) -> bool {
    target == subsystem
        || target
            .strip_prefix(subsystem)
            .is_some_and(|rest| rest.starts_with("::"))
}

type DefaultFilter = FilterFn<Box<dyn Fn(&tracing::Metadata<'_>) -> bool + Send + Sync + 'static>>;

/// Everything not claimed by an explicit subsystem section, up to `max_level`.
fn default_filter(explicit: &[String], max_level: Level) -> DefaultFilter {
    let explicit = explicit.to_vec();
    FilterFn::new(Box::new(move |meta: &tracing::Metadata<'_>| {
        !explicit.iter().any(|s| matches_subsystem(meta.target(), s)) && *meta.level() <= max_level
    }))
}

// -------- rotating file writer --------

#[derive(Clone)]
struct RotWriter(Arc<Mutex<FileRotate<AppendCount>>>);

impl<'a> fmt::MakeWriter<'a> for RotWriter {
    type Writer = RotWriter;
    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

impl Write for RotWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0
            .lock()
            .map_err(|_| std::io::Error::other("log writer poisoned"))?
            .write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.0
            .lock()
            .map_err(|_| std::io::Error::other("log writer poisoned"))?
            .flush()
    }
}

/// Resolve a log file path against `base_dir` (server.home_dir).
fn resolve_log_path(file: &str, base_dir: &Path) -> PathBuf {
    let p = Path::new(file);
    if p.is_absolute() {
        p.to_path_buf()
    } else {
        base_dir.join(p)
    }
}

/// Size-rotated writer keeping `max_backups` old files; creates parent directories.
fn create_rotating_writer_at_path(
    log_path: &Path,
    max_bytes: usize,
    max_backups: usize,
) -> std::io::Result<RotWriter> {
    if let Some(parent) = log_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let rot = FileRotate::new(
        log_path,
        AppendCount::new(max_backups),
        ContentLimit::BytesSurpassed(max_bytes),
        Compression::None,
        #[cfg(unix)]
        None,
    );

    Ok(RotWriter(Arc::new(Mutex::new(rot))))
}

fn file_writer_for(section: &Section, base_dir: &Path) -> Option<RotWriter> {
    if section.file.trim().is_empty() {
        return None;
    }
    let max_bytes = section.max_size_mb.unwrap_or(100) * 1024 * 1024;
    let log_path = resolve_log_path(&section.file, base_dir);

    match create_rotating_writer_at_path(
        &log_path,
        max_bytes as usize,
        section.max_backups.unwrap_or(3),
    ) {
        Ok(writer) => Some(writer),
        Err(e) => {
            eprintln!(
                "Failed to initialize log file '{}': {}",
                log_path.to_string_lossy(),
                e
            );
            None
        }
    }
}

// -------- public init --------

/// Initialize logging from a configuration.
/// - `cfg`: subsystem → section map; "default" covers every target without its own section
/// - `base_dir`: base directory used to resolve relative log file paths (server.home_dir)
///
/// Console output is human readable; file output is JSON lines.
pub fn init_logging_from_config(cfg: &LoggingConfig, base_dir: &Path) {
    use tracing_subscriber::{layer::SubscriberExt, prelude::*, Layer, Registry};

    // Bridge `log` → `tracing` (sqlx logs statements through `log`)
    let _ = tracing_log::LogTracer::init();

    if cfg.is_empty() {
        let _ = fmt()
            .with_target(true)
            .with_timer(fmt::time::UtcTime::rfc_3339())
            .try_init();
        return;
    }

    let explicit: Vec<(&String, &Section)> =
        cfg.iter().filter(|(k, _)| k.as_str() != "default").collect();
    let explicit_names: Vec<String> = explicit.iter().map(|(k, _)| (*k).clone()).collect();

    let mut console_targets = Targets::new().with_default(LevelFilter::OFF);
    let mut layers: Vec<Box<dyn Layer<Registry> + Send + Sync>> = Vec::new();
    let ansi = std::io::stdout().is_terminal();

    for (name, section) in &explicit {
        if let Some(level) = parse_tracing_level(&section.console_level) {
            console_targets = console_targets.with_target(name.as_str(), level);
        }
        let Some(writer) = file_writer_for(section, base_dir) else {
            continue;
        };
        if let Some(level) = parse_tracing_level(&section.file_level) {
            let own_target = Targets::new().with_target(name.as_str(), level);
            layers.push(
                fmt::layer()
                    .json()
                    .with_ansi(false)
                    .with_target(true)
                    .with_timer(fmt::time::UtcTime::rfc_3339())
                    .with_writer(writer)
                    .with_filter(own_target)
                    .boxed(),
            );
        }
    }

    layers.push(
        fmt::layer()
            .with_ansi(ansi)
            .with_target(true)
            .with_level(true)
            .with_timer(fmt::time::UtcTime::rfc_3339())
            .with_filter(console_targets)
            .boxed(),
    );

    if let Some(default_section) = cfg.get("default") {
        if let Some(level) = parse_tracing_level(&default_section.console_level) {
            layers.push(
                fmt::layer()
                    .with_ansi(ansi)
                    .with_target(true)
                    .with_level(true)
                    .with_timer(fmt::time::UtcTime::rfc_3339())
                    .with_filter(default_filter(&explicit_names, level))
                    .boxed(),
            );
        }
        if let (Some(writer), Some(level)) = (
            file_writer_for(default_section, base_dir),
            parse_tracing_level(&default_section.file_level),
        ) {
            layers.push(
                fmt::layer()
                    .json()
                    .with_ansi(false)
                    .with_target(true)
                    .with_timer(fmt::time::UtcTime::rfc_3339())
                    .with_writer(writer)
                    .with_filter(default_filter(&explicit_names, level))
                    .boxed(),
            );
        }
    }

    let _ = Registry::default().with(layers).try_init();
}
