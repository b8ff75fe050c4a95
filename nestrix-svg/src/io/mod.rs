use std::fs;
use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result};
use log::{LevelFilter, info};

pub mod cli;

/// Process start, used to timestamp log lines.
pub static EPOCH: std::sync::LazyLock<Instant> = std::sync::LazyLock::new(Instant::now);

pub fn read_svg_file(path: &Path) -> Result<String> {
    fs::read_to_string(path)
        .with_context(|| format!("could not read SVG file {}", path.display()))
}

pub fn write_svg_file(document: &str, path: &Path) -> Result<()> {
    fs::write(path, document)
        .with_context(|| format!("could not write SVG file {}", path.display()))?;
    info!("sheet SVG written to file://{}", path.display());
    Ok(())
}

pub fn init_logger(level_filter: LevelFilter) -> Result<()> {
    fern::Dispatch::new()
        // Perform allocation-free log formatting
        .format(|out, message, record| {
            let handle = std::thread::current();
            let thread_name = handle.name().unwrap_or("-");

            let duration = EPOCH.elapsed();
            let sec = duration.as_secs() % 60;
            let min = (duration.as_secs() / 60) % 60;
            let hours = (duration.as_secs() / 60) / 60;

            let prefix = format!(
                "[{}] [{:0>2}:{:0>2}:{:0>2}] <{}>",
                record.level(),
                hours,
                min,
                sec,
                thread_name,
            );

            out.finish(format_args!("{prefix:<27}{message}"))
        })
        // Add blanket level filter
        .level(level_filter)
        .chain(std::io::stdout())
        .apply()?;
    Ok(())
}
