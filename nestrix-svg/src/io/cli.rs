use std::path::PathBuf;

use clap::Parser;
use log::LevelFilter;

#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// SVG document containing the parts to pack
    #[arg(short, long, value_name = "FILE")]
    pub input_file: PathBuf,
    /// SVG sheet documents, in packing order; contained shapes are forbidden regions
    #[arg(short, long, value_name = "FILE", num_args = 1.., required = true)]
    pub sheet_files: Vec<PathBuf>,
    /// JSON configuration file (defaults are used when omitted)
    #[arg(short, long, value_name = "FILE")]
    pub config_file: Option<PathBuf>,
    /// Folder the per-sheet result SVGs are written to
    #[arg(short = 'o', long, value_name = "FOLDER")]
    pub solution_folder: PathBuf,
    /// Log level filter
    #[arg(short, long, value_name = "LEVEL", default_value = "info")]
    pub log_level: LevelFilter,
}
