use std::fs::{self, File};
use std::io::BufReader;

use anyhow::{Context, Result};
use clap::Parser as ClapParser;
use log::{info, warn};

use nestrix_svg::config::PackConfig;
use nestrix_svg::io::{self, cli::Cli};

fn main() -> Result<()> {
    let args = Cli::parse();
    io::init_logger(args.log_level)?;

    let config = match &args.config_file {
        None => {
            warn!("No config file provided, use --config-file to provide a custom config");
            warn!(
                "Falling back to default config:\n{}",
                serde_json::to_string(&PackConfig::default())?
            );
            PackConfig::default()
        }
        Some(config_file) => {
            let file = File::open(config_file).context("config file could not be opened")?;
            serde_json::from_reader(BufReader::new(file))
                .context("config file could not be parsed")?
        }
    };

    let shapes_doc = io::read_svg_file(&args.input_file)?;
    let sheet_docs: Vec<String> = args
        .sheet_files
        .iter()
        .map(|p| io::read_svg_file(p))
        .collect::<Result<_>>()?;
    let sheet_refs: Vec<&str> = sheet_docs.iter().map(String::as_str).collect();

    let output = nestrix_svg::pack(&sheet_refs, &shapes_doc, &config, None)?;

    fs::create_dir_all(&args.solution_folder).context("could not create solution folder")?;
    for (index, document) in &output.sheets {
        let path = args.solution_folder.join(format!("sheet_{index}.svg"));
        io::write_svg_file(document, &path)?;
    }

    info!(
        "{} part(s) placed, {} part(s) could not be placed",
        output.placed, output.failed
    );
    Ok(())
}
