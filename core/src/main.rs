use clap::Parser;
use dcmvol_core::cli::Cli;
use dcmvol_core::{ConvertConfig, Converter, TextReport};
use log::{error, info};
use std::process;

fn main() {
    let cli = Cli::parse();

    // Setup logging
    setup_logging(cli.verbose);

    let config = ConvertConfig::from(&cli);
    info!("Processing input: {}", config.input.display());

    let summary = match Converter::new(config).run() {
        Ok(summary) => summary,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };

    print!("{}", TextReport::new(&summary));

    if !summary.is_success() {
        error!("{} series failed", summary.failed.len());
        process::exit(1);
    }
}

fn setup_logging(verbose: bool) {
    let level = if verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    env_logger::Builder::from_default_env()
        .filter_level(level)
        .init();
}
