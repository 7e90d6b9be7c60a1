mod aggregator;
mod args;
mod lookup;
mod output;
mod protocol;
mod record;
mod tests;

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::time::Instant;

use anyhow::{bail, Context};
use args::{Cli, Commands, Config, ConfigFile};
use clap::Parser;
use log::{error, info};

use crate::aggregator::process_lines;
use crate::lookup::LookupTable;
use crate::output::ReportWriter;

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    // If a config file is provided, load it
    let config = if let Some(config_path) = cli.config_file {
        match confy::load_path::<ConfigFile>(config_path) {
            Ok(cfg_file) => Config {
                process: cfg_file.process,
                output: cfg_file.output,
                command: cli.command,
            },
            Err(e) => {
                error!("Error loading configuration file: {:?}", e);
                std::process::exit(1);
            }
        }
    } else {
        Config {
            process: cli.process,
            output: cli.output,
            command: cli.command,
        }
    };

    if let Err(e) = run_with_config(config) {
        error!("Error: {:?}", e);
        std::process::exit(1);
    }
}

fn run_with_config(config: Config) -> anyhow::Result<()> {
    if config.process.chunk_size == 0 {
        bail!("chunk size must be at least 1");
    }
    let lookup_path = match &config.process.lookup_table {
        Some(path) => path,
        None => bail!("no lookup table provided (--lookup-table or config file)"),
    };
    output::validate_config(&config.output)?;

    info!("Loading lookup table...");
    let table = LookupTable::from_csv_path(lookup_path)?;

    info!("Processing flow logs in chunks...");
    let start = Instant::now();
    let report = match &config.command {
        Commands::File { path } => {
            let file = File::open(path)
                .with_context(|| format!("failed to open flow-log file {}", path))?;
            process_lines(
                BufReader::new(file).lines(),
                &table,
                config.process.chunk_size,
            )?
        }
        Commands::Stdin => {
            let stdin = io::stdin();
            process_lines(stdin.lock().lines(), &table, config.process.chunk_size)?
        }
    };
    let end = Instant::now();
    info!(
        "Duration: {:.4} seconds",
        end.duration_since(start).as_secs_f64()
    );

    let mut report_writer = ReportWriter::new(&config.output)?;
    report_writer
        .write_report(&report)
        .context("failed to write the count reports")?;

    info!(
        "Tagged {} records ({} tags, {} port-protocol pairs, {} malformed lines skipped)",
        report.records_parsed,
        report.tag_counts.len(),
        report.port_protocol_counts.len(),
        report.parse_errors
    );
    Ok(())
}
