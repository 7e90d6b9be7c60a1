use clap::{Args, Parser, Subcommand};
use serde::{Deserialize, Serialize};

#[derive(Debug, Parser)]
#[clap(author, version, about)]
pub struct Cli {
    #[clap(subcommand)]
    pub command: Commands,

    /// Load processing and output options from a TOML config file
    #[clap(long)]
    pub config_file: Option<String>,

    /// Options controlling the tagging pass
    #[clap(flatten)]
    pub process: ProcessConfig,

    /// Output method
    #[clap(flatten)]
    pub output: OutputConfig,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Commands {
    /// Tag and aggregate a flow-log file
    File {
        /// The relative path to the flow-log file
        path: String,
    },

    /// Tag and aggregate flow-log lines read from standard input
    Stdin,
}

#[derive(Args, Debug, Clone, Serialize, Deserialize)]
pub struct ProcessConfig {
    /// Path to the dstport,protocol,tag lookup table CSV
    #[clap(short, long)]
    pub lookup_table: Option<String>,

    /// The maximum number of raw lines held in memory at once
    #[clap(long, default_value_t = 100_000)]
    pub chunk_size: usize,
}

#[derive(Args, Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Output method
    #[clap(short, long, value_enum)]
    pub output: Option<ExportMethodType>,

    /// File path for the tag counts report (used if method is Csv)
    #[clap(long, required_if_eq("output", "csv"))]
    pub tag_export_path: Option<String>,

    /// File path for the port-protocol counts report (used if method is Csv)
    #[clap(long, required_if_eq("output", "csv"))]
    pub port_protocol_export_path: Option<String>,

    /// Whether to write a header row in each report
    #[clap(long, action = clap::ArgAction::SetTrue)]
    pub header: bool,
}

#[derive(clap::ValueEnum, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum ExportMethodType {
    /// The reports will be printed to the console
    Print,

    /// The reports will be written to CSV files
    Csv,
}

/// Fully resolved run configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub process: ProcessConfig,
    pub output: OutputConfig,
    pub command: Commands,
}

/// On-disk shape of a config file: the CLI options minus the command.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ConfigFile {
    pub process: ProcessConfig,
    pub output: OutputConfig,
}

impl Default for ConfigFile {
    fn default() -> Self {
        ConfigFile {
            process: ProcessConfig {
                lookup_table: None,
                chunk_size: 100_000,
            },
            output: OutputConfig {
                output: Some(ExportMethodType::Print),
                tag_export_path: None,
                port_protocol_export_path: None,
                header: false,
            },
        }
    }
}
