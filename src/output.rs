use std::collections::HashMap;
use std::fs::File;
use std::io::{BufWriter, Write};

use anyhow::{bail, Context};
use log::debug;

use crate::aggregator::AggregateReport;
use crate::args::{ExportMethodType, OutputConfig};

/// Serializes the finished count tables: tag counts as two-column rows,
/// port/protocol counts as three-column rows.
///
/// Writes to the export files in CSV mode and to stdout in print mode.
pub struct ReportWriter {
    write_header: bool,
    tag_writer: BufWriter<Box<dyn Write + Send>>,
    port_protocol_writer: BufWriter<Box<dyn Write + Send>>,
}

/// Rejects an export configuration that would fail after processing, so
/// the error surfaces before a pass over the log is spent.
pub fn validate_config(config: &OutputConfig) -> anyhow::Result<()> {
    if config.output == Some(ExportMethodType::Csv) {
        if config.tag_export_path.is_none() {
            bail!("csv output requires a tag export path");
        }
        if config.port_protocol_export_path.is_none() {
            bail!("csv output requires a port-protocol export path");
        }
    }
    Ok(())
}

impl ReportWriter {
    /// Builds the writer pair for the configured export method.
    pub fn new(config: &OutputConfig) -> anyhow::Result<ReportWriter> {
        let method = config
            .output
            .clone()
            .unwrap_or(ExportMethodType::Print);
        let (tag_writer, port_protocol_writer): (Box<dyn Write + Send>, Box<dyn Write + Send>) =
            match method {
                ExportMethodType::Csv => {
                    let tag_path = config
                        .tag_export_path
                        .as_deref()
                        .context("csv output requires a tag export path")?;
                    let port_protocol_path = config
                        .port_protocol_export_path
                        .as_deref()
                        .context("csv output requires a port-protocol export path")?;
                    let tag_file = File::create(tag_path)
                        .with_context(|| format!("failed to create {}", tag_path))?;
                    let port_protocol_file = File::create(port_protocol_path)
                        .with_context(|| format!("failed to create {}", port_protocol_path))?;
                    (Box::new(tag_file), Box::new(port_protocol_file))
                }
                ExportMethodType::Print => (
                    Box::new(std::io::stdout()),
                    Box::new(std::io::stdout()),
                ),
            };

        Ok(ReportWriter {
            write_header: config.header,
            tag_writer: BufWriter::new(tag_writer),
            port_protocol_writer: BufWriter::new(port_protocol_writer),
        })
    }

    /// Writes both reports and flushes the writers.
    pub fn write_report(&mut self, report: &AggregateReport) -> std::io::Result<()> {
        debug!("Writing tag counts");
        if self.write_header {
            writeln!(self.tag_writer, "Tag,Count")?;
        }
        for row in tag_count_rows(&report.tag_counts) {
            writeln!(self.tag_writer, "{}", row)?;
        }
        self.tag_writer.flush()?;

        debug!("Writing port-protocol counts");
        if self.write_header {
            writeln!(self.port_protocol_writer, "dstport,protocol,count")?;
        }
        for row in port_protocol_rows(&report.port_protocol_counts) {
            writeln!(self.port_protocol_writer, "{}", row)?;
        }
        self.port_protocol_writer.flush()
    }
}

/// Tag rows in lexicographic tag order, so repeated runs over the same
/// input serialize identically.
pub fn tag_count_rows(counts: &HashMap<String, u64>) -> Vec<String> {
    let mut rows: Vec<_> = counts.iter().collect();
    rows.sort_by(|a, b| a.0.cmp(b.0));
    rows.into_iter()
        .map(|(tag, count)| format!("{},{}", tag, count))
        .collect()
}

/// Port/protocol rows ordered by port, then protocol name.
pub fn port_protocol_rows(counts: &HashMap<(u16, String), u64>) -> Vec<String> {
    let mut rows: Vec<_> = counts.iter().collect();
    rows.sort();
    rows.into_iter()
        .map(|((port, protocol), count)| format!("{},{},{}", port, protocol, count))
        .collect()
}
