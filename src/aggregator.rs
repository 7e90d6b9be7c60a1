use std::collections::HashMap;
use std::io;

use anyhow::{bail, Context};
use log::{debug, info};

use crate::lookup::LookupTable;
use crate::protocol::protocol_name;
use crate::record::FlowRecord;

/// Tag recorded for records whose (port, protocol) pair has no lookup
/// entry. Report consumers key on this label.
pub const UNTAGGED: &str = "Untagged";

/// Finished aggregate counts for one processing run.
#[derive(Debug)]
pub struct AggregateReport {
    /// Occurrences per tag, including the untagged sentinel.
    pub tag_counts: HashMap<String, u64>,
    /// Occurrences per (destination port, protocol name) pair.
    pub port_protocol_counts: HashMap<(u16, String), u64>,
    /// Lines that decoded into a valid record.
    pub records_parsed: u64,
    /// Lines skipped as malformed.
    pub parse_errors: u64,
}

/// Derives the tag for one record: resolve the protocol number, then look
/// up (destination port, protocol name).
pub fn classify_record(record: &FlowRecord, table: &LookupTable) -> String {
    let protocol = protocol_name(record.protocol);
    match table.tag(record.dstport, &protocol) {
        Some(tag) => tag.to_string(),
        None => UNTAGGED.to_string(),
    }
}

/// Running state of one aggregation pass.
///
/// Owns the two count tables for the duration of the run; [`Aggregator::finish`]
/// hands them off as an [`AggregateReport`].
struct Aggregator<'a> {
    table: &'a LookupTable,
    tag_counts: HashMap<String, u64>,
    port_protocol_counts: HashMap<(u16, String), u64>,
    records_parsed: u64,
    parse_errors: u64,
}

impl<'a> Aggregator<'a> {
    fn new(table: &'a LookupTable) -> Self {
        Aggregator {
            table,
            tag_counts: HashMap::new(),
            port_protocol_counts: HashMap::new(),
            records_parsed: 0,
            parse_errors: 0,
        }
    }

    /// Folds one window of raw lines into the running counts, in input
    /// order. Blank lines are ignored; malformed lines are skipped and
    /// counted.
    fn process_chunk(&mut self, lines: &[String]) {
        for line in lines {
            if line.trim().is_empty() {
                continue;
            }
            let record = match FlowRecord::parse(line) {
                Ok(record) => record,
                Err(e) => {
                    debug!("Skipping malformed line: {:?}", e);
                    self.parse_errors += 1;
                    continue;
                }
            };

            let tag = classify_record(&record, self.table);
            let protocol = protocol_name(record.protocol);

            *self.tag_counts.entry(tag).or_insert(0) += 1;
            *self
                .port_protocol_counts
                .entry((record.dstport, protocol))
                .or_insert(0) += 1;
            self.records_parsed += 1;
        }
    }

    fn finish(self) -> AggregateReport {
        AggregateReport {
            tag_counts: self.tag_counts,
            port_protocol_counts: self.port_protocol_counts,
            records_parsed: self.records_parsed,
            parse_errors: self.parse_errors,
        }
    }
}

/// Runs the full pass: reads `lines` in windows of at most `chunk_size`
/// lines, tags every record, and returns the finished count tables.
///
/// The result is identical for every `chunk_size`; chunking only bounds
/// how many raw lines are resident at once. A read error aborts the run
/// and discards the partial counts.
pub fn process_lines<I>(
    lines: I,
    table: &LookupTable,
    chunk_size: usize,
) -> anyhow::Result<AggregateReport>
where
    I: IntoIterator<Item = io::Result<String>>,
{
    if chunk_size == 0 {
        bail!("chunk size must be at least 1");
    }

    let mut aggregator = Aggregator::new(table);
    let mut window: Vec<String> = Vec::new();
    let mut chunks = 0u64;

    for line in lines {
        let line = line.context("failed to read from the flow-log source")?;
        window.push(line);
        if window.len() >= chunk_size {
            aggregator.process_chunk(&window);
            window.clear();
            chunks += 1;
        }
    }
    if !window.is_empty() {
        aggregator.process_chunk(&window);
        chunks += 1;
    }

    let report = aggregator.finish();
    info!(
        "Processed {} records in {} chunks ({} malformed lines skipped)",
        report.records_parsed, chunks, report.parse_errors
    );
    Ok(report)
}
