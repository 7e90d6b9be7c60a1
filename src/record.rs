use std::net::IpAddr;

use chrono::{DateTime, Utc};

/// The only flow-log schema version this tool accepts.
pub const FLOW_LOG_VERSION: u8 = 2;

/// Number of positional fields in a version 2 flow-log line.
pub const FIELD_COUNT: usize = 16;

/// Reasons a single flow-log line could not be decoded.
///
/// A failed line is skipped and counted by the aggregator; it never aborts
/// a run.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordError {
    /// The line did not have exactly [`FIELD_COUNT`] fields.
    FieldCount(usize),
    /// The line declared a version other than [`FLOW_LOG_VERSION`].
    UnsupportedVersion(String),
    /// A positional field failed to parse.
    InvalidField { field: &'static str, value: String },
}

/// One decoded version 2 flow-log line.
///
/// Destination port and protocol number drive the tagging lookup; the
/// remaining fields are validated so that a malformed line is rejected as
/// a whole instead of yielding silently wrong values.
#[derive(Debug, Clone, PartialEq)]
pub struct FlowRecord {
    pub version: u8,
    pub account_id: String,
    pub interface_id: String,
    pub srcaddr: IpAddr,
    pub dstaddr: IpAddr,
    pub srcport: u16,
    /// The destination port, first half of the lookup key.
    pub dstport: u16,
    /// The IANA protocol number, second half of the lookup key.
    pub protocol: u8,
    pub packets: u64,
    pub bytes: u64,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub action: String,
    pub log_status: String,
    pub vpc_id: String,
    pub subnet_id: String,
}

fn parse_field<T: std::str::FromStr>(field: &'static str, value: &str) -> Result<T, RecordError> {
    value.parse().map_err(|_| RecordError::InvalidField {
        field,
        value: value.to_string(),
    })
}

fn parse_timestamp(field: &'static str, value: &str) -> Result<DateTime<Utc>, RecordError> {
    let secs: i64 = parse_field(field, value)?;
    DateTime::from_timestamp(secs, 0).ok_or_else(|| RecordError::InvalidField {
        field,
        value: value.to_string(),
    })
}

impl FlowRecord {
    /// Parses one whitespace-separated flow-log line.
    ///
    /// Runs of whitespace collapse, so lines padded with extra spaces
    /// still decode. The line must carry exactly [`FIELD_COUNT`] fields
    /// and declare version [`FLOW_LOG_VERSION`].
    pub fn parse(line: &str) -> Result<FlowRecord, RecordError> {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() != FIELD_COUNT {
            return Err(RecordError::FieldCount(fields.len()));
        }

        let version: u8 = parse_field("version", fields[0])?;
        if version != FLOW_LOG_VERSION {
            return Err(RecordError::UnsupportedVersion(fields[0].to_string()));
        }

        Ok(FlowRecord {
            version,
            account_id: fields[1].to_string(),
            interface_id: fields[2].to_string(),
            srcaddr: parse_field("srcaddr", fields[3])?,
            dstaddr: parse_field("dstaddr", fields[4])?,
            srcport: parse_field("srcport", fields[5])?,
            dstport: parse_field("dstport", fields[6])?,
            protocol: parse_field("protocol", fields[7])?,
            packets: parse_field("packets", fields[8])?,
            bytes: parse_field("bytes", fields[9])?,
            start: parse_timestamp("start", fields[10])?,
            end: parse_timestamp("end", fields[11])?,
            action: fields[12].to_string(),
            log_status: fields[13].to_string(),
            vpc_id: fields[14].to_string(),
            subnet_id: fields[15].to_string(),
        })
    }
}
