use std::collections::HashMap;
use std::path::Path;

use anyhow::Context;
use csv::{ReaderBuilder, Trim};
use log::{info, warn};

/// Immutable mapping from (destination port, protocol name) to a tag.
///
/// Protocol text is lowercased and trimmed when the table is built, so
/// lookups take the resolver's canonical names as-is without per-record
/// normalization.
pub struct LookupTable {
    entries: HashMap<(u16, String), String>,
    skipped_rows: u64,
}

impl LookupTable {
    /// Builds a table from `(port, protocol, tag)` rows.
    ///
    /// Malformed rows (unparsable port, empty tag) are skipped with a
    /// warning rather than failing the build; a duplicate key keeps the
    /// later row's tag.
    pub fn from_rows<I, S>(rows: I) -> LookupTable
    where
        I: IntoIterator<Item = (S, S, S)>,
        S: AsRef<str>,
    {
        let mut entries = HashMap::new();
        let mut skipped_rows = 0u64;

        for (row, (port, protocol, tag)) in rows.into_iter().enumerate() {
            let port_text = port.as_ref().trim();
            let protocol = protocol.as_ref().trim().to_lowercase();
            let tag = tag.as_ref().trim();

            let port: u16 = match port_text.parse() {
                Ok(port) => port,
                Err(_) => {
                    warn!(
                        "Skipping lookup row {}: invalid port {:?}",
                        row + 1,
                        port_text
                    );
                    skipped_rows += 1;
                    continue;
                }
            };
            if tag.is_empty() {
                warn!("Skipping lookup row {}: empty tag", row + 1);
                skipped_rows += 1;
                continue;
            }

            entries.insert((port, protocol), tag.to_string());
        }

        LookupTable {
            entries,
            skipped_rows,
        }
    }

    /// Loads a table from a `dstport,protocol,tag` CSV file.
    ///
    /// The reader is headerless; a header row fails port parsing and is
    /// skipped like any other malformed row, so files with or without a
    /// header both load. An unreadable file is fatal.
    pub fn from_csv_path<P: AsRef<Path>>(path: P) -> anyhow::Result<LookupTable> {
        let path = path.as_ref();
        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .trim(Trim::All)
            .from_path(path)
            .with_context(|| format!("failed to open lookup table {}", path.display()))?;

        let mut rows = Vec::new();
        let mut short_rows = 0u64;
        for record in reader.records() {
            let record = record
                .with_context(|| format!("failed to read lookup table {}", path.display()))?;
            if record.len() < 3 {
                warn!(
                    "Skipping lookup row: expected 3 columns, got {}",
                    record.len()
                );
                short_rows += 1;
                continue;
            }
            rows.push((
                record[0].to_string(),
                record[1].to_string(),
                record[2].to_string(),
            ));
        }

        let mut table = Self::from_rows(rows);
        table.skipped_rows += short_rows;
        info!(
            "Loaded lookup table {} with {} entries ({} rows skipped)",
            path.display(),
            table.len(),
            table.skipped_rows()
        );
        Ok(table)
    }

    /// Returns the tag for `(port, protocol)`, or `None` when untagged.
    pub fn tag(&self, port: u16, protocol: &str) -> Option<&str> {
        self.entries
            .get(&(port, protocol.to_string()))
            .map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of malformed rows dropped while building the table.
    pub fn skipped_rows(&self) -> u64 {
        self.skipped_rows
    }
}
