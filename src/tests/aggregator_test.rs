#[cfg(test)]
mod tests {
    use std::io::{self, BufRead, Cursor};

    use crate::aggregator::{classify_record, process_lines, AggregateReport, UNTAGGED};
    use crate::lookup::LookupTable;
    use crate::record::FlowRecord;

    fn log_line(dstport: u16, protocol: u8) -> String {
        format!(
            "2 123456789012 eni-0a1b2c3d4e 10.0.1.10 10.0.2.20 49152 {} {} 10 840 1620140761 1620140821 ACCEPT OK vpc-049df61146c12f45f subnet-0aabdcb8b33b02a75",
            dstport, protocol
        )
    }

    fn web_table() -> LookupTable {
        LookupTable::from_rows(vec![
            ("443", "tcp", "sv_web"),
            ("23", "tcp", "sv_telnet"),
        ])
    }

    fn run(lines: &[String], table: &LookupTable, chunk_size: usize) -> AggregateReport {
        let source: Vec<io::Result<String>> = lines.iter().cloned().map(Ok).collect();
        process_lines(source, table, chunk_size).unwrap()
    }

    #[test]
    fn test_classify_record_matches_and_falls_back() {
        let table = web_table();

        let tagged = FlowRecord::parse(&log_line(443, 6)).unwrap();
        assert_eq!(classify_record(&tagged, &table), "sv_web");

        let untagged = FlowRecord::parse(&log_line(80, 6)).unwrap();
        assert_eq!(classify_record(&untagged, &table), UNTAGGED);
    }

    #[test]
    fn test_tag_and_port_protocol_counts() {
        let table = web_table();
        let mut lines = vec![log_line(443, 6); 3];
        lines.extend(vec![log_line(80, 6); 2]);

        let report = run(&lines, &table, 100);

        assert_eq!(report.tag_counts.len(), 2);
        assert_eq!(report.tag_counts["sv_web"], 3);
        assert_eq!(report.tag_counts[UNTAGGED], 2);

        assert_eq!(report.port_protocol_counts.len(), 2);
        assert_eq!(report.port_protocol_counts[&(443, "tcp".to_string())], 3);
        assert_eq!(report.port_protocol_counts[&(80, "tcp".to_string())], 2);

        assert_eq!(report.records_parsed, 5);
        assert_eq!(report.parse_errors, 0);
    }

    #[test]
    fn test_chunk_size_does_not_change_the_result() {
        let table = web_table();
        let mut lines = Vec::new();
        for i in 0u16..53 {
            lines.push(log_line(400 + (i % 5), (6 + i % 3) as u8));
        }
        lines.push("2 123456789012 eni-0a1b2c3d4e 10.0.1.10".to_string());
        lines.push(log_line(443, 6));

        let baseline = run(&lines, &table, lines.len());
        for chunk_size in [1, 7, 10_000, lines.len()] {
            let report = run(&lines, &table, chunk_size);
            assert_eq!(report.tag_counts, baseline.tag_counts);
            assert_eq!(report.port_protocol_counts, baseline.port_protocol_counts);
            assert_eq!(report.records_parsed, baseline.records_parsed);
            assert_eq!(report.parse_errors, baseline.parse_errors);
        }
    }

    #[test]
    fn test_counts_are_conserved() {
        let table = web_table();
        let lines: Vec<String> = (0..20)
            .map(|i| log_line(20 + i, if i % 2 == 0 { 6 } else { 17 }))
            .collect();

        let report = run(&lines, &table, 3);

        let tag_total: u64 = report.tag_counts.values().sum();
        let pair_total: u64 = report.port_protocol_counts.values().sum();
        assert_eq!(tag_total, report.records_parsed);
        assert_eq!(pair_total, report.records_parsed);
    }

    #[test]
    fn test_unrecognized_protocol_uses_fallback_name() {
        let table = web_table();
        let lines = vec![log_line(4789, 255)];

        let report = run(&lines, &table, 10);

        assert_eq!(report.tag_counts[UNTAGGED], 1);
        assert_eq!(report.port_protocol_counts[&(4789, "255".to_string())], 1);
    }

    #[test]
    fn test_malformed_lines_are_skipped_and_counted() {
        let table = web_table();
        let lines = vec![
            log_line(443, 6),
            // 10 fields instead of 16
            "2 123456789012 eni-0a1b2c3d4e 10.0.1.10 10.0.2.20 49152 443 6 10 840".to_string(),
            // version 3 declaration
            log_line(443, 6).replacen('2', "3", 1),
            log_line(23, 6),
        ];

        let report = run(&lines, &table, 2);

        assert_eq!(report.records_parsed, 2);
        assert_eq!(report.parse_errors, 2);
        assert_eq!(report.tag_counts["sv_web"], 1);
        assert_eq!(report.tag_counts["sv_telnet"], 1);
        assert!(!report.tag_counts.contains_key(UNTAGGED));
    }

    #[test]
    fn test_blank_lines_are_ignored() {
        let table = web_table();
        let lines = vec![
            log_line(443, 6),
            String::new(),
            "   ".to_string(),
            log_line(443, 6),
        ];

        let report = run(&lines, &table, 10);

        assert_eq!(report.records_parsed, 2);
        assert_eq!(report.parse_errors, 0);
    }

    #[test]
    fn test_empty_input_produces_empty_tables() {
        let table = web_table();

        let report = run(&[], &table, 10);

        assert!(report.tag_counts.is_empty());
        assert!(report.port_protocol_counts.is_empty());
        assert_eq!(report.records_parsed, 0);
        assert_eq!(report.parse_errors, 0);
    }

    #[test]
    fn test_zero_chunk_size_is_rejected() {
        let table = web_table();
        let source: Vec<io::Result<String>> = vec![Ok(log_line(443, 6))];

        assert!(process_lines(source, &table, 0).is_err());
    }

    #[test]
    fn test_read_error_aborts_the_run() {
        let table = web_table();
        let source: Vec<io::Result<String>> = vec![
            Ok(log_line(443, 6)),
            Err(io::Error::new(io::ErrorKind::UnexpectedEof, "truncated")),
            Ok(log_line(443, 6)),
        ];

        assert!(process_lines(source, &table, 10).is_err());
    }

    #[test]
    fn test_buffered_reader_source() {
        let table = web_table();
        let text = format!("{}\n{}\n", log_line(443, 6), log_line(80, 6));

        let reader = Cursor::new(text);
        let report = process_lines(reader.lines(), &table, 1).unwrap();

        assert_eq!(report.records_parsed, 2);
        assert_eq!(report.tag_counts["sv_web"], 1);
        assert_eq!(report.tag_counts[UNTAGGED], 1);
    }
}
