#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use crate::args::{ExportMethodType, OutputConfig};
    use crate::output::{port_protocol_rows, tag_count_rows, validate_config};

    #[test]
    fn test_tag_rows_are_sorted_by_tag() {
        let mut counts = HashMap::new();
        counts.insert("sv_web".to_string(), 3);
        counts.insert("Untagged".to_string(), 2);
        counts.insert("sv_mail".to_string(), 7);

        assert_eq!(
            tag_count_rows(&counts),
            vec!["Untagged,2", "sv_mail,7", "sv_web,3"]
        );
    }

    #[test]
    fn test_port_protocol_rows_are_sorted_by_port_then_protocol() {
        let mut counts = HashMap::new();
        counts.insert((443, "udp".to_string()), 1);
        counts.insert((443, "tcp".to_string()), 3);
        counts.insert((80, "tcp".to_string()), 2);

        assert_eq!(
            port_protocol_rows(&counts),
            vec!["80,tcp,2", "443,tcp,3", "443,udp,1"]
        );
    }

    #[test]
    fn test_rows_for_empty_tables_are_empty() {
        assert!(tag_count_rows(&HashMap::new()).is_empty());
        assert!(port_protocol_rows(&HashMap::new()).is_empty());
    }

    #[test]
    fn test_csv_export_requires_both_paths() {
        let config = OutputConfig {
            output: Some(ExportMethodType::Csv),
            tag_export_path: Some("tag_counts.csv".to_string()),
            port_protocol_export_path: None,
            header: true,
        };
        assert!(validate_config(&config).is_err());

        let config = OutputConfig {
            output: Some(ExportMethodType::Print),
            tag_export_path: None,
            port_protocol_export_path: None,
            header: false,
        };
        assert!(validate_config(&config).is_ok());
    }
}
