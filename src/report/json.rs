//! JSON report output

use crate::report::Report;
use std::io::{self, Write};

pub fn write<W: Write>(writer: &mut W, report: &Report) -> io::Result<()> {
    serde_json::to_writer_pretty(&mut *writer, report)?;
    writeln!(writer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::tests::sample_report;

    #[test]
    fn test_json_shape() {
        let mut buf = Vec::new();
        write(&mut buf, &sample_report()).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&buf).unwrap();

        assert_eq!(value["window"], "all");
        assert_eq!(value["window_label"], "all time");
        assert_eq!(value["grid"], 3);
        assert_eq!(value["summary"]["total_listens"], 3);
        assert_eq!(value["artists"][0]["entity_label"], "Radiohead");
        assert_eq!(value["artists"][0]["count"], 2);
        assert_eq!(value["artists"].as_array().unwrap().len(), 2);
        // Layout is a rendering detail, not data
        assert!(value.get("layout").is_none());
    }
}
