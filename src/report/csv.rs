//! CSV report output: one row per ranked artist

use crate::report::Report;
use std::io::{self, Write};

pub fn write<W: Write>(writer: &mut W, report: &Report) -> io::Result<()> {
    let mut wtr = ::csv::Writer::from_writer(writer);
    wtr.write_record(["rank", "artist_id", "artist", "image", "plays", "window"])?;

    for (i, a) in report.artists.iter().enumerate() {
        wtr.write_record([
            (i + 1).to_string().as_str(),
            a.entity_id.as_str(),
            a.entity_label.as_str(),
            a.entity_image.as_str(),
            a.count.to_string().as_str(),
            report.window.key(),
        ])?;
    }

    wtr.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::tests::{ranked, sample_report};

    #[test]
    fn test_csv_rows() {
        let mut buf = Vec::new();
        write(&mut buf, &sample_report()).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "rank,artist_id,artist,image,plays,window");
        assert_eq!(lines[1], "1,a,Radiohead,http://img/a.jpg,2,all");
        assert_eq!(lines[2], "2,b,Björk,http://img/b.jpg,1,all");
    }

    #[test]
    fn test_csv_quotes_commas() {
        let mut report = sample_report();
        report.artists = vec![ranked("c", "Crosby, Stills & Nash", 4)];
        let mut buf = Vec::new();
        write(&mut buf, &report).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains("\"Crosby, Stills & Nash\""));
    }
}
