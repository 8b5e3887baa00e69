//! CSV output: one header line, then `YYYY.MM.DD HH:MM:SS,<in>,<out>` per sample.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::error::IfstatError;
use crate::system::network::RateSample;

pub const HEADER: &str = "date,input in bytes per second,output in bytes per second\n";

/// Local-time layout of the first column
pub const TIMESTAMP_FORMAT: &str = "%Y.%m.%d %H:%M:%S";

/// Render one data line, newline included.
pub fn format_record(sample: &RateSample) -> String {
    format!(
        "{},{},{}\n",
        sample.timestamp.format(TIMESTAMP_FORMAT),
        sample.in_rate,
        sample.out_rate
    )
}

/// Append-only record writer. Lines go straight to the underlying writer
/// in a single `write_all` each, so an abrupt exit never leaves a partial
/// line sitting in a user-space buffer.
pub struct RecordSink<W: Write> {
    out: W,
    rows: u64,
}

impl RecordSink<File> {
    /// Create (or truncate) the file at `path`.
    pub fn create(path: &Path) -> Result<Self, IfstatError> {
        let file = File::create(path).map_err(|e| IfstatError::write("open output file", e))?;
        Ok(Self::new(file))
    }

    /// Sync the file to disk and close it.
    pub fn finish(mut self) -> Result<u64, IfstatError> {
        self.flush()?;
        self.out
            .sync_all()
            .map_err(|e| IfstatError::write("sync output file", e))?;
        Ok(self.rows)
    }
}

impl<W: Write> RecordSink<W> {
    pub fn new(inner: W) -> Self {
        Self {
            out: inner,
            rows: 0,
        }
    }

    pub fn write_header(&mut self) -> Result<(), IfstatError> {
        self.write_line("write header", HEADER)
    }

    pub fn append(&mut self, sample: &RateSample) -> Result<(), IfstatError> {
        self.write_line("append record", &format_record(sample))?;
        self.rows += 1;
        Ok(())
    }

    /// Data rows written so far (the header is not counted)
    pub fn rows(&self) -> u64 {
        self.rows
    }

    pub fn flush(&mut self) -> Result<(), IfstatError> {
        self.out
            .flush()
            .map_err(|e| IfstatError::write("flush output file", e))
    }

    #[cfg(test)]
    pub(crate) fn into_inner(self) -> W {
        self.out
    }

    fn write_line(&mut self, operation: &'static str, line: &str) -> Result<(), IfstatError> {
        self.out
            .write_all(line.as_bytes())
            .map_err(|e| IfstatError::write(operation, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Local, NaiveDate, TimeZone};
    use std::io;

    fn local(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> DateTime<Local> {
        let naive = NaiveDate::from_ymd_opt(y, mo, d)
            .unwrap()
            .and_hms_opt(h, mi, s)
            .unwrap();
        Local.from_local_datetime(&naive).earliest().unwrap()
    }

    fn sample(in_rate: u64, out_rate: u64) -> RateSample {
        RateSample {
            timestamp: local(2024, 3, 7, 9, 5, 1),
            in_rate,
            out_rate,
        }
    }

    /// Split a data line back into its three fields
    fn parse_record(line: &str) -> Option<(DateTime<Local>, u64, u64)> {
        let mut fields = line.strip_suffix('\n')?.split(',');
        let ts = chrono::NaiveDateTime::parse_from_str(fields.next()?, TIMESTAMP_FORMAT).ok()?;
        let in_rate = fields.next()?.parse().ok()?;
        let out_rate = fields.next()?.parse().ok()?;
        if fields.next().is_some() {
            return None;
        }
        Some((Local.from_local_datetime(&ts).earliest()?, in_rate, out_rate))
    }

    #[test]
    fn test_format_record() {
        assert_eq!(format_record(&sample(100, 300)), "2024.03.07 09:05:01,100,300\n");
    }

    #[test]
    fn test_format_record_parses_back() {
        let s = sample(18_446_744_073, 0);
        let line = format_record(&s);
        assert_eq!(parse_record(&line), Some((s.timestamp, s.in_rate, s.out_rate)));
    }

    #[test]
    fn test_header_then_rows() {
        let mut sink = RecordSink::new(Vec::new());
        sink.write_header().unwrap();
        sink.append(&sample(1, 2)).unwrap();
        sink.append(&sample(3, 4)).unwrap();
        assert_eq!(sink.rows(), 2);

        let text = String::from_utf8(sink.into_inner()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(format!("{}\n", lines[0]), HEADER);
        assert_eq!(lines[1], "2024.03.07 09:05:01,1,2");
        assert_eq!(lines[2], "2024.03.07 09:05:01,3,4");
    }

    #[test]
    fn test_each_line_reaches_writer_immediately() {
        let mut sink = RecordSink::new(Vec::new());
        sink.write_header().unwrap();
        assert_eq!(sink.out, HEADER.as_bytes());

        sink.append(&sample(5, 6)).unwrap();
        let expected = format!("{HEADER}2024.03.07 09:05:01,5,6\n");
        assert_eq!(sink.out, expected.as_bytes());
    }

    struct FailingWriter;

    impl Write for FailingWriter {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::other("no space left on device"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_write_failure_is_reported() {
        let mut sink = RecordSink::new(FailingWriter);
        match sink.append(&sample(1, 1)) {
            Err(IfstatError::Write { operation, .. }) => assert_eq!(operation, "append record"),
            other => panic!("expected write error, got {other:?}"),
        }
        assert_eq!(sink.rows(), 0);
    }

    #[test]
    fn test_create_truncates_and_finish_syncs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        std::fs::write(&path, "stale contents from an earlier run\n").unwrap();

        let mut sink = RecordSink::create(&path).unwrap();
        sink.write_header().unwrap();
        sink.append(&sample(7, 8)).unwrap();
        assert_eq!(sink.finish().unwrap(), 1);

        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text, format!("{HEADER}2024.03.07 09:05:01,7,8\n"));
    }

    #[test]
    fn test_create_in_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("out.csv");
        assert!(matches!(
            RecordSink::create(&path),
            Err(IfstatError::Write { operation: "open output file", .. })
        ));
    }
}
