//! Best-time record: one integer of milliseconds in a plain text file.
//!
//! Persistence is best-effort and never blocks gameplay. A missing or
//! unparsable file reads as "no record"; a failed write is logged and the
//! update dropped.

use std::fs;
use std::path::Path;
use tracing::warn;

pub fn read_best(path: &Path) -> Option<u64> {
    let contents = fs::read_to_string(path).ok()?;
    contents.trim().parse().ok()
}

pub fn write_best(path: &Path, elapsed_ms: u64) {
    if let Err(err) = fs::write(path, format!("{elapsed_ms}\n")) {
        warn!(%err, path = %path.display(), "failed to persist best time");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn temp_record(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("sweeps-{}-{}", std::process::id(), name))
    }

    #[test]
    fn missing_file_reads_as_no_record() {
        assert_eq!(read_best(&temp_record("missing")), None);
    }

    #[test]
    fn corrupt_file_reads_as_no_record() {
        let path = temp_record("corrupt");
        fs::write(&path, "not a number\n").unwrap();
        assert_eq!(read_best(&path), None);
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn record_round_trips_with_trailing_newline() {
        let path = temp_record("roundtrip");
        write_best(&path, 83_250);
        assert_eq!(read_best(&path), Some(83_250));
        let _ = fs::remove_file(&path);
    }
}
