//! Human-readable formatting of memory sizes and durations, and kernel source
//! loading

use crate::{Error, Result};
use std::path::Path;

const KB: u64 = 1024;
const MB: u64 = 1024 * KB;
const GB: u64 = 1024 * MB;

/// Format an amount of memory given in bytes, e.g. `"1.50 MB"` or
/// `"12 byte"`.
pub fn mem_str(bytes: u64) -> String {
    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} byte", bytes)
    }
}

/// Format a duration given in milliseconds as minutes, seconds and
/// milliseconds, omitting leading zero units.
pub fn time_str(msec: f64) -> String {
    let min = (msec / 60_000.0).trunc();
    let sec = ((msec - min * 60_000.0) / 1000.0).trunc();
    let rest = msec - min * 60_000.0 - sec * 1000.0;

    if msec >= 60_000.0 {
        format!("{} min {} sec {:.1} msec", min, sec, rest)
    } else if msec >= 1000.0 {
        format!("{} sec {:.1} msec", sec, rest)
    } else {
        format!("{:.1} msec", rest)
    }
}

/// Read an OpenCL C source file into a string
pub fn read_source(path: impl AsRef<Path>) -> Result<String> {
    let path = path.as_ref();
    std::fs::read_to_string(path).map_err(|source| Error::SourceRead {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mem_str() {
        assert_eq!(mem_str(0), "0 byte");
        assert_eq!(mem_str(1023), "1023 byte");
        assert_eq!(mem_str(1024), "1.00 KB");
        assert_eq!(mem_str(5_000_000), "4.77 MB");
        assert_eq!(mem_str(3 * MB / 2), "1.50 MB");
        assert_eq!(mem_str(3 * GB), "3.00 GB");
    }

    #[test]
    fn test_time_str() {
        assert_eq!(time_str(0.0), "0.0 msec");
        assert_eq!(time_str(12.5), "12.5 msec");
        assert_eq!(time_str(999.0), "999.0 msec");
        assert_eq!(time_str(1000.0), "1 sec 0.0 msec");
        assert_eq!(time_str(2345.0), "2 sec 345.0 msec");
        assert_eq!(time_str(61_500.0), "1 min 1 sec 500.0 msec");
        assert_eq!(time_str(185_000.0), "3 min 5 sec 0.0 msec");
    }

    #[test]
    fn test_read_source() {
        let path = std::env::temp_dir().join(format!(
            "simple_ocl_read_source_{}.cl",
            std::process::id()
        ));
        std::fs::write(&path, "__kernel void k() {}\n").unwrap();
        assert_eq!(read_source(&path).unwrap(), "__kernel void k() {}\n");
        std::fs::remove_file(&path).unwrap();

        match read_source(&path) {
            Err(Error::SourceRead { path: p, .. }) => assert_eq!(p, path),
            other => panic!("unexpected result {:?}", other),
        }
    }
}
