//! ASCII product headers of EUMETSAT native files.
//!
//! Both native formats handled here start with a human-readable header of
//! `KEY = value` (EPS main product header record) or `KEY : value` (MSG
//! native main product header) lines. Only the first few kilobytes of the
//! file are scanned; binary records that follow are ignored.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use eo_common::{parse_timestamp, SensingInterval};
use tracing::debug;

use crate::error::NativeResult;

/// Default number of bytes scanned for header lines.
pub const DEFAULT_SCAN_BYTES: usize = 16 * 1024;

const MAX_KEY_LEN: usize = 64;

/// Key/value pairs found in a native file header.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NativeHeader {
    entries: Vec<(String, String)>,
}

impl NativeHeader {
    /// Scan at most `max_bytes` from the start of `path`.
    pub fn read<P: AsRef<Path>>(path: P, max_bytes: usize) -> NativeResult<Self> {
        let path = path.as_ref();
        let mut buf = Vec::with_capacity(max_bytes.min(DEFAULT_SCAN_BYTES));
        File::open(path)?
            .take(max_bytes as u64)
            .read_to_end(&mut buf)?;

        let header = Self::parse(&buf);
        debug!(path = %path.display(), entries = header.len(), "Scanned native header");
        Ok(header)
    }

    /// Parse header lines out of raw bytes.
    pub fn parse(bytes: &[u8]) -> Self {
        let entries = bytes
            .split(|&b| b == b'\n')
            .filter_map(|line| parse_line(&String::from_utf8_lossy(line)))
            .collect();
        Self { entries }
    }

    /// First value recorded for `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// `SENSING_START` / `SENSING_END`, skipping values that do not parse.
    pub fn sensing_interval(&self) -> SensingInterval {
        let parse = |key: &str| self.get(key).and_then(|v| parse_timestamp(v).ok());
        SensingInterval::new(parse("SENSING_START"), parse("SENSING_END"))
    }
}

fn parse_line(line: &str) -> Option<(String, String)> {
    let sep = line.find(|c| c == '=' || c == ':')?;
    let key = line[..sep].trim();
    let value = line[sep + 1..].trim();

    let valid_key = !key.is_empty()
        && key.len() <= MAX_KEY_LEN
        && key.starts_with(|c: char| c.is_ascii_alphabetic())
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == ' ');

    valid_key.then(|| (key.to_string(), value.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_parse_eps_mphr() {
        let bytes = b"PRODUCT_NAME                  = ASCA_SMO_02_M01_20230101084500Z_20230101102659Z_N_O_20230101101931Z\n\
SENSING_START                 = 20230101084500Z\n\
SENSING_END                   = 20230101102659Z\n";
        let header = NativeHeader::parse(bytes);
        assert_eq!(header.len(), 3);

        let interval = header.sensing_interval();
        assert_eq!(
            interval.start,
            Some(Utc.with_ymd_and_hms(2023, 1, 1, 8, 45, 0).unwrap())
        );
        assert_eq!(
            interval.end,
            Some(Utc.with_ymd_and_hms(2023, 1, 1, 10, 26, 59).unwrap())
        );
    }

    #[test]
    fn test_parse_msg_native_header() {
        let bytes = b"FormatName                  : NATIVE\n\
SENSING_START               : 20230101120010.885\n\
SENSING_END                 : 20230101121241.885\n";
        let header = NativeHeader::parse(bytes);
        assert_eq!(header.get("FormatName"), Some("NATIVE"));
        assert!(header.sensing_interval().start.is_some());
        assert!(header.sensing_interval().end.is_some());
    }

    #[test]
    fn test_binary_noise_ignored() {
        let mut bytes = vec![0x01, 0xff, 0x00, b'=', 0x7f, b'\n'];
        bytes.extend_from_slice(b"SENSING_START = not-a-time\n");
        let header = NativeHeader::parse(&bytes);
        assert_eq!(header.len(), 1);
        assert!(header.sensing_interval().is_unknown());
    }
}
