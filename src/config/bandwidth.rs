use std::fmt;
use std::str::FromStr;

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// `<number>[k|m|g][b|B][/s|ps]`, e.g. `2Mb/s`, `1MB/s`, `512k`, `250000`
    static ref BANDWIDTH_PATTERN: Regex =
        Regex::new(r"^\s*(\d+(?:\.\d+)?)\s*([kKmMgG]?)([bB]?)(?:/s|ps)?\s*$").unwrap();
}

/// An upload rate cap in bytes per second.
///
/// Human units are decimal (`k` = 1000). A lowercase `b` means bits and an
/// uppercase `B` (or no suffix) means bytes, so `2Mb/s` is 250 000 bytes/s and
/// `1MB/s` is 1 000 000 bytes/s.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bandwidth {
    bytes_per_sec: u64,
}

impl Bandwidth {
    pub fn from_bytes_per_sec(bytes_per_sec: u64) -> Option<Self> {
        (bytes_per_sec > 0).then_some(Self { bytes_per_sec })
    }

    pub fn bytes_per_sec(&self) -> u64 {
        self.bytes_per_sec
    }
}

impl FromStr for Bandwidth {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let caps = BANDWIDTH_PATTERN
            .captures(s)
            .ok_or_else(|| format!("'{}' is not a rate like 2Mb/s or 1MB/s", s))?;

        let value: f64 = caps[1]
            .parse()
            .map_err(|e| format!("invalid number in '{}': {}", s, e))?;

        let multiplier = match caps[2].to_ascii_lowercase().as_str() {
            "k" => 1_000.0,
            "m" => 1_000_000.0,
            "g" => 1_000_000_000.0,
            _ => 1.0,
        };

        let bits = &caps[3] == "b";
        let mut bytes_per_sec = value * multiplier;
        if bits {
            bytes_per_sec /= 8.0;
        }

        Bandwidth::from_bytes_per_sec(bytes_per_sec.floor() as u64)
            .ok_or_else(|| format!("'{}' must be at least one byte per second", s))
    }
}

impl fmt::Display for Bandwidth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bps = self.bytes_per_sec as f64;
        if bps >= 1_000_000_000.0 {
            write!(f, "{:.1} GB/s", bps / 1_000_000_000.0)
        } else if bps >= 1_000_000.0 {
            write!(f, "{:.1} MB/s", bps / 1_000_000.0)
        } else if bps >= 1_000.0 {
            write!(f, "{:.1} KB/s", bps / 1_000.0)
        } else {
            write!(f, "{} B/s", self.bytes_per_sec)
        }
    }
}
