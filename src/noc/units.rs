//! Unit-carrying quantities used for plane parameters: frequencies, sizes,
//! bandwidths and link latencies. Values are kept as exact integers (Hz, bytes,
//! bytes per second, picoseconds) and printed in the engine's unit syntax.

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

use super::error::ConfigurationError;

const PS_PER_SECOND: u128 = 1_000_000_000_000;

/// Split `"2.5GHz"` into `(2.5, "ghz")`.
fn split_quantity(value: &str) -> Option<(f64, String)> {
    let trimmed = value.trim();
    let split = trimmed
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(trimmed.len());
    let (number, unit) = trimmed.split_at(split);
    let number = number.parse::<f64>().ok()?;
    Some((number, unit.trim().to_ascii_lowercase()))
}

fn si_display(f: &mut fmt::Formatter<'_>, value: u64, unit: &str) -> fmt::Result {
    const PREFIXES: [(u64, &str); 3] = [(1_000_000_000, "G"), (1_000_000, "M"), (1_000, "k")];
    for (scale, prefix) in PREFIXES {
        if value != 0 && value % scale == 0 {
            return write!(f, "{}{prefix}{unit}", value / scale);
        }
    }
    write!(f, "{value}{unit}")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Deserialize)]
#[serde(try_from = "String")]
pub struct Frequency {
    hz: u64,
}

impl Frequency {
    pub fn from_hz(hz: u64) -> Self {
        Self { hz }
    }

    pub fn hz(&self) -> u64 {
        self.hz
    }
}

impl FromStr for Frequency {
    type Err = ConfigurationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let invalid = || ConfigurationError::invalid("frequency", "a positive value in Hz, kHz, MHz or GHz", value);
        let (number, unit) = split_quantity(value).ok_or_else(invalid)?;
        let scale = match unit.as_str() {
            "hz" => 1.0,
            "khz" => 1e3,
            "mhz" => 1e6,
            "ghz" => 1e9,
            _ => return Err(invalid()),
        };
        let hz = (number * scale).round();
        if hz < 1.0 {
            return Err(invalid());
        }
        Ok(Self { hz: hz as u64 })
    }
}

impl TryFrom<String> for Frequency {
    type Error = ConfigurationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        si_display(f, self.hz, "Hz")
    }
}

/// A size in bytes. Accepts SI (`KB`) and binary (`KiB`) prefixes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Deserialize)]
#[serde(try_from = "String")]
pub struct Bytes(u64);

impl Bytes {
    pub fn new(bytes: u64) -> Self {
        Self(bytes)
    }

    pub fn get(&self) -> u64 {
        self.0
    }

    /// `None` when the product does not fit in 64 bits.
    pub fn times(self, count: u64) -> Option<Self> {
        self.0.checked_mul(count).map(Self)
    }
}

impl FromStr for Bytes {
    type Err = ConfigurationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let invalid = || ConfigurationError::invalid("size", "a byte count such as 8B, 2KiB or 4GB", value);
        let (number, unit) = split_quantity(value).ok_or_else(invalid)?;
        let scale: f64 = match unit.as_str() {
            "b" => 1.0,
            "kb" => 1e3,
            "mb" => 1e6,
            "gb" => 1e9,
            "kib" => 1024.0,
            "mib" => 1024.0 * 1024.0,
            "gib" => 1024.0 * 1024.0 * 1024.0,
            _ => return Err(invalid()),
        };
        Ok(Self((number * scale).round() as u64))
    }
}

impl TryFrom<String> for Bytes {
    type Error = ConfigurationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for Bytes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}B", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Bandwidth {
    bytes_per_second: u64,
}

impl Bandwidth {
    /// One flit per cycle. `None` on overflow.
    pub fn of(frequency: Frequency, flit: Bytes) -> Option<Self> {
        let bytes_per_second = frequency.hz().checked_mul(flit.get())?;
        Some(Self { bytes_per_second })
    }

    pub fn bytes_per_second(&self) -> u64 {
        self.bytes_per_second
    }
}

impl fmt::Display for Bandwidth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        si_display(f, self.bytes_per_second, "B/s")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize)]
#[serde(try_from = "String")]
pub struct Latency {
    ps: u64,
}

impl Latency {
    pub fn from_ps(ps: u64) -> Self {
        Self { ps }
    }

    /// `cycles` clock periods at `frequency`, rounded down to whole picoseconds.
    /// `None` for a zero frequency or a latency past 64 bits of picoseconds.
    pub fn from_cycles(cycles: u32, frequency: Frequency) -> Option<Self> {
        let ps = (u128::from(cycles) * PS_PER_SECOND).checked_div(u128::from(frequency.hz()))?;
        Some(Self { ps: u64::try_from(ps).ok()? })
    }

    pub fn ps(&self) -> u64 {
        self.ps
    }
}

impl FromStr for Latency {
    type Err = ConfigurationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let invalid = || ConfigurationError::invalid("latency", "a duration in ps, ns, us or ms", value);
        let (number, unit) = split_quantity(value).ok_or_else(invalid)?;
        let scale = match unit.as_str() {
            "ps" => 1.0,
            "ns" => 1e3,
            "us" => 1e6,
            "ms" => 1e9,
            _ => return Err(invalid()),
        };
        Ok(Self {
            ps: (number * scale).round() as u64,
        })
    }
}

impl TryFrom<String> for Latency {
    type Error = ConfigurationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for Latency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}ps", self.ps)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_frequencies() {
        assert_eq!(2_000_000_000, "2GHz".parse::<Frequency>().unwrap().hz());
        assert_eq!(2_133_000_000, "2133MHz".parse::<Frequency>().unwrap().hz());
        assert_eq!(1_500_000_000, "1.5 GHz".parse::<Frequency>().unwrap().hz());
        assert!("2GB".parse::<Frequency>().is_err());
        assert!("0GHz".parse::<Frequency>().is_err());
        assert!("GHz".parse::<Frequency>().is_err());
    }

    #[test]
    fn parses_sizes_with_si_and_binary_prefixes() {
        assert_eq!(Bytes::new(36), "36B".parse().unwrap());
        assert_eq!(Bytes::new(2048), "2KiB".parse().unwrap());
        assert_eq!(Bytes::new(4_000_000_000), "4GB".parse().unwrap());
        assert!("12 bits".parse::<Bytes>().is_err());
    }

    #[test]
    fn derived_quantities_print_in_engine_units() {
        let freq: Frequency = "2GHz".parse().unwrap();
        assert_eq!("2GHz", freq.to_string());
        assert_eq!("72GB/s", Bandwidth::of(freq, Bytes::new(36)).unwrap().to_string());
        assert_eq!("16GB/s", Bandwidth::of(freq, Bytes::new(8)).unwrap().to_string());
        assert_eq!("500ps", Latency::from_cycles(1, freq).unwrap().to_string());
        assert_eq!("1500ps", Latency::from_cycles(3, freq).unwrap().to_string());
        assert_eq!("16B", Bytes::new(8).times(2).unwrap().to_string());
    }

    #[test]
    fn oversized_products_are_reported_not_wrapped() {
        let freq: Frequency = "20GHz".parse().unwrap();
        let flit: Bytes = "1GB".parse().unwrap();
        assert_eq!(None, Bandwidth::of(freq, flit));
        assert_eq!(None, Bytes::new(u64::MAX / 2).times(3));
        assert_eq!(None, Latency::from_cycles(u32::MAX, Frequency::from_hz(1)));
        assert_eq!(None, Latency::from_cycles(1, Frequency::from_hz(0)));
    }

    #[test]
    fn parses_latencies() {
        assert_eq!(Latency::from_ps(1000), "1ns".parse().unwrap());
        assert_eq!(Latency::from_ps(250), "250ps".parse().unwrap());
        assert!("3 cycles".parse::<Latency>().is_err());
    }
}
