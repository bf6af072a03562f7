// DUMBBELL-EVAL: Convergence and Fairness Evaluation of Dumbbell Experiments from iperf Logs
// Copyright (C) 2024-2025 Roland Schmid <roschmi@ethz.ch> and Tibor Schneider <sctibor@ethz.ch>
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <http://www.gnu.org/licenses/>.
//! Interval reports of iperf, as parsed from the log of a single flow.
//!
//! An `IperfData` holds the entries of one log in the order in which iperf reported them. All
//! range queries take a Rust range over entry indices. Bounds outside of `0..size()` are clamped,
//! and a range whose start lies after its end selects nothing.

use std::ops::{Bound, Range, RangeBounds};

mod parser;
mod units;

pub use parser::IperfParser;
pub use units::{BandwidthUnit, BitRateUnit, ByteUnit};

#[derive(Debug, thiserror::Error)]
pub enum IperfError {
    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),
    /// A line after the header lacks the interval, transfer or bandwidth column.
    #[error("Malformed iperf record on line {line_no}: {line:?}")]
    MalformedRecord { line_no: usize, line: String },
    #[error("Cannot parse {0:?} as a number")]
    InvalidNumber(String),
    #[error("Unknown unit {0:?}")]
    InvalidUnit(String),
    #[error("Cannot average the bandwidth over an empty range of entries")]
    EmptyRange,
}

/// A single interval report.
#[derive(Debug, Clone, PartialEq)]
pub struct IperfEntry {
    start_time_str: String,
    start_time: f64,
    end_time_str: String,
    end_time: f64,
    transfer_bytes: u64,
    /// Bandwidth in Mbps.
    bandwidth: f64,
}

impl IperfEntry {
    /// Create a new entry. The times are given as text in seconds (e.g. `"0.5"`), the transfer in
    /// bytes and the bandwidth in Mbps.
    pub fn new(
        start_time: impl Into<String>,
        end_time: impl Into<String>,
        transfer_bytes: u64,
        bandwidth_mbps: f64,
    ) -> Result<Self, IperfError> {
        let start_time_str = start_time.into();
        let end_time_str = end_time.into();
        Ok(Self {
            start_time: parse_seconds(&start_time_str)?,
            start_time_str,
            end_time: parse_seconds(&end_time_str)?,
            end_time_str,
            transfer_bytes,
            bandwidth: bandwidth_mbps,
        })
    }

    /// Start of the interval, exactly as written in the log.
    pub fn start_time_str(&self) -> &str {
        &self.start_time_str
    }

    /// Start of the interval in seconds.
    pub fn start_time(&self) -> f64 {
        self.start_time
    }

    /// End of the interval, exactly as written in the log.
    pub fn end_time_str(&self) -> &str {
        &self.end_time_str
    }

    /// End of the interval in seconds.
    pub fn end_time(&self) -> f64 {
        self.end_time
    }

    pub fn transfer_bytes(&self) -> u64 {
        self.transfer_bytes
    }

    /// Bandwidth of the interval, converted to `unit`.
    pub fn bandwidth(&self, unit: BandwidthUnit) -> f64 {
        unit.convert(self.bandwidth)
    }
}

fn parse_seconds(text: &str) -> Result<f64, IperfError> {
    text.trim()
        .parse()
        .map_err(|_| IperfError::InvalidNumber(text.to_string()))
}

/// All interval reports of one iperf log, in temporal order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IperfData {
    entries: Vec<IperfEntry>,
}

impl IperfData {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, entry: IperfEntry) {
        self.entries.push(entry);
    }

    pub fn size(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[IperfEntry] {
        &self.entries
    }

    pub fn iter(&self) -> std::slice::Iter<'_, IperfEntry> {
        self.entries.iter()
    }

    /// Turn `range` into a valid index range of `self.entries`.
    fn clamp(&self, range: impl RangeBounds<usize>) -> Range<usize> {
        let len = self.entries.len();
        let begin = match range.start_bound() {
            Bound::Included(b) => *b,
            Bound::Excluded(b) => b.saturating_add(1),
            Bound::Unbounded => 0,
        }
        .min(len);
        let end = match range.end_bound() {
            Bound::Included(e) => e.saturating_add(1),
            Bound::Excluded(e) => *e,
            Bound::Unbounded => len,
        }
        .min(len);
        begin..end.max(begin)
    }

    fn slice(&self, range: impl RangeBounds<usize>) -> &[IperfEntry] {
        &self.entries[self.clamp(range)]
    }

    /// End times of the entries in `range` as written in the log.
    pub fn end_time_strs(&self, range: impl RangeBounds<usize>) -> Vec<&str> {
        self.slice(range).iter().map(IperfEntry::end_time_str).collect()
    }

    /// End times (in seconds) of the entries in `range`, shifted by `offset`.
    pub fn end_times(&self, range: impl RangeBounds<usize>, offset: f64) -> Vec<f64> {
        self.slice(range).iter().map(|e| e.end_time + offset).collect()
    }

    /// Start times (in seconds) of the entries in `range`, shifted by `offset`.
    pub fn start_times(&self, range: impl RangeBounds<usize>, offset: f64) -> Vec<f64> {
        self.slice(range).iter().map(|e| e.start_time + offset).collect()
    }

    pub fn transfer_bytes(&self, range: impl RangeBounds<usize>) -> Vec<u64> {
        self.slice(range).iter().map(IperfEntry::transfer_bytes).collect()
    }

    /// Bandwidth of the entries in `range`, converted to `unit`.
    pub fn bandwidth_values(&self, unit: BandwidthUnit, range: impl RangeBounds<usize>) -> Vec<f64> {
        self.slice(range).iter().map(|e| e.bandwidth(unit)).collect()
    }

    /// Mean bandwidth of the entries in `range`, converted to `unit`. The mean is taken over the
    /// stored Mbps values before converting.
    pub fn average_bandwidth(
        &self,
        unit: BandwidthUnit,
        range: impl RangeBounds<usize>,
    ) -> Result<f64, IperfError> {
        let entries = self.slice(range);
        if entries.is_empty() {
            return Err(IperfError::EmptyRange);
        }
        let sum: f64 = entries.iter().map(|e| e.bandwidth).sum();
        Ok(unit.convert(sum / entries.len() as f64))
    }
}

impl FromIterator<IperfEntry> for IperfData {
    fn from_iter<I: IntoIterator<Item = IperfEntry>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a IperfData {
    type Item = &'a IperfEntry;
    type IntoIter = std::slice::Iter<'a, IperfEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn entry(start: &str, end: &str, bytes: u64, mbps: f64) -> IperfEntry {
        IperfEntry::new(start, end, bytes, mbps).unwrap()
    }

    fn sample() -> IperfData {
        [
            entry("0.0", "1.0", 125000, 1.0),
            entry("1.0", "2.0", 250000, 2.0),
            entry("2.0", "3.0", 125000, 1.0),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn entry_accessors() {
        let e = entry("0.50", "1.0", 102400, 20.2);
        assert_eq!(e.start_time_str(), "0.50");
        assert_eq!(e.start_time(), 0.5);
        assert_eq!(e.end_time_str(), "1.0");
        assert_eq!(e.end_time(), 1.0);
        assert_eq!(e.transfer_bytes(), 102400);
        assert_eq!(e.bandwidth(BandwidthUnit::Mbps), 20.2);
        assert_eq!(e.bandwidth(BandwidthUnit::Kbps), 20200.0);
        assert_eq!(e.bandwidth(BandwidthUnit::Bps), 20200000.0);
        assert!((e.bandwidth(BandwidthUnit::Gbps) - 0.0202).abs() < 1e-12);
    }

    #[test]
    fn entry_invalid_time() {
        assert!(matches!(
            IperfEntry::new("zero", "1.0", 0, 0.0),
            Err(IperfError::InvalidNumber(t)) if t == "zero"
        ));
        assert!(IperfEntry::new("0.0", "", 0, 0.0).is_err());
    }

    #[test]
    fn full_range() {
        let data = sample();
        assert_eq!(data.size(), 3);
        assert_eq!(
            data.bandwidth_values(BandwidthUnit::Mbps, ..),
            vec![1.0, 2.0, 1.0]
        );
        assert_eq!(data.end_times(.., 0.0), vec![1.0, 2.0, 3.0]);
        assert_eq!(data.start_times(.., 10.0), vec![10.0, 11.0, 12.0]);
        assert_eq!(data.end_time_strs(..), vec!["1.0", "2.0", "3.0"]);
        assert_eq!(data.transfer_bytes(..), vec![125000, 250000, 125000]);
        let avg = data.average_bandwidth(BandwidthUnit::Mbps, ..).unwrap();
        assert!((avg - 4.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn sub_ranges_are_clamped() {
        let data = sample();
        assert_eq!(data.end_times(1.., 5.0), vec![7.0, 8.0]);
        assert_eq!(data.end_times(1..2, 0.0), vec![2.0]);
        assert_eq!(data.end_times(..=1, 0.0), vec![1.0, 2.0]);
        assert_eq!(data.end_times(0..100, 0.0), vec![1.0, 2.0, 3.0]);
        assert_eq!(data.end_times(7..9, 0.0), Vec::<f64>::new());
        #[allow(clippy::reversed_empty_ranges)]
        let reversed = 2..1;
        assert!(data.bandwidth_values(BandwidthUnit::Mbps, reversed).is_empty());
        assert_eq!(
            data.bandwidth_values(BandwidthUnit::Kbps, 1..),
            vec![2000.0, 1000.0]
        );
    }

    #[test]
    fn average_is_converted() {
        let data = sample();
        assert_eq!(
            data.average_bandwidth(BandwidthUnit::Kbps, 0..2).unwrap(),
            1500.0
        );
        assert_eq!(
            data.average_bandwidth(BandwidthUnit::Gbps, 1..2).unwrap(),
            0.002
        );
    }

    #[test]
    fn average_of_empty_range() {
        let data = sample();
        assert!(matches!(
            data.average_bandwidth(BandwidthUnit::Mbps, 3..),
            Err(IperfError::EmptyRange)
        ));
        assert!(matches!(
            IperfData::new().average_bandwidth(BandwidthUnit::Mbps, ..),
            Err(IperfError::EmptyRange)
        ));
    }

    #[test]
    fn empty_series() {
        let data = IperfData::new();
        assert_eq!(data.size(), 0);
        assert!(data.is_empty());
        assert!(data.end_times(.., 1.0).is_empty());
        assert!(data.bandwidth_values(BandwidthUnit::Mbps, 0..10).is_empty());
        assert_eq!(data.iter().count(), 0);
    }
}
