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
//! Parser for the interval reports printed by iperf.
//!
//! The parser skips everything up to (and including) the first header line that names the
//! `Interval`, `Transfer` and `Bandwidth` columns. Every line after that must be an interval
//! report. Summary lines that iperf prints at the end of a run therefore fail the parse.

use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
};

use lazy_static::lazy_static;
use regex::{Captures, Regex};

use super::{BitRateUnit, ByteUnit, IperfData, IperfEntry, IperfError};

lazy_static! {
    static ref HEADER_RE: Regex = Regex::new(r"Interval\s+Transfer\s+Bandwidth").unwrap();
    static ref INTERVAL_RE: Regex =
        Regex::new(r"(?:^|[^\d.])(\d+(?:\.\d+)?)\s*-\s*(\d+(?:\.\d+)?)\s*sec").unwrap();
    static ref TRANSFER_RE: Regex =
        Regex::new(r"(?:^|[^\d.])(\d+(?:\.\d*)?)\s*([GMK]?)Bytes").unwrap();
    static ref BANDWIDTH_RE: Regex =
        Regex::new(r"(?:^|[^\d.])(\d+(?:\.\d*)?)\s*([GMK]?)bits/sec").unwrap();
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    SeekingHeader,
    ReadingRows,
}

/// Parses iperf logs into `IperfData`.
#[derive(Debug, Default, Clone, Copy)]
pub struct IperfParser;

impl IperfParser {
    pub fn new() -> Self {
        Self
    }

    /// Parse the iperf log stored at `path`.
    pub fn parse_file(&self, path: impl AsRef<Path>) -> Result<IperfData, IperfError> {
        log::trace!("Parsing iperf log {:?}", path.as_ref());
        let file = File::open(path.as_ref())?;
        self.parse_reader(BufReader::new(file))
    }

    pub fn parse_str(&self, log: &str) -> Result<IperfData, IperfError> {
        self.parse_reader(log.as_bytes())
    }

    /// Parse an iperf log from `reader`. Either all reports are returned, or the first error.
    pub fn parse_reader(&self, reader: impl BufRead) -> Result<IperfData, IperfError> {
        let mut data = IperfData::new();
        let mut state = State::SeekingHeader;

        for (i, line) in reader.lines().enumerate() {
            let line = line?;
            match state {
                State::SeekingHeader => {
                    if HEADER_RE.is_match(&line) {
                        state = State::ReadingRows;
                    }
                }
                State::ReadingRows => data.push(self.parse_record(i + 1, &line)?),
            }
        }

        if state == State::SeekingHeader {
            log::debug!("iperf log has no header line");
        }

        Ok(data)
    }

    /// Parse a single interval report. `line_no` is only used to describe errors.
    pub fn parse_record(&self, line_no: usize, line: &str) -> Result<IperfEntry, IperfError> {
        let malformed = || IperfError::MalformedRecord {
            line_no,
            line: line.to_string(),
        };

        let interval = INTERVAL_RE.captures(line).ok_or_else(malformed)?;
        let transfer = TRANSFER_RE.captures(line).ok_or_else(malformed)?;
        let bandwidth = BANDWIDTH_RE.captures(line).ok_or_else(malformed)?;

        let bytes = ByteUnit::from_prefix(&transfer[2])?.to_bytes(parse_number(&transfer)?)?;
        let mbps = BitRateUnit::from_prefix(&bandwidth[2])?.to_mbps(parse_number(&bandwidth)?)?;

        IperfEntry::new(&interval[1], &interval[2], bytes, mbps)
    }
}

/// Parse the first capture group as a number.
fn parse_number(caps: &Captures) -> Result<f64, IperfError> {
    let text = &caps[1];
    text.parse()
        .map_err(|_| IperfError::InvalidNumber(text.to_string()))
}
