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
//! Units used by iperf reports, and the conversions into the canonical units of an `IperfEntry`
//! (bytes for transfers, Mbps for bandwidth).

use std::str::FromStr;

use super::IperfError;

/// Unit in which bandwidth values can be read from an `IperfData`.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    strum::Display,
    strum::EnumIter,
    strum_macros::EnumString,
)]
pub enum BandwidthUnit {
    #[strum(serialize = "bps")]
    Bps,
    #[strum(serialize = "Kbps")]
    Kbps,
    #[default]
    #[strum(serialize = "Mbps")]
    Mbps,
    #[strum(serialize = "Gbps")]
    Gbps,
}

impl BandwidthUnit {
    /// Parse a unit name (`bps`, `Kbps`, `Mbps` or `Gbps`).
    pub fn from_name(name: impl AsRef<str>) -> Result<Self, IperfError> {
        let name = name.as_ref();
        Self::from_str(name).map_err(|_| IperfError::InvalidUnit(name.to_string()))
    }

    /// Convert a value given in Mbps into this unit.
    pub fn convert(self, mbps: f64) -> f64 {
        match self {
            Self::Bps => mbps * 1_000_000.0,
            Self::Kbps => mbps * 1_000.0,
            Self::Mbps => mbps,
            Self::Gbps => mbps / 1_000.0,
        }
    }
}

/// Binary-prefixed unit of a transfer column, e.g. `KBytes`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display, strum_macros::EnumString)]
pub enum ByteUnit {
    Bytes,
    KBytes,
    MBytes,
    GBytes,
}

impl ByteUnit {
    /// Unit for the prefix letter in front of `Bytes` (empty, `K`, `M` or `G`).
    pub fn from_prefix(prefix: &str) -> Result<Self, IperfError> {
        let name = format!("{prefix}Bytes");
        Self::from_str(&name).map_err(|_| IperfError::InvalidUnit(name))
    }

    pub fn factor(self) -> f64 {
        match self {
            Self::Bytes => 1.0,
            Self::KBytes => 1024.0,
            Self::MBytes => 1024.0 * 1024.0,
            Self::GBytes => 1024.0 * 1024.0 * 1024.0,
        }
    }

    /// Number of bytes, truncated towards zero. Fails if the result does not fit into a `u64`.
    pub fn to_bytes(self, value: f64) -> Result<u64, IperfError> {
        let bytes = value * self.factor();
        if !bytes.is_finite() || bytes < 0.0 || bytes >= u64::MAX as f64 {
            return Err(IperfError::InvalidNumber(format!("{value} {self}")));
        }
        Ok(bytes as u64)
    }
}

/// Decimal-prefixed unit of a bandwidth column, e.g. `Mbits/sec`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display, strum_macros::EnumString)]
pub enum BitRateUnit {
    #[strum(serialize = "bits/sec")]
    Bits,
    #[strum(serialize = "Kbits/sec")]
    Kbits,
    #[strum(serialize = "Mbits/sec")]
    Mbits,
    #[strum(serialize = "Gbits/sec")]
    Gbits,
}

impl BitRateUnit {
    /// Unit for the prefix letter in front of `bits/sec` (empty, `K`, `M` or `G`).
    pub fn from_prefix(prefix: &str) -> Result<Self, IperfError> {
        let name = format!("{prefix}bits/sec");
        Self::from_str(&name).map_err(|_| IperfError::InvalidUnit(name))
    }

    /// Bandwidth in Mbps. Fails if the value is not finite.
    pub fn to_mbps(self, value: f64) -> Result<f64, IperfError> {
        if !value.is_finite() {
            return Err(IperfError::InvalidNumber(format!("{value} {self}")));
        }
        Ok(match self {
            Self::Bits => value / 1_000.0 / 1_000.0,
            Self::Kbits => value / 1_000.0,
            Self::Mbits => value,
            Self::Gbits => value * 1_000.0,
        })
    }
}
