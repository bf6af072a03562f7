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
//! Library for evaluating convergence and fairness experiments on dumbbell topologies from the
//! interval reports of iperf.

pub mod experiments;
pub mod iperf;
pub mod stats;
pub mod util;

pub mod prelude {
    pub use super::{
        experiments::{ExperimentDescription, ExperimentError, GroupSeries, MeasureSide},
        iperf::{BandwidthUnit, IperfData, IperfEntry, IperfError, IperfParser},
        stats::{fairness_index, RateSummary},
    };
}
