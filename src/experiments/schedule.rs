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
//! Time schedule of the flows in a convergence experiment.
//!
//! Flows join the dumbbell in groups of `group_flows`, one group every `interval` seconds, and
//! leave again in reverse order. Group `1` starts first and stays longest. All groups are active
//! at the same time for `interval` seconds, centered in the run.

use std::ops::Range;

use serde::Serialize;

/// Timing of a single flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlowSchedule {
    pub flow_id: usize,
    /// 1-based index of the group the flow belongs to.
    pub group_id: usize,
    /// Seconds between the start of the first group and the start of this flow.
    pub offset: usize,
    /// Seconds during which the flow is active.
    pub lasting_time: usize,
    /// Number of interval reports covering `lasting_time`.
    pub samples: usize,
    /// Reports during which all groups are active.
    pub window: Range<usize>,
}

impl FlowSchedule {
    /// Compute the schedule of `flow_id`. Returns `None` if the flow does not belong to any of
    /// the `group_num` groups.
    pub fn new(
        flow_id: usize,
        group_flows: usize,
        group_num: usize,
        interval: usize,
        samples_per_sec: usize,
    ) -> Option<Self> {
        if group_flows == 0 {
            return None;
        }
        let group_id = (flow_id + group_flows - 1) / group_flows;
        if group_id == 0 || group_id > group_num {
            return None;
        }

        let offset = (group_id - 1) * interval;
        let lasting_time = ((group_num - 1) * 2 + 1 - (group_id - 1) * 2) * interval;
        let left = samples_per_sec * (group_num - group_id) * interval;

        Some(Self {
            flow_id,
            group_id,
            offset,
            lasting_time,
            samples: samples_per_sec * lasting_time + 1,
            window: left..left + samples_per_sec * interval + 1,
        })
    }

    /// Reports of the all-active window that lie within the lifetime of the flow.
    pub fn active_window(&self) -> Range<usize> {
        self.window.start..self.window.end.min(self.samples)
    }
}
