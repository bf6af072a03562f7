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
//! Evaluation of convergence experiments on a dumbbell topology.
//!
//! An experiment directory contains one iperf log per flow and measurement side, named
//! `{project}_{side}_{id}` with flow ids counting up from `1`.

use std::{
    fs,
    path::{Path, PathBuf},
};

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use dumbbell_utils::csv_utils::write_csv;

use crate::{
    iperf::{BandwidthUnit, IperfError, IperfParser},
    stats::{fairness_index, increase_percent, sum_series, RateSummary, StatsError},
};

mod schedule;

pub use schedule::FlowSchedule;

#[derive(Debug, thiserror::Error)]
pub enum ExperimentError {
    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Json Error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("CSV Error: {0}")]
    Csv(#[from] csv::Error),
    #[error("Error in iperf log {path:?}: {source}")]
    Iperf { path: PathBuf, source: IperfError },
    #[error("Statistics Error: {0}")]
    Stats(#[from] StatsError),
    #[error("Invalid experiment parameter {name}: {value:?}")]
    InvalidParameter { name: String, value: String },
    #[error("No iperf logs for {project} ({side}) in {dir:?}")]
    NoFlows {
        dir: PathBuf,
        project: String,
        side: MeasureSide,
    },
    #[error("Flow {0} does not fit into the schedule of the experiment")]
    FlowOutOfSchedule(usize),
}

/// Host on which iperf measured a flow.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumIter,
    strum_macros::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum MeasureSide {
    #[default]
    Server,
    Client,
}

const fn _two_usize() -> usize {
    2
}

/// Parameters of a single experiment run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExperimentDescription {
    /// Directory containing the iperf logs.
    pub data_dir: PathBuf,
    /// Seconds between two groups of flows entering the network.
    pub interval: usize,
    /// Number of flows that enter the network together.
    pub group_flows: usize,
    /// Number of sender-receiver pairs, i.e., the total number of flows.
    pub dumbbell_pairs: usize,
    /// Number of iperf reports per second.
    #[serde(default = "_two_usize")]
    pub samples_per_sec: usize,
}

impl ExperimentDescription {
    /// Load a JSON list of experiment descriptions.
    pub fn load_all(path: impl AsRef<Path>) -> Result<Vec<Self>, ExperimentError> {
        let descriptions: Vec<Self> = serde_json::from_str(&fs::read_to_string(path)?)?;
        descriptions.iter().try_for_each(Self::validate)?;
        Ok(descriptions)
    }

    /// Load a single experiment description from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ExperimentError> {
        let description: Self = serde_json::from_str(&fs::read_to_string(path)?)?;
        description.validate()?;
        Ok(description)
    }

    /// Read the description from the files `exp_data_dir`, `flow_enter_interval`, `group_flows`
    /// and `dumbbell_pairs` in `dir`, each holding a single value on its first line. A relative
    /// data directory is resolved against `dir`.
    pub fn from_param_files(dir: impl AsRef<Path>) -> Result<Self, ExperimentError> {
        let dir = dir.as_ref();
        let read = |name: &str| -> Result<String, ExperimentError> {
            let content = fs::read_to_string(dir.join(name))?;
            Ok(content.lines().next().unwrap_or_default().trim().to_string())
        };
        let read_num = |name: &str| -> Result<usize, ExperimentError> {
            let value = read(name)?;
            value.parse().map_err(|_| ExperimentError::InvalidParameter {
                name: name.to_string(),
                value,
            })
        };

        let description = Self {
            data_dir: dir.join(read("exp_data_dir")?),
            interval: read_num("flow_enter_interval")?,
            group_flows: read_num("group_flows")?,
            dumbbell_pairs: read_num("dumbbell_pairs")?,
            samples_per_sec: _two_usize(),
        };
        description.validate()?;
        Ok(description)
    }

    fn validate(&self) -> Result<(), ExperimentError> {
        let invalid = |name: &str, value: usize| ExperimentError::InvalidParameter {
            name: name.to_string(),
            value: value.to_string(),
        };
        if self.group_flows == 0 {
            return Err(invalid("group_flows", self.group_flows));
        }
        if self.dumbbell_pairs < self.group_flows {
            return Err(invalid("dumbbell_pairs", self.dumbbell_pairs));
        }
        if self.samples_per_sec == 0 {
            return Err(invalid("samples_per_sec", self.samples_per_sec));
        }
        Ok(())
    }

    /// Number of flow groups.
    pub fn group_num(&self) -> usize {
        self.dumbbell_pairs / self.group_flows
    }

    pub fn schedule(&self, flow_id: usize) -> Result<FlowSchedule, ExperimentError> {
        FlowSchedule::new(
            flow_id,
            self.group_flows,
            self.group_num(),
            self.interval,
            self.samples_per_sec,
        )
        .ok_or(ExperimentError::FlowOutOfSchedule(flow_id))
    }

    /// Path of the iperf log of a flow.
    pub fn flow_file(&self, project: &str, side: MeasureSide, flow_id: usize) -> PathBuf {
        self.data_dir.join(format!("{project}_{side}_{flow_id}"))
    }

    /// All iperf logs of `project` measured at `side`, starting from flow `1` up to the first
    /// missing log.
    pub fn flow_logs(
        &self,
        project: &str,
        side: MeasureSide,
    ) -> Result<Vec<(usize, PathBuf)>, ExperimentError> {
        let logs = (1..)
            .map(|id| (id, self.flow_file(project, side, id)))
            .take_while(|(_, path)| path.exists())
            .collect_vec();
        if logs.is_empty() {
            return Err(ExperimentError::NoFlows {
                dir: self.data_dir.clone(),
                project: project.to_string(),
                side,
            });
        }
        log::debug!(
            "Found {} iperf logs for {project} ({side}) in {:?}",
            logs.len(),
            self.data_dir
        );
        Ok(logs)
    }

    /// Aggregated goodput of every complete group of flows over time. Each flow contributes a
    /// zero sample at its start and at its end.
    pub fn convergence_groups(
        &self,
        project: &str,
        side: MeasureSide,
    ) -> Result<Vec<GroupSeries>, ExperimentError> {
        let parser = IperfParser::new();
        let mut groups = Vec::new();
        let mut goodputs: Vec<Vec<f64>> = Vec::new();
        let mut times: Vec<f64> = Vec::new();

        for (id, path) in self.flow_logs(project, side)? {
            let schedule = self.schedule(id)?;
            let offset = schedule.offset as f64;
            let data = parse(&parser, &path)?;

            let flow_times = std::iter::once(offset)
                .chain(data.end_times(..schedule.samples, offset))
                .collect_vec();
            let mut goodput = std::iter::once(0.0)
                .chain(data.bandwidth_values(BandwidthUnit::Mbps, ..schedule.samples))
                .collect_vec();
            if let Some(last) = goodput.last_mut() {
                *last = 0.0;
            }
            goodputs.push(goodput);

            if flow_times.len() > times.len() {
                times = flow_times;
            }

            if id % self.group_flows == 0 {
                groups.push(GroupSeries {
                    first_flow: id + 1 - self.group_flows,
                    last_flow: id,
                    times: std::mem::take(&mut times),
                    goodput: sum_series(&goodputs),
                });
                goodputs.clear();
            }
        }

        if !goodputs.is_empty() {
            log::warn!(
                "Ignoring {} flows of {project} ({side}) that do not form a complete group",
                goodputs.len()
            );
        }

        Ok(groups)
    }

    /// Average goodput (in Mbps) of every flow while all flows are active.
    pub fn flow_rates(&self, project: &str, side: MeasureSide) -> Result<Vec<f64>, ExperimentError> {
        let parser = IperfParser::new();
        self.flow_logs(project, side)?
            .into_iter()
            .map(|(id, path)| {
                let schedule = self.schedule(id)?;
                let data = parse(&parser, &path)?;
                data.average_bandwidth(BandwidthUnit::Mbps, schedule.active_window())
                    .map_err(|source| ExperimentError::Iperf { path, source })
            })
            .collect()
    }

    /// Fairness index of each project. The increase is given for the second project relative to
    /// the first one.
    pub fn compare_fairness(
        &self,
        projects: &[String],
        side: MeasureSide,
    ) -> Result<FairnessComparison, ExperimentError> {
        let indices = projects
            .iter()
            .map(|project| {
                let rates = self.flow_rates(project, side)?;
                let fairness = fairness_index(&rates)?;
                log::debug!(
                    "{project} on {:?}: {:?}, fairness {fairness}",
                    self.data_dir,
                    RateSummary::from_rates(&rates)?
                );
                Ok((project.clone(), fairness))
            })
            .collect::<Result<Vec<_>, ExperimentError>>()?;

        let increase_percent = match indices.as_slice() {
            [(_, base), (_, new), ..] => Some(increase_percent(*base, *new)),
            _ => None,
        };

        Ok(FairnessComparison {
            dumbbell_pairs: self.dumbbell_pairs,
            indices,
            increase_percent,
        })
    }
}

fn parse(parser: &IperfParser, path: &Path) -> Result<crate::iperf::IperfData, ExperimentError> {
    log::info!("Loading: {path:?}");
    parser
        .parse_file(path)
        .map_err(|source| ExperimentError::Iperf {
            path: path.to_path_buf(),
            source,
        })
}

/// Summed goodput of a group of flows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupSeries {
    pub first_flow: usize,
    pub last_flow: usize,
    /// Time axis in seconds since the start of the first group.
    pub times: Vec<f64>,
    /// Aggregated goodput in Mbps. May be longer or shorter than `times`.
    pub goodput: Vec<f64>,
}

impl GroupSeries {
    pub fn label(&self) -> String {
        if self.first_flow == self.last_flow {
            format!("flow-{}", self.last_flow)
        } else {
            format!("flow {}-{}", self.first_flow, self.last_flow)
        }
    }

    /// `(time, goodput)` pairs, cut to the shorter of both lists.
    pub fn points(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.times.iter().copied().zip(self.goodput.iter().copied())
    }

    /// Write the points to `{dir}/{project}-flow{first}-{last}-goodput.csv`.
    pub fn export_csv(
        &self,
        dir: impl AsRef<Path>,
        project: &str,
        delimiter: u8,
    ) -> Result<PathBuf, ExperimentError> {
        let path = dir.as_ref().join(format!(
            "{project}-flow{}-{}-goodput.csv",
            self.first_flow, self.last_flow
        ));
        write_csv(
            &path,
            &["Time(s)", "Goodput(Mbps)"],
            self.points().map(|(t, g)| [t, g]),
            false,
            delimiter,
        )?;
        Ok(path)
    }
}

/// Fairness of several projects on the same experiment.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FairnessComparison {
    pub dumbbell_pairs: usize,
    pub indices: Vec<(String, f64)>,
    pub increase_percent: Option<f64>,
}

#[cfg(test)]
mod test {
    use super::*;

    const HEADER: &str = "[ ID] Interval       Transfer     Bandwidth";

    fn write_log(dir: &Path, name: &str, rates: &[f64]) {
        let mut log = vec![HEADER.to_string()];
        for (i, rate) in rates.iter().enumerate() {
            let start = i as f64 * 0.5;
            log.push(format!(
                "[  3] {:.1}-{:.1} sec  64.0 KBytes  {rate} Mbits/sec",
                start,
                start + 0.5
            ));
        }
        fs::write(dir.join(name), log.join("\n")).unwrap();
    }

    /// 4 flows in 2 groups of 2, one second apart.
    fn setup(dir: &Path) -> ExperimentDescription {
        write_log(dir, "AFQ_server_1", &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0]);
        write_log(dir, "AFQ_server_2", &[2.0; 8]);
        write_log(dir, "AFQ_server_3", &[4.0; 4]);
        write_log(dir, "AFQ_server_4", &[2.0; 4]);
        for id in 1..=4 {
            write_log(dir, &format!("A2FQ_server_{id}"), &[3.0; 8]);
        }
        ExperimentDescription {
            data_dir: dir.to_path_buf(),
            interval: 1,
            group_flows: 2,
            dumbbell_pairs: 4,
            samples_per_sec: 2,
        }
    }

    #[test]
    fn flow_logs_until_first_gap() {
        let dir = tempfile::tempdir().unwrap();
        let exp = setup(dir.path());
        write_log(dir.path(), "AFQ_server_6", &[1.0]);

        let logs = exp.flow_logs("AFQ", MeasureSide::Server).unwrap();
        assert_eq!(logs.iter().map(|(id, _)| *id).collect_vec(), vec![1, 2, 3, 4]);
        assert_eq!(logs[0].1, dir.path().join("AFQ_server_1"));

        assert!(matches!(
            exp.flow_logs("AFQ", MeasureSide::Client),
            Err(ExperimentError::NoFlows { .. })
        ));
    }

    #[test]
    fn convergence() {
        let dir = tempfile::tempdir().unwrap();
        let exp = setup(dir.path());

        let groups = exp.convergence_groups("AFQ", MeasureSide::Server).unwrap();
        assert_eq!(groups.len(), 2);

        assert_eq!(groups[0].label(), "flow 1-2");
        assert_eq!(
            groups[0].times,
            vec![0.0, 0.5, 1.0, 1.5, 2.0, 2.5, 3.0, 3.5]
        );
        assert_eq!(
            groups[0].goodput,
            vec![0.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 0.0]
        );

        assert_eq!(groups[1].label(), "flow 3-4");
        assert_eq!(groups[1].times, vec![1.0, 1.5, 2.0, 2.5]);
        assert_eq!(groups[1].goodput, vec![0.0, 6.0, 6.0, 0.0]);
    }

    #[test]
    fn rates_and_fairness() {
        let dir = tempfile::tempdir().unwrap();
        let exp = setup(dir.path());

        assert_eq!(
            exp.flow_rates("AFQ", MeasureSide::Server).unwrap(),
            vec![4.0, 2.0, 4.0, 2.0]
        );

        let cmp = exp
            .compare_fairness(&["AFQ".to_string(), "A2FQ".to_string()], MeasureSide::Server)
            .unwrap();
        assert_eq!(cmp.dumbbell_pairs, 4);
        assert_eq!(cmp.indices[0], ("AFQ".to_string(), 0.9));
        assert_eq!(cmp.indices[1], ("A2FQ".to_string(), 1.0));
        assert!((cmp.increase_percent.unwrap() - 100.0 / 9.0).abs() < 1e-9);

        let single = exp
            .compare_fairness(&["A2FQ".to_string()], MeasureSide::Server)
            .unwrap();
        assert_eq!(single.increase_percent, None);
    }

    #[test]
    fn short_log_has_empty_window() {
        let dir = tempfile::tempdir().unwrap();
        let exp = setup(dir.path());
        write_log(dir.path(), "AFQ_server_1", &[1.0, 1.0]);

        assert!(matches!(
            exp.flow_rates("AFQ", MeasureSide::Server),
            Err(ExperimentError::Iperf {
                source: IperfError::EmptyRange,
                ..
            })
        ));
    }

    #[test]
    fn malformed_log() {
        let dir = tempfile::tempdir().unwrap();
        let exp = setup(dir.path());
        fs::write(dir.path().join("AFQ_server_2"), format!("{HEADER}\nnot a report")).unwrap();

        match exp.convergence_groups("AFQ", MeasureSide::Server) {
            Err(ExperimentError::Iperf { path, source }) => {
                assert_eq!(path, dir.path().join("AFQ_server_2"));
                assert!(matches!(source, IperfError::MalformedRecord { line_no: 2, .. }));
            }
            r => panic!("unexpected result {r:?}"),
        }
    }

    #[test]
    fn flows_beyond_schedule() {
        let dir = tempfile::tempdir().unwrap();
        let mut exp = setup(dir.path());
        exp.dumbbell_pairs = 3;

        assert!(matches!(
            exp.flow_rates("AFQ", MeasureSide::Server),
            Err(ExperimentError::FlowOutOfSchedule(3))
        ));
    }

    #[test]
    fn export() {
        let dir = tempfile::tempdir().unwrap();
        let exp = setup(dir.path());
        let out = tempfile::tempdir().unwrap();

        let groups = exp.convergence_groups("AFQ", MeasureSide::Server).unwrap();
        let path = groups[1].export_csv(out.path(), "AFQ", b',').unwrap();
        assert_eq!(path, out.path().join("AFQ-flow3-4-goodput.csv"));
        assert_eq!(
            fs::read_to_string(path).unwrap(),
            "Time(s),Goodput(Mbps)\n1,0\n1.5,6\n2,6\n2.5,0\n"
        );
    }

    #[test]
    fn load_descriptions() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("experiments.json");
        fs::write(
            &path,
            r#"[
                {"data_dir": "data/run1", "interval": 10, "group_flows": 3, "dumbbell_pairs": 18},
                {"data_dir": "data/run2", "interval": 5, "group_flows": 2, "dumbbell_pairs": 16, "samples_per_sec": 1}
            ]"#,
        )
        .unwrap();

        let exps = ExperimentDescription::load_all(&path).unwrap();
        assert_eq!(exps.len(), 2);
        assert_eq!(exps[0].data_dir, PathBuf::from("data/run1"));
        assert_eq!(exps[0].samples_per_sec, 2);
        assert_eq!(exps[0].group_num(), 6);
        assert_eq!(exps[1].samples_per_sec, 1);
        assert_eq!(exps[1].group_num(), 8);

        fs::write(
            &path,
            r#"[{"data_dir": "x", "interval": 10, "group_flows": 0, "dumbbell_pairs": 18}]"#,
        )
        .unwrap();
        assert!(matches!(
            ExperimentDescription::load_all(&path),
            Err(ExperimentError::InvalidParameter { .. })
        ));
    }

    #[test]
    fn load_param_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("exp_data_dir"), "data/20220509_194721\n").unwrap();
        fs::write(dir.path().join("flow_enter_interval"), "10\n").unwrap();
        fs::write(dir.path().join("group_flows"), "2").unwrap();
        fs::write(dir.path().join("dumbbell_pairs"), "16\n").unwrap();

        let exp = ExperimentDescription::from_param_files(dir.path()).unwrap();
        assert_eq!(exp.data_dir, dir.path().join("data/20220509_194721"));
        assert_eq!(exp.interval, 10);
        assert_eq!(exp.group_flows, 2);
        assert_eq!(exp.dumbbell_pairs, 16);
        assert_eq!(exp.samples_per_sec, 2);

        fs::write(dir.path().join("group_flows"), "two\n").unwrap();
        match ExperimentDescription::from_param_files(dir.path()) {
            Err(ExperimentError::InvalidParameter { name, value }) => {
                assert_eq!(name, "group_flows");
                assert_eq!(value, "two");
            }
            r => panic!("unexpected result {r:?}"),
        }
    }

    #[test]
    fn side_names() {
        assert_eq!(MeasureSide::Server.to_string(), "server");
        assert_eq!("client".parse::<MeasureSide>().unwrap(), MeasureSide::Client);
    }
}
