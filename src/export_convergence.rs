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
use std::{fs, path::PathBuf};

use clap::Parser;

use dumbbell_eval::{
    experiments::{ExperimentDescription, MeasureSide},
    util,
};
use dumbbell_utils::other::get_timestamp;

/// Export the aggregated goodput of every flow group of a convergence experiment as CSV.
#[derive(Parser, Debug)]
#[command(about, long_about = None)]
struct Args {
    /// JSON file describing the experiment. Takes precedence over `--param-dir`.
    #[arg(short, long)]
    experiment: Option<PathBuf>,
    /// Directory containing the files `exp_data_dir`, `flow_enter_interval`, `group_flows` and
    /// `dumbbell_pairs`.
    #[arg(long, default_value = ".")]
    param_dir: PathBuf,
    /// Projects to export.
    #[arg(short, long, value_delimiter = ',', default_value = "AFQ,A2FQ")]
    projects: Vec<String>,
    /// Host on which the flows were measured.
    #[arg(short, long, default_value_t = MeasureSide::Server)]
    side: MeasureSide,
    /// Output directory. Defaults to a new timestamped directory in `./goodput/`.
    #[arg(short, long)]
    output_path: Option<PathBuf>,
    /// Column delimiter of the written tables.
    #[arg(short, long, default_value = ",", value_parser = util::parse_delimiter)]
    delimiter: u8,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    util::init_logging();

    let args = Args::parse();
    let experiment = match &args.experiment {
        Some(path) => ExperimentDescription::load(path)?,
        None => ExperimentDescription::from_param_files(&args.param_dir)?,
    };
    log::debug!("Experiment: {experiment:#?}");

    let output_path = args
        .output_path
        .unwrap_or_else(|| PathBuf::from("./goodput").join(get_timestamp()));
    fs::create_dir_all(&output_path)?;

    for project in args.projects.iter() {
        for group in experiment.convergence_groups(project, args.side)? {
            let path = group.export_csv(&output_path, project, args.delimiter)?;
            log::info!(
                "{project} {}: {} points written to {path:?}",
                group.label(),
                group.points().count()
            );
            println!("{}", path.display());
        }
    }

    Ok(())
}
