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
use std::path::PathBuf;

use clap::Parser;
use itertools::{Itertools, MinMaxResult};
use rayon::prelude::*;

use dumbbell_eval::{
    experiments::{ExperimentDescription, MeasureSide},
    util,
};

/// Compare the fairness of several projects over a list of convergence experiments.
#[derive(Parser, Debug)]
#[command(about, long_about = None)]
struct Args {
    /// JSON list of experiment descriptions.
    #[arg(short, long, default_value = "./experiments.json")]
    experiments: PathBuf,
    /// Projects to compare. The increase is reported for the second over the first one.
    #[arg(short, long, value_delimiter = ',', default_value = "AFQ,A2FQ")]
    projects: Vec<String>,
    /// Host on which the flows were measured.
    #[arg(short, long, default_value_t = MeasureSide::Server)]
    side: MeasureSide,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    util::init_logging();

    let args = Args::parse();
    let experiments = ExperimentDescription::load_all(&args.experiments)?;
    log::info!(
        "Comparing {} on {} experiments",
        args.projects.iter().join(", "),
        experiments.len()
    );

    let comparisons = experiments
        .par_iter()
        .map(|exp| exp.compare_fairness(&args.projects, args.side))
        .collect::<Result<Vec<_>, _>>()?;

    for cmp in comparisons.iter() {
        let indices = cmp.indices.iter().map(|(_, f)| f).join(" ");
        match cmp.increase_percent {
            Some(increase) => println!("{} {indices} {increase}", cmp.dumbbell_pairs),
            None => println!("{} {indices}", cmp.dumbbell_pairs),
        }
    }

    match comparisons
        .iter()
        .filter_map(|cmp| cmp.increase_percent)
        .minmax()
    {
        MinMaxResult::NoElements => {}
        MinMaxResult::OneElement(x) => println!("fairness increase percent: {x:.2} - {x:.2}"),
        MinMaxResult::MinMax(min, max) => {
            println!("fairness increase percent: {min:.2} - {max:.2}")
        }
    }

    Ok(())
}
