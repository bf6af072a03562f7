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
//! Statistics over the per-flow rates of an experiment.

use statrs::statistics::Statistics;

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum StatsError {
    #[error("No data was given to the statistics function")]
    NoData,
    #[error("All rates are zero, so the fairness index is undefined")]
    ZeroRates,
}

/// Jain's fairness index `(sum x)^2 / (n * sum x^2)` of the given rates. The result lies in
/// `[1/n, 1]`, where `1` means that all flows got the same rate.
pub fn fairness_index(rates: &[f64]) -> Result<f64, StatsError> {
    if rates.is_empty() {
        return Err(StatsError::NoData);
    }
    let sum: f64 = rates.iter().sum();
    let square_sum: f64 = rates.iter().map(|x| x * x).sum();
    if square_sum == 0.0 {
        return Err(StatsError::ZeroRates);
    }
    Ok(sum * sum / (rates.len() as f64 * square_sum))
}

/// Relative change from `base` to `new` in percent.
pub fn increase_percent(base: f64, new: f64) -> f64 {
    (new - base) * 100.0 / base
}

/// Element-wise sum of all `lists`. Shorter lists count as zero where they have no value.
pub fn sum_series<L: AsRef<[f64]>>(lists: &[L]) -> Vec<f64> {
    let len = lists.iter().map(|l| l.as_ref().len()).max().unwrap_or(0);
    let mut result = vec![0.0; len];
    for list in lists {
        for (acc, x) in result.iter_mut().zip(list.as_ref()) {
            *acc += x;
        }
    }
    result
}

/// Summary of a set of flow rates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RateSummary {
    pub mean: f64,
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
}

impl RateSummary {
    pub fn from_rates(rates: &[f64]) -> Result<Self, StatsError> {
        if rates.is_empty() {
            return Err(StatsError::NoData);
        }
        Ok(Self {
            mean: rates.mean(),
            // sample standard deviation is undefined for a single flow
            std_dev: if rates.len() > 1 { rates.std_dev() } else { 0.0 },
            min: rates.min(),
            max: rates.max(),
        })
    }
}
