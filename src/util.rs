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
//! Utility module collection of functions

use std::path::Path;

/// Initialize logging from `log4rs.yml` in the working directory, or from the `RUST_LOG`
/// environment variable if there is no such file.
pub fn init_logging() {
    let config = Path::new("log4rs.yml");
    if config.exists() {
        if let Err(e) = log4rs::init_file(config, Default::default()) {
            eprintln!("Cannot initialize logging from {config:?}: {e}");
        } else {
            return;
        }
    }
    pretty_env_logger::init();
}

/// Parse a single-byte delimiter as given on the command line. `\t` and `tab` denote a tab.
pub fn parse_delimiter(s: &str) -> Result<u8, String> {
    match s {
        "\\t" | "tab" => Ok(b'\t'),
        s if s.len() == 1 && s.is_ascii() => Ok(s.as_bytes()[0]),
        s => Err(format!("delimiter must be a single ASCII character, got {s:?}")),
    }
}
