//! Utility library for the dumbbell evaluation scripts

pub mod csv_utils;
pub mod other;
