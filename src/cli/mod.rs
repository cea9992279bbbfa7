//! CLI subcommand implementations for the shutter binary.

pub mod doctor;
pub mod run_cmd;
pub mod targets_cmd;
