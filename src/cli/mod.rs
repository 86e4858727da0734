//! Command-line surface: argument parsing and the batch driver.

pub mod args;
pub mod run;

pub use args::Cli;
