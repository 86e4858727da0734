//! Command-line interface definition.

use clap::{ArgAction, ColorChoice, Parser};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "htmunge",
    version,
    about = "Rewrite HTML, XML, CSS and PHP files: macros, entities, compression, wrapping"
)]
pub struct Cli {
    /// Files to process; `-` reads stdin and writes stdout
    #[arg(required = true, value_name = "FILE")]
    pub inputs: Vec<String>,

    /// Configuration file
    #[arg(short = 'C', long, default_value = "htmunge.toml", value_name = "PATH")]
    pub config: PathBuf,

    /// Write outputs into this directory instead of in place
    #[arg(short, long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Override the wrap column for every type (0 disables wrapping)
    #[arg(short, long, value_name = "COLS")]
    pub width: Option<usize>,

    /// Override the compression level for every type (0, 1 or 2)
    #[arg(short = 'z', long, value_name = "LEVEL")]
    pub compress: Option<u8>,

    /// Probe hyperlink targets after rendering
    #[arg(short = 'L', long)]
    pub check_links: bool,

    /// Insert the banner comment (or `--banner=false` to suppress it)
    #[arg(
        short,
        long,
        num_args = 0..=1,
        default_missing_value = "true",
        require_equals = true,
        action = ArgAction::Set,
        value_name = "BOOL"
    )]
    pub banner: Option<bool>,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Color output control
    #[arg(long, global = true, default_value = "auto", value_name = "WHEN")]
    pub color: ColorChoice,
}
