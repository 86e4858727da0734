mod cli;
mod config;
mod doc;
mod entity;
mod hooks;
mod links;
mod logger;
mod mask;
mod pipeline;
mod report;

use anyhow::Result;
use clap::{ColorChoice, Parser};
use cli::Cli;
use config::AppConfig;

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {}
    }
    logger::set_verbose(cli.verbose);

    let config = AppConfig::load(&cli)?;
    cli::run::run(&cli, &config)
}
