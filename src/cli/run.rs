//! The driver: resolves profiles once, then renders each input.

use super::Cli;
use crate::config::{self, AppConfig, TypeProfile};
use crate::debug;
use crate::doc::{RenderContext, RenderedDocument};
use crate::hooks::NoopHooks;
use crate::links::{self, ReqwestHead};
use crate::log;
use crate::pipeline;
use crate::report::Reporter;
use anyhow::{Context, Result};
use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, Local};
use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

pub fn run(cli: &Cli, config: &AppConfig) -> Result<()> {
    let mut reporter = Reporter::new();

    let profiles = config::resolve(
        config::builtin_types(),
        &config.types,
        &config.default_creator,
        &mut reporter,
    )?;

    // One timestamp for the whole run, so every file in a batch gets
    // identical dates.
    let now = Local::now();
    let long_date = format_date(&now, &config.dates.long, "%A, %d %B %Y %H:%M:%S");
    let short_date = format_date(&now, &config.dates.short, "%d %B %Y");

    let head_client = if config.links.check {
        Some(ReqwestHead::new()?)
    } else {
        None
    };

    let mut files = 0usize;
    for input in &cli.inputs {
        files += 1;

        if input == "-" {
            let mut text = String::new();
            io::stdin()
                .read_to_string(&mut text)
                .context("reading standard input")?;
            let profile = effective_profile(&profiles["default"], cli);
            let ctx = RenderContext {
                filename: "-",
                long_date: &long_date,
                short_date: &short_date,
            };
            let mut doc = RenderedDocument::new(text);
            pipeline::render(
                &mut doc,
                &profile,
                "default",
                &ctx,
                config,
                &NoopHooks,
                &mut reporter,
            );
            io::stdout()
                .write_all(doc.text.as_bytes())
                .context("writing standard output")?;
            continue;
        }

        let path = Path::new(input);
        let text = fs::read_to_string(path).with_context(|| format!("reading {input}"))?;

        let type_name = match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if profiles.contains_key(ext) => ext.to_string(),
            Some(ext) => {
                reporter
                    .reference_error(format!("{input}: unknown type `{ext}`, using `default`"));
                "default".to_string()
            }
            None => {
                reporter.reference_error(format!("{input}: no extension, using `default`"));
                "default".to_string()
            }
        };

        let profile = effective_profile(&profiles[&type_name], cli);
        let ctx = RenderContext {
            filename: input,
            long_date: &long_date,
            short_date: &short_date,
        };
        let mut doc = RenderedDocument::new(text);
        pipeline::render(
            &mut doc,
            &profile,
            &type_name,
            &ctx,
            config,
            &NoopHooks,
            &mut reporter,
        );

        let out_path = output_path(path, cli.output_dir.as_deref(), profile.out_ext.as_deref());
        if let Some(parent) = out_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("creating {}", parent.display()))?;
            }
        }
        fs::write(&out_path, doc.text.as_bytes())
            .with_context(|| format!("writing {}", out_path.display()))?;

        debug!("render"; "{input} -> {} ({} bytes)", out_path.display(), doc.text.len());
        if !profile.creator.is_empty() {
            // Creator codes only mean something on classic Mac
            // filesystems; surfaced here for the downstream tagger.
            debug!("render"; "{}: creator code {}", out_path.display(), profile.creator);
        }

        if let Some(client) = &head_client {
            let targets = links::scan(&doc.text);
            let base_dir = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new("."));
            links::check(input, &targets, base_dir, client, &mut reporter);
        }
    }

    reporter.summarize(files);
    Ok(())
}

/// The per-file profile after global CLI overrides.
fn effective_profile(base: &TypeProfile, cli: &Cli) -> TypeProfile {
    let mut profile = base.clone();
    if let Some(width) = cli.width {
        profile.width = width;
    }
    if let Some(compress) = cli.compress {
        profile.compress = compress.min(2);
    }
    profile
}

/// Format `now`, falling back to the stock format when the configured
/// one does not parse as strftime.
fn format_date(now: &DateTime<Local>, format: &str, fallback: &str) -> String {
    let items: Vec<Item<'_>> = StrftimeItems::new(format).collect();
    if items.iter().any(|item| matches!(item, Item::Error)) {
        log!("warning"; "invalid date format `{format}`, using `{fallback}`");
        now.format(fallback).to_string()
    } else {
        now.format_with_items(items.into_iter()).to_string()
    }
}

/// Destination for one input: same place (or `output_dir`), with the
/// profile's output extension when set.
fn output_path(input: &Path, output_dir: Option<&Path>, out_ext: Option<&str>) -> PathBuf {
    let mut path = match output_dir {
        Some(dir) => dir.join(input.file_name().unwrap_or_default()),
        None => input.to_path_buf(),
    };
    if let Some(ext) = out_ext {
        path.set_extension(ext);
    }
    path
}
