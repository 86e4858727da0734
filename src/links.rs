//! Hyperlink extraction and validation.
//!
//! Runs over the rendered output, after the pipeline, so the targets
//! checked are the targets shipped. Every distinct `href` target is
//! probed once per file, in first-occurrence order; repeats are noted
//! in verbose mode only.
//!
//! Remote `http(s)` targets are probed with a HEAD request through the
//! [`HeadClient`] seam. Everything else is treated as a local path
//! relative to the source file's directory, with an optional fragment.

use crate::debug;
use crate::report::Reporter;
use regex::Regex;
use std::path::Path;
use std::sync::LazyLock;
use std::time::Duration;

static RE_HREF: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)href\s*=\s*(?:"([^"]*)"|'([^']*)')"#).expect("valid regex")
});

// ============================================================================
// HEAD probing
// ============================================================================

/// Issues HEAD requests for remote link targets. Tests substitute a
/// canned implementation.
pub trait HeadClient {
    /// Returns the response status code.
    fn head(&self, url: &str) -> anyhow::Result<u16>;
}

/// The production client, with a short timeout so one dead host does
/// not stall the whole run.
pub struct ReqwestHead {
    client: reqwest::blocking::Client,
}

impl ReqwestHead {
    pub fn new() -> anyhow::Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(10))
            .user_agent(concat!(
                env!("CARGO_PKG_NAME"),
                "/",
                env!("CARGO_PKG_VERSION")
            ))
            .build()?;
        Ok(Self { client })
    }
}

impl HeadClient for ReqwestHead {
    fn head(&self, url: &str) -> anyhow::Result<u16> {
        let response = self.client.head(url).send()?;
        Ok(response.status().as_u16())
    }
}

// ============================================================================
// Scanning and checking
// ============================================================================

/// Collect the distinct `href` targets of a buffer, first occurrence
/// first.
pub fn scan(buffer: &str) -> Vec<String> {
    let mut targets: Vec<String> = Vec::new();
    for caps in RE_HREF.captures_iter(buffer) {
        let target = caps
            .get(1)
            .or_else(|| caps.get(2))
            .map(|m| m.as_str())
            .unwrap_or_default();
        if target.is_empty() {
            continue;
        }
        if targets.iter().any(|t| t == target) {
            debug!("link"; "repeat target {target}");
            continue;
        }
        targets.push(target.to_string());
    }
    targets
}

/// Validate every target of one rendered file.
pub fn check(
    filename: &str,
    targets: &[String],
    base_dir: &Path,
    client: &dyn HeadClient,
    reporter: &mut Reporter,
) {
    for target in targets {
        if target.starts_with("http://") || target.starts_with("https://") {
            match client.head(target) {
                Ok(status) if (200..300).contains(&status) => {}
                Ok(status) => {
                    reporter.link_error(format!("{filename}: {target} answered {status}"));
                }
                Err(err) => {
                    reporter.link_error(format!("{filename}: {target} unreachable: {err:#}"));
                }
            }
            continue;
        }

        // Non-HTTP schemes (mailto:, ftp:, ...) are out of scope.
        if target.contains(':') {
            continue;
        }

        let (path_part, fragment) = match target.split_once('#') {
            Some((p, f)) => (p, Some(f)),
            None => (target.as_str(), None),
        };

        if !path_part.is_empty() {
            let candidate = base_dir.join(path_part);
            if !candidate.exists() {
                reporter.link_error(format!(
                    "{filename}: {target} -> missing file {}",
                    candidate.display()
                ));
                continue;
            }
        }

        if let Some(fragment) = fragment {
            if !fragment_follows_convention(fragment) {
                reporter.link_warning(format!(
                    "{filename}: fragment #{fragment} does not follow the anchor convention"
                ));
            }
        }
    }
}

/// House anchor names start with exactly three lowercase letters
/// followed by a non-letter (or nothing).
fn fragment_follows_convention(fragment: &str) -> bool {
    let mut chars = fragment.chars();
    for _ in 0..3 {
        match chars.next() {
            Some(c) if c.is_ascii_lowercase() => {}
            _ => return false,
        }
    }
    match chars.next() {
        None => true,
        Some(c) => !c.is_ascii_alphabetic(),
    }
}
