//! Application configuration for `htmunge.toml`.
//!
//! # Sections
//!
//! | Section       | Purpose                                          |
//! |---------------|--------------------------------------------------|
//! | (top level)   | `default_creator` tag code                       |
//! | `[banner]`    | Output banner comment                            |
//! | `[dates]`     | strftime formats for `<<longdate>>` / `<<date>>` |
//! | `[macros]`    | The two macro delimiter styles                   |
//! | `[links]`     | Hyperlink checking                               |
//! | `[types.*]`   | Per-extension profile overrides                  |
//!
//! The loaded configuration is an immutable value threaded into the
//! resolver and the pipeline; nothing reads it as ambient state.

pub mod error;
pub mod profile;

pub use error::ConfigError;
pub use profile::{RawProfile, TypeProfile, builtin_types, resolve};

use crate::cli::Cli;
use crate::log;
use anyhow::Result;
use regex::Regex;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::{fs, path::Path, path::PathBuf};

// ============================================================================
// root configuration
// ============================================================================

/// Root configuration structure representing htmunge.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Absolute path to the config file (internal use only)
    #[serde(skip)]
    pub config_path: PathBuf,

    /// Creator code seeded into the `default` profile before
    /// resolution; empty = none.
    #[serde(default)]
    pub default_creator: String,

    /// Banner comment settings
    #[serde(default)]
    pub banner: BannerConfig,

    /// Date formats for the date macros
    #[serde(default)]
    pub dates: DatesConfig,

    /// Macro delimiter styles
    #[serde(default)]
    pub macros: MacroConfig,

    /// Hyperlink checking settings
    #[serde(default)]
    pub links: LinksConfig,

    /// Per-extension profile overrides, merged over the built-ins
    #[serde(default)]
    pub types: FxHashMap<String, RawProfile>,
}

impl AppConfig {
    /// Load configuration from the CLI-selected path; a missing file
    /// means built-in defaults.
    pub fn load(cli: &Cli) -> Result<Self> {
        let mut config = if cli.config.exists() {
            Self::from_path(&cli.config)?
        } else {
            Self::default()
        };
        config.config_path = cli.config.clone();
        config.apply_cli(cli);
        Ok(config)
    }

    /// Load configuration from file path with unknown field detection.
    fn from_path(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;
        let (config, ignored) = Self::parse_with_ignored(&content)?;
        if !ignored.is_empty() {
            log!("warning"; "unknown fields in {}, ignoring:", path.display());
            for field in &ignored {
                eprintln!("- {field}");
            }
        }
        Ok(config)
    }

    /// Parse TOML content, collecting any unknown fields.
    pub fn parse_with_ignored(content: &str) -> Result<(Self, Vec<String>), ConfigError> {
        let mut ignored = Vec::new();
        let deserializer = toml::Deserializer::new(content);
        let config = serde_ignored::deserialize(deserializer, |path: serde_ignored::Path| {
            ignored.push(path.to_string());
        })?;
        Ok((config, ignored))
    }

    /// Apply CLI flag overrides after loading.
    fn apply_cli(&mut self, cli: &Cli) {
        if let Some(banner) = cli.banner {
            self.banner.enable = banner;
        }
        if cli.check_links {
            self.links.check = true;
        }
    }

    /// The one-line banner text, `None` when disabled.
    pub fn banner_line(&self) -> Option<String> {
        if !self.banner.enable {
            return None;
        }
        if !self.banner.text.is_empty() {
            return Some(self.banner.text.clone());
        }
        let mut line = format!(
            "generated by {} v{}",
            env!("CARGO_PKG_NAME"),
            env!("CARGO_PKG_VERSION")
        );
        if !self.banner.copyright.is_empty() {
            line.push_str(" - ");
            line.push_str(&self.banner.copyright);
        }
        Some(line)
    }
}

// ============================================================================
// [banner]
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BannerConfig {
    /// Insert the banner comment into every output file.
    pub enable: bool,
    /// Banner text; empty = auto (program name, version, copyright).
    pub text: String,
    /// Copyright notice appended to the auto banner.
    pub copyright: String,
}

impl Default for BannerConfig {
    fn default() -> Self {
        Self {
            enable: false,
            text: String::new(),
            copyright: String::new(),
        }
    }
}

// ============================================================================
// [dates]
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatesConfig {
    /// strftime format for `<<longdate>>`.
    pub long: String,
    /// strftime format for `<<date>>`.
    pub short: String,
}

impl Default for DatesConfig {
    fn default() -> Self {
        Self {
            long: "%A, %d %B %Y %H:%M:%S".to_string(),
            short: "%d %B %Y".to_string(),
        }
    }
}

// ============================================================================
// [macros]
// ============================================================================

/// The two interchangeable macro delimiter styles. Both are recognized
/// throughout the pipeline via a single pattern built here.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MacroConfig {
    pub open: String,
    pub close: String,
    pub alt_open: String,
    pub alt_close: String,
}

impl Default for MacroConfig {
    fn default() -> Self {
        Self {
            open: "<<".to_string(),
            close: ">>".to_string(),
            alt_open: "<:".to_string(),
            alt_close: ":>".to_string(),
        }
    }
}

impl MacroConfig {
    fn build(&self, body: &str) -> Regex {
        let pattern = format!(
            "(?i)(?:{o}{body}{c}|{ao}{body}{ac})",
            o = regex::escape(&self.open),
            c = regex::escape(&self.close),
            ao = regex::escape(&self.alt_open),
            ac = regex::escape(&self.alt_close),
        );
        // A bad user delimiter falls back to the stock style rather
        // than aborting the run.
        Regex::new(&pattern).unwrap_or_else(|_| {
            let stock = format!("(?i)(?:<<{body}>>|<:{body}:>)");
            Regex::new(&stock).expect("stock macro pattern is valid")
        })
    }

    /// Pattern matching a bare keyword macro in either delimiter style.
    pub fn keyword(&self, keyword: &str) -> Regex {
        self.build(&format!(r"\s*{keyword}\s*"))
    }

    /// Pattern matching a keyword with one captured argument.
    ///
    /// The argument appears in capture group 1 or 2 depending on which
    /// delimiter style matched.
    pub fn keyword_arg(&self, keyword: &str, arg: &str) -> Regex {
        let pattern = format!(
            r"(?i)(?:{o}\s*{keyword}\s+({arg})\s*{c}|{ao}\s*{keyword}\s+({arg})\s*{ac})",
            o = regex::escape(&self.open),
            c = regex::escape(&self.close),
            ao = regex::escape(&self.alt_open),
            ac = regex::escape(&self.alt_close),
        );
        Regex::new(&pattern).unwrap_or_else(|_| {
            let stock = format!(r"(?i)(?:<<\s*{keyword}\s+({arg})\s*>>|<:\s*{keyword}\s+({arg})\s*:>)");
            Regex::new(&stock).expect("stock macro pattern is valid")
        })
    }

    /// Pattern matching any leftover macro-looking token, for the
    /// final diagnostic scan.
    pub fn leftover(&self) -> Regex {
        self.build(r"\s*[a-z]+[^\n]*?")
    }
}

// ============================================================================
// [links]
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LinksConfig {
    /// Probe hyperlink targets after rendering.
    pub check: bool,
}

impl Default for LinksConfig {
    fn default() -> Self {
        Self { check: false }
    }
}

// ============================================================================
// tests
// ============================================================================
