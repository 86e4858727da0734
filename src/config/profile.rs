//! Per-file-type profiles and the inheritance resolver.
//!
//! A [`RawProfile`] is the sparse form found in the config file: every
//! field optional, plus an `inherits` reference to another type.
//! [`resolve`] merges user overrides into the built-in base table and
//! collapses inheritance to a fixed point, producing fully-populated
//! [`TypeProfile`] records with no `inherits` left anywhere.

use super::ConfigError;
use crate::report::Reporter;
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};

// ============================================================================
// Profile types
// ============================================================================

/// Sparse, inheritable per-type settings as written in `[types.*]`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawProfile {
    /// Free-text description, ignored by logic.
    pub info: Option<String>,
    /// 0 = none, 1 = whitespace/comments, 2 = plus tag synonyms.
    pub compress: Option<u8>,
    /// 0 = leave non-ASCII untouched, >=1 = entity-encode.
    pub non_ascii: Option<u8>,
    /// Wrap column, 0 = disabled.
    pub width: Option<usize>,
    /// Macintosh creator code forwarded to the tagging collaborator.
    pub creator: Option<String>,
    /// Renamed output extension.
    pub out_ext: Option<String>,
    /// Parent type to inherit unset fields from. Consumed and erased
    /// during resolution; absent defaults to `default`.
    pub inherits: Option<String>,
}

impl RawProfile {
    /// Per-field overwrite: fields set in `other` win.
    fn merge_from(&mut self, other: &Self) {
        if other.info.is_some() {
            self.info = other.info.clone();
        }
        if other.compress.is_some() {
            self.compress = other.compress;
        }
        if other.non_ascii.is_some() {
            self.non_ascii = other.non_ascii;
        }
        if other.width.is_some() {
            self.width = other.width;
        }
        if other.creator.is_some() {
            self.creator = other.creator.clone();
        }
        if other.out_ext.is_some() {
            self.out_ext = other.out_ext.clone();
        }
        if other.inherits.is_some() {
            self.inherits = other.inherits.clone();
        }
    }

    /// Copy every field present in `parent` but absent here.
    /// `inherits` is deliberately not copied.
    fn fill_from(&mut self, parent: &Self) {
        if self.info.is_none() {
            self.info = parent.info.clone();
        }
        if self.compress.is_none() {
            self.compress = parent.compress;
        }
        if self.non_ascii.is_none() {
            self.non_ascii = parent.non_ascii;
        }
        if self.width.is_none() {
            self.width = parent.width;
        }
        if self.creator.is_none() {
            self.creator = parent.creator.clone();
        }
        if self.out_ext.is_none() {
            self.out_ext = parent.out_ext.clone();
        }
    }
}

/// Fully-resolved, read-only per-type settings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TypeProfile {
    pub info: String,
    pub compress: u8,
    pub non_ascii: u8,
    pub width: usize,
    pub creator: String,
    pub out_ext: Option<String>,
}

impl TypeProfile {
    fn from_raw(raw: RawProfile) -> Self {
        Self {
            info: raw.info.unwrap_or_default(),
            compress: raw.compress.unwrap_or(0),
            non_ascii: raw.non_ascii.unwrap_or(0),
            width: raw.width.unwrap_or(0),
            creator: raw.creator.unwrap_or_default(),
            out_ext: raw.out_ext,
        }
    }
}

// ============================================================================
// Built-in base table
// ============================================================================

fn raw(
    info: &str,
    compress: Option<u8>,
    non_ascii: Option<u8>,
    inherits: Option<&str>,
) -> RawProfile {
    RawProfile {
        info: Some(info.to_string()),
        compress,
        non_ascii,
        width: None,
        creator: None,
        out_ext: None,
        inherits: inherits.map(str::to_string),
    }
}

/// Built-in type table, overridable from `[types.*]` in the config
/// file. `default` must exist and carries a value for every field.
pub fn builtin_types() -> FxHashMap<String, RawProfile> {
    let mut table = FxHashMap::default();
    table.insert(
        "default".to_string(),
        RawProfile {
            info: Some("fallback for unrecognized extensions".to_string()),
            compress: Some(1),
            non_ascii: Some(1),
            width: Some(0),
            creator: None,
            out_ext: None,
            inherits: None,
        },
    );
    table.insert("html".into(), raw("HTML document", Some(2), None, None));
    table.insert("htm".into(), raw("HTML document", None, None, Some("html")));
    table.insert(
        "shtml".into(),
        raw("HTML with server-side includes", None, None, Some("html")),
    );
    table.insert("xml".into(), raw("XML document", Some(1), None, None));
    table.insert(
        "xhtml".into(),
        raw("XHTML document", None, None, Some("xml")),
    );
    table.insert(
        "css".into(),
        raw("cascading style sheet", Some(1), None, None),
    );
    table.insert("php".into(), raw("PHP page", None, None, Some("html")));
    table.insert(
        "txt".into(),
        raw("plain text, passed through", Some(0), Some(0), None),
    );
    table
}

// ============================================================================
// Resolver
// ============================================================================

/// Merge `overrides` into `base` and resolve inheritance to a fixed
/// point.
///
/// Fails only when the merged table has no `default` entry. An unknown
/// `inherits` target is reported and rebound to `default`; so is a
/// dependency cycle, detected as a full pass with no progress.
pub fn resolve(
    base: FxHashMap<String, RawProfile>,
    overrides: &FxHashMap<String, RawProfile>,
    default_creator: &str,
    reporter: &mut Reporter,
) -> Result<FxHashMap<String, TypeProfile>, ConfigError> {
    let mut table = base;

    // Merge: override wins per field, new types may be added.
    for (name, over) in overrides {
        table.entry(name.clone()).or_default().merge_from(over);
    }

    if !table.contains_key("default") {
        return Err(ConfigError::MissingDefault);
    }

    // Seed default's creator from the global setting; default itself
    // never inherits.
    if let Some(default) = table.get_mut("default") {
        if default.creator.is_none() && !default_creator.is_empty() {
            default.creator = Some(default_creator.to_string());
        }
        default.inherits = None;
    }

    // Every other type without an explicit parent inherits `default`.
    for (name, profile) in table.iter_mut() {
        if name != "default" && profile.inherits.is_none() {
            profile.inherits = Some("default".to_string());
        }
    }

    // Deterministic pass order keeps diagnostics stable across runs.
    let mut names: Vec<String> = table.keys().cloned().collect();
    names.sort();

    let mut done: FxHashSet<String> = FxHashSet::default();
    done.insert("default".to_string());

    while done.len() < table.len() {
        let mut progress = false;

        for name in &names {
            if done.contains(name) {
                continue;
            }

            let parent = table
                .get(name)
                .and_then(|p| p.inherits.clone())
                .unwrap_or_else(|| "default".to_string());

            // Unknown parent: report, rebind to default.
            let parent = if table.contains_key(&parent) {
                parent
            } else {
                reporter.reference_error(format!(
                    "type `{name}` inherits from unknown type `{parent}`, rebinding to `default`"
                ));
                if let Some(profile) = table.get_mut(name) {
                    profile.inherits = Some("default".to_string());
                }
                "default".to_string()
            };

            // Ready only once the parent has completed resolution, so
            // a child never copies incomplete data.
            if !done.contains(&parent) {
                continue;
            }

            let parent_profile = table.get(&parent).cloned().unwrap_or_default();
            if let Some(profile) = table.get_mut(name) {
                profile.fill_from(&parent_profile);
                profile.inherits = Some("default".to_string());
            }
            done.insert(name.clone());
            progress = true;
        }

        if !progress {
            // A stalled pass means the remaining types form a cycle.
            // Break it by rebinding them all to `default`; the next
            // pass resolves them.
            let stuck: Vec<String> = names
                .iter()
                .filter(|n| !done.contains(*n))
                .cloned()
                .collect();
            reporter.reference_error(format!(
                "inheritance cycle among types: {}; rebinding to `default`",
                stuck.join(", ")
            ));
            for name in &stuck {
                if let Some(profile) = table.get_mut(name) {
                    profile.inherits = Some("default".to_string());
                }
            }
        }
    }

    Ok(table
        .into_iter()
        .map(|(name, profile)| (name, TypeProfile::from_raw(profile)))
        .collect())
}

// ============================================================================
// tests
// ============================================================================
