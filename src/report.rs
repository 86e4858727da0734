//! Runtime diagnostics collector.
//!
//! Recoverable conditions (unknown type, stray macro token, broken
//! link, ...) never abort a run: they are logged as they occur and
//! recorded here so the driver can print a summary and tests can
//! assert on them. Only I/O failures and a broken configuration abort,
//! and those travel as `anyhow` errors instead.

use crate::{debug, log};

// ============================================================================
// Diagnostic kinds
// ============================================================================

/// Classification of a recoverable condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagKind {
    /// Unknown `inherits` target or unknown file-extension type,
    /// recovered by rebinding to `default`.
    Reference,
    /// Non-UNIX line endings were normalized.
    Encoding,
    /// A macro delimiter survived the full pipeline unexpanded.
    UnresolvedToken,
    /// Broken hyperlink (missing file, non-2xx response).
    LinkError,
    /// Suspicious but not provably broken hyperlink.
    LinkWarning,
}

impl DiagKind {
    /// Whether this kind counts as an error (vs. a warning) in the summary.
    pub const fn is_error(self) -> bool {
        matches!(
            self,
            Self::Reference | Self::UnresolvedToken | Self::LinkError
        )
    }
}

/// One recorded diagnostic.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub kind: DiagKind,
    pub message: String,
}

// ============================================================================
// Reporter
// ============================================================================

/// Collects diagnostics for the whole run.
///
/// Every push also logs immediately, so the user sees problems in file
/// order rather than in a batch at the end.
#[derive(Debug, Default)]
pub struct Reporter {
    items: Vec<Diagnostic>,
}

impl Reporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an unknown-reference recovery (rebinding to `default`).
    pub fn reference_error(&mut self, message: impl Into<String>) {
        self.push(DiagKind::Reference, message.into());
    }

    /// Record a line-ending normalization warning.
    pub fn encoding_warning(&mut self, message: impl Into<String>) {
        self.push(DiagKind::Encoding, message.into());
    }

    /// Record a leftover macro delimiter found after the full pipeline.
    pub fn unresolved_token(&mut self, message: impl Into<String>) {
        self.push(DiagKind::UnresolvedToken, message.into());
    }

    /// Record a broken hyperlink.
    pub fn link_error(&mut self, message: impl Into<String>) {
        self.push(DiagKind::LinkError, message.into());
    }

    /// Record a suspicious hyperlink.
    pub fn link_warning(&mut self, message: impl Into<String>) {
        self.push(DiagKind::LinkWarning, message.into());
    }

    fn push(&mut self, kind: DiagKind, message: String) {
        match kind {
            DiagKind::Reference | DiagKind::UnresolvedToken => {
                log!("error"; "{}", message);
            }
            DiagKind::Encoding | DiagKind::LinkWarning => {
                log!("warning"; "{}", message);
            }
            DiagKind::LinkError => log!("link"; "{}", message),
        }
        self.items.push(Diagnostic { kind, message });
    }

    pub fn items(&self) -> &[Diagnostic] {
        &self.items
    }

    pub fn error_count(&self) -> usize {
        self.items.iter().filter(|d| d.kind.is_error()).count()
    }

    pub fn warning_count(&self) -> usize {
        self.items.iter().filter(|d| !d.kind.is_error()).count()
    }

    /// Print the end-of-run summary (verbose only when clean).
    pub fn summarize(&self, files: usize) {
        let errors = self.error_count();
        let warnings = self.warning_count();
        if errors == 0 && warnings == 0 {
            debug!("done"; "{} file(s), no diagnostics", files);
        } else {
            log!(
                "done";
                "{} file(s), {} error(s), {} warning(s)",
                files, errors, warnings
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_split_by_severity() {
        let mut r = Reporter::new();
        r.reference_error("unknown type `foo`");
        r.encoding_warning("DOS line endings");
        r.link_error("404 on /missing");
        r.link_warning("odd fragment");
        assert_eq!(r.error_count(), 2);
        assert_eq!(r.warning_count(), 2);
        assert_eq!(r.items().len(), 4);
    }

    #[test]
    fn test_kind_severity() {
        assert!(DiagKind::Reference.is_error());
        assert!(DiagKind::UnresolvedToken.is_error());
        assert!(DiagKind::LinkError.is_error());
        assert!(!DiagKind::Encoding.is_error());
        assert!(!DiagKind::LinkWarning.is_error());
    }
}
