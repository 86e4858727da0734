//! Per-file document state threaded through the rewrite pipeline.

// ============================================================================
// RenderedDocument
// ============================================================================

/// The mutable full-text buffer for one input file, plus the derived
/// state later stages depend on.
///
/// Created from the raw file contents, mutated in place by every
/// pipeline stage, then handed verbatim to the output writer. Nothing
/// survives across files.
#[derive(Debug)]
pub struct RenderedDocument {
    /// Whole-file text buffer.
    pub text: String,
    /// Set once an XML/XHTML prolog is detected.
    pub is_xml: bool,
    /// Version from the XML prolog, default "1.0".
    pub xml_version: String,
    /// Set when a `<<doctype strict>>` macro was expanded; strict
    /// documents keep their optional closing tags.
    pub is_strict: bool,
    /// May be forced off mid-pipeline by script blocks, `<pre>` blocks
    /// or an explicit no-wrap macro.
    pub wrap_enabled: bool,
}

impl RenderedDocument {
    pub fn new(text: String) -> Self {
        Self {
            text,
            is_xml: false,
            xml_version: "1.0".to_string(),
            is_strict: false,
            wrap_enabled: true,
        }
    }
}

// ============================================================================
// RenderContext
// ============================================================================

/// Run-wide values substituted by the macro stage.
///
/// Computed once at startup and shared read-only across files (the
/// filename is the only per-file part).
#[derive(Debug, Clone)]
pub struct RenderContext<'a> {
    /// Input filename, substituted for `<<file>>`.
    pub filename: &'a str,
    /// Locale-formatted timestamp, substituted for `<<longdate>>`.
    pub long_date: &'a str,
    /// Configurably-formatted date, substituted for `<<date>>`.
    pub short_date: &'a str,
}
