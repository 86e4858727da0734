//! Stage 1: prolog detection and input normalization.
//!
//! Detects a leading XML declaration, normalizes line endings to UNIX
//! `\n` (with a warning when anything else was present) and truncates
//! everything from a literal `__END__` marker line onward.

use crate::doc::RenderedDocument;
use crate::report::Reporter;
use regex::Regex;
use std::sync::LazyLock;

static RE_XML_PROLOG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\s*<\?xml\b([^?]*)\?>").expect("valid regex"));

static RE_XML_VERSION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)version\s*=\s*"([^"]+)""#).expect("valid regex"));

/// Marker truncating the rest of the buffer, borrowed from the Perl
/// data-section convention.
const END_MARKER: &str = "\n__END__\n";

pub fn normalize(doc: &mut RenderedDocument, filename: &str, reporter: &mut Reporter) {
    // XML/XHTML prolog.
    if let Some(caps) = RE_XML_PROLOG.captures(&doc.text) {
        doc.is_xml = true;
        if let Some(version) = RE_XML_VERSION
            .captures(&caps[1])
            .and_then(|v| v.get(1).map(|m| m.as_str().to_string()))
        {
            doc.xml_version = version;
        }
    }

    // Line endings: CRLF, bare CR and form feeds all become \n.
    if doc.text.contains('\r') || doc.text.contains('\u{c}') {
        doc.text = doc
            .text
            .replace("\r\n", "\n")
            .replace('\r', "\n")
            .replace('\u{c}', "\n");
        reporter.encoding_warning(format!("{filename}: non-UNIX line endings normalized"));
    }

    // Everything after an __END__ line is discarded.
    if let Some(pos) = doc.text.find(END_MARKER) {
        doc.text.truncate(pos + 1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(text: &str) -> (RenderedDocument, Reporter) {
        let mut doc = RenderedDocument::new(text.to_string());
        let mut reporter = Reporter::new();
        normalize(&mut doc, "test.html", &mut reporter);
        (doc, reporter)
    }

    #[test]
    fn test_plain_html_not_xml() {
        let (doc, reporter) = run("<html><body>x</body></html>");
        assert!(!doc.is_xml);
        assert_eq!(doc.xml_version, "1.0");
        assert_eq!(reporter.warning_count(), 0);
    }

    #[test]
    fn test_xml_prolog_detected() {
        let (doc, _) = run("<?xml version=\"1.1\" encoding=\"utf-8\"?>\n<html/>");
        assert!(doc.is_xml);
        assert_eq!(doc.xml_version, "1.1");
    }

    #[test]
    fn test_prolog_case_insensitive() {
        let (doc, _) = run("<?XML Version=\"1.0\"?>\n<html/>");
        assert!(doc.is_xml);
        assert_eq!(doc.xml_version, "1.0");
    }

    #[test]
    fn test_crlf_normalized_with_warning() {
        let (doc, reporter) = run("a\r\nb\rc\u{c}d");
        assert_eq!(doc.text, "a\nb\nc\nd");
        assert_eq!(reporter.warning_count(), 1);
    }

    #[test]
    fn test_end_marker_truncates() {
        let (doc, _) = run("keep\n__END__\nnotes to self\n");
        assert_eq!(doc.text, "keep\n");
    }

    #[test]
    fn test_end_marker_must_own_its_line() {
        let (doc, _) = run("not __END__ inline\nmore\n");
        assert!(doc.text.contains("more"));
    }
}
