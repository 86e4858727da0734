//! Stage 11: final restoration and leftover-macro scan.

use crate::config::MacroConfig;
use crate::doc::RenderedDocument;
use crate::mask::MaskStore;
use crate::report::Reporter;

pub fn finish(
    doc: &mut RenderedDocument,
    pre_mask: &MaskStore,
    macros: &MacroConfig,
    filename: &str,
    reporter: &mut Reporter,
) {
    if !pre_mask.is_empty() {
        doc.text = pre_mask.unmask(&doc.text);
    }

    // Anything still shaped like a macro at this point was misspelled
    // or unknown. Reported, never removed.
    let re = macros.leftover();
    for m in re.find_iter(&doc.text) {
        reporter.unresolved_token(format!("{filename}: unexpanded macro `{}`", m.as_str()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mask::TokenFamily;
    use regex::Regex;

    #[test]
    fn test_pre_whitespace_restored() {
        let ws = Regex::new(r"[ \t\n]").unwrap();
        let mut mask = MaskStore::new(TokenFamily::PreWhitespace);
        let masked = mask.mask("<pre>a \tb</pre>", &ws);
        let mut doc = RenderedDocument::new(masked);
        let mut reporter = Reporter::new();
        finish(&mut doc, &mask, &MacroConfig::default(), "f.html", &mut reporter);
        assert_eq!(doc.text, "<pre>a \tb</pre>");
        assert_eq!(reporter.error_count(), 0);
    }

    #[test]
    fn test_leftover_macro_reported_not_removed() {
        let mut doc = RenderedDocument::new("x <<unknowable>> y".to_string());
        let mask = MaskStore::new(TokenFamily::PreWhitespace);
        let mut reporter = Reporter::new();
        finish(&mut doc, &mask, &MacroConfig::default(), "f.html", &mut reporter);
        assert_eq!(doc.text, "x <<unknowable>> y");
        assert_eq!(reporter.error_count(), 1);
        assert!(reporter.items()[0].message.contains("unknowable"));
    }

    #[test]
    fn test_clean_buffer_reports_nothing() {
        let mut doc = RenderedDocument::new("<html>fine</html>".to_string());
        let mask = MaskStore::new(TokenFamily::PreWhitespace);
        let mut reporter = Reporter::new();
        finish(&mut doc, &mask, &MacroConfig::default(), "f.html", &mut reporter);
        assert_eq!(reporter.error_count(), 0);
    }
}
