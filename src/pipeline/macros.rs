//! Stages 2 and 3: macro expansion and doctype synthesis.
//!
//! Macros are recognized in both delimiter styles, case-insensitively.
//! `<<doctype MODE>>` becomes a canonical declaration whose shape
//! depends on whether an XML prolog was detected; XML documents also
//! get their markup nudged toward XHTML (namespace on `<html>`,
//! `application/xml` content type, self-closed void tags).

use crate::config::MacroConfig;
use crate::doc::{RenderContext, RenderedDocument};
use regex::{Captures, Regex};
use std::sync::LazyLock;

// ============================================================================
// Stage 2: macro expansion
// ============================================================================

pub fn expand(doc: &mut RenderedDocument, ctx: &RenderContext<'_>, macros: &MacroConfig) {
    let substitutions = [
        ("longdate", ctx.long_date),
        ("date", ctx.short_date),
        ("file", ctx.filename),
    ];
    for (keyword, value) in substitutions {
        let re = macros.keyword(keyword);
        if re.is_match(&doc.text) {
            doc.text = re.replace_all(&doc.text, |_: &Captures<'_>| value.to_string()).into_owned();
        }
    }

    // nowrap is removed and disables wrapping for the rest of this
    // document.
    let re = macros.keyword("nowrap");
    if re.is_match(&doc.text) {
        doc.wrap_enabled = false;
        doc.text = re.replace_all(&doc.text, "").into_owned();
    }
}

// ============================================================================
// Stage 3: doctype synthesis
// ============================================================================

pub fn doctype(doc: &mut RenderedDocument, macros: &MacroConfig) {
    let re = macros.keyword_arg("doctype", "strict|transitional|frameset");
    // Each macro keeps its own MODE; any strict one marks the document
    // strict.
    let mut strict = false;
    let rewritten = re
        .replace_all(&doc.text, |caps: &Captures<'_>| {
            let mode = caps
                .get(1)
                .or_else(|| caps.get(2))
                .map(|m| m.as_str().to_ascii_lowercase())
                .unwrap_or_else(|| "strict".to_string());
            if mode == "strict" {
                strict = true;
            }
            declaration(doc, &mode)
        })
        .into_owned();
    doc.text = rewritten;
    if strict {
        doc.is_strict = true;
    }

    if doc.is_xml {
        xml_fixups(doc);
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

/// The canonical declaration for a document and mode.
fn declaration(doc: &RenderedDocument, mode: &str) -> String {
    if doc.is_xml {
        if doc.xml_version == "1.0" {
            if mode == "strict" {
                "<!DOCTYPE html PUBLIC \"-//W3C//DTD XHTML 1.0//EN\" \
                 \"http://www.w3.org/TR/xhtml1/DTD/xhtml1.dtd\">"
                    .to_string()
            } else {
                let path = if mode == "transitional" { "loose" } else { mode };
                format!(
                    "<!DOCTYPE html PUBLIC \"-//W3C//DTD XHTML 1.0 {}//EN\" \
                     \"http://www.w3.org/TR/xhtml1/DTD/xhtml1-{path}.dtd\">",
                    capitalize(mode)
                )
            }
        } else {
            // Any other declared XML version ignores MODE; dots are
            // stripped for the DTD path segment.
            let squashed: String = doc.xml_version.chars().filter(|c| *c != '.').collect();
            format!(
                "<!DOCTYPE html PUBLIC \"-//W3C//DTD XHTML {}//EN\" \
                 \"http://www.w3.org/TR/xhtml{squashed}/DTD/xhtml{squashed}.dtd\">",
                doc.xml_version
            )
        }
    } else if mode == "strict" {
        "<!DOCTYPE HTML PUBLIC \"-//W3C//DTD HTML 4.01//EN\" \
         \"http://www.w3.org/TR/html4/strict.dtd\">"
            .to_string()
    } else {
        let path = if mode == "transitional" { "loose" } else { mode };
        format!(
            "<!DOCTYPE HTML PUBLIC \"-//W3C//DTD HTML 4.01 {}//EN\" \
             \"http://www.w3.org/TR/html4/{path}.dtd\">",
            capitalize(mode)
        )
    }
}

// ============================================================================
// XML fixups
// ============================================================================

static RE_HTML_BARE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<html\s*>").expect("valid regex"));

static RE_HTML_LANG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)<html\s+lang\s*=\s*"([^"]*)"\s*>"#).expect("valid regex"));

static RE_VOID_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<(br|hr|link|meta|img)\b([^>]*?)\s*/?>").expect("valid regex"));

const XHTML_NS: &str = "http://www.w3.org/1999/xhtml";

fn xml_fixups(doc: &mut RenderedDocument) {
    doc.text = RE_HTML_BARE
        .replace(&doc.text, format!("<html xmlns=\"{XHTML_NS}\">"))
        .into_owned();
    doc.text = RE_HTML_LANG
        .replace(&doc.text, |caps: &Captures<'_>| {
            let lang = &caps[1];
            format!("<html xmlns=\"{XHTML_NS}\" lang=\"{lang}\" xml:lang=\"{lang}\">")
        })
        .into_owned();

    doc.text = doc.text.replace("\"text/html\"", "\"application/xml\"");

    doc.text = RE_VOID_TAG
        .replace_all(&doc.text, |caps: &Captures<'_>| {
            let tag = caps[1].to_ascii_lowercase();
            let attrs = caps[2].trim_end();
            format!("<{tag}{attrs} />")
        })
        .into_owned();
}

// ============================================================================
// tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> RenderContext<'static> {
        RenderContext {
            filename: "index.html",
            long_date: "Friday, 01 August 2025 12:00:00",
            short_date: "01 August 2025",
        }
    }

    fn html_doc(text: &str) -> RenderedDocument {
        RenderedDocument::new(text.to_string())
    }

    fn xml_doc(text: &str) -> RenderedDocument {
        let mut doc = RenderedDocument::new(text.to_string());
        doc.is_xml = true;
        doc
    }

    #[test]
    fn test_expand_all_keywords() {
        let mut doc = html_doc("<<file>> updated <<date>> at <:LONGDATE:>");
        expand(&mut doc, &ctx(), &MacroConfig::default());
        assert_eq!(
            doc.text,
            "index.html updated 01 August 2025 at Friday, 01 August 2025 12:00:00"
        );
    }

    #[test]
    fn test_nowrap_removed_and_disables_wrap() {
        let mut doc = html_doc("a<<nowrap>>b");
        expand(&mut doc, &ctx(), &MacroConfig::default());
        assert_eq!(doc.text, "ab");
        assert!(!doc.wrap_enabled);
    }

    #[test]
    fn test_doctype_html_strict() {
        let mut doc = html_doc("<<doctype strict>>\n<html></html>");
        doctype(&mut doc, &MacroConfig::default());
        assert!(doc.text.starts_with(
            "<!DOCTYPE HTML PUBLIC \"-//W3C//DTD HTML 4.01//EN\" \
             \"http://www.w3.org/TR/html4/strict.dtd\">"
        ));
        assert!(doc.is_strict);
    }

    #[test]
    fn test_doctype_html_transitional_maps_loose() {
        let mut doc = html_doc("<<doctype transitional>>");
        doctype(&mut doc, &MacroConfig::default());
        assert!(doc.text.contains("HTML 4.01 Transitional//EN"));
        assert!(doc.text.contains("html4/loose.dtd"));
        assert!(!doc.is_strict);
    }

    #[test]
    fn test_each_doctype_macro_keeps_its_mode() {
        let mut doc = html_doc("<<doctype strict>>\nbody\n<:doctype frameset:>");
        doctype(&mut doc, &MacroConfig::default());
        assert!(doc.text.contains("html4/strict.dtd"));
        assert!(doc.text.contains("HTML 4.01 Frameset//EN"));
        assert!(doc.text.contains("html4/frameset.dtd"));
        assert!(doc.is_strict);
    }

    #[test]
    fn test_doctype_xhtml_10() {
        let mut doc = xml_doc("<:doctype frameset:>");
        doctype(&mut doc, &MacroConfig::default());
        assert!(doc.text.contains("XHTML 1.0 Frameset//EN"));
        assert!(doc.text.contains("xhtml1/DTD/xhtml1-frameset.dtd"));
    }

    #[test]
    fn test_doctype_xhtml_other_version_ignores_mode() {
        let mut doc = xml_doc("<<doctype transitional>>");
        doc.xml_version = "1.1".to_string();
        doctype(&mut doc, &MacroConfig::default());
        assert!(doc.text.contains("XHTML 1.1//EN"));
        assert!(doc.text.contains("xhtml11/DTD/xhtml11.dtd"));
        assert!(!doc.text.contains("Transitional"));
    }

    #[test]
    fn test_xml_fixups_namespace_and_voids() {
        let mut doc = xml_doc("<html LANG=\"en\"><META charset=\"utf-8\"><BR></html>");
        doctype(&mut doc, &MacroConfig::default());
        assert!(doc.text.contains(
            "<html xmlns=\"http://www.w3.org/1999/xhtml\" lang=\"en\" xml:lang=\"en\">"
        ));
        assert!(doc.text.contains("<meta charset=\"utf-8\" />"));
        assert!(doc.text.contains("<br />"));
    }

    #[test]
    fn test_xml_fixups_content_type() {
        let mut doc = xml_doc("<meta content=\"text/html\" http-equiv=\"Content-Type\">");
        doctype(&mut doc, &MacroConfig::default());
        assert!(doc.text.contains("\"application/xml\""));
    }

    #[test]
    fn test_html_doc_untouched_by_xml_fixups() {
        let mut doc = html_doc("<br>");
        doctype(&mut doc, &MacroConfig::default());
        assert_eq!(doc.text, "<br>");
    }
}
