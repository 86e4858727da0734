//! Stages 6 and 7: tag synonym substitution and whitespace compression.

use crate::doc::RenderedDocument;
use crate::mask::MaskStore;
use regex::{Captures, Regex};
use std::sync::LazyLock;

// ============================================================================
// Stage 6: tag synonyms (compress level 2)
// ============================================================================

static RE_STRONG_OPEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<strong\b([^>]*)>").expect("valid regex"));
static RE_STRONG_CLOSE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)</strong\s*>").expect("valid regex"));
static RE_EM_OPEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<em\b([^>]*)>").expect("valid regex"));
static RE_EM_CLOSE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)</em\s*>").expect("valid regex"));

/// `<strong>` becomes `<b>` and `<em>` becomes `<i>`, attributes kept.
pub fn synonyms(doc: &mut RenderedDocument) {
    doc.text = RE_STRONG_OPEN.replace_all(&doc.text, "<b${1}>").into_owned();
    doc.text = RE_STRONG_CLOSE.replace_all(&doc.text, "</b>").into_owned();
    doc.text = RE_EM_OPEN.replace_all(&doc.text, "<i${1}>").into_owned();
    doc.text = RE_EM_CLOSE.replace_all(&doc.text, "</i>").into_owned();
}

// ============================================================================
// Stage 7: whitespace compression (compress level 1+)
// ============================================================================

static RE_PRE_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<pre\b[^>]*>.*?</pre>").expect("valid regex"));

static RE_WS_CHAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[ \t\n]").expect("valid regex"));

static RE_WS_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[ \t\n]{2,}").expect("valid regex"));

static RE_BETWEEN_TAGS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r">[ \t\n]+<").expect("valid regex"));

static RE_BEFORE_CLOSE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[ \t\n]+</").expect("valid regex"));

static RE_CSS_PUNCT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[ \t\n]*([{}:;,])[ \t\n]*").expect("valid regex"));

/// Tags whose surrounding whitespace carries no rendering meaning.
/// `\b` keeps `<pre>` and `<link>` out of the `p`/`li` matches.
static RE_BLOCK_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)[ \t\n]*(</?(?:blockquote|br|center|div|font|li|p|table|td|th|tr|ul|wbr)\b[^>]*>)[ \t\n]*",
    )
    .expect("valid regex")
});

/// Closing tags the HTML grammar makes optional outside strict mode.
static RE_OPTIONAL_CLOSE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)</(?:li|p|dd|dt)\s*>").expect("valid regex"));

pub fn whitespace(doc: &mut RenderedDocument, type_name: &str, pre_mask: &mut MaskStore) {
    // Shield every whitespace character inside <pre> regions first.
    // Repeat until stable so a region revealed by an earlier masking
    // pass cannot slip through.
    loop {
        let mut found = false;
        let masked = RE_PRE_BLOCK
            .replace_all(&doc.text, |caps: &Captures<'_>| {
                if RE_WS_CHAR.is_match(&caps[0]) {
                    found = true;
                    pre_mask.mask(&caps[0], &RE_WS_CHAR)
                } else {
                    caps[0].to_string()
                }
            })
            .into_owned();
        if !found {
            break;
        }
        doc.text = masked;
        doc.wrap_enabled = false;
    }

    doc.text = RE_WS_RUN.replace_all(&doc.text, " ").into_owned();
    doc.text = doc.text.trim().to_string();
    doc.text = RE_BETWEEN_TAGS.replace_all(&doc.text, "><").into_owned();
    doc.text = RE_BEFORE_CLOSE.replace_all(&doc.text, "</").into_owned();

    if type_name == "css" {
        doc.text = RE_CSS_PUNCT.replace_all(&doc.text, "${1}").into_owned();
        doc.text = doc.text.replace(";}", "}");
    } else {
        doc.text = RE_BLOCK_TAG.replace_all(&doc.text, "${1}").into_owned();
        if !doc.is_xml && !doc.is_strict {
            doc.text = RE_OPTIONAL_CLOSE.replace_all(&doc.text, "").into_owned();
        }
    }
}
