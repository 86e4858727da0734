//! Stage 5: comment removal.
//!
//! Script-embedded comment delimiters and SSI directive comments are
//! masked first so the generic strippers cannot touch them. The SSI
//! mask is reversed at the end of this stage; the script mask survives
//! until the recovery stage after compression.

use crate::doc::RenderedDocument;
use crate::mask::MaskStore;
use regex::{Captures, Regex};
use std::sync::LazyLock;

static RE_SCRIPT_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<script\b.*?</script>").expect("valid regex"));

static RE_COMMENT_DELIM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<!--|-->").expect("valid regex"));

/// The fixed directive-name set; anything else is an ordinary comment.
static RE_SSI_DIRECTIVE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<!--#(?:set|if|elif|else|endif|config|echo|exec|include)\b.*?-->")
        .expect("valid regex")
});

static RE_BLOCK_COMMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)/\*.*?\*/").expect("valid regex"));

/// `//` to end of line, only at line start or after whitespace so
/// `http://` survives.
static RE_LINE_COMMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)(^|[ \t])//[^\n]*").expect("valid regex"));

/// `#` to end of line, only after whitespace so fragments like
/// `href="#top"` and entities like `&#160;` survive.
static RE_HASH_COMMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)(^|[ \t])#[^\n]*").expect("valid regex"));

pub fn strip(
    doc: &mut RenderedDocument,
    type_name: &str,
    script_mask: &mut MaskStore,
    ssi_mask: &mut MaskStore,
) {
    // Shield comment delimiters inside script bodies.
    doc.text = RE_SCRIPT_BLOCK
        .replace_all(&doc.text, |caps: &Captures<'_>| {
            script_mask.mask(&caps[0], &RE_COMMENT_DELIM)
        })
        .into_owned();

    // Shield whole SSI directives.
    doc.text = ssi_mask.mask(&doc.text, &RE_SSI_DIRECTIVE);

    let is_css = type_name == "css";
    // C-style comments never appear inside the HTML grammar otherwise
    // in scope; only strip them where they are real syntax.
    if is_css || type_name == "php" || doc.text.contains("<?php") {
        doc.text = RE_BLOCK_COMMENT.replace_all(&doc.text, "").into_owned();
        doc.text = RE_LINE_COMMENT.replace_all(&doc.text, "${1}").into_owned();
    }

    if !is_css {
        doc.text = RE_HASH_COMMENT.replace_all(&doc.text, "${1}").into_owned();
        doc.text = doc.text.replace(r"\#", "#");
    }

    doc.text = strip_html_comments(&doc.text);

    // SSI directives come back with their comment wrapper intact.
    doc.text = ssi_mask.unmask(&doc.text);
}

/// Remove `<!-- -->` comments. A comment confined to one line takes
/// the whole line with it when nothing else remains; a comment
/// spanning lines is collapsed by concatenating lines until the
/// closing marker appears.
fn strip_html_comments(text: &str) -> String {
    let mut out: Vec<String> = Vec::new();
    let mut lines = text.split('\n');

    while let Some(line) = lines.next() {
        let mut current = line.to_string();
        let mut had_comment = false;

        loop {
            let Some(open) = current.find("<!--") else {
                break;
            };
            match current[open..].find("-->") {
                Some(rel) => {
                    had_comment = true;
                    current.replace_range(open..open + rel + 3, "");
                }
                None => match lines.next() {
                    Some(next) => current.push_str(next),
                    // Unterminated comment: leave the tail as-is.
                    None => break,
                },
            }
        }

        if had_comment && current.trim().is_empty() {
            continue;
        }
        out.push(current);
    }

    out.join("\n")
}
