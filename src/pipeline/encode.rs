//! Stage 4: non-ASCII entity encoding.
//!
//! Applies Unicode canonical composition to the buffer, then rewrites
//! every character outside the safe printable-ASCII set to a character
//! reference. Raw `&`, `<` and `>` pass through untouched so the
//! surrounding markup is not corrupted; the backslash escapes `\&`,
//! `\<`, `\>` and `\ ` are the way to request an entity explicitly.

use crate::doc::RenderedDocument;
use crate::entity;
use regex::{Captures, Regex};
use std::sync::LazyLock;
use unicode_normalization::UnicodeNormalization;

static RE_LONE_AMP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\s)&(\s)").expect("valid regex"));

static RE_NAMED_ENTITY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"&([A-Za-z][A-Za-z0-9]*);").expect("valid regex"));

/// The safe set: printable ASCII plus the whitespace the pipeline
/// understands.
#[inline]
fn is_safe(c: char) -> bool {
    matches!(c, '\n' | '\r' | '\t') || (' '..='~').contains(&c)
}

pub fn entities(doc: &mut RenderedDocument) {
    // Canonical decomposition + composition first, so combining
    // sequences collapse to single code points before lookup.
    let normalized: String = doc.text.nfc().collect();

    let mut out = String::with_capacity(normalized.len());
    let mut chars = normalized.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.peek() {
                Some(' ') => {
                    chars.next();
                    out.push_str("&nbsp;");
                }
                Some('&') => {
                    chars.next();
                    out.push_str("&amp;");
                }
                Some('<') => {
                    chars.next();
                    out.push_str("&lt;");
                }
                Some('>') => {
                    chars.next();
                    out.push_str("&gt;");
                }
                _ => out.push('\\'),
            }
        } else if is_safe(c) {
            out.push(c);
        } else if doc.is_xml {
            out.push_str(&entity::encode_numeric(c));
        } else {
            out.push_str(&entity::encode_named(c));
        }
    }

    // An ampersand floating between whitespace cannot be markup; force
    // it to entity form.
    out = RE_LONE_AMP.replace_all(&out, "${1}&amp;${2}").into_owned();

    // Named entities are not presumed declared in strict XML; rewrite
    // everything except the XML built-ins to numeric form.
    if doc.is_xml {
        out = RE_NAMED_ENTITY
            .replace_all(&out, |caps: &Captures<'_>| {
                let name = &caps[1];
                if matches!(name, "amp" | "lt" | "gt" | "quot" | "apos") {
                    return caps[0].to_string();
                }
                match entity::codepoint(name) {
                    Some(code) => format!("&#x{code:X};"),
                    None => caps[0].to_string(),
                }
            })
            .into_owned();
    }

    doc.text = out;
}
