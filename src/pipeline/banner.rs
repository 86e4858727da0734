//! Stage 8: banner comment insertion.
//!
//! Runs after comment removal so the banner is the one comment the
//! output keeps.

use crate::doc::RenderedDocument;
use regex::Regex;
use std::sync::LazyLock;

static RE_HTML_OPEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<html\b[^>]*>").expect("valid regex"));

pub fn insert(doc: &mut RenderedDocument, type_name: &str, banner: Option<&str>) {
    let Some(text) = banner else { return };

    if type_name == "css" {
        doc.text = format!("/* {text} */\n{}", doc.text);
    } else if let Some(m) = RE_HTML_OPEN.find(&doc.text) {
        let at = m.end();
        doc.text.insert_str(at, &format!("\n<!-- {text} -->"));
    } else {
        doc.text = format!("<!-- {text} -->\n{}", doc.text);
    }
}
