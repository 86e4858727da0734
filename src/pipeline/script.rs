//! Stage 9: script readability recovery.
//!
//! Compression flattens script bodies onto one line. When a document
//! contains scripts, statement boundaries get their newlines back and
//! the masked comment delimiters return, each on its own line, so the
//! hiding convention still parses. Wrapping is disabled for such
//! documents since a wrap inside a script changes its meaning.

use crate::doc::RenderedDocument;
use crate::mask::MaskStore;

pub fn recover(doc: &mut RenderedDocument, script_mask: &MaskStore) {
    if doc.text.contains("</script>") {
        doc.wrap_enabled = false;
        doc.text = doc.text.replace(");", ");\n");
    }

    if !script_mask.is_empty() {
        doc.text = script_mask.unmask_with(&doc.text, |original| format!("{original}\n"));
    }
}
