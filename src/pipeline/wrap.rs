//! Stage 10: line wrapping.
//!
//! Greedy word-wrap to the profile's column limit. A seam sentinel is
//! inserted at every `><` boundary beforehand so tag boundaries count
//! as break opportunities; a seam that did not receive a break closes
//! back to `><`, while a space the document already had stays a space.
//! A single token longer than the limit overflows its line rather than
//! being cut.

use crate::config::TypeProfile;
use crate::doc::RenderedDocument;

/// Marks a synthetic break opportunity between adjacent tags. A C0
/// control character like the mask sentinels, so it cannot occur in
/// text that survives prolog normalization.
const SEAM: char = '\u{14}';

pub fn wrap(doc: &mut RenderedDocument, profile: &TypeProfile) {
    if !doc.wrap_enabled || profile.width == 0 {
        return;
    }

    let text = doc.text.replace("><", &format!(">{SEAM}<"));

    let mut out: Vec<String> = Vec::new();
    for line in text.split('\n') {
        out.extend(wrap_line(line, profile.width));
    }
    doc.text = out.join("\n");
}

/// One word plus whether real whitespace (not a seam) preceded it.
fn tokenize(line: &str) -> Vec<(String, bool)> {
    let mut tokens: Vec<(String, bool)> = Vec::new();
    let mut word: Option<(String, bool)> = None;
    let mut gap_space = false;

    for c in line.chars() {
        if c == SEAM || c == ' ' || c == '\t' {
            if let Some(token) = word.take() {
                tokens.push(token);
                gap_space = false;
            }
            if c != SEAM {
                gap_space = true;
            }
        } else {
            match &mut word {
                Some((w, _)) => w.push(c),
                None => word = Some((String::from(c), gap_space)),
            }
        }
    }
    if let Some(token) = word.take() {
        tokens.push(token);
    }
    tokens
}

fn wrap_line(line: &str, width: usize) -> Vec<String> {
    let mut lines: Vec<String> = Vec::new();
    let mut current = String::new();

    for (word, spaced) in tokenize(line) {
        let sep = usize::from(spaced);
        if current.is_empty() {
            current = word;
        } else if current.len() + sep + word.len() <= width {
            if spaced {
                current.push(' ');
            }
            current.push_str(&word);
        } else {
            lines.push(std::mem::take(&mut current));
            current = word;
        }
    }

    lines.push(current);
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(width: usize) -> TypeProfile {
        TypeProfile {
            info: String::new(),
            compress: 1,
            non_ascii: 1,
            width,
            creator: String::new(),
            out_ext: None,
        }
    }

    fn run(text: &str, width: usize) -> String {
        let mut doc = RenderedDocument::new(text.to_string());
        wrap(&mut doc, &profile(width));
        doc.text
    }

    #[test]
    fn test_width_zero_is_noop() {
        assert_eq!(run("a b c", 0), "a b c");
    }

    #[test]
    fn test_disabled_is_noop() {
        let mut doc = RenderedDocument::new("a b c d e".to_string());
        doc.wrap_enabled = false;
        wrap(&mut doc, &profile(3));
        assert_eq!(doc.text, "a b c d e");
    }

    #[test]
    fn test_greedy_wrap() {
        assert_eq!(run("aa bb cc dd", 5), "aa bb\ncc dd");
    }

    #[test]
    fn test_no_line_exceeds_width() {
        let out = run("one two three four five six seven", 10);
        for line in out.split('\n') {
            assert!(line.len() <= 10, "line too long: {line:?}");
        }
    }

    #[test]
    fn test_overlong_token_overflows() {
        let out = run("short aaaaaaaaaaaaaaaaaaaa end", 8);
        assert!(out.contains("aaaaaaaaaaaaaaaaaaaa"));
    }

    #[test]
    fn test_tag_seam_is_break_opportunity() {
        let out = run("<td>aaa</td><td>bbb</td>", 14);
        assert_eq!(out, "<td>aaa</td>\n<td>bbb</td>");
    }

    #[test]
    fn test_wrap_conserves_content() {
        let input = "one two three four five six";
        let out = run(input, 10);
        // Breaks back to spaces reproduces the collapsed original.
        assert_eq!(out.replace('\n', " "), input);
    }

    #[test]
    fn test_unused_seams_closed() {
        assert_eq!(run("<b>a</b><i>b</i>", 76), "<b>a</b><i>b</i>");
    }

    #[test]
    fn test_inter_tag_space_in_source_kept() {
        // A space the document already had between inline tags is not
        // a seam and must survive an unbroken line.
        assert_eq!(run("<b>a</b> <i>b</i>", 76), "<b>a</b> <i>b</i>");
    }

    #[test]
    fn test_seam_and_space_mix() {
        let out = run("x <b>a</b><i>b</i> y", 76);
        assert_eq!(out, "x <b>a</b><i>b</i> y");
    }

    #[test]
    fn test_blank_lines_preserved() {
        assert_eq!(run("a\n\nb", 76), "a\n\nb");
    }
}
