//! Reversible placeholder masking.
//!
//! Pipeline stages shield regions of the buffer (script comment
//! delimiters, SSI directives, preformatted whitespace) from later
//! destructive passes by swapping them for short inert tokens, then
//! restoring them verbatim once the destructive pass is done.
//!
//! Each purpose gets its own [`TokenFamily`] with a distinct sentinel
//! byte, so nested or parallel maskings can never collide. Tokens
//! contain no whitespace and no markup characters, which keeps them
//! invisible to whitespace compression, comment stripping and wrapping.

use regex::Regex;

// ============================================================================
// Token families
// ============================================================================

/// Which masking purpose a store serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenFamily {
    /// `<!--` / `-->` inside `<script>` bodies.
    ScriptComment,
    /// Whole server-side-include directive comments.
    SsiDirective,
    /// Literal space/tab/newline inside `<pre>` blocks.
    PreWhitespace,
}

impl TokenFamily {
    /// Sentinel delimiting this family's tokens. C0 control characters
    /// never occur in text that survives prolog normalization, and no
    /// two families share one.
    const fn sentinel(self) -> char {
        match self {
            Self::ScriptComment => '\u{11}',
            Self::SsiDirective => '\u{12}',
            Self::PreWhitespace => '\u{13}',
        }
    }
}

// ============================================================================
// MaskStore
// ============================================================================

/// One family's mask substitutions for one document.
///
/// `mask` replaces every match of a pattern with a unique token and
/// records the original; `unmask` reverses exactly those
/// substitutions. Round trip is lossless:
/// `unmask(mask(buffer)) == buffer`.
#[derive(Debug)]
pub struct MaskStore {
    family: TokenFamily,
    saved: Vec<String>,
}

impl MaskStore {
    pub fn new(family: TokenFamily) -> Self {
        Self {
            family,
            saved: Vec::new(),
        }
    }

    fn token(sentinel: char, index: usize) -> String {
        format!("{sentinel}{index}{sentinel}")
    }

    /// Replace every match of `pattern` with a fresh token.
    pub fn mask(&mut self, text: &str, pattern: &Regex) -> String {
        let sentinel = self.family.sentinel();
        let saved = &mut self.saved;
        pattern
            .replace_all(text, |caps: &regex::Captures<'_>| {
                let index = saved.len();
                saved.push(caps[0].to_string());
                Self::token(sentinel, index)
            })
            .into_owned()
    }

    /// Restore every token to its original text.
    pub fn unmask(&self, text: &str) -> String {
        self.unmask_with(text, |original| original.to_string())
    }

    /// Restore every token through a rewrite function.
    ///
    /// Used by script recovery, which re-emits each comment delimiter
    /// with a trailing newline for readability.
    pub fn unmask_with(&self, text: &str, rewrite: impl Fn(&str) -> String) -> String {
        let sentinel = self.family.sentinel();
        let mut out = text.to_string();
        for (index, original) in self.saved.iter().enumerate() {
            let token = Self::token(sentinel, index);
            if out.contains(&token) {
                out = out.replace(&token, &rewrite(original));
            }
        }
        out
    }

    pub fn len(&self) -> usize {
        self.saved.len()
    }

    pub fn is_empty(&self) -> bool {
        self.saved.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::LazyLock;

    static RE_DELIM: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<!--|-->").unwrap());
    static RE_WS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[ \t\n]").unwrap());

    #[test]
    fn test_round_trip_script_family() {
        let input = "<script>\n<!-- code();\n// done -->\n</script>";
        let mut store = MaskStore::new(TokenFamily::ScriptComment);
        let masked = store.mask(input, &RE_DELIM);
        assert!(!masked.contains("<!--"));
        assert!(!masked.contains("-->"));
        assert_eq!(store.unmask(&masked), input);
    }

    #[test]
    fn test_round_trip_whitespace_family() {
        let input = "a \tb\nc";
        let mut store = MaskStore::new(TokenFamily::PreWhitespace);
        let masked = store.mask(input, &RE_WS);
        assert!(!masked.contains(' '));
        assert!(!masked.contains('\t'));
        assert!(!masked.contains('\n'));
        assert_eq!(store.unmask(&masked), input);
    }

    #[test]
    fn test_families_do_not_collide() {
        let input = "x <!-- y --> z";
        let mut script = MaskStore::new(TokenFamily::ScriptComment);
        let mut pre = MaskStore::new(TokenFamily::PreWhitespace);
        let masked = script.mask(input, &RE_DELIM);
        let masked = pre.mask(&masked, &RE_WS);
        // Unmask in either order; both must restore fully.
        let restored = script.unmask(&pre.unmask(&masked));
        assert_eq!(restored, input);
    }

    #[test]
    fn test_tokens_unique_past_ten() {
        // Token 1 must not match inside token 12.
        let input = "a a a a a a a a a a a a a";
        let mut store = MaskStore::new(TokenFamily::PreWhitespace);
        let masked = store.mask(input, &RE_WS);
        assert_eq!(store.len(), 12);
        assert_eq!(store.unmask(&masked), input);
    }

    #[test]
    fn test_unmask_with_rewrites() {
        let input = "<!--x-->";
        let mut store = MaskStore::new(TokenFamily::ScriptComment);
        let masked = store.mask(input, &RE_DELIM);
        let restored = store.unmask_with(&masked, |s| format!("{s}\n"));
        assert_eq!(restored, "<!--\nx-->\n");
    }

    #[test]
    fn test_empty_store_is_noop() {
        let store = MaskStore::new(TokenFamily::SsiDirective);
        assert!(store.is_empty());
        assert_eq!(store.unmask("untouched"), "untouched");
    }
}
