//! The per-file rewrite pipeline.
//!
//! Eleven stages in a fixed order, each mutating the shared
//! [`RenderedDocument`] in place. Hook extension points run before
//! stage 1, between comment removal and compression, and after the
//! final cleanup.

pub mod banner;
pub mod cleanup;
pub mod comments;
pub mod compress;
pub mod encode;
pub mod macros;
pub mod prolog;
pub mod script;
pub mod wrap;

use crate::config::{AppConfig, TypeProfile};
use crate::doc::{RenderContext, RenderedDocument};
use crate::hooks::RenderHooks;
use crate::mask::{MaskStore, TokenFamily};
use crate::report::Reporter;

/// Run the whole pipeline over one document.
pub fn render(
    doc: &mut RenderedDocument,
    profile: &TypeProfile,
    type_name: &str,
    ctx: &RenderContext<'_>,
    config: &AppConfig,
    hooks: &dyn RenderHooks,
    reporter: &mut Reporter,
) {
    hooks.pre(ctx.filename, type_name, &mut doc.text);

    prolog::normalize(doc, ctx.filename, reporter);
    macros::expand(doc, ctx, &config.macros);
    macros::doctype(doc, &config.macros);

    if profile.non_ascii > 0 {
        encode::entities(doc);
    }

    let mut script_mask = MaskStore::new(TokenFamily::ScriptComment);
    let mut ssi_mask = MaskStore::new(TokenFamily::SsiDirective);
    comments::strip(doc, type_name, &mut script_mask, &mut ssi_mask);

    hooks.main(ctx.filename, type_name, &mut doc.text);

    if profile.compress > 1 {
        compress::synonyms(doc);
    }
    let mut pre_mask = MaskStore::new(TokenFamily::PreWhitespace);
    if profile.compress > 0 {
        compress::whitespace(doc, type_name, &mut pre_mask);
    }

    banner::insert(doc, type_name, config.banner_line().as_deref());
    script::recover(doc, &script_mask);
    wrap::wrap(doc, profile);
    cleanup::finish(doc, &pre_mask, &config.macros, ctx.filename, reporter);

    hooks.post(ctx.filename, type_name, &mut doc.text);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hooks::NoopHooks;

    fn ctx() -> RenderContext<'static> {
        RenderContext {
            filename: "page.html",
            long_date: "Friday, 01 August 2025 12:00:00",
            short_date: "01 August 2025",
        }
    }

    fn profile(compress: u8, non_ascii: u8, width: usize) -> TypeProfile {
        TypeProfile {
            info: String::new(),
            compress,
            non_ascii,
            width,
            creator: String::new(),
            out_ext: None,
        }
    }

    fn run(text: &str, type_name: &str, profile: &TypeProfile) -> (String, Reporter) {
        let mut doc = RenderedDocument::new(text.to_string());
        let mut reporter = Reporter::new();
        render(
            &mut doc,
            profile,
            type_name,
            &ctx(),
            &AppConfig::default(),
            &NoopHooks,
            &mut reporter,
        );
        (doc.text, reporter)
    }

    #[test]
    fn test_comment_removed_and_whitespace_collapsed() {
        let (out, reporter) = run(
            "<html><!-- hi --><body>   a    b  </body></html>",
            "html",
            &profile(1, 1, 0),
        );
        assert_eq!(out, "<html><body> a b</body></html>");
        assert_eq!(reporter.error_count(), 0);
    }

    #[test]
    fn test_pre_block_byte_for_byte() {
        let inner = "line one\n\tindented  two";
        let (out, _) = run(
            &format!("<html><body>\n  <pre>{inner}</pre>\n</body></html>"),
            "html",
            &profile(1, 1, 76),
        );
        assert!(out.contains(&format!("<pre>{inner}</pre>")));
    }

    #[test]
    fn test_macros_then_encode() {
        let (out, _) = run("<p><<date>> caf\u{e9}</p>", "html", &profile(0, 1, 0));
        assert_eq!(out, "<p>01 August 2025 caf&eacute;</p>");
    }

    #[test]
    fn test_compress_zero_keeps_whitespace() {
        let (out, _) = run("a    b\n\nc", "txt", &profile(0, 0, 0));
        assert_eq!(out, "a    b\n\nc");
    }

    #[test]
    fn test_comments_stripped_even_without_compression() {
        // Comment removal is part of the base pipeline; the compress
        // tier gates whitespace and synonym passes only.
        let (out, _) = run("a\n<!-- gone -->\nb", "html", &profile(0, 0, 0));
        assert_eq!(out, "a\nb");
    }

    #[test]
    fn test_synonyms_only_at_level_two() {
        let (out, _) = run("<strong>x</strong>", "html", &profile(1, 1, 0));
        assert!(out.contains("<strong>"));
        let (out, _) = run("<strong>x</strong>", "html", &profile(2, 1, 0));
        assert_eq!(out, "<b>x</b>");
    }

    #[test]
    fn test_xhtml_end_to_end() {
        let input = "<?xml version=\"1.0\"?>\n<<doctype strict>>\n<html lang=\"en\">\n<body><br>caf\u{e9}</body>\n</html>\n";
        let (out, _) = run(input, "xml", &profile(1, 1, 0));
        assert!(out.contains("XHTML 1.0//EN"));
        assert!(out.contains("<html xmlns=\"http://www.w3.org/1999/xhtml\" lang=\"en\" xml:lang=\"en\">"));
        assert!(out.contains("<br />"));
        assert!(out.contains("caf&#xE9;"));
    }

    #[test]
    fn test_script_survives_compression() {
        let input = "<html><body>\n<script>\n<!--\nf(a);\ng(b);\n// -->\n</script>\n</body></html>";
        let (out, _) = run(input, "html", &profile(1, 1, 76));
        assert!(out.contains("<!--\n"));
        assert!(out.contains("-->\n"));
        assert!(out.contains("f(a);\n"));
        // No mask sentinels may survive.
        assert!(!out.contains('\u{11}'));
        assert!(!out.contains('\u{13}'));
    }

    #[test]
    fn test_leftover_macro_detected() {
        let (out, reporter) = run("<p><<bogus macro>></p>", "html", &profile(0, 0, 0));
        assert!(out.contains("<<bogus macro>>"));
        assert_eq!(reporter.error_count(), 1);
    }

    #[test]
    fn test_hooks_run_in_order() {
        struct Tracer;
        impl RenderHooks for Tracer {
            fn pre(&self, _f: &str, _t: &str, buffer: &mut String) {
                buffer.push_str(" pre");
            }
            fn main(&self, _f: &str, _t: &str, buffer: &mut String) {
                buffer.push_str(" main");
            }
            fn post(&self, _f: &str, _t: &str, buffer: &mut String) {
                buffer.push_str(" post");
            }
        }
        let mut doc = RenderedDocument::new("start".to_string());
        let mut reporter = Reporter::new();
        render(
            &mut doc,
            &profile(0, 0, 0),
            "html",
            &ctx(),
            &AppConfig::default(),
            &Tracer,
            &mut reporter,
        );
        assert_eq!(doc.text, "start pre main post");
    }

    #[test]
    fn test_banner_inserted_after_stripping() {
        let mut config = AppConfig::default();
        config.banner.enable = true;
        config.banner.text = "made by hand".to_string();
        let mut doc =
            RenderedDocument::new("<html><!-- old --><body>x</body></html>".to_string());
        let mut reporter = Reporter::new();
        render(
            &mut doc,
            &profile(1, 1, 0),
            "html",
            &ctx(),
            &config,
            &NoopHooks,
            &mut reporter,
        );
        assert!(doc.text.contains("<!-- made by hand -->"));
        assert!(!doc.text.contains("old"));
    }

    #[test]
    fn test_wrap_respects_width() {
        let words = "alpha beta gamma delta epsilon zeta eta theta iota kappa";
        let (out, _) = run(&format!("<p>{words}</p>"), "html", &profile(1, 1, 20));
        assert!(out.contains('\n'));
        for line in out.split('\n') {
            assert!(line.len() <= 20, "line too long: {line:?}");
        }
    }
}
