use crate::render::{
    INSTRUCTION_MARKER, INVISIBLE_CHAR_MARKER, MOD_LINKS_MARKER, TRANSLATION_LINKS_MARKER,
    TRANSLATION_TYPE_MARKER,
};
use pulldown_cmark::{html, Options, Parser};
use regex::Regex;
use std::sync::OnceLock;

/// Render final post text to HTML for the preview pane.
pub fn preview_html(text: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_STRIKETHROUGH);
    let parser = Parser::new_ext(text, options);
    let mut out = String::with_capacity(text.len() * 2);
    html::push_html(&mut out, parser);
    out
}

fn is_structural_marker(token: &str) -> bool {
    matches!(
        token,
        MOD_LINKS_MARKER
            | TRANSLATION_LINKS_MARKER
            | INVISIBLE_CHAR_MARKER
            | TRANSLATION_TYPE_MARKER
            | INSTRUCTION_MARKER
    )
}

/// Decorate template source for an editor overlay: markdown structure plus
/// the placeholder syntax, as span-wrapped HTML. Escapes first, so the output
/// is safe to inject behind a transparent textarea.
pub fn highlight_template(text: &str) -> String {
    static RE_H1: OnceLock<Regex> = OnceLock::new();
    static RE_H2: OnceLock<Regex> = OnceLock::new();
    static RE_BOLD: OnceLock<Regex> = OnceLock::new();
    static RE_CODE: OnceLock<Regex> = OnceLock::new();
    static RE_QUOTE: OnceLock<Regex> = OnceLock::new();
    static RE_PLACEHOLDER: OnceLock<Regex> = OnceLock::new();

    let re_h1 = RE_H1.get_or_init(|| Regex::new(r"(?m)^(#[^\S\n]+.*)$").unwrap());
    let re_h2 = RE_H2.get_or_init(|| Regex::new(r"(?m)^(##[^\S\n]+.*)$").unwrap());
    let re_bold = RE_BOLD.get_or_init(|| Regex::new(r"\*\*(.+?)\*\*").unwrap());
    let re_code = RE_CODE.get_or_init(|| Regex::new(r"`([^`]+)`").unwrap());
    let re_quote = RE_QUOTE.get_or_init(|| Regex::new(r"(?m)^(&gt;.*)$").unwrap());
    let re_placeholder =
        RE_PLACEHOLDER.get_or_init(|| Regex::new(r"\[[A-Za-z_][A-Za-z0-9_]*\]").unwrap());

    let mut html = text
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;");

    html = re_h2
        .replace_all(&html, "<span class=\"hl-h2\">$1</span>")
        .to_string();
    html = re_h1
        .replace_all(&html, "<span class=\"hl-h1\">$1</span>")
        .to_string();
    html = re_bold
        .replace_all(&html, "<span class=\"hl-bold\">$1</span>")
        .to_string();
    html = re_code
        .replace_all(&html, "<span class=\"hl-code\">$1</span>")
        .to_string();
    html = re_quote
        .replace_all(&html, "<span class=\"hl-quote\">$1</span>")
        .to_string();
    html = re_placeholder
        .replace_all(&html, |caps: &regex::Captures| {
            let token = &caps[0];
            let class = if is_structural_marker(token) {
                "hl-marker"
            } else {
                "hl-placeholder"
            };
            format!("<span class=\"{class}\">{token}</span>")
        })
        .to_string();

    // Trailing newline keeps the overlay height in sync with the textarea.
    html.push_str("\n ");
    html
}
