//! Markdown preview for the review and finalize pages.

use pulldown_cmark::{html, Event, Options, Parser};

/// Renders blog markdown to HTML. Raw HTML in the source is escaped rather
/// than passed through, since the text comes from a model or the edit box.
pub fn markdown_to_html(markdown: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);

    let parser = Parser::new_ext(markdown, options).map(|event| match event {
        Event::Html(raw) | Event::InlineHtml(raw) => Event::Text(raw),
        other => other,
    });

    let mut out = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut out, parser);
    out
}
