// src/document/html.rs
// =============================================================================
// This module renders a Document to HTML and finds the anchors in it.
//
// Anchors a markdown link can point at besides headings:
// - explicit heading ids:      # Install {#setup}
// - raw HTML named anchors:    <a name="old-section"></a>
// - any raw HTML element id:   <div id="faq">
//
// pulldown-cmark renders the markdown (heading ids included) and the
// `scraper` crate parses the result so we can query it with CSS selectors.
// =============================================================================

use pulldown_cmark::{html, Parser};
use scraper::{Html, Selector};

use super::markdown::markdown_options;
use super::Document;

impl Document {
    /// Renders the document to an HTML string
    pub fn to_html(&self) -> String {
        let mut output = String::with_capacity(self.source.len() * 3 / 2);
        html::push_html(&mut output, Parser::new_ext(&self.source, markdown_options()));
        output
    }

    /// Raw `name` values of `<a>` elements and `id` values of all elements
    /// in the rendered HTML, in document order.
    ///
    /// Rendering and HTML parsing happen once per document, the first time
    /// this is called.
    pub fn html_anchors(&self) -> &[String] {
        self.anchors.get_or_init(|| collect_anchors(&self.to_html()))
    }
}

// Finds every anchor target in an HTML fragment
//
// Example:
//   html = "<h1 id=\"setup\">Install</h1><a name=\"old\"></a>"
//   result = ["old", "setup"]   (named anchors first, then ids)
fn collect_anchors(html: &str) -> Vec<String> {
    let fragment = Html::parse_fragment(html);

    // Both selectors are constants and known to be valid; if parsing them
    // ever failed there would simply be no HTML anchors to match against
    let (Ok(named), Ok(with_id)) = (Selector::parse("a[name]"), Selector::parse("[id]")) else {
        return Vec::new();
    };

    let names = fragment
        .select(&named)
        .filter_map(|element| element.value().attr("name"));
    let ids = fragment
        .select(&with_id)
        .filter_map(|element| element.value().attr("id"));

    names.chain(ids).map(str::to_string).collect()
}
