//! HTML to plain-text conversion.
//!
//! Lossy by design: markup is dropped, readable structure is kept.
//! Block-level elements become paragraph breaks so the splitter can
//! prefer paragraph boundaries downstream; script and style subtrees
//! contribute nothing.

use ego_tree::NodeRef;
use scraper::{Html, Node};

/// Elements whose boundaries become paragraph breaks in the output.
const BLOCK_ELEMENTS: &[&str] = &[
    "p", "div", "section", "article", "h1", "h2", "h3", "h4", "h5", "h6", "li", "ul", "ol",
    "table", "tr", "pre", "blockquote", "br", "hr",
];

/// Convert an HTML document (or fragment) to plain text.
pub fn to_text(html: &str) -> String {
    let doc = Html::parse_document(html);
    let mut out = String::new();
    walk(doc.tree.root(), &mut out);
    collapse_blank_lines(&out)
}

fn walk(node: NodeRef<'_, Node>, out: &mut String) {
    match node.value() {
        Node::Text(text) => {
            let t = text.trim_matches(|c| c == '\n' || c == '\r');
            if !t.trim().is_empty() {
                out.push_str(t);
            }
        }
        Node::Element(el) => {
            let name = el.name();
            if name == "script" || name == "style" || name == "head" {
                return;
            }
            let is_block = BLOCK_ELEMENTS.contains(&name);
            if is_block {
                push_break(out);
            }
            for child in node.children() {
                walk(child, out);
            }
            if is_block {
                push_break(out);
            }
            return;
        }
        _ => {}
    }
    for child in node.children() {
        walk(child, out);
    }
}

fn push_break(out: &mut String) {
    if !out.is_empty() && !out.ends_with("\n\n") {
        while out.ends_with('\n') {
            out.pop();
        }
        out.push_str("\n\n");
    }
}

/// Collapse runs of blank lines and trim the edges.
fn collapse_blank_lines(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut blank_run = 0usize;
    for line in text.lines() {
        let trimmed = line.trim_end();
        if trimmed.trim().is_empty() {
            blank_run += 1;
            continue;
        }
        if !out.is_empty() {
            out.push('\n');
            if blank_run > 0 {
                out.push('\n');
            }
        }
        out.push_str(trimmed.trim_start());
        blank_run = 0;
    }
    out
}
