//! Markdown-to-HTML for section bodies.
//!
//! Covers the subset report sections use: pipe tables, ordered and
//! unordered lists, paragraphs, `**strong**`, `*em*` and `` `code` ``.
//! Input is HTML-escaped before inline markup is applied, so generated text
//! can never inject tags into the document.

use handlebars::html_escape;
use once_cell::sync::Lazy;
use regex::Regex;

static ORDERED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*\d+[.)]\s+(.*)$").expect("valid ordered list regex"));
static UNORDERED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*[-*+]\s+(.*)$").expect("valid unordered list regex"));
static TABLE_RULE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\|?\s*:?-{3,}:?\s*(\|\s*:?-{3,}:?\s*)*\|?$").expect("valid rule regex"));
static STRONG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\*\*(.+?)\*\*").expect("valid strong regex"));
static EM: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*(.+?)\*").expect("valid em regex"));
static CODE: Lazy<Regex> = Lazy::new(|| Regex::new(r"`([^`]+)`").expect("valid code regex"));

#[derive(Debug, PartialEq)]
enum Block {
    Paragraph(Vec<String>),
    Ordered(Vec<String>),
    Unordered(Vec<String>),
    Table(Vec<Vec<String>>),
}

/// Escape, then apply inline markup. Code spans are cut out before escaping
/// so their backticks survive.
fn inline(text: &str) -> String {
    let text = text.trim();
    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    for caps in CODE.captures_iter(text) {
        let (Some(span), Some(code)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        out.push_str(&emphasis(&html_escape(&text[last..span.start()])));
        out.push_str("<code>");
        out.push_str(&html_escape(code.as_str()));
        out.push_str("</code>");
        last = span.end();
    }
    out.push_str(&emphasis(&html_escape(&text[last..])));
    out
}

fn emphasis(escaped: &str) -> String {
    let strong = STRONG.replace_all(escaped, "<strong>$1</strong>");
    EM.replace_all(&strong, "<em>$1</em>").into_owned()
}

fn table_cells(line: &str) -> Vec<String> {
    line.trim()
        .trim_start_matches('|')
        .trim_end_matches('|')
        .split('|')
        .map(|c| c.trim().to_string())
        .collect()
}

fn blocks(markdown: &str) -> Vec<Block> {
    let mut out: Vec<Block> = Vec::new();

    for line in markdown.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            // A blank line closes paragraphs; lists and tables close on kind change
            if let Some(Block::Paragraph(_)) = out.last() {
                out.push(Block::Paragraph(Vec::new()));
            }
            continue;
        }

        if trimmed.starts_with('|') {
            if TABLE_RULE.is_match(trimmed) {
                continue;
            }
            match out.last_mut() {
                Some(Block::Table(rows)) => rows.push(table_cells(trimmed)),
                _ => out.push(Block::Table(vec![table_cells(trimmed)])),
            }
        } else if let Some(caps) = ORDERED.captures(line) {
            let item = caps[1].to_string();
            match out.last_mut() {
                Some(Block::Ordered(items)) => items.push(item),
                _ => out.push(Block::Ordered(vec![item])),
            }
        } else if let Some(caps) = UNORDERED.captures(line) {
            let item = caps[1].to_string();
            match out.last_mut() {
                Some(Block::Unordered(items)) => items.push(item),
                _ => out.push(Block::Unordered(vec![item])),
            }
        } else {
            match out.last_mut() {
                Some(Block::Paragraph(lines)) => lines.push(trimmed.to_string()),
                _ => out.push(Block::Paragraph(vec![trimmed.to_string()])),
            }
        }
    }

    out.retain(|b| !matches!(b, Block::Paragraph(lines) if lines.is_empty()));
    out
}

/// Render a section body to an HTML fragment
pub fn to_html(markdown: &str) -> String {
    let mut html = String::new();
    for block in blocks(markdown) {
        match block {
            Block::Paragraph(lines) => {
                let body: Vec<String> = lines.iter().map(|l| inline(l)).collect();
                html.push_str(&format!("<p>{}</p>\n", body.join("<br>\n")));
            }
            Block::Ordered(items) => {
                html.push_str("<ol>\n");
                for item in items {
                    html.push_str(&format!("<li>{}</li>\n", inline(&item)));
                }
                html.push_str("</ol>\n");
            }
            Block::Unordered(items) => {
                html.push_str("<ul>\n");
                for item in items {
                    html.push_str(&format!("<li>{}</li>\n", inline(&item)));
                }
                html.push_str("</ul>\n");
            }
            Block::Table(rows) => {
                html.push_str("<table>\n");
                for (i, row) in rows.iter().enumerate() {
                    let tag = if i == 0 { "th" } else { "td" };
                    let cells: String = row
                        .iter()
                        .map(|c| format!("<{tag}>{}</{tag}>", inline(c)))
                        .collect();
                    html.push_str(&format!("<tr>{}</tr>\n", cells));
                }
                html.push_str("</table>\n");
            }
        }
    }
    html
}
