//! Plain-text extraction from scraped listing pages.
//!
//! News listings put every article title right before a "More" link, so the
//! first line of each "More"-terminated block is taken as a headline.

use once_cell::sync::OnceCell;
use regex::Regex;
use scraper::{Html, Node};

/// Line that closes one article block in a listing page.
pub const BLOCK_DELIMITER: &str = "More";

const INVISIBLE_TAGS: [&str; 4] = ["script", "style", "noscript", "template"];

/// Strip markup and return the visible text, one text node per line, trimmed.
pub fn html_to_text(raw_html: &str) -> String {
    static RE_WS: OnceCell<Regex> = OnceCell::new();
    let re_ws = RE_WS.get_or_init(|| Regex::new(r"[ \t\u{a0}]+").expect("whitespace regex"));

    let document = Html::parse_document(raw_html);
    let mut lines: Vec<String> = Vec::new();

    for node in document.tree.root().descendants() {
        let Node::Text(text) = node.value() else {
            continue;
        };
        let hidden = node.ancestors().any(|a| {
            a.value()
                .as_element()
                .is_some_and(|el| INVISIBLE_TAGS.contains(&el.name()))
        });
        if hidden {
            continue;
        }
        for line in text.split('\n') {
            let collapsed = re_ws.replace_all(line, " ");
            let collapsed = collapsed.trim();
            if !collapsed.is_empty() {
                lines.push(collapsed.to_string());
            }
        }
    }

    lines.join("\n").trim().to_string()
}

/// Take the first line of every block of consecutive non-empty lines that is
/// closed by a [`BLOCK_DELIMITER`] line. A trailing block without a delimiter
/// still contributes its first line.
pub fn extract_headlines(clean_text: &str) -> String {
    let mut headlines: Vec<&str> = Vec::new();
    let mut block_head: Option<&str> = None;

    for line in clean_text.lines().map(str::trim).filter(|l| !l.is_empty()) {
        if line == BLOCK_DELIMITER {
            if let Some(head) = block_head.take() {
                headlines.push(head);
            }
        } else if block_head.is_none() {
            block_head = Some(line);
        }
    }
    if let Some(head) = block_head {
        headlines.push(head);
    }

    headlines.join("\n")
}

/// `html_to_text` followed by `extract_headlines`.
pub fn headlines_from_html(raw_html: &str) -> String {
    extract_headlines(&html_to_text(raw_html))
}
