//! Résumé page content: the read-only document the suite prompts are built from.

use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

/// Upper bound on résumé characters included in any prompt.
pub const MAX_PROMPT_CHARS: usize = 3000;

/// `id` of the element that holds the résumé itself on the page.
pub const RESUME_ELEMENT_ID: &str = "cvContent";

const BLOCK_TAGS: &[&str] = &[
    "address", "article", "aside", "br", "dd", "div", "dl", "dt", "footer", "h1", "h2", "h3",
    "h4", "h5", "h6", "header", "hr", "li", "main", "nav", "ol", "p", "section", "table", "td",
    "th", "tr", "ul",
];

#[derive(Debug, Clone)]
pub struct ResumeDocument {
    raw: String,
    is_html: bool,
    visible_text: String,
}

impl ResumeDocument {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read résumé document {}", path.display()))?;
        let document = Self::from_source(raw);
        info!(
            "Loaded résumé document {} ({} visible chars)",
            path.display(),
            document.visible_text.chars().count()
        );
        Ok(document)
    }

    /// HTML sources are reduced to the visible text of the résumé element;
    /// anything else is used verbatim.
    pub fn from_source(raw: String) -> Self {
        let is_html = raw.trim_start().starts_with('<');
        let visible_text = if is_html {
            visible_text(resume_region(&raw))
        } else {
            raw.trim().to_string()
        };
        Self {
            raw,
            is_html,
            visible_text,
        }
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn is_html(&self) -> bool {
        self.is_html
    }

    /// The visible text capped at [`MAX_PROMPT_CHARS`].
    pub fn excerpt(&self) -> &str {
        truncate_chars(&self.visible_text, MAX_PROMPT_CHARS)
    }
}

/// Cuts `text` to at most `max` characters without splitting a code point.
pub fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// The markup a reader sees as the résumé: the [`RESUME_ELEMENT_ID`] element,
/// else the `<body>`, else the whole document. Navigation, modal and button
/// chrome outside the résumé element never reaches a prompt.
pub fn resume_region(html: &str) -> &str {
    element_by_id(html, RESUME_ELEMENT_ID)
        .or_else(|| body(html))
        .unwrap_or(html)
}

/// Inner markup of the element carrying `id`, up to its matching close tag.
fn element_by_id<'a>(html: &'a str, id: &str) -> Option<&'a str> {
    let at = [format!("id=\"{id}\""), format!("id='{id}'")]
        .iter()
        .filter_map(|attr| html.find(attr.as_str()))
        .min()?;
    let open = html[..at].rfind('<')?;
    let name = tag_name(&html[open + 1..at]);
    if name.is_empty() {
        return None;
    }
    let start = at + html[at..].find('>')? + 1;

    // Same byte offsets as `html`; only ASCII changes case.
    let lower = html.to_ascii_lowercase();
    let mut depth = 1usize;
    let mut cursor = start;
    while let Some(offset) = lower[cursor..].find('<') {
        let tag_at = cursor + offset;
        let tag = &lower[tag_at + 1..];
        if tag_name(tag) == name {
            if tag.starts_with('/') {
                depth -= 1;
                if depth == 0 {
                    return Some(&html[start..tag_at]);
                }
            } else {
                depth += 1;
            }
        }
        cursor = tag_at + 1;
    }
    Some(&html[start..])
}

fn body(html: &str) -> Option<&str> {
    let lower = html.to_ascii_lowercase();
    let (open, _) = lower
        .match_indices("<body")
        .find(|(idx, _)| tag_name(&lower[idx + 1..]) == "body")?;
    let start = open + lower[open..].find('>')? + 1;
    let end = lower[start..]
        .find("</body")
        .map_or(html.len(), |idx| start + idx);
    Some(&html[start..end])
}

/// Approximates what a browser shows for `html`. Markup, comments, `<head>`,
/// scripts and styles are dropped; block elements become line breaks and runs
/// of whitespace collapse.
pub fn visible_text(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut rest = html;

    while let Some(lt) = rest.find('<') {
        push_text(&mut out, &rest[..lt]);
        let after = &rest[lt..];

        if let Some(comment) = after.strip_prefix("<!--") {
            rest = match comment.find("-->") {
                Some(end) => &comment[end + 3..],
                None => "",
            };
            continue;
        }

        let Some(gt) = after.find('>') else {
            rest = "";
            break;
        };
        let tag = &after[1..gt];
        let name = tag_name(tag);
        rest = &after[gt + 1..];

        if matches!(name.as_str(), "head" | "script" | "style") && !tag.starts_with('/') {
            let close = format!("</{name}");
            match rest.to_ascii_lowercase().find(&close) {
                Some(idx) => rest = &rest[idx..],
                // An unclosed <head> ends where the body starts.
                None if name == "head" => {}
                None => rest = "",
            }
            continue;
        }

        out.push(if BLOCK_TAGS.contains(&name.as_str()) {
            '\n'
        } else {
            ' '
        });
    }
    push_text(&mut out, rest);

    out.lines()
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

fn tag_name(tag: &str) -> String {
    tag.trim_start_matches('/')
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric())
        .collect::<String>()
        .to_ascii_lowercase()
}

/// Appends a text node. Source newlines are layout, not content.
fn push_text(out: &mut String, text: &str) {
    if text.is_empty() {
        return;
    }
    let decoded = text
        .replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&apos;", "'")
        .replace("&amp;", "&");
    out.extend(decoded.chars().map(|c| if c.is_whitespace() { ' ' } else { c }));
}
