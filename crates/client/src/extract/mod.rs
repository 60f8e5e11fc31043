//! Record building from fetched documentation pages.
//!
//! Deliberately shallow: no readability scoring and no cleaning rules beyond
//! collecting text from headings, paragraphs and list items.
//!
//! ### Record fields
//! - `title`: first `<h1>`, else `<title>` up to the first ` | `, else the URL slug
//! - `snippet`: meta description, else the first substantial paragraph (max 300 chars)
//! - `keywords`: meta keywords plus `<h2>`/`<h3>` headings, lowercased
//! - `platform`: a known platform segment in the URL path, else `universal`
//! - `category`: `article:section` meta, else `general`

pub mod links;

pub use links::{SectionLink, extract_section_links};

use std::collections::BTreeSet;
use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};
use url::Url;

use docshelf_core::ContentRecord;

/// Longest snippet kept on a record, in characters.
pub const MAX_SNIPPET_CHARS: usize = 300;

const MIN_SNIPPET_PARAGRAPH: usize = 40;

const PLATFORMS: &[&str] = &["ios", "ipados", "macos", "watchos", "tvos", "visionos"];

pub const DEFAULT_PLATFORM: &str = "universal";
pub const DEFAULT_CATEGORY: &str = "general";

static H1: LazyLock<Selector> = LazyLock::new(|| Selector::parse("h1").expect("invalid selector"));
static TITLE: LazyLock<Selector> = LazyLock::new(|| Selector::parse("title").expect("invalid selector"));
static META: LazyLock<Selector> = LazyLock::new(|| Selector::parse("meta[content]").expect("invalid selector"));
static SUBHEADINGS: LazyLock<Selector> = LazyLock::new(|| Selector::parse("h2, h3").expect("invalid selector"));
static PARAGRAPHS: LazyLock<Selector> = LazyLock::new(|| Selector::parse("p").expect("invalid selector"));
static BLOCKS: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("h1, h2, h3, p, li").expect("invalid selector"));

/// A record plus the text body collected for it.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedPage {
    pub record: ContentRecord,
    /// Markdown-ish text: `#` headings, blank-line separated blocks.
    pub text: String,
}

/// Build a [`ContentRecord`] and its body text from page HTML.
pub fn build_record(html: &str, url: &Url) -> ExtractedPage {
    let document = Html::parse_document(html);

    let title = first_text(&document, &H1)
        .or_else(|| {
            first_text(&document, &TITLE)
                .and_then(|t| t.split(" | ").next().map(|s| s.trim().to_string()))
                .filter(|t| !t.is_empty())
        })
        .unwrap_or_else(|| title_from_slug(url));

    let snippet = meta_content(&document, "description")
        .or_else(|| {
            document
                .select(&PARAGRAPHS)
                .map(element_text)
                .find(|p| p.chars().count() >= MIN_SNIPPET_PARAGRAPH)
        })
        .map(|s| truncate_chars(&s, MAX_SNIPPET_CHARS))
        .unwrap_or_default();

    let mut keywords: BTreeSet<String> = meta_content(&document, "keywords")
        .map(|k| {
            k.split(',')
                .map(|w| w.trim().to_lowercase())
                .filter(|w| !w.is_empty())
                .collect()
        })
        .unwrap_or_default();
    keywords.extend(
        document
            .select(&SUBHEADINGS)
            .map(element_text)
            .map(|h| h.to_lowercase())
            .filter(|h| !h.is_empty()),
    );

    let category = meta_content(&document, "article:section")
        .map(|c| c.trim().to_lowercase())
        .filter(|c| !c.is_empty())
        .unwrap_or_else(|| DEFAULT_CATEGORY.to_string());

    let text = body_text(&document);

    let record = ContentRecord {
        id: record_id_for(url),
        title,
        url: url.to_string(),
        platform: platform_for(url),
        category,
        keywords,
        snippet,
        body: (!text.is_empty()).then(|| text.clone()),
    };

    ExtractedPage { record, text }
}

/// Stable record id: the last non-empty path segment, lowercased.
pub fn record_id_for(url: &Url) -> String {
    url.path_segments()
        .and_then(|mut segments| segments.rfind(|s| !s.is_empty()))
        .map(|s| s.to_lowercase())
        .unwrap_or_else(|| url.host_str().unwrap_or("index").to_string())
}

fn platform_for(url: &Url) -> String {
    url.path_segments()
        .into_iter()
        .flatten()
        .map(str::to_lowercase)
        .find(|segment| PLATFORMS.contains(&segment.as_str()))
        .unwrap_or_else(|| DEFAULT_PLATFORM.to_string())
}

fn title_from_slug(url: &Url) -> String {
    record_id_for(url)
        .split(['-', '_'])
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<Vec<_>>().join(" ").split_whitespace().collect::<Vec<_>>().join(" ")
}

fn first_text(document: &Html, selector: &Selector) -> Option<String> {
    document.select(selector).map(element_text).find(|t| !t.is_empty())
}

fn meta_content(document: &Html, name: &str) -> Option<String> {
    document
        .select(&META)
        .find(|m| {
            let attrs = m.value();
            attrs.attr("name").or_else(|| attrs.attr("property")) == Some(name)
        })
        .and_then(|m| m.value().attr("content"))
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty())
}

fn body_text(document: &Html) -> String {
    let mut blocks = Vec::new();
    for element in document.select(&BLOCKS) {
        let text = element_text(element);
        if text.is_empty() {
            continue;
        }
        let block = match element.value().name() {
            "h1" => format!("# {text}"),
            "h2" => format!("## {text}"),
            "h3" => format!("### {text}"),
            "li" => format!("- {text}"),
            _ => text,
        };
        blocks.push(block);
    }
    blocks.join("\n\n")
}

fn truncate_chars(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => format!("{}...", s[..idx].trim_end()),
        None => s.to_string(),
    }
}
