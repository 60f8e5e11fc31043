//! Section link harvesting from documentation index pages.

use scraper::{Html, Selector};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use url::Url;

/// A documentation page linked from an index page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionLink {
    /// Link text content
    pub title: String,
    /// Absolute URL without fragment
    pub url: String,
}

/// Extract links to pages under `base`, resolving relative URLs.
///
/// Only same-host links whose path sits strictly below the base path are
/// kept. Fragments are stripped and duplicates (by URL) are dropped, first
/// occurrence wins.
pub fn extract_section_links(html: &str, base: &Url) -> Vec<SectionLink> {
    let document = Html::parse_document(html);
    let selector = Selector::parse("a[href]").expect("invalid selector");

    let mut seen = HashSet::new();
    let mut links = Vec::new();

    for element in document.select(&selector) {
        let Some(href) = element.value().attr("href") else {
            continue;
        };

        let Ok(mut resolved) = base.join(href) else {
            continue;
        };
        resolved.set_fragment(None);

        if !is_section_of(&resolved, base) {
            continue;
        }

        let url = resolved.to_string();
        if !seen.insert(url.clone()) {
            continue;
        }

        let text = element.text().collect::<Vec<_>>().join(" ");
        let title = text.split_whitespace().collect::<Vec<_>>().join(" ");
        let title = if title.is_empty() { url.clone() } else { title };

        links.push(SectionLink { title, url });
    }

    links
}

fn is_section_of(candidate: &Url, base: &Url) -> bool {
    let base_path = base.path().trim_end_matches('/');
    candidate.host_str() == base.host_str()
        && candidate
            .path()
            .strip_prefix(base_path)
            .is_some_and(|rest| rest.starts_with('/') && !rest.trim_matches('/').is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("https://docs.example.com/design/guidelines/").unwrap()
    }

    #[test]
    fn test_extract_relative_and_absolute() {
        let html = r#"
            <html>
                <body>
                    <a href="buttons">Buttons</a>
                    <a href="/design/guidelines/navigation-bars">Navigation   Bars</a>
                    <a href="https://docs.example.com/design/guidelines/alerts">Alerts</a>
                </body>
            </html>
        "#;

        let links = extract_section_links(html, &base());
        let urls: Vec<&str> = links.iter().map(|l| l.url.as_str()).collect();
        assert_eq!(
            urls,
            vec![
                "https://docs.example.com/design/guidelines/buttons",
                "https://docs.example.com/design/guidelines/navigation-bars",
                "https://docs.example.com/design/guidelines/alerts",
            ]
        );
        assert_eq!(links[1].title, "Navigation Bars");
    }

    #[test]
    fn test_skips_foreign_and_parent_links() {
        let html = r#"
            <a href="https://other.example.org/design/guidelines/buttons">Elsewhere</a>
            <a href="/news">News</a>
            <a href="/design/guidelines/">Index</a>
            <a href="/design/guidelines-archive/old">Archive</a>
            <a href="mailto:team@example.com">Mail</a>
        "#;

        assert!(extract_section_links(html, &base()).is_empty());
    }

    #[test]
    fn test_fragments_stripped_and_deduplicated() {
        let html = r##"
            <a href="buttons#usage">Usage</a>
            <a href="buttons">Buttons</a>
            <a href="#top">Top</a>
        "##;

        let links = extract_section_links(html, &base());
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].title, "Usage");
        assert_eq!(links[0].url, "https://docs.example.com/design/guidelines/buttons");
    }

    #[test]
    fn test_empty_text_uses_url() {
        let links = extract_section_links(r#"<a href="color">  </a>"#, &base());
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].title, links[0].url);
    }

    #[test]
    fn test_no_links() {
        assert!(extract_section_links("<p>No links here</p>", &base()).is_empty());
    }
}
