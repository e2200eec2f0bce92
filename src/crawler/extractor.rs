//! HTML extractor for title/link pairs
//!
//! # Extraction Rules
//!
//! **Primary:** every anchor matching the configured selector (by default
//! `.titleline > a`, the story links on a Hacker News listing). The anchor's
//! trimmed text becomes the title and its raw `href` the url. Anchors with no
//! text or no `href` are skipped.
//!
//! **Fallback:** only when the primary rule finds nothing, the page `<title>`
//! becomes a single item pointing back at the page itself.

use crate::crawler::ScrapedItem;
use crate::ConfigError;
use scraper::{ElementRef, Html, Selector};

/// Extracts scraped items from fetched documents
///
/// Holds only compiled selectors, so one instance is shared by every worker
/// and repeated extraction of the same document yields the same items.
#[derive(Debug, Clone)]
pub struct Extractor {
    anchors: Selector,
    title: Selector,
}

impl Extractor {
    /// Compiles the anchor selector
    ///
    /// # Example
    ///
    /// ```
    /// use title_harvest::crawler::Extractor;
    ///
    /// let extractor = Extractor::new(".titleline > a").unwrap();
    /// let html = r#"<span class="titleline"><a href="/f">Foo</a></span>"#;
    /// let items = extractor.extract(html, "https://example.com/");
    /// assert_eq!(items[0].title, "Foo");
    /// assert_eq!(items[0].url, "/f");
    /// ```
    pub fn new(selector: &str) -> Result<Self, ConfigError> {
        let anchors = Selector::parse(selector)
            .map_err(|e| ConfigError::InvalidSelector(format!("'{}': {:?}", selector, e)))?;
        let title = Selector::parse("title")
            .map_err(|e| ConfigError::InvalidSelector(format!("'title': {:?}", e)))?;

        Ok(Self { anchors, title })
    }

    /// Extracts items from one document
    ///
    /// # Arguments
    ///
    /// * `html` - The document body
    /// * `source_url` - The URL the document was fetched from, used by the fallback rule
    pub fn extract(&self, html: &str, source_url: &str) -> Vec<ScrapedItem> {
        let document = Html::parse_document(html);

        let items: Vec<ScrapedItem> = document
            .select(&self.anchors)
            .filter_map(anchor_item)
            .collect();

        if !items.is_empty() {
            return items;
        }

        self.page_title(&document)
            .map(|title| ScrapedItem {
                title,
                url: source_url.to_string(),
            })
            .into_iter()
            .collect()
    }

    /// Extracts the page title from the HTML document
    fn page_title(&self, document: &Html) -> Option<String> {
        document
            .select(&self.title)
            .next()
            .map(|element| element.text().collect::<String>().trim().to_string())
            .filter(|s| !s.is_empty())
    }
}

fn anchor_item(element: ElementRef<'_>) -> Option<ScrapedItem> {
    let href = element.value().attr("href")?;
    let title = element.text().collect::<String>().trim().to_string();

    if title.is_empty() {
        return None;
    }

    Some(ScrapedItem {
        title,
        url: href.to_string(),
    })
}
