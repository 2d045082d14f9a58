use crate::error::{Result, ScanError};
use crate::heuristics::clean_text;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, warn};
use url::Url;

/// Selectors describing the directory site's markup. Any change on the site
/// side breaks these; they are not meant to be tuned per run.
pub const CATEGORY_LINK_SELECTOR: &str = "a.category-link";
pub const DESCRIPTION_SELECTOR: &str = r#"meta[name="description"]"#;
pub const TOOL_ENTRY_SELECTOR: &str = "div.tool-entry";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryLink {
    pub name: String,
    pub url: String,
}

/// A tool block as it appears on a category page, before any derivation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawToolEntry {
    pub name: String,
    pub description: String,
    pub link: String,
}

#[derive(Debug)]
pub struct CategoryPage {
    pub description: String,
    /// One result per entry block, in page order. A malformed block only
    /// fails its own slot.
    pub entries: Vec<Result<RawToolEntry>>,
}

/// The markup-dependent half of extraction.
pub trait PageParser {
    /// Category links on the seed page, resolved against `base_url`.
    fn category_links(&self, html: &str, base_url: &str) -> Result<Vec<CategoryLink>>;

    fn category_page(&self, html: &str) -> CategoryPage;
}

pub struct DirectoryMarkup {
    category_link: Selector,
    description: Selector,
    tool_entry: Selector,
    heading: Selector,
    paragraph: Selector,
    anchor: Selector,
}

impl DirectoryMarkup {
    pub fn new() -> Self {
        Self {
            category_link: Selector::parse(CATEGORY_LINK_SELECTOR).unwrap(),
            description: Selector::parse(DESCRIPTION_SELECTOR).unwrap(),
            tool_entry: Selector::parse(TOOL_ENTRY_SELECTOR).unwrap(),
            heading: Selector::parse("h3").unwrap(),
            paragraph: Selector::parse("p").unwrap(),
            anchor: Selector::parse("a").unwrap(),
        }
    }

    fn parse_entry(&self, index: usize, entry: ElementRef<'_>) -> Result<RawToolEntry> {
        let name = entry
            .select(&self.heading)
            .next()
            .map(element_text)
            .ok_or_else(|| missing(index, "<h3> name"))?;

        let description = entry
            .select(&self.paragraph)
            .next()
            .map(element_text)
            .ok_or_else(|| missing(index, "<p> description"))?;

        // Only the first anchor counts; a later link is never a stand-in.
        let link = entry
            .select(&self.anchor)
            .next()
            .and_then(|a| a.value().attr("href"))
            .map(|href| href.trim().to_string())
            .ok_or_else(|| missing(index, "<a href> link"))?;

        Ok(RawToolEntry {
            name,
            description,
            link,
        })
    }
}

impl Default for DirectoryMarkup {
    fn default() -> Self {
        Self::new()
    }
}

impl PageParser for DirectoryMarkup {
    fn category_links(&self, html: &str, base_url: &str) -> Result<Vec<CategoryLink>> {
        let base = Url::parse(base_url).map_err(|e| ScanError::InvalidUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;

        let document = Html::parse_document(html);
        let mut links = Vec::new();

        for element in document.select(&self.category_link) {
            let name = element_text(element);
            let Some(href) = element.value().attr("href") else {
                warn!("Category link '{}' has no href, skipping", name);
                continue;
            };

            match base.join(href.trim()) {
                Ok(url) => {
                    debug!("Found category '{}' at {}", name, url);
                    links.push(CategoryLink {
                        name,
                        url: url.to_string(),
                    });
                }
                Err(e) => warn!("Category link '{}' has unusable href {}: {}", name, href, e),
            }
        }

        Ok(links)
    }

    fn category_page(&self, html: &str) -> CategoryPage {
        let document = Html::parse_document(html);

        let description = document
            .select(&self.description)
            .next()
            .and_then(|meta| meta.value().attr("content"))
            .map(clean_text)
            .unwrap_or_default();

        let entries = document
            .select(&self.tool_entry)
            .enumerate()
            .map(|(index, entry)| self.parse_entry(index, entry))
            .collect();

        CategoryPage {
            description,
            entries,
        }
    }
}

fn element_text(element: ElementRef<'_>) -> String {
    clean_text(&element.text().collect::<String>())
}

fn missing(index: usize, what: &str) -> ScanError {
    ScanError::Parse(format!("tool entry #{} has no {}", index + 1, what))
}

/// The category's key: the last non-empty path segment of its URL.
pub fn slug_from_url(url: &str) -> Result<String> {
    let parsed = Url::parse(url).map_err(|e| ScanError::InvalidUrl {
        url: url.to_string(),
        reason: e.to_string(),
    })?;

    parsed
        .path_segments()
        .and_then(|segments| segments.filter(|s| !s.is_empty()).last())
        .map(|s| s.to_string())
        .ok_or_else(|| ScanError::Parse(format!("no path segment to derive a slug from in {}", url)))
}
