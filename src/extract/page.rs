//! Fetched HTML documents and the selectors used to read them

use crate::config::SelectorConfig;
use crate::ConfigError;
use scraper::{ElementRef, Html, Selector};
use url::Url;

/// Compiled form of `[selectors]`
#[derive(Debug, Clone)]
pub struct SelectorSet {
    pub thumbnail_links: Selector,
    pub image_descriptor: Selector,
    pub descriptor_attribute: String,
    pub title: Selector,
    pub categories: Selector,
}

impl SelectorSet {
    /// Compiles every selector in the configuration
    pub fn compile(config: &SelectorConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            thumbnail_links: compile_selector(&config.thumbnail_links)?,
            image_descriptor: compile_selector(&config.image_descriptor)?,
            descriptor_attribute: config.descriptor_attribute.clone(),
            title: compile_selector(&config.title)?,
            categories: compile_selector(&config.categories)?,
        })
    }
}

pub(crate) fn compile_selector(source: &str) -> Result<Selector, ConfigError> {
    Selector::parse(source).map_err(|e| ConfigError::InvalidSelector {
        selector: source.to_string(),
        message: e.to_string(),
    })
}

/// A parsed HTML page together with the URL it was served from
///
/// `Html` is not `Send`; a `Page` is built and dropped without crossing an
/// `.await`.
pub struct Page {
    url: Url,
    document: Html,
}

impl Page {
    /// Parses `body` as an HTML document served from `url`
    pub fn parse(url: Url, body: &str) -> Self {
        Self {
            url,
            document: Html::parse_document(body),
        }
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn select<'a>(&'a self, selector: &'a Selector) -> impl Iterator<Item = ElementRef<'a>> + 'a {
        self.document.select(selector)
    }

    /// Resolves the `href` of every matched element, in document order
    pub fn links(&self, selector: &Selector) -> Vec<Url> {
        self.select(selector)
            .filter_map(|element| element.value().attr("href"))
            .filter_map(|href| resolve_link(href, &self.url))
            .collect()
    }

    /// Text content of the first matched element, untrimmed
    pub fn first_text(&self, selector: &Selector) -> Option<String> {
        self.select(selector)
            .next()
            .map(|element| element.text().collect::<String>())
    }

    /// Text content of every matched element, untrimmed
    pub fn texts(&self, selector: &Selector) -> Vec<String> {
        self.select(selector)
            .map(|element| element.text().collect::<String>())
            .collect()
    }

    /// Value of `attr` on the first matched element that carries it
    pub fn first_attr(&self, selector: &Selector, attr: &str) -> Option<String> {
        self.select(selector)
            .find_map(|element| element.value().attr(attr))
            .map(str::to_string)
    }

    /// Resolves a possibly relative reference against this page's URL
    pub fn resolve(&self, href: &str) -> Option<Url> {
        resolve_link(href, &self.url)
    }
}

/// Resolves a link href to an absolute HTTP(S) URL
///
/// Returns None if the link should be excluded:
/// - javascript:, mailto:, tel: schemes
/// - data: URIs
/// - fragment-only references
/// - Invalid URLs
/// - Non-HTTP(S) URLs after resolution
///
/// # Example
///
/// ```
/// use shutter_sweep::extract::resolve_link;
/// use url::Url;
///
/// let base = Url::parse("https://example.com/photos/abc").unwrap();
/// let url = resolve_link("/photos/def", &base).unwrap();
/// assert_eq!(url.as_str(), "https://example.com/photos/def");
/// assert!(resolve_link("mailto:a@b.c", &base).is_none());
/// ```
pub fn resolve_link(href: &str, base_url: &Url) -> Option<Url> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    let lowered = href.to_ascii_lowercase();
    if ["javascript:", "mailto:", "tel:", "data:"]
        .iter()
        .any(|scheme| lowered.starts_with(scheme))
    {
        return None;
    }

    base_url
        .join(href)
        .ok()
        .filter(|url| url.scheme() == "http" || url.scheme() == "https")
}
