//! Item records and the normalization applied before a field enters one

use serde::Serialize;

/// Image reference(s) attached to an item
///
/// Detail pages record the single preview URL, content pages record every
/// thumbnail link they carry. Serialized untagged: a JSON string or array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ImageUrls {
    Single(String),
    Many(Vec<String>),
}

impl ImageUrls {
    /// All URLs, whichever shape was recorded
    pub fn as_slice(&self) -> &[String] {
        match self {
            Self::Single(url) => std::slice::from_ref(url),
            Self::Many(urls) => urls,
        }
    }
}

/// Structured record emitted for a parsed page
///
/// Absent fields are omitted when serialized. An absent `featured_in` means
/// the page carried no category signal; it is never present-but-empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Item {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub featured_in: Option<Vec<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_urls: Option<ImageUrls>,
}

/// Trims a text field; whitespace-only input counts as missing
pub fn normalize_text(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Trims every entry, drops blanks and repeats, and keeps first-seen order
///
/// Returns `None` when nothing survives.
///
/// # Examples
///
/// ```
/// use shutter_sweep::extract::normalize_categories;
///
/// assert_eq!(
///     normalize_categories([" Nature ", "", "City"]),
///     Some(vec!["Nature".to_string(), "City".to_string()])
/// );
/// assert_eq!(normalize_categories(["", "  "]), None);
/// ```
pub fn normalize_categories<I, S>(raw: I) -> Option<Vec<String>>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut categories: Vec<String> = Vec::new();
    for entry in raw {
        if let Some(text) = normalize_text(entry.as_ref()) {
            if !categories.contains(&text) {
                categories.push(text);
            }
        }
    }

    (!categories.is_empty()).then_some(categories)
}

/// Builds an `Item` from raw extracted values
#[derive(Debug, Default)]
pub struct ItemAssembler {
    item: Item,
}

impl ItemAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(mut self, raw: Option<&str>) -> Self {
        self.item.name = raw.and_then(normalize_text);
        self
    }

    pub fn categories<I, S>(mut self, raw: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.item.featured_in = normalize_categories(raw);
        self
    }

    /// Records a single image reference
    pub fn image_url(mut self, url: Option<&str>) -> Self {
        self.item.image_urls = url.and_then(normalize_text).map(ImageUrls::Single);
        self
    }

    /// Records an ordered link collection; blank entries are dropped, repeats kept
    pub fn image_links<I, S>(mut self, urls: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let urls: Vec<String> = urls
            .into_iter()
            .filter_map(|url| normalize_text(url.as_ref()))
            .collect();
        self.item.image_urls = (!urls.is_empty()).then_some(ImageUrls::Many(urls));
        self
    }

    pub fn build(self) -> Item {
        self.item
    }
}
