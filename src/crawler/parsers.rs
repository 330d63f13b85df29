//! Page parsers
//!
//! Three parsers share one dispatch point, `run_parser`:
//! - listing: thumbnail anchors become detail requests
//! - detail: the image descriptor is resolved into preview/full asset requests
//!   and one item is built
//! - content: thumbnail anchors are re-enqueued as content pages and one item
//!   records them as a link collection

use crate::crawler::{ParserKind, Request};
use crate::extract::{parse_descriptor, select_max, select_min, ItemAssembler, Page, SelectorSet};
use crate::extract::{ImageVariant, Item};
use crate::storage::AssetTier;
use crate::MalformedVariantError;
use url::Url;

/// What a parser produced for one page
#[derive(Debug, Default)]
pub struct ParseOutput {
    /// New requests, in emission order
    pub requests: Vec<Request>,

    /// At most one item per page
    pub item: Option<Item>,

    /// Set when the page's image descriptor could not be parsed
    pub malformed: Option<MalformedVariantError>,
}

/// Runs the parser named by `kind` over a fetched page
///
/// Asset requests never reach a page parser; passing one yields empty output.
pub fn run_parser(kind: ParserKind, page: &Page, selectors: &SelectorSet) -> ParseOutput {
    match kind {
        ParserKind::Listing => parse_listing(page, selectors),
        ParserKind::Detail => parse_detail(page, selectors),
        ParserKind::Content => parse_content(page, selectors),
        ParserKind::Asset(_) => ParseOutput::default(),
    }
}

/// One detail request per thumbnail anchor; nothing deeper
pub fn parse_listing(page: &Page, selectors: &SelectorSet) -> ParseOutput {
    let requests = page
        .links(&selectors.thumbnail_links)
        .into_iter()
        .map(|url| Request::parse_only(url, ParserKind::Detail))
        .collect();

    ParseOutput {
        requests,
        ..ParseOutput::default()
    }
}

/// Resolves the image tiers of a detail page and builds its item
///
/// The item's `image_urls` is the preview URL alone. A missing or malformed
/// descriptor produces no asset requests; the item is still emitted.
pub fn parse_detail(page: &Page, selectors: &SelectorSet) -> ParseOutput {
    let mut output = ParseOutput::default();

    let variants = match page.first_attr(&selectors.image_descriptor, &selectors.descriptor_attribute) {
        Some(raw) => parse_descriptor(&raw).unwrap_or_else(|e| {
            tracing::warn!("Skipping images on {}: {}", page.url(), e);
            output.malformed = Some(e);
            Vec::new()
        }),
        None => {
            tracing::debug!("No image descriptor on {}", page.url());
            Vec::new()
        }
    };

    let preview = select_min(&variants).and_then(|v| resolve_variant(page, v));
    let full = select_max(&variants).and_then(|v| resolve_variant(page, v));

    if let Some(url) = &preview {
        output
            .requests
            .push(Request::asset(url.clone(), AssetTier::Preview));
    }
    if let Some(url) = full {
        output.requests.push(Request::asset(url, AssetTier::Full));
    }

    output.item = Some(
        describe(page, selectors)
            .image_url(preview.as_ref().map(Url::as_str))
            .build(),
    );
    output
}

/// Re-enqueues every thumbnail as a content page and records them on the item
pub fn parse_content(page: &Page, selectors: &SelectorSet) -> ParseOutput {
    let links = page.links(&selectors.thumbnail_links);

    let item = describe(page, selectors)
        .image_links(links.iter().map(Url::as_str))
        .build();

    let requests = links
        .into_iter()
        .map(|url| Request::new(url, Some(ParserKind::Content), true))
        .collect();

    ParseOutput {
        requests,
        item: Some(item),
        malformed: None,
    }
}

/// Name and categories, shared by both item-producing parsers
fn describe(page: &Page, selectors: &SelectorSet) -> ItemAssembler {
    ItemAssembler::new()
        .name(page.first_text(&selectors.title).as_deref())
        .categories(page.texts(&selectors.categories))
}

fn resolve_variant(page: &Page, variant: &ImageVariant) -> Option<Url> {
    let resolved = page.resolve(&variant.url);
    if resolved.is_none() {
        tracing::warn!("Unusable image URL '{}' on {}", variant.url, page.url());
    }
    resolved
}
