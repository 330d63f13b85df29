//! Extraction primitives shared by the page parsers
//!
//! - `variants`: parsing multi-resolution image descriptors and picking tiers
//! - `item`: normalizing extracted text into `Item` records
//! - `page`: a fetched HTML document plus the compiled field selectors

mod item;
mod page;
mod variants;

pub use item::{normalize_categories, normalize_text, ImageUrls, Item, ItemAssembler};
pub(crate) use page::compile_selector;
pub use page::{resolve_link, Page, SelectorSet};
pub use variants::{parse_descriptor, select_max, select_min, ImageVariant};
