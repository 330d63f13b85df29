//! Requests and the parser identities they carry

use crate::storage::AssetTier;
use serde::Deserialize;
use std::fmt;
use url::Url;

/// Which parser handles a fetched response
///
/// Dispatch happens in one `match` in the parser module; rules and parsers
/// only ever hand out these tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ParserKind {
    /// Listing page: emits one detail request per thumbnail
    Listing,
    /// Detail page: resolves image tiers and emits one item
    Detail,
    /// Content page: re-enqueues its thumbnails and emits one item
    Content,
    /// Image bytes to be stored with the tier's prefix
    #[serde(skip_deserializing)]
    Asset(AssetTier),
}

impl fmt::Display for ParserKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Listing => write!(f, "listing"),
            Self::Detail => write!(f, "detail"),
            Self::Content => write!(f, "content"),
            Self::Asset(tier) => write!(f, "asset:{}", tier),
        }
    }
}

/// A pending fetch
///
/// `follow` means the rule engine runs over the response. A request without a
/// parser and with `follow` set is discover-only: it is traversed for links but
/// yields no item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    url: Url,
    parser: Option<ParserKind>,
    follow: bool,
}

impl Request {
    pub fn new(url: Url, parser: Option<ParserKind>, follow: bool) -> Self {
        Self {
            url,
            parser,
            follow,
        }
    }

    /// Parsed by `kind`, no rule evaluation
    pub fn parse_only(url: Url, kind: ParserKind) -> Self {
        Self::new(url, Some(kind), false)
    }

    /// Traversed by the rule engine, not parsed
    pub fn discover(url: Url) -> Self {
        Self::new(url, None, true)
    }

    /// Image bytes for the given tier
    pub fn asset(url: Url, tier: AssetTier) -> Self {
        Self::new(url, Some(ParserKind::Asset(tier)), false)
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn parser(&self) -> Option<ParserKind> {
        self.parser
    }

    pub fn follows(&self) -> bool {
        self.follow
    }

    pub fn is_asset(&self) -> bool {
        matches!(self.parser, Some(ParserKind::Asset(_)))
    }
}

impl fmt::Display for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.parser {
            Some(kind) => write!(f, "{} [{}]", self.url, kind),
            None => write!(f, "{} [discover]", self.url),
        }
    }
}
