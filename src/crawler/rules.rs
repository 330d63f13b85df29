//! Rule-driven link extraction
//!
//! Each rule names a region of the page (a CSS selector). Links inside that
//! region become requests carrying the rule's parser tag and follow flag.
//! Rules are evaluated in order; a URL claimed by an earlier rule on a page is
//! not emitted again by a later one.

use crate::config::RuleConfig;
use crate::crawler::{ParserKind, Request};
use crate::extract::{compile_selector, resolve_link, Page};
use crate::ConfigError;
use scraper::Selector;
use std::collections::HashSet;
use url::Url;

/// A link-extraction rule
#[derive(Debug, Clone)]
pub struct CrawlRule {
    scope: Selector,
    source: String,
    follow: bool,
    parser: Option<ParserKind>,
}

impl CrawlRule {
    /// Compiles a rule from its selector scope
    pub fn new(scope: &str, follow: bool, parser: Option<ParserKind>) -> Result<Self, ConfigError> {
        Ok(Self {
            scope: compile_selector(scope)?,
            source: scope.to_string(),
            follow,
            parser,
        })
    }

    /// Followed and parsed as content pages
    pub fn content(scope: &str) -> Result<Self, ConfigError> {
        Self::new(scope, true, Some(ParserKind::Content))
    }

    /// Followed but not parsed; extends reach through intermediate pages
    pub fn pagination(scope: &str) -> Result<Self, ConfigError> {
        Self::new(scope, true, None)
    }

    pub fn scope(&self) -> &str {
        &self.source
    }

    pub fn follows(&self) -> bool {
        self.follow
    }

    pub fn parser(&self) -> Option<ParserKind> {
        self.parser
    }

    /// Absolute link targets inside this rule's scope, in document order
    ///
    /// A scope element contributes its own `href` (when it has one) followed
    /// by those of descendant `a` and `area` elements.
    pub fn extract_links(&self, page: &Page) -> Vec<Url> {
        let anchors = anchor_selector();
        let mut links = Vec::new();

        for region in page.select(&self.scope) {
            if let Some(href) = region.value().attr("href") {
                links.extend(resolve_link(href, page.url()));
            }
            if let Some(anchors) = &anchors {
                links.extend(
                    region
                        .select(anchors)
                        .filter_map(|anchor| anchor.value().attr("href"))
                        .filter_map(|href| resolve_link(href, page.url())),
                );
            }
        }

        links
    }
}

fn anchor_selector() -> Option<Selector> {
    Selector::parse("a[href], area[href]").ok()
}

/// Ordered rule table for a session
#[derive(Debug, Clone, Default)]
pub struct RuleEngine {
    rules: Vec<CrawlRule>,
}

impl RuleEngine {
    pub fn new(rules: Vec<CrawlRule>) -> Self {
        Self { rules }
    }

    /// Compiles the `[[rule]]` entries, preserving order
    pub fn from_config(rules: &[RuleConfig]) -> Result<Self, ConfigError> {
        rules
            .iter()
            .map(|rule| CrawlRule::new(&rule.scope, rule.follow, rule.parser))
            .collect::<Result<Vec<_>, _>>()
            .map(Self::new)
    }

    pub fn rules(&self) -> &[CrawlRule] {
        &self.rules
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Runs every rule over the page
    ///
    /// Requests come out grouped by rule, in rule order, and in document order
    /// within a rule. A rule with no matches contributes nothing.
    pub fn apply(&self, page: &Page) -> Vec<Request> {
        let mut seen: HashSet<Url> = HashSet::new();
        let mut requests = Vec::new();

        for rule in &self.rules {
            let mut matched = 0;
            for url in rule.extract_links(page) {
                if seen.insert(url.clone()) {
                    requests.push(Request::new(url, rule.parser, rule.follow));
                    matched += 1;
                }
            }
            tracing::trace!(
                "Rule '{}' yielded {} link(s) on {}",
                rule.source,
                matched,
                page.url()
            );
        }

        requests
    }
}
