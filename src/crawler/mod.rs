//! Crawler module for the crawl session
//!
//! This module contains the crawl-and-extract engine, including:
//! - Requests and the `ParserKind` tags that route them
//! - The fetch boundary and its HTTP implementation
//! - The frontier (FIFO + session-wide dedup) and concurrency limiting
//! - Rule-driven link extraction
//! - The listing, detail and content page parsers
//! - Overall session coordination

mod coordinator;
mod fetcher;
pub mod parsers;
mod request;
mod rules;
mod scheduler;

pub use coordinator::{run_crawl, seed_requests, Coordinator};
pub use fetcher::{build_http_client, FetchedPage, Fetcher, HttpFetcher};
pub use parsers::{run_parser, ParseOutput};
pub use request::{ParserKind, Request};
pub use rules::{CrawlRule, RuleEngine};
pub use scheduler::{Frontier, ScheduledFetch, Scheduler};
