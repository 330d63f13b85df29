//! Output module for emitted items and crawl statistics
//!
//! This module handles:
//! - The `ItemSink` boundary receiving one record per parsed page
//! - Writing items as JSON Lines
//! - Recording and printing per-session statistics

mod jsonl;
pub mod stats;
mod traits;

pub use jsonl::JsonLinesWriter;
pub use stats::{print_statistics, CrawlStats};
pub use traits::{ItemSink, OutputError, OutputResult};
