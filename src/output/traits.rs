//! Output handler traits and error types

use crate::extract::Item;
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to serialize item: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Downstream consumer of items
///
/// The crawl session calls `emit` from a single task, in completion order.
pub trait ItemSink: Send {
    /// Records one item
    fn emit(&mut self, item: &Item) -> OutputResult<()>;

    /// Flushes buffered output; called once when the session ends
    fn finish(&mut self) -> OutputResult<()> {
        Ok(())
    }
}

impl ItemSink for Vec<Item> {
    fn emit(&mut self, item: &Item) -> OutputResult<()> {
        self.push(item.clone());
        Ok(())
    }
}
