//! Asset storage for downloaded images
//!
//! This module handles:
//! - The `AssetSink` boundary that persists image bytes under a name
//! - The naming policy turning a source URL and tier into a file name
//! - A filesystem sink writing into the configured images directory

mod filesystem;
mod naming;
mod traits;

pub use filesystem::FsAssetSink;
pub use naming::{derive_filename, AssetTier};
pub use traits::{AssetSink, StorageError, StorageResult};

use crate::config::StorageConfig;

/// Names a fetched asset and hands it to the sink
///
/// # Arguments
///
/// * `sink` - Where the bytes go
/// * `policy` - Extension allow-list and default extension
/// * `url` - URL the bytes were served from
/// * `tier` - Preview or full size; selects the file name prefix
/// * `bytes` - The asset body
///
/// # Returns
///
/// The file name the asset was stored under. Two different URLs ending in the
/// same path segment map to the same name; the later write replaces the
/// earlier one.
pub async fn retrieve_asset(
    sink: &dyn AssetSink,
    policy: &StorageConfig,
    url: &str,
    tier: AssetTier,
    bytes: &[u8],
) -> StorageResult<String> {
    let filename = derive_filename(url, tier.prefix(), policy)?;
    sink.store(&filename, bytes).await?;
    tracing::debug!("Stored {} ({} bytes) from {}", filename, bytes.len(), url);
    Ok(filename)
}
