use crate::config::StorageConfig;
use crate::storage::{StorageError, StorageResult};
use std::fmt;

/// Which resolution tier an asset request fetches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetTier {
    /// Narrowest variant
    Preview,
    /// Widest variant
    Full,
}

impl AssetTier {
    /// File name prefix for this tier
    pub fn prefix(&self) -> &'static str {
        match self {
            Self::Preview => "preview_",
            Self::Full => "full_",
        }
    }
}

impl fmt::Display for AssetTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Preview => write!(f, "preview"),
            Self::Full => write!(f, "full"),
        }
    }
}

/// Derives the stored file name for an asset URL
///
/// The query string and fragment are dropped and the final path segment is
/// kept. If that segment does not end in one of the allowed extensions
/// (case-insensitive) the default extension is appended. The prefix goes in
/// front.
///
/// # Examples
///
/// ```
/// use shutter_sweep::config::StorageConfig;
/// use shutter_sweep::storage::derive_filename;
///
/// let policy = StorageConfig::default();
/// assert_eq!(derive_filename("https://cdn/a/abc.jpg?w=100", "", &policy).unwrap(), "abc.jpg");
/// assert_eq!(derive_filename("https://cdn/a/xyz", "preview_", &policy).unwrap(), "preview_xyz.jpg");
/// ```
pub fn derive_filename(url: &str, prefix: &str, policy: &StorageConfig) -> StorageResult<String> {
    let without_query = url.split(['?', '#']).next().unwrap_or_default();
    let base = without_query.rsplit('/').next().unwrap_or_default();

    if base.is_empty() || base == "." || base == ".." || base.contains('\\') || base.contains(':') {
        return Err(StorageError::InvalidName(url.to_string()));
    }

    let lowered = base.to_lowercase();
    let has_allowed_extension = policy
        .allowed_extensions
        .iter()
        .any(|ext| lowered.ends_with(&ext.to_lowercase()));

    if has_allowed_extension {
        Ok(format!("{}{}", prefix, base))
    } else {
        Ok(format!("{}{}{}", prefix, base, policy.default_extension))
    }
}
