//! Image variant resolver
//!
//! A descriptor lists the same image at several widths, e.g.
//! `"https://cdn/x?w=200 200w, https://cdn/x?w=800 800w"`. Entries are separated
//! by a comma followed by whitespace (or the end of the string), so commas
//! inside a URL survive.

use crate::MalformedVariantError;

/// One (url, width) pair from a descriptor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageVariant {
    pub url: String,
    /// Always > 0
    pub width: u32,
}

/// Parses a multi-resolution descriptor into its variants
///
/// Each entry must split into exactly two whitespace-separated tokens: a URL
/// and a width such as `400w`. The trailing unit letter is stripped before the
/// width is parsed. Any bad entry fails the whole descriptor, so callers never
/// see a partial variant list. Blank input yields no variants.
///
/// # Examples
///
/// ```
/// use shutter_sweep::extract::parse_descriptor;
///
/// let variants = parse_descriptor("u1 200w, u2 400w").unwrap();
/// assert_eq!(variants.len(), 2);
/// assert_eq!(variants[1].url, "u2");
/// assert_eq!(variants[1].width, 400);
///
/// assert!(parse_descriptor("u1 wide").is_err());
/// ```
pub fn parse_descriptor(raw: &str) -> Result<Vec<ImageVariant>, MalformedVariantError> {
    split_entries(raw)
        .into_iter()
        .map(parse_entry)
        .collect()
}

fn parse_entry(entry: &str) -> Result<ImageVariant, MalformedVariantError> {
    let tokens: Vec<&str> = entry.split_whitespace().collect();
    let [url, width_token] = tokens.as_slice() else {
        return Err(MalformedVariantError::TokenCount {
            entry: entry.to_string(),
            found: tokens.len(),
        });
    };

    let digits = width_token
        .strip_suffix(|c: char| c.is_ascii_alphabetic())
        .unwrap_or(*width_token);

    match digits.parse::<u32>() {
        Ok(width) if width > 0 => Ok(ImageVariant {
            url: (*url).to_string(),
            width,
        }),
        _ => Err(MalformedVariantError::Width {
            entry: entry.to_string(),
            width: (*width_token).to_string(),
        }),
    }
}

/// Splits on commas that are followed by whitespace or end the input
fn split_entries(raw: &str) -> Vec<&str> {
    let mut entries = Vec::new();
    let mut start = 0;
    let mut chars = raw.char_indices().peekable();

    while let Some((idx, c)) = chars.next() {
        if c != ',' {
            continue;
        }
        let at_boundary = chars.peek().map_or(true, |(_, next)| next.is_whitespace());
        if at_boundary {
            entries.push(&raw[start..idx]);
            start = idx + 1;
        }
    }
    entries.push(&raw[start..]);

    entries
        .into_iter()
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .collect()
}

/// Returns the narrowest variant; ties go to the earliest entry
pub fn select_min(variants: &[ImageVariant]) -> Option<&ImageVariant> {
    variants
        .iter()
        .reduce(|best, v| if v.width < best.width { v } else { best })
}

/// Returns the widest variant; ties go to the earliest entry
pub fn select_max(variants: &[ImageVariant]) -> Option<&ImageVariant> {
    variants
        .iter()
        .reduce(|best, v| if v.width > best.width { v } else { best })
}
