//! URI normalization.
//!
//! Every document is keyed by the filesystem path behind its `file://` URI.
//! The same function resolves the key on open and on every later lookup, so
//! it must be pure and idempotent.

use hms_core::error::{HmsError, Result};

/// Normalizes an editor URI (or an already normalized path) into a path.
///
/// - Only POSIX platforms are supported; elsewhere this always fails with
///   [`HmsError::UnsupportedPlatform`].
/// - An absolute path (`/...`) is returned unchanged.
/// - `%5C` (an escaped backslash) is rewritten to `/` before parsing.
/// - The scheme must be `file`.
/// - The percent-decoded path component is returned as is.
///
/// # Examples
///
/// ```
/// use hms_lsp::document::normalize;
///
/// let path = normalize("file:///home/user/My%20Scripts/lights.hms").unwrap();
/// assert_eq!(path, "/home/user/My Scripts/lights.hms");
/// assert_eq!(normalize(&path).unwrap(), path);
///
/// assert!(normalize("untitled:Untitled-1").is_err());
/// ```
pub fn normalize(uri_or_path: &str) -> Result<String> {
    if !cfg!(unix) {
        return Err(HmsError::UnsupportedPlatform);
    }

    if uri_or_path.starts_with('/') {
        return Ok(uri_or_path.to_string());
    }

    let desensitized = uri_or_path.replace("%5C", "/");

    let (scheme, rest) = desensitized
        .split_once(':')
        .filter(|(scheme, _)| is_valid_scheme(scheme))
        .ok_or_else(|| HmsError::InvalidUri(uri_or_path.to_string()))?;

    if !scheme.eq_ignore_ascii_case("file") {
        return Err(HmsError::UnsupportedScheme(scheme.to_string()));
    }

    let rest = rest.split(['?', '#']).next().unwrap_or_default();

    // Skip the authority; `file://host/path` and `file:///path` both keep `/path`.
    let path = match rest.strip_prefix("//") {
        Some(after_authority) => after_authority
            .find('/')
            .map_or("", |idx| &after_authority[idx..]),
        None => rest,
    };

    let decoded =
        urlencoding::decode(path).map_err(|_| HmsError::InvalidUri(uri_or_path.to_string()))?;

    Ok(decoded.into_owned())
}

/// `ALPHA *( ALPHA / DIGIT / "+" / "-" / "." )`
fn is_valid_scheme(scheme: &str) -> bool {
    let mut chars = scheme.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}
