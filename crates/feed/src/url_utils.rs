// ABOUTME: Safe URL resolution for feed links and image sources.
// ABOUTME: Resolves relative candidates against a base and extracts hosts, never failing.

use url::Url;

/// Resolves a possibly relative `candidate` against `base`.
///
/// An absolute candidate is returned unchanged (trimmed). A relative one is
/// joined onto `base` when `base` is itself an absolute URL. Anything else
/// (blank input, malformed base or candidate) yields `None`.
pub fn resolve_safe_url(base: Option<&str>, candidate: Option<&str>) -> Option<String> {
    let candidate = candidate.map(str::trim).filter(|c| !c.is_empty())?;

    match Url::parse(candidate) {
        Ok(url) if is_usable_absolute(&url) => return Some(candidate.to_string()),
        // Schemes such as `javascript:` carry no resource to resolve.
        Ok(_) => return None,
        Err(_) => {}
    }

    // Protocol-relative and rooted/relative paths all go through the base.
    let base = base.map(str::trim).filter(|b| !b.is_empty())?;
    let base = Url::parse(base).ok()?;
    if base.cannot_be_a_base() {
        return None;
    }
    base.join(candidate).ok().map(String::from)
}

/// Returns the host component of an absolute URL.
pub fn host_of(url: &str) -> Option<String> {
    let parsed = Url::parse(url.trim()).ok()?;
    parsed
        .host_str()
        .filter(|h| !h.is_empty())
        .map(str::to_string)
}

fn is_usable_absolute(url: &Url) -> bool {
    url.has_host() || url.scheme() == "data"
}
