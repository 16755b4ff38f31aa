use url::Url;

use crate::errors::MalformedOrigin;

/// Reduce a URL to its serialised origin, e.g. `https://example.com:8443`.
///
/// Path, query and fragment are dropped, the host is lowercased and a default port is
/// elided. Opaque origins (`data:`, `file:`, ...) have no authority and are rejected.
pub fn normalize_origin(raw: &str) -> Result<String, MalformedOrigin> {
    let malformed = |reason: String| MalformedOrigin {
        input: raw.to_string(),
        reason,
    };

    let parsed = Url::parse(raw.trim()).map_err(|err| malformed(err.to_string()))?;
    let origin = parsed.origin();
    if !origin.is_tuple() {
        return Err(malformed("opaque origin".into()));
    }
    Ok(origin.ascii_serialization())
}

/// Lowercased host of a URL, used only to bucket records in stores.
pub(crate) fn host_key(raw: &str) -> Option<String> {
    Url::parse(raw.trim())
        .ok()
        .and_then(|url| url.host_str().map(|host| host.to_ascii_lowercase()))
}
