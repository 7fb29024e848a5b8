//! Target origin derivation

use thiserror::Error;
use url::Url;

/// Errors deriving an origin from a base location
#[derive(Debug, Error)]
pub enum HostError {
    /// Not a parseable URL
    #[error("cannot parse base location {location:?}: {source}")]
    Parse {
        /// Offending input
        location: String,
        /// Parser error
        #[source]
        source: url::ParseError,
    },
    /// URL has an opaque origin (e.g. `data:` or `about:`)
    #[error("base location {0:?} has no addressable origin")]
    OpaqueOrigin(String),
}

/// Derive the `postMessage` target origin from the widget's base location
///
/// `https://widgets.example.org/ptt/index.html?x=1` becomes
/// `https://widgets.example.org`. Default ports are dropped.
pub fn origin_of(base_location: &str) -> Result<String, HostError> {
    let url = Url::parse(base_location).map_err(|source| HostError::Parse {
        location: base_location.to_string(),
        source,
    })?;

    let origin = url.origin();
    if !origin.is_tuple() {
        return Err(HostError::OpaqueOrigin(base_location.to_string()));
    }
    Ok(origin.ascii_serialization())
}
