//! Fragment-style page parameter parsing.
//!
//! The automatic processing entry point is addressed with a fragment like
//! `country=de&language=de&query=w+Berlin`. Pairs are `&`-delimited, keys and
//! values are separated by `=`, and values are `+`-to-space plus
//! percent-decoded. Malformed pairs are skipped, never fatal.

use std::collections::HashMap;

use tracing::debug;

/// Recognized parameter keys. Unknown keys are kept in the map so callers
/// can pass the whole set through as locale overrides.
pub const PARAM_COUNTRY: &str = "country";
pub const PARAM_LANGUAGE: &str = "language";
pub const PARAM_QUERY: &str = "query";

/// Parse a fragment-style parameter list into a key/value map.
///
/// A leading `#` is tolerated so raw `window.location.hash`-shaped input can
/// be pasted verbatim.
pub fn parse_fragment(fragment: &str) -> HashMap<String, String> {
    let fragment = fragment.strip_prefix('#').unwrap_or(fragment);
    let mut parameters = HashMap::new();
    if fragment.is_empty() {
        return parameters;
    }

    for pair in fragment.split('&') {
        let Some((key, value)) = pair.split_once('=') else {
            debug!(pair, "parameter_skipped");
            continue;
        };
        if key.is_empty() {
            debug!(pair, "parameter_skipped");
            continue;
        }
        match urlencoding::decode(&value.replace('+', " ")) {
            Ok(decoded) => {
                parameters.insert(key.to_string(), decoded.into_owned());
            }
            Err(error) => debug!(pair, %error, "parameter_skipped"),
        }
    }

    parameters
}
