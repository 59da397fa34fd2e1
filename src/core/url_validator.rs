// src/core/url_validator.rs

use crate::{constants::DEFAULT_HTTPS_PORT, models::ParsedUrl};
use url::Url;

/// Parses a user-supplied host URL into protocol, host and port.
///
/// Never fails: a malformed input yields [`ParsedUrl::invalid`]. When the literal
/// substring `:443` appears anywhere in the input the port is reported as 443,
/// otherwise it is the explicit port of the URL, or 0 when none is given.
pub fn validate_and_parse_url(input: &str) -> ParsedUrl {
    let url = match Url::parse(input) {
        Ok(url) => url,
        Err(e) => {
            log::debug!("'{}' is not a valid URL: {}", input, e);
            return ParsedUrl::invalid();
        }
    };

    // `Url::port` hides a port equal to the scheme default, hence the textual check.
    let port = if input.contains(":443") {
        DEFAULT_HTTPS_PORT
    } else {
        url.port().unwrap_or(0)
    };

    ParsedUrl {
        valid: true,
        protocol: Some(url.scheme().to_string()),
        host: url.host_str().map(str::to_string),
        port: Some(port),
    }
}
