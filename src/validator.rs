use once_cell::sync::Lazy;
use regex::Regex;
use url::Url;
use validator::ValidationError;

use crate::types::{EcLevel, OutputFormat};

static HEX_COLOR_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^#[0-9a-fA-F]{6}$").unwrap());

// Schemes that would let a scanned code execute script or smuggle a
// payload instead of opening a page.
static BLOCKED_SCHEMES: [&str; 2] = ["javascript", "data"];

pub fn validate_absolute_url(url: &str) -> Result<(), ValidationError> {
    if url.is_empty() {
        let mut err = ValidationError::new("url_required");
        err.message = Some("url is required".into());
        return Err(err);
    }
    let parsed = Url::parse(url).map_err(|_| {
        let mut err = ValidationError::new("invalid_url");
        err.message = Some("must be a valid absolute URL".into());
        err.add_param("url".into(), &url);
        err
    })?;
    if BLOCKED_SCHEMES.contains(&parsed.scheme()) {
        let mut err = ValidationError::new("blocked_url_scheme");
        err.message = Some("URL scheme is not allowed".into());
        err.add_param("scheme".into(), &parsed.scheme());
        return Err(err);
    }
    Ok(())
}

pub fn validate_hex_color(color: &str) -> Result<(), ValidationError> {
    if HEX_COLOR_REGEX.is_match(color) {
        return Ok(());
    }
    let mut err = ValidationError::new("invalid_hex_color");
    err.message = Some("must be # followed by exactly 6 hex digits".into());
    err.add_param("value".into(), &color);
    Err(err)
}

pub fn validate_output_format(value: &str) -> Result<(), ValidationError> {
    value.parse::<OutputFormat>().map(|_| ())
}

pub fn validate_ec_level(value: &str) -> Result<(), ValidationError> {
    value.parse::<EcLevel>().map(|_| ())
}
