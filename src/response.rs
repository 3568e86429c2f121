//! Response classification
//!
//! The platform answers a query either with one XML market document or with a ZIP
//! archive of several documents. The `Content-Type` header is authoritative when it
//! names zip, but it is sometimes missing or generic, so the body signature is the
//! fallback.

use tracing::debug;

use crate::error::EntsoeError;
use crate::transformations::body_excerpt;
use crate::types::{RawResponse, ResponseMode};

/// Local file header signature of a ZIP archive
const ZIP_LOCAL_HEADER: &[u8] = b"PK\x03\x04";

/// End-of-central-directory signature, first bytes of an empty ZIP archive
const ZIP_EMPTY_ARCHIVE: &[u8] = b"PK\x05\x06";

/// Decide how a response body is packaged
///
/// # Arguments
///
/// * `body` - Raw response body
/// * `content_type` - `Content-Type` header value, if any
///
/// # Returns
///
/// * `Ok(ResponseMode::Archive)` - Header contains "zip" (any case), or the body starts with a ZIP signature
/// * `Ok(ResponseMode::SingleDocument)` - Anything else
/// * `Err(EntsoeError::EmptyResponse)` - Zero-length body
///
/// # Examples
///
/// ```
/// # use entsoe_data::response::classify;
/// # use entsoe_data::types::ResponseMode;
/// assert_eq!(classify(b"<xml/>", Some("application/ZIP")).unwrap(), ResponseMode::Archive);
/// assert_eq!(classify(b"PK\x03\x04rest", None).unwrap(), ResponseMode::Archive);
/// assert_eq!(classify(b"<xml/>", Some("text/xml")).unwrap(), ResponseMode::SingleDocument);
/// assert!(classify(b"", None).is_err());
/// ```
pub fn classify(body: &[u8], content_type: Option<&str>) -> Result<ResponseMode, EntsoeError> {
    if body.is_empty() {
        return Err(EntsoeError::EmptyResponse);
    }

    if let Some(header) = content_type {
        if header.to_ascii_lowercase().contains("zip") {
            debug!(content_type = header, "classified response as archive by header");
            return Ok(ResponseMode::Archive);
        }
    }

    if body.starts_with(ZIP_LOCAL_HEADER) || body.starts_with(ZIP_EMPTY_ARCHIVE) {
        debug!(?content_type, "classified response as archive by signature");
        return Ok(ResponseMode::Archive);
    }

    debug!(?content_type, bytes = body.len(), "classified response as single document");
    Ok(ResponseMode::SingleDocument)
}

/// Reject non-success responses before classification
///
/// The excerpt keeps at most `excerpt_limit` characters of the body.
pub fn check_status(response: &RawResponse, excerpt_limit: usize) -> Result<(), EntsoeError> {
    if response.is_success() {
        return Ok(());
    }

    Err(EntsoeError::Api {
        status: response.status,
        excerpt: body_excerpt(&response.body, excerpt_limit),
    })
}
