//! Error types for ENTSO-E response normalization
//!
//! Provides typed errors for every failure mode of a fetch cycle:
//! - Transport-level outcomes the core still has to reject (empty body, non-success status)
//! - Document parsing errors (missing mandatory fields, invalid values, broken XML or ZIP)
//! - Archives that contain nothing usable
//!
//! Query planning and configuration loading have their own, smaller error types.

use thiserror::Error;

/// Top-level error type for one fetch cycle
///
/// Any variant aborts the cycle; callers keep serving the previous snapshot.
#[derive(Debug, Error)]
pub enum EntsoeError {
    /// Response body has zero length
    #[error("API returned empty response")]
    EmptyResponse,

    /// Non-success HTTP status
    ///
    /// `excerpt` is the beginning of the response body, truncated for logging.
    #[error("HTTP {status} error: {excerpt}")]
    Api { status: u16, excerpt: String },

    /// Structurally invalid document or archive, or a missing mandatory field
    #[error("Malformed document: {0}")]
    MalformedDocument(#[from] ParseError),

    /// Archive contained no documents after filtering
    #[error("Archive contained no usable documents")]
    NoDocumentsFound,
}

/// Document parsing errors
///
/// The `Display` output is the short diagnostic surfaced through
/// [`EntsoeError::MalformedDocument`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    /// Mandatory element missing from a time-series block
    ///
    /// Example: `Period` without `resolution`
    #[error("Missing required element '{field}' in {context}")]
    MissingField { field: String, context: String },

    /// Timestamp not in `YYYY-MM-DDTHH:MMZ` or RFC 3339 form
    #[error("Invalid timestamp: '{0}' (expected YYYY-MM-DDTHH:MMZ)")]
    InvalidTimestamp(String),

    /// Resolution is not a fixed-length ISO 8601 duration
    ///
    /// Example: "P1M" (calendar months have no fixed length)
    #[error("Unsupported resolution: '{0}' (expected e.g. PT15M, PT60M, PT1H, P1D)")]
    InvalidResolution(String),

    /// Point position is not a positive integer
    #[error("Invalid point position: '{0}'")]
    InvalidPosition(String),

    /// Point quantity is not a finite decimal number
    #[error("Invalid quantity: '{0}'")]
    InvalidQuantity(String),

    /// Document type code outside the supported set
    #[error("Unknown document type: '{0}'")]
    UnknownDocumentType(String),

    /// Payload is not well-formed XML (or not UTF-8)
    #[error("XML format error: {0}")]
    Xml(String),

    /// ZIP container or entry could not be read
    #[error("Archive format error: {0}")]
    Archive(String),
}

impl From<quick_xml::DeError> for ParseError {
    fn from(err: quick_xml::DeError) -> Self {
        ParseError::Xml(err.to_string())
    }
}

impl From<zip::result::ZipError> for ParseError {
    fn from(err: zip::result::ZipError) -> Self {
        ParseError::Archive(err.to_string())
    }
}

impl From<zip::result::ZipError> for EntsoeError {
    fn from(err: zip::result::ZipError) -> Self {
        EntsoeError::MalformedDocument(err.into())
    }
}

/// Query planning errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum QueryError {
    /// Area identifier is neither a known area key nor a known EIC code
    #[error("Unknown area identifier: '{0}'")]
    UnknownArea(String),

    /// Process type alias or code not supported for the query kind
    #[error("Unknown process type: '{0}'")]
    UnknownProcessType(String),
}

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Cannot read configuration: {0}")]
    Io(#[from] std::io::Error),

    /// TOML syntax or schema error
    #[error("Invalid configuration: {0}")]
    Toml(#[from] toml::de::Error),

    /// A merge policy references a document type code that does not exist
    #[error("Invalid merge policy entry: {0}")]
    UnknownDocumentType(#[source] ParseError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_conversion() {
        let err = ParseError::InvalidQuantity("12,5a".to_string());
        let cycle_err: EntsoeError = err.into();

        match cycle_err {
            EntsoeError::MalformedDocument(ParseError::InvalidQuantity(val)) => {
                assert_eq!(val, "12,5a");
            }
            _ => panic!("Expected MalformedDocument error"),
        }
    }

    #[test]
    fn test_zip_error_conversion() {
        let err = zip::result::ZipError::InvalidArchive("bad central directory".into());
        let cycle_err: EntsoeError = err.into();

        match cycle_err {
            EntsoeError::MalformedDocument(ParseError::Archive(msg)) => {
                assert!(msg.contains("bad central directory"));
            }
            _ => panic!("Expected MalformedDocument error"),
        }
    }

    #[test]
    fn test_missing_field_formatting() {
        let err = ParseError::MissingField {
            field: "resolution".to_string(),
            context: "TimeSeries #1, Period #1".to_string(),
        };
        let msg = format!("{}", err);
        assert!(msg.contains("Missing required element"));
        assert!(msg.contains("resolution"));
        assert!(msg.contains("TimeSeries #1"));
    }

    #[test]
    fn test_api_error_formatting() {
        let err = EntsoeError::Api {
            status: 401,
            excerpt: "Unauthorized".to_string(),
        };
        let msg = format!("{}", err);
        assert!(msg.contains("HTTP 401"));
        assert!(msg.contains("Unauthorized"));
    }

    #[test]
    fn test_malformed_document_display_includes_diagnostic() {
        let err = EntsoeError::from(ParseError::UnknownDocumentType("Z99".to_string()));
        assert_eq!(
            err.to_string(),
            "Malformed document: Unknown document type: 'Z99'"
        );
    }
}
