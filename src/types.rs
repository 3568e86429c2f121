//! Data structures flowing through one fetch cycle
//!
//! These structs represent the raw transport response on the way in and the typed
//! time-series records produced by the parser, ready for aggregation.

use std::fmt;

use chrono::{DateTime, Duration, Utc};

use crate::codes::{psr_category_name, DocumentType};
use crate::error::ParseError;

// ============================================================================
// Input Boundary
// ============================================================================

/// Response handed over by the transport collaborator
///
/// Header names are kept as received; lookups are case-insensitive.
#[derive(Debug, Clone, Default)]
pub struct RawResponse {
    /// HTTP status code
    pub status: u16,

    /// Response headers in arrival order
    pub headers: Vec<(String, String)>,

    /// Undecoded response body
    pub body: Vec<u8>,
}

impl RawResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: body.into(),
        }
    }

    /// Builder-style header insertion
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// First header value matching `name` (case-insensitive)
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn content_type(&self) -> Option<&str> {
        self.header("content-type")
    }

    /// True for 2xx status codes
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Packaging of a response body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseMode {
    /// Body is one XML market document
    SingleDocument,
    /// Body is a ZIP archive holding one or more documents
    Archive,
}

// ============================================================================
// Parsed Documents
// ============================================================================

/// Fixed interval length of one time-series block
///
/// Only fixed-length durations are representable; calendar months and years are
/// rejected at parse time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Resolution(Duration);

impl Resolution {
    /// Build a resolution from a positive duration
    pub fn new(duration: Duration) -> Option<Self> {
        (duration > Duration::zero()).then_some(Self(duration))
    }

    pub fn from_minutes(minutes: i64) -> Option<Self> {
        Duration::try_minutes(minutes).and_then(Self::new)
    }

    pub fn duration(&self) -> Duration {
        self.0
    }

    /// Whole minutes (sub-minute resolutions round down)
    pub fn minutes(&self) -> i64 {
        self.0.num_minutes()
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let seconds = self.0.num_seconds();
        if seconds % 60 == 0 {
            write!(f, "PT{}M", seconds / 60)
        } else {
            write!(f, "PT{}S", seconds)
        }
    }
}

/// One interval value within a time-series block
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    /// 1-based position within the period
    pub position: u32,

    /// Reported value; `None` means no data for the interval (distinct from zero)
    pub quantity: Option<f64>,
}

/// One `Period` of one `TimeSeries` block
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeriesRecord {
    /// Production type code (e.g. "B16"), absent for load and price documents
    pub category: Option<String>,

    pub resolution: Resolution,

    /// Start of the first interval, UTC
    pub period_start: DateTime<Utc>,

    /// Points ordered by position; positions may be sparse
    pub points: Vec<Point>,

    /// Unit label from the series header (e.g. "MAW", "EUR/MWH")
    pub unit: Option<String>,
}

impl TimeSeriesRecord {
    /// Absolute start of the interval at `position`
    ///
    /// `period_start + (position - 1) * resolution`, or `None` when the result
    /// does not fit the calendar range.
    pub fn timestamp_at(&self, position: u32) -> Option<DateTime<Utc>> {
        let offset = i32::try_from(position.checked_sub(1)?).ok()?;
        let delta = self.resolution.duration().checked_mul(offset)?;
        self.period_start.checked_add_signed(delta)
    }

    /// Timestamped values of every point carrying a quantity
    ///
    /// # Returns
    ///
    /// * `Ok(Vec<(DateTime<Utc>, f64)>)` - In point order
    /// * `Err(ParseError::InvalidPosition)` - If a position maps outside the calendar range
    pub fn values(&self) -> Result<Vec<(DateTime<Utc>, f64)>, ParseError> {
        self.points
            .iter()
            .filter_map(|point| point.quantity.map(|quantity| (point.position, quantity)))
            .map(|(position, quantity)| {
                self.timestamp_at(position)
                    .map(|timestamp| (timestamp, quantity))
                    .ok_or_else(|| ParseError::InvalidPosition(position.to_string()))
            })
            .collect()
    }

    pub fn category_key(&self) -> CategoryKey {
        match &self.category {
            Some(code) => CategoryKey::Code(code.clone()),
            None => CategoryKey::Uncategorized,
        }
    }
}

/// Output of parsing one market document
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedDocument {
    pub document_type: DocumentType,

    /// One record per `Period`, in document order
    pub records: Vec<TimeSeriesRecord>,

    /// Reason text of an acknowledgement document
    pub reason: Option<String>,
}

impl ParsedDocument {
    pub fn is_acknowledgement(&self) -> bool {
        self.document_type == DocumentType::Acknowledgement
    }
}

// ============================================================================
// Aggregation Keys
// ============================================================================

/// Bucket key of an aggregated series
///
/// Load and price documents carry no production type and land in `Uncategorized`,
/// which sorts before every code.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CategoryKey {
    Uncategorized,
    Code(String),
}

impl CategoryKey {
    /// Category name of a production type code, `None` when uncategorized
    pub fn category_name(&self) -> Option<&'static str> {
        match self {
            CategoryKey::Uncategorized => None,
            CategoryKey::Code(code) => Some(psr_category_name(code)),
        }
    }
}

impl fmt::Display for CategoryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CategoryKey::Uncategorized => f.write_str("none"),
            CategoryKey::Code(code) => f.write_str(code),
        }
    }
}
