//! entsoe-data - Response normalization for the ENTSO-E Transparency Platform
//!
//! Turns raw, inconsistently packaged API responses (prices, load forecasts,
//! generation per production type) into clean per-timestamp timelines per category.
//!
//! # Features
//! - Response classification by `Content-Type` with ZIP signature fallback
//! - Lazy, name-ordered extraction of documents from ZIP archives
//! - Schema-driven XML parsing into typed time-series records (serde + quick-xml)
//! - Additive merge of contributing series, configurable per document type
//! - Timelines with current/next/min/max/average against a reference instant
//! - Swap-on-success snapshots: a failed fetch keeps the last good data
//! - Request planning for areas, process types and load horizons
//!
//! # Architecture
//! One fetch cycle runs synchronously:
//! `response` → (`archive` →) `xml_parser` → `aggregator` → `timeline`.
//! HTTP transport, credentials and scheduling belong to the caller.
//!
//! # Example
//!
//! ```rust
//! use chrono::{TimeZone, Utc};
//! use entsoe_data::{CategoryKey, Horizon, Pipeline, PipelineConfig, RawResponse, SnapshotStore};
//!
//! let xml = r#"<GL_MarketDocument><type>A75</type><TimeSeries>
//!   <MktPSRType><psrType>B16</psrType></MktPSRType>
//!   <Period>
//!     <timeInterval><start>2024-06-01T10:00Z</start></timeInterval>
//!     <resolution>PT60M</resolution>
//!     <Point><position>1</position><quantity>1200</quantity></Point>
//!     <Point><position>2</position><quantity>1350</quantity></Point>
//!   </Period>
//! </TimeSeries></GL_MarketDocument>"#;
//!
//! let pipeline = Pipeline::new(PipelineConfig::default()).unwrap();
//! let mut store = SnapshotStore::new();
//! let now = Utc.with_ymd_and_hms(2024, 6, 1, 10, 15, 0).unwrap();
//!
//! pipeline
//!     .run_cycle(&mut store, [&RawResponse::new(200, xml)], now)
//!     .unwrap();
//!
//! let solar = store
//!     .timeline(&CategoryKey::Code("B16".to_string()), now, Horizon::All)
//!     .unwrap();
//! assert_eq!(solar.current, Some(1200.0));
//! assert_eq!(solar.next, Some(1350.0));
//! ```

pub mod aggregator;
pub mod archive;
pub mod codes;
pub mod config;
mod error;
pub mod pipeline;
pub mod query_router;
pub mod response;
pub mod timeline;
pub mod transformations;
pub mod types;
pub mod xml_parser;

// Re-export public types for easier access
pub use aggregator::{AggregatedSeries, AggregatedSet, Aggregator, MergePolicy};
pub use codes::{DocumentType, ProcessType};
pub use config::PipelineConfig;
pub use error::{ConfigError, EntsoeError, ParseError, QueryError};
pub use pipeline::{Pipeline, Snapshot, SnapshotStore};
pub use query_router::{LoadHorizon, QueryKind, QueryPlan};
pub use timeline::{Horizon, Timeline, TimelineAttributes};
pub use types::{CategoryKey, ParsedDocument, Point, RawResponse, ResponseMode, TimeSeriesRecord};
