//! Fetch cycle orchestration
//!
//! A fetch cycle runs classify → extract → parse → aggregate over the responses of one
//! poll. The cycle functions are pure: they either produce a complete [`AggregatedSet`]
//! or an error. [`SnapshotStore`] holds the last good result and swaps it only when a
//! cycle succeeds, so a failed poll leaves consumers with stale but valid data.
//!
//! # Example
//!
//! ```rust
//! use chrono::{TimeZone, Utc};
//! use entsoe_data::config::PipelineConfig;
//! use entsoe_data::pipeline::{Pipeline, SnapshotStore};
//! use entsoe_data::types::RawResponse;
//!
//! let xml = r#"<GL_MarketDocument><type>A65</type><TimeSeries><Period>
//!   <timeInterval><start>2024-01-01T00:00Z</start></timeInterval>
//!   <resolution>PT60M</resolution>
//!   <Point><position>1</position><quantity>10</quantity></Point>
//! </Period></TimeSeries></GL_MarketDocument>"#;
//!
//! let pipeline = Pipeline::new(PipelineConfig::default()).unwrap();
//! let mut store = SnapshotStore::new();
//! let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 30, 0).unwrap();
//!
//! let response = RawResponse::new(200, xml).with_header("Content-Type", "text/xml");
//! pipeline.run_cycle(&mut store, [&response], now).unwrap();
//!
//! let snapshot = store.current().unwrap();
//! assert_eq!(snapshot.data.point_count(), 1);
//! ```

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, info, warn};

use crate::aggregator::{AggregatedSet, Aggregator};
use crate::archive::ArchiveDocuments;
use crate::config::PipelineConfig;
use crate::error::{ConfigError, EntsoeError};
use crate::response::{check_status, classify};
use crate::timeline::{Horizon, Timeline};
use crate::types::{CategoryKey, ParsedDocument, RawResponse, ResponseMode};
use crate::xml_parser::parse_document;

// ============================================================================
// Pipeline
// ============================================================================

/// Configured response-normalization pipeline
#[derive(Debug, Clone)]
pub struct Pipeline {
    config: PipelineConfig,
    aggregator: Aggregator,
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> Result<Self, ConfigError> {
        let aggregator = config.aggregator()?;
        Ok(Self { config, aggregator })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Parse every document of one response
    ///
    /// # Returns
    ///
    /// * `Ok(Vec<ParsedDocument>)` - One document for a bare response, one per entry for an archive
    /// * `Err(EntsoeError)` - Non-success status, empty body, corrupt archive, archive
    ///   without documents, or any document failing to parse
    pub fn parse_response(&self, response: &RawResponse) -> Result<Vec<ParsedDocument>, EntsoeError> {
        check_status(response, self.config.excerpt_limit)?;

        match classify(&response.body, response.content_type())? {
            ResponseMode::SingleDocument => Ok(vec![parse_document(&response.body)?]),
            ResponseMode::Archive => {
                ArchiveDocuments::open(&response.body, &self.config.document_extension)?
                    .map(|entry| {
                        entry.and_then(|bytes| parse_document(&bytes).map_err(EntsoeError::from))
                    })
                    .collect()
            }
        }
    }

    /// Run one fetch cycle over a single response
    pub fn process_response(&self, response: &RawResponse) -> Result<AggregatedSet, EntsoeError> {
        self.process_responses([response])
    }

    /// Run one fetch cycle over several responses, aggregated together
    ///
    /// Used for multi-area queries (e.g. the Total Europe sum). Any failing response
    /// fails the whole cycle.
    pub fn process_responses<'a, I>(&self, responses: I) -> Result<AggregatedSet, EntsoeError>
    where
        I: IntoIterator<Item = &'a RawResponse>,
    {
        let mut documents = Vec::new();
        let mut response_count = 0usize;

        for response in responses {
            response_count += 1;
            let parsed = self.parse_response(response)?;
            debug!(documents = parsed.len(), "parsed response");
            documents.extend(parsed);
        }

        let acknowledgements = documents.iter().filter(|d| d.is_acknowledgement()).count();
        let set = self.aggregator.aggregate(&documents)?;

        info!(
            responses = response_count,
            documents = documents.len(),
            acknowledgements,
            categories = set.len(),
            points = set.point_count(),
            "fetch cycle complete"
        );

        Ok(set)
    }

    /// Process responses and commit the outcome to `store`
    pub fn run_cycle<'a, I>(
        &self,
        store: &mut SnapshotStore,
        responses: I,
        now: DateTime<Utc>,
    ) -> Result<(), EntsoeError>
    where
        I: IntoIterator<Item = &'a RawResponse>,
    {
        store.commit(self.process_responses(responses), now)
    }

    /// Staleness of `store` using the configured `staleness_multiplier`
    pub fn is_stale(&self, store: &SnapshotStore, now: DateTime<Utc>, update_interval: Duration) -> bool {
        store.is_stale(now, update_interval, self.config.staleness_multiplier)
    }

    /// Category timeline of `store` over the configured horizon
    pub fn timeline(&self, store: &SnapshotStore, key: &CategoryKey, now: DateTime<Utc>) -> Option<Timeline> {
        store.timeline(key, now, self.config.horizon)
    }

    /// Total timeline of `store` over the configured horizon
    pub fn total_timeline(&self, store: &SnapshotStore, now: DateTime<Utc>) -> Option<Timeline> {
        store.total_timeline(now, self.config.horizon)
    }
}

// ============================================================================
// Snapshot
// ============================================================================

/// Result of the last successful fetch cycle
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub data: AggregatedSet,
    pub fetched_at: DateTime<Utc>,
}

/// Last known good snapshot, owned by the polling caller
#[derive(Debug, Clone, Default)]
pub struct SnapshotStore {
    snapshot: Option<Snapshot>,
}

impl SnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Swap in a successful cycle result; keep the previous snapshot on error
    ///
    /// The error is handed back to the caller unchanged.
    pub fn commit(
        &mut self,
        result: Result<AggregatedSet, EntsoeError>,
        fetched_at: DateTime<Utc>,
    ) -> Result<(), EntsoeError> {
        match result {
            Ok(data) => {
                self.snapshot = Some(Snapshot { data, fetched_at });
                Ok(())
            }
            Err(err) => {
                match &self.snapshot {
                    Some(previous) => warn!(
                        error = %err,
                        retained_age_secs = (fetched_at - previous.fetched_at).num_seconds(),
                        "fetch cycle failed, keeping previous snapshot"
                    ),
                    None => warn!(error = %err, "fetch cycle failed, no snapshot available"),
                }
                Err(err)
            }
        }
    }

    pub fn current(&self) -> Option<&Snapshot> {
        self.snapshot.as_ref()
    }

    /// True when there is no snapshot or it is older than `multiplier` update intervals
    pub fn is_stale(&self, now: DateTime<Utc>, update_interval: Duration, multiplier: u32) -> bool {
        let Some(snapshot) = &self.snapshot else {
            return true;
        };

        let factor = i32::try_from(multiplier).unwrap_or(i32::MAX);
        match update_interval.checked_mul(factor) {
            Some(limit) => now - snapshot.fetched_at > limit,
            None => false,
        }
    }

    /// Timeline of one category of the current snapshot
    pub fn timeline(&self, key: &CategoryKey, now: DateTime<Utc>, horizon: Horizon) -> Option<Timeline> {
        self.snapshot
            .as_ref()
            .and_then(|snapshot| snapshot.data.get(key))
            .map(|series| Timeline::build(series, now, horizon))
    }

    /// Timeline of the sum over all categories of the current snapshot
    pub fn total_timeline(&self, now: DateTime<Utc>, horizon: Horizon) -> Option<Timeline> {
        self.snapshot
            .as_ref()
            .map(|snapshot| Timeline::build(&snapshot.data.total(), now, horizon))
    }
}
