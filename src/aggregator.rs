//! Aggregation of parsed documents into per-category series
//!
//! One logical query frequently returns several documents or time-series for the
//! same category and interval (e.g. separate generation unit groups under one
//! production type). These are contributions to one total and are summed.
//!
//! # Features
//!
//! - **Absolute timestamps**: every point is placed at `period_start + (position - 1) * resolution`
//!   of its own record, so mixed resolutions merge without resampling
//! - **Merge policy per document type**: `Sum` (default) or `Replace` (later document wins)
//! - **Derived views**: total across categories, regrouping by category name

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::codes::DocumentType;
use crate::error::ParseError;
use crate::types::{CategoryKey, ParsedDocument};

/// How a value is reconciled with one already present at the same timestamp
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MergePolicy {
    /// Add to the existing value
    #[default]
    Sum,
    /// Overwrite the existing value
    Replace,
}

// ============================================================================
// AggregatedSeries
// ============================================================================

/// Timestamp → value mapping for one category, strictly ascending
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AggregatedSeries {
    values: BTreeMap<DateTime<Utc>, f64>,
}

impl AggregatedSeries {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge one value according to `policy`
    pub fn merge(&mut self, timestamp: DateTime<Utc>, value: f64, policy: MergePolicy) {
        match policy {
            MergePolicy::Sum => *self.values.entry(timestamp).or_insert(0.0) += value,
            MergePolicy::Replace => {
                self.values.insert(timestamp, value);
            }
        }
    }

    pub fn get(&self, timestamp: &DateTime<Utc>) -> Option<f64> {
        self.values.get(timestamp).copied()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Points in ascending timestamp order
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = (DateTime<Utc>, f64)> + '_ {
        self.values.iter().map(|(timestamp, value)| (*timestamp, *value))
    }

    pub fn as_map(&self) -> &BTreeMap<DateTime<Utc>, f64> {
        &self.values
    }

    fn absorb(&mut self, other: &AggregatedSeries, policy: MergePolicy) {
        for (timestamp, value) in other.iter() {
            self.merge(timestamp, value, policy);
        }
    }
}

/// Collects with additive merge
impl FromIterator<(DateTime<Utc>, f64)> for AggregatedSeries {
    fn from_iter<I: IntoIterator<Item = (DateTime<Utc>, f64)>>(iter: I) -> Self {
        let mut series = Self::new();
        for (timestamp, value) in iter {
            series.merge(timestamp, value, MergePolicy::Sum);
        }
        series
    }
}

// ============================================================================
// AggregatedSet
// ============================================================================

/// Result of one fetch cycle: one series per category key
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AggregatedSet {
    series: BTreeMap<CategoryKey, AggregatedSeries>,
}

impl AggregatedSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &CategoryKey) -> Option<&AggregatedSeries> {
        self.series.get(key)
    }

    /// Series of documents without production type (prices, load)
    pub fn uncategorized(&self) -> Option<&AggregatedSeries> {
        self.get(&CategoryKey::Uncategorized)
    }

    /// Series of one production type code (e.g. "B16")
    pub fn category(&self, code: &str) -> Option<&AggregatedSeries> {
        self.get(&CategoryKey::Code(code.to_string()))
    }

    pub fn keys(&self) -> impl Iterator<Item = &CategoryKey> + '_ {
        self.series.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&CategoryKey, &AggregatedSeries)> + '_ {
        self.series.iter()
    }

    /// Number of category series
    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    /// Number of timestamped values across all series
    pub fn point_count(&self) -> usize {
        self.series.values().map(AggregatedSeries::len).sum()
    }

    /// Sum of every category at each timestamp ("total generation")
    pub fn total(&self) -> AggregatedSeries {
        self.series.values().flat_map(|series| series.iter()).collect()
    }

    /// Regroup production type codes into category names, additively
    ///
    /// B02, B03, B05 and B27 all land in "coal". The uncategorized series is not
    /// part of the result.
    pub fn by_category_name(&self) -> BTreeMap<&'static str, AggregatedSeries> {
        let mut grouped: BTreeMap<&'static str, AggregatedSeries> = BTreeMap::new();
        for (key, series) in &self.series {
            if let Some(name) = key.category_name() {
                grouped.entry(name).or_default().absorb(series, MergePolicy::Sum);
            }
        }
        grouped
    }

    fn absorb(&mut self, other: AggregatedSet, policy: MergePolicy) {
        for (key, series) in other.series {
            match self.series.get_mut(&key) {
                Some(existing) => existing.absorb(&series, policy),
                None => {
                    self.series.insert(key, series);
                }
            }
        }
    }
}

// ============================================================================
// Aggregator
// ============================================================================

/// Merges the parsed documents of one fetch cycle
///
/// Series within one document always add up. The merge policy decides how a
/// document combines with the documents before it.
///
/// # Examples
///
/// ```
/// # use entsoe_data::aggregator::{Aggregator, MergePolicy};
/// # use entsoe_data::codes::DocumentType;
/// let aggregator = Aggregator::new().with_policy(DocumentType::Prices, MergePolicy::Replace);
/// assert_eq!(aggregator.policy_for(DocumentType::Prices), MergePolicy::Replace);
/// assert_eq!(aggregator.policy_for(DocumentType::GenerationPerType), MergePolicy::Sum);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Aggregator {
    default_policy: MergePolicy,
    overrides: HashMap<DocumentType, MergePolicy>,
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_default_policy(mut self, policy: MergePolicy) -> Self {
        self.default_policy = policy;
        self
    }

    pub fn with_policy(mut self, document_type: DocumentType, policy: MergePolicy) -> Self {
        self.overrides.insert(document_type, policy);
        self
    }

    pub fn policy_for(&self, document_type: DocumentType) -> MergePolicy {
        self.overrides
            .get(&document_type)
            .copied()
            .unwrap_or(self.default_policy)
    }

    /// Aggregate every document of one fetch cycle
    ///
    /// # Returns
    ///
    /// * `Ok(AggregatedSet)` - One series per category key encountered
    /// * `Err(ParseError::InvalidPosition)` - A position maps outside the calendar range
    pub fn aggregate<'a, I>(&self, documents: I) -> Result<AggregatedSet, ParseError>
    where
        I: IntoIterator<Item = &'a ParsedDocument>,
    {
        let mut set = AggregatedSet::new();
        let mut document_count = 0usize;

        for document in documents {
            document_count += 1;
            let contribution = Self::document_series(document)?;
            set.absorb(contribution, self.policy_for(document.document_type));
        }

        debug!(
            documents = document_count,
            categories = set.len(),
            points = set.point_count(),
            "aggregated documents"
        );

        Ok(set)
    }

    /// Additive merge of all records of one document
    fn document_series(document: &ParsedDocument) -> Result<AggregatedSet, ParseError> {
        let mut set = AggregatedSet::new();
        for record in &document.records {
            let series = set.series.entry(record.category_key()).or_default();
            for (timestamp, value) in record.values()? {
                series.merge(timestamp, value, MergePolicy::Sum);
            }
        }
        Ok(set)
    }
}
