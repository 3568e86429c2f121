//! Timeline construction for consumers
//!
//! Turns one aggregated series and a reference instant into the exposed timeline and
//! its scalar summaries. Gaps stay gaps: the timeline holds exactly the timestamps of
//! the series within the selected horizon.
//!
//! # Example
//!
//! ```rust
//! use chrono::{TimeZone, Utc};
//! use entsoe_data::aggregator::AggregatedSeries;
//! use entsoe_data::timeline::{Horizon, Timeline};
//!
//! let hour = |h| Utc.with_ymd_and_hms(2024, 1, 1, h, 0, 0).unwrap();
//! let series: AggregatedSeries = vec![(hour(0), 10.0), (hour(1), 20.0), (hour(2), 30.0)]
//!     .into_iter()
//!     .collect();
//!
//! let timeline = Timeline::build(&series, hour(1), Horizon::All);
//! assert_eq!(timeline.current, Some(20.0));
//! assert_eq!(timeline.next, Some(30.0));
//! assert_eq!(timeline.average, Some(20.0));
//! ```

use std::ops::Bound;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::aggregator::AggregatedSeries;
use crate::transformations::to_iso8601;

/// Which points of a series are exposed and summarized
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Horizon {
    /// Every point of the series
    #[default]
    All,
    /// Points at or after the reference instant
    Upcoming,
}

/// Ordered points plus summaries against a reference instant
///
/// `current` and `next` are looked up in the whole series; `min`, `max` and
/// `average` cover the points of the selected horizon only.
#[derive(Debug, Clone, PartialEq)]
pub struct Timeline {
    pub points: Vec<(DateTime<Utc>, f64)>,

    /// Value at the greatest timestamp ≤ now
    pub current: Option<f64>,
    pub current_timestamp: Option<DateTime<Utc>>,

    /// Value at the smallest timestamp > now
    pub next: Option<f64>,
    pub next_timestamp: Option<DateTime<Utc>>,

    pub min: Option<f64>,
    pub max: Option<f64>,
    pub average: Option<f64>,
}

impl Timeline {
    pub fn build(series: &AggregatedSeries, now: DateTime<Utc>, horizon: Horizon) -> Self {
        let map = series.as_map();

        let current = map.range(..=now).next_back().map(|(ts, v)| (*ts, *v));
        let next = map
            .range((Bound::Excluded(now), Bound::Unbounded))
            .next()
            .map(|(ts, v)| (*ts, *v));

        let points: Vec<(DateTime<Utc>, f64)> = match horizon {
            Horizon::All => series.iter().collect(),
            Horizon::Upcoming => map.range(now..).map(|(ts, v)| (*ts, *v)).collect(),
        };

        let (min, max, average) = summarize(&points);

        Self {
            points,
            current: current.map(|(_, v)| v),
            current_timestamp: current.map(|(ts, _)| ts),
            next: next.map(|(_, v)| v),
            next_timestamp: next.map(|(ts, _)| ts),
            min,
            max,
            average,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Output-boundary shape with ISO 8601 keys
    pub fn attributes(&self) -> TimelineAttributes {
        TimelineAttributes {
            timeline: self
                .points
                .iter()
                .map(|(ts, value)| (to_iso8601(ts), *value))
                .collect(),
            current: self.current,
            next: self.next,
            min: self.min,
            max: self.max,
            average: self.average,
            current_timestamp: self.current_timestamp.as_ref().map(to_iso8601),
            next_timestamp: self.next_timestamp.as_ref().map(to_iso8601),
        }
    }
}

fn summarize(points: &[(DateTime<Utc>, f64)]) -> (Option<f64>, Option<f64>, Option<f64>) {
    if points.is_empty() {
        return (None, None, None);
    }

    let values = points.iter().map(|(_, v)| *v);
    let min = values.clone().fold(f64::INFINITY, f64::min);
    let max = values.clone().fold(f64::NEG_INFINITY, f64::max);
    let average = values.sum::<f64>() / points.len() as f64;

    (Some(min), Some(max), Some(average))
}

/// Serializable timeline attributes; absent scalars serialize as `null`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimelineAttributes {
    pub timeline: IndexMap<String, f64>,
    pub current: Option<f64>,
    pub next: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub average: Option<f64>,
    pub current_timestamp: Option<String>,
    pub next_timestamp: Option<String>,
}

impl TimelineAttributes {
    pub fn to_json(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::to_value(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn hour(h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, h, 0, 0).unwrap()
    }

    fn series(points: &[(u32, f64)]) -> AggregatedSeries {
        points.iter().map(|(h, v)| (hour(*h), *v)).collect()
    }

    #[test]
    fn test_now_on_existing_timestamp() {
        let s = series(&[(0, 10.0), (1, 20.0), (2, 30.0)]);
        let timeline = Timeline::build(&s, hour(1), Horizon::All);

        assert_eq!(timeline.current, Some(20.0));
        assert_eq!(timeline.current_timestamp, Some(hour(1)));
        assert_eq!(timeline.next, Some(30.0));
        assert_eq!(timeline.next_timestamp, Some(hour(2)));
    }

    #[test]
    fn test_now_between_timestamps() {
        let s = series(&[(0, 10.0), (2, 30.0)]);
        let timeline = Timeline::build(&s, hour(1) + Duration::minutes(20), Horizon::All);
        assert_eq!(timeline.current, Some(10.0));
        assert_eq!(timeline.next, Some(30.0));
    }

    #[test]
    fn test_now_before_first_point_has_no_current() {
        let s = series(&[(3, 1.0), (4, 2.0)]);
        let timeline = Timeline::build(&s, hour(0), Horizon::All);
        assert_eq!(timeline.current, None);
        assert_eq!(timeline.current_timestamp, None);
        assert_eq!(timeline.next, Some(1.0));
    }

    #[test]
    fn test_now_after_last_point_has_no_next() {
        let s = series(&[(0, 1.0), (1, 2.0)]);
        let timeline = Timeline::build(&s, hour(5), Horizon::All);
        assert_eq!(timeline.current, Some(2.0));
        assert_eq!(timeline.next, None);
    }

    #[test]
    fn test_empty_series_everything_absent() {
        let timeline = Timeline::build(&AggregatedSeries::new(), hour(0), Horizon::All);
        assert!(timeline.is_empty());
        assert_eq!(timeline.current, None);
        assert_eq!(timeline.next, None);
        assert_eq!(timeline.min, None);
        assert_eq!(timeline.max, None);
        assert_eq!(timeline.average, None);
    }

    #[test]
    fn test_summaries_over_all_points() {
        let s = series(&[(0, -5.0), (1, 15.0), (2, 20.0)]);
        let timeline = Timeline::build(&s, hour(0), Horizon::All);
        assert_eq!(timeline.min, Some(-5.0));
        assert_eq!(timeline.max, Some(20.0));
        assert_eq!(timeline.average, Some(10.0));
    }

    #[test]
    fn test_upcoming_horizon_filters_points_and_summaries() {
        let s = series(&[(0, 100.0), (1, 20.0), (2, 40.0)]);
        let timeline = Timeline::build(&s, hour(1), Horizon::Upcoming);

        assert_eq!(timeline.points, vec![(hour(1), 20.0), (hour(2), 40.0)]);
        assert_eq!(timeline.max, Some(40.0));
        assert_eq!(timeline.average, Some(30.0));
        assert_eq!(timeline.current, Some(20.0));
    }

    #[test]
    fn test_upcoming_horizon_can_be_empty_while_current_exists() {
        let s = series(&[(0, 1.0)]);
        let timeline = Timeline::build(&s, hour(3), Horizon::Upcoming);
        assert!(timeline.is_empty());
        assert_eq!(timeline.current, Some(1.0));
        assert_eq!(timeline.min, None);
    }

    #[test]
    fn test_gaps_are_not_filled() {
        let s = series(&[(0, 1.0), (5, 2.0)]);
        let timeline = Timeline::build(&s, hour(0), Horizon::All);
        assert_eq!(timeline.points.len(), 2);
    }

    #[test]
    fn test_attributes_json_shape() {
        let s = series(&[(0, 10.5), (1, 20.0)]);
        let attrs = Timeline::build(&s, hour(1), Horizon::All).attributes();
        let json = attrs.to_json().unwrap();

        let keys: Vec<&String> = json["timeline"].as_object().unwrap().keys().collect();
        assert_eq!(keys, vec!["2024-01-01T00:00:00+00:00", "2024-01-01T01:00:00+00:00"]);
        assert_eq!(json["current"], 20.0);
        assert!(json["next"].is_null());
        assert_eq!(json["current_timestamp"], "2024-01-01T01:00:00+00:00");
        assert!(json["next_timestamp"].is_null());
    }

    #[test]
    fn test_attributes_keep_timeline_order() {
        let s = series(&[(2, 3.0), (0, 1.0), (1, 2.0)]);
        let attrs = Timeline::build(&s, hour(0), Horizon::All).attributes();
        let values: Vec<f64> = attrs.timeline.values().copied().collect();
        assert_eq!(values, vec![1.0, 2.0, 3.0]);
    }
}
