//! Query Router for the ENTSO-E Transparency Platform
//!
//! Turns a query identity (kind + area) and a reference instant into the request
//! parameters of one or more API calls. Sending the request, adding the security
//! token and retrying are left to the transport.
//!
//! # Routing Logic
//!
//! ## Document and process types
//! - Day-ahead prices → `A44`
//! - Actual generation per type → `A75` with process type realised/day-ahead/intraday
//! - Total load forecast → `A65` with the process type of its horizon (`A01`/`A31`/`A32`/`A33`)
//! - Generation forecast → `A71`/`A01`, wind & solar forecast → `A69`/`A01`
//!
//! ## Area parameters
//! - Prices and generation: `in_Domain` + `out_Domain`
//! - Load: `outBiddingZone_Domain`
//!
//! ## Window
//! - `periodStart` = reference − 1 day, `periodEnd` = start + look-ahead (`YYYYMMDDHH00`, UTC)
//!
//! # Example
//!
//! ```rust
//! use chrono::{TimeZone, Utc};
//! use entsoe_data::query_router::*;
//!
//! let now = Utc.with_ymd_and_hms(2024, 10, 8, 12, 30, 0).unwrap();
//! let plan = plan_query(QueryKind::DayAheadPrices, "BE", now).unwrap();
//!
//! assert_eq!(plan.param("documentType"), Some("A44"));
//! assert_eq!(plan.param("in_Domain"), Some("10YBE----------2"));
//! assert_eq!(plan.param("periodStart"), Some("202410071200"));
//! assert_eq!(plan.param("periodEnd"), Some("202410101200"));
//! ```

use chrono::{DateTime, Duration, Utc};

use crate::codes::{resolve_area, AreaInfo, DocumentType, ProcessType, AREAS, TOTAL_EUROPE_AREA};
use crate::error::QueryError;
use crate::transformations::format_query_timestamp;

/// Primary API endpoint
pub const PRIMARY_BASE_URL: &str = "https://web-api.tp.entsoe.eu/api";

/// Legacy endpoint, tried when the primary one is unreachable
pub const FALLBACK_BASE_URL: &str = "https://api.transparency.entsoe.eu/api";

/// Endpoints in the order the transport should try them
pub const BASE_URLS: [&str; 2] = [PRIMARY_BASE_URL, FALLBACK_BASE_URL];

// ============================================================================
// Data Structures
// ============================================================================

/// Publication horizon of a total load forecast
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LoadHorizon {
    DayAhead,
    WeekAhead,
    MonthAhead,
    YearAhead,
}

impl LoadHorizon {
    pub const ALL: [LoadHorizon; 4] = [
        LoadHorizon::DayAhead,
        LoadHorizon::WeekAhead,
        LoadHorizon::MonthAhead,
        LoadHorizon::YearAhead,
    ];

    pub fn process_type(&self) -> ProcessType {
        match self {
            LoadHorizon::DayAhead => ProcessType::DayAhead,
            LoadHorizon::WeekAhead => ProcessType::WeekAhead,
            LoadHorizon::MonthAhead => ProcessType::MonthAhead,
            LoadHorizon::YearAhead => ProcessType::YearAhead,
        }
    }

    /// How often the forecast is polled
    pub fn update_interval(&self) -> Duration {
        match self {
            LoadHorizon::DayAhead => Duration::minutes(60),
            LoadHorizon::WeekAhead => Duration::hours(6),
            LoadHorizon::MonthAhead => Duration::hours(12),
            LoadHorizon::YearAhead => Duration::hours(24),
        }
    }

    /// Length of the requested window
    pub fn look_ahead(&self) -> Duration {
        match self {
            LoadHorizon::DayAhead => Duration::days(3),
            LoadHorizon::WeekAhead => Duration::days(14),
            LoadHorizon::MonthAhead => Duration::days(62),
            LoadHorizon::YearAhead => Duration::days(370),
        }
    }

    pub fn key(&self) -> &'static str {
        match self {
            LoadHorizon::DayAhead => "day_ahead",
            LoadHorizon::WeekAhead => "week_ahead",
            LoadHorizon::MonthAhead => "month_ahead",
            LoadHorizon::YearAhead => "year_ahead",
        }
    }

    /// Resolve from a horizon key or its process type alias
    ///
    /// # Examples
    ///
    /// ```
    /// # use entsoe_data::query_router::LoadHorizon;
    /// assert_eq!(LoadHorizon::from_key("week_ahead").unwrap(), LoadHorizon::WeekAhead);
    /// assert_eq!(LoadHorizon::from_key("A33").unwrap(), LoadHorizon::YearAhead);
    /// assert!(LoadHorizon::from_key("realised").is_err());
    /// ```
    pub fn from_key(value: &str) -> Result<Self, QueryError> {
        let process = ProcessType::from_alias(value)?;
        Self::ALL
            .into_iter()
            .find(|horizon| horizon.process_type() == process)
            .ok_or_else(|| QueryError::UnknownProcessType(value.to_string()))
    }
}

/// What is being queried, independent of the area
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryKind {
    DayAheadPrices,
    GenerationPerType(ProcessType),
    TotalLoadForecast(LoadHorizon),
    GenerationForecast,
    WindSolarForecast,
}

impl QueryKind {
    /// Actual generation per type for a process alias ("realised", "day_ahead", "intraday", ...)
    pub fn generation_per_type(process: &str) -> Result<Self, QueryError> {
        match ProcessType::from_alias(process)? {
            p @ (ProcessType::Realised | ProcessType::DayAhead | ProcessType::Intraday) => {
                Ok(QueryKind::GenerationPerType(p))
            }
            _ => Err(QueryError::UnknownProcessType(process.to_string())),
        }
    }

    pub fn document_type(&self) -> DocumentType {
        match self {
            QueryKind::DayAheadPrices => DocumentType::Prices,
            QueryKind::GenerationPerType(_) => DocumentType::GenerationPerType,
            QueryKind::TotalLoadForecast(_) => DocumentType::TotalLoad,
            QueryKind::GenerationForecast => DocumentType::GenerationForecast,
            QueryKind::WindSolarForecast => DocumentType::WindSolarForecast,
        }
    }

    /// Process type parameter; prices are requested without one
    pub fn process_type(&self) -> Option<ProcessType> {
        match self {
            QueryKind::DayAheadPrices => None,
            QueryKind::GenerationPerType(process) => Some(*process),
            QueryKind::TotalLoadForecast(horizon) => Some(horizon.process_type()),
            QueryKind::GenerationForecast | QueryKind::WindSolarForecast => {
                Some(ProcessType::DayAhead)
            }
        }
    }

    pub fn update_interval(&self) -> Duration {
        match self {
            QueryKind::TotalLoadForecast(horizon) => horizon.update_interval(),
            _ => Duration::minutes(60),
        }
    }

    pub fn look_ahead(&self) -> Duration {
        match self {
            QueryKind::TotalLoadForecast(horizon) => horizon.look_ahead(),
            _ => Duration::days(3),
        }
    }

    fn uses_bidding_zone_domain(&self) -> bool {
        matches!(self, QueryKind::TotalLoadForecast(_))
    }
}

/// Query plan for a single API request
#[derive(Debug, Clone, PartialEq)]
pub struct QueryPlan {
    pub kind: QueryKind,

    pub area: &'static AreaInfo,

    pub period_start: DateTime<Utc>,

    pub period_end: DateTime<Utc>,

    /// Request parameters in sending order, without the security token
    pub params: Vec<(String, String)>,
}

impl QueryPlan {
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Full request URL without the security token
    ///
    /// Parameter values are EIC codes, type codes and digits, which need no escaping.
    pub fn url(&self, base_url: &str) -> String {
        let query = self
            .params
            .iter()
            .map(|(key, value)| format!("{}={}", key, value))
            .collect::<Vec<_>>()
            .join("&");
        format!("{}?{}", base_url.trim_end_matches('/'), query)
    }
}

// ============================================================================
// Planning
// ============================================================================

/// Request window around a reference instant
///
/// Starts one day before `now` so the current interval and the recent past are
/// always covered.
pub fn query_window(now: DateTime<Utc>, look_ahead: Duration) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = now - Duration::days(1);
    (start, start + look_ahead)
}

/// Plan one request for a single area
///
/// # Arguments
///
/// * `kind` - Query kind
/// * `area` - Area key (e.g. "DE", "no_2") or EIC code
/// * `now` - Reference instant for the window
///
/// # Returns
///
/// * `Ok(QueryPlan)` - Ready-to-send parameters
/// * `Err(QueryError::UnknownArea)` - Area cannot be resolved
pub fn plan_query(kind: QueryKind, area: &str, now: DateTime<Utc>) -> Result<QueryPlan, QueryError> {
    Ok(build_plan(kind, resolve_area(area)?, now))
}

/// Plan the requests behind an area, expanding "Total Europe"
///
/// A regular area yields one plan; [`TOTAL_EUROPE_AREA`] yields the plans of
/// [`plan_total_europe`].
pub fn plan_queries(kind: QueryKind, area: &str, now: DateTime<Utc>) -> Result<Vec<QueryPlan>, QueryError> {
    let info = resolve_area(area)?;
    if info.key == TOTAL_EUROPE_AREA {
        return Ok(plan_total_europe(kind, now));
    }
    Ok(vec![build_plan(kind, info, now)])
}

/// One plan per distinct area code, excluding the Total Europe entry itself
///
/// Areas sharing a bidding zone (Germany and Luxembourg) are requested once so
/// their values are not counted twice when the responses are summed.
pub fn plan_total_europe(kind: QueryKind, now: DateTime<Utc>) -> Vec<QueryPlan> {
    let mut seen: Vec<&str> = Vec::new();

    AREAS
        .iter()
        .filter(|area| area.key != TOTAL_EUROPE_AREA)
        .filter(|area| {
            if seen.contains(&area.eic) {
                false
            } else {
                seen.push(area.eic);
                true
            }
        })
        .map(|area| build_plan(kind, area, now))
        .collect()
}

fn build_plan(kind: QueryKind, area: &'static AreaInfo, now: DateTime<Utc>) -> QueryPlan {
    let (period_start, period_end) = query_window(now, kind.look_ahead());

    let mut params: Vec<(String, String)> =
        vec![("documentType".to_string(), kind.document_type().code().to_string())];

    if let Some(process) = kind.process_type() {
        params.push(("processType".to_string(), process.code().to_string()));
    }

    if kind.uses_bidding_zone_domain() {
        params.push(("outBiddingZone_Domain".to_string(), area.eic.to_string()));
    } else {
        params.push(("in_Domain".to_string(), area.eic.to_string()));
        params.push(("out_Domain".to_string(), area.eic.to_string()));
    }

    params.push(("periodStart".to_string(), format_query_timestamp(&period_start)));
    params.push(("periodEnd".to_string(), format_query_timestamp(&period_end)));

    QueryPlan {
        kind,
        area,
        period_start,
        period_end,
        params,
    }
}
