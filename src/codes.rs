//! ENTSO-E code lists used by the normalization pipeline
//!
//! This module provides the fixed code sets of the Transparency Platform:
//! - Document types (`A44` prices, `A65` total load, ...)
//! - Process types (`A16` realised, `A01` day-ahead, ...)
//! - Production types (`B01`..`B28`) and the category names they roll up into
//! - Bidding zones / areas with their EIC codes

use std::fmt;

use crate::error::{ParseError, QueryError};

// ============================================================================
// Document Types
// ============================================================================

/// Document type carried in the `type` element of a market document
///
/// `Acknowledgement` has no code of its own: the platform answers queries
/// without data with an `Acknowledgement_MarketDocument` carrying a reason.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DocumentType {
    /// A44 - day-ahead prices
    Prices,
    /// A65 - system total load
    TotalLoad,
    /// A69 - wind and solar forecast
    WindSolarForecast,
    /// A71 - generation forecast
    GenerationForecast,
    /// A75 - actual generation per production type
    GenerationPerType,
    /// Reply without data
    Acknowledgement,
}

impl DocumentType {
    /// Parse a document type code
    ///
    /// # Examples
    ///
    /// ```
    /// # use entsoe_data::codes::DocumentType;
    /// assert_eq!(DocumentType::from_code("A44").unwrap(), DocumentType::Prices);
    /// assert_eq!(DocumentType::from_code(" a75 ").unwrap(), DocumentType::GenerationPerType);
    /// assert!(DocumentType::from_code("A99").is_err());
    /// ```
    pub fn from_code(code: &str) -> Result<Self, ParseError> {
        match code.trim().to_ascii_uppercase().as_str() {
            "A44" => Ok(DocumentType::Prices),
            "A65" => Ok(DocumentType::TotalLoad),
            "A69" => Ok(DocumentType::WindSolarForecast),
            "A71" => Ok(DocumentType::GenerationForecast),
            "A75" => Ok(DocumentType::GenerationPerType),
            _ => Err(ParseError::UnknownDocumentType(code.to_string())),
        }
    }

    /// Code as sent in the `documentType` request parameter
    pub fn code(&self) -> &'static str {
        match self {
            DocumentType::Prices => "A44",
            DocumentType::TotalLoad => "A65",
            DocumentType::WindSolarForecast => "A69",
            DocumentType::GenerationForecast => "A71",
            DocumentType::GenerationPerType => "A75",
            DocumentType::Acknowledgement => "ACK",
        }
    }

    /// Whether point values are published in `price.amount` instead of `quantity`
    pub fn uses_price_amount(&self) -> bool {
        matches!(self, DocumentType::Prices)
    }
}

impl fmt::Display for DocumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

// ============================================================================
// Process Types
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProcessType {
    /// A16
    Realised,
    /// A01
    DayAhead,
    /// A18
    Intraday,
    /// A31
    WeekAhead,
    /// A32
    MonthAhead,
    /// A33
    YearAhead,
}

impl ProcessType {
    pub fn code(&self) -> &'static str {
        match self {
            ProcessType::Realised => "A16",
            ProcessType::DayAhead => "A01",
            ProcessType::Intraday => "A18",
            ProcessType::WeekAhead => "A31",
            ProcessType::MonthAhead => "A32",
            ProcessType::YearAhead => "A33",
        }
    }

    /// Resolve a process type from its code or a human alias
    ///
    /// Accepts "realised"/"realized", "day_ahead"/"dayahead", "intraday",
    /// "week_ahead", "month_ahead", "year_ahead" (case-insensitive) and the raw codes.
    ///
    /// # Examples
    ///
    /// ```
    /// # use entsoe_data::codes::ProcessType;
    /// assert_eq!(ProcessType::from_alias("REALIZED").unwrap(), ProcessType::Realised);
    /// assert_eq!(ProcessType::from_alias("A01").unwrap(), ProcessType::DayAhead);
    /// assert!(ProcessType::from_alias("hourly").is_err());
    /// ```
    pub fn from_alias(value: &str) -> Result<Self, QueryError> {
        match value.trim().to_ascii_uppercase().as_str() {
            "REALISED" | "REALIZED" | "A16" => Ok(ProcessType::Realised),
            "DAY_AHEAD" | "DAYAHEAD" | "A01" => Ok(ProcessType::DayAhead),
            "INTRADAY" | "A18" => Ok(ProcessType::Intraday),
            "WEEK_AHEAD" | "WEEKAHEAD" | "A31" => Ok(ProcessType::WeekAhead),
            "MONTH_AHEAD" | "MONTHAHEAD" | "A32" => Ok(ProcessType::MonthAhead),
            "YEAR_AHEAD" | "YEARAHEAD" | "A33" => Ok(ProcessType::YearAhead),
            _ => Err(QueryError::UnknownProcessType(value.to_string())),
        }
    }
}

// ============================================================================
// Production Types
// ============================================================================

/// Category name for a production type (`psrType`) code
///
/// Several codes share one category (B02 brown coal, B03 coal-derived gas,
/// B05 hard coal and B27 are all "coal"). Unknown codes map to "other".
///
/// # Examples
///
/// ```
/// # use entsoe_data::codes::psr_category_name;
/// assert_eq!(psr_category_name("B16"), "solar");
/// assert_eq!(psr_category_name("B05"), "coal");
/// assert_eq!(psr_category_name("B99"), "other");
/// ```
pub fn psr_category_name(code: &str) -> &'static str {
    match code.trim().to_ascii_uppercase().as_str() {
        "B01" => "biomass",
        "B02" | "B03" | "B05" | "B27" => "coal",
        "B04" => "fossil_gas",
        "B06" => "oil",
        "B07" => "oil_shale",
        "B08" => "peat",
        "B09" => "geothermal",
        "B10" => "hydro_pumped_storage",
        "B11" => "hydro_run_of_river",
        "B12" => "hydro_reservoir",
        "B13" => "marine",
        "B14" => "nuclear",
        "B15" => "other_renewable",
        "B16" => "solar",
        "B17" => "waste",
        "B18" => "wind_offshore",
        "B19" => "wind_onshore",
        "B21" | "B22" => "interconnector",
        "B23" => "infrastructure",
        "B24" => "transformer",
        "B25" => "energy_storage",
        "B28" => "hydro",
        _ => "other",
    }
}

// ============================================================================
// Areas
// ============================================================================

/// Key of the synthetic area that stands for all configured areas combined
pub const TOTAL_EUROPE_AREA: &str = "TOTAL_EUROPE";

/// One bidding zone / area known to the integration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AreaInfo {
    /// Configuration key (e.g. "DE", "NO_2")
    pub key: &'static str,
    /// Energy Identification Code sent in domain parameters
    pub eic: &'static str,
    pub name: &'static str,
}

/// Areas supported by the Transparency Platform for the implemented queries
///
/// Germany and Luxembourg share the DE-LU bidding zone.
pub const AREAS: &[AreaInfo] = &[
    AreaInfo { key: TOTAL_EUROPE_AREA, eic: "10Y1001A1001A876", name: "Total Europe" },
    AreaInfo { key: "AT", eic: "10YAT-APG------L", name: "Austria" },
    AreaInfo { key: "BE", eic: "10YBE----------2", name: "Belgium" },
    AreaInfo { key: "BG", eic: "10YCA-BULGARIA-R", name: "Bulgaria" },
    AreaInfo { key: "HR", eic: "10YHR-HEP------M", name: "Croatia" },
    AreaInfo { key: "CZ", eic: "10YCZ-CEPS-----N", name: "Czech Republic" },
    AreaInfo { key: "DK_1", eic: "10YDK-1--------W", name: "Denmark Western (DK1)" },
    AreaInfo { key: "DK_2", eic: "10YDK-2--------M", name: "Denmark Eastern (DK2)" },
    AreaInfo { key: "EE", eic: "10Y1001A1001A39I", name: "Estonia" },
    AreaInfo { key: "FI", eic: "10YFI-1--------U", name: "Finland" },
    AreaInfo { key: "FR", eic: "10YFR-RTE------C", name: "France" },
    AreaInfo { key: "LU", eic: "10Y1001A1001A82H", name: "Luxembourg" },
    AreaInfo { key: "DE", eic: "10Y1001A1001A82H", name: "Germany" },
    AreaInfo { key: "GR", eic: "10YGR-HTSO-----Y", name: "Greece" },
    AreaInfo { key: "HU", eic: "10YHU-MAVIR----U", name: "Hungary" },
    AreaInfo { key: "IT_CNOR", eic: "10Y1001A1001A70O", name: "Italy Centre North" },
    AreaInfo { key: "IT_CSUD", eic: "10Y1001A1001A71M", name: "Italy Centre South" },
    AreaInfo { key: "IT_NORD", eic: "10Y1001A1001A73I", name: "Italy North" },
    AreaInfo { key: "IT_SUD", eic: "10Y1001A1001A788", name: "Italy South" },
    AreaInfo { key: "IT_SICI", eic: "10Y1001A1001A75E", name: "Italy Sicilia" },
    AreaInfo { key: "IT_SARD", eic: "10Y1001A1001A74G", name: "Italy Sardinia" },
    AreaInfo { key: "IT_CALA", eic: "10Y1001C--00096J", name: "Italy Calabria" },
    AreaInfo { key: "LV", eic: "10YLV-1001A00074", name: "Latvia" },
    AreaInfo { key: "LT", eic: "10YLT-1001A0008Q", name: "Lithuania" },
    AreaInfo { key: "NL", eic: "10YNL----------L", name: "Netherlands" },
    AreaInfo { key: "NO_1", eic: "10YNO-1--------2", name: "Norway Oslo (NO1)" },
    AreaInfo { key: "NO_2", eic: "10YNO-2--------T", name: "Norway Kr.Sand (NO2)" },
    AreaInfo { key: "NO_3", eic: "10YNO-3--------J", name: "Norway Tr.heim (NO3)" },
    AreaInfo { key: "NO_4", eic: "10YNO-4--------9", name: "Norway Tromsø (NO4)" },
    AreaInfo { key: "NO_5", eic: "10Y1001A1001A48H", name: "Norway Bergen (NO5)" },
    AreaInfo { key: "PL", eic: "10YPL-AREA-----S", name: "Poland" },
    AreaInfo { key: "PT", eic: "10YPT-REN------W", name: "Portugal" },
    AreaInfo { key: "RO", eic: "10YRO-TEL------P", name: "Romania" },
    AreaInfo { key: "RS", eic: "10YCS-SERBIATSOV", name: "Serbia" },
    AreaInfo { key: "SK", eic: "10YSK-SEPS-----K", name: "Slovakia" },
    AreaInfo { key: "SI", eic: "10YSI-ELES-----O", name: "Slovenia" },
    AreaInfo { key: "ES", eic: "10YES-REE------0", name: "Spain" },
    AreaInfo { key: "SE_1", eic: "10Y1001A1001A44P", name: "Sweden Luleå (SE1)" },
    AreaInfo { key: "SE_2", eic: "10Y1001A1001A45N", name: "Sweden Sundsvall (SE2)" },
    AreaInfo { key: "SE_3", eic: "10Y1001A1001A46L", name: "Sweden Stockholm (SE3)" },
    AreaInfo { key: "SE_4", eic: "10Y1001A1001A47J", name: "Sweden Malmö (SE4)" },
    AreaInfo { key: "CH", eic: "10YCH-SWISSGRIDZ", name: "Switzerland" },
];

/// Resolve an area from its configuration key or its EIC code
///
/// Keys match case-insensitively; EIC codes match exactly or upper-cased.
///
/// # Examples
///
/// ```
/// # use entsoe_data::codes::resolve_area;
/// assert_eq!(resolve_area("de").unwrap().eic, "10Y1001A1001A82H");
/// assert_eq!(resolve_area("10YFR-RTE------C").unwrap().key, "FR");
/// assert!(resolve_area("ATLANTIS").is_err());
/// ```
pub fn resolve_area(identifier: &str) -> Result<&'static AreaInfo, QueryError> {
    let trimmed = identifier.trim();
    let upper = trimmed.to_ascii_uppercase();

    AREAS
        .iter()
        .find(|area| area.key == upper)
        .or_else(|| AREAS.iter().find(|area| area.eic == trimmed || area.eic == upper))
        .ok_or_else(|| QueryError::UnknownArea(identifier.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_type_codes_roundtrip_through_display() {
        for doc in [
            DocumentType::Prices,
            DocumentType::TotalLoad,
            DocumentType::WindSolarForecast,
            DocumentType::GenerationForecast,
            DocumentType::GenerationPerType,
        ] {
            assert_eq!(DocumentType::from_code(&doc.to_string()).unwrap(), doc);
        }
    }

    #[test]
    fn test_acknowledgement_has_no_request_code() {
        assert!(DocumentType::from_code("ACK").is_err());
    }

    #[test]
    fn test_only_prices_use_price_amount() {
        assert!(DocumentType::Prices.uses_price_amount());
        assert!(!DocumentType::TotalLoad.uses_price_amount());
        assert!(!DocumentType::GenerationPerType.uses_price_amount());
    }

    #[test]
    fn test_process_type_aliases() {
        assert_eq!(ProcessType::from_alias("realised").unwrap(), ProcessType::Realised);
        assert_eq!(ProcessType::from_alias("DayAhead").unwrap(), ProcessType::DayAhead);
        assert_eq!(ProcessType::from_alias("intraday").unwrap().code(), "A18");
        assert_eq!(ProcessType::from_alias("week_ahead").unwrap().code(), "A31");
        assert_eq!(
            ProcessType::from_alias("bogus"),
            Err(QueryError::UnknownProcessType("bogus".to_string()))
        );
    }

    #[test]
    fn test_psr_categories_group_coal_codes() {
        for code in ["B02", "B03", "B05", "B27"] {
            assert_eq!(psr_category_name(code), "coal");
        }
        assert_eq!(psr_category_name("b19"), "wind_onshore");
        assert_eq!(psr_category_name("B20"), "other");
    }

    #[test]
    fn test_germany_and_luxembourg_share_zone() {
        let de = resolve_area("DE").unwrap();
        let lu = resolve_area("LU").unwrap();
        assert_eq!(de.eic, lu.eic);
        assert_ne!(de.name, lu.name);
    }

    #[test]
    fn test_resolve_area_by_eic_prefers_first_entry() {
        // DE-LU zone appears twice; lookup by code returns the first entry
        assert_eq!(resolve_area("10Y1001A1001A82H").unwrap().key, "LU");
    }

    #[test]
    fn test_area_keys_are_unique() {
        let mut keys: Vec<&str> = AREAS.iter().map(|a| a.key).collect();
        keys.sort_unstable();
        keys.dedup();
        assert_eq!(keys.len(), AREAS.len());
    }
}
