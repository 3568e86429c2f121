//! XML parser for ENTSO-E market documents
//!
//! This module deserializes one market document (`Publication_MarketDocument`,
//! `GL_MarketDocument` or `Acknowledgement_MarketDocument`) into a [`ParsedDocument`]
//! using serde structs over quick-xml. All knowledge of the document layout lives here.
//!
//! # Document Layout
//!
//! - **Root:** `type` element with the document type code (absent on acknowledgements)
//! - **TimeSeries:** optional `MktPSRType/psrType` category, unit header elements
//! - **Period:** mandatory `timeInterval/start`, `resolution` and at least one `Point`
//! - **Point:** `position` plus `quantity` (load, generation) or `price.amount` (prices)
//! - **Encoding:** UTF-8, optional byte-order mark
//!
//! Element names are matched without regard to the document namespace.
//!
//! # Examples
//!
//! ```rust
//! use entsoe_data::xml_parser::parse_document;
//! use entsoe_data::codes::DocumentType;
//!
//! let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
//! <GL_MarketDocument xmlns="urn:iec62325.351:tc57wg16:451-6:generationloaddocument:3:0">
//!   <type>A65</type>
//!   <TimeSeries>
//!     <quantity_Measure_Unit.name>MAW</quantity_Measure_Unit.name>
//!     <Period>
//!       <timeInterval><start>2024-10-01T00:00Z</start><end>2024-10-01T02:00Z</end></timeInterval>
//!       <resolution>PT60M</resolution>
//!       <Point><position>1</position><quantity>1000</quantity></Point>
//!       <Point><position>2</position><quantity>1100</quantity></Point>
//!     </Period>
//!   </TimeSeries>
//! </GL_MarketDocument>"#;
//!
//! let doc = parse_document(xml.as_bytes()).unwrap();
//! assert_eq!(doc.document_type, DocumentType::TotalLoad);
//! assert_eq!(doc.records.len(), 1);
//! assert_eq!(doc.records[0].points.len(), 2);
//! assert_eq!(doc.records[0].unit.as_deref(), Some("MAW"));
//! ```

use serde::Deserialize;
use tracing::{debug, warn};

use crate::codes::DocumentType;
use crate::error::ParseError;
use crate::transformations::*;
use crate::types::{ParsedDocument, Point, TimeSeriesRecord};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

// ============================================================================
// Document Schema
// ============================================================================

#[derive(Debug, Deserialize)]
struct XmlMarketDocument {
    #[serde(rename = "type")]
    document_type: Option<String>,

    #[serde(rename = "TimeSeries", default)]
    time_series: Vec<XmlTimeSeries>,

    #[serde(rename = "Reason", default)]
    reasons: Vec<XmlReason>,
}

#[derive(Debug, Deserialize)]
struct XmlTimeSeries {
    #[serde(rename = "MktPSRType")]
    psr_type: Option<XmlPsrType>,

    #[serde(rename = "quantity_Measure_Unit.name")]
    quantity_unit: Option<String>,

    #[serde(rename = "currency_Unit.name")]
    currency_unit: Option<String>,

    #[serde(rename = "price_Measure_Unit.name")]
    price_unit: Option<String>,

    #[serde(rename = "Period", default)]
    periods: Vec<XmlPeriod>,
}

#[derive(Debug, Deserialize)]
struct XmlPsrType {
    #[serde(rename = "psrType")]
    code: Option<String>,
}

#[derive(Debug, Deserialize)]
struct XmlPeriod {
    #[serde(rename = "timeInterval")]
    time_interval: Option<XmlTimeInterval>,

    resolution: Option<String>,

    #[serde(rename = "Point", default)]
    points: Vec<XmlPoint>,
}

#[derive(Debug, Deserialize)]
struct XmlTimeInterval {
    start: Option<String>,
}

#[derive(Debug, Deserialize)]
struct XmlPoint {
    position: Option<String>,

    quantity: Option<String>,

    #[serde(rename = "price.amount")]
    price_amount: Option<String>,
}

#[derive(Debug, Deserialize)]
struct XmlReason {
    code: Option<String>,
    text: Option<String>,
}

// ============================================================================
// Parser
// ============================================================================

/// Parse one market document
///
/// Each `Period` of each `TimeSeries` becomes one [`TimeSeriesRecord`]. Quantities are
/// stored as given; positions absent from the document stay absent.
///
/// # Arguments
///
/// * `bytes` - Raw document bytes (UTF-8, optionally with byte-order mark)
///
/// # Returns
///
/// * `Ok(ParsedDocument)` - Typed records, or an empty acknowledgement
/// * `Err(ParseError)` - Not well-formed XML, invalid UTF-8, unknown document type,
///   a period without resolution, start or points, or an invalid value
pub fn parse_document(bytes: &[u8]) -> Result<ParsedDocument, ParseError> {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    let text = std::str::from_utf8(bytes)
        .map_err(|e| ParseError::Xml(format!("document is not valid UTF-8: {}", e)))?;

    let raw: XmlMarketDocument = quick_xml::de::from_str(text)?;

    let document_type = match raw.document_type.as_deref().map(str::trim) {
        Some(code) => DocumentType::from_code(code)?,
        None if !raw.reasons.is_empty() => {
            let reason = reason_text(&raw.reasons);
            warn!(reason = %reason, "received acknowledgement document without data");
            return Ok(ParsedDocument {
                document_type: DocumentType::Acknowledgement,
                records: Vec::new(),
                reason: Some(reason),
            });
        }
        None => {
            return Err(ParseError::MissingField {
                field: "type".to_string(),
                context: "document root".to_string(),
            })
        }
    };

    let mut records = Vec::new();
    for (series_index, series) in raw.time_series.iter().enumerate() {
        let series_context = format!("TimeSeries #{}", series_index + 1);
        if series.periods.is_empty() {
            return Err(missing("Period", &series_context));
        }

        let category = series
            .psr_type
            .as_ref()
            .and_then(|psr| psr.code.as_deref())
            .map(str::trim)
            .filter(|code| !code.is_empty())
            .map(str::to_string);
        let unit = series_unit(series);

        for (period_index, period) in series.periods.iter().enumerate() {
            let context = format!("{}, Period #{}", series_context, period_index + 1);
            records.push(parse_period(
                period,
                document_type,
                category.clone(),
                unit.clone(),
                &context,
            )?);
        }
    }

    debug!(
        document_type = %document_type,
        series = raw.time_series.len(),
        records = records.len(),
        "parsed market document"
    );

    Ok(ParsedDocument {
        document_type,
        records,
        reason: None,
    })
}

fn parse_period(
    period: &XmlPeriod,
    document_type: DocumentType,
    category: Option<String>,
    unit: Option<String>,
    context: &str,
) -> Result<TimeSeriesRecord, ParseError> {
    let resolution = period
        .resolution
        .as_deref()
        .ok_or_else(|| missing("resolution", context))
        .and_then(parse_resolution)?;

    let period_start = period
        .time_interval
        .as_ref()
        .and_then(|interval| interval.start.as_deref())
        .ok_or_else(|| missing("timeInterval/start", context))
        .and_then(parse_period_start)?;

    if period.points.is_empty() {
        return Err(missing("Point", context));
    }

    let mut points = period
        .points
        .iter()
        .map(|point| parse_point(point, document_type, context))
        .collect::<Result<Vec<_>, _>>()?;
    points.sort_by_key(|point| point.position);

    Ok(TimeSeriesRecord {
        category,
        resolution,
        period_start,
        points,
        unit,
    })
}

fn parse_point(
    point: &XmlPoint,
    document_type: DocumentType,
    context: &str,
) -> Result<Point, ParseError> {
    let position = point
        .position
        .as_deref()
        .ok_or_else(|| missing("position", context))
        .and_then(parse_position)?;

    let value = if document_type.uses_price_amount() {
        point.price_amount.as_deref().or(point.quantity.as_deref())
    } else {
        point.quantity.as_deref().or(point.price_amount.as_deref())
    };

    let quantity = match value {
        Some(text) => parse_quantity(text)?,
        None => None,
    };

    Ok(Point { position, quantity })
}

/// "EUR/MWH" for price series, the quantity unit otherwise
fn series_unit(series: &XmlTimeSeries) -> Option<String> {
    match (&series.currency_unit, &series.price_unit) {
        (Some(currency), Some(measure)) => Some(format!("{}/{}", currency.trim(), measure.trim())),
        _ => series.quantity_unit.as_ref().map(|unit| unit.trim().to_string()),
    }
}

fn reason_text(reasons: &[XmlReason]) -> String {
    reasons
        .iter()
        .map(|reason| match (&reason.code, &reason.text) {
            (Some(code), Some(text)) => format!("{}: {}", code.trim(), text.trim()),
            (None, Some(text)) => text.trim().to_string(),
            (Some(code), None) => code.trim().to_string(),
            (None, None) => String::new(),
        })
        .filter(|text| !text.is_empty())
        .collect::<Vec<_>>()
        .join("; ")
}

fn missing(field: &str, context: &str) -> ParseError {
    ParseError::MissingField {
        field: field.to_string(),
        context: context.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    const PRICE_DOC: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<Publication_MarketDocument xmlns="urn:iec62325.351:tc57wg16:451-3:publicationdocument:7:3">
  <mRID>5b1f8a0c1e8e4f0bb9f3</mRID>
  <revisionNumber>1</revisionNumber>
  <type>A44</type>
  <period.timeInterval>
    <start>2024-10-07T22:00Z</start>
    <end>2024-10-08T22:00Z</end>
  </period.timeInterval>
  <TimeSeries>
    <mRID>1</mRID>
    <businessType>A62</businessType>
    <in_Domain.mRID codingScheme="A01">10YBE----------2</in_Domain.mRID>
    <currency_Unit.name>EUR</currency_Unit.name>
    <price_Measure_Unit.name>MWH</price_Measure_Unit.name>
    <curveType>A03</curveType>
    <Period>
      <timeInterval>
        <start>2024-10-07T22:00Z</start>
        <end>2024-10-08T01:00Z</end>
      </timeInterval>
      <resolution>PT60M</resolution>
      <Point><position>1</position><price.amount>64.98</price.amount></Point>
      <Point><position>2</position><price.amount>57.86</price.amount></Point>
      <Point><position>3</position><price.amount>-5.01</price.amount></Point>
    </Period>
  </TimeSeries>
</Publication_MarketDocument>"#;

    const GENERATION_DOC: &str = r#"<GL_MarketDocument>
  <type>A75</type>
  <TimeSeries>
    <MktPSRType><psrType>B16</psrType></MktPSRType>
    <quantity_Measure_Unit.name>MAW</quantity_Measure_Unit.name>
    <Period>
      <timeInterval><start>2024-01-01T00:00Z</start><end>2024-01-01T01:00Z</end></timeInterval>
      <resolution>PT15M</resolution>
      <Point><position>1</position><quantity>10</quantity></Point>
      <Point><position>3</position><quantity>30</quantity></Point>
    </Period>
    <Period>
      <timeInterval><start>2024-01-01T01:00Z</start><end>2024-01-01T02:00Z</end></timeInterval>
      <resolution>PT60M</resolution>
      <Point><position>1</position><quantity>50</quantity></Point>
    </Period>
  </TimeSeries>
  <TimeSeries>
    <MktPSRType><psrType>B19</psrType></MktPSRType>
    <Period>
      <timeInterval><start>2024-01-01T00:00Z</start><end>2024-01-01T01:00Z</end></timeInterval>
      <resolution>PT60M</resolution>
      <Point><position>1</position><quantity>7</quantity></Point>
    </Period>
  </TimeSeries>
</GL_MarketDocument>"#;

    const ACK_DOC: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<Acknowledgement_MarketDocument xmlns="urn:iec62325.351:tc57wg16:451-1:acknowledgementdocument:7:0">
  <mRID>a1b2c3</mRID>
  <createdDateTime>2024-10-08T10:00:00Z</createdDateTime>
  <Reason>
    <code>999</code>
    <text>No matching data found for Data item Actual Generation per Production Type</text>
  </Reason>
</Acknowledgement_MarketDocument>"#;

    fn load_doc(period_body: &str) -> String {
        format!(
            "<GL_MarketDocument><type>A65</type><TimeSeries><Period>{}</Period></TimeSeries></GL_MarketDocument>",
            period_body
        )
    }

    #[test]
    fn test_parse_price_document() {
        let doc = parse_document(PRICE_DOC.as_bytes()).unwrap();
        assert_eq!(doc.document_type, DocumentType::Prices);
        assert_eq!(doc.records.len(), 1);

        let record = &doc.records[0];
        assert_eq!(record.category, None);
        assert_eq!(record.unit.as_deref(), Some("EUR/MWH"));
        assert_eq!(record.resolution.minutes(), 60);
        assert_eq!(
            record.period_start,
            Utc.with_ymd_and_hms(2024, 10, 7, 22, 0, 0).unwrap()
        );
        assert_eq!(record.points[0].quantity, Some(64.98));
        assert_eq!(record.points[2].quantity, Some(-5.01));
    }

    #[test]
    fn test_each_period_becomes_a_record() {
        let doc = parse_document(GENERATION_DOC.as_bytes()).unwrap();
        assert_eq!(doc.document_type, DocumentType::GenerationPerType);
        assert_eq!(doc.records.len(), 3);

        assert_eq!(doc.records[0].category.as_deref(), Some("B16"));
        assert_eq!(doc.records[0].resolution.minutes(), 15);
        assert_eq!(doc.records[1].category.as_deref(), Some("B16"));
        assert_eq!(doc.records[1].resolution.minutes(), 60);
        assert_eq!(doc.records[2].category.as_deref(), Some("B19"));
        assert_eq!(doc.records[2].unit, None);
    }

    #[test]
    fn test_sparse_positions_are_kept_sparse() {
        let doc = parse_document(GENERATION_DOC.as_bytes()).unwrap();
        let positions: Vec<u32> = doc.records[0].points.iter().map(|p| p.position).collect();
        assert_eq!(positions, vec![1, 3]);
    }

    #[test]
    fn test_points_sorted_by_position() {
        let xml = load_doc(
            "<timeInterval><start>2024-01-01T00:00Z</start></timeInterval>\
             <resolution>PT60M</resolution>\
             <Point><position>2</position><quantity>20</quantity></Point>\
             <Point><position>1</position><quantity>10</quantity></Point>",
        );
        let doc = parse_document(xml.as_bytes()).unwrap();
        assert_eq!(doc.records[0].points[0].quantity, Some(10.0));
        assert_eq!(doc.records[0].points[1].quantity, Some(20.0));
    }

    #[test]
    fn test_acknowledgement_document() {
        let doc = parse_document(ACK_DOC.as_bytes()).unwrap();
        assert!(doc.is_acknowledgement());
        assert!(doc.records.is_empty());
        let reason = doc.reason.unwrap();
        assert!(reason.starts_with("999: No matching data found"));
    }

    #[test]
    fn test_byte_order_mark_is_tolerated() {
        let mut bytes = UTF8_BOM.to_vec();
        bytes.extend_from_slice(GENERATION_DOC.as_bytes());
        let doc = parse_document(&bytes).unwrap();
        assert_eq!(doc.records.len(), 3);
    }

    #[test]
    fn test_document_without_time_series() {
        let doc = parse_document(b"<GL_MarketDocument><type>A65</type></GL_MarketDocument>").unwrap();
        assert_eq!(doc.document_type, DocumentType::TotalLoad);
        assert!(doc.records.is_empty());
    }

    #[test]
    fn test_missing_resolution() {
        let xml = load_doc(
            "<timeInterval><start>2024-01-01T00:00Z</start></timeInterval>\
             <Point><position>1</position><quantity>10</quantity></Point>",
        );
        match parse_document(xml.as_bytes()) {
            Err(ParseError::MissingField { field, context }) => {
                assert_eq!(field, "resolution");
                assert_eq!(context, "TimeSeries #1, Period #1");
            }
            other => panic!("Expected MissingField, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_period_start() {
        let xml = load_doc(
            "<resolution>PT60M</resolution>\
             <Point><position>1</position><quantity>10</quantity></Point>",
        );
        match parse_document(xml.as_bytes()) {
            Err(ParseError::MissingField { field, .. }) => assert_eq!(field, "timeInterval/start"),
            other => panic!("Expected MissingField, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_points() {
        let xml = load_doc(
            "<timeInterval><start>2024-01-01T00:00Z</start></timeInterval>\
             <resolution>PT60M</resolution>",
        );
        match parse_document(xml.as_bytes()) {
            Err(ParseError::MissingField { field, .. }) => assert_eq!(field, "Point"),
            other => panic!("Expected MissingField, got {:?}", other),
        }
    }

    #[test]
    fn test_time_series_without_period() {
        let xml = "<GL_MarketDocument><type>A65</type><TimeSeries><mRID>1</mRID></TimeSeries></GL_MarketDocument>";
        match parse_document(xml.as_bytes()) {
            Err(ParseError::MissingField { field, context }) => {
                assert_eq!(field, "Period");
                assert_eq!(context, "TimeSeries #1");
            }
            other => panic!("Expected MissingField, got {:?}", other),
        }
    }

    #[test]
    fn test_invalid_values_are_malformed() {
        let bad_position = load_doc(
            "<timeInterval><start>2024-01-01T00:00Z</start></timeInterval>\
             <resolution>PT60M</resolution>\
             <Point><position>0</position><quantity>10</quantity></Point>",
        );
        assert!(matches!(
            parse_document(bad_position.as_bytes()),
            Err(ParseError::InvalidPosition(_))
        ));

        let bad_quantity = load_doc(
            "<timeInterval><start>2024-01-01T00:00Z</start></timeInterval>\
             <resolution>PT60M</resolution>\
             <Point><position>1</position><quantity>ten</quantity></Point>",
        );
        assert!(matches!(
            parse_document(bad_quantity.as_bytes()),
            Err(ParseError::InvalidQuantity(_))
        ));

        let monthly = load_doc(
            "<timeInterval><start>2024-01-01T00:00Z</start></timeInterval>\
             <resolution>P1M</resolution>\
             <Point><position>1</position><quantity>10</quantity></Point>",
        );
        assert!(matches!(
            parse_document(monthly.as_bytes()),
            Err(ParseError::InvalidResolution(_))
        ));
    }

    #[test]
    fn test_unknown_document_type() {
        let xml = "<GL_MarketDocument><type>B99</type></GL_MarketDocument>";
        assert_eq!(
            parse_document(xml.as_bytes()),
            Err(ParseError::UnknownDocumentType("B99".to_string()))
        );
    }

    #[test]
    fn test_missing_type_without_reason() {
        let xml = "<GL_MarketDocument><TimeSeries/></GL_MarketDocument>";
        match parse_document(xml.as_bytes()) {
            Err(ParseError::MissingField { field, .. }) => assert_eq!(field, "type"),
            other => panic!("Expected MissingField, got {:?}", other),
        }
    }

    #[test]
    fn test_truncated_xml_is_malformed() {
        let truncated = &GENERATION_DOC[..GENERATION_DOC.len() / 2];
        assert!(matches!(
            parse_document(truncated.as_bytes()),
            Err(ParseError::Xml(_))
        ));
    }

    #[test]
    fn test_invalid_utf8_is_malformed() {
        match parse_document(&[0x3c, 0x61, 0xff, 0x3e]) {
            Err(ParseError::Xml(msg)) => assert!(msg.contains("UTF-8")),
            other => panic!("Expected Xml error, got {:?}", other),
        }
    }

    #[test]
    fn test_not_xml_at_all() {
        assert!(parse_document(b"Unauthorized").is_err());
    }
}
