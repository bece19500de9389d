/// Common types and utilities shared across handlers and services
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use utoipa::{IntoParams, ToSchema};

/// Optional row cap for list endpoints
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct LimitParams {
    pub limit: Option<u64>,
}

/// Parses either an RFC 3339 timestamp or a bare `YYYY-MM-DD` date (midnight UTC).
pub fn parse_flexible_date(raw: &str) -> Result<DateTime<Utc>, String> {
    let trimmed = raw.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(parsed.with_timezone(&Utc));
    }

    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
        .ok_or_else(|| format!("invalid date '{}', expected YYYY-MM-DD or RFC 3339", raw))
}

/// Serde adapter for `Option<DateTime<Utc>>` fields that accept both date formats.
/// Pair with `#[serde(default)]` so absent fields stay `None`.
pub fn deserialize_optional_date<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw {
        Some(value) if !value.trim().is_empty() => parse_flexible_date(&value)
            .map(Some)
            .map_err(serde::de::Error::custom),
        _ => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[derive(Deserialize)]
    struct Holder {
        #[serde(default, deserialize_with = "deserialize_optional_date")]
        date: Option<DateTime<Utc>>,
    }

    #[test]
    fn parses_plain_dates_as_utc_midnight() {
        let parsed = parse_flexible_date("2024-03-15").unwrap();
        assert_eq!((parsed.year(), parsed.month(), parsed.day()), (2024, 3, 15));
        assert_eq!(parsed.hour(), 0);
    }

    #[test]
    fn parses_rfc3339_with_offset() {
        let parsed = parse_flexible_date("2024-03-15T23:30:00-02:00").unwrap();
        assert_eq!(parsed.day(), 16);
        assert_eq!(parsed.hour(), 1);
    }

    #[test]
    fn rejects_garbage() {
        assert!(parse_flexible_date("15/03/2024").is_err());
    }

    #[test]
    fn optional_field_handles_missing_null_and_value() {
        let missing: Holder = serde_json::from_str("{}").unwrap();
        assert!(missing.date.is_none());

        let null: Holder = serde_json::from_str(r#"{"date": null}"#).unwrap();
        assert!(null.date.is_none());

        let set: Holder = serde_json::from_str(r#"{"date": "2024-01-02"}"#).unwrap();
        assert_eq!(set.date.unwrap().month(), 1);

        assert!(serde_json::from_str::<Holder>(r#"{"date": "nope"}"#).is_err());
    }
}
