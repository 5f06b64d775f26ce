use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use mongodb::bson::DateTime as BsonDateTime;
use serde::{Deserialize, Deserializer};

/// ISO-8601 UTC with millisecond precision, e.g. `2024-05-01T10:00:00.000Z`.
pub fn iso_now() -> String {
    format_iso(Utc::now())
}

pub fn format_iso(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub fn bson_to_iso(dt: BsonDateTime) -> String {
    match DateTime::<Utc>::from_timestamp_millis(dt.timestamp_millis()) {
        Some(chrono_dt) => format_iso(chrono_dt),
        // Outside chrono's range; bson can still render it
        None => dt.try_to_rfc3339_string().unwrap_or_default(),
    }
}

pub fn chrono_to_bson(dt: DateTime<Utc>) -> BsonDateTime {
    BsonDateTime::from_millis(dt.timestamp_millis())
}

/// Dates accepted in request bodies: RFC 3339, a bare `YYYY-MM-DD`
/// (midnight UTC), or milliseconds since the epoch.
pub fn parse_flexible_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawDate {
    Text(String),
    Millis(i64),
}

/// `deserialize_with` helper for optional request dates; use with `#[serde(default)]`.
pub fn deserialize_optional_date<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    match Option::<RawDate>::deserialize(deserializer)? {
        None => Ok(None),
        Some(RawDate::Text(text)) => parse_flexible_date(&text)
            .map(Some)
            .ok_or_else(|| D::Error::custom(format!("invalid date `{}`", text))),
        Some(RawDate::Millis(millis)) => DateTime::<Utc>::from_timestamp_millis(millis)
            .map(Some)
            .ok_or_else(|| D::Error::custom(format!("date out of range: {}", millis))),
    }
}
