//! Date and datetime widget values.
//!
//! In memory a date is a Unix timestamp in milliseconds. It is stored as a
//! string in the field's `format`, or RFC 3339 when the field has none.

use super::FieldSerializer;
use crate::model::Field;
use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde_json::Value;
use tracing::debug;

#[derive(Clone, Copy, Debug, Default)]
pub struct DateSerializer;

impl DateSerializer {
    fn parse(field: &Field, raw: &str) -> Option<DateTime<Utc>> {
        match field.format.as_deref() {
            Some(format) => NaiveDateTime::parse_from_str(raw, format)
                .ok()
                .or_else(|| {
                    NaiveDate::parse_from_str(raw, format)
                        .ok()
                        .and_then(|date| date.and_hms_opt(0, 0, 0))
                })
                .map(|naive| Utc.from_utc_datetime(&naive)),
            None => DateTime::parse_from_rfc3339(raw)
                .ok()
                .map(|dt| dt.with_timezone(&Utc)),
        }
    }
}

impl FieldSerializer for DateSerializer {
    fn serialize(&self, field: &Field, value: &Value) -> Value {
        let Some(millis) = value.as_i64() else {
            return value.clone();
        };
        let Some(datetime) = Utc.timestamp_millis_opt(millis).single() else {
            debug!(field = %field.name, millis, "timestamp out of range, left as is");
            return value.clone();
        };

        let formatted = match field.format.as_deref() {
            Some(format) => datetime.format(format).to_string(),
            None => datetime.to_rfc3339(),
        };
        Value::String(formatted)
    }

    fn deserialize(&self, field: &Field, value: &Value) -> Value {
        let Some(raw) = value.as_str() else {
            return value.clone();
        };
        match Self::parse(field, raw) {
            Some(datetime) => Value::from(datetime.timestamp_millis()),
            None => {
                debug!(field = %field.name, raw, "unparseable date, left as is");
                value.clone()
            }
        }
    }
}
