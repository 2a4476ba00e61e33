use anyhow::{Context, Result};
use chrono::{DateTime, Utc};

use crate::models::CaptureMethod;

pub fn parse_datetime(value: &str, field: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .with_context(|| format!("failed to parse {field}"))
}

pub fn parse_method(value: &str) -> Result<CaptureMethod> {
    value
        .parse()
        .with_context(|| format!("failed to parse capture method {value}"))
}
