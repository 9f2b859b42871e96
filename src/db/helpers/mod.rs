use std::convert::TryFrom;

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Utc};

use crate::ergonomics::Priority;
use crate::models::{Handedness, ItemCategory, Provenance, Role};

pub fn to_i64(value: usize) -> Result<i64> {
    i64::try_from(value).map_err(|_| anyhow!("value {value} exceeds SQLite INTEGER range"))
}

pub fn parse_datetime(value: &str, field: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .with_context(|| format!("failed to parse {field}"))
}

pub fn parse_role(value: &str) -> Result<Role> {
    value.parse().context("invalid role column")
}

pub fn parse_handedness(value: &str) -> Result<Handedness> {
    value.parse().context("invalid handedness column")
}

pub fn parse_category(value: &str) -> Result<ItemCategory> {
    value.parse().context("invalid item_slug column")
}

pub fn parse_provenance(value: &str) -> Result<Provenance> {
    value.parse().context("invalid provenance column")
}

pub fn parse_priority(value: i64) -> Result<Priority> {
    Priority::from_level(value).context("invalid priority column")
}
