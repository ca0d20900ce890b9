// src/models/document.rs
//
// Permissive mapping between raw store documents and typed records. Reads
// never fail: a field that is absent or of the wrong shape degrades to its
// empty value, and a malformed amount reads as zero.

use crate::store::{Collection, Document, Fields};
use chrono::{DateTime, NaiveDate};
use rust_decimal::Decimal;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use serde_json::{Number, Value};

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// A typed view over one of the four collections.
pub trait Record: Sized {
    const COLLECTION: Collection;

    fn from_document(doc: Document) -> Self;

    /// Body written on create and on full-replace update. Never contains the id.
    fn to_fields(&self) -> Fields;
}

// ─── Reading ──────────────────────────────────────────────────────────────────

/// Non-blank string field.
pub fn text(doc: &Document, key: &str) -> Option<String> {
    match doc.get(key)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Numeric field; numeric strings are accepted, anything else is zero.
pub fn amount(doc: &Document, key: &str) -> Decimal {
    doc.get(key).map(coerce_amount).unwrap_or(Decimal::ZERO)
}

pub fn coerce_amount(value: &Value) -> Decimal {
    match value {
        Value::Number(n) => match n.as_i64() {
            Some(i) => Decimal::from(i),
            None => n.as_f64().and_then(Decimal::from_f64).unwrap_or(Decimal::ZERO),
        },
        Value::String(s) => s.trim().parse::<Decimal>().unwrap_or(Decimal::ZERO),
        _ => Decimal::ZERO,
    }
}

/// Array of strings with blanks and duplicates dropped, first occurrence wins.
pub fn string_set(doc: &Document, key: &str) -> Vec<String> {
    let items = match doc.get(key) {
        Some(Value::Array(items)) => items,
        _ => return Vec::new(),
    };
    dedup(
        items
            .iter()
            .filter_map(Value::as_str)
            .filter(|s| !s.trim().is_empty())
            .map(str::to_string),
    )
}

/// Calendar date stored as `YYYY-MM-DD`; RFC 3339 timestamps are also read.
pub fn date(doc: &Document, key: &str) -> Option<NaiveDate> {
    let raw = doc.get(key)?.as_str()?.trim();
    NaiveDate::parse_from_str(raw, DATE_FORMAT)
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.date_naive()))
}

pub fn dedup(items: impl IntoIterator<Item = String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for item in items {
        if !out.contains(&item) {
            out.push(item);
        }
    }
    out
}

// ─── Writing ──────────────────────────────────────────────────────────────────

/// Absent strings are written as `""`, the shape the store already holds.
pub fn put_text(fields: &mut Fields, key: &str, value: &Option<String>) {
    fields.insert(
        key.to_string(),
        Value::String(value.clone().unwrap_or_default()),
    );
}

pub fn put_amount(fields: &mut Fields, key: &str, value: Decimal) {
    fields.insert(key.to_string(), decimal_to_json(value));
}

pub fn put_set(fields: &mut Fields, key: &str, values: &[String]) {
    fields.insert(
        key.to_string(),
        Value::Array(values.iter().cloned().map(Value::String).collect()),
    );
}

pub fn put_date(fields: &mut Fields, key: &str, value: Option<NaiveDate>) {
    let raw = value
        .map(|d| d.format(DATE_FORMAT).to_string())
        .unwrap_or_default();
    fields.insert(key.to_string(), Value::String(raw));
}

/// Whole amounts become integers, fractional ones doubles.
pub fn decimal_to_json(value: Decimal) -> Value {
    let number = if value.fract().is_zero() {
        value.to_i64().map(Number::from)
    } else {
        None
    };
    number
        .or_else(|| value.to_f64().and_then(Number::from_f64))
        .map(Value::Number)
        .unwrap_or_else(|| Value::String(value.to_string()))
}
