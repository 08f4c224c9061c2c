//! Shared validation helpers for inbound HTTP adapters.
//!
//! Mutating endpoints validate strictly and answer `invalid_request` with a
//! `details` object naming the offending field. The listing endpoint uses the
//! lenient parsers at the bottom of this module, which drop bad values.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, de};
use serde_json::json;

use crate::domain::{
    Error, GoalPeriodError, GoalValidationError, ProductValidationError, TagId, TagNameError,
    VideoCountError,
};

/// Validation error codes for HTTP request failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ErrorCode {
    MissingField,
    InvalidDate,
    InvalidCount,
    InvalidTarget,
    InvalidPeriod,
    InvalidTag,
    InvalidUrl,
    DuplicateCategory,
}

impl ErrorCode {
    const fn as_str(self) -> &'static str {
        match self {
            Self::MissingField => "missing_field",
            Self::InvalidDate => "invalid_date",
            Self::InvalidCount => "invalid_count",
            Self::InvalidTarget => "invalid_target",
            Self::InvalidPeriod => "invalid_period",
            Self::InvalidTag => "invalid_tag",
            Self::InvalidUrl => "invalid_url",
            Self::DuplicateCategory => "duplicate_category",
        }
    }
}

/// Newtype wrapper for HTTP field names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldName(&'static str);

impl FieldName {
    pub(crate) const fn new(name: &'static str) -> Self {
        Self(name)
    }

    const fn as_str(self) -> &'static str {
        self.0
    }
}

fn field_error(field: &str, code: ErrorCode, message: impl Into<String>) -> Error {
    Error::invalid_request(message).with_details(json!({
        "field": field,
        "code": code.as_str(),
    }))
}

fn field_value_error(
    field: &str,
    code: ErrorCode,
    value: impl Into<String>,
    message: impl Into<String>,
) -> Error {
    Error::invalid_request(message).with_details(json!({
        "field": field,
        "value": value.into(),
        "code": code.as_str(),
    }))
}

pub(crate) fn missing_field_error(field: FieldName) -> Error {
    let name = field.as_str();
    field_error(
        name,
        ErrorCode::MissingField,
        format!("missing required field: {name}"),
    )
}

/// Unwrap a required body or query value.
pub(crate) fn require<T>(value: Option<T>, field: FieldName) -> Result<T, Error> {
    value.ok_or_else(|| missing_field_error(field))
}

/// Parse a `YYYY-MM-DD` calendar date.
pub(crate) fn parse_date(value: &str, field: FieldName) -> Result<NaiveDate, Error> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| {
        let name = field.as_str();
        field_value_error(
            name,
            ErrorCode::InvalidDate,
            value,
            format!("{name} must be a YYYY-MM-DD date"),
        )
    })
}

pub(crate) fn video_count_error(error: &VideoCountError) -> Error {
    field_error("count", ErrorCode::InvalidCount, error.to_string())
}

pub(crate) fn goal_period_error(error: &GoalPeriodError) -> Error {
    let field = match error {
        GoalPeriodError::MonthOutOfRange(_) => "month",
        GoalPeriodError::YearOutOfRange(_) => "year",
    };
    field_error(field, ErrorCode::InvalidPeriod, error.to_string())
}

pub(crate) fn goal_validation_error(error: &GoalValidationError) -> Error {
    match error {
        GoalValidationError::NegativeTarget { field, .. }
        | GoalValidationError::TargetTooLarge { field, .. } => {
            field_error(field, ErrorCode::InvalidTarget, error.to_string())
        }
        GoalValidationError::Tag(_) => {
            field_error("category_goals.tag_name", ErrorCode::InvalidTag, error.to_string())
        }
        GoalValidationError::DuplicateCategory(name) => field_value_error(
            "category_goals",
            ErrorCode::DuplicateCategory,
            name.as_str(),
            error.to_string(),
        ),
    }
}

pub(crate) fn product_validation_error(error: &ProductValidationError) -> Error {
    match error {
        ProductValidationError::EmptyUrl | ProductValidationError::UrlTooLong { .. } => {
            field_error("url", ErrorCode::InvalidUrl, error.to_string())
        }
        ProductValidationError::Tag(_) => {
            field_error("tags", ErrorCode::InvalidTag, error.to_string())
        }
    }
}

pub(crate) fn tag_name_error(error: &TagNameError, field: FieldName) -> Error {
    field_error(field.as_str(), ErrorCode::InvalidTag, error.to_string())
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrText<T> {
    Number(T),
    Text(String),
}

/// `deserialize_with` helper for numeric body fields that browsers may send
/// as form-input strings. Accepts a JSON number or a numeric string; `null`
/// and blank strings read as missing. Pair it with `#[serde(default)]`.
pub(crate) fn optional_number<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + FromStr,
    T::Err: fmt::Display,
{
    match Option::<NumberOrText<T>>::deserialize(deserializer)? {
        None => Ok(None),
        Some(NumberOrText::Number(value)) => Ok(Some(value)),
        Some(NumberOrText::Text(text)) if text.trim().is_empty() => Ok(None),
        Some(NumberOrText::Text(text)) => text.trim().parse().map(Some).map_err(de::Error::custom),
    }
}

/// Lenient boolean: only `true` and `false` are recognised.
pub(crate) fn lenient_bool(raw: Option<&str>) -> Option<bool> {
    match raw?.trim() {
        "true" => Some(true),
        "false" => Some(false),
        _ => None,
    }
}

/// Lenient date: anything but a `YYYY-MM-DD` string is dropped.
pub(crate) fn lenient_date(raw: Option<&str>) -> Option<NaiveDate> {
    raw.and_then(|value| NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").ok())
}

/// Lenient non-negative integer that fits the storage column.
pub(crate) fn lenient_non_negative(raw: Option<&str>) -> Option<i32> {
    raw?.trim().parse::<i32>().ok().filter(|value| *value >= 0)
}

/// Lenient positive integer, used for pagination parameters.
pub(crate) fn lenient_positive(raw: Option<&str>) -> Option<u32> {
    raw?.trim().parse::<u32>().ok().filter(|value| *value > 0)
}

/// Comma-separated tag ids; invalid entries are dropped and duplicates
/// removed.
pub(crate) fn lenient_tag_ids(raw: Option<&str>) -> Vec<TagId> {
    let mut ids: Vec<TagId> = raw
        .unwrap_or_default()
        .split(',')
        .filter_map(|part| part.trim().parse::<i32>().ok())
        .filter(|id| *id > 0)
        .map(TagId::new)
        .collect();
    ids.sort_unstable();
    ids.dedup();
    ids
}
