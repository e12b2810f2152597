//! Brand form validation.
//!
//! Fields are checked in a fixed order and each field stops at its first failing rule.
//! Values are HTML-escaped before they are stored or echoed back into a form.

use super::brand::Brand;
use chrono::{DateTime, NaiveDate};
use handlebars::html_escape;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;

pub const MAX_NAME_LEN: usize = 100;

/// Raw form submission. Missing fields deserialize as `None`.
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
pub struct BrandForm {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub founded: Option<String>,
}

/// Validated fields, ready to persist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrandInput {
    pub name: String,
    pub founded: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: Cow<'static, str>,
}

/// Escaped values shown in the brand form inputs.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct FormValues {
    pub name: String,
    pub founded: String,
}

/// Stored names were escaped on the way in and are used as they are.
impl From<&Brand> for FormValues {
    fn from(brand: &Brand) -> Self {
        Self { name: brand.name.clone(), founded: brand.founded_yyyy_mm_dd() }
    }
}

/// Every collected error plus the escaped input, for redisplay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationFailure {
    pub values: FormValues,
    pub errors: Vec<FieldError>,
}

impl ValidationFailure {
    #[must_use]
    pub fn message_for(&self, field: &str) -> Option<&str> {
        self.errors.iter().find(|e| e.field == field).map(|e| e.message.as_ref())
    }
}

impl BrandForm {
    /// Runs the pipeline. Never touches storage.
    ///
    /// # Errors
    /// Returns a [`ValidationFailure`] holding at least one [`FieldError`].
    pub fn validate(&self) -> Result<BrandInput, ValidationFailure> {
        let name = self.name.as_deref().unwrap_or_default().trim();
        let founded = self.founded.as_deref().unwrap_or_default().trim();

        let mut errors = Vec::new();

        if let Err(message) = check_name(name) {
            errors.push(FieldError { field: "name", message: message.into() });
        }

        let date = match parse_founded(founded) {
            Ok(date) => date,
            Err(message) => {
                errors.push(FieldError { field: "founded", message: message.into() });
                None
            }
        };

        let values = FormValues { name: html_escape(name), founded: html_escape(founded) };

        if errors.is_empty() {
            Ok(BrandInput { name: values.name, founded: date })
        } else {
            Err(ValidationFailure { values, errors })
        }
    }
}

fn check_name(name: &str) -> Result<(), &'static str> {
    if name.is_empty() {
        return Err("Brand name must be specified.");
    }
    if !name.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err("Brand name has non-alphanumeric characters.");
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err("Brand name must be at most 100 characters.");
    }
    Ok(())
}

/// An empty value means "unknown". Otherwise an ISO 8601 calendar date (`YYYY-MM-DD`,
/// `YYYYMMDD`, `YYYY-MM` or `YYYY`, a missing month or day being the first) or an
/// RFC 3339 timestamp, of which only the date is kept.
///
/// # Errors
/// `"Invalid date"` for anything else.
pub fn parse_founded(raw: &str) -> Result<Option<NaiveDate>, &'static str> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }

    reduced_date(raw)
        .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|ts| ts.date_naive()))
        .map(Some)
        .ok_or("Invalid date")
}

/// Calendar dates in ISO 8601 basic, extended and reduced precision forms.
fn reduced_date(raw: &str) -> Option<NaiveDate> {
    if !raw.is_ascii() {
        return None;
    }
    let number = |digits: &str| -> Option<u32> {
        if digits.bytes().all(|b| b.is_ascii_digit()) { digits.parse().ok() } else { None }
    };

    let (year, month, day) = match raw.len() {
        4 => (raw, "1", "1"),
        7 if raw.as_bytes()[4] == b'-' => (&raw[..4], &raw[5..], "1"),
        8 => (&raw[..4], &raw[4..6], &raw[6..]),
        10 if raw.as_bytes()[4] == b'-' && raw.as_bytes()[7] == b'-' => {
            (&raw[..4], &raw[5..7], &raw[8..])
        }
        _ => return None,
    };

    let year = i32::try_from(number(year)?).ok()?;
    NaiveDate::from_ymd_opt(year, number(month)?, number(day)?)
}
