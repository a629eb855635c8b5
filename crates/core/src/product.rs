//! Product field rules: write-payload parsing and per-field validation.
//!
//! Incoming JSON is deserialized into [`ProductInput`], where every field is
//! optional and `null` is kept distinct from "absent". Validation then turns
//! it into a [`ProductDraft`] (create) or [`ProductChanges`] (update), or a
//! [`FieldErrors`] map listing every problem found.
//!
//! Read-only fields (`id`, `created_by`, `created_at`, `updated_at`) are not
//! part of [`ProductInput`] and are dropped during deserialization.

use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::error::FieldErrors;

pub const NAME_MAX_LEN: usize = 255;
pub const SKU_MAX_LEN: usize = 100;
pub const BARCODE_MAX_LEN: usize = 100;
pub const IMAGE_PATH_MAX_LEN: usize = 100;

/// `NUMERIC(10, 2)`.
pub const PRICE_MAX_DIGITS: u32 = 10;
pub const PRICE_DECIMAL_PLACES: u32 = 2;

const MSG_REQUIRED: &str = "This field is required.";
const MSG_NULL: &str = "This field may not be null.";
const MSG_BLANK: &str = "This field may not be blank.";
const MSG_INVALID_NUMBER: &str = "A valid number is required.";
const MSG_INVALID_INTEGER: &str = "A valid integer is required.";
const MSG_INVALID_STRING: &str = "Not a valid string.";
const MSG_NOT_A_FILE: &str = "The submitted data was not a file. Check the encoding type on the form.";

/// Reported on `sku` when another product already uses the value.
pub const MSG_SKU_TAKEN: &str = "product with this sku already exists.";

/// Raw product write payload.
///
/// Each field is `None` when the key is absent and `Some(Value::Null)` for an
/// explicit JSON `null`. Values stay untyped until validation so a wrong JSON
/// type is reported against its field rather than rejecting the body.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct ProductInput {
    #[serde(default, deserialize_with = "present")]
    pub name: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    pub description: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    pub sku: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    pub barcode: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    pub price: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    pub stock_quantity: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    pub image: Option<Value>,
}

/// Marks a key as present, even when its value is `null`.
fn present<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    T::deserialize(deserializer).map(Some)
}

/// A fully validated product ready to be inserted.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductDraft {
    pub name: String,
    pub description: String,
    pub sku: String,
    pub barcode: String,
    pub price: Decimal,
    pub stock_quantity: i32,
    pub image: Option<String>,
}

/// Validated changes for an update. `None` leaves the column untouched.
///
/// `image` is doubly optional: `Some(None)` clears the stored image.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductChanges {
    pub name: Option<String>,
    pub description: Option<String>,
    pub sku: Option<String>,
    pub barcode: Option<String>,
    pub price: Option<Decimal>,
    pub stock_quantity: Option<i32>,
    pub image: Option<Option<String>>,
}

impl ProductChanges {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// How strictly an update payload is checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateMode {
    /// `PUT`: required fields must be present.
    Full,
    /// `PATCH`: only supplied fields are validated.
    Partial,
}

impl ProductInput {
    /// Validate a create payload, filling defaults for omitted optional fields.
    pub fn validate_create(self) -> Result<ProductDraft, FieldErrors> {
        let changes = self.validate(true)?;
        match (changes.name, changes.sku, changes.price) {
            (Some(name), Some(sku), Some(price)) => Ok(ProductDraft {
                name,
                description: changes.description.unwrap_or_default(),
                sku,
                barcode: changes.barcode.unwrap_or_default(),
                price,
                stock_quantity: changes.stock_quantity.unwrap_or(0),
                image: changes.image.flatten(),
            }),
            // validate(true) already reported missing required fields.
            _ => Err(FieldErrors::new()),
        }
    }

    /// Validate an update payload.
    pub fn validate_update(self, mode: UpdateMode) -> Result<ProductChanges, FieldErrors> {
        self.validate(mode == UpdateMode::Full)
    }

    fn validate(self, require: bool) -> Result<ProductChanges, FieldErrors> {
        let mut errors = FieldErrors::new();
        let mut changes = ProductChanges::default();

        changes.name = collect(
            &mut errors,
            "name",
            required_text(self.name, require, NAME_MAX_LEN),
        );
        changes.sku = collect(
            &mut errors,
            "sku",
            required_text(self.sku, require, SKU_MAX_LEN),
        );
        changes.description = collect(
            &mut errors,
            "description",
            optional_text(self.description, None),
        );
        changes.barcode = collect(
            &mut errors,
            "barcode",
            optional_text(self.barcode, Some(BARCODE_MAX_LEN)),
        );

        changes.price = collect(
            &mut errors,
            "price",
            match self.price {
                None if require => Err(MSG_REQUIRED.to_string()),
                None => Ok(None),
                Some(Value::Null) => Err(MSG_NULL.to_string()),
                Some(value) => parse_price(&value).map(Some),
            },
        );

        changes.stock_quantity = collect(
            &mut errors,
            "stock_quantity",
            match self.stock_quantity {
                None => Ok(None),
                Some(Value::Null) => Err(MSG_NULL.to_string()),
                Some(value) => parse_stock_quantity(&value).map(Some),
            },
        );

        changes.image = collect(
            &mut errors,
            "image",
            match self.image {
                None => Ok(None),
                Some(Value::Null) => Ok(Some(None)),
                Some(Value::String(path)) => normalize_image_path(Some(path)).map(Some),
                Some(_) => Err(MSG_NOT_A_FILE.to_string()),
            },
        );

        if errors.is_empty() {
            Ok(changes)
        } else {
            Err(errors)
        }
    }
}

fn collect<T>(errors: &mut FieldErrors, field: &str, result: Result<Option<T>, String>) -> Option<T> {
    match result {
        Ok(value) => value,
        Err(message) => {
            errors.entry(field.to_string()).or_default().push(message);
            None
        }
    }
}

/// Coerce a JSON scalar to text. Numbers are accepted in their JSON
/// spelling; `null` yields `None`.
fn text_value(value: Value) -> Result<Option<String>, String> {
    match value {
        Value::Null => Ok(None),
        Value::String(s) => Ok(Some(s)),
        Value::Number(n) => Ok(Some(n.to_string())),
        _ => Err(MSG_INVALID_STRING.to_string()),
    }
}

fn required_text(value: Option<Value>, require: bool, max_len: usize) -> Result<Option<String>, String> {
    match value {
        None if require => Err(MSG_REQUIRED.to_string()),
        None => Ok(None),
        Some(value) => {
            let Some(raw) = text_value(value)? else {
                return Err(MSG_NULL.to_string());
            };
            let text = raw.trim();
            if text.is_empty() {
                return Err(MSG_BLANK.to_string());
            }
            check_length(text, Some(max_len))?;
            Ok(Some(text.to_string()))
        }
    }
}

/// Blank-able text: `null` and `""` both mean empty.
fn optional_text(value: Option<Value>, max_len: Option<usize>) -> Result<Option<String>, String> {
    match value {
        None => Ok(None),
        Some(value) => {
            let raw = text_value(value)?;
            let text = raw.as_deref().unwrap_or_default().trim();
            check_length(text, max_len)?;
            Ok(Some(text.to_string()))
        }
    }
}

fn check_length(text: &str, max_len: Option<usize>) -> Result<(), String> {
    match max_len {
        Some(max) if text.chars().count() > max => Err(format!(
            "Ensure this field has no more than {max} characters."
        )),
        _ => Ok(()),
    }
}

/// Parse a price from a JSON number or numeric string.
///
/// The result is rescaled to exactly [`PRICE_DECIMAL_PLACES`] places.
pub fn parse_price(value: &Value) -> Result<Decimal, String> {
    let raw = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        _ => return Err(MSG_INVALID_NUMBER.to_string()),
    };

    let mut price = Decimal::from_str(&raw).map_err(|_| MSG_INVALID_NUMBER.to_string())?;

    let decimals = price.scale();
    let mantissa_digits = price.mantissa().unsigned_abs().to_string().len() as u32;
    let total_digits = mantissa_digits.max(decimals);
    let whole_digits = total_digits - decimals;
    let max_whole = PRICE_MAX_DIGITS - PRICE_DECIMAL_PLACES;

    if total_digits > PRICE_MAX_DIGITS {
        return Err(format!(
            "Ensure that there are no more than {PRICE_MAX_DIGITS} digits in total."
        ));
    }
    if decimals > PRICE_DECIMAL_PLACES {
        return Err(format!(
            "Ensure that there are no more than {PRICE_DECIMAL_PLACES} decimal places."
        ));
    }
    if whole_digits > max_whole {
        return Err(format!(
            "Ensure that there are no more than {max_whole} digits before the decimal point."
        ));
    }

    price.rescale(PRICE_DECIMAL_PLACES);
    Ok(price)
}

/// Parse a stock quantity from a JSON integer or integer string.
///
/// A zero fraction is tolerated, so `1.0` and `"2.00"` are whole numbers.
pub fn parse_stock_quantity(value: &Value) -> Result<i32, String> {
    let raw = match value {
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.trim().to_string(),
        _ => return Err(MSG_INVALID_INTEGER.to_string()),
    };
    let whole = match raw.split_once('.') {
        Some((whole, fraction)) if fraction.chars().all(|c| c == '0') => whole,
        Some(_) => return Err(MSG_INVALID_INTEGER.to_string()),
        None => raw.as_str(),
    };
    let wide = whole
        .parse::<i64>()
        .map_err(|_| MSG_INVALID_INTEGER.to_string())?;

    if wide > i64::from(i32::MAX) {
        return Err(format!(
            "Ensure this value is less than or equal to {}.",
            i32::MAX
        ));
    }
    if wide < i64::from(i32::MIN) {
        return Err(format!(
            "Ensure this value is greater than or equal to {}.",
            i32::MIN
        ));
    }
    Ok(wide as i32)
}

/// Normalize an image reference. Empty or `null` clears the image.
///
/// Paths are stored relative to the media root, so absolute paths and `..`
/// segments are rejected.
pub fn normalize_image_path(value: Option<String>) -> Result<Option<String>, String> {
    let Some(raw) = value else {
        return Ok(None);
    };
    let path = raw.trim();
    if path.is_empty() {
        return Ok(None);
    }

    let len = path.chars().count();
    if len > IMAGE_PATH_MAX_LEN {
        return Err(format!(
            "Ensure this filename has at most {IMAGE_PATH_MAX_LEN} characters (it has {len})."
        ));
    }
    if path.starts_with('/') || path.split(['/', '\\']).any(|segment| segment == "..") {
        return Err("Image path must be relative to the media root.".to_string());
    }
    Ok(Some(path.to_string()))
}

/// Owner display name: first and last name joined by a space, trimmed.
pub fn owner_display_name(first_name: &str, last_name: &str) -> String {
    format!("{first_name} {last_name}").trim().to_string()
}
