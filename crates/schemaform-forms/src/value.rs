//! Field values
//!
//! Every value the engine stores is a [`FieldValue`]. The variants mirror the
//! field kinds: text, select and radio fields hold `Text`, number fields hold
//! `Number`, checkboxes hold `Bool` and repeaters hold `Items`. `Null` is an
//! explicitly cleared value.
//!
//! Values serialize untagged, so a persisted draft is ordinary JSON:
//!
//! ```
//! use schemaform_forms::value::{FieldValue, FormValues};
//!
//! let mut values = FormValues::new();
//! values.insert("name".to_string(), FieldValue::from("Ada"));
//! values.insert("age".to_string(), FieldValue::from(36));
//!
//! let json = serde_json::to_value(&values).unwrap();
//! assert_eq!(json["name"], "Ada");
//! assert_eq!(json["age"], 36.0);
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// One repeater entry: sub-field id to value.
pub type RepeaterItem = HashMap<String, FieldValue>;

/// The whole form: top-level field id to value.
pub type FormValues = HashMap<String, FieldValue>;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
	#[default]
	Null,
	Bool(bool),
	Number(f64),
	Text(String),
	Items(Vec<RepeaterItem>),
}

impl FieldValue {
	/// Whether a value counts as "not filled in" for required checks.
	///
	/// Only `Null` and the empty string are empty; whitespace, `false`, `0`
	/// and an empty repeater list are all considered filled.
	///
	/// # Examples
	///
	/// ```
	/// use schemaform_forms::value::FieldValue;
	///
	/// assert!(FieldValue::Null.is_empty());
	/// assert!(FieldValue::from("").is_empty());
	/// assert!(!FieldValue::from(" ").is_empty());
	/// assert!(!FieldValue::from(false).is_empty());
	/// ```
	pub fn is_empty(&self) -> bool {
		match self {
			FieldValue::Null => true,
			FieldValue::Text(text) => text.is_empty(),
			_ => false,
		}
	}

	/// Emptiness of a possibly absent value.
	pub fn is_missing(value: Option<&FieldValue>) -> bool {
		value.is_none_or(FieldValue::is_empty)
	}

	pub fn as_str(&self) -> Option<&str> {
		match self {
			FieldValue::Text(text) => Some(text),
			_ => None,
		}
	}

	pub fn as_f64(&self) -> Option<f64> {
		match self {
			FieldValue::Number(number) => Some(*number),
			_ => None,
		}
	}

	pub fn as_bool(&self) -> Option<bool> {
		match self {
			FieldValue::Bool(flag) => Some(*flag),
			_ => None,
		}
	}

	pub fn as_items(&self) -> Option<&[RepeaterItem]> {
		match self {
			FieldValue::Items(items) => Some(items),
			_ => None,
		}
	}

	pub fn as_items_mut(&mut self) -> Option<&mut Vec<RepeaterItem>> {
		match self {
			FieldValue::Items(items) => Some(items),
			_ => None,
		}
	}

	/// Short name of the variant, used in log output.
	pub fn kind(&self) -> &'static str {
		match self {
			FieldValue::Null => "null",
			FieldValue::Bool(_) => "bool",
			FieldValue::Number(_) => "number",
			FieldValue::Text(_) => "text",
			FieldValue::Items(_) => "items",
		}
	}
}

impl fmt::Display for FieldValue {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			FieldValue::Null => Ok(()),
			FieldValue::Bool(flag) => write!(f, "{}", flag),
			FieldValue::Number(number) => f.write_str(&format_number(*number)),
			FieldValue::Text(text) => f.write_str(text),
			FieldValue::Items(items) => write!(f, "[{} items]", items.len()),
		}
	}
}

impl From<&str> for FieldValue {
	fn from(value: &str) -> Self {
		FieldValue::Text(value.to_string())
	}
}

impl From<String> for FieldValue {
	fn from(value: String) -> Self {
		FieldValue::Text(value)
	}
}

impl From<bool> for FieldValue {
	fn from(value: bool) -> Self {
		FieldValue::Bool(value)
	}
}

impl From<f64> for FieldValue {
	fn from(value: f64) -> Self {
		FieldValue::Number(value)
	}
}

impl From<i64> for FieldValue {
	fn from(value: i64) -> Self {
		FieldValue::Number(value as f64)
	}
}

impl From<i32> for FieldValue {
	fn from(value: i32) -> Self {
		FieldValue::Number(f64::from(value))
	}
}

impl From<Vec<RepeaterItem>> for FieldValue {
	fn from(value: Vec<RepeaterItem>) -> Self {
		FieldValue::Items(value)
	}
}

/// Render a number the way users typed it: `100`, not `100.0`.
///
/// # Examples
///
/// ```
/// use schemaform_forms::value::format_number;
///
/// assert_eq!(format_number(100.0), "100");
/// assert_eq!(format_number(-3.0), "-3");
/// assert_eq!(format_number(2.5), "2.5");
/// ```
pub fn format_number(number: f64) -> String {
	if number.is_finite() && number.fract() == 0.0 && number.abs() < 1e15 {
		format!("{}", number as i64)
	} else {
		format!("{}", number)
	}
}
