//! Built-in validation rules
//!
//! A [`ValidationRules`] set is checked in a fixed order and stops at the
//! first failure:
//!
//! 1. text values: `min_length`, `max_length`, `pattern`
//! 2. number values: `min`, `max`
//! 3. the `custom` rule, for any value
//!
//! Values that are neither text nor numbers skip straight to `custom`.

use crate::callbacks::SyncValidatorFn;
use crate::value::{FieldValue, FormValues, format_number};
use regex::Regex;
use std::fmt;
use std::sync::Arc;

pub const REQUIRED_MESSAGE: &str = "This field is required";
pub const INVALID_FORMAT_MESSAGE: &str = "Invalid format";

#[derive(Clone, Default)]
pub struct ValidationRules {
	/// Minimum length in characters. Zero means unset.
	pub min_length: Option<usize>,
	/// Maximum length in characters. Zero means unset.
	pub max_length: Option<usize>,
	/// Pattern the text must contain a match for (unanchored).
	pub pattern: Option<Regex>,
	pub min: Option<f64>,
	pub max: Option<f64>,
	pub custom: Option<SyncValidatorFn>,
}

impl ValidationRules {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_min_length(mut self, min_length: usize) -> Self {
		self.min_length = Some(min_length);
		self
	}

	pub fn with_max_length(mut self, max_length: usize) -> Self {
		self.max_length = Some(max_length);
		self
	}

	pub fn with_pattern(mut self, pattern: Regex) -> Self {
		self.pattern = Some(pattern);
		self
	}

	pub fn with_min(mut self, min: f64) -> Self {
		self.min = Some(min);
		self
	}

	pub fn with_max(mut self, max: f64) -> Self {
		self.max = Some(max);
		self
	}

	/// Attach a custom rule, evaluated after the built-in checks.
	///
	/// # Examples
	///
	/// ```
	/// use schemaform_forms::rules::ValidationRules;
	/// use schemaform_forms::value::{FieldValue, FormValues};
	///
	/// let rules = ValidationRules::new().with_custom(|value, _| {
	///     (value.and_then(FieldValue::as_str) == Some("root"))
	///         .then(|| "Reserved name".to_string())
	/// });
	/// let root = FieldValue::from("root");
	/// assert_eq!(rules.check(Some(&root), &FormValues::new()), Some("Reserved name".to_string()));
	/// ```
	pub fn with_custom<F>(mut self, f: F) -> Self
	where
		F: Fn(Option<&FieldValue>, &FormValues) -> Option<String> + Send + Sync + 'static,
	{
		self.custom = Some(Arc::new(f));
		self
	}

	/// Check a value against the rule set, returning the first failure.
	///
	/// # Examples
	///
	/// ```
	/// use schemaform_forms::rules::ValidationRules;
	/// use schemaform_forms::value::{FieldValue, FormValues};
	///
	/// let rules = ValidationRules::new().with_min(1.0).with_max(100.0);
	/// let values = FormValues::new();
	///
	/// assert_eq!(rules.check(Some(&FieldValue::from(50)), &values), None);
	/// assert_eq!(
	///     rules.check(Some(&FieldValue::from(150)), &values),
	///     Some("Maximum value is 100".to_string())
	/// );
	/// ```
	pub fn check(&self, value: Option<&FieldValue>, all_values: &FormValues) -> Option<String> {
		let builtin = match value {
			Some(FieldValue::Text(text)) => self.check_text(text),
			Some(FieldValue::Number(number)) => self.check_number(*number),
			_ => None,
		};
		if builtin.is_some() {
			return builtin;
		}

		self.custom
			.as_ref()
			.and_then(|custom| custom(value, all_values))
	}

	fn check_text(&self, text: &str) -> Option<String> {
		// Unicode scalar values, not UTF-16 units: "😀" has length 1.
		let length = text.chars().count();

		if let Some(min_length) = self.min_length.filter(|n| *n > 0)
			&& length < min_length
		{
			return Some(format!("Minimum length is {}", min_length));
		}

		if let Some(max_length) = self.max_length.filter(|n| *n > 0)
			&& length > max_length
		{
			return Some(format!("Maximum length is {}", max_length));
		}

		if let Some(pattern) = &self.pattern
			&& !pattern.is_match(text)
		{
			return Some(INVALID_FORMAT_MESSAGE.to_string());
		}

		None
	}

	fn check_number(&self, number: f64) -> Option<String> {
		if let Some(min) = self.min
			&& number < min
		{
			return Some(format!("Minimum value is {}", format_number(min)));
		}

		if let Some(max) = self.max
			&& number > max
		{
			return Some(format!("Maximum value is {}", format_number(max)));
		}

		None
	}
}

impl fmt::Debug for ValidationRules {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("ValidationRules")
			.field("min_length", &self.min_length)
			.field("max_length", &self.max_length)
			.field("pattern", &self.pattern.as_ref().map(Regex::as_str))
			.field("min", &self.min)
			.field("max", &self.max)
			.field("custom", &self.custom.is_some())
			.finish()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	fn check(rules: &ValidationRules, value: impl Into<FieldValue>) -> Option<String> {
		rules.check(Some(&value.into()), &FormValues::new())
	}

	#[rstest]
	#[case("ab", Some("Minimum length is 3"))]
	#[case("abc", None)]
	#[case("abcdef", Some("Maximum length is 5"))]
	fn test_length_bounds(#[case] input: &str, #[case] expected: Option<&str>) {
		// Arrange
		let rules = ValidationRules::new().with_min_length(3).with_max_length(5);

		// Act
		let result = check(&rules, input);

		// Assert
		assert_eq!(result.as_deref(), expected);
	}

	#[rstest]
	fn test_length_counts_characters_not_bytes() {
		// Arrange
		let rules = ValidationRules::new().with_max_length(3);

		// Act & Assert
		assert_eq!(check(&rules, "日本語"), None);
		assert!(check(&rules, "日本語!").is_some());
	}

	#[rstest]
	fn test_astral_character_counts_once() {
		// Arrange
		let rules = ValidationRules::new().with_min_length(2).with_max_length(1);

		// Act
		let result = check(&rules, "😀");

		// Assert
		assert_eq!(result.as_deref(), Some("Minimum length is 2"));
		assert_eq!(check(&ValidationRules::new().with_max_length(1), "😀"), None);
	}

	#[rstest]
	fn test_zero_length_bounds_are_ignored() {
		// Arrange
		let rules = ValidationRules::new().with_min_length(0).with_max_length(0);

		// Act & Assert
		assert_eq!(check(&rules, "anything at all"), None);
	}

	#[rstest]
	fn test_pattern_is_unanchored() {
		// Arrange
		let rules = ValidationRules::new().with_pattern(Regex::new("[0-9]").unwrap());

		// Act & Assert
		assert_eq!(check(&rules, "abc1def"), None);
		assert_eq!(check(&rules, "abcdef").as_deref(), Some(INVALID_FORMAT_MESSAGE));
	}

	#[rstest]
	fn test_length_checked_before_pattern() {
		// Arrange
		let rules = ValidationRules::new()
			.with_min_length(4)
			.with_pattern(Regex::new("^[A-Z]+$").unwrap());

		// Act
		let result = check(&rules, "ab");

		// Assert
		assert_eq!(result.as_deref(), Some("Minimum length is 4"));
	}

	#[rstest]
	#[case(0, Some("Minimum value is 1"))]
	#[case(1, None)]
	#[case(100, None)]
	#[case(150, Some("Maximum value is 100"))]
	fn test_numeric_bounds(#[case] input: i32, #[case] expected: Option<&str>) {
		// Arrange
		let rules = ValidationRules::new().with_min(1.0).with_max(100.0);

		// Act & Assert
		assert_eq!(check(&rules, input).as_deref(), expected);
	}

	#[rstest]
	fn test_fractional_bound_in_message() {
		// Arrange
		let rules = ValidationRules::new().with_min(0.5);

		// Act & Assert
		assert_eq!(check(&rules, 0.25).as_deref(), Some("Minimum value is 0.5"));
	}

	#[rstest]
	fn test_type_specific_rules_skip_other_kinds() {
		// Arrange
		let rules = ValidationRules::new()
			.with_min_length(5)
			.with_min(10.0)
			.with_pattern(Regex::new("x").unwrap());

		// Act & Assert
		assert_eq!(check(&rules, true), None);
		assert_eq!(check(&rules, FieldValue::Items(vec![])), None);
		assert_eq!(rules.check(None, &FormValues::new()), None);
		// Text rules never apply to numbers and vice versa
		assert_eq!(check(&rules, 42), None);
	}

	#[rstest]
	fn test_custom_runs_after_builtin_and_only_if_they_pass() {
		// Arrange
		let rules = ValidationRules::new()
			.with_max(3.0)
			.with_custom(|_, _| Some("custom failure".to_string()));

		// Act & Assert
		assert_eq!(check(&rules, 5).as_deref(), Some("Maximum value is 3"));
		assert_eq!(check(&rules, 2).as_deref(), Some("custom failure"));
	}

	#[rstest]
	fn test_custom_sees_all_values() {
		// Arrange
		let rules = ValidationRules::new().with_custom(|value, values| {
			(value != values.get("password")).then(|| "Passwords do not match".to_string())
		});
		let mut values = FormValues::new();
		values.insert("password".to_string(), FieldValue::from("secret123"));

		// Act & Assert
		assert_eq!(rules.check(Some(&FieldValue::from("secret123")), &values), None);
		assert_eq!(
			rules
				.check(Some(&FieldValue::from("different")), &values)
				.as_deref(),
			Some("Passwords do not match")
		);
	}

	#[rstest]
	fn test_debug_hides_closure() {
		// Arrange
		let rules = ValidationRules::new().with_custom(|_, _| None);

		// Act
		let debug = format!("{:?}", rules);

		// Assert
		assert!(debug.contains("custom: true"));
	}
}
