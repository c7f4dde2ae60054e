//! Select and radio options

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectOption {
	pub label: String,
	pub value: String,
}

impl SelectOption {
	/// # Examples
	///
	/// ```
	/// use schemaform_forms::options::SelectOption;
	///
	/// let option = SelectOption::new("India", "india");
	/// assert_eq!(option.label, "India");
	/// assert_eq!(option.value, "india");
	/// ```
	pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
		Self {
			label: label.into(),
			value: value.into(),
		}
	}
}

/// Load state of a select field backed by an options loader.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum OptionsState {
	/// No load has been started.
	#[default]
	Idle,
	Loading,
	Loaded(Vec<SelectOption>),
	/// The loader failed and the failure policy asked to keep it visible.
	Failed(String),
}

impl OptionsState {
	pub fn is_loading(&self) -> bool {
		matches!(self, OptionsState::Loading)
	}

	/// Options to show; empty unless loaded.
	pub fn options(&self) -> &[SelectOption] {
		match self {
			OptionsState::Loaded(options) => options,
			_ => &[],
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	#[case(OptionsState::Idle, false, 0)]
	#[case(OptionsState::Loading, true, 0)]
	#[case(OptionsState::Loaded(vec![SelectOption::new("USA", "usa")]), false, 1)]
	#[case(OptionsState::Failed("offline".to_string()), false, 0)]
	fn test_options_state(
		#[case] state: OptionsState,
		#[case] loading: bool,
		#[case] count: usize,
	) {
		// Act & Assert
		assert_eq!(state.is_loading(), loading);
		assert_eq!(state.options().len(), count);
	}

	#[rstest]
	fn test_select_option_deserialize() {
		// Act
		let option: SelectOption =
			serde_json::from_str(r#"{"label": "Female", "value": "female"}"#).unwrap();

		// Assert
		assert_eq!(option, SelectOption::new("Female", "female"));
	}
}
