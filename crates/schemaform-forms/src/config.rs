//! Engine configuration

use crate::callbacks::FailurePolicy;
use crate::error::{FormError, FormResult};
use crate::store::DEFAULT_DRAFT_KEY;
use serde::{Deserialize, Serialize};

/// What to do with a stored draft that cannot be decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DraftRecovery {
	/// Log the problem and start from an empty form.
	#[default]
	Discard,
	/// Refuse to start; construction returns the draft error.
	Fail,
}

/// Whether `validate_all` descends into repeater items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RepeaterValidation {
	/// Leave repeater contents unvalidated.
	Skip,
	/// Validate every item's sub-fields synchronously.
	#[default]
	Recursive,
}

/// Engine configuration
///
/// Every field has a default, so an empty JSON object is a valid config.
///
/// # Examples
///
/// ```
/// use schemaform_forms::config::{DraftRecovery, EngineConfig, RepeaterValidation};
/// use schemaform_forms::callbacks::FailurePolicy;
///
/// let config = EngineConfig::from_json(r#"{"failure_policy": "surface"}"#).unwrap();
/// assert_eq!(config.failure_policy, FailurePolicy::Surface);
/// assert_eq!(config.draft_key, "dynamic-form-draft");
/// assert_eq!(config.draft_recovery, DraftRecovery::Discard);
/// assert_eq!(config.repeater_validation, RepeaterValidation::Recursive);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
	/// Name the draft is stored under (used by keyed stores).
	pub draft_key: String,
	pub failure_policy: FailurePolicy,
	pub draft_recovery: DraftRecovery,
	pub repeater_validation: RepeaterValidation,
}

impl Default for EngineConfig {
	fn default() -> Self {
		Self {
			draft_key: DEFAULT_DRAFT_KEY.to_string(),
			failure_policy: FailurePolicy::default(),
			draft_recovery: DraftRecovery::default(),
			repeater_validation: RepeaterValidation::default(),
		}
	}
}

impl EngineConfig {
	pub fn from_json(json: &str) -> FormResult<Self> {
		serde_json::from_str(json).map_err(FormError::Config)
	}

	pub fn with_draft_key(mut self, key: impl Into<String>) -> Self {
		self.draft_key = key.into();
		self
	}

	pub fn with_failure_policy(mut self, policy: FailurePolicy) -> Self {
		self.failure_policy = policy;
		self
	}

	pub fn with_draft_recovery(mut self, recovery: DraftRecovery) -> Self {
		self.draft_recovery = recovery;
		self
	}

	pub fn with_repeater_validation(mut self, mode: RepeaterValidation) -> Self {
		self.repeater_validation = mode;
		self
	}
}
