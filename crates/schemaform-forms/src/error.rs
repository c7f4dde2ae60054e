//! Error types for schema construction, draft persistence and engine setup.
//!
//! Field validation failures are not errors in this sense: they are plain
//! messages recorded in the engine's error map.

/// Boxed error returned by async collaborators (validators, option loaders).
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Problems found while building a [`FormSchema`](crate::schema::FormSchema).
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
	#[error("Duplicate field id '{0}'")]
	DuplicateField(String),
	#[error("Unknown field '{0}'")]
	UnknownField(String),
	#[error("Field '{0}' is not a select field")]
	NotASelect(String),
	#[error("Invalid pattern for field '{field}': {source}")]
	InvalidPattern {
		field: String,
		#[source]
		source: regex::Error,
	},
	#[error("Invalid form definition: {0}")]
	Parse(#[from] serde_json::Error),
}

/// Failures of a [`DraftStore`](crate::store::DraftStore).
#[derive(Debug, thiserror::Error)]
pub enum DraftError {
	#[error("Draft storage I/O error: {0}")]
	Io(#[from] std::io::Error),
	#[error("Stored draft is corrupt: {0}")]
	Corrupt(#[source] serde_json::Error),
	#[error("Failed to encode draft: {0}")]
	Encode(#[source] serde_json::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum FormError {
	#[error(transparent)]
	Schema(#[from] SchemaError),
	#[error(transparent)]
	Draft(#[from] DraftError),
	#[error("Invalid engine configuration: {0}")]
	Config(#[source] serde_json::Error),
}

pub type FormResult<T> = Result<T, FormError>;

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	fn test_schema_error_messages() {
		// Arrange
		let duplicate = SchemaError::DuplicateField("name".to_string());
		let not_select = SchemaError::NotASelect("age".to_string());

		// Act & Assert
		assert_eq!(duplicate.to_string(), "Duplicate field id 'name'");
		assert_eq!(not_select.to_string(), "Field 'age' is not a select field");
	}

	#[rstest]
	fn test_form_error_is_transparent_over_schema_error() {
		// Arrange
		let error: FormError = SchemaError::UnknownField("email".to_string()).into();

		// Act
		let message = error.to_string();

		// Assert
		assert_eq!(message, "Unknown field 'email'");
	}

	#[rstest]
	fn test_invalid_pattern_keeps_regex_source() {
		// Arrange
		let source = regex::Regex::new("(").unwrap_err();

		// Act
		let error = SchemaError::InvalidPattern {
			field: "code".to_string(),
			source,
		};

		// Assert
		assert!(std::error::Error::source(&error).is_some());
		assert!(error.to_string().starts_with("Invalid pattern for field 'code'"));
	}
}
