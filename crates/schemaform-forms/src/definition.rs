//! Declarative schema input
//!
//! The serializable half of a schema: everything except closures, async
//! validators and option loaders. A definition is a JSON array of fields
//! using the same keys as the form builder it was designed for
//! (`visibleIf`, `minLength`, `type`, ...):
//!
//! ```
//! use schemaform_forms::schema::FormSchema;
//!
//! let schema = FormSchema::from_json(r#"[
//!     {"id": "name", "type": "text", "label": "Full Name", "required": true},
//!     {"id": "age", "type": "number", "validation": {"min": 1, "max": 100}},
//!     {"id": "skills", "type": "repeater", "fields": [
//!         {"id": "skillName", "type": "text"}
//!     ]}
//! ]"#).unwrap();
//!
//! assert_eq!(schema.len(), 3);
//! assert!(schema.get("name").unwrap().required);
//! ```

use crate::error::SchemaError;
use crate::options::SelectOption;
use crate::rules::ValidationRules;
use crate::schema::{Condition, FieldKind, FieldSchema, FormSchema};
use crate::value::FieldValue;
use regex::Regex;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FormDefinition {
	pub fields: Vec<FieldDefinition>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDefinition {
	pub id: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub label: Option<String>,
	#[serde(flatten)]
	pub kind: KindDefinition,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub description: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub placeholder: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub section: Option<String>,
	#[serde(default)]
	pub required: bool,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub visible_if: Option<ConditionDefinition>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub validation: Option<RulesDefinition>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum KindDefinition {
	Text,
	Number,
	Checkbox,
	Select {
		#[serde(default, skip_serializing_if = "Option::is_none")]
		options: Option<Vec<SelectOption>>,
	},
	Radio {
		options: Vec<SelectOption>,
	},
	Repeater {
		fields: Vec<FieldDefinition>,
	},
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConditionDefinition {
	pub field_id: String,
	pub equals: FieldValue,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RulesDefinition {
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub min_length: Option<usize>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub max_length: Option<usize>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub pattern: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub min: Option<f64>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub max: Option<f64>,
}

impl RulesDefinition {
	fn compile(self, field: &str) -> Result<ValidationRules, SchemaError> {
		let pattern = self
			.pattern
			.map(|source| Regex::new(&source))
			.transpose()
			.map_err(|source| SchemaError::InvalidPattern {
				field: field.to_string(),
				source,
			})?;

		Ok(ValidationRules {
			min_length: self.min_length,
			max_length: self.max_length,
			pattern,
			min: self.min,
			max: self.max,
			custom: None,
		})
	}
}

impl TryFrom<FieldDefinition> for FieldSchema {
	type Error = SchemaError;

	fn try_from(definition: FieldDefinition) -> Result<Self, Self::Error> {
		let kind = match definition.kind {
			KindDefinition::Text => FieldKind::Text,
			KindDefinition::Number => FieldKind::Number,
			KindDefinition::Checkbox => FieldKind::Checkbox,
			KindDefinition::Select { options } => FieldKind::Select {
				options,
				loader: None,
			},
			KindDefinition::Radio { options } => FieldKind::Radio { options },
			KindDefinition::Repeater { fields } => FieldKind::Repeater {
				fields: fields
					.into_iter()
					.map(FieldSchema::try_from)
					.collect::<Result<_, _>>()?,
			},
		};

		let validation = definition
			.validation
			.map(|rules| rules.compile(&definition.id))
			.transpose()?;

		let mut field = FieldSchema::new(definition.id, kind);
		if let Some(label) = definition.label {
			field.label = label;
		}
		field.description = definition.description;
		field.placeholder = definition.placeholder;
		field.section = definition.section;
		field.required = definition.required;
		field.visible_if = definition
			.visible_if
			.map(|c| Condition::new(c.field_id, c.equals));
		field.validation = validation;
		Ok(field)
	}
}

impl TryFrom<FormDefinition> for FormSchema {
	type Error = SchemaError;

	fn try_from(definition: FormDefinition) -> Result<Self, Self::Error> {
		let fields = definition
			.fields
			.into_iter()
			.map(FieldSchema::try_from)
			.collect::<Result<Vec<_>, _>>()?;
		FormSchema::new(fields)
	}
}

impl FormSchema {
	/// Parse a JSON field array into a schema.
	pub fn from_json(json: &str) -> Result<Self, SchemaError> {
		let definition: FormDefinition = serde_json::from_str(json)?;
		Self::try_from(definition)
	}
}
