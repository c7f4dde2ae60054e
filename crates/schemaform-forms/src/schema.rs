//! Field schema
//!
//! A [`FormSchema`] is an ordered list of [`FieldSchema`] descriptors. It is
//! immutable once handed to a [`FormEngine`](crate::engine::FormEngine);
//! behaviour that cannot be expressed as data (closures, async validators,
//! option loaders) is attached either through the field builders or through
//! the `attach_*` methods before the engine is created.
//!
//! ```
//! use schemaform_forms::schema::{Condition, FieldSchema, FormSchema};
//! use schemaform_forms::options::SelectOption;
//!
//! let schema = FormSchema::new(vec![
//!     FieldSchema::text("name").with_label("Full Name").required(),
//!     FieldSchema::radio("gender", vec![
//!         SelectOption::new("Male", "male"),
//!         SelectOption::new("Female", "female"),
//!     ]),
//!     FieldSchema::text("beard").visible_if(Condition::new("gender", "male")),
//! ])
//! .unwrap();
//!
//! assert_eq!(schema.len(), 3);
//! ```

use crate::callbacks::{AsyncValidator, OptionsLoader, SyncValidatorFn};
use crate::error::SchemaError;
use crate::options::SelectOption;
use crate::rules::ValidationRules;
use crate::value::{FieldValue, FormValues};
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

/// Section name for fields that do not declare one.
pub const DEFAULT_SECTION: &str = "General";

/// Show a field only while another field holds exactly `equals`.
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
	pub field_id: String,
	pub equals: FieldValue,
}

impl Condition {
	pub fn new(field_id: impl Into<String>, equals: impl Into<FieldValue>) -> Self {
		Self {
			field_id: field_id.into(),
			equals: equals.into(),
		}
	}

	/// Strict equality against the current value; an absent value never matches.
	///
	/// # Examples
	///
	/// ```
	/// use schemaform_forms::schema::Condition;
	/// use schemaform_forms::value::{FieldValue, FormValues};
	///
	/// let condition = Condition::new("gender", "male");
	/// let mut values = FormValues::new();
	/// assert!(!condition.is_met(&values));
	///
	/// values.insert("gender".to_string(), FieldValue::from("Male"));
	/// assert!(!condition.is_met(&values));
	///
	/// values.insert("gender".to_string(), FieldValue::from("male"));
	/// assert!(condition.is_met(&values));
	/// ```
	pub fn is_met(&self, values: &FormValues) -> bool {
		values.get(&self.field_id) == Some(&self.equals)
	}
}

#[derive(Clone)]
pub enum FieldKind {
	Text,
	Number,
	Checkbox,
	Select {
		/// Static options. When present the loader is never used.
		options: Option<Vec<SelectOption>>,
		loader: Option<Arc<dyn OptionsLoader>>,
	},
	Radio {
		options: Vec<SelectOption>,
	},
	Repeater {
		fields: Vec<FieldSchema>,
	},
}

impl FieldKind {
	pub fn name(&self) -> &'static str {
		match self {
			FieldKind::Text => "text",
			FieldKind::Number => "number",
			FieldKind::Checkbox => "checkbox",
			FieldKind::Select { .. } => "select",
			FieldKind::Radio { .. } => "radio",
			FieldKind::Repeater { .. } => "repeater",
		}
	}
}

impl fmt::Debug for FieldKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			FieldKind::Select { options, loader } => f
				.debug_struct("Select")
				.field("options", options)
				.field("loader", &loader.is_some())
				.finish(),
			FieldKind::Radio { options } => {
				f.debug_struct("Radio").field("options", options).finish()
			}
			FieldKind::Repeater { fields } => {
				f.debug_struct("Repeater").field("fields", fields).finish()
			}
			other => f.write_str(other.name()),
		}
	}
}

/// A single field descriptor.
#[derive(Clone)]
pub struct FieldSchema {
	pub id: String,
	pub label: String,
	pub kind: FieldKind,
	pub description: Option<String>,
	pub placeholder: Option<String>,
	pub section: Option<String>,
	pub required: bool,
	pub visible_if: Option<Condition>,
	pub validation: Option<ValidationRules>,
	/// Field-level sync validator, run after `validation`.
	pub validate: Option<SyncValidatorFn>,
	/// Run only once every synchronous check has passed.
	pub async_validate: Option<Arc<dyn AsyncValidator>>,
}

impl FieldSchema {
	/// Create a field of the given kind; the label defaults to the id.
	pub fn new(id: impl Into<String>, kind: FieldKind) -> Self {
		let id = id.into();
		Self {
			label: id.clone(),
			id,
			kind,
			description: None,
			placeholder: None,
			section: None,
			required: false,
			visible_if: None,
			validation: None,
			validate: None,
			async_validate: None,
		}
	}

	pub fn text(id: impl Into<String>) -> Self {
		Self::new(id, FieldKind::Text)
	}

	pub fn number(id: impl Into<String>) -> Self {
		Self::new(id, FieldKind::Number)
	}

	pub fn checkbox(id: impl Into<String>) -> Self {
		Self::new(id, FieldKind::Checkbox)
	}

	/// Select field with static options.
	pub fn select(id: impl Into<String>, options: Vec<SelectOption>) -> Self {
		Self::new(
			id,
			FieldKind::Select {
				options: Some(options),
				loader: None,
			},
		)
	}

	/// Select field whose options come from an [`OptionsLoader`].
	pub fn select_loaded(id: impl Into<String>, loader: Arc<dyn OptionsLoader>) -> Self {
		Self::new(
			id,
			FieldKind::Select {
				options: None,
				loader: Some(loader),
			},
		)
	}

	pub fn radio(id: impl Into<String>, options: Vec<SelectOption>) -> Self {
		Self::new(id, FieldKind::Radio { options })
	}

	pub fn repeater(id: impl Into<String>, fields: Vec<FieldSchema>) -> Self {
		Self::new(id, FieldKind::Repeater { fields })
	}

	pub fn required(mut self) -> Self {
		self.required = true;
		self
	}

	pub fn with_label(mut self, label: impl Into<String>) -> Self {
		self.label = label.into();
		self
	}

	pub fn with_description(mut self, description: impl Into<String>) -> Self {
		self.description = Some(description.into());
		self
	}

	pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
		self.placeholder = Some(placeholder.into());
		self
	}

	pub fn in_section(mut self, section: impl Into<String>) -> Self {
		self.section = Some(section.into());
		self
	}

	pub fn visible_if(mut self, condition: Condition) -> Self {
		self.visible_if = Some(condition);
		self
	}

	pub fn with_validation(mut self, rules: ValidationRules) -> Self {
		self.validation = Some(rules);
		self
	}

	/// Set the field-level synchronous validator.
	///
	/// # Examples
	///
	/// ```
	/// use schemaform_forms::schema::FieldSchema;
	/// use schemaform_forms::value::FieldValue;
	///
	/// let field = FieldSchema::text("email").with_validator(|value, _| {
	///     let text = value.and_then(FieldValue::as_str).unwrap_or_default();
	///     (!text.contains('@')).then(|| "Enter a valid email address".to_string())
	/// });
	/// assert!(field.validate.is_some());
	/// ```
	pub fn with_validator<F>(mut self, f: F) -> Self
	where
		F: Fn(Option<&FieldValue>, &FormValues) -> Option<String> + Send + Sync + 'static,
	{
		self.validate = Some(Arc::new(f));
		self
	}

	pub fn with_async_validator(mut self, validator: Arc<dyn AsyncValidator>) -> Self {
		self.async_validate = Some(validator);
		self
	}

	pub fn is_repeater(&self) -> bool {
		matches!(self.kind, FieldKind::Repeater { .. })
	}

	/// Sub-fields of a repeater; empty for every other kind.
	pub fn sub_fields(&self) -> &[FieldSchema] {
		match &self.kind {
			FieldKind::Repeater { fields } => fields,
			_ => &[],
		}
	}

	pub fn section_name(&self) -> &str {
		self.section.as_deref().unwrap_or(DEFAULT_SECTION)
	}

	/// Static options for select and radio fields.
	pub fn static_options(&self) -> Option<&[SelectOption]> {
		match &self.kind {
			FieldKind::Select {
				options: Some(options),
				..
			} => Some(options),
			FieldKind::Radio { options } => Some(options),
			_ => None,
		}
	}

	/// Loader to run for this field, if it is a select without static options.
	pub fn pending_loader(&self) -> Option<&Arc<dyn OptionsLoader>> {
		match &self.kind {
			FieldKind::Select {
				options: None,
				loader: Some(loader),
			} => Some(loader),
			_ => None,
		}
	}
}

impl fmt::Debug for FieldSchema {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("FieldSchema")
			.field("id", &self.id)
			.field("label", &self.label)
			.field("kind", &self.kind)
			.field("section", &self.section)
			.field("required", &self.required)
			.field("visible_if", &self.visible_if)
			.field("validation", &self.validation)
			.field("validate", &self.validate.is_some())
			.field("async_validate", &self.async_validate.is_some())
			.finish()
	}
}

/// Ordered, validated collection of top-level fields.
#[derive(Debug, Clone)]
pub struct FormSchema {
	fields: Vec<FieldSchema>,
}

impl FormSchema {
	/// Build a schema, rejecting id collisions.
	///
	/// Ids must be unique among siblings and must not repeat the id of an
	/// enclosing repeater.
	///
	/// # Examples
	///
	/// ```
	/// use schemaform_forms::schema::{FieldSchema, FormSchema};
	///
	/// let result = FormSchema::new(vec![
	///     FieldSchema::text("name"),
	///     FieldSchema::number("name"),
	/// ]);
	/// assert!(result.is_err());
	/// ```
	pub fn new(fields: Vec<FieldSchema>) -> Result<Self, SchemaError> {
		check_scope(&fields, &[])?;
		Ok(Self { fields })
	}

	pub fn fields(&self) -> &[FieldSchema] {
		&self.fields
	}

	pub fn len(&self) -> usize {
		self.fields.len()
	}

	pub fn is_empty(&self) -> bool {
		self.fields.is_empty()
	}

	/// Look up a top-level field by id.
	pub fn get(&self, id: &str) -> Option<&FieldSchema> {
		self.fields.iter().find(|f| f.id == id)
	}

	fn get_mut(&mut self, id: &str) -> Result<&mut FieldSchema, SchemaError> {
		self.fields
			.iter_mut()
			.find(|f| f.id == id)
			.ok_or_else(|| SchemaError::UnknownField(id.to_string()))
	}

	/// Group fields by section, sections in order of first appearance.
	///
	/// # Examples
	///
	/// ```
	/// use schemaform_forms::schema::{FieldSchema, FormSchema};
	///
	/// let schema = FormSchema::new(vec![
	///     FieldSchema::text("name").in_section("Personal Information"),
	///     FieldSchema::checkbox("subscribe").in_section("Preferences"),
	///     FieldSchema::number("age").in_section("Personal Information"),
	///     FieldSchema::text("notes"),
	/// ])
	/// .unwrap();
	///
	/// let sections = schema.sections();
	/// assert_eq!(sections.len(), 3);
	/// assert_eq!(sections[0].0, "Personal Information");
	/// assert_eq!(sections[0].1.len(), 2);
	/// assert_eq!(sections[2].0, "General");
	/// ```
	pub fn sections(&self) -> Vec<(&str, Vec<&FieldSchema>)> {
		let mut sections: Vec<(&str, Vec<&FieldSchema>)> = Vec::new();
		for field in &self.fields {
			let name = field.section_name();
			match sections.iter_mut().find(|(section, _)| *section == name) {
				Some((_, fields)) => fields.push(field),
				None => sections.push((name, vec![field])),
			}
		}
		sections
	}

	/// Attach a field-level synchronous validator to a top-level field.
	pub fn attach_validator<F>(&mut self, id: &str, f: F) -> Result<(), SchemaError>
	where
		F: Fn(Option<&FieldValue>, &FormValues) -> Option<String> + Send + Sync + 'static,
	{
		self.get_mut(id)?.validate = Some(Arc::new(f));
		Ok(())
	}

	pub fn attach_async_validator(
		&mut self,
		id: &str,
		validator: Arc<dyn AsyncValidator>,
	) -> Result<(), SchemaError> {
		self.get_mut(id)?.async_validate = Some(validator);
		Ok(())
	}

	/// Attach an options loader to a top-level select field.
	pub fn attach_options_loader(
		&mut self,
		id: &str,
		options_loader: Arc<dyn OptionsLoader>,
	) -> Result<(), SchemaError> {
		match &mut self.get_mut(id)?.kind {
			FieldKind::Select { loader, .. } => {
				*loader = Some(options_loader);
				Ok(())
			}
			_ => Err(SchemaError::NotASelect(id.to_string())),
		}
	}
}

fn check_scope(fields: &[FieldSchema], ancestors: &[&str]) -> Result<(), SchemaError> {
	let mut seen = HashSet::new();
	for field in fields {
		if !seen.insert(field.id.as_str()) || ancestors.contains(&field.id.as_str()) {
			return Err(SchemaError::DuplicateField(field.id.clone()));
		}
		if let FieldKind::Repeater { fields: children } = &field.kind {
			let mut scope = ancestors.to_vec();
			scope.push(&field.id);
			check_scope(children, &scope)?;
		}
	}
	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::callbacks::{async_validator_fn, options_loader_fn};
	use crate::error::BoxError;
	use rstest::rstest;

	fn skills() -> FieldSchema {
		FieldSchema::repeater(
			"skills",
			vec![
				FieldSchema::text("skillName").with_label("Skill Name"),
				FieldSchema::number("experience").with_label("Years of Experience"),
			],
		)
	}

	#[rstest]
	fn test_builder_defaults() {
		// Act
		let field = FieldSchema::text("name");

		// Assert
		assert_eq!(field.label, "name");
		assert!(!field.required);
		assert!(field.visible_if.is_none());
		assert_eq!(field.section_name(), DEFAULT_SECTION);
		assert_eq!(field.kind.name(), "text");
	}

	#[rstest]
	fn test_duplicate_top_level_id_rejected() {
		// Act
		let result = FormSchema::new(vec![FieldSchema::text("a"), FieldSchema::checkbox("a")]);

		// Assert
		assert!(matches!(result, Err(SchemaError::DuplicateField(id)) if id == "a"));
	}

	#[rstest]
	fn test_sub_field_may_reuse_unrelated_top_level_id() {
		// Arrange
		let fields = vec![FieldSchema::text("skillName"), skills()];

		// Act & Assert
		assert!(FormSchema::new(fields).is_ok());
	}

	#[rstest]
	fn test_sub_field_may_not_shadow_ancestor() {
		// Arrange
		let fields = vec![FieldSchema::repeater(
			"skills",
			vec![FieldSchema::text("skills")],
		)];

		// Act
		let result = FormSchema::new(fields);

		// Assert
		assert!(matches!(result, Err(SchemaError::DuplicateField(_))));
	}

	#[rstest]
	fn test_duplicate_sibling_sub_fields_rejected() {
		// Arrange
		let fields = vec![FieldSchema::repeater(
			"skills",
			vec![FieldSchema::text("x"), FieldSchema::number("x")],
		)];

		// Act & Assert
		assert!(FormSchema::new(fields).is_err());
	}

	#[rstest]
	fn test_repeater_without_sub_fields_accepted() {
		// Act
		let schema = FormSchema::new(vec![FieldSchema::repeater("skills", vec![])]).unwrap();

		// Assert
		let skills = schema.get("skills").unwrap();
		assert!(skills.is_repeater());
		assert!(skills.sub_fields().is_empty());
	}

	#[rstest]
	fn test_static_options_take_precedence_over_loader() {
		// Arrange
		let loader = options_loader_fn(|| async { Ok::<_, BoxError>(vec![]) });
		let mut field = FieldSchema::select("country", vec![SelectOption::new("USA", "usa")]);
		if let FieldKind::Select { loader: slot, .. } = &mut field.kind {
			*slot = Some(loader.clone());
		}

		// Act & Assert
		assert!(field.pending_loader().is_none());
		assert_eq!(field.static_options().map(<[_]>::len), Some(1));
		assert!(FieldSchema::select_loaded("city", loader).pending_loader().is_some());
	}

	#[rstest]
	fn test_attach_behaviour() {
		// Arrange
		let mut schema = FormSchema::new(vec![
			FieldSchema::text("username"),
			FieldSchema::select("country", vec![]),
			FieldSchema::number("age"),
		])
		.unwrap();

		// Act
		schema.attach_validator("age", |_, _| None).unwrap();
		schema
			.attach_async_validator("username", async_validator_fn(|_, _| async { Ok::<_, BoxError>(None) }))
			.unwrap();
		schema
			.attach_options_loader("country", options_loader_fn(|| async { Ok::<_, BoxError>(vec![]) }))
			.unwrap();

		// Assert
		assert!(schema.get("age").unwrap().validate.is_some());
		assert!(schema.get("username").unwrap().async_validate.is_some());
		assert!(matches!(
			schema.attach_options_loader("age", options_loader_fn(|| async { Ok::<_, BoxError>(vec![]) })),
			Err(SchemaError::NotASelect(_))
		));
		assert!(matches!(
			schema.attach_validator("missing", |_, _| None),
			Err(SchemaError::UnknownField(_))
		));
	}

	#[rstest]
	fn test_sub_fields() {
		// Arrange
		let field = skills();

		// Act & Assert
		assert!(field.is_repeater());
		assert_eq!(field.sub_fields().len(), 2);
		assert!(FieldSchema::text("x").sub_fields().is_empty());
	}
}
