//! Form engine
//!
//! [`FormEngine`] owns the mutable state of one form session (values, errors,
//! touched fields, select option loads) for an immutable [`FormSchema`].
//! Renderers read [`FieldView`]s and call the mutators in response to user
//! input; every value mutation is written through to the [`DraftStore`].
//!
//! Validation is explicit: nothing is validated as a side effect of
//! [`set_value`](FormEngine::set_value). A full pass runs through
//! [`validate_all`](FormEngine::validate_all), which replaces the whole error
//! map.
//!
//! ```
//! use schemaform_forms::engine::FormEngine;
//! use schemaform_forms::rules::ValidationRules;
//! use schemaform_forms::schema::{FieldSchema, FormSchema};
//! use schemaform_forms::store::MemoryDraftStore;
//!
//! # futures::executor::block_on(async {
//! let schema = FormSchema::new(vec![
//!     FieldSchema::text("name").required(),
//!     FieldSchema::number("age")
//!         .required()
//!         .with_validation(ValidationRules::new().with_min(1.0).with_max(100.0)),
//! ])
//! .unwrap();
//!
//! let mut engine = FormEngine::new(schema, MemoryDraftStore::new()).unwrap();
//! engine.set_value("name", "");
//! engine.set_value("age", 150);
//!
//! assert!(!engine.validate_all().await);
//! assert_eq!(engine.error("name"), Some("This field is required"));
//! assert_eq!(engine.error("age"), Some("Maximum value is 100"));
//! # });
//! ```

use crate::callbacks::{FailurePolicy, OptionsLoader, Resolution, resolve_options, resolve_validator};
use crate::config::{DraftRecovery, EngineConfig, RepeaterValidation};
use crate::error::FormResult;
use crate::options::{OptionsState, SelectOption};
use crate::rules::REQUIRED_MESSAGE;
use crate::schema::{FieldSchema, FormSchema};
use crate::store::DraftStore;
use crate::value::{FieldValue, FormValues, RepeaterItem};
use futures::future::join_all;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Field id (or repeater item path) to error message.
pub type FieldErrors = HashMap<String, String>;

static IDLE: OptionsState = OptionsState::Idle;

/// Everything a renderer needs to draw one field.
#[derive(Debug, Clone)]
pub struct FieldView<'a> {
	pub field: &'a FieldSchema,
	pub value: Option<&'a FieldValue>,
	/// Current error, present only once the field has been touched.
	pub error: Option<&'a str>,
	pub touched: bool,
	pub visible: bool,
	/// A select option load is in flight.
	pub loading: bool,
	pub options: &'a [SelectOption],
}

/// An options load handed out by [`FormEngine::begin_options_load`].
pub struct PendingLoad {
	pub field_id: String,
	loader: Arc<dyn OptionsLoader>,
}

impl PendingLoad {
	/// Await the loader. Feed the result to [`FormEngine::finish_options_load`].
	pub async fn run(self) -> (String, Resolution<Vec<SelectOption>>) {
		let resolution = resolve_options(&self.field_id, self.loader.as_ref()).await;
		(self.field_id, resolution)
	}
}

/// Path under which a repeater sub-field error is recorded.
///
/// # Examples
///
/// ```
/// use schemaform_forms::engine::item_error_key;
///
/// assert_eq!(item_error_key("skills", 0, "skillName"), "skills[0].skillName");
/// ```
pub fn item_error_key(repeater: &str, index: usize, sub_id: &str) -> String {
	format!("{}[{}].{}", repeater, index, sub_id)
}

pub struct FormEngine {
	schema: FormSchema,
	store: Arc<dyn DraftStore>,
	config: EngineConfig,
	values: FormValues,
	errors: FieldErrors,
	touched: HashSet<String>,
	options: HashMap<String, OptionsState>,
	submitted: bool,
}

impl FormEngine {
	/// Create an engine with the default configuration and hydrate it from `store`.
	pub fn new<S>(schema: FormSchema, store: S) -> FormResult<Self>
	where
		S: DraftStore + 'static,
	{
		Self::with_config(schema, store, EngineConfig::default())
	}

	/// Create an engine and hydrate it from `store`.
	///
	/// A corrupt draft is discarded or reported depending on
	/// [`EngineConfig::draft_recovery`]. Draft entries whose key is not a
	/// top-level field id are dropped.
	pub fn with_config<S>(schema: FormSchema, store: S, config: EngineConfig) -> FormResult<Self>
	where
		S: DraftStore + 'static,
	{
		Self::open(schema, Arc::new(store), config)
	}

	fn open(schema: FormSchema, store: Arc<dyn DraftStore>, config: EngineConfig) -> FormResult<Self> {
		let mut engine = Self {
			schema,
			store,
			config,
			values: FormValues::new(),
			errors: FieldErrors::new(),
			touched: HashSet::new(),
			options: HashMap::new(),
			submitted: false,
		};
		engine.hydrate()?;
		Ok(engine)
	}

	fn hydrate(&mut self) -> FormResult<()> {
		match self.store.load() {
			Ok(Some(mut draft)) => {
				draft.retain(|id, _| self.schema.get(id).is_some());
				tracing::debug!(
					draft_key = %self.config.draft_key,
					fields = draft.len(),
					"Restored form draft"
				);
				self.values = draft;
			}
			Ok(None) => {}
			Err(error) => match self.config.draft_recovery {
				DraftRecovery::Discard => {
					tracing::warn!(
						draft_key = %self.config.draft_key,
						%error,
						"Discarding unreadable form draft"
					);
				}
				DraftRecovery::Fail => return Err(error.into()),
			},
		}
		Ok(())
	}

	fn persist(&self) {
		if let Err(error) = self.store.save(&self.values) {
			tracing::warn!(draft_key = %self.config.draft_key, %error, "Failed to save form draft");
		}
	}

	pub fn schema(&self) -> &FormSchema {
		&self.schema
	}

	pub fn config(&self) -> &EngineConfig {
		&self.config
	}

	pub fn values(&self) -> &FormValues {
		&self.values
	}

	pub fn errors(&self) -> &FieldErrors {
		&self.errors
	}

	pub fn touched(&self) -> &HashSet<String> {
		&self.touched
	}

	pub fn value(&self, field_id: &str) -> Option<&FieldValue> {
		self.values.get(field_id)
	}

	pub fn error(&self, field_id: &str) -> Option<&str> {
		self.errors.get(field_id).map(String::as_str)
	}

	pub fn is_touched(&self, field_id: &str) -> bool {
		self.touched.contains(field_id)
	}

	pub fn is_submitted(&self) -> bool {
		self.submitted
	}

	// ------------------------------------------------------------------
	// State mutation
	// ------------------------------------------------------------------

	/// Overwrite one field's value and persist. Does not validate.
	///
	/// Ids that are not top-level fields are ignored.
	pub fn set_value(&mut self, field_id: &str, value: impl Into<FieldValue>) {
		if self.schema.get(field_id).is_none() {
			tracing::warn!(field = field_id, "Ignoring value for unknown field");
			return;
		}
		let value = value.into();
		tracing::debug!(field = field_id, kind = value.kind(), "Set field value");
		self.values.insert(field_id.to_string(), value);
		self.persist();
	}

	/// Record that the user interacted with a field. Never undone.
	///
	/// Ids that are not top-level fields are ignored.
	pub fn mark_touched(&mut self, field_id: &str) {
		if self.schema.get(field_id).is_none() {
			tracing::warn!(field = field_id, "Ignoring touch for unknown field");
			return;
		}
		if self.touched.insert(field_id.to_string()) {
			tracing::trace!(field = field_id, "Field touched");
		}
	}

	/// End this session and open a new one on the same schema, store and config.
	///
	/// The new session re-hydrates from the store, so the last saved draft
	/// comes back while errors, touched fields, option loads and the
	/// submitted flag start over. The draft itself is left as it is.
	pub fn restart(self) -> FormResult<Self> {
		tracing::debug!(draft_key = %self.config.draft_key, "Restarting form session");
		Self::open(self.schema, self.store, self.config)
	}

	// ------------------------------------------------------------------
	// Visibility
	// ------------------------------------------------------------------

	/// Whether `field` is shown for the given values.
	///
	/// Always pass the current values: visibility can change with every edit.
	pub fn is_field_visible(field: &FieldSchema, values: &FormValues) -> bool {
		field
			.visible_if
			.as_ref()
			.is_none_or(|condition| condition.is_met(values))
	}

	// ------------------------------------------------------------------
	// Validation
	// ------------------------------------------------------------------

	/// Synchronous validation of one value; the first failing check wins.
	///
	/// Order: required, then the field's rule set (see
	/// [`ValidationRules::check`](crate::rules::ValidationRules::check)), then
	/// the field-level validator.
	pub fn validate_field(
		field: &FieldSchema,
		value: Option<&FieldValue>,
		all_values: &FormValues,
	) -> Option<String> {
		if field.required && FieldValue::is_missing(value) {
			return Some(REQUIRED_MESSAGE.to_string());
		}

		if let Some(rules) = &field.validation
			&& let Some(message) = rules.check(value, all_values)
		{
			return Some(message);
		}

		field
			.validate
			.as_ref()
			.and_then(|validate| validate(value, all_values))
	}

	/// Run the field's async validator, if any.
	///
	/// Callers are expected to run this only after
	/// [`validate_field`](Self::validate_field) passed.
	pub async fn validate_field_async(
		field: &FieldSchema,
		value: Option<&FieldValue>,
		all_values: &FormValues,
	) -> Resolution<Option<String>> {
		match &field.async_validate {
			Some(validator) => {
				resolve_validator(&field.id, validator.as_ref(), value, all_values).await
			}
			None => Resolution::Resolved(None),
		}
	}

	/// Validate every visible field and replace the error map.
	///
	/// Async validators of different fields run concurrently; the pass
	/// completes once all of them have resolved. Returns `true` when no
	/// errors remain.
	pub async fn validate_all(&mut self) -> bool {
		let mut errors = FieldErrors::new();
		let mut pending = Vec::new();

		for field in self.schema.fields() {
			if !Self::is_field_visible(field, &self.values) {
				continue;
			}

			if field.is_repeater() {
				if self.config.repeater_validation == RepeaterValidation::Recursive
					&& let Some(items) = self.values.get(&field.id).and_then(FieldValue::as_items)
				{
					validate_items(&field.id, field.sub_fields(), items, &mut errors);
				}
				continue;
			}

			let value = self.values.get(&field.id);
			match Self::validate_field(field, value, &self.values) {
				Some(message) => {
					errors.insert(field.id.clone(), message);
				}
				None if field.async_validate.is_some() => pending.push(field),
				None => {}
			}
		}

		let values = &self.values;
		let resolutions = join_all(pending.into_iter().map(|field| async move {
			let resolution =
				Self::validate_field_async(field, values.get(&field.id), values).await;
			(field.id.as_str(), resolution)
		}))
		.await;

		let policy = self.config.failure_policy;
		for (field_id, resolution) in resolutions {
			if let Some(message) = policy.settle_validation(resolution) {
				errors.insert(field_id.to_string(), message);
			}
		}

		let valid = errors.is_empty();
		tracing::info!(valid, errors = errors.len(), "Validated form");
		self.errors = errors;
		valid
	}

	/// Validate and, when everything passes, mark the form submitted.
	///
	/// Returns the submitted values on success.
	pub async fn submit(&mut self) -> Option<FormValues> {
		if !self.validate_all().await {
			return None;
		}
		self.submitted = true;
		tracing::info!(fields = self.values.len(), "Form submitted");
		Some(self.values.clone())
	}

	// ------------------------------------------------------------------
	// Repeaters
	// ------------------------------------------------------------------

	/// Append an empty item to a repeater, returning its index.
	///
	/// Returns `None` when `field_id` is not a repeater. A stored value that
	/// is not an item list is replaced by a fresh list.
	pub fn add_repeater_item(&mut self, field_id: &str) -> Option<usize> {
		if !self.schema.get(field_id).is_some_and(FieldSchema::is_repeater) {
			tracing::warn!(field = field_id, "Not a repeater field");
			return None;
		}

		let slot = self
			.values
			.entry(field_id.to_string())
			.or_insert_with(|| FieldValue::Items(Vec::new()));
		if slot.as_items().is_none() {
			tracing::warn!(field = field_id, kind = slot.kind(), "Replacing non-list repeater value");
			*slot = FieldValue::Items(Vec::new());
		}

		let index = match slot.as_items_mut() {
			Some(items) => {
				items.push(RepeaterItem::new());
				items.len() - 1
			}
			None => return None,
		};
		tracing::debug!(field = field_id, index, "Added repeater item");
		self.persist();
		Some(index)
	}

	/// Remove the item at `index`; later items shift down by one.
	///
	/// Out-of-range indexes are a no-op and return `false`.
	pub fn remove_repeater_item(&mut self, field_id: &str, index: usize) -> bool {
		let Some(items) = self
			.values
			.get_mut(field_id)
			.and_then(FieldValue::as_items_mut)
		else {
			tracing::debug!(field = field_id, "No repeater items to remove");
			return false;
		};

		if index >= items.len() {
			tracing::debug!(field = field_id, index, len = items.len(), "Repeater index out of range");
			return false;
		}

		items.remove(index);
		tracing::debug!(field = field_id, index, "Removed repeater item");
		self.persist();
		true
	}

	/// Overwrite one sub-field of one repeater item and persist.
	///
	/// Returns `false` (and changes nothing) for an unknown repeater or
	/// sub-field, or an index past the end.
	pub fn set_repeater_value(
		&mut self,
		field_id: &str,
		index: usize,
		sub_id: &str,
		value: impl Into<FieldValue>,
	) -> bool {
		let known_sub_field = self
			.schema
			.get(field_id)
			.is_some_and(|field| field.sub_fields().iter().any(|sub| sub.id == sub_id));
		if !known_sub_field {
			tracing::warn!(field = field_id, sub_field = sub_id, "Unknown repeater sub-field");
			return false;
		}

		let Some(item) = self
			.values
			.get_mut(field_id)
			.and_then(FieldValue::as_items_mut)
			.and_then(|items| items.get_mut(index))
		else {
			return false;
		};

		item.insert(sub_id.to_string(), value.into());
		self.persist();
		true
	}

	// ------------------------------------------------------------------
	// Select options
	// ------------------------------------------------------------------

	/// Mark every loader-backed select as loading and hand out the loads.
	///
	/// Selects with static options are skipped; their loader never runs.
	pub fn begin_options_load(&mut self) -> Vec<PendingLoad> {
		let loads: Vec<PendingLoad> = self
			.schema
			.fields()
			.iter()
			.filter_map(|field| {
				field.pending_loader().map(|loader| PendingLoad {
					field_id: field.id.clone(),
					loader: Arc::clone(loader),
				})
			})
			.collect();

		for load in &loads {
			self.options
				.insert(load.field_id.clone(), OptionsState::Loading);
		}
		loads
	}

	/// Apply a finished load. The last result applied for a field wins.
	pub fn finish_options_load(
		&mut self,
		field_id: &str,
		resolution: Resolution<Vec<SelectOption>>,
	) {
		let state = match resolution {
			Resolution::Resolved(options) => OptionsState::Loaded(options),
			Resolution::Failed(reason) => match self.config.failure_policy {
				FailurePolicy::Swallow => OptionsState::Loaded(Vec::new()),
				FailurePolicy::Surface => OptionsState::Failed(reason),
			},
		};
		self.options.insert(field_id.to_string(), state);
	}

	/// Load options for every loader-backed select concurrently.
	pub async fn load_options(&mut self) {
		let loads = self.begin_options_load();
		let results = join_all(loads.into_iter().map(PendingLoad::run)).await;
		for (field_id, resolution) in results {
			self.finish_options_load(&field_id, resolution);
		}
	}

	pub fn options_state(&self, field_id: &str) -> &OptionsState {
		self.options.get(field_id).unwrap_or(&IDLE)
	}

	/// Options to offer: static options first, otherwise the loaded list.
	pub fn options_for(&self, field_id: &str) -> &[SelectOption] {
		self.schema
			.get(field_id)
			.and_then(FieldSchema::static_options)
			.unwrap_or_else(|| self.options_state(field_id).options())
	}

	pub fn is_loading(&self, field_id: &str) -> bool {
		self.options_state(field_id).is_loading()
	}

	// ------------------------------------------------------------------
	// Renderer views
	// ------------------------------------------------------------------

	fn view<'a>(&'a self, field: &'a FieldSchema) -> FieldView<'a> {
		let touched = self.is_touched(&field.id);
		FieldView {
			field,
			value: self.value(&field.id),
			error: if touched { self.error(&field.id) } else { None },
			touched,
			visible: Self::is_field_visible(field, &self.values),
			loading: self.is_loading(&field.id),
			options: self.options_for(&field.id),
		}
	}

	pub fn field_view(&self, field_id: &str) -> Option<FieldView<'_>> {
		self.schema.get(field_id).map(|field| self.view(field))
	}

	/// Views of the visible top-level fields in schema order.
	pub fn visible_fields(&self) -> Vec<FieldView<'_>> {
		self.schema
			.fields()
			.iter()
			.filter(|field| Self::is_field_visible(field, &self.values))
			.map(|field| self.view(field))
			.collect()
	}

	/// Visible fields grouped by section; sections left empty are omitted.
	pub fn section_views(&self) -> Vec<(&str, Vec<FieldView<'_>>)> {
		self.schema
			.sections()
			.into_iter()
			.filter_map(|(section, fields)| {
				let views: Vec<_> = fields
					.into_iter()
					.filter(|field| Self::is_field_visible(field, &self.values))
					.map(|field| self.view(field))
					.collect();
				(!views.is_empty()).then_some((section, views))
			})
			.collect()
	}
}

/// Synchronously validate repeater items, recording errors by item path.
///
/// Sub-field conditions and validators see the item's own values.
fn validate_items(
	path: &str,
	sub_fields: &[FieldSchema],
	items: &[RepeaterItem],
	errors: &mut FieldErrors,
) {
	for (index, item) in items.iter().enumerate() {
		for sub in sub_fields {
			if !FormEngine::is_field_visible(sub, item) {
				continue;
			}
			let key = item_error_key(path, index, &sub.id);
			if sub.is_repeater() {
				if let Some(nested) = item.get(&sub.id).and_then(FieldValue::as_items) {
					validate_items(&key, sub.sub_fields(), nested, errors);
				}
				continue;
			}
			if let Some(message) = FormEngine::validate_field(sub, item.get(&sub.id), item) {
				errors.insert(key, message);
			}
		}
	}
}
