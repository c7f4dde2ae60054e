//! Schema-driven form engine
//!
//! This crate turns a declarative field schema into a running form session:
//! - Field values, touched tracking and per-field error messages
//! - Conditional visibility (`visibleIf` equality conditions)
//! - Ordered synchronous validation with optional async validators
//! - Repeater fields holding lists of sub-field items
//! - Select options supplied statically or by an async loader
//! - Draft persistence after every mutation, restored on start
//!
//! The engine is renderer-agnostic: a UI reads [`FieldView`]s and forwards
//! user input to [`FormEngine`].

pub mod callbacks;
pub mod config;
pub mod definition;
pub mod engine;
pub mod error;
pub mod options;
pub mod rules;
pub mod schema;
pub mod store;
pub mod value;

pub use callbacks::{
	AsyncValidator, FailurePolicy, OptionsLoader, Resolution, SyncValidatorFn,
	VALIDATION_FAILED_MESSAGE, async_validator_fn, options_loader_fn,
};
pub use config::{DraftRecovery, EngineConfig, RepeaterValidation};
pub use definition::{FieldDefinition, FormDefinition};
pub use engine::{FieldErrors, FieldView, FormEngine, PendingLoad, item_error_key};
pub use error::{BoxError, DraftError, FormError, FormResult, SchemaError};
pub use options::{OptionsState, SelectOption};
pub use rules::{INVALID_FORMAT_MESSAGE, REQUIRED_MESSAGE, ValidationRules};
pub use schema::{Condition, DEFAULT_SECTION, FieldKind, FieldSchema, FormSchema};
pub use store::{
	DEFAULT_DRAFT_KEY, DraftStore, JsonFileDraftStore, MemoryDraftStore, NoopDraftStore,
};
pub use value::{FieldValue, FormValues, RepeaterItem};
