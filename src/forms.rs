//! Form engine module.
//!
//! Schema-driven form sessions: values, visibility, validation, repeaters,
//! select option loading and draft persistence.
//!
//! # Examples
//!
//! ```rust
//! use schemaform::forms::{FormEngine, FormSchema, NoopDraftStore};
//!
//! let schema = FormSchema::from_json(r#"[{"id": "name", "type": "text"}]"#).unwrap();
//! let engine = FormEngine::new(schema, NoopDraftStore).unwrap();
//! assert_eq!(engine.visible_fields().len(), 1);
//! ```

#[cfg(feature = "forms")]
pub use schemaform_forms::*;
