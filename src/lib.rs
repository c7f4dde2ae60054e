//! # Schemaform
//!
//! Dynamic forms driven by a declarative schema.
//!
//! A schema lists fields (text, number, checkbox, select, radio and
//! repeater), optional `visibleIf` conditions and validation rules. The
//! engine holds the live state of one form session and keeps a draft of the
//! values so an interrupted session can be resumed.
//!
//! ## Feature Flags
//!
//! - `forms` (default) - The form engine, re-exported under [`forms`]
//! - `full` - All features enabled
//!
//! ## Quick Example
//!
//! ```rust
//! use schemaform::forms::{FormEngine, FormSchema, MemoryDraftStore};
//!
//! let schema = FormSchema::from_json(r#"[
//!     {"id": "name", "type": "text", "required": true},
//!     {"id": "age", "type": "number", "validation": {"min": 1, "max": 100}}
//! ]"#)
//! .unwrap();
//!
//! let mut engine = FormEngine::new(schema, MemoryDraftStore::new()).unwrap();
//! engine.set_value("name", "Ada");
//! engine.mark_touched("name");
//! assert!(engine.is_touched("name"));
//! ```

pub mod forms;
