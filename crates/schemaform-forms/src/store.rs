//! Draft persistence
//!
//! The engine reads the last saved draft once when it starts and writes the
//! full value map after every mutation. Where the draft lives is up to the
//! [`DraftStore`] implementation; the engine only needs a map-shaped round
//! trip.

use crate::config::EngineConfig;
use crate::error::DraftError;
use crate::value::FormValues;
use parking_lot::RwLock;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Key under which the draft is stored when none is configured.
pub const DEFAULT_DRAFT_KEY: &str = "dynamic-form-draft";

/// Storage port for form drafts.
///
/// `save` always receives the complete value map and overwrites whatever was
/// stored before.
pub trait DraftStore: Send + Sync {
	/// Return the stored draft, `Ok(None)` when nothing has been saved.
	fn load(&self) -> Result<Option<FormValues>, DraftError>;

	fn save(&self, values: &FormValues) -> Result<(), DraftError>;
}

fn decode(raw: &str) -> Result<FormValues, DraftError> {
	serde_json::from_str(raw).map_err(DraftError::Corrupt)
}

fn encode(values: &FormValues) -> Result<String, DraftError> {
	serde_json::to_string(values).map_err(DraftError::Encode)
}

/// In-memory store holding the serialized draft.
///
/// Clones share the same slot, so a test can keep one handle and give the
/// other to an engine.
///
/// # Examples
///
/// ```
/// use schemaform_forms::store::{DraftStore, MemoryDraftStore};
/// use schemaform_forms::value::{FieldValue, FormValues};
///
/// let store = MemoryDraftStore::new();
/// assert!(store.load().unwrap().is_none());
///
/// let mut values = FormValues::new();
/// values.insert("name".to_string(), FieldValue::from("Ada"));
/// store.save(&values).unwrap();
///
/// assert_eq!(store.load().unwrap(), Some(values));
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoryDraftStore {
	raw: Arc<RwLock<Option<String>>>,
}

impl MemoryDraftStore {
	pub fn new() -> Self {
		Self::default()
	}

	/// Seed the store with raw text, valid or not.
	pub fn with_raw(raw: impl Into<String>) -> Self {
		Self {
			raw: Arc::new(RwLock::new(Some(raw.into()))),
		}
	}

	/// The serialized draft as last written.
	pub fn raw(&self) -> Option<String> {
		self.raw.read().clone()
	}
}

impl DraftStore for MemoryDraftStore {
	fn load(&self) -> Result<Option<FormValues>, DraftError> {
		self.raw.read().as_deref().map(decode).transpose()
	}

	fn save(&self, values: &FormValues) -> Result<(), DraftError> {
		let encoded = encode(values)?;
		*self.raw.write() = Some(encoded);
		Ok(())
	}
}

/// File-backed store: one `<key>.json` file inside a directory.
///
/// Writes go to a temporary sibling file that is then renamed over the
/// draft, so a crash never leaves a half-written draft behind.
#[derive(Debug, Clone)]
pub struct JsonFileDraftStore {
	path: PathBuf,
}

impl JsonFileDraftStore {
	/// # Examples
	///
	/// ```
	/// use schemaform_forms::store::JsonFileDraftStore;
	/// use std::path::Path;
	///
	/// let store = JsonFileDraftStore::new("/var/lib/forms", "signup");
	/// assert_eq!(store.path(), Path::new("/var/lib/forms/signup.json"));
	/// ```
	pub fn new(directory: impl AsRef<Path>, key: &str) -> Self {
		Self {
			path: directory.as_ref().join(format!("{}.json", key)),
		}
	}

	/// Store named after [`EngineConfig::draft_key`].
	pub fn from_config(directory: impl AsRef<Path>, config: &EngineConfig) -> Self {
		Self::new(directory, &config.draft_key)
	}

	pub fn path(&self) -> &Path {
		&self.path
	}
}

impl DraftStore for JsonFileDraftStore {
	fn load(&self) -> Result<Option<FormValues>, DraftError> {
		match fs::read_to_string(&self.path) {
			Ok(raw) => decode(&raw).map(Some),
			Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
			Err(e) => Err(DraftError::Io(e)),
		}
	}

	fn save(&self, values: &FormValues) -> Result<(), DraftError> {
		let encoded = encode(values)?;
		if let Some(parent) = self.path.parent() {
			fs::create_dir_all(parent)?;
		}
		let staging = self.path.with_extension("json.tmp");
		fs::write(&staging, encoded)?;
		fs::rename(&staging, &self.path)?;
		Ok(())
	}
}

/// Store that keeps nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopDraftStore;

impl DraftStore for NoopDraftStore {
	fn load(&self) -> Result<Option<FormValues>, DraftError> {
		Ok(None)
	}

	fn save(&self, _values: &FormValues) -> Result<(), DraftError> {
		Ok(())
	}
}
