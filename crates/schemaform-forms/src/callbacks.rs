//! Caller-supplied behaviour attached to fields
//!
//! Synchronous validators are plain closures. Asynchronous validators and
//! select option loaders are traits so they can be backed by anything that
//! awaits: an HTTP lookup, a database query, a channel.
//!
//! The result of an async collaborator is a [`Resolution`], which keeps the
//! difference between "answered" and "failed to answer" visible. What the
//! engine does with a failure is decided by [`FailurePolicy`].

use crate::error::BoxError;
use crate::options::SelectOption;
use crate::value::{FieldValue, FormValues};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::sync::Arc;

/// Synchronous rule: `(value, all_values) -> Some(message)` when invalid.
pub type SyncValidatorFn =
	Arc<dyn Fn(Option<&FieldValue>, &FormValues) -> Option<String> + Send + Sync>;

/// Message recorded when an async validator fails under [`FailurePolicy::Surface`].
pub const VALIDATION_FAILED_MESSAGE: &str = "Validation could not be completed";

/// Asynchronous field validator, e.g. a uniqueness lookup.
///
/// `Ok(None)` means valid, `Ok(Some(message))` means invalid and `Err` means
/// the check itself could not be performed.
#[async_trait]
pub trait AsyncValidator: Send + Sync {
	async fn validate(
		&self,
		value: Option<&FieldValue>,
		values: &FormValues,
	) -> Result<Option<String>, BoxError>;
}

/// Producer of select options for fields without a static option list.
#[async_trait]
pub trait OptionsLoader: Send + Sync {
	async fn load(&self) -> Result<Vec<SelectOption>, BoxError>;
}

/// Adapter turning an async closure into an [`AsyncValidator`].
pub struct AsyncValidatorFn<F>(F);

#[async_trait]
impl<F, Fut> AsyncValidator for AsyncValidatorFn<F>
where
	F: Fn(Option<FieldValue>, FormValues) -> Fut + Send + Sync + 'static,
	Fut: Future<Output = Result<Option<String>, BoxError>> + Send + 'static,
{
	async fn validate(
		&self,
		value: Option<&FieldValue>,
		values: &FormValues,
	) -> Result<Option<String>, BoxError> {
		(self.0)(value.cloned(), values.clone()).await
	}
}

/// Build an [`AsyncValidator`] from a closure returning a future.
///
/// The closure receives owned copies of the value and the form values so the
/// returned future does not borrow from the engine.
///
/// # Examples
///
/// ```
/// use schemaform_forms::callbacks::async_validator_fn;
/// use schemaform_forms::error::BoxError;
/// use schemaform_forms::value::FieldValue;
///
/// let taken = async_validator_fn(|value, _values| async move {
///     let name = value.as_ref().and_then(FieldValue::as_str).unwrap_or_default().to_string();
///     Ok::<_, BoxError>((name == "admin").then(|| "Username is taken".to_string()))
/// });
/// # let _ = taken;
/// ```
pub fn async_validator_fn<F, Fut>(f: F) -> Arc<dyn AsyncValidator>
where
	F: Fn(Option<FieldValue>, FormValues) -> Fut + Send + Sync + 'static,
	Fut: Future<Output = Result<Option<String>, BoxError>> + Send + 'static,
{
	Arc::new(AsyncValidatorFn(f))
}

/// Adapter turning an async closure into an [`OptionsLoader`].
pub struct OptionsLoaderFn<F>(F);

#[async_trait]
impl<F, Fut> OptionsLoader for OptionsLoaderFn<F>
where
	F: Fn() -> Fut + Send + Sync + 'static,
	Fut: Future<Output = Result<Vec<SelectOption>, BoxError>> + Send + 'static,
{
	async fn load(&self) -> Result<Vec<SelectOption>, BoxError> {
		(self.0)().await
	}
}

/// Build an [`OptionsLoader`] from a closure returning a future.
pub fn options_loader_fn<F, Fut>(f: F) -> Arc<dyn OptionsLoader>
where
	F: Fn() -> Fut + Send + Sync + 'static,
	Fut: Future<Output = Result<Vec<SelectOption>, BoxError>> + Send + 'static,
{
	Arc::new(OptionsLoaderFn(f))
}

/// Outcome of an async collaborator call.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution<T> {
	/// The collaborator answered.
	Resolved(T),
	/// The collaborator itself failed; the string is the failure reason.
	Failed(String),
}

impl<T> Resolution<T> {
	pub fn is_failed(&self) -> bool {
		matches!(self, Resolution::Failed(_))
	}
}

impl<T> From<Result<T, BoxError>> for Resolution<T> {
	fn from(result: Result<T, BoxError>) -> Self {
		match result {
			Ok(value) => Resolution::Resolved(value),
			Err(error) => Resolution::Failed(error.to_string()),
		}
	}
}

/// What to do when an async validator or option loader fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
	/// Treat a failed validator as "no error" and a failed loader as "no options".
	#[default]
	Swallow,
	/// Record [`VALIDATION_FAILED_MESSAGE`] for a failed validator and keep a
	/// failed loader visible as [`OptionsState::Failed`](crate::options::OptionsState::Failed).
	Surface,
}

impl FailurePolicy {
	/// Collapse a validator resolution into the message to record, if any.
	///
	/// # Examples
	///
	/// ```
	/// use schemaform_forms::callbacks::{FailurePolicy, Resolution};
	///
	/// let failed: Resolution<Option<String>> = Resolution::Failed("timeout".into());
	/// assert_eq!(FailurePolicy::Swallow.settle_validation(failed.clone()), None);
	/// assert!(FailurePolicy::Surface.settle_validation(failed).is_some());
	/// ```
	pub fn settle_validation(self, resolution: Resolution<Option<String>>) -> Option<String> {
		match (resolution, self) {
			(Resolution::Resolved(message), _) => message,
			(Resolution::Failed(_), FailurePolicy::Swallow) => None,
			(Resolution::Failed(_), FailurePolicy::Surface) => {
				Some(VALIDATION_FAILED_MESSAGE.to_string())
			}
		}
	}
}

/// Run an async validator, logging a failure.
pub async fn resolve_validator(
	field_id: &str,
	validator: &dyn AsyncValidator,
	value: Option<&FieldValue>,
	values: &FormValues,
) -> Resolution<Option<String>> {
	let resolution = Resolution::from(validator.validate(value, values).await);
	if let Resolution::Failed(reason) = &resolution {
		tracing::warn!(field = field_id, %reason, "Async validator failed");
	}
	resolution
}

/// Run an options loader, logging a failure.
pub async fn resolve_options(
	field_id: &str,
	loader: &dyn OptionsLoader,
) -> Resolution<Vec<SelectOption>> {
	let resolution = Resolution::from(loader.load().await);
	if let Resolution::Failed(reason) = &resolution {
		tracing::warn!(field = field_id, %reason, "Options loader failed");
	}
	resolution
}
