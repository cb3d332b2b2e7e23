//! Response validation contracts.
//!
//! A [`Schema`] turns the raw response body into a typed value or a structured
//! [`ValidationError`]. [`JsonSchema`] covers the common serde case and reports the JSON
//! path that failed; closures work as ad-hoc schemas.

// std
use std::marker::PhantomData;
// self
use crate::_prelude::*;

/// Maps a raw response payload to a typed value.
pub trait Schema {
	/// Typed value produced on success.
	type Output;

	/// Validates the raw payload.
	fn validate(&self, raw: &[u8]) -> Result<Self::Output, ValidationError>;
}
impl<F, T> Schema for F
where
	F: Fn(&[u8]) -> Result<T, ValidationError>,
{
	type Output = T;

	fn validate(&self, raw: &[u8]) -> Result<Self::Output, ValidationError> {
		self(raw)
	}
}

/// Structured validation failure.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
#[error("Payload failed validation at `{path}`: {message}.")]
pub struct ValidationError {
	/// Location of the offending value (`.` for the document root).
	pub path: String,
	/// Human-readable reason.
	pub message: String,
}
impl ValidationError {
	/// Creates a validation error for the given path.
	pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
		Self { path: path.into(), message: message.into() }
	}

	/// Creates a validation error anchored at the document root.
	pub fn at_root(message: impl Into<String>) -> Self {
		Self::new(".", message)
	}
}

type Refinement<T> = Box<dyn Fn(&T) -> Result<(), String> + Send + Sync>;

/// Serde-backed schema that deserializes JSON into `T`.
pub struct JsonSchema<T> {
	refinements: Vec<Refinement<T>>,
	_marker: PhantomData<fn() -> T>,
}
impl<T> JsonSchema<T>
where
	T: DeserializeOwned,
{
	/// Creates a schema without additional checks.
	pub fn new() -> Self {
		Self { refinements: Vec::new(), _marker: PhantomData }
	}

	/// Adds a check that runs after deserialization succeeds.
	pub fn refine(
		mut self,
		check: impl 'static + Send + Sync + Fn(&T) -> Result<(), String>,
	) -> Self {
		self.refinements.push(Box::new(check));

		self
	}
}
impl<T> Default for JsonSchema<T>
where
	T: DeserializeOwned,
{
	fn default() -> Self {
		Self::new()
	}
}
impl<T> Debug for JsonSchema<T> {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("JsonSchema")
			.field("target", &std::any::type_name::<T>())
			.field("refinements", &self.refinements.len())
			.finish()
	}
}
impl<T> Schema for JsonSchema<T>
where
	T: DeserializeOwned,
{
	type Output = T;

	fn validate(&self, raw: &[u8]) -> Result<Self::Output, ValidationError> {
		let mut de = serde_json::Deserializer::from_slice(raw);
		let value: T = serde_path_to_error::deserialize(&mut de).map_err(|e| {
			ValidationError::new(e.path().to_string(), e.inner().to_string())
		})?;

		de.end().map_err(|e| ValidationError::at_root(e.to_string()))?;

		for check in &self.refinements {
			check(&value).map_err(ValidationError::at_root)?;
		}

		Ok(value)
	}
}

/// Shorthand for [`JsonSchema::new`].
pub fn json<T>() -> JsonSchema<T>
where
	T: DeserializeOwned,
{
	JsonSchema::new()
}
