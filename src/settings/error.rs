//! Settings errors.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SettingsError {
	/// The stored document is not valid JSON for the schema.
	#[error("Settings parse error: {0}")]
	Parse(#[from] serde_json::Error),

	/// The stored document parsed but holds unusable values.
	#[error("Invalid setting value: {0}")]
	Invalid(String),

	/// The storage backend failed to read or write.
	#[error("Settings storage error: {0}")]
	Storage(String),

	/// A dotted setting path that names no setting.
	#[error("Unknown setting path: {0}")]
	UnknownPath(String),
}
