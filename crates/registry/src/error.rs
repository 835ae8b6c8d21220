//! Error types for registry lifecycle and dependency resolution.

use std::time::Duration;

use thiserror::Error;

/// Errors raised by registration, resolution and dependency waiting.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
	/// A caller-supplied argument is unusable (empty namespace or path segment).
	#[error("invalid argument: {0}")]
	InvalidArgument(String),

	/// A registration descriptor lacks a required field.
	#[error("package not added: missing {field}")]
	Validation {
		/// The missing field (`name` or `namespace`).
		field: &'static str,
	},

	/// No package is activated for the namespace.
	#[error("namespace '{namespace}' has no activated package")]
	NotLoaded { namespace: String },

	/// A path segment does not exist on the resolved export.
	#[error("missing dependency: '{path}'")]
	MissingDependency {
		/// Dotted path accumulated up to and including the failing segment.
		path: String,
	},

	/// No downloaded package carries this name.
	#[error("package '{name}' not found")]
	NotFound { name: String },

	/// The dependency wait deadline elapsed.
	#[error("dependencies not ready after {timeout:?}: {pending:?}")]
	Timeout { timeout: Duration, pending: Vec<String> },

	/// The waiter lost its settlement channel before any outcome.
	#[error("dependency wait abandoned with {pending:?} still pending")]
	WaitAbandoned { pending: Vec<String> },
}

/// Result type for registry operations.
pub type Result<T> = std::result::Result<T, RegistryError>;
