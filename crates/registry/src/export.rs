//! Package payload nodes.
//!
//! A package payload is a tree of [`Export`] nodes. The registry never looks
//! inside a payload beyond walking named children, so leaves may be plain
//! data or arbitrary native values. Children sit behind [`Arc`] so resolving
//! a path returns the stored node itself rather than a copy.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use serde::ser::{Serialize, SerializeMap, Serializer};

/// Named children of a table node, in insertion order.
pub type ExportTable = IndexMap<String, Arc<Export>>;

/// One node of a package payload.
#[derive(Clone)]
pub enum Export {
	/// Named children (capability groups, nested namespaces of values).
	Table(ExportTable),
	/// A plain data leaf.
	Data(serde_json::Value),
	/// An opaque Rust value, e.g. a reducer or saga function.
	Native(Arc<dyn Any + Send + Sync>),
}

impl Export {
	/// Creates an empty table node.
	pub fn table() -> Self {
		Self::Table(ExportTable::default())
	}

	/// Wraps a native value.
	pub fn native<T: Any + Send + Sync>(value: T) -> Self {
		Self::Native(Arc::new(value))
	}

	/// Adds a child to a table node, builder style.
	///
	/// Non-table nodes are returned unchanged.
	#[must_use]
	pub fn with(mut self, key: impl Into<String>, child: impl Into<Export>) -> Self {
		if let Self::Table(entries) = &mut self {
			entries.insert(key.into(), Arc::new(child.into()));
		}
		self
	}

	/// Returns the named child of a table node.
	pub fn get(&self, key: &str) -> Option<&Arc<Export>> {
		match self {
			Self::Table(entries) => entries.get(key),
			_ => None,
		}
	}

	pub fn as_table(&self) -> Option<&ExportTable> {
		match self {
			Self::Table(entries) => Some(entries),
			_ => None,
		}
	}

	pub fn as_data(&self) -> Option<&serde_json::Value> {
		match self {
			Self::Data(value) => Some(value),
			_ => None,
		}
	}

	/// Returns the string content of a data leaf.
	pub fn as_str(&self) -> Option<&str> {
		self.as_data().and_then(serde_json::Value::as_str)
	}

	/// Downcasts a native leaf.
	pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
		match self {
			Self::Native(value) => value.downcast_ref::<T>(),
			_ => None,
		}
	}

	/// Renders the node as JSON. Native leaves render as `"<native>"`.
	pub fn to_json(&self) -> serde_json::Value {
		match self {
			Self::Table(entries) => serde_json::Value::Object(entries.iter().map(|(k, v)| (k.clone(), v.to_json())).collect()),
			Self::Data(value) => value.clone(),
			Self::Native(_) => serde_json::Value::String(NATIVE_PLACEHOLDER.to_string()),
		}
	}
}

const NATIVE_PLACEHOLDER: &str = "<native>";

impl Default for Export {
	fn default() -> Self {
		Self::table()
	}
}

impl From<serde_json::Value> for Export {
	fn from(value: serde_json::Value) -> Self {
		match value {
			serde_json::Value::Object(map) => Self::Table(map.into_iter().map(|(k, v)| (k, Arc::new(Export::from(v)))).collect()),
			other => Self::Data(other),
		}
	}
}

impl From<&str> for Export {
	fn from(value: &str) -> Self {
		Self::Data(serde_json::Value::String(value.to_string()))
	}
}

impl From<String> for Export {
	fn from(value: String) -> Self {
		Self::Data(serde_json::Value::String(value))
	}
}

impl From<bool> for Export {
	fn from(value: bool) -> Self {
		Self::Data(serde_json::Value::Bool(value))
	}
}

impl From<i64> for Export {
	fn from(value: i64) -> Self {
		Self::Data(serde_json::Value::from(value))
	}
}

impl<K: Into<String>> FromIterator<(K, Export)> for Export {
	fn from_iter<I: IntoIterator<Item = (K, Export)>>(iter: I) -> Self {
		Self::Table(iter.into_iter().map(|(k, v)| (k.into(), Arc::new(v))).collect())
	}
}

impl PartialEq for Export {
	fn eq(&self, other: &Self) -> bool {
		match (self, other) {
			(Self::Table(a), Self::Table(b)) => a == b,
			(Self::Data(a), Self::Data(b)) => a == b,
			(Self::Native(a), Self::Native(b)) => Arc::ptr_eq(a, b),
			_ => false,
		}
	}
}

impl fmt::Debug for Export {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Table(entries) => f.debug_map().entries(entries.iter()).finish(),
			Self::Data(value) => write!(f, "{value}"),
			Self::Native(_) => f.write_str(NATIVE_PLACEHOLDER),
		}
	}
}

impl Serialize for Export {
	fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		match self {
			Self::Table(entries) => {
				let mut map = serializer.serialize_map(Some(entries.len()))?;
				for (key, child) in entries {
					map.serialize_entry(key, child.as_ref())?;
				}
				map.end()
			}
			Self::Data(value) => value.serialize(serializer),
			Self::Native(_) => serializer.serialize_str(NATIVE_PLACEHOLDER),
		}
	}
}
