//! Segment-by-segment descent into a package payload.

use std::sync::Arc;

use crate::error::{RegistryError, Result};
use crate::export::Export;

/// Walks `segments` starting at `root`, returning the node reached.
///
/// `label` seeds the dotted path reported by [`RegistryError::MissingDependency`]
/// (the namespace for accessor lookups). An empty `segments` returns `root`.
pub fn resolve(root: &Arc<Export>, label: &str, segments: &[&str]) -> Result<Arc<Export>> {
	let mut current = root;
	let mut reached = String::from(label);

	for segment in segments {
		if segment.is_empty() {
			return Err(RegistryError::InvalidArgument(format!("empty path segment after '{reached}'")));
		}
		if !reached.is_empty() {
			reached.push('.');
		}
		reached.push_str(segment);

		current = current.get(segment).ok_or_else(|| RegistryError::MissingDependency { path: reached.clone() })?;
	}

	Ok(Arc::clone(current))
}

#[cfg(test)]
mod tests {
	use rstest::rstest;
	use serde_json::json;

	use super::*;

	fn payload() -> Arc<Export> {
		Arc::new(Export::from(json!({
			"reducers": { "one": 1, "two": 2 },
			"actions": { "three": 3, "nested": { "four": 4 } },
		})))
	}

	#[test]
	fn empty_path_returns_root() {
		let root = payload();
		let got = resolve(&root, "pkg", &[]).expect("root");
		assert!(Arc::ptr_eq(&got, &root));
	}

	#[test]
	fn descends_nested_tables() {
		let root = payload();
		let got = resolve(&root, "pkg", &["actions", "nested", "four"]).expect("nested leaf");
		assert_eq!(got.as_data(), Some(&json!(4)));
	}

	#[test]
	fn returns_stored_node_not_a_copy() {
		let root = payload();
		let a = resolve(&root, "pkg", &["reducers"]).expect("reducers");
		let b = resolve(&root, "pkg", &["reducers"]).expect("reducers");
		assert!(Arc::ptr_eq(&a, &b));
		assert!(Arc::ptr_eq(&a, root.get("reducers").expect("child")));
	}

	#[rstest]
	#[case(&["missing"], "pkg.missing")]
	#[case(&["actions", "something"], "pkg.actions.something")]
	#[case(&["actions", "nested", "four", "deeper"], "pkg.actions.nested.four.deeper")]
	fn missing_segment_names_the_path_reached(#[case] segments: &[&str], #[case] expected: &str) {
		let err = resolve(&payload(), "pkg", segments).expect_err("should miss");
		assert_eq!(err, RegistryError::MissingDependency { path: expected.to_string() });
	}

	#[test]
	fn empty_segment_is_rejected() {
		let err = resolve(&payload(), "pkg", &["actions", ""]).expect_err("empty segment");
		assert!(matches!(err, RegistryError::InvalidArgument(_)));
	}
}
