//! Development-flagged packages and their redacted diagnostic view.

use serde::Serialize;

use crate::store::PackageStore;

/// Redacted view of one development package.
///
/// Only the allow-listed fields below are exposed; payload contents never
/// leave the registry through this view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PackageSummary {
	pub name: String,
	/// `None` when the package has not been downloaded (yet).
	pub namespace: Option<String>,
	/// Top-level capability group names, in payload order.
	pub groups: Vec<String>,
	pub activated: bool,
}

/// Ordered, de-duplicated set of development package names.
#[derive(Debug, Default, Clone)]
pub struct DevelopmentPackages {
	names: Vec<String>,
}

impl DevelopmentPackages {
	/// Flags `name`. Returns false if it was already flagged.
	pub fn mark(&mut self, name: impl Into<String>) -> bool {
		let name = name.into();
		if self.contains(&name) {
			return false;
		}
		self.names.push(name);
		true
	}

	pub fn contains(&self, name: &str) -> bool {
		self.names.iter().any(|n| n == name)
	}

	pub fn names(&self) -> &[String] {
		&self.names
	}

	/// Summaries in flagging order.
	pub fn summarize(&self, store: &PackageStore) -> Vec<PackageSummary> {
		self.names
			.iter()
			.map(|name| match store.downloaded(name) {
				Some(package) => PackageSummary {
					name: name.clone(),
					namespace: Some(package.namespace().to_string()),
					groups: package.exports().as_table().map(|t| t.keys().cloned().collect()).unwrap_or_default(),
					activated: store.activated(package.namespace()).is_some_and(|live| live.name() == name),
				},
				None => PackageSummary {
					name: name.clone(),
					namespace: None,
					groups: Vec::new(),
					activated: false,
				},
			})
			.collect()
	}
}
