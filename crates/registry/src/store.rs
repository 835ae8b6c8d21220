//! Downloaded and activated package mappings.
//!
//! The store is plain data: it owns no locks and notifies nobody. The
//! [`Registry`](crate::Registry) wraps it behind a lock and turns the
//! [`Activation`]s it reports into subscriber notifications.

use std::sync::Arc;

use indexmap::IndexMap;

use crate::error::{RegistryError, Result};
use crate::export::Export;

/// Registration input for one package.
#[derive(Debug, Clone)]
pub struct PackageDescriptor {
	pub name: String,
	pub namespace: String,
	pub exports: Arc<Export>,
}

impl PackageDescriptor {
	pub fn new(name: impl Into<String>, namespace: impl Into<String>, exports: impl Into<Arc<Export>>) -> Self {
		Self {
			name: name.into(),
			namespace: namespace.into(),
			exports: exports.into(),
		}
	}

	fn validate(&self) -> Result<()> {
		if self.name.is_empty() {
			return Err(RegistryError::Validation { field: "name" });
		}
		if self.namespace.is_empty() {
			return Err(RegistryError::Validation { field: "namespace" });
		}
		Ok(())
	}
}

/// A package known to the store, activated or not.
#[derive(Debug)]
pub struct DownloadedPackage {
	name: String,
	namespace: String,
	exports: Arc<Export>,
}

impl DownloadedPackage {
	pub fn name(&self) -> &str {
		&self.name
	}

	pub fn namespace(&self) -> &str {
		&self.namespace
	}

	/// The package payload.
	pub fn exports(&self) -> &Arc<Export> {
		&self.exports
	}
}

/// A namespace that became live as the result of a store mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Activation {
	pub namespace: String,
	pub name: String,
}

/// Package mappings: downloaded by name, activated by namespace.
#[derive(Debug, Default)]
pub struct PackageStore {
	downloaded: IndexMap<String, Arc<DownloadedPackage>>,
	activated: IndexMap<String, Arc<DownloadedPackage>>,
}

impl PackageStore {
	pub fn new() -> Self {
		Self::default()
	}

	/// Records a downloaded package, replacing any package with the same name.
	///
	/// The first package seen for a namespace becomes its activated package;
	/// later downloads for an occupied namespace never displace it. A
	/// re-download of the live package's name swaps in the new payload.
	/// Returns the activation when the namespace went from empty to live.
	pub fn download(&mut self, descriptor: PackageDescriptor) -> Result<Option<Activation>> {
		descriptor.validate()?;
		let PackageDescriptor { name, namespace, exports } = descriptor;
		let package = Arc::new(DownloadedPackage {
			name: name.clone(),
			namespace: namespace.clone(),
			exports,
		});

		if let Some(previous) = self.downloaded.insert(name.clone(), Arc::clone(&package))
			&& previous.namespace != namespace
		{
			self.release(&previous);
		}
		tracing::debug!(name = %name, namespace = %namespace, "registry.download");

		match self.activated.get_mut(&namespace) {
			Some(live) if live.name == name => {
				*live = package;
				Ok(None)
			}
			Some(_) => Ok(None),
			None => {
				self.activated.insert(namespace.clone(), package);
				tracing::debug!(name = %name, namespace = %namespace, "registry.activate.default");
				Ok(Some(Activation { namespace, name }))
			}
		}
	}

	/// Makes the named package the live one for its namespace.
	pub fn activate(&mut self, name: &str) -> Result<Activation> {
		let package = self.downloaded.get(name).cloned().ok_or_else(|| RegistryError::NotFound { name: name.to_string() })?;
		let namespace = package.namespace.clone();

		if let Some(replaced) = self.activated.insert(namespace.clone(), package)
			&& replaced.name != name
		{
			tracing::debug!(namespace = %namespace, replaced = %replaced.name, name, "registry.activate.replace");
		} else {
			tracing::debug!(namespace = %namespace, name, "registry.activate");
		}

		Ok(Activation {
			namespace,
			name: name.to_string(),
		})
	}

	/// Clears the namespace of the named package if that package is live.
	///
	/// Returns whether an activation was removed.
	pub fn deactivate(&mut self, name: &str) -> Result<bool> {
		let package = self.downloaded.get(name).cloned().ok_or_else(|| RegistryError::NotFound { name: name.to_string() })?;
		let removed = self.release(&package);
		if removed {
			tracing::debug!(namespace = %package.namespace, name, "registry.deactivate");
		}
		Ok(removed)
	}

	/// Forgets a downloaded package, deactivating it first if it is live.
	pub fn remove(&mut self, name: &str) -> Option<Arc<DownloadedPackage>> {
		let package = self.downloaded.shift_remove(name)?;
		self.release(&package);
		tracing::debug!(namespace = %package.namespace, name, "registry.remove");
		Some(package)
	}

	fn release(&mut self, package: &DownloadedPackage) -> bool {
		let live = self.activated.get(&package.namespace).is_some_and(|live| live.name == package.name);
		if live {
			self.activated.shift_remove(&package.namespace);
		}
		live
	}

	pub fn downloaded(&self, name: &str) -> Option<&Arc<DownloadedPackage>> {
		self.downloaded.get(name)
	}

	/// The live package for `namespace`.
	pub fn activated(&self, namespace: &str) -> Option<&Arc<DownloadedPackage>> {
		self.activated.get(namespace)
	}

	pub fn is_activated(&self, namespace: &str) -> bool {
		self.activated.contains_key(namespace)
	}

	/// Live packages in namespace activation order.
	pub fn activated_packages(&self) -> impl Iterator<Item = &Arc<DownloadedPackage>> {
		self.activated.values()
	}

	/// Downloaded packages in download order.
	pub fn downloaded_packages(&self) -> impl Iterator<Item = &Arc<DownloadedPackage>> {
		self.downloaded.values()
	}
}
