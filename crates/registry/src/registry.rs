use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;

use crate::dev::{DevelopmentPackages, PackageSummary};
use crate::error::{RegistryError, Result};
use crate::export::Export;
use crate::hub::DepSubscriberHub;
use crate::path;
use crate::store::{Activation, DownloadedPackage, PackageDescriptor, PackageStore};
use crate::wait::{self, DepsReady};

/// Registration input accepted by [`Registry::add_package`].
#[derive(Debug, Clone)]
pub enum AddPackage {
	/// A named package for a namespace; follows download semantics.
	Descriptor(PackageDescriptor),
	/// Payload stored under its namespace, which doubles as the package
	/// name; downloaded and activated at once. Rejected if a package with
	/// that name is already downloaded for a different namespace.
	Legacy { namespace: String, exports: Arc<Export> },
}

impl From<PackageDescriptor> for AddPackage {
	fn from(descriptor: PackageDescriptor) -> Self {
		Self::Descriptor(descriptor)
	}
}

impl<S: Into<String>> From<(S, Export)> for AddPackage {
	fn from((namespace, exports): (S, Export)) -> Self {
		Self::Legacy {
			namespace: namespace.into(),
			exports: Arc::new(exports),
		}
	}
}

/// One locale contributed by an activated package.
#[derive(Debug, Clone)]
pub struct Locale {
	pub namespace: String,
	pub name: String,
	pub value: Arc<Export>,
}

#[derive(Debug, Default)]
struct RegistryInner {
	store: RwLock<PackageStore>,
	hub: DepSubscriberHub,
	development: RwLock<DevelopmentPackages>,
}

/// Package registry handle.
///
/// Clones share state. Build isolated instances with [`Registry::new`]; the
/// process-wide default is [`crate::global`].
#[derive(Debug, Clone, Default)]
pub struct Registry {
	inner: Arc<RegistryInner>,
}

impl Registry {
	pub fn new() -> Self {
		Self::default()
	}

	/// Records a downloaded package.
	///
	/// If its namespace had no activated package, it becomes the activated
	/// one and subscribers are notified before this returns.
	pub fn package_downloaded(&self, descriptor: PackageDescriptor) -> Result<()> {
		let activation = self.inner.store.write().download(descriptor)?;
		if let Some(activation) = activation {
			self.announce(&activation);
		}
		Ok(())
	}

	/// Makes the named package live for its namespace, replacing any other.
	pub fn package_activated(&self, name: &str) -> Result<()> {
		let activation = self.inner.store.write().activate(name)?;
		self.announce(&activation);
		Ok(())
	}

	/// Clears the package's namespace if this package is the live one.
	pub fn package_deactivated(&self, name: &str) -> Result<bool> {
		self.inner.store.write().deactivate(name)
	}

	/// Forgets a downloaded package, deactivating it if live.
	pub fn package_removed(&self, name: &str) -> Option<Arc<DownloadedPackage>> {
		self.inner.store.write().remove(name)
	}

	fn announce(&self, activation: &Activation) {
		tracing::trace!(namespace = %activation.namespace, name = %activation.name, "registry.announce");
		self.inner.hub.notify(&activation.namespace);
	}

	/// Registration entry point for loaders.
	pub fn add_package(&self, package: impl Into<AddPackage>) -> Result<()> {
		match package.into() {
			AddPackage::Descriptor(descriptor) => self.package_downloaded(descriptor),
			AddPackage::Legacy { namespace, exports } => {
				if namespace.is_empty() {
					return Err(RegistryError::Validation { field: "namespace" });
				}
				let activation = {
					let mut store = self.inner.store.write();
					if let Some(existing) = store.downloaded(&namespace)
						&& existing.namespace() != namespace
					{
						return Err(RegistryError::InvalidArgument(format!(
							"package '{namespace}' is already downloaded for namespace '{}'",
							existing.namespace()
						)));
					}
					store.download(PackageDescriptor {
						name: namespace.clone(),
						namespace: namespace.clone(),
						exports,
					})?;
					store.activate(&namespace)?
				};
				self.announce(&activation);
				Ok(())
			}
		}
	}

	pub fn activate_package(&self, name: &str) -> Result<()> {
		self.package_activated(name)
	}

	pub fn deactivate_package(&self, name: &str) -> Result<bool> {
		self.package_deactivated(name)
	}

	/// Resolves `path` inside the package activated for `namespace`.
	///
	/// An empty path returns the whole payload. The returned node is the
	/// stored one, so repeated calls on an unchanged registry are
	/// [`Arc::ptr_eq`].
	pub fn dep(&self, namespace: &str, path: &[&str]) -> Result<Arc<Export>> {
		if namespace.is_empty() {
			return Err(RegistryError::InvalidArgument("namespace must not be empty".into()));
		}
		let exports = {
			let store = self.inner.store.read();
			let package = store.activated(namespace).ok_or_else(|| RegistryError::NotLoaded {
				namespace: namespace.to_string(),
			})?;
			Arc::clone(package.exports())
		};
		path::resolve(&exports, namespace, path)
	}

	/// Waits until every namespace in `namespaces` has an activated package.
	///
	/// The pending set and the deadline are fixed now, not when the future is
	/// first polled. With `timeout`, fails with [`RegistryError::Timeout`] if
	/// the set does not empty in time. Requires a tokio runtime with timers
	/// when a timeout is given.
	pub fn wait_for_deps<I, S>(&self, namespaces: I, timeout: Option<Duration>) -> DepsReady
	where
		I: IntoIterator<Item = S>,
		S: AsRef<str>,
	{
		wait::wait_for_deps(&self.inner.store, &self.inner.hub, namespaces, timeout)
	}

	pub fn is_activated(&self, namespace: &str) -> bool {
		self.inner.store.read().is_activated(namespace)
	}

	/// The live package for `namespace`.
	pub fn activated(&self, namespace: &str) -> Option<Arc<DownloadedPackage>> {
		self.inner.store.read().activated(namespace).cloned()
	}

	pub fn downloaded(&self, name: &str) -> Option<Arc<DownloadedPackage>> {
		self.inner.store.read().downloaded(name).cloned()
	}

	/// Package names in download order.
	pub fn package_names(&self) -> Vec<String> {
		self.inner.store.read().downloaded_packages().map(|p| p.name().to_string()).collect()
	}

	/// Live dependency waiters and other subscribers.
	pub fn subscriber_count(&self) -> usize {
		self.inner.hub.len()
	}

	pub fn hub(&self) -> &DepSubscriberHub {
		&self.inner.hub
	}

	/// The `reducers` group of the package named `key`, falling back to the
	/// package activated for namespace `key`.
	pub fn get_reducers(&self, key: &str) -> Option<Arc<Export>> {
		let store = self.inner.store.read();
		let package = store.downloaded(key).or_else(|| store.activated(key))?;
		package.exports().get("reducers").cloned()
	}

	/// `locales.<lang>` of the named package.
	pub fn get_locale(&self, name: &str, lang: &str) -> Option<Arc<Export>> {
		let store = self.inner.store.read();
		locale_of(store.downloaded(name)?, lang)
	}

	/// Every activated package's locale for `lang`, in namespace order.
	pub fn get_locales(&self, lang: &str) -> Vec<Locale> {
		let store = self.inner.store.read();
		store
			.activated_packages()
			.filter_map(|package| {
				Some(Locale {
					namespace: package.namespace().to_string(),
					name: package.name().to_string(),
					value: locale_of(package, lang)?,
				})
			})
			.collect()
	}

	/// `sagas.default` of the named package.
	pub fn get_sagas(&self, name: &str) -> Option<Arc<Export>> {
		let store = self.inner.store.read();
		store.downloaded(name)?.exports().get("sagas")?.get("default").cloned()
	}

	/// Distinct namespaces referenced by the package's `deps` descriptors.
	///
	/// Descriptors look like `deps.<group>.<alias> = "<namespace>"`; the
	/// result keeps first-seen order. Non-string leaves are skipped.
	pub fn get_deps(&self, name: &str) -> Result<Vec<String>> {
		let store = self.inner.store.read();
		let package = store.downloaded(name).ok_or_else(|| RegistryError::NotFound { name: name.to_string() })?;

		let mut namespaces: Vec<String> = Vec::new();
		let groups = package.exports().get("deps").and_then(|deps| deps.as_table());
		for group in groups.into_iter().flat_map(|groups| groups.values()) {
			let Some(aliases) = group.as_table() else {
				continue;
			};
			for namespace in aliases.values().filter_map(|alias| alias.as_str()) {
				if !namespaces.iter().any(|n| n == namespace) {
					namespaces.push(namespace.to_string());
				}
			}
		}
		Ok(namespaces)
	}

	/// Flags a package name as development. Returns false if already flagged.
	pub fn mark_development(&self, name: impl Into<String>) -> bool {
		self.inner.development.write().mark(name)
	}

	/// Redacted summaries of development packages, in flagging order.
	pub fn development_packages(&self) -> Vec<PackageSummary> {
		let store = self.inner.store.read();
		self.inner.development.read().summarize(&store)
	}
}

fn locale_of(package: &DownloadedPackage, lang: &str) -> Option<Arc<Export>> {
	package.exports().get("locales")?.get(lang).cloned()
}

#[cfg(test)]
mod tests;
