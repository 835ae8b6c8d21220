//! TOML package manifests.
//!
//! A manifest lists packages in load order:
//!
//! ```toml
//! [[package]]
//! name = "accounts-default"
//! namespace = "accounts"
//! activate = true
//! development = false
//!
//! [package.exports.actions]
//! login = "LOGIN"
//!
//! [package.exports.deps.libs]
//! connection = "connection"
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use worona_registry::{Export, PackageDescriptor, Registry, RegistryError};

/// Errors from reading or applying a manifest.
#[derive(Debug, Error)]
pub enum ManifestError {
	#[error("I/O error reading {path}: {error}")]
	Io { path: PathBuf, error: std::io::Error },

	#[error("TOML parse error in {path}: {error}")]
	Parse { path: PathBuf, error: toml::de::Error },

	#[error("package #{index} ({name:?}): {error}")]
	Install { index: usize, name: String, error: RegistryError },
}

/// One `[[package]]` entry.
#[derive(Debug, Clone, Deserialize)]
pub struct ManifestPackage {
	#[serde(default)]
	pub name: String,
	#[serde(default)]
	pub namespace: String,
	/// Activate explicitly right after download.
	#[serde(default)]
	pub activate: bool,
	#[serde(default)]
	pub development: bool,
	#[serde(default = "empty_exports")]
	pub exports: serde_json::Value,
}

fn empty_exports() -> serde_json::Value {
	serde_json::Value::Object(serde_json::Map::new())
}

impl ManifestPackage {
	pub fn descriptor(&self) -> PackageDescriptor {
		PackageDescriptor::new(self.name.clone(), self.namespace.clone(), Export::from(self.exports.clone()))
	}
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Manifest {
	#[serde(default, rename = "package")]
	pub packages: Vec<ManifestPackage>,
}

impl Manifest {
	pub fn load(path: &Path) -> Result<Self, ManifestError> {
		let text = std::fs::read_to_string(path).map_err(|error| ManifestError::Io {
			path: path.to_path_buf(),
			error,
		})?;
		toml::from_str(&text).map_err(|error| ManifestError::Parse {
			path: path.to_path_buf(),
			error,
		})
	}

	/// Downloads every package in order, activating and flagging as requested.
	pub fn install(&self, registry: &Registry) -> Result<(), ManifestError> {
		for (index, package) in self.packages.iter().enumerate() {
			let wrap = |error| ManifestError::Install {
				index,
				name: package.name.clone(),
				error,
			};
			registry.package_downloaded(package.descriptor()).map_err(wrap)?;
			if package.activate {
				registry.package_activated(&package.name).map_err(wrap)?;
			}
			if package.development {
				registry.mark_development(package.name.clone());
			}
			tracing::debug!(name = %package.name, namespace = %package.namespace, "manifest.install");
		}
		Ok(())
	}

	/// Each package's dependency namespaces, extracted on a scratch registry.
	pub fn dependencies(&self) -> Result<Vec<(String, Vec<String>)>, ManifestError> {
		let scratch = Registry::new();
		for (index, package) in self.packages.iter().enumerate() {
			scratch.package_downloaded(package.descriptor()).map_err(|error| ManifestError::Install {
				index,
				name: package.name.clone(),
				error,
			})?;
		}
		self.packages
			.iter()
			.enumerate()
			.map(|(index, package)| {
				let deps = scratch.get_deps(&package.name).map_err(|error| ManifestError::Install {
					index,
					name: package.name.clone(),
					error,
				})?;
				Ok((package.name.clone(), deps))
			})
			.collect()
	}
}
