//! Runtime package registry for independently loaded plugin modules.
//!
//! Packages register under a namespace; consumers pull capabilities from a
//! namespace by path without holding a reference to the providing module.
//! Loading order does not matter: a consumer either resolves synchronously
//! with [`Registry::dep`] or first awaits [`Registry::wait_for_deps`].
//!
//! # Lifecycle
//!
//! - **download**: [`Registry::package_downloaded`] records a package by
//!   name. The first package seen for a namespace becomes its activated one.
//! - **activate**: [`Registry::package_activated`] makes a package live for
//!   its namespace. Last activation wins.
//! - **deactivate**: [`Registry::package_deactivated`] clears the namespace
//!   if that package is the live one.
//!
//! Every activation notifies subscribers synchronously, before the call
//! returns, so a waiter completed by an activation is settled by then.
//!
//! ```
//! use worona_registry::{Export, PackageDescriptor, Registry};
//!
//! let registry = Registry::new();
//! registry
//! 	.package_downloaded(PackageDescriptor::new(
//! 		"accounts-default",
//! 		"accounts",
//! 		Export::table().with("actions", Export::table().with("login", "LOGIN")),
//! 	))
//! 	.unwrap();
//!
//! let login = registry.dep("accounts", &["actions", "login"]).unwrap();
//! assert_eq!(login.as_str(), Some("LOGIN"));
//! ```

pub mod dev;
pub mod error;
pub mod export;
pub mod hub;
pub mod path;
mod registry;
pub mod store;
mod wait;

use std::sync::OnceLock;

pub use dev::{DevelopmentPackages, PackageSummary};
pub use error::{RegistryError, Result};
pub use export::{Export, ExportTable};
pub use hub::{DepSubscriberHub, SubscriberFlow, Subscription, SubscriptionGuard, SubscriptionId};
pub use registry::{AddPackage, Locale, Registry};
pub use store::{DownloadedPackage, PackageDescriptor};
pub use wait::DepsReady;

/// The process-wide default registry.
///
/// Meant for the outermost composition layer; libraries and tests should
/// take a [`Registry`] explicitly.
pub fn global() -> &'static Registry {
	static GLOBAL: OnceLock<Registry> = OnceLock::new();
	GLOBAL.get_or_init(Registry::new)
}
