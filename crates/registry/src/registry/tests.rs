use std::sync::atomic::{AtomicUsize, Ordering};

use pretty_assertions::assert_eq;
use rstest::rstest;
use serde_json::json;

use super::*;
use crate::hub::SubscriberFlow;

fn fake_module() -> Export {
	Export::from(json!({
		"reducers": { "one": 1, "two": 2 },
		"actions": { "three": 3, "four": 4 },
	}))
}

#[test]
fn legacy_add_package_is_immediately_resolvable() {
	let registry = Registry::new();
	registry.add_package(("fakeModule", fake_module())).expect("add");

	assert_eq!(registry.dep("fakeModule", &["reducers", "one"]).expect("dep").as_data(), Some(&json!(1)));
	assert_eq!(registry.dep("fakeModule", &["actions", "four"]).expect("dep").as_data(), Some(&json!(4)));
	assert_eq!(registry.activated("fakeModule").map(|p| p.name().to_string()), Some("fakeModule".into()));
}

#[test]
fn legacy_add_package_replaces_previous_payload() {
	let registry = Registry::new();
	registry.add_package(("ns", Export::from(json!({ "v": 1 })))).expect("add");
	registry.add_package(("ns", Export::from(json!({ "v": 2 })))).expect("add");
	assert_eq!(registry.dep("ns", &["v"]).expect("dep").as_data(), Some(&json!(2)));
}

#[test]
fn legacy_add_package_notifies_once() {
	let registry = Registry::new();
	let calls = Arc::new(AtomicUsize::new(0));
	let counted = Arc::clone(&calls);
	let _sub = registry.hub().subscribe(move |_| {
		counted.fetch_add(1, Ordering::SeqCst);
		SubscriberFlow::Keep
	});

	registry.add_package(("ns", fake_module())).expect("add");
	assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn legacy_add_package_rejects_name_owned_by_other_namespace() {
	let registry = Registry::new();
	registry.package_downloaded(PackageDescriptor::new("ns", "other", fake_module())).expect("download");

	let err = registry.add_package(("ns", Export::from(json!({ "v": 1 })))).expect_err("name collision");
	assert!(matches!(err, RegistryError::InvalidArgument(_)));
	assert!(registry.is_activated("other"));
	assert!(!registry.is_activated("ns"));
	assert_eq!(registry.downloaded("ns").map(|p| p.namespace().to_string()), Some("other".into()));
}

#[test]
fn descriptor_add_package_validates_fields() {
	let registry = Registry::new();
	let err = registry.add_package(PackageDescriptor::new("", "ns", fake_module())).expect_err("no name");
	assert_eq!(err, RegistryError::Validation { field: "name" });
}

#[test]
fn dep_without_path_returns_payload() {
	let registry = Registry::new();
	let payload = Arc::new(fake_module());
	registry.package_downloaded(PackageDescriptor::new("p", "ns", Arc::clone(&payload))).expect("download");

	let got = registry.dep("ns", &[]).expect("dep");
	assert!(Arc::ptr_eq(&got, &payload));
}

#[test]
fn dep_is_idempotent_by_reference() {
	let registry = Registry::new();
	registry.add_package(("ns", fake_module())).expect("add");

	let a = registry.dep("ns", &["actions"]).expect("dep");
	let b = registry.dep("ns", &["actions"]).expect("dep");
	assert!(Arc::ptr_eq(&a, &b));
}

#[rstest]
#[case("", &[], "invalid")]
#[case("ghost", &[], "not_loaded")]
#[case("ns", &["reducers", "three"], "missing")]
#[case("ns", &["actions", ""], "invalid")]
fn dep_failures(#[case] namespace: &str, #[case] path: &[&str], #[case] kind: &str) {
	let registry = Registry::new();
	registry.add_package(("ns", fake_module())).expect("add");

	let err = registry.dep(namespace, path).expect_err("should fail");
	let got = match err {
		RegistryError::InvalidArgument(_) => "invalid",
		RegistryError::NotLoaded { .. } => "not_loaded",
		RegistryError::MissingDependency { .. } => "missing",
		other => panic!("unexpected error: {other:?}"),
	};
	assert_eq!(got, kind);
}

#[test]
fn missing_dependency_names_dotted_path() {
	let registry = Registry::new();
	registry.add_package(("pkg", fake_module())).expect("add");
	let err = registry.dep("pkg", &["actions", "something"]).expect_err("missing");
	assert_eq!(err.to_string(), "missing dependency: 'pkg.actions.something'");
}

#[test]
fn not_loaded_names_namespace() {
	let registry = Registry::new();
	let err = registry.dep("accounts", &["actions"]).expect_err("not loaded");
	assert_eq!(
		err,
		RegistryError::NotLoaded {
			namespace: "accounts".into()
		}
	);
}

#[test]
fn subscribers_can_resolve_during_notification() {
	let registry = Registry::new();
	let seen = Arc::new(parking_lot::Mutex::new(None));

	let inner = registry.clone();
	let slot = Arc::clone(&seen);
	let _sub = registry.hub().subscribe(move |namespace| {
		*slot.lock() = inner.dep(namespace, &["actions", "three"]).ok().and_then(|e| e.as_data().cloned());
		SubscriberFlow::Remove
	});

	registry.add_package(("ns", fake_module())).expect("add");
	assert_eq!(*seen.lock(), Some(json!(3)));
}

#[test]
fn activating_unknown_package_is_not_found() {
	let registry = Registry::new();
	assert_eq!(registry.activate_package("nope"), Err(RegistryError::NotFound { name: "nope".into() }));
	assert_eq!(registry.deactivate_package("nope"), Err(RegistryError::NotFound { name: "nope".into() }));
}

#[test]
fn removed_package_is_no_longer_resolvable() {
	let registry = Registry::new();
	registry.add_package(("ns", fake_module())).expect("add");
	assert!(registry.package_removed("ns").is_some());
	assert!(matches!(registry.dep("ns", &[]), Err(RegistryError::NotLoaded { .. })));
	assert!(registry.package_names().is_empty());
}

#[test]
fn reducers_by_name_or_namespace() {
	let registry = Registry::new();
	registry.package_downloaded(PackageDescriptor::new("theme-default", "theme", fake_module())).expect("download");
	registry
		.package_downloaded(PackageDescriptor::new("bare", "bare-ns", Export::table()))
		.expect("download");

	let by_name = registry.get_reducers("theme-default").expect("by name");
	let by_namespace = registry.get_reducers("theme").expect("by namespace");
	assert!(Arc::ptr_eq(&by_name, &by_namespace));
	assert!(registry.get_reducers("bare").is_none());
	assert!(registry.get_reducers("missing").is_none());
}

#[test]
fn sagas_without_default_is_none() {
	let registry = Registry::new();
	registry
		.package_downloaded(PackageDescriptor::new("pkg", "ns", Export::from(json!({ "sagas": {} }))))
		.expect("download");
	assert!(registry.get_sagas("pkg").is_none());

	registry
		.package_downloaded(PackageDescriptor::new("pkg2", "ns2", Export::from(json!({ "sagas": { "default": "root" } }))))
		.expect("download");
	assert_eq!(registry.get_sagas("pkg2").and_then(|s| s.as_str().map(str::to_string)), Some("root".into()));
}

#[test]
fn locales_follow_activation() {
	let registry = Registry::new();
	let en = |greeting: &str| Export::from(json!({ "locales": { "en": { "hello": greeting } } }));
	registry.package_downloaded(PackageDescriptor::new("a-ext", "a", en("hi"))).expect("download");
	registry.package_downloaded(PackageDescriptor::new("a-ext2", "a", en("hey"))).expect("download");
	registry
		.package_downloaded(PackageDescriptor::new("b-ext", "b", Export::from(json!({ "locales": { "es": {} } }))))
		.expect("download");

	assert!(registry.get_locale("a-ext2", "en").is_some());
	assert!(registry.get_locale("b-ext", "en").is_none());

	let names = |locales: Vec<Locale>| locales.into_iter().map(|l| l.name).collect::<Vec<_>>();
	assert_eq!(names(registry.get_locales("en")), vec!["a-ext".to_string()]);

	registry.activate_package("a-ext2").expect("activate");
	assert_eq!(names(registry.get_locales("en")), vec!["a-ext2".to_string()]);
	assert_eq!(names(registry.get_locales("es")), vec!["b-ext".to_string()]);
}

#[test]
fn deps_are_deduplicated_in_first_seen_order() {
	let registry = Registry::new();
	registry
		.package_downloaded(PackageDescriptor::new(
			"pkg",
			"ns",
			Export::from(json!({ "deps": { "libs": { "x": "ns1" }, "types": { "y": "ns2", "z": "ns2" } } })),
		))
		.expect("download");
	registry.package_downloaded(PackageDescriptor::new("plain", "other", Export::table())).expect("download");

	assert_eq!(registry.get_deps("pkg").expect("deps"), vec!["ns1".to_string(), "ns2".to_string()]);
	assert_eq!(registry.get_deps("plain").expect("deps"), Vec::<String>::new());
	assert_eq!(registry.get_deps("ghost"), Err(RegistryError::NotFound { name: "ghost".into() }));
}

#[test]
fn development_view_tracks_activation() {
	let registry = Registry::new();
	registry.add_package(("ns", fake_module())).expect("add");
	assert!(registry.mark_development("ns"));

	let summaries = registry.development_packages();
	assert_eq!(summaries.len(), 1);
	assert!(summaries[0].activated);

	registry.deactivate_package("ns").expect("known");
	assert!(!registry.development_packages()[0].activated);
}

#[test]
fn global_registry_is_shared() {
	let a = crate::global();
	let b = crate::global();
	assert!(std::ptr::eq(a, b));
}
