//! Subcommand implementations.

use std::io::Write;
use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use worona_registry::{Registry, RegistryError};

use crate::cli::Command;
use crate::manifest::Manifest;

pub async fn run(command: Command, registry: &Registry, out: &mut impl Write) -> anyhow::Result<()> {
	match command {
		Command::Check { manifest, timeout_ms } => check(&manifest, registry, Duration::from_millis(timeout_ms), out).await,
		Command::Dep {
			manifest,
			namespace,
			segments,
		} => dep(&manifest, registry, &namespace, &segments, out),
		Command::Locales { manifest, lang } => locales(&manifest, registry, &lang, out),
		Command::Inspect { manifest } => inspect(&manifest, registry, out),
	}
}

fn load(path: &Path, registry: &Registry) -> anyhow::Result<()> {
	let manifest = Manifest::load(path)?;
	manifest.install(registry)?;
	tracing::info!(path = %path.display(), packages = manifest.packages.len(), "manifest loaded");
	Ok(())
}

/// Subscribes a waiter per package before loading anything, then loads the
/// manifest in order and reports each waiter's outcome.
async fn check(path: &Path, registry: &Registry, timeout: Duration, out: &mut impl Write) -> anyhow::Result<()> {
	let manifest = Manifest::load(path)?;
	let waiters: Vec<_> = manifest
		.dependencies()?
		.into_iter()
		.map(|(name, namespaces)| {
			let ready = registry.wait_for_deps(&namespaces, Some(timeout));
			(name, namespaces, ready)
		})
		.collect();

	manifest.install(registry)?;

	let mut unresolved = 0usize;
	for (name, namespaces, ready) in waiters {
		match ready.await {
			Ok(()) if namespaces.is_empty() => writeln!(out, "ready    {name}")?,
			Ok(()) => writeln!(out, "ready    {name} ({})", namespaces.join(", "))?,
			Err(RegistryError::Timeout { pending, .. }) => {
				unresolved += 1;
				writeln!(out, "timeout  {name} waiting on {}", pending.join(", "))?;
			}
			Err(other) => return Err(other).with_context(|| format!("waiting for dependencies of {name}")),
		}
	}

	if unresolved > 0 {
		anyhow::bail!("{unresolved} package(s) have unresolved dependencies");
	}
	Ok(())
}

fn dep(path: &Path, registry: &Registry, namespace: &str, segments: &[String], out: &mut impl Write) -> anyhow::Result<()> {
	load(path, registry)?;
	let segments: Vec<&str> = segments.iter().map(String::as_str).collect();
	let export = registry.dep(namespace, &segments)?;
	writeln!(out, "{}", serde_json::to_string_pretty(export.as_ref())?)?;
	Ok(())
}

fn locales(path: &Path, registry: &Registry, lang: &str, out: &mut impl Write) -> anyhow::Result<()> {
	load(path, registry)?;
	let locales: serde_json::Map<String, serde_json::Value> = registry
		.get_locales(lang)
		.into_iter()
		.map(|locale| (locale.namespace, locale.value.to_json()))
		.collect();
	writeln!(out, "{}", serde_json::to_string_pretty(&locales)?)?;
	Ok(())
}

fn inspect(path: &Path, registry: &Registry, out: &mut impl Write) -> anyhow::Result<()> {
	load(path, registry)?;
	writeln!(out, "{}", serde_json::to_string_pretty(&registry.development_packages())?)?;
	Ok(())
}
