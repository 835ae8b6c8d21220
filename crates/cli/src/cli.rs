//! CLI schema for the worona binary.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "worona")]
#[command(about = "Load worona package manifests and inspect the resulting registry")]
pub struct Cli {
	/// Verbose logging
	#[arg(short, long, global = true)]
	pub verbose: bool,

	#[command(subcommand)]
	pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
	/// Load a manifest and report whether every package's dependencies became ready
	Check {
		#[arg(value_name = "MANIFEST")]
		manifest: PathBuf,

		/// How long each package may wait for its dependencies
		#[arg(long, value_name = "MS", default_value_t = 1000)]
		timeout_ms: u64,
	},
	/// Resolve a dependency path and print it as JSON
	Dep {
		#[arg(value_name = "MANIFEST")]
		manifest: PathBuf,

		namespace: String,

		/// Path segments below the namespace
		segments: Vec<String>,
	},
	/// Print every activated locale for a language
	Locales {
		#[arg(value_name = "MANIFEST")]
		manifest: PathBuf,

		lang: String,
	},
	/// Print the redacted view of development packages
	Inspect {
		#[arg(value_name = "MANIFEST")]
		manifest: PathBuf,
	},
}
