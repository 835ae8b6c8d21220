//! Worona bootstrap binary.
//!
//! Loads a TOML package manifest into the process-wide registry and answers
//! questions about it: dependency readiness, path resolution, locales and
//! development packages.

mod cli;
mod commands;
mod manifest;

use clap::Parser;
use cli::Cli;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
	let cli = Cli::parse();
	setup_tracing(cli.verbose);

	let registry = worona_registry::global();
	let mut stdout = std::io::stdout();
	commands::run(cli.command, registry, &mut stdout).await
}

fn setup_tracing(verbose: bool) {
	use tracing_subscriber::EnvFilter;

	let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
		if verbose {
			EnvFilter::new("worona=debug,worona_registry=trace")
		} else {
			EnvFilter::new("worona=info,warn")
		}
	});

	tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_writer(std::io::stderr)
		.with_target(true)
		.init();
}
