//! The main entry point for the `treesub` command-line application.

use anyhow::Context;
use treesub::reporter::ConsoleReporter;
use treesub::{Substituter, cli, logging};

fn main() -> anyhow::Result<()> {
    let args = cli::parse_args();
    logging::init(args.verbose);

    let config = args.resolve().context("could not load configuration")?;
    let substituter = Substituter::new(config).context("invalid configuration")?;

    let mut reporter = ConsoleReporter::new(args.summary_format(), args.verbose, args.progress);
    substituter
        .run(&mut reporter)
        .context("could not start the worker pool")?;

    Ok(())
}
