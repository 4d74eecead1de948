use std::io::{BufWriter, Write};

use anyhow::Result;
use clap::{CommandFactory, Parser};
use tracing::warn;
use tracing_subscriber::EnvFilter;

use symgo::cli::Cli;
use symgo::extract;
use symgo::loader::SearchPaths;
use symgo::resolver::Resolver;

fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let opts = match cli.options() {
        Ok(opts) => opts,
        Err(err) => {
            // Usage errors exit with code 2, like missing arguments.
            Cli::command()
                .error(clap::error::ErrorKind::InvalidValue, err)
                .exit()
        }
    };

    let paths = SearchPaths::from_env();
    if paths.is_empty() {
        warn!("no search roots configured; set GOPATH or GOROOT");
    }
    let resolver = Resolver::new(paths);

    let stdout = std::io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    for package in &cli.packages {
        // A package that fails to load is reported and skipped; the
        // remaining packages are still scanned.
        match extract::package_lines(&resolver, package, &opts) {
            Ok(lines) => {
                for line in lines {
                    writeln!(out, "{}", line)?;
                }
            }
            Err(err) => warn!("{:#}", err),
        }
    }
    out.flush()?;
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();
}
