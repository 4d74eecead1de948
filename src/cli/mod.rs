use clap::Parser;

use crate::extract::Options;
use crate::model::{ConfigError, KindMask};

const LINE_HELP: &str = "\
Each output line has the form

  <file>:<line>:<col>: <owner-pkg> <refer-pkg> <expr><kind>[+][ <type>]

where <kind> is one of const, type, var or func; a trailing + marks an
occurrence that is its own declaration; <type> appears only with -t.";

#[derive(Parser)]
#[command(
    name = "symgo",
    version,
    about = "Print a line for every symbol reference in the named Go packages",
    after_help = LINE_HELP
)]
pub struct Cli {
    /// Report expressions that fail to resolve
    #[arg(short = 'v', long)]
    pub verbose: bool,

    /// Comma-separated symbol kinds to report: const,type,var,func
    #[arg(short = 'k', long, value_name = "KINDS")]
    pub kinds: Option<String>,

    /// Append the resolved type to each line
    #[arg(short = 't', long = "types")]
    pub print_type: bool,

    /// Include predeclared (universe) symbols
    #[arg(short = 'a', long = "all")]
    pub include_all: bool,

    /// Import paths of the packages to scan
    #[arg(value_name = "PACKAGE", required = true)]
    pub packages: Vec<String>,
}

impl Cli {
    /// Translate parsed flags into engine options.
    pub fn options(&self) -> Result<Options, ConfigError> {
        let kinds = match &self.kinds {
            Some(tokens) => KindMask::parse(tokens)?,
            None => KindMask::all(),
        };
        Ok(Options {
            verbose: self.verbose,
            print_type: self.print_type,
            include_all: self.include_all,
            kinds,
        })
    }
}
