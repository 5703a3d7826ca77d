use std::path::PathBuf;

use clap::Parser;
use gedcom::{ParentFilter, Pointer};
use tracing::instrument;

use super::{Context, OutputFormat, report};

#[derive(Debug, Parser)]
#[command(about = "List the ancestors of an individual")]
pub struct Ancestors {
    /// The GEDCOM file to read
    file: PathBuf,

    /// The individual whose ancestors to list
    #[clap(value_parser = super::parse_pointer)]
    pointer: Pointer,

    /// Follow only natural (genetic) parent links
    #[arg(long)]
    natural: bool,

    /// Output format
    #[arg(long, value_name = "FORMAT", default_value = "table")]
    output: OutputFormat,
}

impl Ancestors {
    #[instrument(level = "debug", skip(self, context))]
    pub fn run(self, context: &Context) -> anyhow::Result<()> {
        let tree = context.load(&self.file)?;
        let individual = tree.individual(super::resolve(&tree, &self.pointer)?)?;

        let filter = if self.natural {
            ParentFilter::Natural
        } else {
            ParentFilter::All
        };

        report::print_people(&tree, &individual.ancestors(filter), self.output)
    }
}

#[derive(Debug, Parser)]
#[command(about = "List the descendants of an individual")]
pub struct Descendants {
    /// The GEDCOM file to read
    file: PathBuf,

    /// The individual whose descendants to list
    #[clap(value_parser = super::parse_pointer)]
    pointer: Pointer,

    /// List only the children, not later generations
    #[arg(long)]
    children: bool,

    /// Output format
    #[arg(long, value_name = "FORMAT", default_value = "table")]
    output: OutputFormat,
}

impl Descendants {
    #[instrument(level = "debug", skip(self, context))]
    pub fn run(self, context: &Context) -> anyhow::Result<()> {
        let tree = context.load(&self.file)?;
        let individual = tree.individual(super::resolve(&tree, &self.pointer)?)?;

        let descendants = if self.children {
            individual.children()
        } else {
            individual.descendants()
        };

        report::print_people(&tree, &descendants, self.output)
    }
}
