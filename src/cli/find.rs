use std::path::PathBuf;

use clap::Parser;
use gedcom::Criteria;
use tracing::instrument;

use super::{Context, OutputFormat, report};

#[derive(Debug, Parser)]
#[command(about = "List individuals matching criteria")]
pub struct Find {
    /// The GEDCOM file to read
    file: PathBuf,

    /// Colon-separated `key=value` pairs
    ///
    /// Keys: surname, name, birth, death, birth_range, death_range.
    /// Ranges are written `from-to`.
    criteria: Criteria,

    /// Also list individuals flagged private
    #[arg(long)]
    include_private: bool,

    /// Output format
    #[arg(long, value_name = "FORMAT", default_value = "table")]
    output: OutputFormat,
}

impl Find {
    #[instrument(level = "debug", skip(self, context))]
    pub fn run(self, context: &Context) -> anyhow::Result<()> {
        let tree = context.load(&self.file)?;

        let matches: Vec<_> = tree
            .individuals()
            .filter(|individual| self.include_private || !individual.is_private())
            .filter(|individual| self.criteria.matches(individual))
            .map(|individual| individual.id())
            .collect();

        report::print_people(&tree, &matches, self.output)
    }
}
