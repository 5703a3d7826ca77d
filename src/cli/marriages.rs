use std::path::PathBuf;

use clap::Parser;
use gedcom::Pointer;
use tracing::instrument;

use super::{Context, OutputFormat, terminal::Colorize};

#[derive(Debug, Parser)]
#[command(about = "List the marriages of an individual")]
pub struct Marriages {
    /// The GEDCOM file to read
    file: PathBuf,

    /// The individual whose marriages to list
    #[clap(value_parser = super::parse_pointer)]
    pointer: Pointer,

    /// Output format
    #[arg(long, value_name = "FORMAT", default_value = "table")]
    output: OutputFormat,
}

impl Marriages {
    #[instrument(level = "debug", skip(self, context))]
    pub fn run(self, context: &Context) -> anyhow::Result<()> {
        let tree = context.load(&self.file)?;
        let individual = tree.individual(super::resolve(&tree, &self.pointer)?)?;
        let marriages = individual.marriages();

        match self.output {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&marriages)?),
            OutputFormat::Table => {
                if marriages.is_empty() {
                    println!("{}", "No marriages recorded".dim());
                }
                for marriage in &marriages {
                    println!(
                        "{:<16} {}",
                        marriage.date.unwrap_or("?"),
                        marriage.place.unwrap_or_default()
                    );
                }
            }
        }

        Ok(())
    }
}
