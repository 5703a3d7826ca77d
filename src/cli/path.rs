use std::path::PathBuf;

use clap::Parser;
use gedcom::Pointer;
use tracing::instrument;

use super::{Context, terminal::Colorize};

#[derive(Debug, Parser)]
#[command(about = "Find the chain of natural parents from an individual to an ancestor")]
pub struct Path {
    /// The GEDCOM file to read
    file: PathBuf,

    /// The descendant to start from
    #[clap(value_parser = super::parse_pointer)]
    from: Pointer,

    /// The ancestor to reach
    #[clap(value_parser = super::parse_pointer)]
    to: Pointer,
}

impl Path {
    #[instrument(level = "debug", skip(self, context))]
    pub fn run(self, context: &Context) -> anyhow::Result<()> {
        let tree = context.load(&self.file)?;
        let from = tree.individual(super::resolve(&tree, &self.from)?)?;
        let to = super::resolve(&tree, &self.to)?;

        let Some(path) = from.path_to_ancestor(to)? else {
            println!(
                "{}",
                format!("{} is not a natural ancestor of {}", self.to, self.from).warning()
            );
            std::process::exit(1);
        };

        let steps: Vec<String> = path
            .iter()
            .map(|&id| {
                let (given, surname) = tree
                    .individual(id)
                    .map(|individual| individual.name())
                    .unwrap_or_default();
                let pointer = tree[id]
                    .pointer()
                    .map_or_else(|| id.to_string(), ToString::to_string);
                format!("{} {given} {surname}", pointer.pointer())
                    .trim_end()
                    .to_string()
            })
            .collect();

        for (generation, step) in steps.iter().enumerate() {
            println!("{}{step}", "  ".repeat(generation));
        }
        Ok(())
    }
}
