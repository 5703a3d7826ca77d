use std::path::PathBuf;

use clap::Parser;
use gedcom::{Element, Pointer, Tree};
use tracing::instrument;

use super::{Context, terminal::Colorize};

#[derive(Debug, Parser)]
#[command(about = "Print records exactly as they appear in the file")]
pub struct Show {
    /// The GEDCOM file to read
    file: PathBuf,

    /// The record to print (the whole file when omitted)
    #[clap(value_parser = super::parse_pointer)]
    pointer: Option<Pointer>,

    /// Print only the record's own line, without its sub-records
    #[arg(long)]
    shallow: bool,

    /// Print the decoded value of the record (continuations joined)
    #[arg(long, conflicts_with = "shallow")]
    value: bool,
}

impl Show {
    #[instrument(level = "debug", skip(self, context))]
    pub fn run(self, context: &Context) -> anyhow::Result<()> {
        let tree = context.load(&self.file)?;

        let Some(pointer) = &self.pointer else {
            for &id in tree.element_list() {
                print!("{}", paint(&tree[id]));
            }
            return Ok(());
        };

        let id = super::resolve(&tree, pointer)?;
        if self.value {
            println!("{}", tree.multi_line_value(id));
        } else if self.shallow {
            print!("{}", paint(&tree[id]));
        } else {
            print_subtree(&tree, id);
        }
        Ok(())
    }
}

fn print_subtree(tree: &Tree, id: gedcom::ElementId) {
    for descendant in tree.descendants(id) {
        print!("{}", paint(&tree[descendant]));
    }
}

/// Formats one line as [`Element::to_gedcom_line`] does, highlighting the
/// pointer and tag when the terminal supports colour.
fn paint(element: &Element) -> String {
    let mut line = element.level().to_string();
    if let Some(pointer) = element.pointer() {
        line.push(' ');
        line.push_str(&pointer.pointer());
    }
    line.push(' ');
    line.push_str(&element.tag().tag());
    if !element.value().is_empty() {
        line.push(' ');
        line.push_str(element.value());
    }
    line.push_str(element.terminator().as_str());
    line
}
