use std::path::PathBuf;

use clap::Parser;
use gedcom::{ParseError, Tree, domain::DanglingReference};
use tracing::instrument;

use super::{Context, OutputFormat, terminal::Colorize};

#[derive(Debug, Parser)]
#[command(about = "Check a file for parse errors, dangling references and pedigree cycles")]
pub struct Validate {
    /// The GEDCOM file to read
    file: PathBuf,

    /// Output format
    #[arg(long, value_name = "FORMAT", default_value = "table")]
    output: OutputFormat,
}

#[derive(Debug, Default)]
struct ValidationResult {
    records: usize,
    individuals: usize,
    families: usize,
    dangling: Vec<DanglingReference>,
    cycles: Vec<Vec<String>>,
}

impl ValidationResult {
    fn has_issues(&self) -> bool {
        !self.dangling.is_empty() || !self.cycles.is_empty()
    }
}

impl Validate {
    #[instrument(level = "debug", skip(self, context))]
    pub fn run(self, context: &Context) -> anyhow::Result<()> {
        let tree = match context.parser.parse_file(&self.file) {
            Ok(tree) => tree,
            Err(error @ (ParseError::FormatViolation { .. } | ParseError::Encoding { .. })) => {
                eprintln!("{}", format!("✗ Format:     {error}").warning());
                std::process::exit(2);
            }
            Err(error) => return Err(error.into()),
        };

        let result = Self::check(&tree);

        match self.output {
            OutputFormat::Table => Self::output_table(&result, &tree),
            OutputFormat::Json => Self::output_json(&result, &tree)?,
        }

        if result.has_issues() {
            std::process::exit(2);
        }

        Ok(())
    }

    fn check(tree: &Tree) -> ValidationResult {
        let label = |id: gedcom::ElementId| {
            tree[id]
                .pointer()
                .map_or_else(|| id.to_string(), ToString::to_string)
        };

        ValidationResult {
            records: tree.records().len(),
            individuals: tree.individuals().count(),
            families: tree.families().count(),
            dangling: tree.dangling_references(),
            cycles: tree
                .pedigree_cycles()
                .into_iter()
                .map(|cycle| cycle.into_iter().map(&label).collect())
                .collect(),
        }
    }

    fn output_table(result: &ValidationResult, tree: &Tree) {
        println!(
            "{}",
            format!(
                "✓ Format:     {} records ({} individuals, {} families)",
                result.records, result.individuals, result.families
            )
            .success()
        );

        if result.dangling.is_empty() {
            println!("{}", "✓ References: all role links resolve".success());
        } else {
            println!(
                "{}",
                format!("✗ References: {} dangling", result.dangling.len()).warning()
            );
            for reference in &result.dangling {
                let record = tree[reference.record]
                    .pointer()
                    .map_or_else(|| reference.record.to_string(), ToString::to_string);
                println!(
                    "  • {} {} {}",
                    record.pointer(),
                    reference.tag,
                    reference.target.dim()
                );
            }
        }

        if result.cycles.is_empty() {
            println!("{}", "✓ Pedigree:   no individual is their own ancestor".success());
        } else {
            println!(
                "{}",
                format!("✗ Pedigree:   {} cycles", result.cycles.len()).warning()
            );
            for cycle in &result.cycles {
                println!("  • {}", cycle.join(" → "));
            }
        }
    }

    fn output_json(result: &ValidationResult, tree: &Tree) -> anyhow::Result<()> {
        use serde_json::json;

        let dangling: Vec<_> = result
            .dangling
            .iter()
            .map(|reference| {
                json!({
                    "record": tree[reference.record].pointer().map(ToString::to_string),
                    "tag": reference.tag,
                    "target": reference.target,
                })
            })
            .collect();

        let output = json!({
            "status": if result.has_issues() { "issues_found" } else { "healthy" },
            "records": result.records,
            "individuals": result.individuals,
            "families": result.families,
            "dangling_references": dangling,
            "pedigree_cycles": result.cycles,
        });

        println!("{}", serde_json::to_string_pretty(&output)?);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn check_counts_and_issues() {
        let tree = gedcom::parse_str(
            "0 HEAD\n0 @I1@ INDI\n1 FAMS @F1@\n1 FAMC @F1@\n0 @F1@ FAM\n1 HUSB @I1@\n1 CHIL @I1@\n1 WIFE @I2@\n0 TRLR\n",
        )
        .unwrap();

        let result = Validate::check(&tree);
        assert_eq!(result.records, 4);
        assert_eq!(result.individuals, 1);
        assert_eq!(result.families, 1);
        assert_eq!(result.dangling.len(), 1);
        assert_eq!(result.dangling[0].target, "@I2@");
        assert_eq!(result.cycles, vec![vec!["@I1@".to_string()]]);
        assert!(result.has_issues());
    }
}
