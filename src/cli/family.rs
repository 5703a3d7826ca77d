use std::path::PathBuf;

use clap::Parser;
use gedcom::{ElementId, FamilyRole, MemberFilter, Pointer, Tree};
use tracing::instrument;

use super::{Context, OutputFormat, report};

#[derive(Debug, Parser)]
#[command(about = "List the members of a family")]
pub struct Family {
    /// The GEDCOM file to read
    file: PathBuf,

    /// A family, or an individual whose families to list
    #[clap(value_parser = super::parse_pointer)]
    pointer: Pointer,

    /// Which members to list
    #[arg(long, value_enum, default_value = "all")]
    role: Role,

    /// For an individual: list the families they are a child in rather than
    /// those they are a spouse in
    #[arg(long)]
    as_child: bool,

    /// Output format
    #[arg(long, value_name = "FORMAT", default_value = "table")]
    output: OutputFormat,
}

#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
enum Role {
    /// Husband, wife and children
    #[default]
    All,
    /// Husband and wife
    Parents,
    /// The husband
    Father,
    /// The wife
    Mother,
    /// The children
    Children,
}

impl From<Role> for MemberFilter {
    fn from(role: Role) -> Self {
        match role {
            Role::All => Self::All,
            Role::Parents => Self::Parents,
            Role::Father => Self::Father,
            Role::Mother => Self::Mother,
            Role::Children => Self::Children,
        }
    }
}

impl Family {
    #[instrument(level = "debug", skip(self, context))]
    pub fn run(self, context: &Context) -> anyhow::Result<()> {
        let tree = context.load(&self.file)?;
        let id = super::resolve(&tree, &self.pointer)?;

        let members = self.members(&tree, id)?;
        report::print_people(&tree, &members, self.output)
    }

    fn members(&self, tree: &Tree, id: ElementId) -> anyhow::Result<Vec<ElementId>> {
        let filter = MemberFilter::from(self.role);

        if tree[id].is_family() {
            return Ok(tree.family(id)?.members(filter));
        }

        let role = if self.as_child {
            FamilyRole::Child
        } else {
            FamilyRole::Spouse
        };

        let mut members = Vec::new();
        for family in tree.individual(id)?.families(role) {
            for member in family.members(filter) {
                if !members.contains(&member) {
                    members.push(member);
                }
            }
        }
        Ok(members)
    }
}
