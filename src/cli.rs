use std::path::{Path, PathBuf};

mod family;
mod find;
mod marriages;
mod path;
mod pedigree;
mod report;
mod show;
mod terminal;
mod validate;

use clap::ArgAction;
use family::Family;
use find::Find;
use gedcom::{Config, ElementId, Pointer, Tree};
use marriages::Marriages;
use path::Path as PathCommand;
use pedigree::{Ancestors, Descendants};
use show::Show;
use tracing::instrument;
use validate::Validate;

/// Parse a pointer from a string, adding the flanking `@` if it is missing.
///
/// This is a CLI boundary function so that `I1` and `@I1@` both work.
fn parse_pointer(s: &str) -> Result<Pointer, String> {
    let s = s.trim();
    let pointer = if s.starts_with('@') {
        s.to_string()
    } else {
        format!("@{s}@")
    };
    pointer.parse().map_err(|e| format!("{e}"))
}

#[derive(Debug, clap::Parser)]
#[command(version, about)]
pub struct Cli {
    /// Verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Recover from malformed lines instead of rejecting the file
    #[arg(long, global = true)]
    lenient: bool,

    /// Path to a TOML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

impl Cli {
    pub fn run(self) -> anyhow::Result<()> {
        Self::setup_logging(self.verbose);

        let mut config = match &self.config {
            Some(path) => Config::load(path).map_err(|e| anyhow::anyhow!(e))?,
            None => Config::default(),
        };
        if self.lenient {
            config.strict = false;
        }

        let context = Context {
            parser: gedcom::Parser::new(config),
        };
        self.command.run(&context)
    }

    fn setup_logging(verbosity: u8) {
        use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

        let level = match verbosity {
            0 => tracing::Level::WARN,
            1 => tracing::Level::INFO,
            2 => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        };

        let filter = tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into());

        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_target(false)
            .with_thread_names(false)
            .with_line_number(false)
            .with_writer(std::io::stderr);

        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .init();
    }
}

/// State shared by every subcommand.
#[derive(Debug)]
pub struct Context {
    parser: gedcom::Parser,
}

impl Context {
    /// Parses the file at `path` with the configured parser.
    #[instrument(level = "debug", skip(self))]
    fn load(&self, path: &Path) -> anyhow::Result<Tree> {
        self.parser
            .parse_file(path)
            .map_err(|e| anyhow::anyhow!("Failed to parse {}: {e}", path.display()))
    }
}

/// Looks up the record declaring `pointer`.
fn resolve(tree: &Tree, pointer: &Pointer) -> anyhow::Result<ElementId> {
    tree.resolve(pointer)
        .ok_or_else(|| anyhow::anyhow!("No record declares {pointer}"))
}

#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
enum OutputFormat {
    #[default]
    Table,
    Json,
}

#[derive(Debug, clap::Parser)]
pub enum Command {
    /// Print records exactly as they appear in the file
    Show(Show),

    /// Check a file for parse errors, dangling references and pedigree cycles
    Validate(Validate),

    /// List the ancestors of an individual
    Ancestors(Ancestors),

    /// List the descendants of an individual
    Descendants(Descendants),

    /// Find the chain of natural parents from an individual to an ancestor
    Path(PathCommand),

    /// List the members of a family
    Family(Family),

    /// List the marriages of an individual
    Marriages(Marriages),

    /// List individuals matching criteria
    ///
    /// Criteria are colon-separated `key=value` pairs, for example
    /// `surname=Smith:birth_range=1800-1850`.
    Find(Find),
}

impl Command {
    fn run(self, context: &Context) -> anyhow::Result<()> {
        match self {
            Self::Show(command) => command.run(context)?,
            Self::Validate(command) => command.run(context)?,
            Self::Ancestors(command) => command.run(context)?,
            Self::Descendants(command) => command.run(context)?,
            Self::Path(command) => command.run(context)?,
            Self::Family(command) => command.run(context)?,
            Self::Marriages(command) => command.run(context)?,
            Self::Find(command) => command.run(context)?,
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    #[test]
    fn pointer_flanks_are_optional() {
        assert_eq!(parse_pointer("I1").unwrap().as_str(), "@I1@");
        assert_eq!(parse_pointer("@F2@").unwrap().as_str(), "@F2@");
        assert!(parse_pointer("@bad").is_err());
    }

    #[test]
    fn global_flags_follow_the_subcommand() {
        let cli = Cli::try_parse_from(["ged", "show", "tree.ged", "--lenient", "-vv"]).unwrap();
        assert!(cli.lenient);
        assert_eq!(cli.verbose, 2);
        assert!(matches!(cli.command, Command::Show(_)));
    }
}
