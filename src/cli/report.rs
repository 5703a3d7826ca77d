//! Tabular and JSON listings of individuals.

use gedcom::{ElementId, Tree};
use serde::Serialize;

use super::{
    OutputFormat,
    terminal::{self, Colorize},
};

/// One line of a listing.
#[derive(Debug, Serialize)]
pub struct Row {
    pointer: String,
    given: String,
    surname: String,
    birth: Option<i32>,
    death: Option<i32>,
}

impl Row {
    /// Summarises an element; records that are not individuals keep only
    /// their pointer.
    pub fn new(tree: &Tree, id: ElementId) -> Self {
        let pointer = tree[id]
            .pointer()
            .map_or_else(|| id.to_string(), ToString::to_string);

        match tree.individual(id) {
            Ok(individual) => {
                let (given, surname) = individual.name();
                Self {
                    pointer,
                    given,
                    surname,
                    birth: individual.birth_year(),
                    death: individual.death_year(),
                }
            }
            Err(_) => Self {
                pointer,
                given: String::new(),
                surname: String::new(),
                birth: None,
                death: None,
            },
        }
    }

    fn lifespan(&self) -> String {
        match (self.birth, self.death) {
            (None, None) => String::new(),
            (birth, death) => format!(
                "({}-{})",
                birth.map(|y| y.to_string()).unwrap_or_default(),
                death.map(|y| y.to_string()).unwrap_or_default()
            ),
        }
    }
}

/// Prints `ids` as a table or as a JSON array.
pub fn print_people(tree: &Tree, ids: &[ElementId], format: OutputFormat) -> anyhow::Result<()> {
    let rows: Vec<Row> = ids.iter().map(|&id| Row::new(tree, id)).collect();

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&rows)?),
        OutputFormat::Table => {
            if rows.is_empty() {
                println!("{}", "No individuals found".dim());
                return Ok(());
            }

            let width = rows.iter().map(|row| row.pointer.len()).max().unwrap_or(0);
            let max_name = terminal::terminal_width()
                .map_or(usize::MAX, |w| usize::from(w).saturating_sub(width + 16).max(10));

            for row in &rows {
                let mut name = format!("{} {}", row.given, row.surname.to_uppercase())
                    .trim()
                    .to_string();
                if name.chars().count() > max_name {
                    name = name.chars().take(max_name.saturating_sub(1)).collect();
                    name.push('…');
                }
                let pointer = format!("{:<width$}", row.pointer);
                println!("{}  {name} {}", pointer.pointer(), row.lifespan().dim());
            }
        }
    }

    Ok(())
}
