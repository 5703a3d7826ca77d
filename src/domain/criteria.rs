use std::{num::ParseIntError, str::FromStr};

use thiserror::Error;
use tracing::debug;

use crate::domain::Individual;

/// A single predicate of a [`Criteria`] string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Criterion {
    /// `surname=<text>`: case-insensitive substring of the surname.
    Surname(String),
    /// `name=<text>`: case-insensitive substring of the given name.
    GivenName(String),
    /// `birth=<year>`: exact birth year.
    Birth(i32),
    /// `death=<year>`: exact death year.
    Death(i32),
    /// `birth_range=<from>-<to>`: inclusive range of birth years.
    BirthRange(i32, i32),
    /// `death_range=<from>-<to>`: inclusive range of death years.
    DeathRange(i32, i32),
}

impl Criterion {
    /// Whether `individual` satisfies this predicate.
    #[must_use]
    pub fn matches(&self, individual: &Individual) -> bool {
        match self {
            Self::Surname(name) => individual.surname_match(name),
            Self::GivenName(name) => individual.given_name_match(name),
            Self::Birth(year) => individual.birth_year_match(*year),
            Self::Death(year) => individual.death_year_match(*year),
            Self::BirthRange(from, to) => individual.birth_range_match(*from, *to),
            Self::DeathRange(from, to) => individual.death_range_match(*from, *to),
        }
    }
}

/// A conjunction of predicates, written as colon-separated `key=value` pairs.
///
/// ```
/// use gedcom::Criteria;
///
/// let criteria: Criteria = "surname=Smith:birth_range=1800-1850".parse().unwrap();
/// assert_eq!(criteria.criteria().len(), 2);
/// ```
///
/// Keys that are not recognised are dropped while parsing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Criteria(Vec<Criterion>);

impl Criteria {
    /// The parsed predicates, in the order they were written.
    #[must_use]
    pub fn criteria(&self) -> &[Criterion] {
        &self.0
    }

    /// Whether `individual` satisfies every predicate.
    #[must_use]
    pub fn matches(&self, individual: &Individual) -> bool {
        self.0.iter().all(|criterion| criterion.matches(individual))
    }
}

/// Errors produced while parsing a criteria string.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CriteriaError {
    /// A predicate is not of the form `key=value`.
    #[error("expected 'key=value', found '{0}'")]
    MissingValue(String),

    /// A year could not be parsed.
    #[error("invalid year '{value}' for '{key}'")]
    InvalidYear {
        /// The key the year belongs to.
        key: String,
        /// The offending text.
        value: String,
        /// The underlying parse failure.
        #[source]
        source: ParseIntError,
    },

    /// A range is not of the form `from-to`.
    #[error("expected 'from-to' for '{key}', found '{value}'")]
    InvalidRange {
        /// The key the range belongs to.
        key: String,
        /// The offending text.
        value: String,
    },
}

fn parse_year(key: &str, value: &str) -> Result<i32, CriteriaError> {
    value
        .trim()
        .parse()
        .map_err(|source| CriteriaError::InvalidYear {
            key: key.to_string(),
            value: value.to_string(),
            source,
        })
}

fn parse_range(key: &str, value: &str) -> Result<(i32, i32), CriteriaError> {
    let parts: Vec<&str> = value.split('-').collect();
    let [from, to] = parts.as_slice() else {
        return Err(CriteriaError::InvalidRange {
            key: key.to_string(),
            value: value.to_string(),
        });
    };
    Ok((parse_year(key, from)?, parse_year(key, to)?))
}

impl FromStr for Criteria {
    type Err = CriteriaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut criteria = Vec::new();

        for predicate in s.split(':') {
            let parts: Vec<&str> = predicate.split('=').collect();
            let [key, value] = parts.as_slice() else {
                return Err(CriteriaError::MissingValue(predicate.to_string()));
            };

            let criterion = match *key {
                "surname" => Criterion::Surname((*value).to_string()),
                "name" => Criterion::GivenName((*value).to_string()),
                "birth" => Criterion::Birth(parse_year(key, value)?),
                "death" => Criterion::Death(parse_year(key, value)?),
                "birth_range" | "birth-range" => {
                    let (from, to) = parse_range(key, value)?;
                    Criterion::BirthRange(from, to)
                }
                "death_range" | "death-range" => {
                    let (from, to) = parse_range(key, value)?;
                    Criterion::DeathRange(from, to)
                }
                _ => {
                    debug!(key, "ignoring unknown criteria key");
                    continue;
                }
            };
            criteria.push(criterion);
        }

        Ok(Self(criteria))
    }
}
