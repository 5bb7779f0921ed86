//! Conversion between full person names and person ids.
//!
//! A full name is split at its first whitespace run: the first token is the
//! given name and the remainder is the surname, so `"Ludwig van Beethoven"`
//! becomes given name `"Ludwig"` and surname `"van Beethoven"`. A single token
//! is a surname without given name.

use crate::catalog_store::{CatalogError, CatalogResult, Person, PersonStore, Repository};
use thiserror::Error;
use tracing::debug;

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct PersonName {
    pub given_name: Option<String>,
    pub surname: String,
}

/// Splits a full name, or returns `None` when it is blank.
pub fn split_full_name(full_name: &str) -> Option<PersonName> {
    let trimmed = full_name.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(match trimmed.split_once(char::is_whitespace) {
        Some((given_name, surname)) => PersonName {
            given_name: Some(given_name.to_string()),
            surname: surname.trim_start().to_string(),
        },
        None => PersonName {
            given_name: None,
            surname: trimmed.to_string(),
        },
    })
}

pub fn format_full_name(given_name: Option<&str>, surname: &str) -> String {
    format!("{} {}", given_name.unwrap_or(""), surname)
        .trim()
        .to_string()
}

pub fn display_name(person: &Person) -> String {
    format_full_name(person.given_name.as_deref(), &person.surname)
}

#[derive(Debug, Error)]
pub enum ResolutionError {
    #[error("Person names must not be blank")]
    BlankName,

    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

pub struct NameResolver<'a> {
    persons: &'a dyn PersonStore,
}

impl<'a> NameResolver<'a> {
    pub fn new(persons: &'a dyn PersonStore) -> Self {
        NameResolver { persons }
    }

    /// Resolves each name to a person id, creating missing persons.
    ///
    /// Ids are returned in input order and repeated names yield repeated ids.
    /// All names are checked before the first store call.
    pub fn names_to_ids(&self, full_names: &[String]) -> Result<Vec<i64>, ResolutionError> {
        let names = full_names
            .iter()
            .map(|n| split_full_name(n).ok_or(ResolutionError::BlankName))
            .collect::<Result<Vec<_>, _>>()?;

        let mut ids = Vec::with_capacity(names.len());
        for name in names {
            let person = self
                .persons
                .find_or_create(&name.surname, name.given_name.as_deref())?;
            ids.push(person.id);
        }
        Ok(ids)
    }

    /// Formats each id as a display name. Unknown ids are skipped, so the
    /// result can be shorter than the input.
    pub fn ids_to_names(&self, ids: &[i64]) -> CatalogResult<Vec<String>> {
        let mut names = Vec::with_capacity(ids.len());
        for id in ids {
            match self.persons.find_by_id(*id)? {
                Some(person) => names.push(display_name(&person)),
                None => debug!("Skipping unknown person id {} in name lookup", id),
            }
        }
        Ok(names)
    }
}
