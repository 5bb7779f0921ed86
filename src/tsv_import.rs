//! Bulk import of pieces from a tab separated spreadsheet export.
//!
//! Expected columns, after a header row: title, composers, arrangers, genre,
//! digitized. Person cells hold `;` separated names, each either in
//! `"Surname, Given"` form or a plain full name. A row whose title already
//! exists updates that piece, otherwise a new piece is created.

use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use csv::{ReaderBuilder, StringRecord};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::catalog_store::{
    CatalogError, NewPiece, PersonStore, PiecePatch, PieceStore, Repository,
};
use crate::name_resolution::{split_full_name, PersonName};

const EXPECTED_COLUMNS: usize = 5;

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("Failed to read input: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed TSV input: {0}")]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

/// Parses one name from a person cell. The comma form wins over splitting
/// on whitespace, so `"van Beethoven, Ludwig"` keeps its multi-word surname.
pub fn parse_import_name(raw: &str) -> Option<PersonName> {
    let raw = raw.trim();
    match raw.split_once(',') {
        Some((surname, given_name)) => {
            let surname = surname.trim();
            if surname.is_empty() {
                return None;
            }
            let given_name = given_name.trim();
            Some(PersonName {
                given_name: (!given_name.is_empty()).then(|| given_name.to_string()),
                surname: surname.to_string(),
            })
        }
        None => split_full_name(raw),
    }
}

fn parse_person_cell(cell: &str) -> Vec<PersonName> {
    cell.split(';')
        .filter(|name| !name.trim().is_empty())
        .filter_map(|name| {
            let parsed = parse_import_name(name);
            if parsed.is_none() {
                warn!("Ignoring unparsable person name '{}'", name.trim());
            }
            parsed
        })
        .collect()
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TsvRow {
    pub title: String,
    pub composers: Vec<PersonName>,
    pub arrangers: Vec<PersonName>,
    pub genre: Option<String>,
    pub digitized: bool,
}

impl TsvRow {
    /// `Err` carries the reason the row is skipped.
    fn parse(record: &StringRecord) -> Result<Self, String> {
        if record.len() < EXPECTED_COLUMNS {
            return Err(format!(
                "expected {} columns, found {}",
                EXPECTED_COLUMNS,
                record.len()
            ));
        }
        let title = record[0].trim();
        if title.is_empty() {
            return Err("blank title".to_string());
        }
        let genre = record[3].trim();
        Ok(TsvRow {
            title: title.to_string(),
            composers: parse_person_cell(&record[1]),
            arrangers: parse_person_cell(&record[2]),
            genre: (!genre.is_empty()).then(|| genre.to_string()),
            digitized: record[4].trim().eq_ignore_ascii_case("TRUE"),
        })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ImportAction {
    Created,
    Updated,
    Skipped,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RowOutcome {
    pub line: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub action: ImportAction,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub piece_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    pub created: usize,
    pub updated: usize,
    pub skipped: usize,
}

#[derive(Clone, Debug, Default, Serialize)]
pub struct ImportReport {
    pub summary: ImportSummary,
    pub rows: Vec<RowOutcome>,
}

impl ImportReport {
    fn record(&mut self, outcome: RowOutcome) {
        match outcome.action {
            ImportAction::Created => self.summary.created += 1,
            ImportAction::Updated => self.summary.updated += 1,
            ImportAction::Skipped => self.summary.skipped += 1,
        }
        self.rows.push(outcome);
    }
}

pub struct TsvImporter<'a> {
    persons: &'a dyn PersonStore,
    pieces: &'a dyn PieceStore,
    person_ids: HashMap<PersonName, i64>,
}

impl<'a> TsvImporter<'a> {
    pub fn new(persons: &'a dyn PersonStore, pieces: &'a dyn PieceStore) -> Self {
        TsvImporter {
            persons,
            pieces,
            person_ids: HashMap::new(),
        }
    }

    pub fn import_file(&mut self, path: &Path) -> Result<ImportReport, ImportError> {
        let file = std::fs::File::open(path)?;
        self.import(std::io::BufReader::new(file))
    }

    pub fn import<R: Read>(&mut self, reader: R) -> Result<ImportReport, ImportError> {
        let mut rdr = ReaderBuilder::new()
            .delimiter(b'\t')
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        let mut report = ImportReport::default();
        for (row_idx, result) in rdr.records().enumerate() {
            let record = result?;
            // +2 for 1-indexed and header row
            let line = record
                .position()
                .map(|p| p.line())
                .unwrap_or(row_idx as u64 + 2);

            let outcome = match TsvRow::parse(&record) {
                Ok(row) => self.import_row(line, row)?,
                Err(reason) => {
                    warn!("Skipping line {}: {}", line, reason);
                    RowOutcome {
                        line,
                        title: None,
                        action: ImportAction::Skipped,
                        piece_id: None,
                        reason: Some(reason),
                    }
                }
            };
            report.record(outcome);
        }

        info!(
            "Import finished: {} created, {} updated, {} skipped",
            report.summary.created, report.summary.updated, report.summary.skipped
        );
        Ok(report)
    }

    fn resolve(&mut self, names: &[PersonName]) -> Result<Vec<i64>, CatalogError> {
        let mut ids = Vec::with_capacity(names.len());
        for name in names {
            let id = match self.person_ids.get(name) {
                Some(id) => *id,
                None => {
                    let person = self
                        .persons
                        .find_or_create(&name.surname, name.given_name.as_deref())?;
                    self.person_ids.insert(name.clone(), person.id);
                    person.id
                }
            };
            ids.push(id);
        }
        Ok(ids)
    }

    fn import_row(&mut self, line: u64, row: TsvRow) -> Result<RowOutcome, CatalogError> {
        let composer_ids = self.resolve(&row.composers)?;
        let arranger_ids = self.resolve(&row.arrangers)?;

        let (action, piece) = match self.pieces.find_by_title(&row.title)? {
            Some(existing) => {
                let patch = PiecePatch {
                    title: None,
                    genre: Some(row.genre),
                    year: None,
                    difficulty: None,
                    digitized: Some(Some(row.digitized)),
                    composer_ids: Some(composer_ids),
                    arranger_ids: Some(arranger_ids),
                };
                let updated = self.pieces.update(existing.piece.id, patch)?;
                (ImportAction::Updated, updated)
            }
            None => {
                let created = self.pieces.create(NewPiece {
                    title: row.title.clone(),
                    genre: row.genre,
                    digitized: Some(row.digitized),
                    composer_ids,
                    arranger_ids,
                    ..Default::default()
                })?;
                (ImportAction::Created, created)
            }
        };

        debug!("Line {}: {:?} piece {} '{}'", line, action, piece.piece.id, row.title);
        Ok(RowOutcome {
            line,
            title: Some(row.title),
            action,
            piece_id: Some(piece.piece.id),
            reason: None,
        })
    }
}
