//! Test fixture creation for the catalog database
//!
//! The catalog is seeded through the store API, so ids follow insertion
//! order and match the values in constants.rs.

use super::constants::*;
use anyhow::{ensure, Result};
use sheet_catalog_server::catalog_store::{
    NewPerson, NewPiece, PersonStore, Repository, SqliteCatalogStore,
};
use std::path::PathBuf;
use tempfile::TempDir;

fn seed_person(persons: &dyn PersonStore, surname: &str, given_name: Option<&str>, id: i64) -> Result<()> {
    let person = persons.create(NewPerson {
        surname: surname.to_string(),
        given_name: given_name.map(str::to_string),
    })?;
    ensure!(person.id == id, "Seeded {} got id {}, expected {}", surname, person.id, id);
    Ok(())
}

/// Creates a temporary catalog with 4 persons and 4 pieces
/// Returns (temp_dir, catalog_db_path)
pub fn create_test_catalog() -> Result<(TempDir, PathBuf)> {
    let dir = TempDir::new()?;
    let catalog_db_path = dir.path().join("catalog.db");

    let store = SqliteCatalogStore::new(&catalog_db_path, 1)?;
    let persons = store.persons();
    let pieces = store.pieces();

    seed_person(&persons, BACH_SURNAME, Some(BACH_GIVEN_NAME), BACH_ID)?;
    seed_person(&persons, MOZART_SURNAME, Some(MOZART_GIVEN_NAME), MOZART_ID)?;
    seed_person(&persons, BRAHMS_SURNAME, Some(BRAHMS_GIVEN_NAME), BRAHMS_ID)?;
    seed_person(&persons, PALESTRINA_SURNAME, None, PALESTRINA_ID)?;

    let seeded = [
        NewPiece {
            title: JESU_MEINE_FREUDE_TITLE.to_string(),
            genre: Some("Motette".to_string()),
            year: Some(1723),
            difficulty: Some("schwer".to_string()),
            digitized: Some(true),
            composer_ids: vec![BACH_ID],
            arranger_ids: vec![],
        },
        NewPiece {
            title: AVE_VERUM_TITLE.to_string(),
            genre: Some("Motette".to_string()),
            year: Some(1791),
            difficulty: Some("leicht".to_string()),
            digitized: Some(false),
            composer_ids: vec![MOZART_ID],
            arranger_ids: vec![BRAHMS_ID],
        },
        NewPiece {
            title: GEISTLICHES_LIED_TITLE.to_string(),
            genre: Some("Choral".to_string()),
            composer_ids: vec![BRAHMS_ID],
            ..Default::default()
        },
        NewPiece {
            title: SICUT_CERVUS_TITLE.to_string(),
            genre: Some("Motette".to_string()),
            year: Some(1584),
            difficulty: Some("mittel".to_string()),
            digitized: Some(true),
            composer_ids: vec![PALESTRINA_ID],
            arranger_ids: vec![],
        },
    ];
    for (index, draft) in seeded.into_iter().enumerate() {
        let created = pieces.create(draft)?;
        ensure!(created.piece.id == index as i64 + 1, "Unexpected piece id {}", created.piece.id);
    }

    Ok((dir, catalog_db_path))
}
