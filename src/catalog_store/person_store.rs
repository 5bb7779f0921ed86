use super::error::{is_unique_violation, CatalogError, CatalogResult};
use super::models::{NewPerson, Person, PersonPatch};
use super::store::SqliteCatalogStore;
use super::trait_def::{PersonStore, Repository};
use rusqlite::{params, Connection, Row};

const PERSON_COLUMNS: &str = "id, surname, given_name";

/// Trims a given name and maps blank values to the stored empty string.
fn stored_given_name(given_name: Option<&str>) -> &str {
    given_name.map(str::trim).unwrap_or("")
}

pub(super) fn person_from_row(row: &Row, offset: usize) -> rusqlite::Result<Person> {
    let given_name: String = row.get(offset + 2)?;
    Ok(Person {
        id: row.get(offset)?,
        surname: row.get(offset + 1)?,
        given_name: if given_name.is_empty() {
            None
        } else {
            Some(given_name)
        },
    })
}

fn load_person(conn: &Connection, id: i64) -> CatalogResult<Option<Person>> {
    match conn.query_row(
        &format!("SELECT {PERSON_COLUMNS} FROM persons WHERE id = ?1"),
        params![id],
        |row| person_from_row(row, 0),
    ) {
        Ok(person) => Ok(Some(person)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

fn load_person_by_name(
    conn: &Connection,
    surname: &str,
    given_name: &str,
) -> CatalogResult<Option<Person>> {
    match conn.query_row(
        &format!("SELECT {PERSON_COLUMNS} FROM persons WHERE surname = ?1 AND given_name = ?2"),
        params![surname, given_name],
        |row| person_from_row(row, 0),
    ) {
        Ok(person) => Ok(Some(person)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

fn conflict(surname: &str, given_name: &str) -> CatalogError {
    CatalogError::Conflict(format!(
        "Person '{}' already exists",
        format!("{} {}", given_name, surname).trim()
    ))
}

#[derive(Clone)]
pub struct SqlitePersonStore {
    db: SqliteCatalogStore,
}

impl SqlitePersonStore {
    pub(super) fn new(db: SqliteCatalogStore) -> Self {
        SqlitePersonStore { db }
    }
}

impl Repository for SqlitePersonStore {
    type Entity = Person;
    type Draft = NewPerson;
    type Patch = PersonPatch;
    type Query = ();

    fn find_all(&self, _query: &()) -> CatalogResult<Vec<Person>> {
        self.db.read(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {PERSON_COLUMNS} FROM persons ORDER BY surname, given_name, id"
            ))?;
            let persons = stmt
                .query_map([], |row| person_from_row(row, 0))?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(persons)
        })
    }

    fn find_by_id(&self, id: i64) -> CatalogResult<Option<Person>> {
        self.db.read(|conn| load_person(conn, id))
    }

    fn create(&self, draft: NewPerson) -> CatalogResult<Person> {
        let surname = draft.surname.trim();
        let given_name = stored_given_name(draft.given_name.as_deref());

        self.db.write(|conn| {
            match conn.execute(
                "INSERT INTO persons (surname, given_name) VALUES (?1, ?2)",
                params![surname, given_name],
            ) {
                Ok(_) => {}
                Err(e) if is_unique_violation(&e) => return Err(conflict(surname, given_name)),
                Err(e) => return Err(e.into()),
            }
            let id = conn.last_insert_rowid();
            load_person(conn, id)?.ok_or_else(|| CatalogError::person_not_found(id))
        })
    }

    fn update(&self, id: i64, patch: PersonPatch) -> CatalogResult<Person> {
        self.db.write(|conn| {
            let existing = load_person(conn, id)?.ok_or_else(|| CatalogError::person_not_found(id))?;

            let surname = patch
                .surname
                .as_deref()
                .map(str::trim)
                .unwrap_or(&existing.surname);
            let given_name = match &patch.given_name {
                Some(new_given_name) => stored_given_name(new_given_name.as_deref()),
                None => stored_given_name(existing.given_name.as_deref()),
            };

            match conn.execute(
                "UPDATE persons SET surname = ?1, given_name = ?2 WHERE id = ?3",
                params![surname, given_name, id],
            ) {
                Ok(_) => {}
                Err(e) if is_unique_violation(&e) => return Err(conflict(surname, given_name)),
                Err(e) => return Err(e.into()),
            }
            load_person(conn, id)?.ok_or_else(|| CatalogError::person_not_found(id))
        })
    }

    fn delete(&self, id: i64) -> CatalogResult<()> {
        self.db.write(|conn| {
            let deleted = conn.execute("DELETE FROM persons WHERE id = ?1", params![id])?;
            if deleted == 0 {
                return Err(CatalogError::person_not_found(id));
            }
            Ok(())
        })
    }
}

impl PersonStore for SqlitePersonStore {
    fn find_by_name(
        &self,
        surname: &str,
        given_name: Option<&str>,
    ) -> CatalogResult<Option<Person>> {
        self.db
            .read(|conn| load_person_by_name(conn, surname.trim(), stored_given_name(given_name)))
    }

    fn find_or_create(&self, surname: &str, given_name: Option<&str>) -> CatalogResult<Person> {
        let surname = surname.trim();
        let given_name = stored_given_name(given_name);

        self.db.write(|conn| {
            conn.execute(
                "INSERT INTO persons (surname, given_name) VALUES (?1, ?2) \
                 ON CONFLICT(surname, given_name) DO NOTHING",
                params![surname, given_name],
            )?;
            load_person_by_name(conn, surname, given_name)?.ok_or_else(|| {
                CatalogError::Conflict(format!(
                    "Person '{} {}' vanished during find-or-create",
                    given_name, surname
                ))
            })
        })
    }
}
