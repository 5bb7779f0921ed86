use super::error::{CatalogError, CatalogResult};
use super::models::*;
use super::person_store::person_from_row;
use super::query::PieceQuery;
use super::store::SqliteCatalogStore;
use super::trait_def::{PieceStore, Repository};
use rusqlite::{params, params_from_iter, Connection, Row};

const PIECE_COLUMNS: &str = "p.id, p.title, p.genre, p.year, p.difficulty, p.digitized";

fn piece_from_row(row: &Row) -> rusqlite::Result<Piece> {
    Ok(Piece {
        id: row.get(0)?,
        title: row.get(1)?,
        genre: row.get(2)?,
        year: row.get(3)?,
        difficulty: row.get(4)?,
        digitized: row.get(5)?,
    })
}

fn load_piece_row(conn: &Connection, id: i64) -> CatalogResult<Option<Piece>> {
    match conn.query_row(
        &format!("SELECT {PIECE_COLUMNS} FROM pieces p WHERE p.id = ?1"),
        params![id],
        piece_from_row,
    ) {
        Ok(piece) => Ok(Some(piece)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

fn load_credits(conn: &Connection, piece_id: i64) -> CatalogResult<Vec<Credit>> {
    let mut credits = Vec::new();
    for role in CreditRole::ALL {
        let mut stmt = conn.prepare_cached(&format!(
            "SELECT a.position, pe.id, pe.surname, pe.given_name FROM {} a \
             JOIN persons pe ON pe.id = a.person_id \
             WHERE a.piece_id = ?1 ORDER BY a.position",
            role.table_name()
        ))?;
        let rows = stmt.query_map(params![piece_id], |row| {
            Ok(Credit {
                role,
                position: row.get(0)?,
                person: person_from_row(row, 1)?,
            })
        })?;
        for credit in rows {
            credits.push(credit?);
        }
    }
    Ok(credits)
}

fn with_credits(conn: &Connection, piece: Piece) -> CatalogResult<PieceWithCredits> {
    let credits = load_credits(conn, piece.id)?;
    Ok(PieceWithCredits { piece, credits })
}

fn load_piece(conn: &Connection, id: i64) -> CatalogResult<PieceWithCredits> {
    let piece = load_piece_row(conn, id)?.ok_or_else(|| CatalogError::piece_not_found(id))?;
    with_credits(conn, piece)
}

/// Links `person_ids` to the piece in the given order. A repeated id keeps its
/// first position.
fn insert_credits(
    conn: &Connection,
    piece_id: i64,
    role: CreditRole,
    person_ids: &[i64],
) -> CatalogResult<()> {
    for (position, person_id) in person_ids.iter().enumerate() {
        match conn.query_row(
            "SELECT 1 FROM persons WHERE id = ?1",
            params![person_id],
            |_| Ok(()),
        ) {
            Ok(()) => {}
            Err(rusqlite::Error::QueryReturnedNoRows) => {
                return Err(CatalogError::UnknownPerson(*person_id))
            }
            Err(e) => return Err(e.into()),
        }
        conn.execute(
            &format!(
                "INSERT OR IGNORE INTO {} (piece_id, person_id, position) VALUES (?1, ?2, ?3)",
                role.table_name()
            ),
            params![piece_id, person_id, position as i64],
        )?;
    }
    Ok(())
}

fn delete_credits(conn: &Connection, piece_id: i64, role: CreditRole) -> CatalogResult<()> {
    conn.execute(
        &format!("DELETE FROM {} WHERE piece_id = ?1", role.table_name()),
        params![piece_id],
    )?;
    Ok(())
}

#[derive(Clone)]
pub struct SqlitePieceStore {
    db: SqliteCatalogStore,
}

impl SqlitePieceStore {
    pub(super) fn new(db: SqliteCatalogStore) -> Self {
        SqlitePieceStore { db }
    }
}

impl Repository for SqlitePieceStore {
    type Entity = PieceWithCredits;
    type Draft = NewPiece;
    type Patch = PiecePatch;
    type Query = PieceQuery;

    fn find_all(&self, query: &PieceQuery) -> CatalogResult<Vec<PieceWithCredits>> {
        let mut filter = query.filter.to_sql();
        let limit_index = filter.params.len() + 1;
        filter
            .params
            .push((query.pagination.limit() as i64).into());
        filter
            .params
            .push((query.pagination.offset() as i64).into());

        let sql = format!(
            "SELECT {PIECE_COLUMNS} FROM pieces p {} {} LIMIT ?{} OFFSET ?{}",
            filter.clause,
            query.sorting.order_by_sql(),
            limit_index,
            limit_index + 1
        );

        self.db.read(|conn| {
            let mut stmt = conn.prepare(&sql)?;
            let pieces = stmt
                .query_map(params_from_iter(filter.params.iter()), piece_from_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;

            pieces
                .into_iter()
                .map(|piece| with_credits(conn, piece))
                .collect()
        })
    }

    fn find_by_id(&self, id: i64) -> CatalogResult<Option<PieceWithCredits>> {
        self.db.read(|conn| match load_piece_row(conn, id)? {
            Some(piece) => Ok(Some(with_credits(conn, piece)?)),
            None => Ok(None),
        })
    }

    fn create(&self, draft: NewPiece) -> CatalogResult<PieceWithCredits> {
        self.db.write(|conn| {
            conn.execute(
                "INSERT INTO pieces (title, genre, year, difficulty, digitized) \
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    draft.title,
                    draft.genre,
                    draft.year,
                    draft.difficulty,
                    draft.digitized
                ],
            )?;
            let piece_id = conn.last_insert_rowid();

            for role in CreditRole::ALL {
                insert_credits(conn, piece_id, role, draft.ids_for(role))?;
            }

            load_piece(conn, piece_id)
        })
    }

    fn update(&self, id: i64, patch: PiecePatch) -> CatalogResult<PieceWithCredits> {
        self.db.write(|conn| {
            let mut piece =
                load_piece_row(conn, id)?.ok_or_else(|| CatalogError::piece_not_found(id))?;
            patch.apply_to(&mut piece);

            conn.execute(
                "UPDATE pieces SET title = ?1, genre = ?2, year = ?3, difficulty = ?4, digitized = ?5 \
                 WHERE id = ?6",
                params![
                    piece.title,
                    piece.genre,
                    piece.year,
                    piece.difficulty,
                    piece.digitized,
                    id
                ],
            )?;

            for role in CreditRole::ALL {
                if let Some(person_ids) = patch.ids_for(role) {
                    delete_credits(conn, id, role)?;
                    insert_credits(conn, id, role, person_ids)?;
                }
            }

            load_piece(conn, id)
        })
    }

    fn delete(&self, id: i64) -> CatalogResult<()> {
        self.db.write(|conn| {
            if load_piece_row(conn, id)?.is_none() {
                return Err(CatalogError::piece_not_found(id));
            }
            for role in CreditRole::ALL {
                delete_credits(conn, id, role)?;
            }
            conn.execute("DELETE FROM pieces WHERE id = ?1", params![id])?;
            Ok(())
        })
    }
}

impl PieceStore for SqlitePieceStore {
    fn count(&self, query: &PieceQuery) -> CatalogResult<u64> {
        let filter = query.filter.to_sql();
        let sql = format!("SELECT COUNT(*) FROM pieces p {}", filter.clause);

        self.db.read(|conn| {
            let count: i64 =
                conn.query_row(&sql, params_from_iter(filter.params.iter()), |r| r.get(0))?;
            Ok(count as u64)
        })
    }

    fn find_by_title(&self, title: &str) -> CatalogResult<Option<PieceWithCredits>> {
        self.db.read(|conn| {
            let piece = match conn.query_row(
                &format!(
                    "SELECT {PIECE_COLUMNS} FROM pieces p WHERE p.title = ?1 ORDER BY p.id LIMIT 1"
                ),
                params![title],
                piece_from_row,
            ) {
                Ok(piece) => piece,
                Err(rusqlite::Error::QueryReturnedNoRows) => return Ok(None),
                Err(e) => return Err(e.into()),
            };
            Ok(Some(with_credits(conn, piece)?))
        })
    }
}
