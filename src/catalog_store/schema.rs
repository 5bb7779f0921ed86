//! SQLite schema for the sheet music catalog.
//!
//! Persons and pieces are linked through one association table per credit
//! role. Association rows cascade away with either side.

use crate::sqlite_column;
use crate::sqlite_persistence::{
    Column, ForeignKey, ForeignKeyOnChange, SqlType, Table, VersionedSchema,
};

const PERSONS_TABLE: Table = Table {
    name: "persons",
    columns: &[
        sqlite_column!("id", &SqlType::Integer, is_primary_key = true),
        sqlite_column!("surname", &SqlType::Text, non_null = true),
        sqlite_column!(
            "given_name",
            &SqlType::Text,
            non_null = true,
            default_value = Some("''")
        ),
    ],
    indices: &[],
    unique_constraints: &[&["surname", "given_name"]],
};

const PIECES_TABLE: Table = Table {
    name: "pieces",
    columns: &[
        sqlite_column!("id", &SqlType::Integer, is_primary_key = true),
        sqlite_column!("title", &SqlType::Text, non_null = true),
        sqlite_column!("genre", &SqlType::Text),
        sqlite_column!("year", &SqlType::Integer),
        sqlite_column!("difficulty", &SqlType::Text),
        sqlite_column!("digitized", &SqlType::Integer), // 0/1, NULL when unknown
    ],
    indices: &[("idx_pieces_title", "title")],
    unique_constraints: &[],
};

const PIECE_FK: ForeignKey = ForeignKey {
    foreign_table: "pieces",
    foreign_column: "id",
    on_delete: ForeignKeyOnChange::Cascade,
};

const PERSON_FK: ForeignKey = ForeignKey {
    foreign_table: "persons",
    foreign_column: "id",
    on_delete: ForeignKeyOnChange::Cascade,
};

const COMPOSED_BY_TABLE: Table = Table {
    name: "composed_by",
    columns: &[
        sqlite_column!(
            "piece_id",
            &SqlType::Integer,
            non_null = true,
            foreign_key = Some(&PIECE_FK)
        ),
        sqlite_column!(
            "person_id",
            &SqlType::Integer,
            non_null = true,
            foreign_key = Some(&PERSON_FK)
        ),
        sqlite_column!("position", &SqlType::Integer, non_null = true),
    ],
    indices: &[
        ("idx_composed_by_piece", "piece_id"),
        ("idx_composed_by_person", "person_id"),
    ],
    unique_constraints: &[&["piece_id", "person_id"]],
};

const ARRANGED_BY_TABLE: Table = Table {
    name: "arranged_by",
    columns: &[
        sqlite_column!(
            "piece_id",
            &SqlType::Integer,
            non_null = true,
            foreign_key = Some(&PIECE_FK)
        ),
        sqlite_column!(
            "person_id",
            &SqlType::Integer,
            non_null = true,
            foreign_key = Some(&PERSON_FK)
        ),
        sqlite_column!("position", &SqlType::Integer, non_null = true),
    ],
    indices: &[
        ("idx_arranged_by_piece", "piece_id"),
        ("idx_arranged_by_person", "person_id"),
    ],
    unique_constraints: &[&["piece_id", "person_id"]],
};

pub const CATALOG_VERSIONED_SCHEMAS: &[VersionedSchema] = &[VersionedSchema {
    version: 0,
    tables: &[
        PERSONS_TABLE,
        PIECES_TABLE,
        COMPOSED_BY_TABLE,
        ARRANGED_BY_TABLE,
    ],
    migration: None,
}];
