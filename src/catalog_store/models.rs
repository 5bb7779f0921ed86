//! Catalog data models.
//!
//! Entity records as stored, plus the draft and patch types accepted by the
//! store write operations.

use serde::{Deserialize, Serialize};

// =============================================================================
// Persons
// =============================================================================

/// A composer or arranger.
///
/// An absent given name is persisted as the empty string so that the
/// (surname, given name) uniqueness constraint also covers it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Person {
    pub id: i64,
    pub surname: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub given_name: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewPerson {
    pub surname: String,
    pub given_name: Option<String>,
}

/// Partial person update. `given_name: Some(None)` clears the given name.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PersonPatch {
    pub surname: Option<String>,
    pub given_name: Option<Option<String>>,
}

// =============================================================================
// Pieces
// =============================================================================

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Piece {
    pub id: i64,
    pub title: String,
    pub genre: Option<String>,
    pub year: Option<i32>,
    pub difficulty: Option<String>,
    pub digitized: Option<bool>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CreditRole {
    Composer,
    Arranger,
}

impl CreditRole {
    pub const ALL: [CreditRole; 2] = [CreditRole::Composer, CreditRole::Arranger];

    /// Association table holding the links for this role.
    pub fn table_name(&self) -> &'static str {
        match self {
            CreditRole::Composer => "composed_by",
            CreditRole::Arranger => "arranged_by",
        }
    }
}

/// One association row joined with the person it points to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Credit {
    pub role: CreditRole,
    pub position: i64,
    pub person: Person,
}

/// A piece together with its composer and arranger associations.
///
/// Credits are ordered by role, then by the position they were supplied in.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PieceWithCredits {
    pub piece: Piece,
    pub credits: Vec<Credit>,
}

impl PieceWithCredits {
    pub fn people_with_role(&self, role: CreditRole) -> impl Iterator<Item = &Person> {
        self.credits
            .iter()
            .filter(move |c| c.role == role)
            .map(|c| &c.person)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NewPiece {
    pub title: String,
    pub genre: Option<String>,
    pub year: Option<i32>,
    pub difficulty: Option<String>,
    pub digitized: Option<bool>,
    pub composer_ids: Vec<i64>,
    pub arranger_ids: Vec<i64>,
}

/// Partial piece update.
///
/// Outer `None` leaves a field untouched, `Some(None)` clears a nullable column.
/// A supplied id list replaces every association of that role, even when empty.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PiecePatch {
    pub title: Option<String>,
    pub genre: Option<Option<String>>,
    pub year: Option<Option<i32>>,
    pub difficulty: Option<Option<String>>,
    pub digitized: Option<Option<bool>>,
    pub composer_ids: Option<Vec<i64>>,
    pub arranger_ids: Option<Vec<i64>>,
}

impl PiecePatch {
    pub fn ids_for(&self, role: CreditRole) -> Option<&[i64]> {
        match role {
            CreditRole::Composer => self.composer_ids.as_deref(),
            CreditRole::Arranger => self.arranger_ids.as_deref(),
        }
    }

    pub(super) fn apply_to(&self, piece: &mut Piece) {
        if let Some(title) = &self.title {
            piece.title = title.clone();
        }
        if let Some(genre) = &self.genre {
            piece.genre = genre.clone();
        }
        if let Some(year) = self.year {
            piece.year = year;
        }
        if let Some(difficulty) = &self.difficulty {
            piece.difficulty = difficulty.clone();
        }
        if let Some(digitized) = self.digitized {
            piece.digitized = digitized;
        }
    }
}

impl NewPiece {
    pub fn ids_for(&self, role: CreditRole) -> &[i64] {
        match role {
            CreditRole::Composer => &self.composer_ids,
            CreditRole::Arranger => &self.arranger_ids,
        }
    }
}
