//! API representation of pieces.
//!
//! Store records carry one [`Credit`](crate::catalog_store::Credit) per
//! association row. Responses flatten them into one person list per role,
//! keeping store order.

use crate::catalog_store::{CatalogResult, CreditRole, Person, PieceWithCredits};
use crate::name_resolution::NameResolver;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreditedPerson {
    pub id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub given_name: Option<String>,
    pub surname: String,
}

impl From<&Person> for CreditedPerson {
    fn from(person: &Person) -> Self {
        CreditedPerson {
            id: person.id,
            given_name: person.given_name.clone(),
            surname: person.surname.clone(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormattedPiece {
    pub id: i64,
    pub title: String,
    pub genre: Option<String>,
    pub year: Option<i32>,
    pub difficulty: Option<String>,
    pub digitized: Option<bool>,
    pub composers: Vec<CreditedPerson>,
    pub arrangers: Vec<CreditedPerson>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub composer_names: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arranger_names: Option<Vec<String>>,
}

pub fn format_piece(record: &PieceWithCredits) -> FormattedPiece {
    let credited = |role: CreditRole| -> Vec<CreditedPerson> {
        record
            .people_with_role(role)
            .map(CreditedPerson::from)
            .collect()
    };
    let piece = &record.piece;
    FormattedPiece {
        id: piece.id,
        title: piece.title.clone(),
        genre: piece.genre.clone(),
        year: piece.year,
        difficulty: piece.difficulty.clone(),
        digitized: piece.digitized,
        composers: credited(CreditRole::Composer),
        arrangers: credited(CreditRole::Arranger),
        composer_names: None,
        arranger_names: None,
    }
}

impl FormattedPiece {
    pub fn person_ids(&self, role: CreditRole) -> Vec<i64> {
        let people = match role {
            CreditRole::Composer => &self.composers,
            CreditRole::Arranger => &self.arrangers,
        };
        people.iter().map(|p| p.id).collect()
    }

    /// Fills the display name lists through the name resolver.
    pub fn with_names(mut self, resolver: &NameResolver) -> CatalogResult<Self> {
        self.composer_names = Some(resolver.ids_to_names(&self.person_ids(CreditRole::Composer))?);
        self.arranger_names = Some(resolver.ids_to_names(&self.person_ids(CreditRole::Arranger))?);
        Ok(self)
    }
}
