//! Store trait definitions.
//!
//! `Repository` is the capability set shared by every catalog entity. The
//! entity specific traits extend it and pin its associated types, so the
//! server can hold them as `Arc<dyn PersonStore>` / `Arc<dyn PieceStore>`.

use super::error::CatalogResult;
use super::models::*;
use super::query::PieceQuery;

pub trait Repository: Send + Sync {
    type Entity;
    type Draft;
    type Patch;
    type Query;

    fn find_all(&self, query: &Self::Query) -> CatalogResult<Vec<Self::Entity>>;

    fn find_by_id(&self, id: i64) -> CatalogResult<Option<Self::Entity>>;

    fn create(&self, draft: Self::Draft) -> CatalogResult<Self::Entity>;

    /// Fails with `NotFound` when `id` does not exist.
    fn update(&self, id: i64, patch: Self::Patch) -> CatalogResult<Self::Entity>;

    /// Fails with `NotFound` when `id` does not exist.
    fn delete(&self, id: i64) -> CatalogResult<()>;
}

pub trait PersonStore:
    Repository<Entity = Person, Draft = NewPerson, Patch = PersonPatch, Query = ()>
{
    /// Exact lookup on the (surname, given name) pair.
    fn find_by_name(&self, surname: &str, given_name: Option<&str>)
        -> CatalogResult<Option<Person>>;

    /// Returns the person with this name pair, inserting it first if needed.
    ///
    /// Concurrent callers with the same pair always receive the same row.
    fn find_or_create(&self, surname: &str, given_name: Option<&str>) -> CatalogResult<Person>;
}

pub trait PieceStore:
    Repository<Entity = PieceWithCredits, Draft = NewPiece, Patch = PiecePatch, Query = PieceQuery>
{
    /// Number of pieces matching the query filter, ignoring pagination.
    fn count(&self, query: &PieceQuery) -> CatalogResult<u64>;

    /// First piece (lowest id) with exactly this title.
    fn find_by_title(&self, title: &str) -> CatalogResult<Option<PieceWithCredits>>;
}
