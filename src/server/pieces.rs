//! Piece routes.
//!
//! Write handlers validate the whole body first, then turn composer/arranger
//! names into ids through [`NameResolver`], and only then touch the piece store.

use std::collections::HashSet;
use std::hash::Hash;

use axum::{
    extract::State,
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::error::{ApiError, ApiResult, LogContext};
use super::extract::{double_option, ApiJson, ApiPath, ApiQuery};
use super::state::ServerState;
use crate::catalog_store::{
    CreditRole, NewPiece, Pagination, PieceFilter, PiecePatch, PieceQuery, PieceStore,
    Repository, SortField, SortOrder, Sorting,
};
use crate::formatting::{format_piece, FormattedPiece};
use crate::name_resolution::{split_full_name, NameResolver};

// =============================================================================
// Request and response bodies
// =============================================================================

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct CreatePieceBody {
    pub title: String,
    pub genre: Option<String>,
    pub year: Option<i32>,
    pub difficulty: Option<String>,
    pub digitized: Option<bool>,
    pub composer_ids: Option<Vec<i64>>,
    pub arranger_ids: Option<Vec<i64>>,
    pub composer_names: Option<Vec<String>>,
    pub arranger_names: Option<Vec<String>>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePieceBody {
    pub title: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub genre: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub year: Option<Option<i32>>,
    #[serde(default, deserialize_with = "double_option")]
    pub difficulty: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub digitized: Option<Option<bool>>,
    pub composer_ids: Option<Vec<i64>>,
    pub arranger_ids: Option<Vec<i64>>,
    pub composer_names: Option<Vec<String>>,
    pub arranger_names: Option<Vec<String>>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct ListPiecesParams {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub title: Option<String>,
    pub genre: Option<String>,
    pub digitized: Option<bool>,
    pub composer_name: Option<String>,
    pub arranger_name: Option<String>,
    pub sort_by: Option<SortField>,
    pub sort_order: Option<SortOrder>,
    #[serde(default)]
    pub names: bool,
}

#[derive(Deserialize, Debug, Default)]
pub struct GetPieceParams {
    #[serde(default)]
    pub names: bool,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct PageMeta {
    pub total: u64,
    pub page: u32,
    pub last_page: u64,
    pub limit: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filters: Option<PieceFilter>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sorting: Option<Sorting>,
}

#[derive(Serialize, Debug)]
pub struct PaginatedResponse<T> {
    pub data: Vec<T>,
    pub meta: PageMeta,
}

// =============================================================================
// Validation and credit resolution
// =============================================================================

fn has_duplicates<T: Eq + Hash>(items: &[T]) -> bool {
    let mut seen = HashSet::with_capacity(items.len());
    !items.iter().all(|item| seen.insert(item))
}

fn non_blank_title(title: &str) -> ApiResult<String> {
    let title = title.trim();
    if title.is_empty() {
        return Err(ApiError::BadRequest("title must not be empty".to_string()));
    }
    Ok(title.to_string())
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// The ids or names a request supplied for one credit role.
struct CreditInput<'a> {
    role: CreditRole,
    ids: Option<&'a [i64]>,
    names: Option<&'a [String]>,
}

impl<'a> CreditInput<'a> {
    fn field_names(&self) -> (&'static str, &'static str) {
        match self.role {
            CreditRole::Composer => ("composerIds", "composerNames"),
            CreditRole::Arranger => ("arrangerIds", "arrangerNames"),
        }
    }

    fn validate(&self) -> ApiResult<()> {
        let (ids_field, names_field) = self.field_names();
        if self.ids.is_some() && self.names.is_some() {
            return Err(ApiError::BadRequest(format!(
                "{} and {} cannot be combined",
                ids_field, names_field
            )));
        }
        if self.ids.is_some_and(has_duplicates) {
            return Err(ApiError::BadRequest(format!(
                "{} must not contain duplicates",
                ids_field
            )));
        }
        if let Some(names) = self.names {
            if names.iter().any(|n| split_full_name(n).is_none()) {
                return Err(ApiError::BadRequest(format!(
                    "{} must not contain blank names",
                    names_field
                )));
            }
            if has_duplicates(names) {
                return Err(ApiError::BadRequest(format!(
                    "{} must not contain duplicates",
                    names_field
                )));
            }
        }
        Ok(())
    }

    /// `None` when the request left this role alone.
    fn resolve(&self, resolver: &NameResolver) -> ApiResult<Option<Vec<i64>>> {
        match (self.ids, self.names) {
            (Some(ids), _) => Ok(Some(ids.to_vec())),
            (None, Some(names)) => resolver
                .names_to_ids(names)
                .log_context("Failed to resolve person names")
                .map(Some),
            (None, None) => Ok(None),
        }
    }
}

/// Validates both roles before resolving either, so a bad arranger list
/// cannot leave behind persons created for the composer list.
fn resolve_credits(
    state: &ServerState,
    inputs: [CreditInput; 2],
) -> ApiResult<[Option<Vec<i64>>; 2]> {
    for input in &inputs {
        input.validate()?;
    }
    let resolver = NameResolver::new(state.person_store.as_ref());
    let [composers, arrangers] = inputs;
    Ok([composers.resolve(&resolver)?, arrangers.resolve(&resolver)?])
}

impl ListPiecesParams {
    fn into_query(self) -> ApiResult<(PieceQuery, PageMeta)> {
        let pagination = Pagination::new(self.page, self.limit)?;

        let filter = PieceFilter {
            title: non_blank(self.title),
            genre: non_blank(self.genre),
            digitized: self.digitized,
            composer_name: non_blank(self.composer_name),
            arranger_name: non_blank(self.arranger_name),
        };
        let sorting_supplied = self.sort_by.is_some() || self.sort_order.is_some();
        let sorting = Sorting {
            sort_by: self.sort_by.unwrap_or_default(),
            sort_order: self.sort_order.unwrap_or_default(),
        };

        let meta = PageMeta {
            total: 0,
            page: pagination.page(),
            last_page: 0,
            limit: pagination.limit(),
            filters: (!filter.is_empty()).then(|| filter.clone()),
            sorting: sorting_supplied.then_some(sorting),
        };
        let query = PieceQuery {
            filter,
            sorting,
            pagination,
        };
        Ok((query, meta))
    }
}

fn with_names(state: &ServerState, piece: FormattedPiece) -> ApiResult<FormattedPiece> {
    let resolver = NameResolver::new(state.person_store.as_ref());
    piece
        .with_names(&resolver)
        .log_context("Failed to resolve credit names")
}

// =============================================================================
// Handlers
// =============================================================================

async fn list_pieces(
    State(state): State<ServerState>,
    ApiQuery(params): ApiQuery<ListPiecesParams>,
) -> ApiResult<Json<PaginatedResponse<FormattedPiece>>> {
    let include_names = params.names;
    let (query, mut meta) = params.into_query()?;

    let records = state
        .piece_store
        .find_all(&query)
        .log_context("Failed to list pieces")?;
    let total = state
        .piece_store
        .count(&query)
        .log_context("Failed to count pieces")?;
    meta.total = total;
    meta.last_page = query.pagination.last_page(total);

    let mut data = Vec::with_capacity(records.len());
    for record in &records {
        let piece = format_piece(record);
        data.push(if include_names {
            with_names(&state, piece)?
        } else {
            piece
        });
    }

    Ok(Json(PaginatedResponse { data, meta }))
}

async fn get_piece(
    State(state): State<ServerState>,
    ApiPath(id): ApiPath<i64>,
    ApiQuery(params): ApiQuery<GetPieceParams>,
) -> ApiResult<Json<FormattedPiece>> {
    let piece = match state.piece_cache.get(&id) {
        Some(cached) => {
            debug!("Serving piece {} from cache", id);
            cached
        }
        None => {
            let record = state
                .piece_store
                .find_by_id(id)
                .log_context("Failed to load piece")?
                .ok_or_else(|| ApiError::NotFound(format!("Piece {} not found", id)))?;
            let piece = format_piece(&record);
            state.piece_cache.insert(id, piece.clone());
            piece
        }
    };

    if params.names {
        return Ok(Json(with_names(&state, piece)?));
    }
    Ok(Json(piece))
}

async fn create_piece(
    State(state): State<ServerState>,
    ApiJson(body): ApiJson<CreatePieceBody>,
) -> ApiResult<(StatusCode, Json<FormattedPiece>)> {
    let title = non_blank_title(&body.title)?;
    let [composer_ids, arranger_ids] = resolve_credits(
        &state,
        [
            CreditInput {
                role: CreditRole::Composer,
                ids: body.composer_ids.as_deref(),
                names: body.composer_names.as_deref(),
            },
            CreditInput {
                role: CreditRole::Arranger,
                ids: body.arranger_ids.as_deref(),
                names: body.arranger_names.as_deref(),
            },
        ],
    )?;

    let created = state
        .piece_store
        .create(NewPiece {
            title,
            genre: body.genre,
            year: body.year,
            difficulty: body.difficulty,
            digitized: body.digitized,
            composer_ids: composer_ids.unwrap_or_default(),
            arranger_ids: arranger_ids.unwrap_or_default(),
        })
        .log_context("Failed to create piece")?;

    debug!("Created piece {} '{}'", created.piece.id, created.piece.title);
    Ok((StatusCode::CREATED, Json(format_piece(&created))))
}

async fn update_piece(
    State(state): State<ServerState>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(body): ApiJson<UpdatePieceBody>,
) -> ApiResult<Json<FormattedPiece>> {
    let title = body.title.as_deref().map(non_blank_title).transpose()?;
    let inputs = [
        CreditInput {
            role: CreditRole::Composer,
            ids: body.composer_ids.as_deref(),
            names: body.composer_names.as_deref(),
        },
        CreditInput {
            role: CreditRole::Arranger,
            ids: body.arranger_ids.as_deref(),
            names: body.arranger_names.as_deref(),
        },
    ];
    for input in &inputs {
        input.validate()?;
    }

    // Checked up front so names are not resolved for a piece that is gone.
    if state
        .piece_store
        .find_by_id(id)
        .log_context("Failed to load piece")?
        .is_none()
    {
        return Err(ApiError::NotFound(format!("Piece {} not found", id)));
    }

    let [composer_ids, arranger_ids] = resolve_credits(&state, inputs)?;
    let updated = state
        .piece_store
        .update(
            id,
            PiecePatch {
                title,
                genre: body.genre,
                year: body.year,
                difficulty: body.difficulty,
                digitized: body.digitized,
                composer_ids,
                arranger_ids,
            },
        )
        .log_context("Failed to update piece")?;

    Ok(Json(format_piece(&updated)))
}

async fn delete_piece(
    State(state): State<ServerState>,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<StatusCode> {
    state
        .piece_store
        .delete(id)
        .log_context("Failed to delete piece")?;
    debug!("Deleted piece {}", id);
    Ok(StatusCode::NO_CONTENT)
}

pub fn make_piece_routes(state: ServerState) -> Router {
    Router::new()
        .route("/pieces", get(list_pieces).post(create_piece))
        .route(
            "/pieces/{id}",
            get(get_piece).patch(update_piece).delete(delete_piece),
        )
        .with_state(state)
}
