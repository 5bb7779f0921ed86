//! Person routes, plus the two name resolution helpers used by clients that
//! only know composers and arrangers by name.

use axum::{extract::State, http::StatusCode, routing::{get, post}, Json, Router};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::error::{ApiError, ApiResult, LogContext};
use super::extract::{double_option, ApiJson, ApiPath, ApiQuery};
use super::state::ServerState;
use crate::catalog_store::{NewPerson, Person, PersonPatch, Repository};
use crate::name_resolution::NameResolver;

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct CreatePersonBody {
    pub surname: String,
    pub given_name: Option<String>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePersonBody {
    pub surname: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub given_name: Option<Option<String>>,
}

#[derive(Deserialize, Debug)]
pub struct ResolveNamesBody {
    pub names: Vec<String>,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct ResolvedIds {
    pub ids: Vec<i64>,
}

#[derive(Deserialize, Debug)]
pub struct NamesQuery {
    pub ids: String,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct ResolvedNames {
    pub names: Vec<String>,
}

fn non_blank_surname(surname: &str) -> ApiResult<String> {
    let surname = surname.trim();
    if surname.is_empty() {
        return Err(ApiError::BadRequest("surname must not be empty".to_string()));
    }
    Ok(surname.to_string())
}

/// Parses `1,2,3`. Empty segments are ignored, anything else must be an id.
fn parse_id_list(raw: &str) -> ApiResult<Vec<i64>> {
    raw.split(',')
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .map(|segment| {
            segment
                .parse::<i64>()
                .map_err(|_| ApiError::BadRequest(format!("Invalid person id '{}'", segment)))
        })
        .collect()
}

async fn list_persons(State(state): State<ServerState>) -> ApiResult<Json<Vec<Person>>> {
    let persons = state
        .person_store
        .find_all(&())
        .log_context("Failed to list persons")?;
    Ok(Json(persons))
}

async fn get_person(
    State(state): State<ServerState>,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<Json<Person>> {
    state
        .person_store
        .find_by_id(id)
        .log_context("Failed to load person")?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Person {} not found", id)))
}

async fn create_person(
    State(state): State<ServerState>,
    ApiJson(body): ApiJson<CreatePersonBody>,
) -> ApiResult<(StatusCode, Json<Person>)> {
    let surname = non_blank_surname(&body.surname)?;
    let person = state
        .person_store
        .create(NewPerson {
            surname,
            given_name: body.given_name,
        })
        .log_context("Failed to create person")?;
    debug!("Created person {}", person.id);
    Ok((StatusCode::CREATED, Json(person)))
}

async fn update_person(
    State(state): State<ServerState>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(body): ApiJson<UpdatePersonBody>,
) -> ApiResult<Json<Person>> {
    let surname = body.surname.as_deref().map(non_blank_surname).transpose()?;
    let person = state
        .person_store
        .update(
            id,
            PersonPatch {
                surname,
                given_name: body.given_name,
            },
        )
        .log_context("Failed to update person")?;
    Ok(Json(person))
}

async fn delete_person(
    State(state): State<ServerState>,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<StatusCode> {
    state
        .person_store
        .delete(id)
        .log_context("Failed to delete person")?;
    debug!("Deleted person {}", id);
    Ok(StatusCode::NO_CONTENT)
}

async fn resolve_names(
    State(state): State<ServerState>,
    ApiJson(body): ApiJson<ResolveNamesBody>,
) -> ApiResult<Json<ResolvedIds>> {
    let resolver = NameResolver::new(state.person_store.as_ref());
    let ids = resolver
        .names_to_ids(&body.names)
        .log_context("Failed to resolve person names")?;
    Ok(Json(ResolvedIds { ids }))
}

async fn get_names(
    State(state): State<ServerState>,
    ApiQuery(query): ApiQuery<NamesQuery>,
) -> ApiResult<Json<ResolvedNames>> {
    let ids = parse_id_list(&query.ids)?;
    let resolver = NameResolver::new(state.person_store.as_ref());
    let names = resolver
        .ids_to_names(&ids)
        .log_context("Failed to load person names")?;
    Ok(Json(ResolvedNames { names }))
}

pub fn make_person_routes(state: ServerState) -> Router {
    Router::new()
        .route("/persons", get(list_persons).post(create_person))
        .route("/persons/resolve", post(resolve_names))
        .route("/persons/names", get(get_names))
        .route(
            "/persons/{id}",
            get(get_person).patch(update_person).delete(delete_person),
        )
        .with_state(state)
}
