//! HTTP client for end-to-end tests
//!
//! This module provides a high-level HTTP client that wraps reqwest
//! and provides methods for all catalog server endpoints.
//!
//! When API routes or request formats change, update only this file.

use super::constants::*;
use reqwest::Response;
use serde_json::{json, Value};
use std::time::Duration;

pub struct TestClient {
    /// The underlying reqwest client (public for custom requests in tests)
    pub client: reqwest::Client,
    /// The base URL of the test server
    pub base_url: String,
}

impl TestClient {
    pub fn new(base_url: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .expect("Failed to build reqwest client");

        Self { client, base_url }
    }

    /// GET /
    pub async fn get_home(&self) -> Response {
        self.client
            .get(format!("{}/", self.base_url))
            .send()
            .await
            .expect("Get home request failed")
    }

    // ========================================================================
    // Piece Endpoints
    // ========================================================================

    /// POST /pieces
    pub async fn create_piece(&self, body: &Value) -> Response {
        self.client
            .post(format!("{}/pieces", self.base_url))
            .json(body)
            .send()
            .await
            .expect("Create piece request failed")
    }

    /// POST /pieces with a raw, possibly malformed, JSON body
    pub async fn create_piece_raw(&self, body: &str) -> Response {
        self.client
            .post(format!("{}/pieces", self.base_url))
            .header("content-type", "application/json")
            .body(body.to_string())
            .send()
            .await
            .expect("Create piece request failed")
    }

    /// GET /pieces?{query}
    pub async fn list_pieces(&self, query: &str) -> Response {
        self.client
            .get(format!("{}/pieces?{}", self.base_url, query))
            .send()
            .await
            .expect("List pieces request failed")
    }

    /// GET /pieces/{id}
    pub async fn get_piece(&self, id: i64) -> Response {
        self.client
            .get(format!("{}/pieces/{}", self.base_url, id))
            .send()
            .await
            .expect("Get piece request failed")
    }

    /// GET /pieces/{id}?names=true
    pub async fn get_piece_with_names(&self, id: i64) -> Response {
        self.client
            .get(format!("{}/pieces/{}?names=true", self.base_url, id))
            .send()
            .await
            .expect("Get piece request failed")
    }

    /// PATCH /pieces/{id}
    pub async fn update_piece(&self, id: i64, body: &Value) -> Response {
        self.client
            .patch(format!("{}/pieces/{}", self.base_url, id))
            .json(body)
            .send()
            .await
            .expect("Update piece request failed")
    }

    /// DELETE /pieces/{id}
    pub async fn delete_piece(&self, id: i64) -> Response {
        self.client
            .delete(format!("{}/pieces/{}", self.base_url, id))
            .send()
            .await
            .expect("Delete piece request failed")
    }

    // ========================================================================
    // Person Endpoints
    // ========================================================================

    /// POST /persons
    pub async fn create_person(&self, surname: &str, given_name: Option<&str>) -> Response {
        self.client
            .post(format!("{}/persons", self.base_url))
            .json(&json!({
                "surname": surname,
                "givenName": given_name,
            }))
            .send()
            .await
            .expect("Create person request failed")
    }

    /// GET /persons
    pub async fn list_persons(&self) -> Response {
        self.client
            .get(format!("{}/persons", self.base_url))
            .send()
            .await
            .expect("List persons request failed")
    }

    /// GET /persons/{id}
    pub async fn get_person(&self, id: i64) -> Response {
        self.client
            .get(format!("{}/persons/{}", self.base_url, id))
            .send()
            .await
            .expect("Get person request failed")
    }

    /// PATCH /persons/{id}
    pub async fn update_person(&self, id: i64, body: &Value) -> Response {
        self.client
            .patch(format!("{}/persons/{}", self.base_url, id))
            .json(body)
            .send()
            .await
            .expect("Update person request failed")
    }

    /// DELETE /persons/{id}
    pub async fn delete_person(&self, id: i64) -> Response {
        self.client
            .delete(format!("{}/persons/{}", self.base_url, id))
            .send()
            .await
            .expect("Delete person request failed")
    }

    /// POST /persons/resolve
    pub async fn resolve_names(&self, names: &[&str]) -> Response {
        self.client
            .post(format!("{}/persons/resolve", self.base_url))
            .json(&json!({ "names": names }))
            .send()
            .await
            .expect("Resolve names request failed")
    }

    /// GET /persons/names?ids={ids}
    pub async fn get_names(&self, ids: &str) -> Response {
        self.client
            .get(format!("{}/persons/names?ids={}", self.base_url, ids))
            .send()
            .await
            .expect("Get names request failed")
    }
}
