use anyhow::{Context, Result};
use std::time::Duration;

use axum::{
    extract::State,
    http::{header, HeaderValue, Method},
    middleware,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::Serialize;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::info;

use super::persons::make_person_routes;
use super::pieces::make_piece_routes;
use super::{
    config::DEFAULT_CORS_ORIGIN, log_requests, state::*, ServerConfig,
};

#[derive(Serialize)]
struct ServerStats {
    pub uptime: String,
    pub version: &'static str,
    pub hash: String,
}

fn format_uptime(duration: Duration) -> String {
    let total_seconds = duration.as_secs();

    let days = total_seconds / 86_400;
    let hours = (total_seconds % 86_400) / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    format!("{}d {:02}:{:02}:{:02}", days, hours, minutes, seconds)
}

async fn home(State(state): State<ServerState>) -> impl IntoResponse {
    let stats = ServerStats {
        uptime: format_uptime(state.start_time.elapsed()),
        version: env!("CARGO_PKG_VERSION"),
        hash: state.hash.clone(),
    };
    Json(stats)
}

fn make_cors_layer(config: &ServerConfig) -> Result<CorsLayer> {
    let origins = if config.cors_origins.is_empty() {
        vec![DEFAULT_CORS_ORIGIN.to_string()]
    } else {
        config.cors_origins.clone()
    };
    let origins = origins
        .iter()
        .map(|origin| {
            HeaderValue::from_str(origin).with_context(|| format!("Invalid CORS origin '{}'", origin))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE]))
}

pub fn make_app(
    config: ServerConfig,
    person_store: GuardedPersonStore,
    piece_store: GuardedPieceStore,
) -> Result<Router> {
    let cors = make_cors_layer(&config)?;
    let state = ServerState::new(config, person_store, piece_store);

    let home_router: Router = Router::new()
        .route("/", get(home))
        .with_state(state.clone());

    let app: Router = home_router
        .merge(make_piece_routes(state.clone()))
        .merge(make_person_routes(state.clone()))
        .layer(middleware::from_fn_with_state(state.clone(), log_requests))
        .layer(cors);

    Ok(app)
}

pub async fn run_server(
    config: ServerConfig,
    person_store: GuardedPersonStore,
    piece_store: GuardedPieceStore,
) -> Result<()> {
    let port = config.port;
    let app = make_app(config, person_store, piece_store)?;

    let listener = tokio::net::TcpListener::bind(format!("127.0.0.1:{}", port))
        .await
        .with_context(|| format!("Failed to bind port {}", port))?;
    info!("Listening on {}", listener.local_addr()?);

    Ok(axum::serve(listener, app).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog_store::SqliteCatalogStore;
    use crate::server::RequestsLoggingLevel;
    use axum::{body::Body, http::Request, http::StatusCode};
    use std::sync::Arc;
    use tempfile::TempDir;
    use tower::ServiceExt; // for `oneshot`

    fn make_test_app(config: ServerConfig) -> (TempDir, Router) {
        let temp_dir = TempDir::new().unwrap();
        let store = SqliteCatalogStore::new(temp_dir.path().join("catalog.db"), 1).unwrap();
        let app = make_app(config, Arc::new(store.persons()), Arc::new(store.pieces())).unwrap();
        (temp_dir, app)
    }

    fn quiet_config() -> ServerConfig {
        ServerConfig {
            requests_logging_level: RequestsLoggingLevel::None,
            piece_cache_ttl_sec: 0,
            ..Default::default()
        }
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn formats_uptime() {
        assert_eq!(format_uptime(Duration::from_secs(0)), "0d 00:00:00");
        assert_eq!(
            format_uptime(Duration::from_secs(2 * 86_400 + 3 * 3600 + 4 * 60 + 5)),
            "2d 03:04:05"
        );
    }

    #[tokio::test]
    async fn home_reports_stats() {
        let (_temp_dir, app) = make_test_app(quiet_config());

        let request = Request::builder().uri("/").body(Body::empty()).unwrap();
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert!(body["uptime"].as_str().unwrap().starts_with("0d"));
        assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
        assert!(body["hash"].is_string());
    }

    #[tokio::test]
    async fn unknown_piece_is_not_found_envelope() {
        let (_temp_dir, app) = make_test_app(quiet_config());

        let request = Request::builder()
            .uri("/pieces/404")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = body_json(response).await;
        assert_eq!(body["error"]["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn non_numeric_id_is_bad_request() {
        let (_temp_dir, app) = make_test_app(quiet_config());

        let request = Request::builder()
            .uri("/persons/abc")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn malformed_json_is_bad_request() {
        let (_temp_dir, app) = make_test_app(quiet_config());

        let request = Request::builder()
            .method("POST")
            .uri("/pieces")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{\"title\": "))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["error"]["code"], "BAD_REQUEST");
    }

    #[tokio::test]
    async fn allows_configured_cors_origin() {
        let (_temp_dir, app) = make_test_app(quiet_config());

        let request = Request::builder()
            .method("OPTIONS")
            .uri("/pieces")
            .header(header::ORIGIN, DEFAULT_CORS_ORIGIN)
            .header(header::ACCESS_CONTROL_REQUEST_METHOD, "PATCH")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(
            response
                .headers()
                .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
                .unwrap(),
            DEFAULT_CORS_ORIGIN
        );
    }

    #[test]
    fn rejects_invalid_cors_origin() {
        let config = ServerConfig {
            cors_origins: vec!["http://bad\norigin".to_string()],
            ..quiet_config()
        };
        assert!(make_cors_layer(&config).is_err());
    }
}
