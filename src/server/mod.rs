//! HTTP API.
//!
//! Every query handler reloads the series and runs on the blocking pool; the
//! only shared mutable state is the preference store.

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::app::pipeline::CarbonService;
use crate::config::Settings;
use crate::data::SeriesStore;
use crate::error::AppError;
use crate::preferences::PreferenceStore;
use crate::prompt::{Interpreter, OllamaInterpreter, PromptService};

pub mod error;
pub mod page;
pub mod routes;

pub use error::ApiError;

/// Application state shared across handlers
#[derive(Debug, Clone)]
pub struct AppState {
    pub service: CarbonService,
    pub preferences: PreferenceStore,
    pub prompts: PromptService,
}

impl AppState {
    pub fn new(service: CarbonService, interpreter: Arc<dyn Interpreter>, default_series: &str) -> Self {
        Self {
            prompts: PromptService::new(interpreter, service.clone(), default_series),
            service,
            preferences: PreferenceStore::new(),
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        let service = CarbonService::new(SeriesStore::new(&settings.data_dir));
        let interpreter = Arc::new(OllamaInterpreter::from_settings(settings));
        Self::new(service, interpreter, &settings.default_series)
    }
}

pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(routes::health))
        .route("/max/", get(routes::max))
        .route("/min/", get(routes::min))
        .route("/average/", get(routes::average))
        .route("/variance/", get(routes::variance))
        .route("/predict_least_carbon/", get(routes::predict_least_carbon))
        .route(
            "/predict_advanced_least_carbon/",
            get(routes::predict_advanced_least_carbon),
        )
        .route("/preferences/", post(routes::save_preferences))
        .route("/preferences/:customer_id", get(routes::get_preferences))
        .route("/give_prompt/", get(routes::give_prompt))
        .route("/process_prompt/", get(routes::process_prompt))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Bind and serve until Ctrl-C.
pub async fn serve(settings: &Settings) -> Result<(), AppError> {
    let app = build_router(AppState::from_settings(settings));
    let addr = settings.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::Io(format!("Failed to bind {addr}: {e}")))?;

    tracing::info!(
        data_dir = %settings.data_dir.display(),
        "carbon-insight v{} listening on {addr}",
        env!("CARGO_PKG_VERSION")
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| AppError::Io(format!("Server error: {e}")))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}

#[cfg(test)]
mod tests {
    use std::fs;

    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode};
    use chrono::{TimeZone, Utc};
    use serde_json::{Value, json};
    use tempfile::TempDir;
    use tower::ServiceExt;

    use super::*;
    use crate::domain::{Concept, Interpretation};

    struct Fixed;

    impl Interpreter for Fixed {
        fn interpret(&self, _prompt: &str) -> Result<Interpretation, AppError> {
            Ok(Interpretation {
                start: Utc.with_ymd_and_hms(2019, 12, 1, 0, 0, 0).unwrap(),
                end: Utc.with_ymd_and_hms(2019, 12, 1, 2, 0, 0).unwrap(),
                concept: Concept::MaximumCarbonIntensity,
            })
        }
    }

    fn app() -> (TempDir, Router) {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("caiso_carbon_intensity.json"),
            r#"{"data": [
                {"datetime": "2019-12-01T00:00:00Z", "carbon_intensity": 312},
                {"datetime": "2019-12-01T01:00:00Z", "carbon_intensity": 416},
                {"datetime": "2019-12-01T02:00:00Z", "carbon_intensity": 500}
            ]}"#,
        )
        .unwrap();
        let service = CarbonService::new(SeriesStore::new(dir.path()));
        let state = AppState::new(service, Arc::new(Fixed), "caiso_carbon_intensity");
        (dir, build_router(state))
    }

    async fn get_json(app: Router, uri: &str) -> (StatusCode, Value) {
        let resp = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = resp.status();
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn max_and_min_over_half_open_window() {
        let (_dir, app) = app();
        let q = "ts_id=caiso_carbon_intensity&start=2019-12-01T00:00:00Z&end=2019-12-01T02:00:00Z";

        let (status, body) = get_json(app.clone(), &format!("/max/?{q}")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"max": 416.0}));

        let (_, body) = get_json(app.clone(), &format!("/min/?{q}")).await;
        assert_eq!(body, json!({"min": 312.0}));

        let (_, body) = get_json(app, &format!("/average/?{q}")).await;
        assert_eq!(body, json!({"average": 364.0}));
    }

    #[tokio::test]
    async fn domain_errors_are_400_with_detail() {
        let (_dir, app) = app();
        let (status, body) = get_json(app.clone(), "/max/?ts_id=nope&start=2019-12-01&end=2019-12-02").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["detail"].as_str().unwrap().starts_with("File not found"));

        let (status, body) = get_json(
            app,
            "/variance/?ts_id=caiso_carbon_intensity&start=2020-01-01&end=2020-02-01",
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["detail"], "No data available for the given range");
    }

    #[tokio::test]
    async fn missing_parameters_are_422() {
        let (_dir, app) = app();
        let (status, body) = get_json(app, "/max/?ts_id=caiso_carbon_intensity&start=2019-12-01").await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body["detail"].is_string());
    }

    #[tokio::test]
    async fn seasonal_prediction_shape() {
        let (_dir, app) = app();
        let (status, body) = get_json(app, "/predict_least_carbon/?ts_id=caiso_carbon_intensity").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["month"], 12);
        assert_eq!(body["predicted_value"], 409);
        assert!(body["year"].is_i64());
    }

    #[tokio::test]
    async fn preferences_round_trip_and_overwrite() {
        let (_dir, app) = app();
        let post = |payload: Value| {
            Request::builder()
                .method("POST")
                .uri("/preferences/")
                .header("content-type", "application/json")
                .body(Body::from(payload.to_string()))
                .unwrap()
        };

        let resp = app
            .clone()
            .oneshot(post(json!({"customer_id": "c1", "preferences": {"region": "caiso"}})))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = serde_json::from_slice(&to_bytes(resp.into_body(), usize::MAX).await.unwrap()).unwrap();
        assert_eq!(
            body,
            json!({"message": "Preferences saved successfully", "data": {"c1": {"region": "caiso"}}})
        );

        app.clone()
            .oneshot(post(json!({"customer_id": "c1", "preferences": {"region": "ercot"}})))
            .await
            .unwrap();
        let (_, body) = get_json(app.clone(), "/preferences/c1").await;
        assert_eq!(body, json!({"customer_id": "c1", "preferences": {"region": "ercot"}}));

        let (status, _) = get_json(app.clone(), "/preferences/unknown").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let resp = app
            .oneshot(post(json!({"preferences": {}})))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn prompt_page_shows_the_answer() {
        let (_dir, app) = app();
        let resp = app
            .oneshot(
                Request::builder()
                    .uri("/process_prompt/?prompt=highest%20on%20Dec%201")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let html = String::from_utf8(to_bytes(resp.into_body(), usize::MAX).await.unwrap().to_vec()).unwrap();
        assert!(html.contains("highest on Dec 1"));
        assert!(html.contains("get_max(id, start, end) will return 416 Tons CO2e/GWh, in December 2019."));
    }

    #[tokio::test]
    async fn health_reports_version() {
        let (_dir, app) = app();
        let (status, body) = get_json(app, "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "alive");
        assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    }
}
