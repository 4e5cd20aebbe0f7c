//! API route handlers

use std::collections::HashMap;

use axum::Json;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::response::Html;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::domain::Statistic;
use crate::error::AppError;
use crate::preferences::Preferences;
use crate::server::AppState;
use crate::server::error::ApiError;
use crate::server::page::prompt_page;

#[derive(Debug, Deserialize)]
pub struct RangeParams {
    pub ts_id: String,
    pub start: String,
    pub end: String,
}

#[derive(Debug, Deserialize)]
pub struct SeriesParams {
    pub ts_id: String,
}

#[derive(Debug, Deserialize)]
pub struct ForecastParams {
    pub ts_id: String,
    pub start_date: String,
    pub end_date: String,
}

#[derive(Debug, Deserialize)]
pub struct PromptParams {
    pub prompt: String,
}

#[derive(Debug, Deserialize)]
pub struct SavePreferences {
    pub customer_id: String,
    pub preferences: Preferences,
}

#[derive(Debug, Serialize)]
pub struct SavedPreferences {
    pub message: &'static str,
    pub data: HashMap<String, Preferences>,
}

#[derive(Debug, Serialize)]
pub struct CustomerPreferences {
    pub customer_id: String,
    pub preferences: Preferences,
}

#[derive(Debug, Serialize)]
pub struct AdvancedPrediction {
    pub month: u32,
    pub predicted_value: i64,
}

/// Run CPU-bound or blocking work off the async workers.
async fn blocking<T, F>(work: F) -> Result<T, ApiError>
where
    F: FnOnce() -> Result<T, AppError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| AppError::Data(format!("Worker task failed: {e}")))?
        .map_err(ApiError::from)
}

async fn range_statistic(
    state: AppState,
    query: Result<Query<RangeParams>, QueryRejection>,
    stat: Statistic,
) -> Result<Json<Value>, ApiError> {
    let Query(p) = query?;
    let value = blocking(move || state.service.statistic(&p.ts_id, stat, &p.start, &p.end)).await?;

    let mut body = Map::new();
    body.insert(stat.key().to_string(), Value::from(value));
    Ok(Json(Value::Object(body)))
}

pub async fn max(
    State(state): State<AppState>,
    query: Result<Query<RangeParams>, QueryRejection>,
) -> Result<Json<Value>, ApiError> {
    range_statistic(state, query, Statistic::Max).await
}

pub async fn min(
    State(state): State<AppState>,
    query: Result<Query<RangeParams>, QueryRejection>,
) -> Result<Json<Value>, ApiError> {
    range_statistic(state, query, Statistic::Min).await
}

pub async fn average(
    State(state): State<AppState>,
    query: Result<Query<RangeParams>, QueryRejection>,
) -> Result<Json<Value>, ApiError> {
    range_statistic(state, query, Statistic::Average).await
}

pub async fn variance(
    State(state): State<AppState>,
    query: Result<Query<RangeParams>, QueryRejection>,
) -> Result<Json<Value>, ApiError> {
    range_statistic(state, query, Statistic::Variance).await
}

pub async fn predict_least_carbon(
    State(state): State<AppState>,
    query: Result<Query<SeriesParams>, QueryRejection>,
) -> Result<Json<crate::domain::SeasonalPrediction>, ApiError> {
    let Query(p) = query?;
    let prediction = blocking(move || state.service.predict_least_carbon(&p.ts_id)).await?;
    Ok(Json(prediction))
}

pub async fn predict_advanced_least_carbon(
    State(state): State<AppState>,
    query: Result<Query<ForecastParams>, QueryRejection>,
) -> Result<Json<AdvancedPrediction>, ApiError> {
    let Query(p) = query?;
    let forecast = blocking(move || state.service.predict_advanced(&p.ts_id, &p.start_date, &p.end_date)).await?;
    Ok(Json(AdvancedPrediction {
        month: forecast.month,
        predicted_value: forecast.predicted_value,
    }))
}

pub async fn save_preferences(
    State(state): State<AppState>,
    payload: Result<Json<SavePreferences>, JsonRejection>,
) -> Result<Json<SavedPreferences>, ApiError> {
    let Json(req) = payload?;
    let data = state.preferences.save(&req.customer_id, req.preferences);
    Ok(Json(SavedPreferences {
        message: "Preferences saved successfully",
        data,
    }))
}

pub async fn get_preferences(
    State(state): State<AppState>,
    Path(customer_id): Path<String>,
) -> Result<Json<CustomerPreferences>, ApiError> {
    let preferences = state.preferences.get(&customer_id)?;
    Ok(Json(CustomerPreferences {
        customer_id,
        preferences,
    }))
}

pub async fn give_prompt() -> Html<String> {
    Html(prompt_page(None, None))
}

pub async fn process_prompt(
    State(state): State<AppState>,
    query: Result<Query<PromptParams>, QueryRejection>,
) -> Result<Html<String>, ApiError> {
    let Query(p) = query?;
    let prompt = p.prompt.clone();
    let output = match blocking(move || state.prompts.answer(&prompt)).await {
        Ok(answer) => answer,
        Err(ApiError::Domain(err)) => {
            tracing::warn!(error = %err, "could not answer prompt");
            format!("Could not process the prompt: {err}")
        }
        Err(other) => return Err(other),
    };
    Ok(Html(prompt_page(Some(&p.prompt), Some(&output))))
}

/// Liveness probe
pub async fn health() -> Json<Value> {
    Json(serde_json::json!({
        "status": "alive",
        "version": env!("CARGO_PKG_VERSION")
    }))
}
