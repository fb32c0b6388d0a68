//! # Route Handlers
//!
//! One handler per analysis. Each reads the niche from the `market_niche`
//! query parameter, runs the matching use case against the shared
//! [`ExecCtx`](crate::ExecCtx) and wraps the typed result under the use
//! case's response key.

use super::{errors::AppError, state::AppState};
use crate::analysis::{
    competitors, go_to_market, graph, investors, mvp, porter, report, startup, target_market,
    GraphInput,
};
use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::info;

// --- API Payloads ---

/// Query string shared by every analysis route.
#[derive(Deserialize, Debug, Default)]
pub struct NicheParams {
    #[serde(default)]
    pub market_niche: Option<String>,
}

impl NicheParams {
    fn niche(&self) -> Result<&str, AppError> {
        match self.market_niche.as_deref().map(str::trim) {
            Some(niche) if !niche.is_empty() => Ok(niche),
            _ => Err(AppError::BadRequest(
                "query parameter 'market_niche' must be a non-empty string".into(),
            )),
        }
    }
}

/// `{"<key>": <value>}`.
fn keyed<T: Serialize>(key: &str, value: T) -> Result<Json<Value>, AppError> {
    let value = serde_json::to_value(value).map_err(|e| AppError::Internal(e.into()))?;
    let mut body = Map::new();
    body.insert(key.to_string(), value);
    Ok(Json(Value::Object(body)))
}

// --- Handlers ---

pub async fn health_check() -> &'static str {
    "OK"
}

pub async fn go_to_market_handler(
    State(app_state): State<AppState>,
    Query(params): Query<NicheParams>,
) -> Result<Json<Value>, AppError> {
    let niche = params.niche()?;
    info!("Received go-to-market request for niche: '{}'", niche);
    let strategy = go_to_market::analyze(&app_state.ctx, niche).await?;
    keyed(go_to_market::RESPONSE_KEY, strategy)
}

/// Porter's Five Forces.
pub async fn market_handler(
    State(app_state): State<AppState>,
    Query(params): Query<NicheParams>,
) -> Result<Json<Value>, AppError> {
    let niche = params.niche()?;
    info!("Received five forces request for niche: '{}'", niche);
    let forces = porter::analyze(&app_state.ctx, niche).await?;
    keyed(porter::RESPONSE_KEY, forces)
}

pub async fn target_market_handler(
    State(app_state): State<AppState>,
    Query(params): Query<NicheParams>,
) -> Result<Json<Value>, AppError> {
    let niche = params.niche()?;
    info!("Received target market request for niche: '{}'", niche);
    let market = target_market::analyze(&app_state.ctx, niche).await?;
    keyed(target_market::RESPONSE_KEY, market)
}

pub async fn mvp_handler(
    State(app_state): State<AppState>,
    Query(params): Query<NicheParams>,
) -> Result<Json<Value>, AppError> {
    let niche = params.niche()?;
    info!("Received MVP request for niche: '{}'", niche);
    let mvp = mvp::analyze(&app_state.ctx, niche).await?;
    keyed(mvp::RESPONSE_KEY, mvp)
}

pub async fn competitors_handler(
    State(app_state): State<AppState>,
    Query(params): Query<NicheParams>,
) -> Result<Json<Value>, AppError> {
    let niche = params.niche()?;
    info!("Received competitor analysis request for niche: '{}'", niche);
    let analysis = competitors::analyze(&app_state.ctx, niche).await?;
    keyed(competitors::ANALYSIS_KEY, analysis)
}

pub async fn investors_handler(
    State(app_state): State<AppState>,
    Query(params): Query<NicheParams>,
) -> Result<Json<Value>, AppError> {
    let niche = params.niche()?;
    info!("Received investors request for niche: '{}'", niche);
    let investors = investors::analyze(&app_state.ctx, niche).await?;
    keyed(investors::RESPONSE_KEY, investors)
}

pub async fn startup_info_handler(
    State(app_state): State<AppState>,
    Query(params): Query<NicheParams>,
) -> Result<Json<Value>, AppError> {
    let niche = params.niche()?;
    info!("Received startup info request for niche: '{}'", niche);
    let info = startup::analyze(&app_state.ctx, niche).await?;
    keyed(startup::RESPONSE_KEY, info)
}

/// Competitor directory with logos. The body is the directory itself,
/// `{"competitors": [...]}`.
pub async fn directory_handler(
    State(app_state): State<AppState>,
    Query(params): Query<NicheParams>,
) -> Result<Json<competitors::CompetitorDirectory>, AppError> {
    let niche = params.niche()?;
    info!("Received competitor directory request for niche: '{}'", niche);
    let directory = competitors::directory(&app_state.ctx, app_state.logos.as_ref(), niche).await?;
    Ok(Json(directory))
}

pub async fn graph_handler(
    State(app_state): State<AppState>,
    payload: Result<Json<GraphInput>, JsonRejection>,
) -> Result<Json<Value>, AppError> {
    let Json(input) = payload.map_err(|e| AppError::BadRequest(e.body_text()))?;
    if input.market_niche.trim().is_empty() {
        return Err(AppError::BadRequest("'market_niche' must be a non-empty string".into()));
    }
    info!("Received graph request for niche: '{}'", input.market_niche);
    let graph = graph::build(&app_state.ctx, &input).await?;
    keyed(graph::RESPONSE_KEY, graph)
}

pub async fn report_handler(
    State(app_state): State<AppState>,
    Query(params): Query<NicheParams>,
) -> Result<Json<Value>, AppError> {
    let niche = params.niche()?;
    info!("Received report request for niche: '{}'", niche);
    let report = report::generate(&app_state.ctx, niche).await?;
    keyed(report::RESPONSE_KEY, report)
}

/// The report as a PDF download.
pub async fn pdf_handler(
    State(app_state): State<AppState>,
    Query(params): Query<NicheParams>,
) -> Result<Response, AppError> {
    let niche = params.niche()?;
    info!("Received PDF request for niche: '{}'", niche);
    let pdf = report::generate_pdf(&app_state.ctx, app_state.renderer.as_ref(), niche).await?;
    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf"),
            (header::CONTENT_DISPOSITION, "attachment; filename=\"report.pdf\""),
        ],
        pdf,
    )
        .into_response())
}
