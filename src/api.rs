// Investor Commitments - REST API with Axum
//
// Handlers open one read-only session per request; the connection is dropped
// when the handler returns, whichever path it returns through.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::time::Duration;
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::db::{Commitment, Database};
use crate::error::{QueryError, QueryResult};
use crate::format::format_magnitude;
use crate::queries::{self, AssetClassTotal, InvestorRef, InvestorTotal};

pub const API_TITLE: &str = "Investor Commitments API";

const ENDPOINTS: [&str; 5] = [
    "/investors",
    "/asset-classes",
    "/investors/{investor_id}/summary",
    "/investors/{investor_id}/commitments",
    "/investors/{investor_id}/commitments/filter?asset_class=Hedge%20Funds",
];

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
}

// ============================================================================
// Response models (monetary fields formatted here, nowhere else)
// ============================================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct InvestorRefResponse {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RootResponse {
    pub message: String,
    pub endpoints: Vec<String>,
    pub available_investors: Vec<InvestorRefResponse>,
    pub total_investors: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct InvestorResponse {
    pub id: i64,
    pub name: String,
    #[serde(rename = "type")]
    pub investor_type: String,
    pub country: String,
    pub date_added: NaiveDate,
    pub total_commitment: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CommitmentResponse {
    pub id: i64,
    pub investor_id: i64,
    pub asset_class: String,
    pub amount: String,
    pub currency: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AssetClassSummaryResponse {
    pub asset_class: String,
    pub total_commitment: String,
    pub commitment_count: i64,
}

impl From<InvestorRef> for InvestorRefResponse {
    fn from(investor: InvestorRef) -> Self {
        Self {
            id: investor.id,
            name: investor.name,
        }
    }
}

impl From<InvestorTotal> for InvestorResponse {
    fn from(investor: InvestorTotal) -> Self {
        Self {
            id: investor.id,
            name: investor.name,
            investor_type: investor.investor_type,
            country: investor.country,
            date_added: investor.date_added,
            total_commitment: format_magnitude(investor.total_commitment),
        }
    }
}

impl From<Commitment> for CommitmentResponse {
    fn from(commitment: Commitment) -> Self {
        Self {
            id: commitment.id,
            investor_id: commitment.investor_id,
            asset_class: commitment.asset_class,
            amount: format_magnitude(commitment.amount),
            currency: commitment.currency,
        }
    }
}

impl From<AssetClassTotal> for AssetClassSummaryResponse {
    fn from(total: AssetClassTotal) -> Self {
        Self {
            asset_class: total.asset_class,
            total_commitment: format_magnitude(total.total_commitment),
            commitment_count: total.commitment_count,
        }
    }
}

fn convert<T, R: From<T>>(rows: Vec<T>) -> Vec<R> {
    rows.into_iter().map(R::from).collect()
}

impl IntoResponse for QueryError {
    fn into_response(self) -> Response {
        let (status, error_message) = match &self {
            QueryError::InvestorNotFound(_) => (StatusCode::NOT_FOUND, self.to_string()),
            QueryError::Database(e) => {
                tracing::error!("Database error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": error_message,
            "status": status.as_u16(),
        }));

        (status, body).into_response()
    }
}

// ============================================================================
// API Handlers
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct CommitmentsParams {
    pub asset_class: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct FilterParams {
    pub asset_class: String,
}

/// GET / - Welcome message and investor directory
async fn root(State(state): State<AppState>) -> QueryResult<Json<RootResponse>> {
    let conn = state.db.session()?;
    let investors: Vec<InvestorRefResponse> = convert(queries::list_investor_directory(&conn)?);

    Ok(Json(RootResponse {
        message: API_TITLE.to_string(),
        endpoints: ENDPOINTS.iter().map(|e| e.to_string()).collect(),
        total_investors: investors.len(),
        available_investors: investors,
    }))
}

/// GET /health - Health check
async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "version": crate::VERSION,
    }))
}

/// GET /investors - Investors with total commitments, by name
async fn get_investors(State(state): State<AppState>) -> QueryResult<Json<Vec<InvestorResponse>>> {
    let conn = state.db.session()?;
    Ok(Json(convert(queries::list_investors_with_totals(&conn)?)))
}

/// GET /investors/:investor_id/commitments - Optionally filtered by asset class
async fn get_investor_commitments(
    State(state): State<AppState>,
    Path(investor_id): Path<i64>,
    Query(params): Query<CommitmentsParams>,
) -> QueryResult<Json<Vec<CommitmentResponse>>> {
    let conn = state.db.session()?;
    let commitments =
        queries::list_commitments(&conn, investor_id, params.asset_class.as_deref())?;
    Ok(Json(convert(commitments)))
}

/// GET /asset-classes - Distinct asset classes, sorted
async fn get_asset_classes(State(state): State<AppState>) -> QueryResult<Json<Vec<String>>> {
    let conn = state.db.session()?;
    Ok(Json(queries::list_asset_classes(&conn)?))
}

/// GET /investors/:investor_id/summary - Totals per asset class, largest first
async fn get_investor_summary(
    State(state): State<AppState>,
    Path(investor_id): Path<i64>,
) -> QueryResult<Json<Vec<AssetClassSummaryResponse>>> {
    let conn = state.db.session()?;
    Ok(Json(convert(queries::summarize_investor(&conn, investor_id)?)))
}

/// GET /investors/:investor_id/commitments/filter?asset_class=... - asset_class required
async fn filter_investor_commitments(
    State(state): State<AppState>,
    Path(investor_id): Path<i64>,
    Query(params): Query<FilterParams>,
) -> QueryResult<Json<Vec<CommitmentResponse>>> {
    let conn = state.db.session()?;
    let commitments = queries::filter_commitments(&conn, investor_id, &params.asset_class)?;
    Ok(Json(convert(commitments)))
}

// ============================================================================
// Router
// ============================================================================

/// Build the API router. Missing or malformed parameters are rejected by the
/// extractors with 400 before a handler runs.
pub fn create_router(state: AppState, timeout_secs: u64) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .route("/investors", get(get_investors))
        .route("/investors/:investor_id/commitments", get(get_investor_commitments))
        .route(
            "/investors/:investor_id/commitments/filter",
            get(filter_investor_commitments),
        )
        .route("/investors/:investor_id/summary", get(get_investor_summary))
        .route("/asset-classes", get(get_asset_classes))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(Duration::from_secs(timeout_secs)))
        .layer(CorsLayer::permissive())
}
