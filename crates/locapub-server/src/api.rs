use std::sync::Arc;

use axum::{
    extract::{DefaultBodyLimit, State},
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{debug, info};

use locapub_shared::constants::{
    PATH_DELETE_SUPPORT, PATH_DISTRIBUTE_CAMPAIGN, PATH_GENERATE_CONTENT, PATH_INSERT_CAMPAIGN,
    PATH_INSERT_SUPPORT, PATH_MODIFY_SUPPORT, PATH_READ_ALL_CAMPAIGNS, PATH_READ_ALL_SUPPORTS,
};
use locapub_shared::protocol::{
    DeleteSupportRequest, DistributeRequest, GenerateRequest, GenerateResponse,
    ModifySupportRequest, NewCampaign, NewSupport, OwnerFilter,
};
use locapub_shared::{CampaignId, SupportId};

use crate::config::ServerConfig;
use crate::error::ServerError;
use crate::generate;
use crate::records::RecordStore;

#[derive(Clone)]
pub struct AppState {
    pub records: Arc<RecordStore>,
    pub config: Arc<ServerConfig>,
}

impl AppState {
    pub fn new(config: ServerConfig) -> Self {
        Self {
            records: Arc::new(RecordStore::new()),
            config: Arc::new(config),
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any);

    let webhook = Router::new()
        .route(&route(PATH_GENERATE_CONTENT), post(create_content))
        .route(&route(PATH_INSERT_SUPPORT), post(insert_support))
        .route(&route(PATH_READ_ALL_SUPPORTS), post(read_all_supports))
        .route(&route(PATH_MODIFY_SUPPORT), post(modify_support))
        .route(&route(PATH_DELETE_SUPPORT), post(delete_support))
        .route(&route(PATH_INSERT_CAMPAIGN), post(insert_campaign))
        .route(&route(PATH_READ_ALL_CAMPAIGNS), post(read_all_campaigns))
        .route(&route(PATH_DISTRIBUTE_CAMPAIGN), post(distribute_campaign));

    Router::new()
        .route("/health", get(health_check))
        .nest("/webhook", webhook)
        .layer(DefaultBodyLimit::max(state.config.max_body_bytes))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn route(path: &str) -> String {
    format!("/{path}")
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    name: String,
    version: &'static str,
}

#[derive(Serialize)]
struct SupportCreated {
    #[serde(rename = "_id")]
    id: SupportId,
}

#[derive(Serialize)]
struct CampaignCreated {
    #[serde(rename = "_id")]
    id: CampaignId,
}

#[derive(Serialize)]
struct DistributionQueued {
    status: &'static str,
    #[serde(rename = "Campagne")]
    campaign_id: CampaignId,
}

async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        name: state.config.instance_name.clone(),
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// The webhook answers an empty collection with an empty body.
fn list_response<T: Serialize>(items: Vec<T>) -> Result<Response, ServerError> {
    if items.is_empty() {
        return Ok(StatusCode::OK.into_response());
    }
    let body = serde_json::to_vec(&items).map_err(|e| ServerError::Internal(e.to_string()))?;
    Ok((
        StatusCode::OK,
        [(axum::http::header::CONTENT_TYPE, "application/json")],
        body,
    )
        .into_response())
}

async fn create_content(
    Json(request): Json<GenerateRequest>,
) -> Result<Json<GenerateResponse>, ServerError> {
    let payload = generate::generate(&request)?;
    debug!(kind = request.kind.label(), len = payload.len(), "Content generated");
    Ok(Json(GenerateResponse {
        payload: Some(payload),
    }))
}

async fn insert_support(
    State(state): State<AppState>,
    Json(support): Json<NewSupport>,
) -> Result<Json<SupportCreated>, ServerError> {
    let id = state.records.insert_support(support).await?;
    Ok(Json(SupportCreated { id }))
}

async fn read_all_supports(
    State(state): State<AppState>,
    Json(filter): Json<OwnerFilter>,
) -> Result<Response, ServerError> {
    list_response(state.records.supports_of(&filter.user).await)
}

async fn modify_support(
    State(state): State<AppState>,
    Json(request): Json<ModifySupportRequest>,
) -> Result<StatusCode, ServerError> {
    state.records.rename_support(&request.id, &request.title).await?;
    Ok(StatusCode::OK)
}

async fn delete_support(
    State(state): State<AppState>,
    Json(request): Json<DeleteSupportRequest>,
) -> Result<StatusCode, ServerError> {
    state.records.delete_support(&request.id).await?;
    Ok(StatusCode::OK)
}

async fn insert_campaign(
    State(state): State<AppState>,
    Json(campaign): Json<NewCampaign>,
) -> Result<Json<CampaignCreated>, ServerError> {
    let id = state.records.insert_campaign(campaign).await?;
    Ok(Json(CampaignCreated { id }))
}

async fn read_all_campaigns(
    State(state): State<AppState>,
    Json(filter): Json<OwnerFilter>,
) -> Result<Response, ServerError> {
    list_response(state.records.campaigns_of(&filter.user).await)
}

async fn distribute_campaign(
    State(state): State<AppState>,
    Json(request): Json<DistributeRequest>,
) -> Result<Json<DistributionQueued>, ServerError> {
    let campaign_id = request.campaign_id.clone();
    state.records.distribute(request).await?;
    Ok(Json(DistributionQueued {
        status: "queued",
        campaign_id,
    }))
}

/// Bind `addr` and serve until the task is dropped.
pub async fn serve(state: AppState, addr: std::net::SocketAddr) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    serve_listener(state, listener).await
}

/// Serve on an already bound listener.
pub async fn serve_listener(
    state: AppState,
    listener: tokio::net::TcpListener,
) -> anyhow::Result<()> {
    let app = build_router(state);

    info!(addr = %listener.local_addr()?, "Starting HTTP API server");

    axum::serve(listener, app).await?;

    Ok(())
}
