use axum::{
    body::Bytes,
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::{header, HeaderValue, Method},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::{CorsProfile, GatewayConfig};
use crate::error::{ApiError, Fault};
use crate::food::api::NutritionixClient;
use crate::providers::openai::openai::{ChatRequest, OpenAIProvider};

const OPENAI_REQUEST: &str = "OpenAI request";
const NUTRITIONIX_SEARCH: &str = "Nutritionix search";
const NUTRITIONIX_BARCODE: &str = "Nutritionix barcode lookup";

#[derive(Clone)]
pub struct AppState {
    openai: Arc<OpenAIProvider>,
    nutritionix: Arc<NutritionixClient>,
}

impl AppState {
    pub fn new(config: &GatewayConfig) -> Self {
        let client = reqwest::Client::new();

        Self {
            openai: Arc::new(OpenAIProvider::new(
                config.openai_api_key.clone(),
                config.openai_api_url.clone(),
                config.openai_chat_model.clone(),
                client.clone(),
            )),
            nutritionix: Arc::new(NutritionixClient::new(
                config.nutritionix.clone(),
                config.nutritionix_api_url.clone(),
                client,
            )),
        }
    }
}

/// `query` stays a raw JSON value so a non-string is reported as a missing
/// query rather than a body rejection.
#[derive(Deserialize)]
pub struct SearchRequest {
    #[serde(default)]
    query: Option<Value>,
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    message: &'static str,
}

/// Create and configure the API router
pub fn create_api(config: &GatewayConfig) -> Router {
    Router::new()
        .route("/", get(health_check))
        .route("/api/ai", post(chat_handler))
        .route("/api/nutritionix/search", post(nutritionix_search_handler))
        .route("/api/nutritionix/barcode/:upc", get(nutritionix_barcode_handler))
        .layer(cors_layer(&config.cors))
        .layer(TraceLayer::new_for_http())
        .with_state(AppState::new(config))
}

fn cors_layer(profile: &CorsProfile) -> CorsLayer {
    match profile {
        CorsProfile::Permissive => CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any),
        CorsProfile::Strict { origins } => {
            let origins: Vec<HeaderValue> = origins
                .iter()
                .filter_map(|origin| match HeaderValue::from_str(origin) {
                    Ok(value) => Some(value),
                    Err(_) => {
                        tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                        None
                    }
                })
                .collect();

            CorsLayer::new()
                .allow_origin(origins)
                .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
                .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        }
    }
}

fn json_response(body: Bytes) -> Response {
    ([(header::CONTENT_TYPE, "application/json")], body).into_response()
}

fn reject_body(operation: &'static str, rejection: JsonRejection) -> ApiError {
    ApiError::new(operation, Fault::InvalidInput(format!("Invalid request body: {}", rejection.body_text())))
}

fn reject_path(operation: &'static str, rejection: PathRejection) -> ApiError {
    ApiError::new(operation, Fault::InvalidInput(format!("Invalid request path: {}", rejection.body_text())))
}

async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        message: "Backend is running",
    })
}

async fn chat_handler(
    State(state): State<AppState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    state
        .openai
        .require_api_key()
        .map_err(|fault| ApiError::new(OPENAI_REQUEST, fault))?;

    let Json(request) = payload.map_err(|e| reject_body(OPENAI_REQUEST, e))?;

    let body = state
        .openai
        .complete(request)
        .await
        .map_err(|fault| ApiError::new(OPENAI_REQUEST, fault))?;

    Ok(json_response(body))
}

async fn nutritionix_search_handler(
    State(state): State<AppState>,
    payload: Result<Json<SearchRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    state
        .nutritionix
        .require_credentials()
        .map_err(|fault| ApiError::new(NUTRITIONIX_SEARCH, fault))?;

    let Json(request) = payload.map_err(|e| reject_body(NUTRITIONIX_SEARCH, e))?;
    let query = match request.query {
        Some(Value::String(query)) if !query.trim().is_empty() => query,
        _ => {
            return Err(ApiError::new(
                NUTRITIONIX_SEARCH,
                Fault::InvalidInput("Missing query".to_string()),
            ))
        }
    };

    let body = state
        .nutritionix
        .search_nutrients(&query)
        .await
        .map_err(|fault| ApiError::new(NUTRITIONIX_SEARCH, fault))?;

    Ok(json_response(body))
}

async fn nutritionix_barcode_handler(
    State(state): State<AppState>,
    upc: Result<Path<String>, PathRejection>,
) -> Result<Response, ApiError> {
    let Path(upc) = upc.map_err(|e| reject_path(NUTRITIONIX_BARCODE, e))?;
    let body = state
        .nutritionix
        .lookup_barcode(&upc)
        .await
        .map_err(|fault| ApiError::new(NUTRITIONIX_BARCODE, fault))?;

    Ok(json_response(body))
}
