use axum::{
    extract::{ rejection::JsonRejection, DefaultBodyLimit, Request, State },
    http::{ header, HeaderValue, Method, StatusCode },
    middleware::{ self, Next },
    response::{ IntoResponse, Response },
    routing::{ get, post },
    Json,
    Router,
};
use chrono::Utc;
use log::{ info, warn };
use std::collections::BTreeMap;
use std::time::Instant;
use tower::ServiceBuilder;
use tower_http::cors::{ AllowOrigin, Any, CorsLayer };
use uuid::Uuid;

use super::errors::{ bad_request_response, error_response, BODY_TOO_LARGE, INVALID_REQUEST };
use crate::models::relay::{ ApiInfo, ChatReply, ChatRequest, HealthStatus, NotFoundReply };
use crate::relay::Relay;

pub const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;
const ENDPOINTS: [&str; 3] = ["/", "/health", "/chat"];

#[derive(Clone)]
pub struct AppState {
    relay: Relay,
    started_at: Instant,
}

impl AppState {
    pub fn new(relay: Relay) -> Self {
        Self { relay, started_at: Instant::now() }
    }
}

pub fn router(state: AppState, cors_origins: &[String]) -> Router {
    Router::new()
        .route("/", get(api_info_handler))
        .route("/health", get(health_handler))
        .route("/chat", post(chat_handler))
        .fallback(not_found_handler)
        .layer(
            ServiceBuilder::new()
                .layer(middleware::from_fn(log_requests))
                .layer(cors_layer(cors_origins))
                .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        )
        .with_state(state)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let base = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    // tower-http rejects "*" inside an explicit list
    if origins.iter().any(|o| o.trim() == "*") {
        return base.allow_origin(Any);
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .map(|o| o.trim())
        .filter(|o| !o.is_empty())
        .filter_map(|o| match o.parse::<HeaderValue>() {
            Ok(v) => Some(v),
            Err(_) => {
                warn!("Ignoring invalid CORS origin: {}", o);
                None
            }
        })
        .collect();

    if allowed.is_empty() {
        base.allow_origin(Any)
    } else {
        base.allow_origin(AllowOrigin::list(allowed)).allow_credentials(true)
    }
}

async fn log_requests(req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let start = Instant::now();
    let response = next.run(req).await;
    info!("{} {} -> {} ({:?})", method, path, response.status().as_u16(), start.elapsed());
    response
}

async fn chat_handler(
    State(state): State<AppState>,
    payload: Result<Json<ChatRequest>, JsonRejection>
) -> Response {
    let Json(request) = match payload {
        Ok(p) => p,
        Err(rejection) => {
            warn!("Rejected /chat body: {}", rejection.body_text());
            if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
                return error_response(StatusCode::PAYLOAD_TOO_LARGE, BODY_TOO_LARGE);
            }
            return bad_request_response(INVALID_REQUEST);
        }
    };

    let request_id = Uuid::new_v4();
    info!("[{}] chat request with {} history message(s)", request_id, request.history.len());

    match state.relay.answer(request).await {
        Ok(reply) => {
            info!("[{}] reply sent ({} chars)", request_id, reply.len());
            (StatusCode::OK, Json(ChatReply::new(reply))).into_response()
        }
        Err(e) => {
            warn!("[{}] chat request failed", request_id);
            e.into_response()
        }
    }
}

async fn api_info_handler(State(state): State<AppState>) -> Json<ApiInfo> {
    let client = state.relay.chat_client();
    let endpoints = BTreeMap::from([
        ("chat".to_string(), "/chat (POST)".to_string()),
        ("health".to_string(), "/health (GET)".to_string()),
    ]);
    Json(ApiInfo {
        message: "DSA Instructor API is running!".into(),
        status: "healthy".into(),
        version: env!("CARGO_PKG_VERSION").into(),
        timestamp: Utc::now(),
        endpoints,
        provider: client.llm_type().to_string(),
        model: client.get_model(),
    })
}

async fn health_handler(State(state): State<AppState>) -> Json<HealthStatus> {
    Json(HealthStatus {
        status: "ok".into(),
        uptime: state.started_at.elapsed().as_secs_f64(),
        timestamp: Utc::now(),
    })
}

async fn not_found_handler() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(NotFoundReply {
            error: "Endpoint not found".into(),
            available_endpoints: ENDPOINTS.iter().map(|e| e.to_string()).collect(),
            timestamp: Utc::now(),
        }),
    ).into_response()
}
