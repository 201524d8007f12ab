//! # REST + WebSocket API
//!
//! Builds the axum router that exposes the registry node's HTTP
//! interface. All endpoints share application state through axum's
//! `State` extractor.
//!
//! ## Endpoints
//!
//! | Method | Path                     | Description                          |
//! |--------|--------------------------|--------------------------------------|
//! | GET    | `/health`                | Liveness check                       |
//! | GET    | `/status`                | Node status summary                  |
//! | GET    | `/chain/height`          | Height of the chain tip              |
//! | GET    | `/chain/validate`        | Full-chain audit report              |
//! | GET    | `/block/height/:height`  | Block by height                      |
//! | GET    | `/block/hash/:hash`      | Block by hex hash                    |
//! | POST   | `/challenge`             | Issue an ownership challenge         |
//! | POST   | `/claims`                | Submit a signed star claim           |
//! | GET    | `/stars/:address`        | Stars claimed by an address          |
//! | GET    | `/metrics`               | Prometheus exposition                |
//! | GET    | `/ws`                    | WebSocket for live block events      |
//!
//! ## Status Codes
//!
//! Claim rejections keep their distinctions: expired or structurally
//! malformed challenges are the client's request being wrong (400),
//! while a signature that does not verify is an authorization failure
//! (401). Lookups that find nothing are 404.

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Path, State,
    },
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::broadcast;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use polaris_ledger::chain::{Block, BlockBody, ChainDefect, ChainError, ChainManager};
use polaris_ledger::crypto::keys::WalletSignature;
use polaris_ledger::identity::StarAddress;

use crate::metrics::SharedMetrics;

// ---------------------------------------------------------------------------
// Application State
// ---------------------------------------------------------------------------

/// Shared application state available to all request handlers.
///
/// Cheap to clone — everything behind `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// The node's reported version string.
    pub version: String,
    /// The ledger this node serves.
    pub chain: Arc<ChainManager>,
    /// Reference to Prometheus metrics for in-handler recording.
    pub metrics: SharedMetrics,
    /// Broadcast channel for live event notifications.
    pub event_tx: broadcast::Sender<ChainEvent>,
    /// When this node process started, for uptime reporting.
    pub started_at: DateTime<Utc>,
}

/// Events pushed to WebSocket subscribers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ChainEvent {
    /// A new block was sealed onto the chain.
    #[serde(rename = "block_appended")]
    BlockAppended {
        height: u64,
        hash: String,
        address: String,
        timestamp: i64,
    },
}

// ---------------------------------------------------------------------------
// Router Construction
// ---------------------------------------------------------------------------

/// Builds the full axum [`Router`] with all API routes, CORS, and tracing.
///
/// The returned router is ready to be served on the configured API port.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_handler))
        .route("/status", get(status_handler))
        .route("/chain/height", get(chain_height_handler))
        .route("/chain/validate", get(validate_handler))
        .route("/block/height/:height", get(block_by_height_handler))
        .route("/block/hash/:hash", get(block_by_hash_handler))
        .route("/challenge", post(challenge_handler))
        .route("/claims", post(submit_claim_handler))
        .route("/stars/:address", get(stars_handler))
        .route("/metrics", get(metrics_handler))
        .route("/ws", get(ws_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Wire Types
// ---------------------------------------------------------------------------

/// Response payload for `GET /status`.
#[derive(Debug, Serialize, Deserialize)]
pub struct StatusResponse {
    /// Node software version.
    pub version: String,
    /// Height of the chain tip.
    pub height: u64,
    /// Hex hash of the tip block.
    pub tip_hash: String,
    /// Hex hash of the genesis block.
    pub genesis_hash: String,
    /// Seconds since the node process started.
    pub uptime_seconds: u64,
    /// ISO-8601 timestamp of the response.
    pub timestamp: String,
}

/// Response payload for `GET /chain/height`.
#[derive(Debug, Serialize, Deserialize)]
pub struct HeightResponse {
    /// Height of the chain tip.
    pub height: u64,
}

/// Request body for `POST /challenge`.
#[derive(Debug, Serialize, Deserialize)]
pub struct ChallengeRequest {
    /// Bech32 star address of the wallet that wants to claim.
    pub address: String,
}

/// Response payload for `POST /challenge`.
#[derive(Debug, Serialize, Deserialize)]
pub struct ChallengeResponse {
    /// The address the challenge was issued for, echoed back.
    pub address: String,
    /// The message the wallet must sign, byte for byte.
    pub challenge: String,
}

/// Request body for `POST /claims`.
#[derive(Debug, Serialize, Deserialize)]
pub struct ClaimRequest {
    /// Bech32 star address of the claiming wallet.
    pub address: String,
    /// The challenge message, exactly as issued.
    pub message: String,
    /// Hex-encoded Ed25519 signature over the message.
    pub signature: String,
    /// The star payload to notarize. Stored verbatim.
    pub star: serde_json::Value,
}

/// Response payload for `GET /stars/:address`.
#[derive(Debug, Serialize, Deserialize)]
pub struct StarsResponse {
    /// The queried address, echoed back.
    pub address: String,
    /// Star payloads this address has claimed, in chain order.
    pub stars: Vec<serde_json::Value>,
}

/// Response payload for `GET /chain/validate`.
#[derive(Debug, Serialize, Deserialize)]
pub struct ValidateResponse {
    /// True when the audit found no defects.
    pub intact: bool,
    /// Every defect found, in chain order.
    pub problems: Vec<ChainDefect>,
}

/// A block as rendered at the API edge: digests as hex strings.
#[derive(Debug, Serialize, Deserialize)]
pub struct BlockView {
    /// Block height.
    pub height: u64,
    /// Unix timestamp in seconds.
    pub timestamp: i64,
    /// Hex hash of the previous block, absent for genesis.
    pub previous_hash: Option<String>,
    /// Hex hash of this block.
    pub hash: String,
    /// The block body.
    pub body: BlockBodyView,
}

/// Block body as rendered at the API edge.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BlockBodyView {
    /// The chain's fixed first entry.
    Genesis { marker: String },
    /// An admitted star claim.
    StarClaim {
        address: String,
        message: String,
        star: serde_json::Value,
    },
}

impl From<Block> for BlockView {
    fn from(block: Block) -> Self {
        let previous_hash = block.previous_hash_hex();
        let hash = block.hash_hex();
        let body = match block.body {
            BlockBody::Genesis { marker } => BlockBodyView::Genesis { marker },
            BlockBody::StarClaim {
                address,
                message,
                star,
            } => BlockBodyView::StarClaim {
                address: address.to_string(),
                message,
                star,
            },
        };
        BlockView {
            height: block.height,
            timestamp: block.timestamp,
            previous_hash,
            hash,
            body,
        }
    }
}

/// Generic error body returned by REST endpoints on failure.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

// ---------------------------------------------------------------------------
// Error Mapping
// ---------------------------------------------------------------------------

/// HTTP status for a ledger error.
fn chain_error_status(err: &ChainError) -> StatusCode {
    match err {
        ChainError::ChallengeExpired { .. } | ChainError::MalformedChallenge(_) => {
            StatusCode::BAD_REQUEST
        }
        ChainError::InvalidSignature { .. } => StatusCode::UNAUTHORIZED,
        ChainError::NotFound { .. } => StatusCode::NOT_FOUND,
    }
}

/// Metric label for a rejected claim.
fn rejection_reason(err: &ChainError) -> &'static str {
    match err {
        ChainError::ChallengeExpired { .. } => "expired",
        ChainError::InvalidSignature { .. } => "invalid_signature",
        ChainError::MalformedChallenge(_) => "malformed",
        ChainError::NotFound { .. } => "not_found",
    }
}

/// Build a JSON error response with the given status.
fn error_response(status: StatusCode, error: String) -> Response {
    (status, Json(ErrorResponse { error })).into_response()
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// `GET /health` — returns 200 if the node is alive.
///
/// This is the liveness check for orchestrators (k8s, systemd, etc.).
/// It intentionally does not audit the chain — that belongs in
/// `/chain/validate`.
async fn health_handler() -> impl IntoResponse {
    (StatusCode::OK, Json(serde_json::json!({ "status": "ok" })))
}

/// `GET /status` — returns a node status summary.
async fn status_handler(State(state): State<AppState>) -> impl IntoResponse {
    let height = state.chain.chain_height().await;
    let tip_hash = state
        .chain
        .block_by_height(height)
        .await
        .map(|b| b.hash_hex())
        .unwrap_or_default();
    let genesis_hash = state
        .chain
        .block_by_height(0)
        .await
        .map(|b| b.hash_hex())
        .unwrap_or_default();

    let resp = StatusResponse {
        version: state.version.clone(),
        height,
        tip_hash,
        genesis_hash,
        uptime_seconds: (Utc::now() - state.started_at).num_seconds().max(0) as u64,
        timestamp: Utc::now().to_rfc3339(),
    };
    Json(resp)
}

/// `GET /chain/height` — returns the height of the chain tip.
async fn chain_height_handler(State(state): State<AppState>) -> impl IntoResponse {
    let height = state.chain.chain_height().await;
    state.metrics.chain_height.set(height as i64);
    Json(HeightResponse { height })
}

/// `GET /block/height/:height` — returns the block at the given height.
///
/// Returns 404 when the height is past the tip.
async fn block_by_height_handler(
    Path(height): Path<u64>,
    State(state): State<AppState>,
) -> Response {
    match state.chain.block_by_height(height).await {
        Some(block) => (StatusCode::OK, Json(BlockView::from(block))).into_response(),
        None => error_response(
            StatusCode::NOT_FOUND,
            format!("no block at height {height}"),
        ),
    }
}

/// `GET /block/hash/:hash` — returns the block with the given hex hash.
///
/// Returns 404 for unknown hashes, including strings that are not valid
/// hex at all.
async fn block_by_hash_handler(
    Path(hash): Path<String>,
    State(state): State<AppState>,
) -> Response {
    match state.chain.block_by_hash(&hash).await {
        Ok(block) => (StatusCode::OK, Json(BlockView::from(block))).into_response(),
        Err(err) => error_response(chain_error_status(&err), err.to_string()),
    }
}

/// `POST /challenge` — issue an ownership challenge for an address.
///
/// The wallet signs the returned challenge string and submits it with
/// the claim. Returns 400 when the address does not parse.
async fn challenge_handler(
    State(state): State<AppState>,
    Json(req): Json<ChallengeRequest>,
) -> Response {
    let address = match req.address.parse::<StarAddress>() {
        Ok(address) => address,
        Err(err) => {
            return error_response(
                StatusCode::BAD_REQUEST,
                format!("invalid address '{}': {err}", req.address),
            );
        }
    };

    let challenge = state.chain.request_challenge(&address).await;
    state.metrics.challenges_issued_total.inc();

    (
        StatusCode::OK,
        Json(ChallengeResponse {
            address: req.address,
            challenge,
        }),
    )
        .into_response()
}

/// `POST /claims` — submit a signed star claim for admission.
///
/// On success the claim is on the chain and the sealed block comes back
/// with 201. Rejections map to 400 (expired or malformed) or 401 (bad
/// signature); none of them touch the chain.
async fn submit_claim_handler(
    State(state): State<AppState>,
    Json(req): Json<ClaimRequest>,
) -> Response {
    let _timer = state.metrics.claim_latency_seconds.start_timer();

    let address = match req.address.parse::<StarAddress>() {
        Ok(address) => address,
        Err(err) => {
            state
                .metrics
                .claims_rejected_total
                .with_label_values(&["malformed"])
                .inc();
            return error_response(
                StatusCode::BAD_REQUEST,
                format!("invalid address '{}': {err}", req.address),
            );
        }
    };

    let signature = match WalletSignature::from_hex(&req.signature) {
        Ok(signature) => signature,
        Err(err) => {
            state
                .metrics
                .claims_rejected_total
                .with_label_values(&["malformed"])
                .inc();
            return error_response(
                StatusCode::BAD_REQUEST,
                format!("invalid signature encoding: {err}"),
            );
        }
    };

    match state
        .chain
        .submit_claim(&address, &req.message, &signature, req.star)
        .await
    {
        Ok(block) => {
            state.metrics.claims_accepted_total.inc();
            state.metrics.blocks_appended_total.inc();
            state.metrics.chain_height.set(block.height as i64);

            // Subscribers may come and go; a send error only means
            // nobody is listening right now.
            let _ = state.event_tx.send(ChainEvent::BlockAppended {
                height: block.height,
                hash: block.hash_hex(),
                address: address.to_string(),
                timestamp: block.timestamp,
            });

            (StatusCode::CREATED, Json(BlockView::from(block))).into_response()
        }
        Err(err) => {
            state
                .metrics
                .claims_rejected_total
                .with_label_values(&[rejection_reason(&err)])
                .inc();
            error_response(chain_error_status(&err), err.to_string())
        }
    }
}

/// `GET /stars/:address` — returns every star the address has claimed.
///
/// Unclaimed (but valid) addresses get an empty list; addresses that do
/// not parse get 400.
async fn stars_handler(Path(address): Path<String>, State(state): State<AppState>) -> Response {
    let parsed = match address.parse::<StarAddress>() {
        Ok(parsed) => parsed,
        Err(err) => {
            return error_response(
                StatusCode::BAD_REQUEST,
                format!("invalid address '{address}': {err}"),
            );
        }
    };

    let stars = state.chain.stars_by_address(&parsed).await;
    (StatusCode::OK, Json(StarsResponse { address, stars })).into_response()
}

/// `GET /chain/validate` — audit the whole chain and report defects.
async fn validate_handler(State(state): State<AppState>) -> impl IntoResponse {
    let problems = state.chain.validate().await;
    Json(ValidateResponse {
        intact: problems.is_empty(),
        problems,
    })
}

/// `GET /metrics` — renders Prometheus text exposition format.
///
/// Returns HTTP 500 if encoding fails (should never happen in practice).
async fn metrics_handler(State(state): State<AppState>) -> Response {
    match state.metrics.encode() {
        Ok(body) => (
            StatusCode::OK,
            [("content-type", "text/plain; version=0.0.4; charset=utf-8")],
            body,
        )
            .into_response(),
        Err(err) => {
            tracing::error!("failed to encode metrics: {}", err);
            (StatusCode::INTERNAL_SERVER_ERROR, "metrics encoding failed").into_response()
        }
    }
}

/// `GET /ws` — WebSocket upgrade for live event streaming.
///
/// Clients receive JSON-encoded [`ChainEvent`] messages for each block
/// appended while they are connected. The connection is push-only;
/// client messages are ignored.
async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_ws_connection(socket, state))
}

/// Drives a single WebSocket connection, forwarding broadcast events
/// until the client disconnects or the channel is closed.
async fn handle_ws_connection(mut socket: WebSocket, state: AppState) {
    let mut rx = state.event_tx.subscribe();

    loop {
        tokio::select! {
            event = rx.recv() => {
                match event {
                    Ok(ev) => {
                        let payload = match serde_json::to_string(&ev) {
                            Ok(s) => s,
                            Err(e) => {
                                tracing::warn!("failed to serialize ws event: {}", e);
                                continue;
                            }
                        };
                        if socket.send(Message::Text(payload)).await.is_err() {
                            // Client disconnected.
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        tracing::warn!("ws subscriber lagged by {} events", n);
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        break;
                    }
                }
            }
            msg = socket.recv() => {
                match msg {
                    Some(Ok(_)) => {
                        // Push-only channel; inbound frames are dropped.
                    }
                    _ => break, // Disconnected or error.
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
