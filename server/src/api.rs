//! # REST API
//!
//! Builds the axum router that exposes the vault over HTTP. All endpoints
//! share application state through axum's `State` extractor.
//!
//! ## Endpoints
//!
//! | Method | Path                         | Description                          |
//! |--------|------------------------------|--------------------------------------|
//! | GET    | `/health`                    | Liveness probe                       |
//! | GET    | `/api/health`                | Liveness probe (enveloped)           |
//! | POST   | `/api/wallet`                | Provision the wallet (idempotent)    |
//! | GET    | `/api/wallet`                | Public view of the wallet            |
//! | POST   | `/api/credentials`           | Encrypt and store a credential       |
//! | GET    | `/api/credentials`           | List credential metadata             |
//! | GET    | `/api/credentials/:id`       | Decrypt one credential               |
//! | POST   | `/api/credentials/:id/share` | Issue a share token                  |
//! | POST   | `/api/verify`                | Redeem a share token                 |
//!
//! Every `/api` response is an [`ApiResponse`] envelope:
//! `{ "success": true, "data": ... }` or `{ "success": false, "error": "..." }`.

use axum::{
    body::Bytes,
    extract::{
        rejection::{BytesRejection, JsonRejection},
        DefaultBodyLimit, Path, State,
    },
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use credvault::identity::DidMethod;
use credvault::share::ShareRejection;
use credvault::vault::NewCredential;
use credvault::{VaultError, VaultService};

use crate::metrics::SharedMetrics;

/// Headroom on top of `max_payload_bytes` for the request envelope
/// (issuer, subject, type tags, JSON punctuation).
const BODY_LIMIT_SLACK: usize = 64 * 1024;

// ---------------------------------------------------------------------------
// Application State
// ---------------------------------------------------------------------------

/// Shared application state available to all request handlers.
///
/// Cheap to clone. Everything is behind `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// Server version string reported by `/health`.
    pub version: String,
    pub service: Arc<VaultService>,
    pub metrics: SharedMetrics,
}

// ---------------------------------------------------------------------------
// Router Construction
// ---------------------------------------------------------------------------

/// Builds the full axum [`Router`] with all API routes, CORS, body limit and
/// tracing.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any);

    let body_limit = state
        .service
        .config()
        .max_payload_bytes
        .saturating_add(BODY_LIMIT_SLACK);

    let api = Router::new()
        .route("/health", get(api_health_handler))
        .route("/wallet", post(create_wallet_handler).get(get_wallet_handler))
        .route(
            "/credentials",
            post(store_credential_handler).get(list_credentials_handler),
        )
        .route("/credentials/:id", get(get_credential_handler))
        .route("/credentials/:id/share", post(share_credential_handler))
        .route("/verify", post(verify_handler));

    Router::new()
        .route("/health", get(health_handler))
        .nest("/api", api)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Envelope & Errors
// ---------------------------------------------------------------------------

/// The response envelope used by every `/api` endpoint.
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    fn ok(data: T) -> Json<Self> {
        Json(Self {
            success: true,
            data: Some(data),
            error: None,
        })
    }
}

/// A failed request: HTTP status plus the message placed in the envelope.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }
}

impl From<VaultError> for ApiError {
    fn from(err: VaultError) -> Self {
        match &err {
            VaultError::InvalidRequest(msg) => Self::bad_request(msg.clone()),
            VaultError::MalformedToken | VaultError::InvalidSignature | VaultError::TokenExpired => {
                Self::bad_request(err.to_string())
            }
            VaultError::WalletNotInitialized => {
                Self::new(StatusCode::NOT_FOUND, "wallet not initialized")
            }
            VaultError::CredentialNotFound(_) => {
                Self::new(StatusCode::NOT_FOUND, "credential not found")
            }
            VaultError::PayloadTooLarge { .. } => {
                Self::new(StatusCode::PAYLOAD_TOO_LARGE, err.to_string())
            }
            VaultError::WalletAlreadyExists => Self::new(StatusCode::CONFLICT, err.to_string()),
            VaultError::AuthenticationFailure
            | VaultError::DecodeError
            | VaultError::KeyEncoding
            | VaultError::Storage(_) => {
                tracing::error!(error = %err, "request failed");
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, "internal error")
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            return Self::new(StatusCode::PAYLOAD_TOO_LARGE, "request body too large");
        }
        Self::bad_request(rejection.body_text())
    }
}

impl From<BytesRejection> for ApiError {
    fn from(rejection: BytesRejection) -> Self {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            return Self::new(StatusCode::PAYLOAD_TOO_LARGE, "request body too large");
        }
        Self::bad_request(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ApiResponse::<()> {
            success: false,
            data: None,
            error: Some(self.message),
        };
        (self.status, Json(body)).into_response()
    }
}

type ApiResult<T> = Result<Json<ApiResponse<T>>, ApiError>;

// ---------------------------------------------------------------------------
// Request Types
// ---------------------------------------------------------------------------

/// Body of `POST /api/wallet`.
#[derive(Debug, Deserialize)]
pub struct CreateWalletRequest {
    pub label: String,
    pub method: DidMethod,
}

/// Body of `POST /api/credentials/:id/share`. May be omitted entirely.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareCredentialRequest {
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
}

/// Body of `POST /api/verify`.
#[derive(Debug, Deserialize)]
pub struct VerifyShareRequest {
    pub token: String,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// `GET /health` - returns 200 if the server is alive.
///
/// Does not touch storage. It's a liveness probe, not a readiness check.
async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(serde_json::json!({ "status": "ok", "version": state.version })),
    )
}

async fn api_health_handler() -> Json<ApiResponse<serde_json::Value>> {
    ApiResponse::ok(serde_json::json!({ "status": "ok" }))
}

/// `POST /api/wallet` - provision the wallet, or return the existing one.
async fn create_wallet_handler(
    State(state): State<AppState>,
    body: Result<Json<CreateWalletRequest>, JsonRejection>,
) -> ApiResult<credvault::vault::WalletPublicView> {
    let Json(req) = body?;
    let (view, created) = state.service.ensure_wallet(&req.label, req.method)?;
    if created {
        state.metrics.wallets_created_total.inc();
    }
    Ok(ApiResponse::ok(view))
}

/// `GET /api/wallet` - public view of the wallet. 404 before provisioning.
async fn get_wallet_handler(
    State(state): State<AppState>,
) -> ApiResult<credvault::vault::WalletPublicView> {
    Ok(ApiResponse::ok(state.service.wallet()?))
}

/// `POST /api/credentials` - encrypt and store. Responds 201 with metadata.
async fn store_credential_handler(
    State(state): State<AppState>,
    body: Result<Json<NewCredential>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<credvault::vault::CredentialMeta>>), ApiError> {
    let Json(new) = body?;
    let meta = state.service.store_credential(new)?;
    state.metrics.credentials_stored_total.inc();
    Ok((StatusCode::CREATED, ApiResponse::ok(meta)))
}

/// `GET /api/credentials` - metadata of every stored credential.
async fn list_credentials_handler(
    State(state): State<AppState>,
) -> ApiResult<Vec<credvault::vault::CredentialMeta>> {
    Ok(ApiResponse::ok(state.service.list_credentials()?))
}

/// `GET /api/credentials/:id` - decrypted credential.
async fn get_credential_handler(
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> ApiResult<credvault::vault::OpenedCredential> {
    let opened = state
        .service
        .open_credential(&id)
        .map_err(|e| record_decrypt_failure(&state, e))?;
    Ok(ApiResponse::ok(opened))
}

/// `POST /api/credentials/:id/share` - issue a share token.
///
/// The body is optional; without one the token lives for the configured
/// default lifetime.
async fn share_credential_handler(
    Path(id): Path<String>,
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> ApiResult<credvault::share::ShareToken> {
    let body = body?;
    let req = if body.iter().all(u8::is_ascii_whitespace) {
        ShareCredentialRequest::default()
    } else {
        serde_json::from_slice::<ShareCredentialRequest>(&body)
            .map_err(|e| ApiError::bad_request(format!("invalid share request: {e}")))?
    };

    let token = state.service.share_credential(&id, req.expires_at)?;
    state.metrics.share_tokens_issued_total.inc();
    Ok(ApiResponse::ok(token))
}

/// `POST /api/verify` - verify a share token and return the credential it
/// grants.
async fn verify_handler(
    State(state): State<AppState>,
    body: Result<Json<VerifyShareRequest>, JsonRejection>,
) -> ApiResult<credvault::vault::OpenedCredential> {
    let Json(req) = body?;
    if req.token.trim().is_empty() {
        return Err(ApiError::bad_request("token is required"));
    }

    let outcome = state.service.verify_share_token(&req.token);
    state
        .metrics
        .share_verifications_total
        .with_label_values(&[outcome_label(outcome.reason)])
        .inc();

    match outcome.reason {
        None if outcome.valid => {}
        Some(ShareRejection::WalletNotInitialized) => {
            return Err(VaultError::WalletNotInitialized.into());
        }
        Some(rejection) => return Err(ApiError::bad_request(rejection.reason())),
        None => return Err(ApiError::bad_request("verification failed")),
    }

    let opened = state
        .service
        .open_credential(&outcome.credential_id)
        .map_err(|e| record_decrypt_failure(&state, e))?;
    Ok(ApiResponse::ok(opened))
}

fn outcome_label(reason: Option<ShareRejection>) -> &'static str {
    match reason {
        None => "valid",
        Some(ShareRejection::Malformed) => "malformed",
        Some(ShareRejection::InvalidSignature) => "invalid_signature",
        Some(ShareRejection::Expired) => "expired",
        Some(ShareRejection::WalletNotInitialized) => "no_wallet",
    }
}

fn record_decrypt_failure(state: &AppState, err: VaultError) -> ApiError {
    if matches!(err, VaultError::AuthenticationFailure | VaultError::DecodeError) {
        state.metrics.decryption_failures_total.inc();
    }
    err.into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use chrono::{Duration, TimeZone};
    use credvault::clock::FixedClock;
    use credvault::config::VaultConfig;
    use credvault::storage::{MemoryCredentialStore, MemoryWalletStore};
    use http_body_util::BodyExt;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn epoch() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap()
    }

    /// Creates a test AppState over in-memory stores and a pinned clock.
    fn test_app_state_with(config: VaultConfig) -> (AppState, Arc<FixedClock>) {
        let clock = Arc::new(FixedClock::new(epoch()));
        let service = VaultService::with_clock(
            Arc::new(MemoryWalletStore::new()),
            Arc::new(MemoryCredentialStore::new()),
            clock.clone(),
            config,
        );
        let state = AppState {
            version: "0.1.0-test".into(),
            service: Arc::new(service),
            metrics: Arc::new(crate::metrics::VaultMetrics::new()),
        };
        (state, clock)
    }

    fn test_app_state() -> (AppState, Arc<FixedClock>) {
        test_app_state_with(VaultConfig::default())
    }

    /// Sends a GET request and returns (status, parsed JSON body).
    async fn get(router: &Router, path: &str) -> (StatusCode, Value) {
        let req = Request::builder().uri(path).body(Body::empty()).unwrap();
        send(router, req).await
    }

    /// Sends a POST request with a JSON body and returns (status, parsed body).
    async fn post_json(router: &Router, path: &str, body: Value) -> (StatusCode, Value) {
        let req = Request::builder()
            .method("POST")
            .uri(path)
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(&body).unwrap()))
            .unwrap();
        send(router, req).await
    }

    async fn send(router: &Router, req: Request<Body>) -> (StatusCode, Value) {
        let resp = router.clone().oneshot(req).await.unwrap();
        let status = resp.status();
        let body = resp.into_body().collect().await.unwrap().to_bytes();
        let json = serde_json::from_slice(&body).unwrap_or(Value::Null);
        (status, json)
    }

    async fn create_wallet(router: &Router) -> Value {
        let (status, body) =
            post_json(router, "/api/wallet", json!({ "label": "Alice", "method": "key" })).await;
        assert_eq!(status, StatusCode::OK);
        body["data"].clone()
    }

    async fn store_diploma(router: &Router) -> Value {
        let (status, body) = post_json(
            router,
            "/api/credentials",
            json!({
                "issuer": "did:web:university.example",
                "subject": "did:key:alice",
                "type": ["VerifiableCredential", "UniversityDegreeCredential"],
                "payload": { "degree": "BSc", "year": 2026 }
            }),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        body["data"].clone()
    }

    // -- health ---------------------------------------------------------------

    #[tokio::test]
    async fn health_endpoints_return_ok() {
        let (state, _) = test_app_state();
        let router = create_router(state);

        let (status, body) = get(&router, "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");

        let (status, body) = get(&router, "/api/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "success": true, "data": { "status": "ok" } }));
    }

    // -- wallet ---------------------------------------------------------------

    #[tokio::test]
    async fn wallet_is_404_before_creation() {
        let (state, _) = test_app_state();
        let router = create_router(state);
        let (status, body) = get(&router, "/api/wallet").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "wallet not initialized");
    }

    #[tokio::test]
    async fn create_wallet_returns_public_view_only() {
        let (state, _) = test_app_state();
        let metrics = Arc::clone(&state.metrics);
        let router = create_router(state);

        let wallet = create_wallet(&router).await;
        assert_eq!(wallet["label"], "Alice");
        assert_eq!(wallet["method"], "key");
        assert!(wallet["did"].as_str().unwrap().starts_with("did:key:"));
        for field in ["privateKey", "dataKey", "shareSigningKey"] {
            assert!(wallet.get(field).is_none(), "{field} leaked");
        }

        // A second call returns the same wallet and doesn't count again.
        let again = create_wallet(&router).await;
        assert_eq!(again, wallet);
        assert_eq!(metrics.wallets_created_total.get(), 1);

        let (status, body) = get(&router, "/api/wallet").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"], wallet);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn racing_wallet_creation_counts_once() {
        let (state, _) = test_app_state();
        let metrics = Arc::clone(&state.metrics);
        let router = create_router(state);

        let tasks: Vec<_> = (0..8)
            .map(|_| {
                let router = router.clone();
                tokio::spawn(async move { create_wallet(&router).await })
            })
            .collect();
        let mut views = Vec::new();
        for task in tasks {
            views.push(task.await.unwrap());
        }

        assert!(views.iter().all(|v| v == &views[0]));
        assert_eq!(metrics.wallets_created_total.get(), 1);
    }

    #[tokio::test]
    async fn create_wallet_validates_input() {
        let (state, _) = test_app_state();
        let router = create_router(state);

        let (status, body) =
            post_json(&router, "/api/wallet", json!({ "label": "", "method": "key" })).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);

        let (status, body) = post_json(&router, "/api/wallet", json!({ "label": "x" })).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);

        let (status, _) = post_json(
            &router,
            "/api/wallet",
            json!({ "label": "x", "method": "btc" }),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    // -- credentials ----------------------------------------------------------

    #[tokio::test]
    async fn store_requires_wallet() {
        let (state, _) = test_app_state();
        let router = create_router(state);
        let (status, body) = post_json(
            &router,
            "/api/credentials",
            json!({ "issuer": "i", "subject": "s", "type": ["t"], "payload": {} }),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "wallet not initialized");
    }

    #[tokio::test]
    async fn store_list_and_read_credential() {
        let (state, _) = test_app_state();
        let metrics = Arc::clone(&state.metrics);
        let router = create_router(state);
        create_wallet(&router).await;

        let meta = store_diploma(&router).await;
        assert_eq!(meta["status"], "active");
        assert_eq!(meta["type"][1], "UniversityDegreeCredential");
        assert_eq!(meta["hash"].as_str().unwrap().len(), 64);
        assert_eq!(metrics.credentials_stored_total.get(), 1);

        let (status, body) = get(&router, "/api/credentials").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"], json!([meta.clone()]));

        let id = meta["id"].as_str().unwrap();
        let (status, body) = get(&router, &format!("/api/credentials/{id}")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["meta"], meta);
        assert_eq!(body["data"]["payload"], json!({ "degree": "BSc", "year": 2026 }));
    }

    #[tokio::test]
    async fn store_validates_fields() {
        let (state, _) = test_app_state();
        let router = create_router(state);
        create_wallet(&router).await;

        let (status, body) = post_json(
            &router,
            "/api/credentials",
            json!({ "issuer": "i", "subject": "s", "type": [], "payload": {} }),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);

        let (status, _) = post_json(
            &router,
            "/api/credentials",
            json!({ "issuer": "i", "subject": "s", "type": "t", "payload": {} }),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn oversized_payload_is_413() {
        let (state, _) = test_app_state_with(VaultConfig {
            max_payload_bytes: 128,
            ..VaultConfig::default()
        });
        let router = create_router(state);
        create_wallet(&router).await;

        let (status, body) = post_json(
            &router,
            "/api/credentials",
            json!({
                "issuer": "i",
                "subject": "s",
                "type": ["t"],
                "payload": { "blob": "x".repeat(512) }
            }),
        )
        .await;
        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn unknown_credential_is_404() {
        let (state, _) = test_app_state();
        let router = create_router(state);
        create_wallet(&router).await;

        let (status, body) = get(&router, "/api/credentials/nope").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "credential not found");

        let (status, _) = post_json(&router, "/api/credentials/nope/share", json!({})).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    // -- share & verify -------------------------------------------------------

    #[tokio::test]
    async fn share_then_verify_returns_credential() {
        let (state, _) = test_app_state();
        let metrics = Arc::clone(&state.metrics);
        let router = create_router(state);
        create_wallet(&router).await;
        let meta = store_diploma(&router).await;
        let id = meta["id"].as_str().unwrap();

        // No body at all: default lifetime.
        let req = Request::builder()
            .method("POST")
            .uri(format!("/api/credentials/{id}/share"))
            .body(Body::empty())
            .unwrap();
        let (status, body) = send(&router, req).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["credentialId"], id);
        assert_eq!(body["data"]["expiresAt"], "2026-03-01T12:10:00.000Z");
        let token = body["data"]["token"].as_str().unwrap().to_string();

        let (status, body) = post_json(&router, "/api/verify", json!({ "token": token })).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["meta"]["id"], id);
        assert_eq!(body["data"]["payload"]["degree"], "BSc");

        assert_eq!(metrics.share_tokens_issued_total.get(), 1);
        assert_eq!(
            metrics
                .share_verifications_total
                .with_label_values(&["valid"])
                .get(),
            1
        );
    }

    #[tokio::test]
    async fn share_with_explicit_expiry() {
        let (state, _) = test_app_state();
        let router = create_router(state);
        create_wallet(&router).await;
        let meta = store_diploma(&router).await;
        let id = meta["id"].as_str().unwrap();

        let (status, body) = post_json(
            &router,
            &format!("/api/credentials/{id}/share"),
            json!({ "expiresAt": "2026-03-02T00:00:00.000Z" }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["expiresAt"], "2026-03-02T00:00:00.000Z");

        let (status, _) = post_json(
            &router,
            &format!("/api/credentials/{id}/share"),
            json!({ "expiresAt": "tomorrow" }),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        // Parses as a timestamp, but can't be written back as a four-digit year.
        let (status, body) = post_json(
            &router,
            &format!("/api/credentials/{id}/share"),
            json!({ "expiresAt": "+10000-01-01T00:00:00Z" }),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn expired_token_is_rejected_with_reason() {
        let (state, clock) = test_app_state();
        let metrics = Arc::clone(&state.metrics);
        let router = create_router(state);
        create_wallet(&router).await;
        let meta = store_diploma(&router).await;
        let id = meta["id"].as_str().unwrap();

        let (_, body) = post_json(&router, &format!("/api/credentials/{id}/share"), json!({})).await;
        let token = body["data"]["token"].clone();

        clock.advance(Duration::minutes(10) + Duration::seconds(1));
        let (status, body) = post_json(&router, "/api/verify", json!({ "token": token })).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({ "success": false, "error": "token expired" }));
        assert_eq!(
            metrics
                .share_verifications_total
                .with_label_values(&["expired"])
                .get(),
            1
        );
    }

    #[tokio::test]
    async fn garbage_token_is_malformed() {
        let (state, _) = test_app_state();
        let router = create_router(state);
        create_wallet(&router).await;

        let (status, body) =
            post_json(&router, "/api/verify", json!({ "token": "not-a-token" })).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "malformed token");

        let (status, body) = post_json(&router, "/api/verify", json!({ "token": "" })).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "token is required");
    }

    #[tokio::test]
    async fn verify_without_wallet_is_404() {
        let (state, _) = test_app_state();
        let router = create_router(state);
        let (status, body) = post_json(&router, "/api/verify", json!({ "token": "abc" })).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "wallet not initialized");
    }
}
