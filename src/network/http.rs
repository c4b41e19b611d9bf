//! Request/Response Transport
//!
//! `POST /act` carries one protocol message per request and returns one
//! protocol message. Requests may be served concurrently; they all share
//! the adapter's pending store.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State as AxumState,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::network::adapter::CommitRevealAdapter;
use crate::network::protocol::{BotResponse, ErrorCode, ProtocolError};
use crate::network::transport::{shutdown_signal, TransportError};

/// Default listen port.
pub const DEFAULT_HTTP_PORT: u16 = 8080;

/// HTTP transport configuration.
#[derive(Debug, Clone)]
pub struct HttpConfig {
    /// Address to bind.
    pub bind_addr: SocketAddr,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], DEFAULT_HTTP_PORT)),
        }
    }
}

#[derive(Serialize)]
struct HealthzResponse<'a> {
    ok: bool,
    bot: &'a str,
    pending: usize,
}

/// Build the router. Exposed separately so it can be driven without a socket.
pub fn router(adapter: Arc<CommitRevealAdapter>) -> Router {
    Router::new()
        .route("/act", post(act))
        .route("/healthz", get(healthz))
        .layer(TraceLayer::new_for_http())
        .with_state(adapter)
}

/// HTTP status for a protocol error code.
pub fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::InvalidJson | ErrorCode::InvalidRequest | ErrorCode::UnknownPhase => {
            StatusCode::BAD_REQUEST
        }
        ErrorCode::UnknownTick => StatusCode::NOT_FOUND,
        ErrorCode::BotFailed | ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

async fn act(AxumState(adapter): AxumState<Arc<CommitRevealAdapter>>, body: Bytes) -> Response {
    // Body is taken raw so malformed JSON still gets a protocol error payload.
    // The bot decides synchronously, so keep it off the async workers.
    let handled = tokio::task::spawn_blocking(move || match std::str::from_utf8(&body) {
        Ok(text) => adapter.handle_json(text),
        Err(_) => BotResponse::not_utf8(),
    })
    .await;

    let response = match handled {
        Ok(response) => response,
        Err(e) => {
            error!("Request task failed: {}", e);
            BotResponse::Error(ProtocolError::Internal(e.to_string()).to_response())
        }
    };

    let status = match &response {
        BotResponse::Error(err) => status_for(err.error),
        _ => StatusCode::OK,
    };
    (status, Json(response)).into_response()
}

async fn healthz(AxumState(adapter): AxumState<Arc<CommitRevealAdapter>>) -> Response {
    Json(HealthzResponse {
        ok: true,
        bot: adapter.bot_name(),
        pending: adapter.store().len(),
    })
    .into_response()
}

/// Serve the protocol over HTTP until Ctrl-C.
pub async fn serve_http(
    adapter: Arc<CommitRevealAdapter>,
    config: HttpConfig,
) -> Result<(), TransportError> {
    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    info!("Bot HTTP endpoint listening on {}", listener.local_addr()?);

    axum::serve(listener, router(adapter))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Bot HTTP endpoint stopped");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::action::Action;
    use crate::game::bot::{Bot, BotError};
    use crate::game::observation::Observation;
    use crate::network::adapter::{AdapterConfig, RevealPolicy};
    use crate::proof::commitment::verify_reveal;
    use crate::proof::pending::PendingStore;
    use axum::body::Body;
    use axum::http::{header, Request};
    use tower::ServiceExt;

    fn test_adapter(policy: RevealPolicy) -> Arc<CommitRevealAdapter> {
        let bot: Arc<dyn Bot> = Arc::new(|_: &Observation| -> Result<Vec<Action>, BotError> {
            Ok(vec![Action::SendFleet { from_id: 2, to_id: 9, energy: 12.5 }])
        });
        Arc::new(CommitRevealAdapter::new(
            bot,
            Arc::new(PendingStore::new()),
            AdapterConfig { reveal_policy: policy },
        ))
    }

    async fn post_act(app: Router, body: &str) -> (StatusCode, BotResponse) {
        let request = Request::builder()
            .method("POST")
            .uri("/act")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let parsed = serde_json::from_slice(&bytes).unwrap();
        (status, parsed)
    }

    #[tokio::test]
    async fn test_commit_then_reveal_over_http() {
        let adapter = test_adapter(RevealPolicy::Lenient);

        let (status, committed) =
            post_act(router(adapter.clone()), r#"{"phase":"commit","tick":11,"observation":{}}"#).await;
        assert_eq!(status, StatusCode::OK);
        let BotResponse::Commit(committed) = committed else {
            panic!("Wrong response type");
        };

        let (status, revealed) = post_act(router(adapter), r#"{"phase":"reveal","tick":11}"#).await;
        assert_eq!(status, StatusCode::OK);
        let BotResponse::Reveal(revealed) = revealed else {
            panic!("Wrong response type");
        };
        assert_eq!(revealed.tick, 11);
        assert!(verify_reveal(&committed.commit, &revealed.actions, &revealed.nonce).is_ok());
    }

    #[tokio::test]
    async fn test_unknown_phase_is_bad_request() {
        let (status, response) =
            post_act(router(test_adapter(RevealPolicy::Lenient)), r#"{"phase":"surrender","tick":1}"#).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(matches!(response, BotResponse::Error(e) if e.error == ErrorCode::UnknownPhase));
    }

    #[tokio::test]
    async fn test_malformed_body_is_bad_request() {
        let (status, response) = post_act(router(test_adapter(RevealPolicy::Lenient)), "{").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(matches!(response, BotResponse::Error(e) if e.error == ErrorCode::InvalidJson));
    }

    #[tokio::test]
    async fn test_strict_reveal_is_not_found() {
        let (status, response) =
            post_act(router(test_adapter(RevealPolicy::Strict)), r#"{"phase":"reveal","tick":4}"#).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(matches!(response, BotResponse::Error(e) if e.tick == Some(4)));
    }

    #[tokio::test]
    async fn test_healthz() {
        let app = router(test_adapter(RevealPolicy::Lenient));
        let request = Request::builder().uri("/healthz").body(Body::empty()).unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(value["ok"], true);
        assert_eq!(value["bot"], "custom");
        assert_eq!(value["pending"], 0);
    }

    #[tokio::test]
    async fn test_unknown_route() {
        let app = router(test_adapter(RevealPolicy::Lenient));
        let request = Request::builder().uri("/nope").body(Body::empty()).unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_bot_runs_off_the_runtime_thread() {
        // The bot blocks until the test task, on the same single-threaded
        // runtime, sees it start and answers.
        let (started_tx, mut started_rx) = tokio::sync::mpsc::unbounded_channel::<()>();
        let (go_tx, go_rx) = std::sync::mpsc::channel::<()>();
        let go_rx = std::sync::Mutex::new(go_rx);
        let bot: Arc<dyn Bot> = Arc::new(move |_: &Observation| -> Result<Vec<Action>, BotError> {
            let _ = started_tx.send(());
            let waiting = go_rx.lock().map_err(|e| BotError::Failed(e.to_string()))?;
            waiting
                .recv_timeout(std::time::Duration::from_secs(5))
                .map_err(|e| BotError::Failed(e.to_string()))?;
            Ok(Vec::new())
        });
        let adapter = Arc::new(CommitRevealAdapter::with_bot(bot));

        let request = tokio::spawn(post_act(router(adapter), r#"{"phase":"commit","tick":2}"#));
        started_rx.recv().await.unwrap();
        go_tx.send(()).unwrap();

        let (status, response) = request.await.unwrap();
        assert_eq!(status, StatusCode::OK);
        assert!(matches!(response, BotResponse::Commit(c) if c.tick == 2));
    }

    #[tokio::test]
    async fn test_non_utf8_body_is_bad_request() {
        let app = router(test_adapter(RevealPolicy::Lenient));
        let request = Request::builder()
            .method("POST")
            .uri("/act")
            .body(Body::from(vec![0xffu8, 0xfe, b'{']))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(status_for(ErrorCode::InvalidRequest), StatusCode::BAD_REQUEST);
        assert_eq!(status_for(ErrorCode::BotFailed), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(status_for(ErrorCode::InternalError), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
