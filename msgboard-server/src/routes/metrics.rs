use std::sync::Arc;

use axum::{extract::State, http::StatusCode};
use eyre::Report;
use prometheus::{Encoder, TextEncoder};

use crate::state::AppState;

pub async fn get_metrics(State(state): State<Arc<AppState>>) -> Result<Vec<u8>, StatusCode> {
    let mut buf = Vec::new();
    let metric_families = state.metrics.registry.gather();

    match TextEncoder::new().encode(&metric_families, &mut buf) {
        Ok(_) => Ok(buf),
        Err(err) => {
            error!("{:?}", Report::new(err).wrap_err("failed to encode metrics"));

            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

#[cfg(test)]
mod tests {
    use axum::http::{Method, StatusCode};
    use eyre::Result;

    use crate::{
        config::ServiceKind,
        tests::{body_string, request, send, MemoryStore},
    };

    #[tokio::test]
    async fn counts_matched_routes() -> Result<()> {
        let store = MemoryStore::default();
        let app = store.app(ServiceKind::Reader)?;

        send(&app, request(Method::GET, "/health")).await?;
        send(&app, request(Method::POST, "/delete/7")).await?;

        let res = send(&app, request(Method::GET, "/metrics")).await?;
        assert_eq!(res.status(), StatusCode::OK);

        let body = body_string(res).await?;
        assert!(body.contains("msgboard_requests_total"));
        assert!(body.contains(r#"path="/health""#));
        assert!(body.contains(r#"path="/delete/:message_id""#));
        assert!(body.contains(r#"service="reader""#));

        Ok(())
    }

    #[tokio::test]
    async fn unmatched_paths_share_a_label() -> Result<()> {
        let store = MemoryStore::default();
        let app = store.app(ServiceKind::Writer)?;

        send(&app, request(Method::GET, "/nope/1")).await?;
        send(&app, request(Method::GET, "/nope/2")).await?;

        let body = body_string(send(&app, request(Method::GET, "/metrics")).await?).await?;
        assert!(body.contains(r#"path="unmatched""#));
        assert!(body.contains(r#"status="404""#));
        assert!(!body.contains("/nope"));

        Ok(())
    }
}
