use std::{future::Future, net::SocketAddr, sync::Arc, time::Duration};

use axum::{
    middleware,
    response::Response,
    routing::{get, post},
    Router,
};
use eyre::{Result, WrapErr};
use hyper::Request;
use tokio::sync::oneshot::{channel, Receiver, Sender};
use tower_http::trace::TraceLayer;
use tracing::Span;

use crate::{
    config::ServiceKind,
    middleware::metrics::track_metrics,
    routes::{health::get_health, metrics::get_metrics, reader, writer},
    state::AppState,
    AppStateBuilder,
};

pub struct Server {
    state: Arc<AppState>,
    shutdown_rx: Receiver<()>,
}

impl Server {
    pub fn new(builder: AppStateBuilder) -> Result<(Self, Sender<()>)> {
        let (shutdown_tx, shutdown_rx) = channel();
        let state = builder.build().wrap_err("failed to build app state")?;

        let server = Self {
            state: Arc::new(state),
            shutdown_rx,
        };

        Ok((server, shutdown_tx))
    }

    pub async fn run(self, port: u16) -> Result<()> {
        let addr = SocketAddr::from(([0, 0, 0, 0], port));
        let (_, server) = self.bind(addr)?;

        server.await
    }

    /// Binds the listener and returns the bound address alongside the
    /// future that serves requests.
    ///
    /// The startup table check runs in the background once the port is
    /// bound.
    pub(crate) fn bind(
        self,
        addr: SocketAddr,
    ) -> Result<(SocketAddr, impl Future<Output = Result<()>>)> {
        let Self { state, shutdown_rx } = self;

        let kind = state.kind;
        let app = Self::app(Arc::clone(&state));

        let server = axum::Server::try_bind(&addr)
            .wrap_err_with(|| format!("failed to bind to {addr}"))?
            .serve(app.into_make_service());

        let local_addr = server.local_addr();

        let server = server.with_graceful_shutdown(async {
            let _ = shutdown_rx.await;
        });

        info!(service = kind.name(), addr = %local_addr, "Running server...");

        tokio::spawn(async move { Self::check_table(&state).await });

        Ok((local_addr, async move { server.await.wrap_err("server failed") }))
    }

    /// Logs whether the message table exists.
    async fn check_table(state: &AppState) {
        let table = state.store.table();

        match state.store.table_exists().await {
            Ok(true) => info!(table = table.as_str(), "Found message table"),
            Ok(false) => warn!(table = table.as_str(), "Message table does not exist"),
            Err(err) => warn!(table = table.as_str(), ?err, "Failed to check message table"),
        }
    }

    pub(crate) fn app(state: Arc<AppState>) -> Router {
        let trace = TraceLayer::new_for_http()
            .on_request(|req: &Request<_>, _: &Span| info!("{} {}", req.method(), req.uri().path()))
            .on_response(|res: &Response, latency: Duration, _: &Span| {
                let code = res.status().as_u16();

                if (500..600).contains(&code) {
                    error!("Response: latency={}ms status={code}", latency.as_millis());
                } else {
                    info!("Response: latency={}ms status={code}", latency.as_millis());
                }
            });

        let routes = match state.kind {
            ServiceKind::Reader => Self::reader_app(),
            ServiceKind::Writer => Self::writer_app(),
        };

        routes
            .route("/health", get(get_health))
            .route("/metrics", get(get_metrics))
            .layer(middleware::from_fn_with_state(
                Arc::clone(&state),
                track_metrics,
            ))
            .layer(trace)
            .with_state(state)
    }

    fn reader_app() -> Router<Arc<AppState>> {
        Router::new()
            .route("/", get(reader::get_index))
            .route("/api/messages", get(reader::get_messages))
            .route("/delete/:message_id", post(reader::delete_message))
            .route("/delete_all", post(reader::delete_all))
    }

    fn writer_app() -> Router<Arc<AppState>> {
        Router::new().route("/", get(writer::get_index).post(writer::post_message))
    }
}
