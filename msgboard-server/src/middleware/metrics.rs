use std::{sync::Arc, time::Instant};

use axum::{
    extract::{MatchedPath, State},
    middleware::Next,
    response::Response,
};
use hyper::Request;

use crate::state::AppState;

pub async fn track_metrics<B>(
    State(state): State<Arc<AppState>>,
    req: Request<B>,
    next: Next<B>,
) -> Response {
    let route = req.extensions().get::<MatchedPath>().cloned();
    let method = req.method().clone();

    let start = Instant::now();
    let response = next.run(req).await;

    state
        .metrics
        .observe(&method, route.as_ref(), response.status(), start.elapsed());

    response
}
