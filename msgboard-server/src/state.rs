use std::{sync::Arc, time::Duration};

use axum::{
    extract::MatchedPath,
    http::{Method, StatusCode},
};
use eyre::{Result, WrapErr};
use handlebars::Handlebars;
use prometheus::{HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry};

use crate::{config::ServiceKind, store::MessageStore};

const READER_TEMPLATE: &str = include_str!("../templates/reader.hbs");
const WRITER_TEMPLATE: &str = include_str!("../templates/writer.hbs");

pub(crate) const INDEX_TEMPLATE: &str = "index";

pub struct AppStateBuilder {
    pub kind: ServiceKind,
    pub store: Arc<dyn MessageStore>,
    pub container_id: Box<str>,
}

impl AppStateBuilder {
    pub fn build(self) -> Result<AppState> {
        let Self {
            kind,
            store,
            container_id,
        } = self;

        let template = match kind {
            ServiceKind::Reader => READER_TEMPLATE,
            ServiceKind::Writer => WRITER_TEMPLATE,
        };

        let mut handlebars = Handlebars::new();
        handlebars.set_strict_mode(true);

        handlebars
            .register_template_string(INDEX_TEMPLATE, template)
            .wrap_err("failed to register index template")?;

        let metrics = Metrics::new(kind).wrap_err("failed to create metrics")?;

        Ok(AppState {
            kind,
            store,
            handlebars,
            container_id,
            metrics,
        })
    }
}

pub struct AppState {
    pub kind: ServiceKind,
    pub store: Arc<dyn MessageStore>,
    pub handlebars: Handlebars<'static>,
    pub container_id: Box<str>,
    pub metrics: Metrics,
}

pub struct Metrics {
    pub registry: Registry,
    pub request_count: IntCounterVec,
    pub response_time: HistogramVec,
}

impl Metrics {
    fn new(kind: ServiceKind) -> prometheus::Result<Self> {
        const LABELS: &[&str] = &["method", "path", "status"];

        let opts = Opts::new("requests_total", "Amount of handled requests")
            .namespace("msgboard")
            .const_label("service", kind.name());
        let request_count = IntCounterVec::new(opts, LABELS)?;

        let opts = HistogramOpts::new("response_time_seconds", "Response times")
            .namespace("msgboard")
            .const_label("service", kind.name());
        let response_time = HistogramVec::new(opts, LABELS)?;

        let registry = Registry::new();
        registry.register(Box::new(request_count.clone()))?;
        registry.register(Box::new(response_time.clone()))?;

        Ok(Self {
            registry,
            request_count,
            response_time,
        })
    }

    /// Records a handled request. Requests that matched no route share
    /// the `unmatched` path label so arbitrary URIs can't grow the label set.
    pub fn observe(
        &self,
        method: &Method,
        route: Option<&MatchedPath>,
        status: StatusCode,
        latency: Duration,
    ) {
        let path = route.map_or("unmatched", MatchedPath::as_str);
        let labels = [method.as_str(), path, status.as_str()];

        self.request_count.with_label_values(&labels).inc();

        self.response_time
            .with_label_values(&labels)
            .observe(latency.as_secs_f64());
    }
}
