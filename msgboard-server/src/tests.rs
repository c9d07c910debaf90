use std::{
    future,
    sync::{
        atomic::{AtomicBool, AtomicUsize, Ordering},
        Arc, Mutex, MutexGuard,
    },
};

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Method, Request},
    response::Response,
    Router,
};
use eyre::Result;
use msgboard_psql::model::{Message, TableName};
use tower::ServiceExt;

use crate::{config::ServiceKind, server::Server, store::MessageStore, AppStateBuilder};

/// In-memory stand-in for the shared message table.
#[derive(Clone)]
pub struct MemoryStore {
    inner: Arc<MemoryInner>,
}

struct MemoryInner {
    table: TableName,
    rows: Mutex<Rows>,
    table_exists: AtomicBool,
    unreachable: AtomicBool,
    stalled: AtomicBool,
    operations: AtomicUsize,
}

#[derive(Default)]
struct Rows {
    messages: Vec<Message>,
    last_id: i64,
}

impl Rows {
    fn insert(&mut self, content: &str) -> i64 {
        self.last_id += 1;

        self.messages.push(Message {
            id: self.last_id,
            content: content.to_owned(),
        });

        self.last_id
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        let inner = MemoryInner {
            table: TableName::new("messages").unwrap(),
            rows: Mutex::default(),
            table_exists: AtomicBool::new(true),
            unreachable: AtomicBool::new(false),
            stalled: AtomicBool::new(false),
            operations: AtomicUsize::new(0),
        };

        Self {
            inner: Arc::new(inner),
        }
    }
}

impl MemoryStore {
    pub fn with_messages<'c>(contents: impl IntoIterator<Item = &'c str>) -> Self {
        let store = Self::default();

        {
            let mut rows = store.rows();

            for content in contents {
                rows.insert(content);
            }
        }

        store
    }

    pub fn app(&self, kind: ServiceKind) -> Result<Router> {
        let builder = AppStateBuilder {
            kind,
            store: Arc::new(self.clone()),
            container_id: Box::from("test-pod-1"),
        };

        let state = builder.build()?;

        Ok(Server::app(Arc::new(state)))
    }

    pub fn set_table_exists(&self, exists: bool) {
        self.inner.table_exists.store(exists, Ordering::SeqCst);
    }

    pub fn set_unreachable(&self, unreachable: bool) {
        self.inner.unreachable.store(unreachable, Ordering::SeqCst);
    }

    /// Makes the table check hang forever, like a database that never
    /// answers within the acquire timeout.
    pub fn set_stalled(&self, stalled: bool) {
        self.inner.stalled.store(stalled, Ordering::SeqCst);
    }

    /// Amount of list, insert, and delete calls.
    pub fn operations(&self) -> usize {
        self.inner.operations.load(Ordering::SeqCst)
    }

    /// Newest first.
    pub fn messages(&self) -> Vec<Message> {
        self.rows().messages.iter().rev().cloned().collect()
    }

    /// Oldest first.
    pub fn contents(&self) -> Vec<String> {
        let rows = self.rows();

        rows.messages.iter().map(|msg| msg.content.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.rows().messages.len()
    }

    fn rows(&self) -> MutexGuard<'_, Rows> {
        self.inner.rows.lock().unwrap()
    }

    fn begin_operation(&self) -> Result<MutexGuard<'_, Rows>> {
        self.check_reachable()?;
        self.inner.operations.fetch_add(1, Ordering::SeqCst);

        Ok(self.rows())
    }

    fn check_reachable(&self) -> Result<()> {
        if self.inner.unreachable.load(Ordering::SeqCst) {
            bail!("connection refused");
        }

        Ok(())
    }
}

#[async_trait]
impl MessageStore for MemoryStore {
    fn table(&self) -> &TableName {
        &self.inner.table
    }

    async fn table_exists(&self) -> Result<bool> {
        if self.inner.stalled.load(Ordering::SeqCst) {
            future::pending::<()>().await;
        }

        self.check_reachable()?;

        Ok(self.inner.table_exists.load(Ordering::SeqCst))
    }

    async fn list(&self) -> Result<Vec<Message>> {
        drop(self.begin_operation()?);

        Ok(self.messages())
    }

    async fn insert(&self, content: &str) -> Result<i64> {
        let mut rows = self.begin_operation()?;

        Ok(rows.insert(content))
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        let mut rows = self.begin_operation()?;
        let len = rows.messages.len();
        rows.messages.retain(|msg| msg.id != id);

        Ok(rows.messages.len() < len)
    }

    async fn delete_all(&self) -> Result<u64> {
        let mut rows = self.begin_operation()?;
        let count = rows.messages.len() as u64;
        rows.messages.clear();

        Ok(count)
    }
}

pub fn request(method: Method, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

pub async fn send(app: &Router, req: Request<Body>) -> Result<Response> {
    Ok(app.clone().oneshot(req).await?)
}

pub async fn body_string(res: Response) -> Result<String> {
    let bytes = hyper::body::to_bytes(res.into_body()).await?;

    Ok(String::from_utf8(bytes.to_vec())?)
}
