#![allow(dead_code)]

use std::{
    collections::VecDeque,
    path::PathBuf,
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    },
};

use async_trait::async_trait;
use uuid::Uuid;

use ontotax::oracle::{Oracle, OracleError, OracleErrorKind, OracleRequest};

/// Replies from a fixed queue and records every request it receives.
pub struct ScriptedOracle {
    replies: Mutex<VecDeque<Result<String, OracleError>>>,
    requests: Mutex<Vec<OracleRequest>>,
}

impl ScriptedOracle {
    pub fn new(replies: impl IntoIterator<Item = Result<String, OracleError>>) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.into_iter().collect()),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn replying<I>(texts: I) -> Arc<Self>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        Self::new(
            texts
                .into_iter()
                .map(|text| Ok(text.as_ref().to_string()))
                .collect::<Vec<_>>(),
        )
    }

    pub fn requests(&self) -> Vec<OracleRequest> {
        self.requests.lock().expect("requests lock").clone()
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().expect("requests lock").len()
    }
}

#[async_trait]
impl Oracle for ScriptedOracle {
    fn model_id(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, request: OracleRequest) -> Result<String, OracleError> {
        self.requests.lock().expect("requests lock").push(request);
        self.replies
            .lock()
            .expect("replies lock")
            .pop_front()
            .unwrap_or_else(|| Err(OracleError::new(OracleErrorKind::Internal, "script exhausted")))
    }
}

type Responder = dyn Fn(&OracleRequest) -> Result<String, OracleError> + Send + Sync;

/// Answers every request by inspecting its prompts.
pub struct FnOracle {
    respond: Box<Responder>,
    calls: AtomicUsize,
}

impl FnOracle {
    pub fn new(
        respond: impl Fn(&OracleRequest) -> Result<String, OracleError> + Send + Sync + 'static,
    ) -> Arc<Self> {
        Arc::new(Self {
            respond: Box::new(respond),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Oracle for FnOracle {
    fn model_id(&self) -> &str {
        "fn-oracle"
    }

    async fn complete(&self, request: OracleRequest) -> Result<String, OracleError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        (self.respond)(&request)
    }
}

pub fn cancelled() -> OracleError {
    OracleError::new(OracleErrorKind::Cancelled, "oracle call cancelled").with_retryable(false)
}

pub fn transport_failure() -> OracleError {
    OracleError::new(OracleErrorKind::Transport, "connection reset")
}

pub struct TempDir {
    pub path: PathBuf,
}

impl TempDir {
    pub fn new(label: &str) -> Self {
        let path = std::env::temp_dir().join(format!("ontotax-{label}-{}", Uuid::now_v7()));
        std::fs::create_dir_all(&path).expect("temp dir should be created");
        Self { path }
    }

    pub fn write(&self, name: &str, content: &str) -> PathBuf {
        let path = self.path.join(name);
        std::fs::write(&path, content).expect("fixture should be written");
        path
    }

    pub fn join(&self, name: &str) -> PathBuf {
        self.path.join(name)
    }
}

impl Drop for TempDir {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.path);
    }
}
