//! Shared fakes for the integration suite

use async_trait::async_trait;
use crypto_collector::mirror::{MirrorError, RemoteStore};
use crypto_collector::source::{FetchResult, Snapshot, SourceAdapter};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// Adapter that replays a script of results, one per call
pub struct ScriptedSource {
    name: &'static str,
    script: Mutex<VecDeque<FetchResult>>,
    fallback: FetchResult,
}

impl ScriptedSource {
    pub fn new(name: &'static str, script: Vec<FetchResult>) -> Arc<Self> {
        Arc::new(Self {
            name,
            script: Mutex::new(script.into()),
            fallback: Ok(Snapshot::new(1.0)),
        })
    }

    /// Adapter that always returns the same result
    pub fn constant(name: &'static str, result: FetchResult) -> Arc<Self> {
        Arc::new(Self {
            name,
            script: Mutex::new(VecDeque::new()),
            fallback: result,
        })
    }
}

#[async_trait]
impl SourceAdapter for ScriptedSource {
    fn name(&self) -> &str {
        self.name
    }

    async fn fetch(&self, _instrument: &str) -> FetchResult {
        let next = self.script.lock().unwrap().pop_front();
        next.unwrap_or_else(|| self.fallback.clone())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RemoteCall {
    Get,
    Create,
    Update(String),
}

#[derive(Default)]
struct RemoteState {
    object: Option<(u64, Vec<u8>)>,
    calls: Vec<RemoteCall>,
    fail_reads: bool,
}

/// In-process remote store with sequential version tokens
#[derive(Clone, Default)]
pub struct MemoryRemote {
    state: Arc<Mutex<RemoteState>>,
}

impl MemoryRemote {
    pub fn calls(&self) -> Vec<RemoteCall> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn content(&self) -> Option<Vec<u8>> {
        self.state
            .lock()
            .unwrap()
            .object
            .as_ref()
            .map(|(_, bytes)| bytes.clone())
    }

    pub fn set_fail_reads(&self, fail: bool) {
        self.state.lock().unwrap().fail_reads = fail;
    }
}

#[async_trait]
impl RemoteStore for MemoryRemote {
    async fn current_version(&self, _path: &str) -> Result<Option<String>, MirrorError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(RemoteCall::Get);
        if state.fail_reads {
            return Err(MirrorError::Status {
                status: 503,
                body: "unavailable".to_string(),
            });
        }
        Ok(state.object.as_ref().map(|(v, _)| format!("v{}", v)))
    }

    async fn create(&self, path: &str, content: &[u8], _message: &str) -> Result<(), MirrorError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(RemoteCall::Create);
        if state.object.is_some() {
            return Err(MirrorError::Conflict {
                path: path.to_string(),
            });
        }
        state.object = Some((1, content.to_vec()));
        Ok(())
    }

    async fn update(
        &self,
        path: &str,
        content: &[u8],
        _message: &str,
        version: &str,
    ) -> Result<(), MirrorError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(RemoteCall::Update(version.to_string()));
        match state.object.as_mut() {
            Some((v, bytes)) if format!("v{}", v) == version => {
                *v += 1;
                *bytes = content.to_vec();
                Ok(())
            }
            _ => Err(MirrorError::Conflict {
                path: path.to_string(),
            }),
        }
    }

    fn locator(&self, path: &str) -> String {
        format!("memory://{}", path)
    }
}
