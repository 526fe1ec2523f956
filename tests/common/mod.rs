//! Shared test utilities

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use crewmind::{CompletionBackend, Error, Result, SessionStore, Therapist};

/// One scripted completion outcome
pub enum Scripted {
    /// The backend returns this text
    Reply(String),
    /// The backend fails with a completion error carrying this message
    Fail(String),
}

#[derive(Default)]
struct ScriptState {
    script: VecDeque<Scripted>,
    /// Every (system, user) payload the orchestrator sent
    requests: Vec<(String, String)>,
}

/// Completion backend that replays a fixed script, recording requests.
/// Clones share the same script and request log.
#[derive(Clone, Default)]
pub struct ScriptedBackend {
    state: Arc<Mutex<ScriptState>>,
}

impl ScriptedBackend {
    pub fn new(script: Vec<Scripted>) -> Self {
        Self {
            state: Arc::new(Mutex::new(ScriptState {
                script: script.into(),
                requests: Vec::new(),
            })),
        }
    }

    /// User payload of the most recent request
    pub fn last_user_payload(&self) -> Option<String> {
        self.state
            .lock()
            .unwrap()
            .requests
            .last()
            .map(|(_, user)| user.clone())
    }

    /// System prompt of the most recent request
    pub fn last_system_prompt(&self) -> Option<String> {
        self.state
            .lock()
            .unwrap()
            .requests
            .last()
            .map(|(system, _)| system.clone())
    }
}

#[async_trait::async_trait]
impl CompletionBackend for ScriptedBackend {
    async fn complete(
        &self,
        system: &str,
        user: &str,
        _max_tokens: u32,
        _temperature: f32,
    ) -> Result<String> {
        let mut state = self.state.lock().unwrap();
        state.requests.push((system.to_string(), user.to_string()));
        match state.script.pop_front() {
            Some(Scripted::Reply(text)) => Ok(text),
            Some(Scripted::Fail(msg)) => Err(Error::Completion(msg)),
            None => Err(Error::Completion("script exhausted".to_string())),
        }
    }
}

/// Build a therapist over a scripted backend and a temp session store
pub fn scripted_therapist(script: Vec<Scripted>) -> (Therapist, ScriptedBackend, tempfile::TempDir) {
    let backend = ScriptedBackend::new(script);
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let store = SessionStore::new(dir.path()).expect("failed to init store");
    let therapist = Therapist::new(Box::new(backend.clone()), store);
    (therapist, backend, dir)
}
