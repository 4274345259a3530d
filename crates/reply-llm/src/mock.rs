use std::collections::VecDeque;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::{CompletionRequest, GenerationError, TextGenerator};

/// Deterministic generator that replays queued answers and records every
/// request it receives. An exhausted queue answers with a transport error.
#[derive(Default)]
pub struct ScriptedGenerator {
    answers: Mutex<VecDeque<Result<String, GenerationError>>>,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn answering(answers: impl IntoIterator<Item = &'static str>) -> Self {
        let generator = Self::new();
        for answer in answers {
            generator.push_ok(answer);
        }
        generator
    }

    pub fn push_ok(&self, text: impl Into<String>) {
        self.answers.lock().push_back(Ok(text.into()));
    }

    pub fn push_err(&self, err: GenerationError) {
        self.answers.lock().push_back(Err(err));
    }

    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().clone()
    }
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, GenerationError> {
        self.requests.lock().push(request.clone());
        self.answers
            .lock()
            .pop_front()
            .unwrap_or_else(|| Err(GenerationError::Transport("no scripted answer left".into())))
    }
}
