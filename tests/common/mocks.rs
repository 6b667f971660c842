//! Mock implementations for testing.
//!
//! Mock tasks and LLM clients shared by the integration tests.

#![allow(dead_code)]

use argus::llm::{ConversationMessage, LLMClient, LLMResponse};
use argus::types::{AppError, Result, ToolCall, ToolDefinition};
use argus::workflows::{StateField, Target, Task};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Clone)]
enum Behavior {
    Succeed(String),
    Fail(String),
    Panic(String),
}

/// Task with a fixed result, an optional delay and a run counter.
#[derive(Clone)]
pub struct MockTask {
    name: String,
    field: StateField,
    behavior: Behavior,
    delay: Duration,
    runs: Arc<AtomicUsize>,
}

impl MockTask {
    pub fn succeeding(name: &str, field: StateField, value: &str) -> Self {
        Self::with_behavior(name, field, Behavior::Succeed(value.to_string()))
    }

    pub fn failing(name: &str, field: StateField, message: &str) -> Self {
        Self::with_behavior(name, field, Behavior::Fail(message.to_string()))
    }

    pub fn panicking(name: &str, field: StateField, message: &str) -> Self {
        Self::with_behavior(name, field, Behavior::Panic(message.to_string()))
    }

    fn with_behavior(name: &str, field: StateField, behavior: Behavior) -> Self {
        Self {
            name: name.to_string(),
            field,
            behavior,
            delay: Duration::ZERO,
            runs: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Sleep this long before producing the result.
    pub fn after(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn runs(&self) -> usize {
        self.runs.load(Ordering::SeqCst)
    }

    pub fn arc(self) -> Arc<dyn Task> {
        Arc::new(self)
    }
}

#[async_trait]
impl Task for MockTask {
    fn name(&self) -> &str {
        &self.name
    }

    fn field(&self) -> StateField {
        self.field
    }

    fn description(&self) -> &str {
        "mock task"
    }

    async fn run(&self, _target: &Target) -> anyhow::Result<String> {
        self.runs.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        match &self.behavior {
            Behavior::Succeed(value) => Ok(value.clone()),
            Behavior::Fail(message) => Err(anyhow::anyhow!("{}", message)),
            Behavior::Panic(message) => panic!("{}", message),
        }
    }
}

/// LLM client that replays a script of responses and records every request.
pub struct MockLLMClient {
    responses: Mutex<VecDeque<Result<LLMResponse>>>,
    requests: Mutex<Vec<Vec<ConversationMessage>>>,
}

impl MockLLMClient {
    pub fn new(responses: Vec<LLMResponse>) -> Self {
        Self {
            responses: Mutex::new(responses.into_iter().map(Ok).collect()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// A client whose first call answers with `text`.
    pub fn answering(text: &str) -> Self {
        Self::new(vec![LLMResponse::text(text)])
    }

    /// A client that always returns an error.
    pub fn failing() -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Conversations sent so far, one entry per call.
    pub fn requests(&self) -> Vec<Vec<ConversationMessage>> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl LLMClient for MockLLMClient {
    async fn generate_with_system(&self, _system: &str, _prompt: &str) -> Result<String> {
        self.chat_with_tools(&[], &[]).await.map(|r| r.content)
    }

    async fn chat_with_tools(
        &self,
        messages: &[ConversationMessage],
        _tools: &[ToolDefinition],
    ) -> Result<LLMResponse> {
        self.requests.lock().unwrap().push(messages.to_vec());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(AppError::LLM("Mock LLM failure".to_string())))
    }

    fn model_name(&self) -> &str {
        "mock-model"
    }
}

/// Shorthand for a tool call with a generated id.
pub fn tool_call(id: &str, name: &str, arguments: serde_json::Value) -> ToolCall {
    ToolCall {
        id: id.to_string(),
        name: name.to_string(),
        arguments,
    }
}
