//! Scripted doubles shared by the loop tests.

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;

use async_trait::async_trait;
use serde_json::Map;
use serde_json::Value;

use swell_gateway::AgentRequest;
use swell_gateway::AgentResponse;
use swell_gateway::CompressRequest;
use swell_gateway::CompressResponse;
use swell_gateway::FinishReason;
use swell_gateway::GatewayError;
use swell_gateway::ModelGateway;
use swell_gateway::StreamEvent;
use swell_gateway::ToolCallPayload;
use swell_protocol::TokenUsage;
use swell_protocol::ToolDefinition;
use swell_tools::Tool;
use swell_tools::ToolContext;
use swell_tools::ToolError;
use swell_tools::ToolResult;

/// Snapshot of the last agent request, for assertions.
#[derive(Debug, Clone)]
pub struct RequestSnapshot {
    pub system_prompt: String,
    pub tool_names: Vec<String>,
    pub message_count: usize,
    pub streaming: bool,
}

/// A gateway that replays a scripted sequence of responses.
pub struct ScriptedGateway {
    responses: Mutex<VecDeque<Result<AgentResponse, String>>>,
    streams: Mutex<VecDeque<Vec<StreamEvent>>>,
    compress_response: Mutex<Option<CompressResponse>>,
    pub agent_calls: AtomicUsize,
    pub compress_calls: AtomicUsize,
    pub last_request: Mutex<Option<RequestSnapshot>>,
    pub last_compress_len: AtomicUsize,
    /// When set, `call_agent` waits for cancellation instead of
    /// answering.
    pub hang_until_cancelled: Mutex<bool>,
}

impl ScriptedGateway {
    pub fn new() -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            streams: Mutex::new(VecDeque::new()),
            compress_response: Mutex::new(None),
            agent_calls: AtomicUsize::new(0),
            compress_calls: AtomicUsize::new(0),
            last_request: Mutex::new(None),
            last_compress_len: AtomicUsize::new(0),
            hang_until_cancelled: Mutex::new(false),
        }
    }

    pub fn push_response(&self, response: AgentResponse) {
        self.responses.lock().unwrap().push_back(Ok(response));
    }

    pub fn push_error(&self, message: &str) {
        self.responses
            .lock()
            .unwrap()
            .push_back(Err(message.to_string()));
    }

    pub fn push_stream(&self, events: Vec<StreamEvent>) {
        self.streams.lock().unwrap().push_back(events);
    }

    pub fn set_compress_response(&self, response: CompressResponse) {
        *self.compress_response.lock().unwrap() = Some(response);
    }

    pub fn calls(&self) -> usize {
        self.agent_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ModelGateway for ScriptedGateway {
    async fn call_agent(&self, request: AgentRequest) -> Result<AgentResponse, GatewayError> {
        self.agent_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_request.lock().unwrap() = Some(RequestSnapshot {
            system_prompt: request.system_prompt.clone(),
            tool_names: request.tools.iter().map(|t| t.name.clone()).collect(),
            message_count: request.messages.len(),
            streaming: request.stream.is_some(),
        });

        if *self.hang_until_cancelled.lock().unwrap() {
            request.cancel.cancelled().await;
            return Err(GatewayError::Cancelled);
        }

        if let Some(stream) = &request.stream {
            let events = self.streams.lock().unwrap().pop_front().unwrap_or_default();
            for event in events {
                let _ = stream.send(event).await;
            }
        }

        match self.responses.lock().unwrap().pop_front() {
            Some(Ok(response)) => Ok(response),
            Some(Err(message)) => Err(GatewayError::transport(message)),
            None => Ok(plain_response("done")),
        }
    }

    async fn compress_messages(
        &self,
        request: CompressRequest,
    ) -> Result<CompressResponse, GatewayError> {
        self.compress_calls.fetch_add(1, Ordering::SeqCst);
        self.last_compress_len
            .store(request.messages.len(), Ordering::SeqCst);
        match self.compress_response.lock().unwrap().clone() {
            Some(response) => Ok(response),
            None => Err(GatewayError::transport("no compress response scripted")),
        }
    }
}

/// A text-only response with usage.
pub fn plain_response(text: &str) -> AgentResponse {
    AgentResponse {
        content: Some(text.to_string()),
        reasoning: None,
        tool_calls: Vec::new(),
        usage: Some(TokenUsage::agent(100, 20, "test-model")),
        finish_reason: Some(FinishReason::Stop),
    }
}

/// A response requesting the given tool calls.
pub fn tool_response(calls: Vec<(&str, &str, &str)>) -> AgentResponse {
    AgentResponse {
        content: None,
        reasoning: None,
        tool_calls: calls
            .into_iter()
            .map(|(id, name, arguments)| ToolCallPayload {
                id: id.to_string(),
                name: name.to_string(),
                arguments: arguments.to_string(),
            })
            .collect(),
        usage: Some(TokenUsage::agent(200, 40, "test-model")),
        finish_reason: Some(FinishReason::ToolCalls),
    }
}

/// A tool that records its executions and answers with a fixed text.
pub struct SpyTool {
    name: &'static str,
    response: ToolResult,
    pub executions: AtomicUsize,
    pub last_args: Mutex<Option<Map<String, Value>>>,
    /// When true, the tool hangs until cancelled.
    pub hang_until_cancelled: bool,
}

impl SpyTool {
    pub fn new(name: &'static str) -> Arc<Self> {
        Arc::new(Self {
            name,
            response: ToolResult::success(format!("{name} ran")),
            executions: AtomicUsize::new(0),
            last_args: Mutex::new(None),
            hang_until_cancelled: false,
        })
    }

    pub fn with_response(name: &'static str, response: ToolResult) -> Arc<Self> {
        Arc::new(Self {
            name,
            response,
            executions: AtomicUsize::new(0),
            last_args: Mutex::new(None),
            hang_until_cancelled: false,
        })
    }

    pub fn hanging(name: &'static str) -> Arc<Self> {
        Arc::new(Self {
            name,
            response: ToolResult::success("late"),
            executions: AtomicUsize::new(0),
            last_args: Mutex::new(None),
            hang_until_cancelled: true,
        })
    }

    pub fn execution_count(&self) -> usize {
        self.executions.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Tool for SpyTool {
    fn name(&self) -> &str {
        self.name
    }

    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new(self.name, serde_json::json!({"type": "object"}))
    }

    async fn execute(
        &self,
        args: Map<String, Value>,
        ctx: &ToolContext,
    ) -> Result<ToolResult, ToolError> {
        self.executions.fetch_add(1, Ordering::SeqCst);
        *self.last_args.lock().unwrap() = Some(args);
        if self.hang_until_cancelled {
            ctx.cancelled().await;
            return Err(ToolError::Cancelled);
        }
        Ok(self.response.clone())
    }
}
