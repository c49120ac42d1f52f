//! The model-gateway contract.
//!
//! The turn engine talks to the language-model gateway exclusively through
//! the [`ModelGateway`] trait. The transport (HTTP, streaming decode,
//! retries) lives outside this workspace; only the request/response shapes
//! and the streaming event sink are defined here.

mod error;
mod types;

use async_trait::async_trait;

pub use error::GatewayError;
pub use types::AgentRequest;
pub use types::AgentResponse;
pub use types::CompressRequest;
pub use types::CompressResponse;
pub use types::FinishReason;
pub use types::StreamEvent;
pub use types::ToolCallDelta;
pub use types::ToolCallPayload;
pub use types::WireMessage;
pub use types::WireRole;

/// A language-model gateway.
///
/// `call_agent` must honour the request's cancellation token and, when a
/// stream sink is provided, deliver [`StreamEvent`]s in arrival order
/// before resolving with the final response.
#[async_trait]
pub trait ModelGateway: Send + Sync {
    /// Run one agent model call.
    async fn call_agent(&self, request: AgentRequest) -> Result<AgentResponse, GatewayError>;

    /// Summarise a message prefix into a single replacement text.
    async fn compress_messages(
        &self,
        request: CompressRequest,
    ) -> Result<CompressResponse, GatewayError>;
}
