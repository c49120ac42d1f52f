//! Token-budget compression.
//!
//! Stateless: on every model response the comprehensive token count is
//! published, and when it exceeds the configured ceiling the prefix older
//! than the most recent turn is summarised by the gateway and replaced
//! with one compress block. Compression is best-effort; failure leaves
//! history intact.

use std::sync::Arc;

use serde::Deserialize;
use serde::Serialize;
use tokio::sync::mpsc;
use tracing::debug;
use tracing::info;
use tracing::warn;

use swell_gateway::CompressRequest;
use swell_gateway::ModelGateway;
use swell_protocol::AgentEvent;
use swell_protocol::OperationType;
use swell_protocol::TokenUsage;
use swell_session::SessionStore;

use crate::cancel::TurnTokens;
use crate::engine::emit;

fn default_min_prefix_messages() -> usize {
    2
}

/// Compression settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompressorConfig {
    /// Comprehensive-token ceiling above which compression triggers.
    /// `None` disables compression.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_token_ceiling: Option<i64>,
    /// Minimum number of messages the compressible prefix must hold.
    #[serde(default = "default_min_prefix_messages")]
    pub min_prefix_messages: usize,
    /// Model override for the summarisation call.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

impl Default for CompressorConfig {
    fn default() -> Self {
        Self {
            input_token_ceiling: None,
            min_prefix_messages: default_min_prefix_messages(),
            model: None,
        }
    }
}

/// Publish the usage total and compress when over the ceiling.
pub(crate) async fn handle_usage_and_compression(
    config: &CompressorConfig,
    gateway: &Arc<dyn ModelGateway>,
    store: &Arc<SessionStore>,
    tokens: &TurnTokens,
    event_tx: Option<&mpsc::Sender<AgentEvent>>,
    usage: &TokenUsage,
) {
    let comprehensive = usage.comprehensive();
    store.set_latest_total_tokens(comprehensive);
    emit(
        event_tx,
        AgentEvent::TotalTokens {
            tokens: comprehensive,
        },
    );

    let Some(ceiling) = config.input_token_ceiling else {
        return;
    };
    if comprehensive <= ceiling {
        return;
    }

    let prefix_len = store.compressible_prefix_len();
    if prefix_len < config.min_prefix_messages {
        debug!(
            prefix_len,
            min = config.min_prefix_messages,
            "Over ceiling but prefix too small to compress"
        );
        return;
    }

    // The transcript must reflect the uncompressed history before the
    // summary replaces it.
    if let Err(e) = store.save().await {
        warn!(%e, "Skipping compression: pre-compression persist failed");
        return;
    }

    info!(
        comprehensive,
        ceiling, prefix_len, "Token ceiling exceeded, compressing older history"
    );
    emit(event_tx, AgentEvent::CompressionStarted);

    let request = CompressRequest {
        messages: store.wire_prefix(prefix_len),
        model: config.model.clone(),
        cancel: tokens.turn().clone(),
    };

    match gateway.compress_messages(request).await {
        Ok(response) => {
            let usage = response.usage.map(|mut usage| {
                usage.operation = OperationType::Compress;
                usage
            });
            match store
                .compress_messages_and_update_session(prefix_len, response.content, usage)
                .await
            {
                Ok(replaced) if replaced > 0 => {
                    emit(
                        event_tx,
                        AgentEvent::CompressionCompleted {
                            replaced_messages: replaced as i32,
                        },
                    );
                }
                Ok(_) => {
                    emit(
                        event_tx,
                        AgentEvent::CompressionFailed {
                            error: "splice rejected".to_string(),
                        },
                    );
                }
                Err(e) => {
                    warn!(%e, "Compression post-persist failed");
                    emit(
                        event_tx,
                        AgentEvent::CompressionFailed {
                            error: e.to_string(),
                        },
                    );
                }
            }
        }
        Err(e) => {
            warn!(%e, "Compression call failed; history unchanged");
            emit(
                event_tx,
                AgentEvent::CompressionFailed {
                    error: e.to_string(),
                },
            );
        }
    }
}

#[cfg(test)]
#[path = "compress.test.rs"]
mod tests;
