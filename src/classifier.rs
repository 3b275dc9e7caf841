//! Classifier backend client for Kairos
//!
//! This module implements the HTTP client for the classifier service that
//! turns free-text commands into either a conversational reply or a
//! structured automation workflow. The reply payload is treated as
//! untrusted: this client only separates the status variants; the raw
//! workflow object is handed to the validator untouched.

use crate::config::ClassifierConfig;
use crate::error::{KairosError, Result};
use alloy_primitives::Address;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Classifier API client
///
/// Connects to the classifier backend's `/ask` route. Non-2xx responses are
/// a hard failure whose body is logged and never parsed as a workflow, and
/// an unknown status string is treated as a malformed reply rather than
/// guessed at.
///
/// # Examples
///
/// ```no_run
/// use kairos::classifier::ClassifierClient;
/// use kairos::config::ClassifierConfig;
///
/// let client = ClassifierClient::new(&ClassifierConfig::default()).unwrap();
/// ```
pub struct ClassifierClient {
    client: Client,
    endpoint: String,
}

/// Request body for the `/ask` route
#[derive(Debug, Serialize)]
struct AskRequest<'a> {
    question: &'a str,
    #[serde(rename = "senderAddress")]
    sender_address: String,
}

/// Response envelope from the `/ask` route
#[derive(Debug, Deserialize)]
struct AskEnvelope {
    workflow: ReplyBody,
}

/// Status-tagged reply body inside the envelope
#[derive(Debug, Deserialize)]
struct ReplyBody {
    status: String,
    #[serde(default)]
    response: Option<String>,
    #[serde(default)]
    prompt: Option<String>,
    #[serde(default)]
    workflow: Option<serde_json::Value>,
}

/// A parsed classifier reply
#[derive(Debug, Clone, PartialEq)]
pub enum ClassifierReply {
    /// Plain conversational reply; no lifecycle action follows
    Message {
        /// Reply text to render as an assistant message
        text: String,
    },
    /// The classifier understood part of the command but needs more detail
    Incomplete {
        /// Partial-understanding reply text
        text: String,
    },
    /// A workflow is ready to be validated and registered
    AutomationReady {
        /// Confirmation text to render before the pipeline runs
        prompt: String,
        /// Raw, untrusted workflow object for the validator
        workflow: serde_json::Value,
    },
}

impl ClassifierClient {
    /// Create a new classifier client
    ///
    /// # Arguments
    ///
    /// * `config` - Classifier endpoint and timeout configuration
    ///
    /// # Errors
    ///
    /// Returns error if HTTP client initialization fails
    pub fn new(config: &ClassifierConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent("kairos/0.2.0")
            .build()
            .map_err(|e| KairosError::Config(format!("Failed to create HTTP client: {}", e)))?;

        tracing::info!("Initialized classifier client: endpoint={}", config.endpoint);

        Ok(Self {
            client,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
        })
    }

    /// The configured classifier endpoint
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Sends a user question to the classifier
    ///
    /// # Arguments
    ///
    /// * `question` - The user's free-text command
    /// * `sender` - Connected account, forwarded as `senderAddress`
    ///
    /// # Errors
    ///
    /// Returns `ClassifierUnavailable` for transport failures, non-2xx
    /// responses, and malformed reply bodies. The error body is logged,
    /// never interpreted.
    pub async fn ask(&self, question: &str, sender: Address) -> Result<ClassifierReply> {
        let url = format!("{}/ask", self.endpoint);
        let request = AskRequest {
            question,
            sender_address: format!("{:#x}", sender),
        };

        tracing::debug!("Sending classifier request to {}", url);

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Classifier request failed: {}", e);
                KairosError::ClassifierUnavailable(format!("request failed: {}", e))
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            tracing::error!("Classifier returned {}: {}", status, error_text);
            return Err(
                KairosError::ClassifierUnavailable(format!("server returned {}", status)).into(),
            );
        }

        let envelope: AskEnvelope = response.json().await.map_err(|e| {
            tracing::error!("Failed to parse classifier response: {}", e);
            KairosError::ClassifierUnavailable(format!("malformed reply: {}", e))
        })?;

        parse_reply(envelope.workflow)
    }
}

/// Maps a status-tagged reply body onto [`ClassifierReply`]
fn parse_reply(body: ReplyBody) -> Result<ClassifierReply> {
    match body.status.as_str() {
        "message" => {
            let text = body.response.ok_or_else(|| {
                KairosError::ClassifierUnavailable(
                    "message reply is missing `response`".to_string(),
                )
            })?;
            Ok(ClassifierReply::Message { text })
        }
        "incomplete" => {
            let text = body.response.ok_or_else(|| {
                KairosError::ClassifierUnavailable(
                    "incomplete reply is missing `response`".to_string(),
                )
            })?;
            Ok(ClassifierReply::Incomplete { text })
        }
        "automation_ready" => {
            let prompt = body.prompt.ok_or_else(|| {
                KairosError::ClassifierUnavailable(
                    "automation reply is missing `prompt`".to_string(),
                )
            })?;
            let workflow = body.workflow.ok_or_else(|| {
                KairosError::ClassifierUnavailable(
                    "automation reply is missing `workflow`".to_string(),
                )
            })?;
            Ok(ClassifierReply::AutomationReady { prompt, workflow })
        }
        other => {
            tracing::error!("Classifier returned unknown status `{}`", other);
            Err(KairosError::ClassifierUnavailable(format!("unknown status `{}`", other)).into())
        }
    }
}
