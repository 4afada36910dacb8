//! Result delivery for trigger events that carry a response endpoint.
//!
//! CloudFormation custom-resource style triggers do not consume the
//! function's return value; they wait for a JSON document PUT to the
//! pre-signed `ResponseURL` on the event.

use serde::{Deserialize, Serialize};

/// Physical resource id used when the event names none.
const DEFAULT_PHYSICAL_ID: &str = "staticship-directory-sync";

/// The fields of a custom-resource event needed to answer it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CustomResourceEvent {
    pub request_type: Option<String>,
    #[serde(rename = "ResponseURL")]
    pub response_url: Option<String>,
    pub stack_id: Option<String>,
    pub request_id: Option<String>,
    pub logical_resource_id: Option<String>,
    pub physical_resource_id: Option<String>,
}

impl CustomResourceEvent {
    /// Extract from a raw invocation payload.
    ///
    /// Payloads of any other shape yield an event with no response URL.
    pub fn from_payload(payload: &serde_json::Value) -> Self {
        match Self::deserialize(payload) {
            Ok(event) => event,
            Err(e) => {
                tracing::debug!(error = %e, "payload is not a custom resource event");
                Self::default()
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CallbackStatus {
    Success,
    Failed,
}

/// Response document PUT to the event's `ResponseURL`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct CustomResourceResponse {
    pub status: CallbackStatus,
    pub reason: String,
    pub physical_resource_id: String,
    pub stack_id: String,
    pub request_id: String,
    pub logical_resource_id: String,
    pub no_echo: bool,
    pub data: serde_json::Value,
}

impl CustomResourceResponse {
    pub fn success(event: &CustomResourceEvent, data: serde_json::Value) -> Self {
        Self::new(event, CallbackStatus::Success, "Success".to_owned(), data)
    }

    pub fn failure(event: &CustomResourceEvent, reason: impl Into<String>) -> Self {
        Self::new(
            event,
            CallbackStatus::Failed,
            reason.into(),
            serde_json::Value::Object(Default::default()),
        )
    }

    fn new(
        event: &CustomResourceEvent,
        status: CallbackStatus,
        reason: String,
        data: serde_json::Value,
    ) -> Self {
        let physical_resource_id = event
            .physical_resource_id
            .clone()
            .or_else(|| event.logical_resource_id.clone())
            .unwrap_or_else(|| DEFAULT_PHYSICAL_ID.to_owned());

        Self {
            status,
            reason,
            physical_resource_id,
            stack_id: event.stack_id.clone().unwrap_or_default(),
            request_id: event.request_id.clone().unwrap_or_default(),
            logical_resource_id: event.logical_resource_id.clone().unwrap_or_default(),
            no_echo: false,
            data,
        }
    }
}

/// Abstraction over callback delivery for testability.
///
/// Production code uses [`HttpCallback`], tests use mockall-generated mocks.
#[allow(async_fn_in_trait)]
pub trait CallbackSender: Send + Sync {
    async fn send(&self, url: &str, response: &CustomResourceResponse)
    -> Result<(), CallbackError>;
}

/// Delivers the response document with an HTTP PUT.
#[derive(Debug, Clone, Default)]
pub struct HttpCallback {
    client: reqwest::Client,
}

impl HttpCallback {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CallbackSender for HttpCallback {
    async fn send(
        &self,
        url: &str,
        response: &CustomResourceResponse,
    ) -> Result<(), CallbackError> {
        let body =
            serde_json::to_string(response).map_err(|e| CallbackError::Encode { source: e })?;

        // Pre-signed URLs are signed without a content type
        let reply = self
            .client
            .put(url)
            .header(reqwest::header::CONTENT_TYPE, "")
            .body(body)
            .send()
            .await
            .map_err(|e| CallbackError::Request { source: e })?;

        let status = reply.status();
        if !status.is_success() {
            return Err(CallbackError::Status {
                status: status.as_u16(),
            });
        }

        tracing::info!(status = ?response.status, "callback delivered");
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CallbackError {
    #[error("failed to encode callback response")]
    Encode { source: serde_json::Error },

    #[error("callback request failed")]
    Request { source: reqwest::Error },

    #[error("callback endpoint returned HTTP {status}")]
    Status { status: u16 },
}
