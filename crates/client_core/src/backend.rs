//! Outbound calls to the inference backend.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{
    multipart::{Form, Part},
    Client,
};
use shared::{
    error::error_message_from_body,
    protocol::{self, QueryRequest, UPLOAD_FILE_FIELD, UPLOAD_QUERY_FIELD},
    InteractionMode,
};
use tracing::{debug, warn};
use url::Url;

use crate::{
    config::ClientSettings,
    error::{ConfigError, DispatchError, DispatchErrorKind},
};

/// File contents read at dispatch time for the document endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentUpload {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl DocumentUpload {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes,
        }
    }

    pub fn mime_type(&self) -> String {
        mime_guess::from_path(&self.file_name)
            .first_or_octet_stream()
            .essence_str()
            .to_string()
    }
}

/// A validated request, one variant per interaction mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchRequest {
    Chat {
        query: String,
    },
    DocumentQa {
        document: DocumentUpload,
        query: String,
    },
    GrammarCheck {
        query: String,
    },
    Translation {
        query: String,
    },
}

impl DispatchRequest {
    pub fn mode(&self) -> InteractionMode {
        match self {
            DispatchRequest::Chat { .. } => InteractionMode::Chat,
            DispatchRequest::DocumentQa { .. } => InteractionMode::DocumentQa,
            DispatchRequest::GrammarCheck { .. } => InteractionMode::GrammarCheck,
            DispatchRequest::Translation { .. } => InteractionMode::Translation,
        }
    }

    /// The user's text, recorded as the history question.
    pub fn question(&self) -> &str {
        match self {
            DispatchRequest::Chat { query }
            | DispatchRequest::DocumentQa { query, .. }
            | DispatchRequest::GrammarCheck { query }
            | DispatchRequest::Translation { query } => query,
        }
    }
}

#[async_trait]
pub trait Backend: Send + Sync {
    /// Performs one call and returns the answer text for the request's mode.
    async fn dispatch(&self, request: DispatchRequest) -> Result<String, DispatchError>;
}

pub struct HttpBackend {
    http: Client,
    base_url: Url,
    timeout: Duration,
}

impl HttpBackend {
    pub fn new(settings: &ClientSettings) -> Result<Self, ConfigError> {
        if settings.request_timeout.is_zero() {
            return Err(ConfigError::ZeroTimeout);
        }
        let base_url = settings.backend_base_url()?;
        let http = Client::builder().timeout(settings.request_timeout).build()?;
        Ok(Self {
            http,
            base_url,
            timeout: settings.request_timeout,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, mode: InteractionMode) -> Result<Url, DispatchError> {
        self.base_url
            .join(protocol::endpoint_path(mode))
            .map_err(|err| {
                DispatchError::new(
                    mode,
                    DispatchErrorKind::Transport,
                    format!("invalid endpoint url: {err}"),
                )
            })
    }

    fn transport_error(&self, mode: InteractionMode, err: reqwest::Error) -> DispatchError {
        if err.is_timeout() {
            DispatchError::timeout(
                mode,
                format!("no response from the backend within {:?}", self.timeout),
            )
        } else {
            DispatchError::new(
                mode,
                DispatchErrorKind::Transport,
                format!("unable to reach the backend: {err}"),
            )
        }
    }
}

#[async_trait]
impl Backend for HttpBackend {
    async fn dispatch(&self, request: DispatchRequest) -> Result<String, DispatchError> {
        let mode = request.mode();
        let url = self.endpoint(mode)?;
        debug!(%mode, %url, "sending backend request");

        let builder = match request {
            DispatchRequest::DocumentQa { document, query } => {
                let mime_type = document.mime_type();
                let part = Part::bytes(document.bytes)
                    .file_name(document.file_name)
                    .mime_str(&mime_type)
                    .map_err(|err| self.transport_error(mode, err))?;
                let form = Form::new()
                    .part(UPLOAD_FILE_FIELD, part)
                    .text(UPLOAD_QUERY_FIELD, query);
                self.http.post(url).multipart(form)
            }
            DispatchRequest::Chat { query }
            | DispatchRequest::GrammarCheck { query }
            | DispatchRequest::Translation { query } => {
                self.http.post(url).json(&QueryRequest { query })
            }
        };

        let response = builder
            .send()
            .await
            .map_err(|err| self.transport_error(mode, err))?;
        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|err| self.transport_error(mode, err))?;

        if !status.is_success() {
            let message = error_message_from_body(&String::from_utf8_lossy(&body))
                .unwrap_or_else(|| format!("backend returned HTTP {}", status.as_u16()));
            warn!(%mode, status = status.as_u16(), "backend rejected request: {message}");
            return Err(DispatchError::http_status(mode, status.as_u16(), message));
        }

        protocol::decode_answer(mode, &body).map_err(|err| {
            DispatchError::new(
                mode,
                DispatchErrorKind::MalformedResponse,
                format!(
                    "unexpected response body (expected `{}`): {err}",
                    protocol::answer_field(mode)
                ),
            )
        })
    }
}

#[cfg(test)]
#[path = "tests/backend_tests.rs"]
mod tests;
