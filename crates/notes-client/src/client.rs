//! HTTP client for the notes backend

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::{RequestBuilder, Response};
use serde::de::DeserializeOwned;
use url::Url;

use crate::config::{ClientConfig, ConfigError};
use crate::error::{ApiError, Result};
use crate::note::{CreateNotePayload, ListNotesParams, Note, NotesPage};

/// Client for the notes REST API.
///
/// Cheap to clone; clones share the underlying connection pool.
#[derive(Debug, Clone)]
pub struct NotesClient {
    http: reqwest::Client,
    base_url: Url,
}

impl NotesClient {
    /// Create a client that authenticates every request with `config.token`.
    pub fn new(config: ClientConfig) -> std::result::Result<Self, ConfigError> {
        let mut auth_value = HeaderValue::from_str(&format!("Bearer {}", config.token))
            .map_err(|_| ConfigError::InvalidToken)?;
        auth_value.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth_value);

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()
            .map_err(ConfigError::Http)?;

        tracing::debug!("Notes client targeting {}", config.base_url);

        Ok(Self {
            http,
            base_url: config.base_url,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// `GET /notes` with optional search, tag and paging filters.
    pub async fn list_notes(&self, params: &ListNotesParams) -> Result<NotesPage> {
        let request = self
            .http
            .get(self.endpoint(&["notes"]))
            .query(&params.query_pairs());
        send(request).await
    }

    /// `POST /notes`. Every call creates a new note on the backend.
    pub async fn create_note(&self, payload: &CreateNotePayload) -> Result<Note> {
        let request = self.http.post(self.endpoint(&["notes"])).json(payload);
        send(request).await
    }

    /// `DELETE /notes/{id}`. Returns the deleted note.
    pub async fn delete_note(&self, note_id: &str) -> Result<Note> {
        let request = self.http.delete(self.endpoint(&["notes", note_id]));
        send(request).await
    }

    /// `GET /notes/{id}`
    pub async fn get_note_by_id(&self, note_id: &str) -> Result<Note> {
        let request = self.http.get(self.endpoint(&["notes", note_id]));
        send(request).await
    }

    /// Append path segments to the base URL, percent-encoding each one.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        // Checked in ClientConfig::new
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }
}

async fn send<T: DeserializeOwned>(request: RequestBuilder) -> Result<T> {
    let response = request.send().await.map_err(ApiError::Transport)?;
    decode(response).await
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
    let status = response.status();
    let url = response.url().clone();

    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        tracing::debug!("{} answered {}", url, status);
        return Err(ApiError::Status { status, body });
    }

    let bytes = response.bytes().await.map_err(ApiError::Transport)?;
    serde_json::from_slice(&bytes).map_err(ApiError::Malformed)
}
