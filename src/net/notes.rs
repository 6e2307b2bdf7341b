//! Notes resource client: CRUD and filtered listing over the request gateway.
//!
//! Every call unwraps the server's single-field envelope and returns the bare
//! entity. Failures are the gateway's [`NormalizedError`] unchanged.

#[cfg(test)]
#[path = "notes_test.rs"]
mod notes_test;

use serde::de::IgnoredAny;

use super::gateway::RequestGateway;
use super::types::{Note, NoteDraft, NoteEnvelope, NotePatch, NotesEnvelope};
use crate::error::NormalizedError;

const NOTES_PATH: &str = "/api/notes";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    #[default]
    Descending,
}

impl SortDirection {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ascending => "ASC",
            Self::Descending => "DESC",
        }
    }
}

/// Listing filter. Only non-empty fields are serialized.
///
/// `archived: Some(false)` is treated as empty and omitted, so "only
/// unarchived" cannot be requested explicitly; the server's default applies.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NoteFilter {
    pub query: Option<String>,
    pub tag: Option<String>,
    pub archived: Option<bool>,
    pub sort_field: String,
    pub sort_direction: SortDirection,
    pub limit: u32,
    pub offset: Option<u32>,
}

impl Default for NoteFilter {
    fn default() -> Self {
        Self {
            query: None,
            tag: None,
            archived: None,
            sort_field: "updated_at".to_owned(),
            sort_direction: SortDirection::Descending,
            limit: 50,
            offset: None,
        }
    }
}

impl NoteFilter {
    /// Encoded query string without the leading `?`; keys appear in the order
    /// `q, tag, archived, sortBy, sortDir, limit, offset`.
    #[must_use]
    pub fn query_string(&self) -> String {
        let mut pairs: Vec<(&str, String)> = Vec::new();
        if let Some(q) = non_empty(self.query.as_deref()) {
            pairs.push(("q", q.to_owned()));
        }
        if let Some(tag) = non_empty(self.tag.as_deref()) {
            pairs.push(("tag", tag.to_owned()));
        }
        if self.archived == Some(true) {
            pairs.push(("archived", "true".to_owned()));
        }
        if !self.sort_field.is_empty() {
            pairs.push(("sortBy", self.sort_field.clone()));
        }
        pairs.push(("sortDir", self.sort_direction.as_str().to_owned()));
        pairs.push(("limit", self.limit.to_string()));
        if let Some(offset) = self.offset {
            pairs.push(("offset", offset.to_string()));
        }

        pairs
            .iter()
            .map(|(key, value)| format!("{}={}", urlencoding::encode(key), urlencoding::encode(value)))
            .collect::<Vec<_>>()
            .join("&")
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

fn note_endpoint(id: i64) -> String {
    format!("{NOTES_PATH}/{id}")
}

#[derive(Clone, Debug)]
pub struct NotesClient {
    gateway: RequestGateway,
}

impl NotesClient {
    #[must_use]
    pub fn new(gateway: RequestGateway) -> Self {
        Self { gateway }
    }

    /// `GET /api/notes?<filter>`.
    ///
    /// # Errors
    ///
    /// Returns the gateway's [`NormalizedError`] on any failure.
    pub async fn list(&self, filter: &NoteFilter) -> Result<Vec<Note>, NormalizedError> {
        let query = filter.query_string();
        let endpoint = if query.is_empty() { NOTES_PATH.to_owned() } else { format!("{NOTES_PATH}?{query}") };
        let envelope: NotesEnvelope = self.gateway.get(&endpoint).await?;
        Ok(envelope.notes)
    }

    /// `POST /api/notes`.
    ///
    /// # Errors
    ///
    /// Returns the gateway's [`NormalizedError`] on any failure.
    pub async fn create(&self, draft: &NoteDraft) -> Result<Note, NormalizedError> {
        let envelope: NoteEnvelope = self.gateway.post(NOTES_PATH, draft).await?;
        Ok(envelope.note)
    }

    /// `GET /api/notes/:id`.
    ///
    /// # Errors
    ///
    /// Returns the gateway's [`NormalizedError`] on any failure.
    pub async fn get(&self, id: i64) -> Result<Note, NormalizedError> {
        let envelope: NoteEnvelope = self.gateway.get(&note_endpoint(id)).await?;
        Ok(envelope.note)
    }

    /// `PUT /api/notes/:id` with only the patch's present fields.
    ///
    /// # Errors
    ///
    /// Returns the gateway's [`NormalizedError`] on any failure.
    pub async fn update(&self, id: i64, patch: &NotePatch) -> Result<Note, NormalizedError> {
        let envelope: NoteEnvelope = self.gateway.put(&note_endpoint(id), patch).await?;
        Ok(envelope.note)
    }

    /// `DELETE /api/notes/:id`. Any response body is ignored.
    ///
    /// # Errors
    ///
    /// Returns the gateway's [`NormalizedError`] on any failure.
    pub async fn delete(&self, id: i64) -> Result<(), NormalizedError> {
        let _: IgnoredAny = self.gateway.delete(&note_endpoint(id)).await?;
        Ok(())
    }
}
