//! Note records and request parameters exchanged with the notes backend

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Page used when the caller does not ask for one
pub const DEFAULT_PAGE: u32 = 1;

/// A note as returned by the backend.
///
/// The client never edits a note locally; write operations hand back the
/// backend's copy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    pub tag: NoteTag,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Category attached to every note.
///
/// Unknown values are carried through as [`NoteTag::Other`] so the backend
/// stays the only place that validates tags.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NoteTag {
    Todo,
    Work,
    Personal,
    Meeting,
    Shopping,
    #[serde(untagged)]
    Other(String),
}

impl NoteTag {
    pub fn as_str(&self) -> &str {
        match self {
            NoteTag::Todo => "Todo",
            NoteTag::Work => "Work",
            NoteTag::Personal => "Personal",
            NoteTag::Meeting => "Meeting",
            NoteTag::Shopping => "Shopping",
            NoteTag::Other(s) => s,
        }
    }
}

impl fmt::Display for NoteTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One page of notes from `GET /notes`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotesPage {
    pub notes: Vec<Note>,
    pub total_pages: u32,
}

/// Filters for [`crate::NotesClient::list_notes`].
///
/// Empty strings and zero counts are treated as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListNotesParams {
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub tag: Option<NoteTag>,
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub per_page: Option<u32>,
}

impl ListNotesParams {
    pub fn search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    pub fn tag(mut self, tag: NoteTag) -> Self {
        self.tag = Some(tag);
        self
    }

    pub fn page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }

    pub fn per_page(mut self, per_page: u32) -> Self {
        self.per_page = Some(per_page);
        self
    }

    /// Query string pairs in wire order. `page` is always present.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::with_capacity(4);

        if let Some(search) = self.search.as_deref().filter(|s| !s.is_empty()) {
            pairs.push(("search", search.to_string()));
        }
        if let Some(tag) = self.tag.as_ref().filter(|t| !t.as_str().is_empty()) {
            pairs.push(("tag", tag.to_string()));
        }
        pairs.push(("page", self.page.unwrap_or(DEFAULT_PAGE).to_string()));
        if let Some(per_page) = self.per_page.filter(|&n| n > 0) {
            pairs.push(("perPage", per_page.to_string()));
        }

        pairs
    }
}

/// Body of `POST /notes`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateNotePayload {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    pub tag: NoteTag,
}

impl CreateNotePayload {
    pub fn new(title: impl Into<String>, tag: NoteTag) -> Self {
        Self {
            title: title.into(),
            content: None,
            tag,
        }
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==================== ListNotesParams ====================

    #[test]
    fn test_default_params_send_only_page() {
        let pairs = ListNotesParams::default().query_pairs();
        assert_eq!(pairs, vec![("page", "1".to_string())]);
    }

    #[test]
    fn test_all_params_in_order() {
        let pairs = ListNotesParams::default()
            .search("groceries")
            .tag(NoteTag::Shopping)
            .page(3)
            .per_page(12)
            .query_pairs();

        assert_eq!(
            pairs,
            vec![
                ("search", "groceries".to_string()),
                ("tag", "Shopping".to_string()),
                ("page", "3".to_string()),
                ("perPage", "12".to_string()),
            ]
        );
    }

    #[test]
    fn test_falsy_params_are_omitted() {
        let pairs = ListNotesParams::default()
            .search("")
            .tag(NoteTag::Other(String::new()))
            .per_page(0)
            .query_pairs();
        assert_eq!(pairs, vec![("page", "1".to_string())]);
    }

    // ==================== NoteTag ====================

    #[test]
    fn test_known_tag_wire_format() {
        assert_eq!(serde_json::to_string(&NoteTag::Meeting).unwrap(), "\"Meeting\"");
        let tag: NoteTag = serde_json::from_str("\"Work\"").unwrap();
        assert_eq!(tag, NoteTag::Work);
    }

    #[test]
    fn test_unknown_tag_passes_through() {
        let tag: NoteTag = serde_json::from_str("\"Urgent\"").unwrap();
        assert_eq!(tag, NoteTag::Other("Urgent".to_string()));
        assert_eq!(serde_json::to_string(&tag).unwrap(), "\"Urgent\"");
    }

    // ==================== Note ====================

    #[test]
    fn test_note_from_backend_json() {
        let json = r#"{
            "id": "65f0c1",
            "title": "Standup",
            "content": "Talk about the release",
            "tag": "Meeting",
            "createdAt": "2024-03-12T09:15:00.000Z",
            "updatedAt": "2024-03-12T10:00:00Z"
        }"#;
        let note: Note = serde_json::from_str(json).unwrap();
        assert_eq!(note.id, "65f0c1");
        assert_eq!(note.tag, NoteTag::Meeting);
        assert_eq!(note.content.as_deref(), Some("Talk about the release"));
        assert!(note.updated_at > note.created_at);
    }

    #[test]
    fn test_note_without_content() {
        let json = r#"{
            "id": "1",
            "title": "Milk",
            "tag": "Shopping",
            "createdAt": "2024-03-12T09:15:00Z",
            "updatedAt": "2024-03-12T09:15:00Z"
        }"#;
        let note: Note = serde_json::from_str(json).unwrap();
        assert!(note.content.is_none());
    }

    #[test]
    fn test_create_payload_omits_missing_content() {
        let payload = CreateNotePayload::new("Milk", NoteTag::Shopping);
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json, serde_json::json!({ "title": "Milk", "tag": "Shopping" }));

        let payload = payload.with_content("2 litres");
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["content"], "2 litres");
    }
}
