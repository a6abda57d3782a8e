//! Request and response bodies of the notes service.

use serde::{Deserialize, Serialize};

use super::types::Note;

// ============================================================================
// Responses
// ============================================================================

/// `GET /`
#[derive(Debug, Deserialize)]
pub struct ApiNotesResponse {
  pub notes: Vec<Note>,
}

/// `POST /`
#[derive(Debug, Deserialize)]
pub struct ApiNoteResponse {
  pub note: Option<Note>,
}

/// `GET /identifier`
#[derive(Debug, Deserialize)]
pub struct ApiIdentifierResponse {
  pub identifier: String,
}

// ============================================================================
// Requests
// ============================================================================

/// `POST /`
#[derive(Debug, Serialize)]
pub struct ApiCreateRequest<'a> {
  pub note: &'a str,
}

/// `PUT /`
#[derive(Debug, Serialize)]
pub struct ApiUpdateRequest<'a> {
  pub notes: &'a [Note],
}

/// `DELETE /`
#[derive(Debug, Serialize)]
pub struct ApiDeleteRequest<'a> {
  pub ids: &'a [i64],
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_parse_notes_response() {
    let body = r#"{"notes":[{"id":1,"note":"first"},{"id":2,"note":"second"}]}"#;
    let response: ApiNotesResponse = serde_json::from_str(body).unwrap();
    assert_eq!(
      response.notes,
      vec![Note::new(1, "first"), Note::new(2, "second")]
    );
  }

  #[test]
  fn test_parse_create_response_without_payload() {
    let response: ApiNoteResponse = serde_json::from_str("{}").unwrap();
    assert!(response.note.is_none());
  }

  #[test]
  fn test_request_bodies() {
    let create = serde_json::to_value(ApiCreateRequest { note: "hello" }).unwrap();
    assert_eq!(create, serde_json::json!({ "note": "hello" }));

    let notes = [Note::new(4, "edited")];
    let update = serde_json::to_value(ApiUpdateRequest { notes: &notes }).unwrap();
    assert_eq!(
      update,
      serde_json::json!({ "notes": [{ "id": 4, "note": "edited" }] })
    );

    let delete = serde_json::to_value(ApiDeleteRequest { ids: &[1, 3] }).unwrap();
    assert_eq!(delete, serde_json::json!({ "ids": [1, 3] }));
  }
}
