//! Request payloads and response records exchanged with the users resource.
//!
//! Field names here are the platform's API names (`alias`, `day`,
//! `physical_docs`, ...), not the names used on [`BaseDocument`].
//!
//! [`BaseDocument`]: crate::base_document::BaseDocument

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::sub_document::DocumentKind;

// ─── Request ─────────────────────────────────────────────────────────────────

/// Body of a users `update` call: `{"documents": [ { field: value, ... } ]}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentsPayload {
  pub documents: Vec<Map<String, Value>>,
}

impl DocumentsPayload {
  /// Wrap a single document's fields.
  pub fn single(fields: Map<String, Value>) -> Self {
    Self {
      documents: vec![fields],
    }
  }

  /// Field names of every document in the payload, for logging.
  pub fn field_names(&self) -> Vec<&str> {
    self
      .documents
      .iter()
      .flat_map(|doc| doc.keys().map(String::as_str))
      .collect()
  }
}

// ─── Response ────────────────────────────────────────────────────────────────

/// Body returned by the users resource.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentsResponse {
  #[serde(default)]
  pub documents: Vec<DocumentRecord>,
}

/// One base document as reported by the server. Every scalar is optional:
/// the API does not echo all fields on every call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentRecord {
  pub id:                   String,
  pub email:                Option<String>,
  pub phone_number:         Option<String>,
  pub ip:                   Option<String>,
  pub name:                 Option<String>,
  #[serde(rename = "alias")]
  pub aka:                  Option<String>,
  pub entity_type:          Option<String>,
  pub entity_scope:         Option<String>,
  pub day:                  Option<u32>,
  pub month:                Option<u32>,
  pub year:                 Option<i32>,
  pub address_street:       Option<String>,
  pub address_city:         Option<String>,
  pub address_subdivision:  Option<String>,
  pub address_postal_code:  Option<String>,
  pub address_country_code: Option<String>,
  pub permission_scope:     Option<String>,
  pub screening_results:    Option<Value>,
  #[serde(default)]
  pub physical_docs:        Vec<SubDocumentRecord>,
  #[serde(default)]
  pub social_docs:          Vec<SubDocumentRecord>,
  #[serde(default)]
  pub virtual_docs:         Vec<SubDocumentRecord>,
}

impl DocumentRecord {
  /// The sub-document list for `kind`.
  pub fn docs(&self, kind: DocumentKind) -> &[SubDocumentRecord] {
    match kind {
      DocumentKind::Physical => &self.physical_docs,
      DocumentKind::Social => &self.social_docs,
      DocumentKind::Virtual => &self.virtual_docs,
    }
  }
}

/// One physical, social or virtual document as reported by the server.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SubDocumentRecord {
  pub id:            String,
  pub document_type: String,
  pub status:        Option<String>,
  /// Milliseconds since the epoch on the wire.
  #[serde(default, with = "chrono::serde::ts_milliseconds_option")]
  pub last_updated:  Option<DateTime<Utc>>,
  /// Extra data some virtual documents carry (e.g. question sets).
  pub meta:          Option<Value>,
}

/// Pick the record of `document_type` with the latest `last_updated`.
///
/// The first of several equally recent records wins, so the choice is stable
/// for a given response order.
pub fn latest_of_type<'a>(
  records: &'a [SubDocumentRecord],
  document_type: &str,
) -> Option<&'a SubDocumentRecord> {
  records
    .iter()
    .filter(|r| r.document_type == document_type)
    .fold(None, |best, r| match best {
      Some(b) if b.last_updated >= r.last_updated => Some(b),
      _ => Some(r),
    })
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;

  fn records() -> Vec<SubDocumentRecord> {
    serde_json::from_value(json!([
      { "id": "a", "document_type": "GOVT_ID", "last_updated": 100 },
      { "id": "b", "document_type": "SELFIE",  "last_updated": 900 },
      { "id": "c", "document_type": "GOVT_ID", "last_updated": 200 },
      { "id": "d", "document_type": "GOVT_ID", "last_updated": 200 },
    ]))
    .unwrap()
  }

  #[test]
  fn latest_picks_greatest_timestamp_within_type() {
    let records = records();
    let latest = latest_of_type(&records, "GOVT_ID").unwrap();
    assert_eq!(latest.id, "c");
  }

  #[test]
  fn latest_of_missing_type_is_none() {
    assert!(latest_of_type(&records(), "SSN").is_none());
  }

  #[test]
  fn last_updated_parses_as_milliseconds() {
    let records = records();
    assert_eq!(records[0].last_updated.unwrap().timestamp_millis(), 100);
  }

  #[test]
  fn response_without_sub_documents_deserializes() {
    let response: DocumentsResponse =
      serde_json::from_value(json!({ "documents": [{ "id": "1" }] })).unwrap();
    assert_eq!(response.documents.len(), 1);
    assert!(response.documents[0].physical_docs.is_empty());
    assert!(response.documents[0].screening_results.is_none());
  }
}
