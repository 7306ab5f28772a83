//! Physical, social and virtual verification documents.
//!
//! Each kind serializes itself into a request fragment and is updated in
//! place from the matching response record. A sub-document points back at its
//! owning [`BaseDocument`] through a [`DocumentKey`]; the base document owns
//! the sub-document, never the other way round.
//!
//! [`BaseDocument`]: crate::base_document::BaseDocument

use std::fmt;

use base64::{Engine as _, engine::general_purpose::STANDARD};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use uuid::Uuid;

use crate::wire::SubDocumentRecord;

// ─── Kind and key ────────────────────────────────────────────────────────────

/// Which of the three sub-document collections a document belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
  Physical,
  Social,
  Virtual,
}

impl DocumentKind {
  /// Key of this collection in request payloads and responses.
  pub fn api_name(self) -> &'static str {
    match self {
      Self::Physical => "physical_docs",
      Self::Social => "social_docs",
      Self::Virtual => "virtual_docs",
    }
  }
}

impl fmt::Display for DocumentKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(match self {
      Self::Physical => "physical",
      Self::Social => "social",
      Self::Virtual => "virtual",
    })
  }
}

/// Local identity of a base document, stable before and after the server
/// assigns an id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DocumentKey(Uuid);

impl DocumentKey {
  pub fn new() -> Self { Self(Uuid::new_v4()) }
}

impl Default for DocumentKey {
  fn default() -> Self { Self::new() }
}

// ─── Document trait ──────────────────────────────────────────────────────────

/// Behaviour shared by the three sub-document kinds.
pub trait Document: Sized {
  const KIND: DocumentKind;

  fn document_type(&self) -> &str;

  fn id(&self) -> Option<&str>;

  fn set_id(&mut self, id: Option<String>);

  fn base_document(&self) -> Option<DocumentKey>;

  /// Point this document at its owning base document.
  fn link(&mut self, key: DocumentKey);

  /// Request fragment for this document.
  fn to_payload(&self) -> Value;

  /// Apply server state from `record`. `None` leaves the document untouched.
  fn update_from_response(&mut self, record: Option<&SubDocumentRecord>);

  /// Build a document from a server record.
  fn from_response(record: &SubDocumentRecord) -> Self;
}

/// Implements [`Document`] for a struct with the common `document_type`,
/// `value`, `id`, `status`, `last_updated` and `base_document` fields. The
/// optional closure-like block runs after the common fields are taken from a
/// response record.
macro_rules! impl_document {
  ($ty:ident, $kind:ident $(, |$doc:ident, $record:ident| $extra:block)?) => {
    impl Document for $ty {
      const KIND: DocumentKind = DocumentKind::$kind;

      fn document_type(&self) -> &str { &self.document_type }

      fn id(&self) -> Option<&str> { self.id.as_deref() }

      fn set_id(&mut self, id: Option<String>) { self.id = id; }

      fn base_document(&self) -> Option<DocumentKey> { self.base_document }

      fn link(&mut self, key: DocumentKey) { self.base_document = Some(key); }

      fn to_payload(&self) -> Value {
        json!({ "document_type": self.document_type, "document_value": self.value })
      }

      fn update_from_response(&mut self, record: Option<&SubDocumentRecord>) {
        let Some(record) = record else { return };
        self.id = Some(record.id.clone());
        self.status = record.status.clone();
        self.last_updated = record.last_updated;
        $(
          let ($doc, $record) = (self, record);
          $extra
        )?
      }

      fn from_response(record: &SubDocumentRecord) -> Self {
        let mut doc = Self::new(record.document_type.clone(), String::new());
        doc.update_from_response(Some(record));
        doc
      }
    }
  };
}

// ─── Physical ────────────────────────────────────────────────────────────────

/// An uploaded artifact such as an ID scan or a selfie.
///
/// `value` is a data URI; see [`PhysicalDocument::from_bytes`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhysicalDocument {
  pub document_type: String,
  pub value:         String,
  #[serde(skip)]
  pub id:            Option<String>,
  #[serde(skip)]
  pub status:        Option<String>,
  #[serde(skip)]
  pub last_updated:  Option<DateTime<Utc>>,
  #[serde(skip)]
  pub base_document: Option<DocumentKey>,
}

impl PhysicalDocument {
  pub fn new(document_type: impl Into<String>, value: impl Into<String>) -> Self {
    Self {
      document_type: document_type.into(),
      value:         value.into(),
      id:            None,
      status:        None,
      last_updated:  None,
      base_document: None,
    }
  }

  /// Encode raw file contents as a `data:<mime>;base64,...` URI.
  pub fn from_bytes(
    document_type: impl Into<String>,
    mime_type: &str,
    bytes: &[u8],
  ) -> Self {
    Self::new(
      document_type,
      format!("data:{mime_type};base64,{}", STANDARD.encode(bytes)),
    )
  }
}

impl_document!(PhysicalDocument, Physical);

// ─── Social ──────────────────────────────────────────────────────────────────

/// A contact point or profile link, e.g. an email address or a LinkedIn URL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SocialDocument {
  pub document_type: String,
  pub value:         String,
  #[serde(skip)]
  pub id:            Option<String>,
  #[serde(skip)]
  pub status:        Option<String>,
  #[serde(skip)]
  pub last_updated:  Option<DateTime<Utc>>,
  #[serde(skip)]
  pub base_document: Option<DocumentKey>,
}

impl SocialDocument {
  pub fn new(document_type: impl Into<String>, value: impl Into<String>) -> Self {
    Self {
      document_type: document_type.into(),
      value:         value.into(),
      id:            None,
      status:        None,
      last_updated:  None,
      base_document: None,
    }
  }
}

impl_document!(SocialDocument, Social);

// ─── Virtual ─────────────────────────────────────────────────────────────────

/// A number checked against external records, e.g. an SSN or a TIN.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VirtualDocument {
  pub document_type: String,
  pub value:         String,
  #[serde(skip)]
  pub id:            Option<String>,
  #[serde(skip)]
  pub status:        Option<String>,
  #[serde(skip)]
  pub last_updated:  Option<DateTime<Utc>>,
  /// Follow-up data the server may attach, such as a question set.
  #[serde(skip)]
  pub meta:          Option<Value>,
  #[serde(skip)]
  pub base_document: Option<DocumentKey>,
}

impl VirtualDocument {
  pub fn new(document_type: impl Into<String>, value: impl Into<String>) -> Self {
    Self {
      document_type: document_type.into(),
      value:         value.into(),
      id:            None,
      status:        None,
      last_updated:  None,
      meta:          None,
      base_document: None,
    }
  }
}

impl_document!(VirtualDocument, Virtual, |doc, record| {
  if record.meta.is_some() {
    doc.meta = record.meta.clone();
  }
});

// ─── SubDocument ─────────────────────────────────────────────────────────────

/// Any sub-document, tagged by kind.
///
/// Serialized as `{"kind": "physical", "document_type": ..., "value": ...}`,
/// which is how untyped drafts name the kind of each entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum SubDocument {
  Physical(PhysicalDocument),
  Social(SocialDocument),
  Virtual(VirtualDocument),
}

impl SubDocument {
  pub fn kind(&self) -> DocumentKind {
    match self {
      Self::Physical(_) => DocumentKind::Physical,
      Self::Social(_) => DocumentKind::Social,
      Self::Virtual(_) => DocumentKind::Virtual,
    }
  }
}

impl From<PhysicalDocument> for SubDocument {
  fn from(doc: PhysicalDocument) -> Self { Self::Physical(doc) }
}

impl From<SocialDocument> for SubDocument {
  fn from(doc: SocialDocument) -> Self { Self::Social(doc) }
}

impl From<VirtualDocument> for SubDocument {
  fn from(doc: VirtualDocument) -> Self { Self::Virtual(doc) }
}

impl TryFrom<SubDocument> for PhysicalDocument {
  type Error = SubDocument;

  fn try_from(doc: SubDocument) -> Result<Self, Self::Error> {
    match doc {
      SubDocument::Physical(doc) => Ok(doc),
      other => Err(other),
    }
  }
}

impl TryFrom<SubDocument> for SocialDocument {
  type Error = SubDocument;

  fn try_from(doc: SubDocument) -> Result<Self, Self::Error> {
    match doc {
      SubDocument::Social(doc) => Ok(doc),
      other => Err(other),
    }
  }
}

impl TryFrom<SubDocument> for VirtualDocument {
  type Error = SubDocument;

  fn try_from(doc: SubDocument) -> Result<Self, Self::Error> {
    match doc {
      SubDocument::Virtual(doc) => Ok(doc),
      other => Err(other),
    }
  }
}

/// Convert a mixed list into documents of kind `D`.
///
/// On failure returns the index and kind of the first mismatching entry.
pub(crate) fn collect_kind<D>(
  docs: Vec<SubDocument>,
) -> Result<Vec<D>, (usize, DocumentKind)>
where
  D: Document + TryFrom<SubDocument, Error = SubDocument>,
{
  docs
    .into_iter()
    .enumerate()
    .map(|(i, doc)| D::try_from(doc).map_err(|other| (i, other.kind())))
    .collect()
}

/// A borrowed sub-document of any kind.
#[derive(Debug, Clone, Copy)]
pub enum SubDocumentRef<'a> {
  Physical(&'a PhysicalDocument),
  Social(&'a SocialDocument),
  Virtual(&'a VirtualDocument),
}

impl SubDocumentRef<'_> {
  pub fn kind(&self) -> DocumentKind {
    match self {
      Self::Physical(_) => DocumentKind::Physical,
      Self::Social(_) => DocumentKind::Social,
      Self::Virtual(_) => DocumentKind::Virtual,
    }
  }

  pub fn document_type(&self) -> &str {
    match self {
      Self::Physical(d) => d.document_type(),
      Self::Social(d) => d.document_type(),
      Self::Virtual(d) => d.document_type(),
    }
  }

  pub fn id(&self) -> Option<&str> {
    match self {
      Self::Physical(d) => d.id(),
      Self::Social(d) => d.id(),
      Self::Virtual(d) => d.id(),
    }
  }

  pub fn base_document(&self) -> Option<DocumentKey> {
    match self {
      Self::Physical(d) => d.base_document(),
      Self::Social(d) => d.base_document(),
      Self::Virtual(d) => d.base_document(),
    }
  }
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;

  #[test]
  fn from_bytes_builds_data_uri() {
    let doc = PhysicalDocument::from_bytes("GOVT_ID", "image/png", b"abc");
    assert_eq!(doc.value, "data:image/png;base64,YWJj");
  }

  #[test]
  fn payload_uses_api_field_names() {
    let doc = VirtualDocument::new("SSN", "2222");
    assert_eq!(
      doc.to_payload(),
      json!({ "document_type": "SSN", "document_value": "2222" })
    );
  }

  #[test]
  fn update_without_record_is_a_no_op() {
    let mut doc = SocialDocument::new("EMAIL", "a@example.com");
    doc.id = Some("keep".into());
    doc.update_from_response(None);
    assert_eq!(doc.id.as_deref(), Some("keep"));
    assert_eq!(doc.value, "a@example.com");
  }

  #[test]
  fn virtual_keeps_meta_from_response() {
    let record: SubDocumentRecord = serde_json::from_value(json!({
      "id": "v1",
      "document_type": "SSN",
      "status": "SUBMITTED|MFA_PENDING",
      "last_updated": 1500000000000_i64,
      "meta": { "question_set": { "id": "q1" } },
    }))
    .unwrap();

    let doc = VirtualDocument::from_response(&record);
    assert_eq!(doc.id.as_deref(), Some("v1"));
    assert_eq!(doc.status.as_deref(), Some("SUBMITTED|MFA_PENDING"));
    assert_eq!(doc.meta, Some(json!({ "question_set": { "id": "q1" } })));
    assert!(doc.base_document.is_none());
  }

  #[test]
  fn record_without_meta_keeps_existing_meta() {
    let record: SubDocumentRecord = serde_json::from_value(json!({
      "id": "v2",
      "document_type": "SSN",
      "status": "SUBMITTED|VALID",
    }))
    .unwrap();

    let mut doc = VirtualDocument::new("SSN", "2222");
    doc.meta = Some(json!({ "question_set": { "id": "q1" } }));
    doc.update_from_response(Some(&record));
    assert_eq!(doc.id.as_deref(), Some("v2"));
    assert_eq!(doc.meta, Some(json!({ "question_set": { "id": "q1" } })));

    let physical = PhysicalDocument::from_response(&record);
    assert_eq!(physical.document_type, "SSN");
    assert_eq!(physical.status.as_deref(), Some("SUBMITTED|VALID"));
    assert_eq!(physical.value, "");
  }

  #[test]
  fn tagged_sub_document_deserializes_by_kind() {
    let doc: SubDocument = serde_json::from_value(json!({
      "kind": "social",
      "document_type": "PHONE_NUMBER",
      "value": "555-0100",
    }))
    .unwrap();
    assert_eq!(doc.kind(), DocumentKind::Social);
  }

  #[test]
  fn collect_kind_reports_first_mismatch() {
    let docs = vec![
      PhysicalDocument::new("GOVT_ID", "data:,").into(),
      SocialDocument::new("EMAIL", "a@example.com").into(),
    ];
    let err = collect_kind::<PhysicalDocument>(docs).unwrap_err();
    assert_eq!(err, (1, DocumentKind::Social));
  }
}
