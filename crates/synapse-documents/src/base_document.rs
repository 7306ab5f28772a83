//! [`BaseDocument`] — the CIP record and its reconciliation with the server.
//!
//! Every operation follows the same shape: validate arguments, authenticate
//! the user, send one payload to the users resource, then merge the response
//! back into local state. Nothing local changes unless the round trip
//! succeeds.
//!
//! The response is not trusted to echo object identity. The document's own
//! entry is located by id (falling back to the last entry when the server has
//! reassigned it), and each local sub-document takes the most recently
//! updated response record of the same kind and `document_type`.

use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use crate::{
  Error, Result,
  change::{Change, Field, coalesce, payloads},
  draft::{NewBaseDocument, ValidDraft},
  settings::Settings,
  sub_document::{
    Document, DocumentKey, DocumentKind, PhysicalDocument, SocialDocument,
    SubDocument, SubDocumentRef, VirtualDocument, collect_kind,
  },
  user::{User, UsersApi},
  wire::{
    DocumentRecord, DocumentsPayload, DocumentsResponse, SubDocumentRecord,
    latest_of_type,
  },
};

// ─── BaseDocument ────────────────────────────────────────────────────────────

/// A user's CIP record with its physical, social and virtual documents.
#[derive(Debug, Clone, PartialEq)]
pub struct BaseDocument {
  /// Server id; `None` until the first successful submit.
  pub id:                   Option<String>,
  key:                      DocumentKey,
  /// Id of the owning user.
  pub user_id:              String,
  pub email:                Option<String>,
  pub phone_number:         Option<String>,
  pub ip:                   Option<String>,
  pub name:                 Option<String>,
  pub aka:                  Option<String>,
  pub entity_type:          Option<String>,
  pub entity_scope:         Option<String>,
  pub birth_day:            Option<u32>,
  pub birth_month:          Option<u32>,
  pub birth_year:           Option<i32>,
  pub address_street:       Option<String>,
  pub address_city:         Option<String>,
  pub address_subdivision:  Option<String>,
  pub address_postal_code:  Option<String>,
  pub address_country_code: Option<String>,
  /// Reported by the server only.
  pub permission_scope:     Option<String>,
  /// Reported by the server only.
  pub screening_results:    Option<Value>,
  pub physical_documents:   Vec<PhysicalDocument>,
  pub social_documents:     Vec<SocialDocument>,
  pub virtual_documents:    Vec<VirtualDocument>,
}

impl BaseDocument {
  fn empty(user_id: &str) -> Self {
    Self {
      id:                   None,
      key:                  DocumentKey::new(),
      user_id:              user_id.to_owned(),
      email:                None,
      phone_number:         None,
      ip:                   None,
      name:                 None,
      aka:                  None,
      entity_type:          None,
      entity_scope:         None,
      birth_day:            None,
      birth_month:          None,
      birth_year:           None,
      address_street:       None,
      address_city:         None,
      address_subdivision:  None,
      address_postal_code:  None,
      address_country_code: None,
      permission_scope:     None,
      screening_results:    None,
      physical_documents:   Vec::new(),
      social_documents:     Vec::new(),
      virtual_documents:    Vec::new(),
    }
  }

  fn from_draft(user_id: &str, draft: ValidDraft) -> Self {
    let mut doc = Self {
      email: Some(draft.email),
      phone_number: Some(draft.phone_number),
      ip: Some(draft.ip),
      name: Some(draft.name),
      aka: Some(draft.aka),
      entity_type: Some(draft.entity_type),
      entity_scope: Some(draft.entity_scope),
      birth_day: Some(draft.birth_day),
      birth_month: Some(draft.birth_month),
      birth_year: Some(draft.birth_year),
      address_street: Some(draft.address_street),
      address_city: Some(draft.address_city),
      address_subdivision: Some(draft.address_subdivision),
      address_postal_code: Some(draft.address_postal_code),
      address_country_code: Some(draft.address_country_code),
      physical_documents: draft.physical_documents,
      social_documents: draft.social_documents,
      virtual_documents: draft.virtual_documents,
      ..Self::empty(user_id)
    };
    doc.link_all();
    doc
  }

  /// Local identity; sub-documents point at it through
  /// [`Document::base_document`].
  pub fn key(&self) -> DocumentKey { self.key }

  /// Every sub-document: physical, then social, then virtual.
  pub fn documents(&self) -> impl Iterator<Item = SubDocumentRef<'_>> {
    self
      .physical_documents
      .iter()
      .map(SubDocumentRef::Physical)
      .chain(self.social_documents.iter().map(SubDocumentRef::Social))
      .chain(self.virtual_documents.iter().map(SubDocumentRef::Virtual))
  }

  fn link_all(&mut self) {
    let key = self.key;
    self.physical_documents.iter_mut().for_each(|d| d.link(key));
    self.social_documents.iter_mut().for_each(|d| d.link(key));
    self.virtual_documents.iter_mut().for_each(|d| d.link(key));
  }

  // ── Create / submit ───────────────────────────────────────────────────────

  /// Validate `draft`, then create the document on the server.
  ///
  /// Validation failures are reported before any network call.
  pub async fn create<U: User>(user: &U, draft: NewBaseDocument) -> Result<Self> {
    let draft = draft.validate(user.settings())?;
    let mut doc = Self::from_draft(user.id(), draft);
    doc.submit(user).await?;
    Ok(doc)
  }

  /// Send the full document to the server and reconcile the response.
  pub async fn submit<U: User>(&mut self, user: &U) -> Result<&mut Self> {
    user.authenticate().await?;

    let payload = DocumentsPayload::single(self.create_fields());
    log_payload(user.settings(), "submit", &payload);

    let response = user.users().update(user.id(), &payload).await?;
    self.reconcile(&response);

    info!(
      document_id = self.id.as_deref().unwrap_or_default(),
      user_id = %self.user_id,
      "submitted base document"
    );
    Ok(self)
  }

  fn create_fields(&self) -> Map<String, Value> {
    let mut fields = Map::new();
    let scalars = [
      (Field::Email, self.email.clone().map(Value::from)),
      (Field::PhoneNumber, self.phone_number.clone().map(Value::from)),
      (Field::Ip, self.ip.clone().map(Value::from)),
      (Field::Name, self.name.clone().map(Value::from)),
      (Field::Aka, self.aka.clone().map(Value::from)),
      (Field::EntityType, self.entity_type.clone().map(Value::from)),
      (Field::EntityScope, self.entity_scope.clone().map(Value::from)),
      (Field::BirthDay, self.birth_day.map(Value::from)),
      (Field::BirthMonth, self.birth_month.map(Value::from)),
      (Field::BirthYear, self.birth_year.map(Value::from)),
      (Field::AddressStreet, self.address_street.clone().map(Value::from)),
      (Field::AddressCity, self.address_city.clone().map(Value::from)),
      (
        Field::AddressSubdivision,
        self.address_subdivision.clone().map(Value::from),
      ),
      (
        Field::AddressPostalCode,
        self.address_postal_code.clone().map(Value::from),
      ),
      (
        Field::AddressCountryCode,
        self.address_country_code.clone().map(Value::from),
      ),
    ];
    for (field, value) in scalars {
      fields.insert(field.api_name().to_owned(), value.unwrap_or(Value::Null));
    }

    if !self.physical_documents.is_empty() {
      fields.insert(
        DocumentKind::Physical.api_name().to_owned(),
        payloads(&self.physical_documents),
      );
    }
    if !self.social_documents.is_empty() {
      fields.insert(
        DocumentKind::Social.api_name().to_owned(),
        payloads(&self.social_documents),
      );
    }
    if !self.virtual_documents.is_empty() {
      fields.insert(
        DocumentKind::Virtual.api_name().to_owned(),
        payloads(&self.virtual_documents),
      );
    }
    fields
  }

  // ── Update ────────────────────────────────────────────────────────────────

  /// Send `changes` to the server and apply them locally.
  ///
  /// Repeated changes to one field are merged first: document lists are
  /// concatenated, any other field keeps its last value. Supplied values are
  /// applied and then the response is reconciled on top. New sub-documents are appended to their collections whatever the
  /// response contains.
  pub async fn update<U: User>(
    &mut self,
    user: &U,
    changes: Vec<Change>,
  ) -> Result<&mut Self> {
    if changes.is_empty() {
      return Err(Error::argument("update requires at least one change"));
    }
    let Some(id) = self.id.clone() else {
      return Err(Error::argument("cannot update a base document before it is submitted"));
    };

    user.authenticate().await?;

    let changes = coalesce(changes);
    let mut fields = Map::new();
    fields.insert("id".to_owned(), Value::String(id));
    for change in &changes {
      fields.insert(change.field().api_name().to_owned(), change.payload_value());
    }
    let payload = DocumentsPayload::single(fields);
    log_payload(user.settings(), "update", &payload);

    let response = user.users().update(user.id(), &payload).await?;

    for change in changes {
      self.apply_unverified(change);
    }
    self.reconcile(&response);

    info!(
      document_id = self.id.as_deref().unwrap_or_default(),
      user_id = %self.user_id,
      "updated base document"
    );
    Ok(self)
  }

  /// Apply a change from the supplied value rather than the response.
  fn apply_unverified(&mut self, change: Change) {
    match change {
      Change::Email(v) => self.email = Some(v),
      Change::PhoneNumber(v) => self.phone_number = Some(v),
      Change::Ip(v) => self.ip = Some(v),
      Change::Name(v) => self.name = Some(v),
      Change::Aka(v) => self.aka = Some(v),
      Change::EntityType(v) => self.entity_type = Some(v),
      Change::EntityScope(v) => self.entity_scope = Some(v),
      Change::BirthDay(v) => self.birth_day = Some(v),
      Change::BirthMonth(v) => self.birth_month = Some(v),
      Change::BirthYear(v) => self.birth_year = Some(v),
      Change::AddressStreet(v) => self.address_street = Some(v),
      Change::AddressCity(v) => self.address_city = Some(v),
      Change::AddressSubdivision(v) => self.address_subdivision = Some(v),
      Change::AddressPostalCode(v) => self.address_postal_code = Some(v),
      Change::AddressCountryCode(v) => self.address_country_code = Some(v),
      Change::PhysicalDocuments(docs) => {
        adopt(self.key, self.id.as_deref(), docs, &mut self.physical_documents)
      }
      Change::SocialDocuments(docs) => {
        adopt(self.key, self.id.as_deref(), docs, &mut self.social_documents)
      }
      Change::VirtualDocuments(docs) => {
        adopt(self.key, self.id.as_deref(), docs, &mut self.virtual_documents)
      }
    }
  }

  /// Add physical documents. Every entry must be a physical document.
  pub async fn add_physical_documents<U: User>(
    &mut self,
    user: &U,
    documents: Vec<SubDocument>,
  ) -> Result<&mut Self> {
    let docs = narrow_added(DocumentKind::Physical, documents)?;
    self.update(user, vec![Change::PhysicalDocuments(docs)]).await
  }

  /// Add social documents. Every entry must be a social document.
  pub async fn add_social_documents<U: User>(
    &mut self,
    user: &U,
    documents: Vec<SubDocument>,
  ) -> Result<&mut Self> {
    let docs = narrow_added(DocumentKind::Social, documents)?;
    self.update(user, vec![Change::SocialDocuments(docs)]).await
  }

  /// Add virtual documents. Every entry must be a virtual document.
  pub async fn add_virtual_documents<U: User>(
    &mut self,
    user: &U,
    documents: Vec<SubDocument>,
  ) -> Result<&mut Self> {
    let docs = narrow_added(DocumentKind::Virtual, documents)?;
    self.update(user, vec![Change::VirtualDocuments(docs)]).await
  }

  // ── Reconciliation ────────────────────────────────────────────────────────

  /// Merge a server response into this document.
  fn reconcile(&mut self, response: &DocumentsResponse) {
    let Some(record) = self.select_record(&response.documents) else {
      debug!("response carried no documents; nothing to reconcile");
      return;
    };

    self.id = Some(record.id.clone());
    self.apply_record_scalars(record);

    reconcile_collection(&mut self.physical_documents, record);
    reconcile_collection(&mut self.social_documents, record);
    reconcile_collection(&mut self.virtual_documents, record);
  }

  /// The response entry describing this document: the one with our id if
  /// present, otherwise the last entry.
  fn select_record<'a>(&self, records: &'a [DocumentRecord]) -> Option<&'a DocumentRecord> {
    let last = records.last()?;
    let Some(id) = self.id.as_deref() else {
      return Some(last);
    };
    match records.iter().find(|r| r.id == id) {
      Some(found) => Some(found),
      None => {
        warn!(old_id = id, new_id = %last.id, "base document id reassigned by server");
        Some(last)
      }
    }
  }

  fn apply_record_scalars(&mut self, record: &DocumentRecord) {
    overwrite(&mut self.email, &record.email);
    overwrite(&mut self.phone_number, &record.phone_number);
    overwrite(&mut self.ip, &record.ip);
    overwrite(&mut self.name, &record.name);
    overwrite(&mut self.aka, &record.aka);
    overwrite(&mut self.entity_type, &record.entity_type);
    overwrite(&mut self.entity_scope, &record.entity_scope);
    overwrite(&mut self.birth_day, &record.day);
    overwrite(&mut self.birth_month, &record.month);
    overwrite(&mut self.birth_year, &record.year);
    overwrite(&mut self.address_street, &record.address_street);
    overwrite(&mut self.address_city, &record.address_city);
    overwrite(&mut self.address_subdivision, &record.address_subdivision);
    overwrite(&mut self.address_postal_code, &record.address_postal_code);
    overwrite(&mut self.address_country_code, &record.address_country_code);
    overwrite(&mut self.permission_scope, &record.permission_scope);
    overwrite(&mut self.screening_results, &record.screening_results);
  }

  // ── From response ─────────────────────────────────────────────────────────

  /// Build one base document per response entry, without any network call.
  pub fn create_from_response<U: User>(
    user: &U,
    response: &DocumentsResponse,
  ) -> Vec<Self> {
    response
      .documents
      .iter()
      .map(|record| {
        let mut doc = Self {
          id: Some(record.id.clone()),
          physical_documents: from_records(&record.physical_docs),
          social_documents: from_records(&record.social_docs),
          virtual_documents: from_records(&record.virtual_docs),
          ..Self::empty(user.id())
        };
        doc.apply_record_scalars(record);
        doc.link_all();
        doc
      })
      .collect()
  }
}

// ─── Helpers ─────────────────────────────────────────────────────────────────

fn reconcile_collection<D: Document>(docs: &mut [D], record: &DocumentRecord) {
  let candidates = record.docs(D::KIND);
  for doc in docs {
    let latest = latest_of_type(candidates, doc.document_type());
    debug!(
      kind = %D::KIND,
      document_type = doc.document_type(),
      matched = latest.map(|r| r.id.as_str()),
      "reconciling sub-document"
    );
    doc.update_from_response(latest);
  }
}

fn adopt<D: Document>(
  key: DocumentKey,
  id: Option<&str>,
  docs: Vec<D>,
  into: &mut Vec<D>,
) {
  for mut doc in docs {
    doc.set_id(id.map(str::to_owned));
    doc.link(key);
    into.push(doc);
  }
}

fn from_records<D: Document>(records: &[SubDocumentRecord]) -> Vec<D> {
  records.iter().map(D::from_response).collect()
}

fn narrow_added<D>(kind: DocumentKind, documents: Vec<SubDocument>) -> Result<Vec<D>>
where
  D: Document + TryFrom<SubDocument, Error = SubDocument>,
{
  if documents.is_empty() {
    return Err(Error::argument(format!("no {kind} documents supplied")));
  }
  collect_kind(documents).map_err(|(index, found)| {
    Error::argument(format!(
      "document {index} is a {found} document, expected {kind}"
    ))
  })
}

fn overwrite<T: Clone>(field: &mut Option<T>, value: &Option<T>) {
  if let Some(value) = value {
    *field = Some(value.clone());
  }
}

fn log_payload(settings: &Settings, operation: &str, payload: &DocumentsPayload) {
  if settings.log_payloads {
    debug!(operation, payload = ?payload, "sending documents payload");
  } else {
    debug!(operation, fields = ?payload.field_names(), "sending documents payload");
  }
}
