//! Typed field changes accepted by [`BaseDocument::update`].
//!
//! [`BaseDocument::update`]: crate::base_document::BaseDocument::update

use serde_json::Value;

use crate::sub_document::{
  Document, DocumentKind, PhysicalDocument, SocialDocument, VirtualDocument,
};

/// An updatable base document field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
  Email,
  PhoneNumber,
  Ip,
  Name,
  Aka,
  EntityType,
  EntityScope,
  BirthDay,
  BirthMonth,
  BirthYear,
  AddressStreet,
  AddressCity,
  AddressSubdivision,
  AddressPostalCode,
  AddressCountryCode,
  Documents(DocumentKind),
}

impl Field {
  /// Name of the field in request payloads.
  pub fn api_name(self) -> &'static str {
    match self {
      Self::Email => "email",
      Self::PhoneNumber => "phone_number",
      Self::Ip => "ip",
      Self::Name => "name",
      Self::Aka => "alias",
      Self::EntityType => "entity_type",
      Self::EntityScope => "entity_scope",
      Self::BirthDay => "day",
      Self::BirthMonth => "month",
      Self::BirthYear => "year",
      Self::AddressStreet => "address_street",
      Self::AddressCity => "address_city",
      Self::AddressSubdivision => "address_subdivision",
      Self::AddressPostalCode => "address_postal_code",
      Self::AddressCountryCode => "address_country_code",
      Self::Documents(kind) => kind.api_name(),
    }
  }
}

/// A new value for one field.
#[derive(Debug, Clone, PartialEq)]
pub enum Change {
  Email(String),
  PhoneNumber(String),
  Ip(String),
  Name(String),
  Aka(String),
  EntityType(String),
  EntityScope(String),
  BirthDay(u32),
  BirthMonth(u32),
  BirthYear(i32),
  AddressStreet(String),
  AddressCity(String),
  AddressSubdivision(String),
  AddressPostalCode(String),
  AddressCountryCode(String),
  /// Documents to add to the physical collection.
  PhysicalDocuments(Vec<PhysicalDocument>),
  /// Documents to add to the social collection.
  SocialDocuments(Vec<SocialDocument>),
  /// Documents to add to the virtual collection.
  VirtualDocuments(Vec<VirtualDocument>),
}

impl Change {
  pub fn field(&self) -> Field {
    match self {
      Self::Email(_) => Field::Email,
      Self::PhoneNumber(_) => Field::PhoneNumber,
      Self::Ip(_) => Field::Ip,
      Self::Name(_) => Field::Name,
      Self::Aka(_) => Field::Aka,
      Self::EntityType(_) => Field::EntityType,
      Self::EntityScope(_) => Field::EntityScope,
      Self::BirthDay(_) => Field::BirthDay,
      Self::BirthMonth(_) => Field::BirthMonth,
      Self::BirthYear(_) => Field::BirthYear,
      Self::AddressStreet(_) => Field::AddressStreet,
      Self::AddressCity(_) => Field::AddressCity,
      Self::AddressSubdivision(_) => Field::AddressSubdivision,
      Self::AddressPostalCode(_) => Field::AddressPostalCode,
      Self::AddressCountryCode(_) => Field::AddressCountryCode,
      Self::PhysicalDocuments(_) => Field::Documents(DocumentKind::Physical),
      Self::SocialDocuments(_) => Field::Documents(DocumentKind::Social),
      Self::VirtualDocuments(_) => Field::Documents(DocumentKind::Virtual),
    }
  }

  /// The request payload value for this change. Document changes serialize
  /// only the newly supplied documents.
  pub fn payload_value(&self) -> Value {
    match self {
      Self::Email(v)
      | Self::PhoneNumber(v)
      | Self::Ip(v)
      | Self::Name(v)
      | Self::Aka(v)
      | Self::EntityType(v)
      | Self::EntityScope(v)
      | Self::AddressStreet(v)
      | Self::AddressCity(v)
      | Self::AddressSubdivision(v)
      | Self::AddressPostalCode(v)
      | Self::AddressCountryCode(v) => Value::from(v.as_str()),
      Self::BirthDay(v) | Self::BirthMonth(v) => Value::from(*v),
      Self::BirthYear(v) => Value::from(*v),
      Self::PhysicalDocuments(docs) => payloads(docs),
      Self::SocialDocuments(docs) => payloads(docs),
      Self::VirtualDocuments(docs) => payloads(docs),
    }
  }
}

/// Fold repeated changes to one field into a single change.
///
/// Document changes to the same collection are concatenated in order; for any
/// other field the last value wins. The result keeps the position of each
/// field's first occurrence.
pub fn coalesce(changes: Vec<Change>) -> Vec<Change> {
  let mut merged: Vec<Change> = Vec::with_capacity(changes.len());
  for change in changes {
    let field = change.field();
    let Some(existing) = merged.iter_mut().find(|c| c.field() == field) else {
      merged.push(change);
      continue;
    };
    match (existing, change) {
      (Change::PhysicalDocuments(into), Change::PhysicalDocuments(more)) => {
        into.extend(more)
      }
      (Change::SocialDocuments(into), Change::SocialDocuments(more)) => {
        into.extend(more)
      }
      (Change::VirtualDocuments(into), Change::VirtualDocuments(more)) => {
        into.extend(more)
      }
      (existing, change) => *existing = change,
    }
  }
  merged
}

pub(crate) fn payloads<D: Document>(docs: &[D]) -> Value {
  Value::Array(docs.iter().map(Document::to_payload).collect())
}
