//! Input to [`BaseDocument::create`] and its validation.
//!
//! [`BaseDocument::create`]: crate::base_document::BaseDocument::create

use chrono::{Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
  Error, Result,
  settings::Settings,
  sub_document::{
    Document, DocumentKind, PhysicalDocument, SocialDocument, SubDocument,
    VirtualDocument, collect_kind,
  },
};

/// A base document that has not been validated or submitted yet.
///
/// Every field is optional here so that drafts can be assembled from untyped
/// caller data; [`NewBaseDocument::validate`] enforces what is required.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NewBaseDocument {
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
  pub physical_documents:   Vec<SubDocument>,
  pub social_documents:     Vec<SubDocument>,
  pub virtual_documents:    Vec<SubDocument>,
}

/// A draft that passed validation, with every collection narrowed to its
/// kind.
#[derive(Debug, Clone)]
pub(crate) struct ValidDraft {
  pub email:                String,
  pub phone_number:         String,
  pub ip:                   String,
  pub name:                 String,
  pub aka:                  String,
  pub entity_type:          String,
  pub entity_scope:         String,
  pub birth_day:            u32,
  pub birth_month:          u32,
  pub birth_year:           i32,
  pub address_street:       String,
  pub address_city:         String,
  pub address_subdivision:  String,
  pub address_postal_code:  String,
  pub address_country_code: String,
  pub physical_documents:   Vec<PhysicalDocument>,
  pub social_documents:     Vec<SocialDocument>,
  pub virtual_documents:    Vec<VirtualDocument>,
}

impl NewBaseDocument {
  /// Build a draft from untyped data such as a parsed JSON request.
  ///
  /// A field of the wrong JSON type (a number where a string is expected, an
  /// object where a list is expected) is a [`Error::Validation`].
  pub fn from_value(value: Value) -> Result<Self> {
    serde_json::from_value(value).map_err(|e| Error::validation(e.to_string()))
  }

  pub(crate) fn validate(self, settings: &Settings) -> Result<ValidDraft> {
    let birth_day = required_number("birth_day", self.birth_day)?;
    let birth_month = required_number("birth_month", self.birth_month)?;
    let birth_year = required_number("birth_year", self.birth_year)?;
    check_birth_date(birth_year, birth_month, birth_day, settings)?;

    Ok(ValidDraft {
      email: required("email", self.email)?,
      phone_number: required("phone_number", self.phone_number)?,
      ip: required("ip", self.ip)?,
      name: required("name", self.name)?,
      aka: required("aka", self.aka)?,
      entity_type: required("entity_type", self.entity_type)?,
      entity_scope: required("entity_scope", self.entity_scope)?,
      birth_day,
      birth_month,
      birth_year,
      address_street: required("address_street", self.address_street)?,
      address_city: required("address_city", self.address_city)?,
      address_subdivision: required("address_subdivision", self.address_subdivision)?,
      address_postal_code: required("address_postal_code", self.address_postal_code)?,
      address_country_code: required(
        "address_country_code",
        self.address_country_code,
      )?,
      physical_documents: narrow(DocumentKind::Physical, self.physical_documents)?,
      social_documents: narrow(DocumentKind::Social, self.social_documents)?,
      virtual_documents: narrow(DocumentKind::Virtual, self.virtual_documents)?,
    })
  }
}

fn required(field: &str, value: Option<String>) -> Result<String> {
  match value {
    Some(v) if !v.trim().is_empty() => Ok(v),
    Some(_) => Err(Error::validation(format!("{field} must not be blank"))),
    None => Err(Error::validation(format!("{field} is required"))),
  }
}

fn required_number<T>(field: &str, value: Option<T>) -> Result<T> {
  value.ok_or_else(|| Error::validation(format!("{field} is required")))
}

fn check_birth_date(year: i32, month: u32, day: u32, settings: &Settings) -> Result<()> {
  let current_year = Utc::now().year();
  if year < settings.min_birth_year || year > current_year {
    return Err(Error::validation(format!(
      "birth_year {year} is outside {}..={current_year}",
      settings.min_birth_year
    )));
  }
  NaiveDate::from_ymd_opt(year, month, day)
    .map(|_| ())
    .ok_or_else(|| {
      Error::validation(format!("{year}-{month:02}-{day:02} is not a calendar date"))
    })
}

fn narrow<D>(kind: DocumentKind, docs: Vec<SubDocument>) -> Result<Vec<D>>
where
  D: Document + TryFrom<SubDocument, Error = SubDocument>,
{
  collect_kind(docs).map_err(|(index, found)| {
    Error::validation(format!(
      "{} entry {index} is a {found} document, expected {kind}",
      kind.api_name()
    ))
  })
}
