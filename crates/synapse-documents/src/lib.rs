//! CIP base documents for the Synapse payments API.
//!
//! A [`BaseDocument`] aggregates a user's identity details with three
//! collections of verification documents (physical, social and virtual). It
//! builds request payloads, sends them through a caller-supplied [`User`] and
//! [`UsersApi`], and reconciles the server's response back onto itself.
//!
//! This crate does no networking of its own: transport and session handling
//! are provided by implementing the traits in [`user`].
//!
//! # Example
//!
//! ```rust,ignore
//! let draft = NewBaseDocument {
//!   email: Some("alice@example.com".into()),
//!   // ...
//!   virtual_documents: vec![VirtualDocument::new("SSN", "2222").into()],
//!   ..Default::default()
//! };
//! let mut doc = BaseDocument::create(&user, draft).await?;
//! doc
//!   .add_social_documents(&user, vec![SocialDocument::new("EMAIL", "a@b.c").into()])
//!   .await?;
//! ```

pub mod base_document;
pub mod change;
pub mod draft;
pub mod error;
pub mod settings;
pub mod sub_document;
pub mod user;
pub mod wire;

pub use base_document::BaseDocument;
pub use change::{Change, Field};
pub use draft::NewBaseDocument;
pub use error::{ApiError, AuthError, Error, Result};
pub use settings::Settings;
pub use sub_document::{
  Document, DocumentKey, DocumentKind, PhysicalDocument, SocialDocument,
  SubDocument, SubDocumentRef, VirtualDocument,
};
pub use user::{User, UsersApi};
pub use wire::{DocumentRecord, DocumentsPayload, DocumentsResponse, SubDocumentRecord};
