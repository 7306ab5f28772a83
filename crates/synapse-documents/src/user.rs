//! The `User` and `UsersApi` traits.
//!
//! Transport and session handling live outside this crate. Callers implement
//! these traits over their HTTP client; [`BaseDocument`] only sequences the
//! calls and reconciles the results.
//!
//! [`BaseDocument`]: crate::base_document::BaseDocument

use std::future::Future;

use crate::{
  error::{ApiError, AuthError},
  settings::Settings,
  wire::{DocumentsPayload, DocumentsResponse},
};

/// The platform's `users` resource.
pub trait UsersApi: Send + Sync {
  /// `PATCH /users/{user_id}` with a documents payload.
  ///
  /// A non-success response is returned as an [`ApiError`] and is propagated
  /// to the caller untouched.
  fn update<'a>(
    &'a self,
    user_id: &'a str,
    payload: &'a DocumentsPayload,
  ) -> impl Future<Output = Result<DocumentsResponse, ApiError>> + Send + 'a;
}

/// An authenticated platform user that owns base documents.
pub trait User: Send + Sync {
  type Users: UsersApi;

  /// Server id of the user.
  fn id(&self) -> &str;

  /// Settings of the client this user was obtained from.
  fn settings(&self) -> &Settings;

  /// Handle to the users resource of the client.
  fn users(&self) -> &Self::Users;

  /// Make sure the session is valid, refreshing it if needed. May perform a
  /// network round trip.
  fn authenticate(&self) -> impl Future<Output = Result<(), AuthError>> + Send + '_;
}
