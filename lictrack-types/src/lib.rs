//! Core type definitions for the licence tracker.
//!
//! This crate defines the plain, storage-agnostic types shared by every
//! other crate in the workspace:
//! - Opaque record identifiers
//! - The `Licence` record with its draft and patch forms
//! - The `User` record, roles and password hashing
//! - Field-level validation errors
//! - An injectable `Clock`
//!
//! Nothing here performs I/O. Expiration classification lives in
//! `lictrack-expiry`, data access in `lictrack-store`.

mod clock;
mod ids;
mod licence;
mod user;
mod validation;

pub use clock::{midnight_utc, Clock, FixedClock, SystemClock};
pub use ids::RecordId;
pub use licence::{Licence, LicenceDraft, LicencePatch, LicenceType};
pub use user::{hash_password, Role, User, UserDraft, UserPatch};
pub use validation::{FieldError, FieldErrors};

/// Errors raised when parsing enumerated fields.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid licence type: {0}")]
    InvalidLicenceType(String),

    #[error("invalid role: {0}")]
    InvalidRole(String),
}
