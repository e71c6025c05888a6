//! The record abstraction the store is generic over.

use chrono::{DateTime, Utc};
use lictrack_types::{
    FieldError, FieldErrors, Licence, LicenceDraft, LicencePatch, RecordId, User, UserDraft,
    UserPatch,
};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt::Debug;

/// A storable entity with a caller-facing draft and patch form.
pub trait Record: Clone + Debug + Send + Sync + Serialize + DeserializeOwned + 'static {
    /// Fields supplied by the caller on creation.
    type Draft: Clone + Debug + Send + Sync + 'static;
    /// Partial update supplied by the caller.
    type Patch: Clone + Debug + Send + Sync + 'static;

    /// Entity name used in log lines.
    const KIND: &'static str;

    fn id(&self) -> &RecordId;

    /// Validates a draft before any I/O.
    fn validate_draft(draft: &Self::Draft) -> Result<(), FieldErrors>;

    /// Builds the stored record from a validated draft.
    fn from_draft(id: RecordId, draft: &Self::Draft, now: DateTime<Utc>) -> Self;

    /// Merges a patch, validates the result and stamps `updated_at`.
    fn patched(&self, patch: &Self::Patch, now: DateTime<Utc>) -> Result<Self, FieldErrors>;

    /// Reports a uniqueness clash between a new draft and a stored record.
    fn draft_conflict(_draft: &Self::Draft, _existing: &Self) -> Option<FieldError> {
        None
    }

    /// Drafts created when a store initializes and finds no records.
    fn seed_drafts() -> Vec<Self::Draft> {
        Vec::new()
    }

    /// True when `other` stands for the same entity under another id, as
    /// two default accounts with one login do.
    fn same_entity(&self, _other: &Self) -> bool {
        false
    }

    /// This record's fields under `target`'s id and creation time.
    fn rekeyed(&self, target: &Self) -> Self;
}

impl Record for Licence {
    type Draft = LicenceDraft;
    type Patch = LicencePatch;

    const KIND: &'static str = "licence";

    fn id(&self) -> &RecordId {
        &self.id
    }

    fn validate_draft(draft: &LicenceDraft) -> Result<(), FieldErrors> {
        draft.validate()
    }

    fn from_draft(id: RecordId, draft: &LicenceDraft, now: DateTime<Utc>) -> Self {
        Licence::from_draft(id, draft, now)
    }

    fn patched(&self, patch: &LicencePatch, now: DateTime<Utc>) -> Result<Self, FieldErrors> {
        Licence::patched(self, patch, now)
    }

    fn rekeyed(&self, target: &Licence) -> Self {
        Licence {
            id: target.id.clone(),
            created_at: target.created_at,
            ..self.clone()
        }
    }
}

impl Record for User {
    type Draft = UserDraft;
    type Patch = UserPatch;

    const KIND: &'static str = "user";

    fn id(&self) -> &RecordId {
        &self.id
    }

    fn validate_draft(draft: &UserDraft) -> Result<(), FieldErrors> {
        draft.validate()
    }

    fn from_draft(id: RecordId, draft: &UserDraft, now: DateTime<Utc>) -> Self {
        User::from_draft(id, draft, now)
    }

    fn patched(&self, patch: &UserPatch, now: DateTime<Utc>) -> Result<Self, FieldErrors> {
        User::patched(self, patch, now)
    }

    fn draft_conflict(draft: &UserDraft, existing: &User) -> Option<FieldError> {
        (draft.login.trim() == existing.login)
            .then(|| FieldError::new("login", format!("login '{}' is already taken", existing.login)))
    }

    fn seed_drafts() -> Vec<UserDraft> {
        vec![UserDraft::default_admin()]
    }

    fn same_entity(&self, other: &User) -> bool {
        self.login == other.login
    }

    fn rekeyed(&self, target: &User) -> Self {
        User {
            id: target.id.clone(),
            created_at: target.created_at,
            ..self.clone()
        }
    }
}
