//! The licence record and its draft/patch forms.
//!
//! A [`LicenceDraft`] is what callers hand to a store: no id, no
//! timestamps. The store turns it into a [`Licence`] once it has assigned
//! both. Updates are expressed as a [`LicencePatch`] and validated against
//! the merged result.

use crate::validation::{into_result, sanitize, FieldError, FieldErrors};
use crate::{Error, RecordId};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

const SOFTWARE_NAME_MAX: usize = 100;
const VENDOR_MAX: usize = 50;
const VERSION_MAX: usize = 20;
const ASSIGNEE_MAX: usize = 100;

/// How a licence is sold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LicenceType {
    /// One-time purchase.
    #[default]
    Perpetual,
    /// Recurring subscription.
    Subscription,
    /// Licensed per named user.
    PerUser,
    /// Floating pool of concurrent seats.
    Concurrent,
}

impl LicenceType {
    /// All variants, in declaration order.
    pub const ALL: [LicenceType; 4] = [
        Self::Perpetual,
        Self::Subscription,
        Self::PerUser,
        Self::Concurrent,
    ];

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Perpetual => "perpetual",
            Self::Subscription => "subscription",
            Self::PerUser => "per-user",
            Self::Concurrent => "concurrent",
        }
    }
}

impl fmt::Display for LicenceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LicenceType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "perpetual" | "perpetuelle" => Ok(Self::Perpetual),
            "subscription" | "abonnement" => Ok(Self::Subscription),
            "per-user" | "per_user" | "peruser" => Ok(Self::PerUser),
            "concurrent" => Ok(Self::Concurrent),
            other => Err(Error::InvalidLicenceType(other.to_string())),
        }
    }
}

/// A stored software licence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Licence {
    pub id: RecordId,
    pub software_name: String,
    pub vendor: String,
    pub version: String,
    #[serde(rename = "type", default)]
    pub licence_type: LicenceType,
    pub seats: u32,
    pub purchase_date: Option<NaiveDate>,
    pub expiration_date: Option<NaiveDate>,
    pub initial_cost: f64,
    pub assigned_to: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Licence {
    /// Builds a licence from a draft that has already passed validation.
    ///
    /// The draft is normalized (trimmed, truncated) on the way in.
    #[must_use]
    pub fn from_draft(id: RecordId, draft: &LicenceDraft, now: DateTime<Utc>) -> Self {
        let draft = draft.normalized();
        Self {
            id,
            software_name: draft.software_name,
            vendor: draft.vendor,
            version: draft.version,
            licence_type: draft.licence_type,
            seats: draft.seats,
            purchase_date: draft.purchase_date,
            expiration_date: draft.expiration_date,
            initial_cost: draft.initial_cost,
            assigned_to: draft.assigned_to,
            created_at: now,
            updated_at: now,
        }
    }

    /// Returns the caller-owned fields of this licence.
    #[must_use]
    pub fn to_draft(&self) -> LicenceDraft {
        LicenceDraft {
            software_name: self.software_name.clone(),
            vendor: self.vendor.clone(),
            version: self.version.clone(),
            licence_type: self.licence_type,
            seats: self.seats,
            purchase_date: self.purchase_date,
            expiration_date: self.expiration_date,
            initial_cost: self.initial_cost,
            assigned_to: self.assigned_to.clone(),
        }
    }

    /// Applies `patch`, validates the merged record and stamps `updated_at`.
    ///
    /// `id` and `created_at` are carried over unchanged.
    pub fn patched(&self, patch: &LicencePatch, now: DateTime<Utc>) -> Result<Self, FieldErrors> {
        let mut draft = self.to_draft();
        patch.apply_to(&mut draft);
        draft.validate()?;

        let mut merged = Self::from_draft(self.id.clone(), &draft, self.created_at);
        merged.updated_at = now;
        Ok(merged)
    }

    /// Returns true if every caller-owned field matches `draft` after
    /// normalization.
    #[must_use]
    pub fn matches_draft(&self, draft: &LicenceDraft) -> bool {
        self.to_draft() == draft.normalized()
    }
}

/// The caller-supplied fields of a new licence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LicenceDraft {
    pub software_name: String,
    pub vendor: String,
    pub version: String,
    #[serde(rename = "type")]
    pub licence_type: LicenceType,
    pub seats: u32,
    pub purchase_date: Option<NaiveDate>,
    pub expiration_date: Option<NaiveDate>,
    pub initial_cost: f64,
    pub assigned_to: Option<String>,
}

impl Default for LicenceDraft {
    fn default() -> Self {
        Self {
            software_name: String::new(),
            vendor: String::new(),
            version: String::new(),
            licence_type: LicenceType::default(),
            seats: 1,
            purchase_date: None,
            expiration_date: None,
            initial_cost: 0.0,
            assigned_to: None,
        }
    }
}

impl LicenceDraft {
    /// Creates a draft with the three required fields and defaults elsewhere.
    pub fn new(
        software_name: impl Into<String>,
        vendor: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            software_name: software_name.into(),
            vendor: vendor.into(),
            version: version.into(),
            ..Default::default()
        }
    }

    /// Checks every field and reports all violations at once.
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = Vec::new();

        if self.software_name.trim().is_empty() {
            errors.push(FieldError::new("software_name", "software name is required"));
        }
        if self.vendor.trim().is_empty() {
            errors.push(FieldError::new("vendor", "vendor is required"));
        }
        if self.version.trim().is_empty() {
            errors.push(FieldError::new("version", "version is required"));
        }
        if self.seats == 0 {
            errors.push(FieldError::new("seats", "seats must be a positive integer"));
        }
        if !self.initial_cost.is_finite() || self.initial_cost < 0.0 {
            errors.push(FieldError::new(
                "initial_cost",
                "initial cost must be a non-negative amount",
            ));
        }
        if let (Some(purchase), Some(expiration)) = (self.purchase_date, self.expiration_date) {
            if expiration <= purchase {
                errors.push(FieldError::new(
                    "expiration_date",
                    "expiration date must be after the purchase date",
                ));
            }
        }

        into_result(errors)
    }

    /// Returns a trimmed and truncated copy. Blank assignees become `None`.
    #[must_use]
    pub fn normalized(&self) -> Self {
        Self {
            software_name: sanitize(&self.software_name, SOFTWARE_NAME_MAX),
            vendor: sanitize(&self.vendor, VENDOR_MAX),
            version: sanitize(&self.version, VERSION_MAX),
            assigned_to: self
                .assigned_to
                .as_deref()
                .map(|a| sanitize(a, ASSIGNEE_MAX))
                .filter(|a| !a.is_empty()),
            ..self.clone()
        }
    }
}

/// A partial update to a licence.
///
/// `None` leaves a field untouched. For optional fields, `Some(None)`
/// clears the stored value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LicencePatch {
    pub software_name: Option<String>,
    pub vendor: Option<String>,
    pub version: Option<String>,
    pub licence_type: Option<LicenceType>,
    pub seats: Option<u32>,
    pub purchase_date: Option<Option<NaiveDate>>,
    pub expiration_date: Option<Option<NaiveDate>>,
    pub initial_cost: Option<f64>,
    pub assigned_to: Option<Option<String>>,
}

impl LicencePatch {
    /// Returns true if the patch changes nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    fn apply_to(&self, draft: &mut LicenceDraft) {
        if let Some(v) = &self.software_name {
            draft.software_name = v.clone();
        }
        if let Some(v) = &self.vendor {
            draft.vendor = v.clone();
        }
        if let Some(v) = &self.version {
            draft.version = v.clone();
        }
        if let Some(v) = self.licence_type {
            draft.licence_type = v;
        }
        if let Some(v) = self.seats {
            draft.seats = v;
        }
        if let Some(v) = self.purchase_date {
            draft.purchase_date = v;
        }
        if let Some(v) = self.expiration_date {
            draft.expiration_date = v;
        }
        if let Some(v) = self.initial_cost {
            draft.initial_cost = v;
        }
        if let Some(v) = &self.assigned_to {
            draft.assigned_to = v.clone();
        }
    }
}
