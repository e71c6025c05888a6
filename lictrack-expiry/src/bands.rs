//! Status tiers and the band policies that produce them.

use crate::error::{ExpiryError, ExpiryResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Days before expiration at which the single-threshold policy warns.
pub const DEFAULT_WARNING_DAYS: i64 = 30;

/// Expiration urgency of a licence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    /// Expiration date has passed.
    Expired,
    /// Three-band: expires within the danger window.
    Danger,
    /// Three-band: expires within the warn window.
    Warn,
    /// Three-band: expires within the outer window.
    Safe,
    /// Single-threshold: expires within the warning window.
    Warning,
    /// Expires beyond every window.
    Active,
    /// No usable expiration date.
    Unknown,
}

impl Tier {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Expired => "expired",
            Self::Danger => "danger",
            Self::Warn => "warn",
            Self::Safe => "safe",
            Self::Warning => "warning",
            Self::Active => "active",
            Self::Unknown => "unknown",
        }
    }

    /// Sort rank for alert lists; lower is more urgent.
    #[must_use]
    pub fn priority(&self) -> u8 {
        match self {
            Self::Expired => 0,
            Self::Danger | Self::Warning => 1,
            Self::Warn => 2,
            Self::Safe => 3,
            Self::Active => 4,
            Self::Unknown => 5,
        }
    }

    /// Returns true if licences in this tier belong in an alert list.
    #[must_use]
    pub fn is_alert(&self) -> bool {
        !matches!(self, Self::Active | Self::Unknown)
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Policy mapping "days until expiration" onto a non-expired tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "policy")]
pub enum BandConfig {
    /// `warning` within `warning_days`, `active` beyond.
    SingleThreshold { warning_days: i64 },
    /// `danger`, `warn` and `safe` windows, `active` beyond `safe`.
    ThreeBand { danger: i64, warn: i64, safe: i64 },
}

impl Default for BandConfig {
    fn default() -> Self {
        Self::SingleThreshold {
            warning_days: DEFAULT_WARNING_DAYS,
        }
    }
}

impl BandConfig {
    /// The 7 / 15 / 30 three-band policy.
    #[must_use]
    pub const fn three_band_default() -> Self {
        Self::ThreeBand {
            danger: 7,
            warn: 15,
            safe: 30,
        }
    }

    /// Single-threshold policy with a custom window.
    pub fn single(warning_days: i64) -> ExpiryResult<Self> {
        let config = Self::SingleThreshold { warning_days };
        config.validate()?;
        Ok(config)
    }

    /// Three-band policy with custom windows.
    pub fn three_band(danger: i64, warn: i64, safe: i64) -> ExpiryResult<Self> {
        let config = Self::ThreeBand { danger, warn, safe };
        config.validate()?;
        Ok(config)
    }

    /// Checks that thresholds are non-negative and ordered.
    pub fn validate(&self) -> ExpiryResult<()> {
        match *self {
            Self::SingleThreshold { warning_days } if warning_days < 0 => Err(
                ExpiryError::InvalidThresholds(format!("warning_days {warning_days} is negative")),
            ),
            Self::ThreeBand { danger, warn, safe } if danger < 0 || danger > warn || warn > safe => {
                Err(ExpiryError::InvalidThresholds(format!(
                    "expected 0 <= danger <= warn <= safe, got {danger}/{warn}/{safe}"
                )))
            }
            _ => Ok(()),
        }
    }

    /// Tier for a licence expiring in `days` (must be `>= 0`).
    #[must_use]
    pub fn tier_for(&self, days: i64) -> Tier {
        match *self {
            Self::SingleThreshold { warning_days } => {
                if days <= warning_days {
                    Tier::Warning
                } else {
                    Tier::Active
                }
            }
            Self::ThreeBand { danger, warn, safe } => {
                if days <= danger {
                    Tier::Danger
                } else if days <= warn {
                    Tier::Warn
                } else if days <= safe {
                    Tier::Safe
                } else {
                    Tier::Active
                }
            }
        }
    }
}

impl FromStr for BandConfig {
    type Err = ExpiryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "single" | "single-threshold" | "single_threshold" => Ok(Self::default()),
            "three-band" | "three_band" | "threeband" => Ok(Self::three_band_default()),
            other => Err(ExpiryError::UnknownPolicy(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_threshold_boundary_is_inclusive() {
        let bands = BandConfig::default();
        assert_eq!(bands.tier_for(0), Tier::Warning);
        assert_eq!(bands.tier_for(30), Tier::Warning);
        assert_eq!(bands.tier_for(31), Tier::Active);
    }

    #[test]
    fn three_band_edges() {
        let bands = BandConfig::three_band_default();
        assert_eq!(bands.tier_for(7), Tier::Danger);
        assert_eq!(bands.tier_for(8), Tier::Warn);
        assert_eq!(bands.tier_for(15), Tier::Warn);
        assert_eq!(bands.tier_for(16), Tier::Safe);
        assert_eq!(bands.tier_for(30), Tier::Safe);
        assert_eq!(bands.tier_for(31), Tier::Active);
    }

    #[test]
    fn unordered_thresholds_rejected() {
        assert!(BandConfig::three_band(10, 5, 30).is_err());
        assert!(BandConfig::single(-1).is_err());
        assert!(BandConfig::three_band(3, 3, 3).is_ok());
    }
}
