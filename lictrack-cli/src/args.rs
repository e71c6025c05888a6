//! Command-line arguments.

use anyhow::Result;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use lictrack_expiry::{BandConfig, LicenceFilter};
use lictrack_store::{StoreConfig, DEFAULT_REMOTE_TIMEOUT_MS};
use lictrack_types::{LicenceDraft, LicencePatch, LicenceType, Role};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "lictrack")]
#[command(about = "Software licence inventory tracker")]
pub struct Args {
    /// SQLite database holding the shared inventory
    #[arg(long, default_value = "lictrack.db")]
    pub db: PathBuf,

    /// Directory for the offline cache; without it offline changes last
    /// only for one command
    #[arg(long)]
    pub cache_dir: Option<PathBuf>,

    /// Upper bound on a single database call, in milliseconds
    #[arg(long, default_value_t = DEFAULT_REMOTE_TIMEOUT_MS)]
    pub timeout_ms: u64,

    /// Expiration banding: `single` or `three-band`
    #[arg(long, default_value = "single")]
    pub bands: BandConfig,

    /// Warning window for single-threshold banding
    #[arg(long)]
    pub warning_days: Option<i64>,

    /// Account to act as; required by commands that change data
    #[arg(long = "as", value_name = "LOGIN", requires = "as_password")]
    pub acting_as: Option<String>,

    /// Password of the `--as` account
    #[arg(long, value_name = "PASSWORD", requires = "acting_as")]
    pub as_password: Option<String>,

    /// Enable verbose debug logging
    #[arg(short, long)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Login and password of the account running a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub login: String,
    pub password: String,
}

impl Args {
    #[must_use]
    pub fn credentials(&self) -> Option<Credentials> {
        Some(Credentials {
            login: self.acting_as.clone()?,
            password: self.as_password.clone()?,
        })
    }

    pub fn store_config(&self) -> StoreConfig {
        StoreConfig {
            remote_timeout_ms: self.timeout_ms,
            ..StoreConfig::default()
        }
    }

    /// The effective band policy. `--warning-days` only applies to
    /// single-threshold banding.
    pub fn band_config(&self) -> Result<BandConfig> {
        match (self.bands, self.warning_days) {
            (BandConfig::SingleThreshold { .. }, Some(days)) => Ok(BandConfig::single(days)?),
            (BandConfig::ThreeBand { .. }, Some(_)) => {
                anyhow::bail!("--warning-days cannot be combined with three-band banding")
            }
            (bands, None) => Ok(bands),
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List every licence with its expiration status
    List {
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Add a licence
    Add(AddArgs),
    /// Change fields of a licence
    Update(UpdateArgs),
    /// Delete a licence
    Remove { id: String },
    /// Show expired and expiring licences, most urgent first
    Alerts,
    /// Inventory totals by type, vendor and expiration state
    Stats {
        #[arg(long)]
        json: bool,
    },
    /// Find licences matching all given criteria
    Search(SearchArgs),
    /// Show whether the database is reachable
    Status,
    /// Push offline changes to the database
    Sync,
    /// List user accounts
    Users,
    /// Create a user account
    AddUser {
        login: String,
        #[arg(long)]
        password: String,
        #[arg(long, default_value = "read")]
        role: Role,
    },
    /// Check a login and password
    Login {
        login: String,
        #[arg(long)]
        password: String,
    },
    /// Change a user's password
    Passwd {
        login: String,
        /// Current password
        #[arg(long)]
        password: String,
        #[arg(long)]
        new_password: String,
    },
}

#[derive(clap::Args, Debug)]
pub struct AddArgs {
    #[arg(long)]
    pub name: String,
    #[arg(long)]
    pub vendor: String,
    #[arg(long)]
    pub version: String,
    #[arg(long = "type", default_value = "perpetual")]
    pub licence_type: LicenceType,
    #[arg(long, default_value_t = 1)]
    pub seats: u32,
    /// Purchase date (YYYY-MM-DD)
    #[arg(long)]
    pub purchased: Option<NaiveDate>,
    /// Expiration date (YYYY-MM-DD)
    #[arg(long)]
    pub expires: Option<NaiveDate>,
    #[arg(long, default_value_t = 0.0)]
    pub cost: f64,
    #[arg(long)]
    pub assigned_to: Option<String>,
}

impl AddArgs {
    pub fn to_draft(&self) -> LicenceDraft {
        LicenceDraft {
            licence_type: self.licence_type,
            seats: self.seats,
            purchase_date: self.purchased,
            expiration_date: self.expires,
            initial_cost: self.cost,
            assigned_to: self.assigned_to.clone(),
            ..LicenceDraft::new(&self.name, &self.vendor, &self.version)
        }
    }
}

#[derive(clap::Args, Debug)]
pub struct UpdateArgs {
    pub id: String,
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub vendor: Option<String>,
    #[arg(long)]
    pub version: Option<String>,
    #[arg(long = "type")]
    pub licence_type: Option<LicenceType>,
    #[arg(long)]
    pub seats: Option<u32>,
    #[arg(long)]
    pub purchased: Option<NaiveDate>,
    #[arg(long, conflicts_with = "no_expiration")]
    pub expires: Option<NaiveDate>,
    /// Remove the expiration date
    #[arg(long)]
    pub no_expiration: bool,
    #[arg(long)]
    pub cost: Option<f64>,
    #[arg(long, conflicts_with = "unassign")]
    pub assigned_to: Option<String>,
    /// Clear the assignee
    #[arg(long)]
    pub unassign: bool,
}

impl UpdateArgs {
    pub fn to_patch(&self) -> LicencePatch {
        LicencePatch {
            software_name: self.name.clone(),
            vendor: self.vendor.clone(),
            version: self.version.clone(),
            licence_type: self.licence_type,
            seats: self.seats,
            purchase_date: self.purchased.map(Some),
            expiration_date: if self.no_expiration {
                Some(None)
            } else {
                self.expires.map(Some)
            },
            initial_cost: self.cost,
            assigned_to: if self.unassign {
                Some(None)
            } else {
                self.assigned_to.clone().map(Some)
            },
        }
    }
}

#[derive(clap::Args, Debug)]
pub struct SearchArgs {
    /// Text to look for in name, vendor, version or assignee
    pub term: Option<String>,
    #[arg(long = "type")]
    pub licence_type: Option<LicenceType>,
    #[arg(long)]
    pub vendor: Option<String>,
    #[arg(long)]
    pub expiring_soon: bool,
    #[arg(long)]
    pub expired: bool,
}

impl SearchArgs {
    pub fn to_filter(&self) -> LicenceFilter {
        LicenceFilter {
            term: self.term.clone(),
            licence_type: self.licence_type,
            vendor: self.vendor.clone(),
            expiring_soon: self.expiring_soon,
            expired: self.expired,
        }
    }
}
