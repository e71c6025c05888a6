//! Store wiring and command execution.

use crate::args::{Args, Command, Credentials};
use crate::render;
use crate::unreachable::Unreachable;
use anyhow::{bail, Context, Result};
use lictrack_db::SqliteRemote;
use lictrack_expiry::{build_alert_list, BandConfig, InventoryStats};
use lictrack_store::{
    JsonFileCache, LicenceStore, OpResult, RemoteSource, StoreConfig, UserStore,
};
use lictrack_types::{Clock, Licence, RecordId, Role, User, UserDraft};
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

/// The licence and user stores plus the banding policy for one run.
pub struct App {
    pub licences: LicenceStore,
    pub users: UserStore,
    pub bands: BandConfig,
    credentials: Option<Credentials>,
}

impl App {
    /// Opens the database named by `args`. A database that cannot be
    /// opened leaves both stores offline.
    pub async fn open(args: &Args, clock: impl Clock + Clone + 'static) -> Result<Self> {
        let bands = args.band_config()?;
        let config = args.store_config();
        let cache_dir = args.cache_dir.as_deref();

        let app = match SqliteRemote::open(&args.db) {
            Ok(remote) => Self::connect(Arc::new(remote), config, cache_dir, bands, clock).await,
            Err(e) => {
                warn!("cannot open {}: {}", args.db.display(), e);
                let remote = Arc::new(Unreachable::new(e.to_string()));
                Self::connect(remote, config, cache_dir, bands, clock).await
            }
        };
        Ok(app.acting_as(args.credentials()))
    }

    /// Initializes both stores over one remote.
    pub async fn connect<S>(
        remote: Arc<S>,
        config: StoreConfig,
        cache_dir: Option<&Path>,
        bands: BandConfig,
        clock: impl Clock + Clone + 'static,
    ) -> Self
    where
        S: RemoteSource<Licence> + RemoteSource<User> + 'static,
    {
        let mut licences = LicenceStore::builder(remote.clone())
            .config(config.clone())
            .clock(clock.clone());
        let mut users = UserStore::builder(remote).config(config).clock(clock);
        if let Some(dir) = cache_dir {
            licences = licences.persistence(JsonFileCache::new(dir.join("licences.json")));
            users = users.persistence(JsonFileCache::new(dir.join("users.json")));
        }

        let (licences, report) = licences.init().await;
        info!("licences: online={} records={}", report.online, report.record_count);
        let (users, report) = users.init().await;
        if report.seeded > 0 {
            info!("created default admin account");
        }
        Self {
            licences,
            users,
            bands,
            credentials: None,
        }
    }

    /// Sets the account that commands changing data are checked against.
    #[must_use]
    pub fn acting_as(mut self, credentials: Option<Credentials>) -> Self {
        self.credentials = credentials;
        self
    }

    /// True if either store fell back to its local cache.
    #[must_use]
    pub fn is_offline(&self) -> bool {
        !self.licences.mode().is_online() || !self.users.mode().is_online()
    }

    /// Runs one command and returns its output.
    pub async fn execute(&self, command: Command) -> Result<String> {
        let now = self.licences.clock().now();
        match command {
            Command::List { json } => {
                let licences = self.all_licences().await?;
                if json {
                    Ok(serde_json::to_string_pretty(&licences)? + "\n")
                } else {
                    Ok(render::licence_table(&licences, now, &self.bands))
                }
            }
            Command::Add(add) => {
                self.authorize(Role::can_write, "change licences").await?;
                let licence = require(self.licences.create(add.to_draft()).await, "add licence")?;
                Ok(format!("added {} ({})\n", licence.software_name, licence.id))
            }
            Command::Update(update) => {
                self.authorize(Role::can_write, "change licences").await?;
                let id = RecordId::new(update.id.as_str());
                let licence = require(self.licences.update(&id, update.to_patch()).await, "update licence")?;
                Ok(format!("updated {} ({})\n", licence.software_name, licence.id))
            }
            Command::Remove { id } => {
                self.authorize(Role::can_write, "change licences").await?;
                let id = RecordId::new(id);
                require(self.licences.delete(&id).await, "remove licence")?;
                Ok(format!("removed {id}\n"))
            }
            Command::Alerts => {
                let licences = self.all_licences().await?;
                let alerts = build_alert_list(&licences, now, &self.bands);
                Ok(render::alert_list(&alerts))
            }
            Command::Stats { json } => {
                let licences = self.all_licences().await?;
                let stats = InventoryStats::compute(&licences, now, &self.bands);
                if json {
                    Ok(serde_json::to_string_pretty(&stats)? + "\n")
                } else {
                    Ok(render::stats_summary(&stats))
                }
            }
            Command::Search(search) => {
                let licences = self.all_licences().await?;
                let hits: Vec<Licence> = search
                    .to_filter()
                    .apply(&licences, now, &self.bands)
                    .into_iter()
                    .cloned()
                    .collect();
                Ok(render::licence_table(&hits, now, &self.bands))
            }
            Command::Status => Ok(render::status_line("licences", &self.licences.status())
                + &render::status_line("users", &self.users.status())),
            Command::Sync => {
                let licences = self.licences.reconnect().await;
                let users = self.users.reconnect().await;
                Ok(render::sync_line("licences", &licences) + &render::sync_line("users", &users))
            }
            Command::Users => {
                self.authorize(Role::can_manage_users, "manage users").await?;
                let users = require(self.users.get_all().await, "list users")?;
                Ok(render::user_table(&users))
            }
            Command::AddUser { login, password, role } => {
                self.authorize(Role::can_manage_users, "manage users").await?;
                let user = require(
                    self.users.create(UserDraft::new(login, password, role)).await,
                    "add user",
                )?;
                Ok(format!("added user {} ({})\n", user.login, user.role))
            }
            Command::Login { login, password } => {
                let user = require(self.users.authenticate(&login, &password).await, "login")?
                    .context("invalid login or password")?;
                let mut out = format!("logged in as {} ({})\n", user.login, user.role);
                if user.must_change_password {
                    out.push_str("password change required, run `lictrack passwd`\n");
                }
                Ok(out)
            }
            Command::Passwd {
                login,
                password,
                new_password,
            } => {
                let user = require(
                    self.users.change_password(&login, &password, &new_password).await,
                    "change password",
                )?
                .context("invalid login or password")?;
                Ok(format!("password changed for {}\n", user.login))
            }
        }
    }

    /// Checks the `--as` account and its role before a command that
    /// changes data.
    async fn authorize(&self, allowed: fn(&Role) -> bool, action: &str) -> Result<User> {
        let credentials = self
            .credentials
            .as_ref()
            .with_context(|| format!("{action} requires --as <login> and --as-password"))?;
        let user = require(
            self.users.authenticate(&credentials.login, &credentials.password).await,
            "login",
        )?
        .context("invalid login or password")?;
        if user.must_change_password {
            bail!("password change required for {}, run `lictrack passwd`", user.login);
        }
        if !allowed(&user.role) {
            bail!("{} ({}) may not {}", user.login, user.role, action);
        }
        Ok(user)
    }

    async fn all_licences(&self) -> Result<Vec<Licence>> {
        require(self.licences.get_all().await, "list licences")
    }
}

/// Turns an expected store failure into a command error.
fn require<T>(result: OpResult<T>, action: &str) -> Result<T> {
    result
        .outcome
        .with_context(|| format!("{action} failed"))
}
