//! Type aliases and user-specific lookups.

use crate::result::OpResult;
use crate::store::ResilientStore;
use lictrack_types::{Licence, User, UserPatch};

pub type LicenceStore = ResilientStore<Licence>;
pub type UserStore = ResilientStore<User>;

impl ResilientStore<User> {
    /// Looks a user up by login. Falls back like [`ResilientStore::get_all`].
    pub async fn find_by_login(&self, login: &str) -> OpResult<Option<User>> {
        let login = login.trim();
        self.get_all()
            .await
            .map(|users| users.into_iter().find(|u| u.login == login))
    }

    /// Returns the user if the login exists and the password matches.
    pub async fn authenticate(&self, login: &str, password: &str) -> OpResult<Option<User>> {
        self.find_by_login(login)
            .await
            .map(|user| user.filter(|u| u.verify_password(password)))
    }

    /// Replaces a password after checking the current one, which clears
    /// `must_change_password`. `None` if the login or password is wrong.
    pub async fn change_password(&self, login: &str, current: &str, new: &str) -> OpResult<Option<User>> {
        let found = self.authenticate(login, current).await;
        let user = match found.outcome {
            Ok(Some(user)) => user,
            Ok(None) => return OpResult::ok(None, found.used_fallback),
            Err(e) => return OpResult::failed(e, found.used_fallback),
        };
        let patch = UserPatch {
            password: Some(new.to_string()),
            ..UserPatch::default()
        };
        self.update(&user.id, patch).await.map(Some)
    }
}
