//! UID to account resolution with a per-session cache.

use ahash::AHashMap as HashMap;
use nix::unistd::{Uid, User};
use std::sync::RwLock as StdRwLock;
use tracing::debug;

use crate::process::record::Owner;

/// Caches account lookups so each UID hits the account database at most once.
///
/// Lookups happen from the parallel scan, so the cache sits behind a lock.
pub struct UserTable {
    cache: StdRwLock<HashMap<u32, Option<Owner>>>,
    use_system: bool,
}

impl UserTable {
    /// Resolves through the system account database.
    pub fn system() -> Self {
        Self {
            cache: StdRwLock::new(HashMap::new()),
            use_system: true,
        }
    }

    /// Resolves nothing; every owner is absent.
    pub fn empty() -> Self {
        Self {
            cache: StdRwLock::new(HashMap::new()),
            use_system: false,
        }
    }

    /// A fixed table; UIDs not listed resolve to `None`.
    pub fn fixed<'a, I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (u32, &'a str)>,
    {
        let cache = entries
            .into_iter()
            .map(|(uid, name)| (uid, Some(Owner::new(uid, name))))
            .collect();
        Self {
            cache: StdRwLock::new(cache),
            use_system: false,
        }
    }

    pub fn resolve(&self, uid: u32) -> Option<Owner> {
        if let Ok(cache) = self.cache.read() {
            if let Some(hit) = cache.get(&uid) {
                return hit.clone();
            }
        }

        let owner = if self.use_system {
            lookup_uid(uid)
        } else {
            None
        };

        if let Ok(mut cache) = self.cache.write() {
            cache.insert(uid, owner.clone());
        }
        owner
    }
}

fn lookup_uid(uid: u32) -> Option<Owner> {
    match User::from_uid(Uid::from_raw(uid)) {
        Ok(Some(user)) => Some(Owner::new(uid, &user.name)),
        Ok(None) => {
            debug!("uid {} has no account entry", uid);
            None
        }
        Err(e) => {
            debug!("Failed to look up uid {}: {}", uid, e);
            None
        }
    }
}

/// Looks up an account by login name.
pub fn lookup_user_by_name(name: &str) -> Option<Owner> {
    match User::from_name(name) {
        Ok(Some(user)) => Some(Owner::new(user.uid.as_raw(), &user.name)),
        Ok(None) => None,
        Err(e) => {
            debug!("Failed to look up user {}: {}", name, e);
            None
        }
    }
}
