//! `Classifier`: the operations of the service over the three collections.
//!
//! Read paths work on committed snapshots. Every write runs its
//! read-patch-persist cycle inside [`CollectionStore::mutate`], so concurrent
//! updates of one collection are applied one after another and a failed
//! persist never becomes visible.

use std::sync::Arc;

use nodeclass_data::{Collection, CollectionBackend, CollectionKind, CollectionStore};
use tracing::{debug, info, warn};

use crate::defaults::{DEFAULT_GROUP, DEFAULT_ROLE};
use crate::directive::Directives;
use crate::error::{EncError, EncResult};
use crate::model::{Group, Host, User, UserView};
use crate::password::{hash_password, verify_password};
use crate::patch::{apply_directives, apply_role_directives, parse_role};
use crate::policy::{Operation, Principal};
use crate::resolve::{Resolution, Resolver};

/// Node classifier over owned host, group and user stores.
pub struct Classifier {
    hosts: CollectionStore<Host>,
    groups: CollectionStore<Group>,
    users: CollectionStore<User>,
}

impl Classifier {
    /// Load all three collections from `backend`.
    ///
    /// # Errors
    ///
    /// Returns [`EncError::Persistence`] if any collection fails to load.
    pub async fn open<B>(backend: Arc<B>) -> EncResult<Self>
    where
        B: CollectionBackend<Host> + CollectionBackend<Group> + CollectionBackend<User> + 'static,
    {
        let hosts_backend: Arc<dyn CollectionBackend<Host>> = backend.clone();
        let groups_backend: Arc<dyn CollectionBackend<Group>> = backend.clone();
        let users_backend: Arc<dyn CollectionBackend<User>> = backend;
        Ok(Self::from_stores(
            CollectionStore::open(CollectionKind::Hosts, hosts_backend).await?,
            CollectionStore::open(CollectionKind::Groups, groups_backend).await?,
            CollectionStore::open(CollectionKind::Users, users_backend).await?,
        ))
    }

    /// Assemble a classifier from already opened stores.
    #[must_use]
    pub const fn from_stores(
        hosts: CollectionStore<Host>,
        groups: CollectionStore<Group>,
        users: CollectionStore<User>,
    ) -> Self {
        Self {
            hosts,
            groups,
            users,
        }
    }

    /// Host fqdns in stored order.
    #[must_use]
    pub fn list_hosts(&self) -> Vec<String> {
        self.hosts.list()
    }

    /// Effective configuration for `fqdn`, or `None` when nothing applies.
    #[must_use]
    pub fn classify(&self, fqdn: &str) -> Option<Resolution> {
        let hosts = self.hosts.snapshot();
        let groups = self.groups.snapshot();
        let resolution = Resolver::new(&hosts, &groups).resolve(fqdn);
        match &resolution {
            Some(found) => debug!(fqdn, source = %found.source, "node classified"),
            None => debug!(fqdn, "no configuration applies to node"),
        }
        resolution
    }

    /// Store the host decoded from the YAML document `data` under `fqdn`,
    /// replacing any existing record.
    ///
    /// # Errors
    ///
    /// Returns a bad-request error when `fqdn` or `data` is empty or `data`
    /// does not decode, and [`EncError::Persistence`] when the write fails.
    pub async fn create_host(&self, fqdn: &str, data: &str) -> EncResult<Host> {
        let fqdn = required("fqdn", fqdn)?;
        let host: Host = decode_document(data)?;
        self.hosts.put(fqdn, host.clone()).await?;
        info!(fqdn, "host stored");
        Ok(host)
    }

    /// Apply update directives to the host `fqdn`.
    ///
    /// # Errors
    ///
    /// Returns [`EncError::NotFound`] for an unknown host and
    /// [`EncError::Persistence`] when the write fails.
    pub async fn update_host(&self, fqdn: &str, directives: &Directives) -> EncResult<Host> {
        let updated = self
            .hosts
            .mutate(|records| {
                let current = records
                    .get(fqdn)
                    .cloned()
                    .ok_or_else(|| not_found(CollectionKind::Hosts, fqdn))?;
                let updated = apply_directives(current, directives);
                records.insert(fqdn.to_string(), updated.clone());
                Ok::<_, EncError>(updated)
            })
            .await?;
        info!(fqdn, "host updated");
        Ok(updated)
    }

    /// Remove the host `fqdn` and return the removed record.
    ///
    /// # Errors
    ///
    /// Returns [`EncError::NotFound`] for an unknown host and
    /// [`EncError::Persistence`] when the write fails.
    pub async fn delete_host(&self, fqdn: &str) -> EncResult<Host> {
        let removed = self
            .hosts
            .mutate(|records| {
                records
                    .shift_remove(fqdn)
                    .ok_or_else(|| not_found(CollectionKind::Hosts, fqdn))
            })
            .await?;
        info!(fqdn, "host deleted");
        Ok(removed)
    }

    /// Group names in declaration order.
    #[must_use]
    pub fn list_groups(&self) -> Vec<String> {
        self.groups.list()
    }

    /// The group `name`, including its host prefixes.
    ///
    /// # Errors
    ///
    /// Returns [`EncError::NotFound`] for an unknown group.
    pub fn get_group(&self, name: &str) -> EncResult<Group> {
        self.groups
            .get(name)
            .ok_or_else(|| not_found(CollectionKind::Groups, name))
    }

    /// Store the group decoded from the YAML document `data` under `name`,
    /// replacing any existing record. The fallback group is created alongside
    /// the first group when it does not exist yet.
    ///
    /// # Errors
    ///
    /// Returns a bad-request error when `name` or `data` is empty or `data`
    /// does not decode, and [`EncError::Persistence`] when the write fails.
    pub async fn create_group(&self, name: &str, data: &str) -> EncResult<Group> {
        let name = required("name", name)?;
        let group: Group = decode_document(data)?;
        let seeded = self
            .groups
            .mutate(|records| {
                records.insert(name.to_string(), group.clone());
                Ok::<_, EncError>(seed_default_group(records))
            })
            .await?;
        if seeded {
            info!(group = DEFAULT_GROUP, "fallback group created");
        }
        info!(group = name, "group stored");
        Ok(group)
    }

    /// Apply update directives to the group `name`. A collection loaded
    /// without the fallback group gains it in the same write.
    ///
    /// # Errors
    ///
    /// Returns [`EncError::NotFound`] for an unknown group and
    /// [`EncError::Persistence`] when the write fails.
    pub async fn update_group(&self, name: &str, directives: &Directives) -> EncResult<Group> {
        let (updated, seeded) = self
            .groups
            .mutate(|records| {
                let current = records
                    .get(name)
                    .cloned()
                    .ok_or_else(|| not_found(CollectionKind::Groups, name))?;
                let updated = apply_directives(current, directives);
                records.insert(name.to_string(), updated.clone());
                Ok::<_, EncError>((updated, seed_default_group(records)))
            })
            .await?;
        if seeded {
            info!(group = DEFAULT_GROUP, "fallback group created");
        }
        info!(group = name, "group updated");
        Ok(updated)
    }

    /// Remove the group `name` and return the removed record.
    ///
    /// # Errors
    ///
    /// Returns [`EncError::Forbidden`] for the fallback group,
    /// [`EncError::NotFound`] for an unknown group and
    /// [`EncError::Persistence`] when the write fails.
    pub async fn delete_group(&self, name: &str) -> EncResult<Group> {
        if name == DEFAULT_GROUP {
            return Err(EncError::Forbidden {
                operation: Operation::DeleteGroup.as_str(),
                reason: "the default group cannot be deleted",
            });
        }
        let removed = self
            .groups
            .mutate(|records| {
                records
                    .shift_remove(name)
                    .ok_or_else(|| not_found(CollectionKind::Groups, name))
            })
            .await?;
        info!(group = name, "group deleted");
        Ok(removed)
    }

    /// Usernames in stored order.
    #[must_use]
    pub fn list_users(&self) -> Vec<String> {
        self.users.list()
    }

    /// The user `username` with the password hash redacted.
    ///
    /// # Errors
    ///
    /// Returns [`EncError::NotFound`] for an unknown user.
    pub fn get_user(&self, username: &str) -> EncResult<UserView> {
        self.users
            .get(username)
            .map(|user| user.view())
            .ok_or_else(|| not_found(CollectionKind::Users, username))
    }

    /// Create a user. Without roles the user is granted the default role.
    ///
    /// # Errors
    ///
    /// Returns a bad-request error when `username` or `password` is empty, a
    /// role is unknown or the user already exists, and
    /// [`EncError::Persistence`] when the write fails.
    pub async fn create_user(
        &self,
        username: &str,
        password: &str,
        roles: &[String],
    ) -> EncResult<UserView> {
        let username = required("username", username)?;
        if self.users.contains(username) {
            return Err(already_exists(username));
        }
        let password = required("password", password)?;
        let mut granted = Vec::with_capacity(roles.len().max(1));
        for name in roles {
            let role = parse_role("role", name)?;
            if !granted.contains(&role) {
                granted.push(role);
            }
        }
        if granted.is_empty() {
            granted.push(DEFAULT_ROLE);
        }
        let user = User {
            password: hash_password(password)?,
            roles: granted,
        };
        let view = user.view();
        self.users
            .mutate(|records| {
                if records.contains_key(username) {
                    return Err(already_exists(username));
                }
                records.insert(username.to_string(), user);
                Ok(())
            })
            .await?;
        info!(username, "user created");
        Ok(view)
    }

    /// Change a user's password (when `password` is non-empty) and apply
    /// add/remove directives to its roles.
    ///
    /// # Errors
    ///
    /// Returns [`EncError::NotFound`] for an unknown user, a bad-request
    /// error for an unknown role and [`EncError::Persistence`] when the write
    /// fails.
    pub async fn update_user(
        &self,
        username: &str,
        password: Option<&str>,
        role_directives: &[String],
    ) -> EncResult<UserView> {
        let rehashed = match password.filter(|candidate| !candidate.is_empty()) {
            Some(plaintext) => Some(hash_password(plaintext)?),
            None => None,
        };
        let view = self
            .users
            .mutate(|records| {
                let mut user = records
                    .get(username)
                    .cloned()
                    .ok_or_else(|| not_found(CollectionKind::Users, username))?;
                if let Some(hash) = rehashed {
                    user.password = hash;
                }
                user.roles = apply_role_directives(user.roles, role_directives)?;
                let view = user.view();
                records.insert(username.to_string(), user);
                Ok::<_, EncError>(view)
            })
            .await?;
        info!(username, "user updated");
        Ok(view)
    }

    /// Remove the user `username` and return its redacted record.
    ///
    /// # Errors
    ///
    /// Returns [`EncError::NotFound`] for an unknown user and
    /// [`EncError::Persistence`] when the write fails.
    pub async fn delete_user(&self, username: &str) -> EncResult<UserView> {
        let removed = self
            .users
            .mutate(|records| {
                records
                    .shift_remove(username)
                    .ok_or_else(|| not_found(CollectionKind::Users, username))
            })
            .await?;
        info!(username, "user deleted");
        Ok(removed.view())
    }

    /// Check credentials and return the authenticated principal.
    ///
    /// Unknown users, wrong passwords and unreadable stored hashes all yield
    /// `None`; the latter is logged. Verification is CPU bound, so async
    /// callers should run it on a blocking thread.
    #[must_use]
    pub fn authenticate(&self, username: &str, password: &str) -> Option<Principal> {
        let user = self.users.get(username)?;
        match verify_password(&user.password, password) {
            Ok(true) => Some(Principal::new(username, user.roles)),
            Ok(false) => None,
            Err(err) => {
                warn!(username, error = %err, "stored credential could not be verified");
                None
            }
        }
    }

    /// Re-persist every collection.
    ///
    /// # Errors
    ///
    /// Returns [`EncError::Persistence`] for the first collection that fails
    /// to flush; the remaining collections are still attempted.
    pub async fn shutdown(&self) -> EncResult<()> {
        let results = [
            self.hosts.flush().await,
            self.groups.flush().await,
            self.users.flush().await,
        ];
        let mut first_error = None;
        for result in results {
            if let Err(err) = result {
                warn!(collection = %err.collection(), error = %err, "flush failed during shutdown");
                first_error.get_or_insert(err);
            }
        }
        first_error.map_or(Ok(()), |err| Err(err.into()))
    }
}

/// Insert an empty fallback group when it is missing. The fallback is
/// appended so declared groups keep their order.
fn seed_default_group(records: &mut Collection<Group>) -> bool {
    if records.contains_key(DEFAULT_GROUP) {
        return false;
    }
    records.insert(DEFAULT_GROUP.to_string(), Group::default());
    true
}

fn required<'a>(field: &'static str, value: &'a str) -> EncResult<&'a str> {
    if value.is_empty() {
        Err(EncError::MissingField { field })
    } else {
        Ok(value)
    }
}

fn decode_document<T: serde::de::DeserializeOwned>(data: &str) -> EncResult<T> {
    let data = required("data", data)?;
    let decoded: Option<T> = serde_yaml::from_str(data).map_err(|source| {
        EncError::InvalidDocument {
            field: "data",
            source,
        }
    })?;
    decoded.ok_or(EncError::MissingField { field: "data" })
}

fn not_found(collection: CollectionKind, key: &str) -> EncError {
    EncError::NotFound {
        collection,
        key: key.to_string(),
    }
}

fn already_exists(username: &str) -> EncError {
    EncError::AlreadyExists {
        collection: CollectionKind::Users,
        key: username.to_string(),
    }
}
