//! User directory gating access to the ledger.

use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use rand_core::OsRng;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::{
    errors::{LedgerError, Result},
    ledger::Owner,
    storage::{read_if_exists, write_atomic},
};

pub const DEFAULT_ADMIN: &str = "admin";
const DEFAULT_ADMIN_SECRET: &str = "admin123";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub secret_hash: String,
    #[serde(default)]
    pub approved: bool,
    #[serde(default)]
    pub admin: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenialReason {
    UnknownUser,
    WrongSecret,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessDecision {
    Granted,
    /// Credentials are correct but an administrator has not approved the account yet.
    Pending,
    Denied(DenialReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Registration {
    Created,
    AlreadyExists,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserStatus {
    pub identity: String,
    pub approved: bool,
    pub admin: bool,
}

/// JSON-backed map of identity to [`UserRecord`]. Every mutation rewrites the file.
#[derive(Debug)]
pub struct UserDirectory {
    path: PathBuf,
    users: BTreeMap<String, UserRecord>,
}

impl UserDirectory {
    /// Opens the directory at `path`. An absent file is seeded with the built-in
    /// administrator and persisted.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let users = match read_if_exists(&path)? {
            Some(bytes) => serde_json::from_slice(&bytes)
                .map_err(|err| LedgerError::corrupt(&path, err.to_string()))?,
            None => {
                let mut users = BTreeMap::new();
                users.insert(
                    DEFAULT_ADMIN.to_string(),
                    UserRecord {
                        secret_hash: hash_secret(DEFAULT_ADMIN_SECRET)?,
                        approved: true,
                        admin: true,
                    },
                );
                let directory = Self { path, users };
                directory.save()?;
                info!(path = %directory.path.display(), "created user directory");
                return Ok(directory);
            }
        };
        Ok(Self { path, users })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn authenticate(&self, identity: &str, secret: &str) -> Result<AccessDecision> {
        let Some(record) = self.users.get(identity.trim()) else {
            warn!(identity, "login for unknown user");
            return Ok(AccessDecision::Denied(DenialReason::UnknownUser));
        };
        if !verify_secret(secret, &record.secret_hash)? {
            warn!(identity, "login with wrong secret");
            return Ok(AccessDecision::Denied(DenialReason::WrongSecret));
        }
        if !record.approved {
            return Ok(AccessDecision::Pending);
        }
        Ok(AccessDecision::Granted)
    }

    /// Adds a pending, non-admin user.
    pub fn register(&mut self, identity: &str, secret: &str) -> Result<Registration> {
        let identity = identity.trim();
        if identity.is_empty() || secret.is_empty() {
            return Err(LedgerError::validation("identity and secret must not be empty"));
        }
        if identity.eq_ignore_ascii_case(Owner::SINGLE_USER) {
            return Err(LedgerError::validation(format!(
                "`{identity}` is reserved for the single-user ledger"
            )));
        }
        if self.users.contains_key(identity) {
            return Ok(Registration::AlreadyExists);
        }
        self.users.insert(
            identity.to_string(),
            UserRecord {
                secret_hash: hash_secret(secret)?,
                approved: false,
                admin: false,
            },
        );
        self.save()?;
        info!(identity, "registered user awaiting approval");
        Ok(Registration::Created)
    }

    pub fn approve(&mut self, identity: &str) -> Result<()> {
        let record = self
            .users
            .get_mut(identity.trim())
            .ok_or_else(|| LedgerError::Access(format!("unknown user `{}`", identity.trim())))?;
        if record.approved {
            return Ok(());
        }
        record.approved = true;
        self.save()?;
        info!(identity, "approved user");
        Ok(())
    }

    pub fn is_admin(&self, owner: &Owner) -> bool {
        self.users
            .get(owner.as_str())
            .is_some_and(|record| record.admin)
    }

    pub fn users(&self) -> Vec<UserStatus> {
        self.users
            .iter()
            .map(|(identity, record)| UserStatus {
                identity: identity.clone(),
                approved: record.approved,
                admin: record.admin,
            })
            .collect()
    }

    fn save(&self) -> Result<()> {
        let bytes = serde_json::to_vec_pretty(&self.users)?;
        write_atomic(&self.path, &bytes)?;
        Ok(())
    }
}

fn hash_secret(secret: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(secret.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|err| LedgerError::Access(format!("hash error: {err}")))
}

fn verify_secret(secret: &str, stored_hash: &str) -> Result<bool> {
    let parsed = PasswordHash::new(stored_hash)
        .map_err(|err| LedgerError::Access(format!("stored hash unreadable: {err}")))?;
    Ok(Argon2::default()
        .verify_password(secret.as_bytes(), &parsed)
        .is_ok())
}
