//! The file-backed resume store.

use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::StoreError;

/// The persisted identity triple.
///
/// Empty strings mean "not known yet". The store's merge rule treats an
/// empty field as "no new information", so an [`Identity`] doubles as a
/// partial update: construct one with only the fields you learned and
/// hand it to [`ResumeStore::save`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub lobby_code: String,
    #[serde(default)]
    pub secret: String,
}

impl Identity {
    /// True when nothing has been learned yet.
    pub fn is_empty(&self) -> bool {
        self.username.is_empty() && self.lobby_code.is_empty() && self.secret.is_empty()
    }

    /// True when this identity belongs to `username` in `lobby_code`.
    ///
    /// A secret is only meaningful for the membership it was minted for,
    /// so sessions check this before replaying one.
    pub fn matches(&self, username: &str, lobby_code: &str) -> bool {
        self.username == username && self.lobby_code == lobby_code
    }

    /// Folds the non-empty fields of `update` into `self`. Empty fields
    /// never clobber stored values.
    fn absorb(&mut self, update: Identity) {
        if !update.username.is_empty() {
            self.username = update.username;
        }
        if !update.lobby_code.is_empty() {
            self.lobby_code = update.lobby_code;
        }
        if !update.secret.is_empty() {
            self.secret = update.secret;
        }
    }
}

/// Identity store, optionally backed by a JSON file.
///
/// Opening never fails: an unreadable or unparseable file is logged and
/// treated as an empty identity, the same as a first run. Writes go to a
/// sibling temp file first and are renamed into place, so a crash
/// mid-write leaves the previous file intact. Unchanged identities are
/// not rewritten.
#[derive(Debug)]
pub struct ResumeStore {
    path: Option<PathBuf>,
    identity: Identity,
}

impl ResumeStore {
    /// Opens a store backed by the file at `path`.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let identity = match fs::read_to_string(&path) {
            Ok(text) => match serde_json::from_str(&text) {
                Ok(identity) => identity,
                Err(e) => {
                    tracing::warn!(
                        path = %path.display(),
                        error = %e,
                        "identity file is corrupt, starting fresh"
                    );
                    Identity::default()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Identity::default(),
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "identity file is unreadable, starting fresh"
                );
                Identity::default()
            }
        };
        ResumeStore {
            path: Some(path),
            identity,
        }
    }

    /// Opens a store that lives only in memory. Used when the caller
    /// never wants resume across restarts.
    pub fn ephemeral() -> Self {
        ResumeStore {
            path: None,
            identity: Identity::default(),
        }
    }

    /// The identity as currently known.
    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    /// Merges `update` into the stored identity and persists the result.
    ///
    /// Only non-empty fields of `update` take effect, and nothing is
    /// written to disk unless a field actually changed, so repeating a
    /// save is free and saving an empty value can never lose a stored
    /// one.
    pub fn save(&mut self, update: Identity) -> Result<(), StoreError> {
        let mut merged = self.identity.clone();
        merged.absorb(update);
        if merged == self.identity {
            return Ok(());
        }
        self.identity = merged;
        self.persist()
    }

    /// Replaces the stored identity wholesale, empty fields included.
    ///
    /// This is the escape hatch from the merge rule, for when the caller
    /// knows the stored identity belongs to a different membership and
    /// its secret must not survive.
    pub fn replace(&mut self, identity: Identity) -> Result<(), StoreError> {
        if identity == self.identity {
            return Ok(());
        }
        self.identity = identity;
        self.persist()
    }

    fn persist(&self) -> Result<(), StoreError> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let json = serde_json::to_string_pretty(&self.identity)?;
        let tmp = path.with_extension("tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, path)?;
        tracing::debug!(path = %path.display(), "saved identity");
        Ok(())
    }
}

// ===========================================================================
// Tests
// ===========================================================================
