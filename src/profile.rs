//! Persistent user profile record.
//!
//! A single JSON file under the platform data directory, written on login,
//! removed on logout, read once at startup. A missing or malformed file
//! means "nobody is signed in"; it is never an error the caller must
//! recover from.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{info, instrument, warn};

use crate::domain::User;
use crate::error::ProfileError;

const PROFILE_FILE: &str = "motion_master_user.json";

pub struct ProfileStore {
    path: PathBuf,
}

impl ProfileStore {
    /// Store rooted at the platform data dir, e.g. `~/.local/share/motionmaster`.
    /// None when the platform offers no data directory.
    pub fn default_location() -> Option<Self> {
        let dir = dirs::data_dir()?.join("motionmaster");
        Some(Self { path: dir.join(PROFILE_FILE) })
    }

    /// Store at an explicit path, for embedders with their own layout.
    pub fn at<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the saved profile. Missing or malformed records yield None.
    #[instrument(level = "debug", skip(self))]
    pub fn load(&self) -> Option<User> {
        let raw = fs::read_to_string(&self.path).ok()?;
        match serde_json::from_str::<User>(&raw) {
            Ok(user) => Some(user),
            Err(e) => {
                warn!(
                    target: "motionmaster_core",
                    path = %self.path.display(),
                    error = %e,
                    "Ignoring malformed profile record"
                );
                None
            }
        }
    }

    #[instrument(level = "debug", skip(self, user), fields(name = %user.name))]
    pub fn save(&self, user: &User) -> Result<(), ProfileError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let raw = serde_json::to_string_pretty(user)?;
        fs::write(&self.path, raw)?;
        info!(target: "motionmaster_core", path = %self.path.display(), "Profile saved");
        Ok(())
    }

    /// Remove the record. Absence is not an error.
    pub fn clear(&self) -> Result<(), ProfileError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
