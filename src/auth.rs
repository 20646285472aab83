//! Session/auth gate in front of the quiz.
//!
//! Not a security boundary: the login form upstream is mocked and nothing
//! here is verified. The gate only decides whether the quiz is reachable
//! and remembers who is playing across restarts via the profile store.

use tracing::{info, instrument, warn};

use crate::domain::User;
use crate::profile::ProfileStore;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AuthStatus {
  Unauthenticated,
  Authenticated,
}

/// Mock social sign-in buttons on the hosted login screen.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SocialProvider {
  Google,
  Facebook,
}

pub struct AuthGate {
  store: ProfileStore,
  current: Option<User>,
}

impl AuthGate {
  /// Gate backed by the given store, restoring any saved profile.
  pub fn restore(store: ProfileStore) -> Self {
    let current = store.load();
    if let Some(user) = &current {
      info!(target: "motionmaster_core", name = %user.name, "Restored saved profile");
    }
    Self { store, current }
  }

  pub fn status(&self) -> AuthStatus {
    if self.current.is_some() { AuthStatus::Authenticated } else { AuthStatus::Unauthenticated }
  }

  pub fn current(&self) -> Option<&User> {
    self.current.as_ref()
  }

  /// Admit a user. A blank name falls back to the email's local part.
  #[instrument(level = "info", skip(self, name, email))]
  pub fn login(&mut self, name: &str, email: &str) -> User {
    let name = if name.trim().is_empty() {
      email.split('@').next().unwrap_or(email).to_string()
    } else {
      name.trim().to_string()
    };
    let user = User { name, email: email.to_string() };
    if let Err(e) = self.store.save(&user) {
      warn!(target: "motionmaster_core", error = %e, "Profile not persisted; continuing in-memory");
    }
    info!(target: "motionmaster_core", name = %user.name, "Signed in");
    self.current = Some(user.clone());
    user
  }

  /// The canned identities behind the mock social buttons.
  pub fn login_social(&mut self, provider: SocialProvider) -> User {
    let (name, email) = match provider {
      SocialProvider::Google => ("Google Researcher", "google@social.lab"),
      SocialProvider::Facebook => ("Facebook Explorer", "facebook@social.lab"),
    };
    self.login(name, email)
  }

  pub fn logout(&mut self) {
    self.current = None;
    if let Err(e) = self.store.clear() {
      warn!(target: "motionmaster_core", error = %e, "Profile not cleared");
    }
    info!(target: "motionmaster_core", "Signed out");
  }
}
