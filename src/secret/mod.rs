//! API key storage
//!
//! The key lives in the platform secret manager when one is reachable and
//! in a plain file next to the config otherwise. Both backends trim the key
//! before storing it and report an absent key as an empty string.

mod file;
mod platform;

pub use file::FileSecretStore;
pub use platform::KeyringSecretStore;

use crate::config::AppPaths;
use crate::error::SecretError;

/// Keyring service name
pub const SERVICE_NAME: &str = "linwisp";

/// Keyring account name
pub const ACCOUNT_NAME: &str = "api_key";

/// Environment variable that forces a backend ("keyring" or "file")
pub const BACKEND_ENV: &str = "LINWISP_SECRET_BACKEND";

/// Trait for API key storage backends
pub trait SecretStore {
    /// Stored key, or an empty string when none is set
    fn load_key(&self) -> Result<String, SecretError>;

    /// Store a new key, trimming surrounding whitespace
    fn save_key(&self, key: &str) -> Result<(), SecretError>;

    /// Human-readable name for logging
    fn name(&self) -> &'static str;
}

/// Available storage backends
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecretBackend {
    Keyring,
    File,
}

impl SecretBackend {
    /// Pick a backend from the environment
    ///
    /// Linux sessions without a D-Bus session bus (ssh, containers, bare
    /// window managers) have no Secret Service to talk to.
    pub fn detect() -> Self {
        Self::from_env(
            std::env::var(BACKEND_ENV).ok().as_deref(),
            std::env::var_os("DBUS_SESSION_BUS_ADDRESS").is_some(),
        )
    }

    fn from_env(forced: Option<&str>, has_session_bus: bool) -> Self {
        match forced.map(|v| v.trim().to_lowercase()).as_deref() {
            Some("file") => return SecretBackend::File,
            Some("keyring") => return SecretBackend::Keyring,
            Some(other) => {
                tracing::warn!("Ignoring unknown {}={:?}", BACKEND_ENV, other);
            }
            None => {}
        }

        if cfg!(target_os = "linux") && !has_session_bus {
            SecretBackend::File
        } else {
            SecretBackend::Keyring
        }
    }
}

/// Factory function to open the detected backend
pub fn open(paths: &AppPaths) -> Box<dyn SecretStore> {
    open_backend(SecretBackend::detect(), paths)
}

/// Open a specific backend, falling back to the key file if the keyring
/// entry cannot be created
pub fn open_backend(backend: SecretBackend, paths: &AppPaths) -> Box<dyn SecretStore> {
    let store: Box<dyn SecretStore> = match backend {
        SecretBackend::Keyring => match KeyringSecretStore::new() {
            Ok(store) => Box::new(store),
            Err(e) => {
                tracing::warn!("Keyring unavailable ({}), using key file", e);
                Box::new(FileSecretStore::new(&paths.key_file))
            }
        },
        SecretBackend::File => Box::new(FileSecretStore::new(&paths.key_file)),
    };

    tracing::debug!("Secret store: {}", store.name());
    store
}

/// Keys are stored without surrounding whitespace
fn normalize_key(key: &str) -> &str {
    key.trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forced_backend_wins() {
        assert_eq!(
            SecretBackend::from_env(Some("file"), true),
            SecretBackend::File
        );
        assert_eq!(
            SecretBackend::from_env(Some(" Keyring "), false),
            SecretBackend::Keyring
        );
    }

    #[test]
    fn test_session_bus_detection() {
        assert_eq!(
            SecretBackend::from_env(None, true),
            SecretBackend::Keyring
        );
        if cfg!(target_os = "linux") {
            assert_eq!(SecretBackend::from_env(None, false), SecretBackend::File);
        }
    }

    #[test]
    fn test_unknown_forced_value_falls_through() {
        assert_eq!(
            SecretBackend::from_env(Some("vault"), true),
            SecretBackend::Keyring
        );
    }

    #[test]
    fn test_open_file_backend() {
        let dir = tempfile::tempdir().unwrap();
        let paths = AppPaths::in_dir(dir.path());
        let store = open_backend(SecretBackend::File, &paths);
        assert_eq!(store.name(), "file");
        assert_eq!(store.load_key().unwrap(), "");
    }
}
